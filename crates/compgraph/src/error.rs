// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for compgraph operations.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::ComponentReference;

/// Convenience Result type with compgraph Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying a component graph.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Component reference string is not of the form `name:version`
    #[error("Invalid component reference {0:?}: expected <name>:<version>")]
    #[diagnostic(code(compgraph::invalid_reference))]
    InvalidReference(String),

    /// Two components both claim to be the application image source
    #[error(
        "Components {existing} and {conflicting} are both labeled as the application image source"
    )]
    #[diagnostic(
        code(compgraph::duplicate_application_image_source),
        help("Only one component in the graph may carry the application-image-source label")
    )]
    DuplicateApplicationImageSource {
        existing: ComponentReference,
        conflicting: ComponentReference,
    },

    /// A resource that must be fetched locally was not part of the fetched blobs
    #[error("Local blob for resource {name}:{version} ({resource_type}) of {component} was not fetched")]
    #[diagnostic(
        code(compgraph::missing_local_blob),
        help("Request the resource type as a local blob type when fetching the descriptor")
    )]
    MissingLocalBlob {
        component: ComponentReference,
        name: String,
        version: String,
        resource_type: String,
    },

    /// Local blob content is not valid UTF-8
    #[error("Local blob for resource {name} of {component} is not valid UTF-8")]
    #[diagnostic(code(compgraph::invalid_blob))]
    InvalidBlob {
        component: ComponentReference,
        name: String,
    },

    /// Resource access carries no image reference
    #[error("Resource {name} of {component} has no image reference in its access")]
    #[diagnostic(code(compgraph::missing_image_reference))]
    MissingImageReference {
        component: ComponentReference,
        name: String,
    },

    /// Label value does not have the expected shape
    #[error("Invalid value for label {label} on {component}: {reason}")]
    #[diagnostic(code(compgraph::invalid_label))]
    InvalidLabel {
        component: ComponentReference,
        label: String,
        reason: String,
    },

    /// Fetched descriptor describes a different component than requested
    #[error("Requested descriptor for {requested} but received {received}")]
    #[diagnostic(code(compgraph::descriptor_mismatch))]
    DescriptorMismatch {
        requested: ComponentReference,
        received: ComponentReference,
    },

    /// Descriptor could not be located
    #[error("Component {0} not found")]
    #[diagnostic(code(compgraph::component_not_found))]
    ComponentNotFound(ComponentReference),

    /// Component is not part of the graph
    #[error("Component {0} is not known to the graph")]
    #[diagnostic(
        code(compgraph::unknown_component),
        help("Walk the graph from a root that reaches this component first")
    )]
    UnknownComponent(ComponentReference),

    /// A cross-component image lookup found no match
    #[error("Image {lookup_name:?} requested by {component} not found in {referenced}")]
    #[diagnostic(
        code(compgraph::image_not_found),
        help("{}", candidate_message(.candidates))
    )]
    ImageNotFound {
        component: ComponentReference,
        referenced: ComponentReference,
        lookup_name: String,
        candidates: Vec<String>,
    },

    /// Mapped images were declared but no application image source was walked
    #[error("Component {0} declares mapped images but no application image source was found")]
    #[diagnostic(
        code(compgraph::missing_application_image_source),
        help("Make sure the component labeled as application image source is reachable from the walk root")
    )]
    MissingApplicationImageSource(ComponentReference),

    /// Expanding a component during the walk failed
    #[error("Failed to expand {component}: {source}")]
    #[diagnostic(code(compgraph::expand_failed))]
    ExpandFailed {
        component: ComponentReference,
        #[source]
        source: Box<Error>,
    },

    /// A walk worker task panicked
    #[error("Walk worker panicked: {0}")]
    #[diagnostic(code(compgraph::worker_panicked))]
    WorkerPanicked(String),

    /// The walk was cancelled before the frontier drained
    #[error("Walk cancelled with {pending} component(s) left unexpanded")]
    #[diagnostic(code(compgraph::cancelled))]
    Cancelled { pending: usize },

    /// One or more failures collected over a whole walk
    #[error("Walk finished with {} error(s){}", .errors.len(), failed_components(.errors))]
    #[diagnostic(
        code(compgraph::walk_failed),
        help("The graph is usable but incomplete for the failed components")
    )]
    Walk {
        #[related]
        errors: Vec<Error>,
    },

    /// Invalid descriptor JSON
    #[error("Invalid component descriptor {path:?}: {error}")]
    #[diagnostic(code(compgraph::invalid_descriptor))]
    InvalidDescriptor {
        path: PathBuf,
        #[source]
        error: serde_json::Error,
    },

    /// Failed to read file
    #[error("Failed to read file: {path:?}")]
    #[diagnostic(code(compgraph::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// JSON error passthrough
    #[error(transparent)]
    #[diagnostic(code(compgraph::json_error))]
    Json(#[from] serde_json::Error),

    /// YAML error passthrough
    #[error(transparent)]
    #[diagnostic(code(compgraph::yaml_error))]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Wrap this error as the failure of expanding `component`.
    pub fn expanding(self, component: &ComponentReference) -> Self {
        Self::ExpandFailed {
            component: component.clone(),
            source: Box::new(self),
        }
    }
}

fn candidate_message(candidates: &[String]) -> String {
    if candidates.is_empty() {
        "The referenced component declares no image sources".to_string()
    } else {
        format!("Available images: {}", candidates.join(", "))
    }
}

/// Names the components behind a walk's failures; details are in `related`.
fn failed_components(errors: &[Error]) -> String {
    let components: Vec<String> = errors
        .iter()
        .filter_map(|err| match err {
            Error::ExpandFailed { component, .. } => Some(component.to_string()),
            _ => None,
        })
        .collect();
    if components.is_empty() {
        String::new()
    } else {
        format!(" in {}", components.join(", "))
    }
}

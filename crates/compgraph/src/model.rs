// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Normalized resources, image sources and graph edges.

use serde::{Deserialize, Serialize};

use crate::ComponentReference;
use crate::descriptor::Label;

pub const OCI_IMAGE: &str = "ociImage";
pub const HELM_CHART: &str = "helmChart/v1";
pub const HELM_CHART_IMAGEMAP: &str = "helmchart-imagemap";

/// Resource types the graph keeps; everything else in a descriptor is ignored.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceType {
    #[serde(rename = "ociImage")]
    OciImage,
    #[serde(rename = "helmChart/v1")]
    HelmChart,
    #[serde(rename = "helmchart-imagemap")]
    HelmChartImageMap,
}

impl ResourceType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            OCI_IMAGE => Some(Self::OciImage),
            HELM_CHART => Some(Self::HelmChart),
            HELM_CHART_IMAGEMAP => Some(Self::HelmChartImageMap),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OciImage => OCI_IMAGE,
            Self::HelmChart => HELM_CHART,
            Self::HelmChartImageMap => HELM_CHART_IMAGEMAP,
        }
    }
}

/// One artifact a component ships.
///
/// `value` is the image or chart reference, or the raw image map payload
/// for `helmchart-imagemap` resources.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub value: String,
}

/// An entry of an image vector.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    pub name: String,

    /// Combined `repository:tag` or `repository@digest` reference.
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_repository: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_version: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
}

/// How an image source takes part in resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageBinding {
    /// Emitted as is.
    Direct,
    /// Only there to be found by name from another component.
    LookupOnly,
    /// Repository, tag and version come from `lookup_name` in `component`.
    Referenced {
        component: ComponentReference,
        lookup_name: String,
    },
}

/// An image source plus what resolution needs to know about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedImageSource {
    pub image: ImageSource,
    pub binding: ImageBinding,
    /// Name of the resource that carried this source, if any.
    pub resource_name: Option<String>,
    /// Image reference before any registry rewrite.
    pub original_ref: Option<String>,
}

impl ExtendedImageSource {
    /// Name other components use to look this source up.
    pub fn effective_name(&self) -> &str {
        match &self.resource_name {
            Some(name) if !name.is_empty() => name,
            _ => &self.image.name,
        }
    }

    pub fn is_lookup_only(&self) -> bool {
        matches!(self.binding, ImageBinding::LookupOnly)
    }
}

/// An image a component re-exports from the application image source.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MappedImage {
    pub repository: String,
    pub name: String,
}

/// One outgoing edge of the graph with the image sources attributed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub component: ComponentReference,
    pub image_sources: Vec<ExtendedImageSource>,
}

impl Dependency {
    pub fn new(component: ComponentReference) -> Self {
        Self {
            component,
            image_sources: Vec::new(),
        }
    }
}

/// Something that depends on a component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Dependent {
    /// The component was walked as one of the roots.
    Root,
    Component(ComponentReference),
}

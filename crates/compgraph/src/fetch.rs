// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Descriptor fetching and the expansion step that feeds the graph.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::descriptor::{BlobKey, Blobs, ComponentDescriptor};
use crate::graph::Graph;
use crate::model::HELM_CHART_IMAGEMAP;
use crate::walker::{Expand, WalkOptions, Walker};
use crate::{ComponentReference, Error};

#[cfg(test)]
#[path = "./fetch_test.rs"]
mod fetch_test;

/// Directory below a [`DirectoryFetcher`] root that holds local blobs.
pub const BLOBS_DIR: &str = "blobs";

/// A descriptor together with the local blobs fetched alongside it.
#[derive(Debug, Clone, Default)]
pub struct FetchedDescriptor {
    pub descriptor: ComponentDescriptor,
    pub blobs: Blobs,
}

/// Source of component descriptors, usually an OCI registry.
#[async_trait]
pub trait DescriptorFetcher: Send + Sync {
    /// Fetch the descriptor of `reference`, including the blobs of every
    /// resource whose type is listed in `local_blob_types`.
    async fn fetch_descriptor(
        &self,
        reference: &ComponentReference,
        local_blob_types: &[&str],
    ) -> crate::Result<FetchedDescriptor>;
}

/// Reads descriptors from `<root>/<reference filename>` and local blobs
/// from `<root>/blobs/<local reference>`.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Path a local blob reference is stored at.
    pub fn blob_path(&self, local_reference: &str) -> PathBuf {
        self.root
            .join(BLOBS_DIR)
            .join(local_reference.replace(':', "-"))
    }
}

#[async_trait]
impl DescriptorFetcher for DirectoryFetcher {
    async fn fetch_descriptor(
        &self,
        reference: &ComponentReference,
        local_blob_types: &[&str],
    ) -> crate::Result<FetchedDescriptor> {
        let path = self.root.join(reference.filename());
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(Error::ComponentNotFound(reference.clone()));
            }
            Err(error) => return Err(Error::ReadFailed { path, error }),
        };
        let descriptor: ComponentDescriptor = serde_json::from_str(&json)
            .map_err(|error| Error::InvalidDescriptor {
                path: path.clone(),
                error,
            })?;

        let mut blobs = Blobs::new();
        for resource in &descriptor.component.resources {
            if !local_blob_types.contains(&resource.resource_type.as_str()) {
                continue;
            }
            let Some(local_reference) = resource
                .access
                .as_ref()
                .and_then(|access| access.local_reference.as_deref())
            else {
                continue;
            };
            let blob_path = self.blob_path(local_reference);
            match tokio::fs::read(&blob_path).await {
                Ok(data) => {
                    blobs.insert(BlobKey::for_resource(resource), data);
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    tracing::debug!(component = %reference, blob = %blob_path.display(), "local blob missing");
                }
                Err(error) => {
                    return Err(Error::ReadFailed {
                        path: blob_path,
                        error,
                    });
                }
            }
        }

        Ok(FetchedDescriptor { descriptor, blobs })
    }
}

/// Fetches a component and merges it into the graph.
pub struct DescriptorExpander {
    graph: Arc<Graph>,
    fetcher: Arc<dyn DescriptorFetcher>,
}

impl DescriptorExpander {
    pub fn new(graph: Arc<Graph>, fetcher: Arc<dyn DescriptorFetcher>) -> Self {
        Self { graph, fetcher }
    }
}

#[async_trait]
impl Expand for DescriptorExpander {
    async fn expand(
        &self,
        reference: &ComponentReference,
    ) -> crate::Result<Vec<ComponentReference>> {
        let fetched = self
            .fetcher
            .fetch_descriptor(reference, &[HELM_CHART_IMAGEMAP])
            .await?;
        let received = fetched.descriptor.reference()?;
        if &received != reference {
            return Err(Error::DescriptorMismatch {
                requested: reference.clone(),
                received,
            });
        }
        self.graph
            .merge_descriptor_and_discover_edges(&fetched.descriptor, &fetched.blobs)
    }
}

/// Build a fresh graph by walking everything reachable from `roots`.
///
/// The graph is returned even when the walk reports errors; it is then
/// complete except for the components that failed.
pub async fn build_graph<I>(
    fetcher: Arc<dyn DescriptorFetcher>,
    roots: I,
    options: &WalkOptions,
) -> (Arc<Graph>, crate::Result<()>)
where
    I: IntoIterator<Item = ComponentReference>,
{
    build_graph_with_cancel(fetcher, roots, options, CancellationToken::new()).await
}

/// Like [`build_graph`], stopping early once `cancel` fires.
pub async fn build_graph_with_cancel<I>(
    fetcher: Arc<dyn DescriptorFetcher>,
    roots: I,
    options: &WalkOptions,
    cancel: CancellationToken,
) -> (Arc<Graph>, crate::Result<()>)
where
    I: IntoIterator<Item = ComponentReference>,
{
    let graph = Arc::new(Graph::new());
    let roots: Vec<ComponentReference> = roots.into_iter().collect();
    for root in &roots {
        graph.add_root(root);
    }

    let expander = DescriptorExpander::new(Arc::clone(&graph), fetcher);
    let walker = Walker::new(Arc::new(expander), options.workers);
    let result = walker.walk_with_cancel(roots, cancel).await;
    (graph, result)
}

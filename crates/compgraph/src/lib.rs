// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! compgraph - Component Dependency Graph and Image Vectors
//!
//! This crate walks a registry-backed graph of versioned components and
//! derives, for every component reached, the container images it needs to
//! deploy (its image vector) and the resources it ships.
//!
//! # Overview
//!
//! A walk starts from one or more root references. A fixed pool of workers
//! fetches each component's descriptor, merges it into a shared [`Graph`]
//! and queues the components it references. Every component is fetched at
//! most once per walk, and a failing fetch does not stop the others.
//!
//! Once the walk finishes the graph is queried per component:
//!
//! ```no_run
//! # async fn run() -> compgraph::Result<()> {
//! use std::sync::Arc;
//!
//! let fetcher = Arc::new(compgraph::DirectoryFetcher::new("./descriptors"));
//! let root: compgraph::ComponentReference = "github.com/acme/landscape:1.0.0".parse()?;
//! let (graph, walked) =
//!     compgraph::build_graph(fetcher, [root.clone()], &Default::default()).await;
//! walked?;
//!
//! let images = graph.resolve_image_vector(&root, false)?;
//! println!("{}", compgraph::render_yaml(&compgraph::ImageVector::new(images))?);
//! # Ok(())
//! # }
//! ```

pub mod descriptor;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod graph;
pub mod labels;
pub mod model;
pub mod output;
pub mod reference;
pub mod resolve;
pub mod walker;

#[cfg(test)]
mod test_support;

pub use descriptor::{BlobKey, Blobs, ComponentDescriptor};
pub use error::{Error, Result};
pub use extract::{ExtractedComponent, extract};
pub use fetch::{
    DescriptorExpander, DescriptorFetcher, DirectoryFetcher, FetchedDescriptor, build_graph,
    build_graph_with_cancel,
};
pub use graph::Graph;
pub use model::{
    Dependency, Dependent, ExtendedImageSource, ImageBinding, ImageSource, MappedImage, Resource,
    ResourceType,
};
pub use output::{ComponentInventory, ImageVector, render_yaml};
pub use reference::ComponentReference;
pub use walker::{DEFAULT_WORKERS, Expand, WalkOptions, Walker};

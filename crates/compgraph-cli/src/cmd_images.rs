// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `compgraph images` command.

use clap::Args;
use compgraph::{ComponentReference, ImageVector};
use miette::Result;

/// Print the image vector of a component
#[derive(Debug, Args)]
pub struct CmdImages {
    /// Component to resolve (name:version)
    reference: ComponentReference,

    /// Report images at their location before any registry rewrite
    #[clap(long, env = "COMPGRAPH_ORIGINAL_REFS")]
    original_refs: bool,

    #[clap(flatten)]
    walk: crate::WalkFlags,
}

impl CmdImages {
    pub async fn run(&mut self) -> Result<i32> {
        let (graph, walked) = self.walk.walk(vec![self.reference.clone()]).await;
        let code = crate::report_walk(walked);

        let images = graph.resolve_image_vector(&self.reference, self.original_refs)?;
        tracing::info!(component = %self.reference, images = images.len(), "resolved image vector");
        print!("{}", compgraph::render_yaml(&ImageVector::new(images))?);

        Ok(code)
    }
}

// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `compgraph walk` command.

use clap::Args;
use compgraph::ComponentReference;
use miette::Result;

/// Walk the graph and print the component inventory
#[derive(Debug, Args)]
pub struct CmdWalk {
    /// Root components (name:version)
    #[clap(required = true)]
    references: Vec<ComponentReference>,

    #[clap(flatten)]
    walk: crate::WalkFlags,
}

impl CmdWalk {
    pub async fn run(&mut self) -> Result<i32> {
        let (graph, walked) = self.walk.walk(self.references.clone()).await;

        // the inventory is printed even for a partial walk
        let inventory = graph.component_inventory();
        print!("{}", compgraph::render_yaml(&inventory)?);

        Ok(crate::report_walk(walked))
    }
}

// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `compgraph resources` command.

use clap::Args;
use compgraph::ComponentReference;
use miette::Result;

/// Print the resources of a component
#[derive(Debug, Args)]
pub struct CmdResources {
    /// Component to list (name:version)
    reference: ComponentReference,

    #[clap(flatten)]
    walk: crate::WalkFlags,
}

impl CmdResources {
    pub async fn run(&mut self) -> Result<i32> {
        let (graph, walked) = self.walk.walk(vec![self.reference.clone()]).await;
        let code = crate::report_walk(walked);

        if !graph.is_known(&self.reference) {
            return Err(compgraph::Error::UnknownComponent(self.reference.clone()).into());
        }
        let resources = graph.resources(&self.reference);
        print!("{}", compgraph::render_yaml(&resources)?);

        Ok(code)
    }
}

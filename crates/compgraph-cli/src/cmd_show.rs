// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `compgraph show` command.

use clap::Args;
use colored::Colorize;
use compgraph::{ComponentReference, Dependent, Graph};
use miette::Result;

/// Display every component reached by a walk
#[derive(Debug, Args)]
pub struct CmdShow {
    /// Root components (name:version)
    #[clap(required = true)]
    references: Vec<ComponentReference>,

    /// Report images at their location before any registry rewrite
    #[clap(long, env = "COMPGRAPH_ORIGINAL_REFS")]
    original_refs: bool,

    #[clap(flatten)]
    walk: crate::WalkFlags,
}

impl CmdShow {
    pub async fn run(&mut self) -> Result<i32> {
        let (graph, walked) = self.walk.walk(self.references.clone()).await;

        self.show_components_table(&graph);
        if let Some(source) = graph.application_image_source() {
            println!();
            println!("Application image source: {}", source.to_string().green());
        }

        Ok(crate::report_walk(walked))
    }

    fn show_components_table(&self, graph: &Graph) {
        println!("{}", "Components:".bold());
        println!();

        let components = graph.components();
        if components.is_empty() {
            println!("  {}", "(no components)".dimmed());
        }
        let width = components
            .iter()
            .map(|component| component.as_str().len())
            .max()
            .unwrap_or_default();

        for (i, component) in components.iter().enumerate() {
            let dependents = graph.dependents(component);
            let root_marker = if dependents.contains(&Dependent::Root) {
                " [root]"
            } else {
                ""
            };
            let parents = dependents
                .iter()
                .filter(|dependent| matches!(dependent, Dependent::Component(_)))
                .count();

            let images = match graph.resolve_image_vector(component, self.original_refs) {
                Ok(images) => format!("{} image(s)", images.len()).green(),
                Err(err) => {
                    tracing::debug!(%component, error = %err, "image vector unavailable");
                    "unresolved".red()
                }
            };
            let resources = graph.resources(component).len();

            println!(
                "  {:>3}. {}  {:>2} dependent(s)  {:>2} resource(s)  {}{}",
                i + 1,
                format!("{:<width$}", component.as_str()).cyan(),
                parents,
                resources,
                images,
                root_marker.yellow(),
            );
        }

        println!();
        println!("Total: {} component(s)", components.len());
    }
}

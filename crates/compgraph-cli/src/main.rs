// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! compgraph - Component Dependency Graph CLI

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use compgraph::{ComponentReference, DirectoryFetcher, Graph, WalkOptions};
use miette::Result;
use tokio_util::sync::CancellationToken;

mod cmd_images;
mod cmd_resources;
mod cmd_show;
mod cmd_walk;

use cmd_images::CmdImages;
use cmd_resources::CmdResources;
use cmd_show::CmdShow;
use cmd_walk::CmdWalk;

#[derive(Parser)]
#[clap(
    name = "compgraph",
    about = "Component Dependency Graph",
    version,
    long_about = "Walk component descriptors and derive the image vectors and resources they ship"
)]
struct Opt {
    #[clap(flatten)]
    logging: Logging,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
struct Logging {
    /// Increase verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[clap(short, long, global = true)]
    quiet: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct WalkFlags {
    /// Directory holding component descriptors and a blobs/ folder
    #[clap(
        long = "descriptors",
        short = 'd',
        env = "COMPGRAPH_DESCRIPTORS",
        default_value = "."
    )]
    pub descriptors: PathBuf,

    /// Number of descriptors fetched concurrently
    #[clap(
        long,
        short = 'w',
        env = "COMPGRAPH_WORKERS",
        default_value_t = compgraph::DEFAULT_WORKERS
    )]
    pub workers: usize,
}

impl WalkFlags {
    /// Walk everything reachable from `roots`.
    ///
    /// Ctrl-C stops the walk after the running fetches complete. The graph
    /// is returned together with the walk outcome so callers can still
    /// report what was collected.
    pub async fn walk(
        &self,
        roots: Vec<ComponentReference>,
    ) -> (Arc<Graph>, compgraph::Result<()>) {
        let fetcher = Arc::new(DirectoryFetcher::new(self.descriptors.clone()));
        let options = WalkOptions {
            workers: self.workers,
        };

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, waiting for running fetches");
                on_interrupt.cancel();
            }
        });
        let (graph, result) =
            compgraph::build_graph_with_cancel(fetcher, roots, &options, cancel).await;
        interrupt.abort();

        tracing::debug!(components = graph.len(), "graph built");
        (graph, result)
    }
}

/// Print a failed walk to stderr and return the exit code for it.
pub fn report_walk(result: compgraph::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            1
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Walk the graph and print the component inventory
    Walk(CmdWalk),

    /// Print the image vector of a component
    Images(CmdImages),

    /// Print the resources of a component
    Resources(CmdResources),

    /// Display every component reached by a walk
    Show(CmdShow),
}

impl Opt {
    async fn run(self) -> Result<i32> {
        let log_level = match (self.logging.quiet, self.logging.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, 2) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .init();

        match self.cmd {
            Command::Walk(mut cmd) => cmd.run().await,
            Command::Images(mut cmd) => cmd.run().await,
            Command::Resources(mut cmd) => cmd.run().await,
            Command::Show(mut cmd) => cmd.run().await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();
    let code = opt.run().await?;
    std::process::exit(code);
}

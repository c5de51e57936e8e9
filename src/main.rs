// SPDX-License-Identifier: MIT

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use woozie_rs::workflow::builder::Builder;

use std::path::PathBuf;

const CONFIG_ENV: &str = "WOOZIE_CONFIG";
const DEFAULT_CONFIG: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a workflow definition into workflow.xml
    Generate {
        /// Path to the workflow definition
        #[arg(short, long)]
        workflow: PathBuf,

        /// Path to the action-type configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory the outputs are written to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Also write DOT renderings of both graphs
        #[arg(long)]
        graph: bool,
    },
    /// Check that a workflow definition compiles without writing anything
    Validate {
        /// Path to the workflow definition
        #[arg(short, long)]
        workflow: PathBuf,

        /// Path to the action-type configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn config_path(config: Option<PathBuf>) -> PathBuf {
    config
        .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let builder = Builder::new();

    match args.command {
        Commands::Generate {
            workflow,
            config,
            output,
            graph,
        } => {
            let config = config_path(config);
            log::info!("Using configuration: {}", config.display());

            let compiled = builder
                .compile_files(&workflow, &config)
                .with_context(|| format!("Failed to compile {}", workflow.display()))?;
            let written = builder
                .write_outputs(&compiled, &output, graph)
                .with_context(|| format!("Failed to write outputs to {}", output.display()))?;

            for path in written {
                println!("{}", path.display());
            }
        }
        Commands::Validate { workflow, config } => {
            let config = config_path(config);
            let compiled = builder
                .compile_files(&workflow, &config)
                .with_context(|| format!("Failed to compile {}", workflow.display()))?;
            println!(
                "Workflow '{}' is valid ({} nodes)",
                compiled.workflow.name,
                compiled.graph.control_flow.len()
            );
        }
    }

    Ok(())
}

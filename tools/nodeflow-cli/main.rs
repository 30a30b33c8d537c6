use clap::{Parser, Subcommand};
use nodeflow::nodes::list_cities;
use nodeflow::prelude::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Runs node pipelines and inspects the registered node types
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the per-city CSV files (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a pipeline JSON file and print the results
    Run {
        /// Path to the pipeline JSON file
        pipeline_path: PathBuf,

        /// Read the file as a saved editor canvas instead of a run request
        #[arg(long)]
        canvas: bool,
    },
    /// Print the metadata of every registered node type
    NodeTypes,
    /// List the cities with data in the data directory
    Cities,
}

fn main() {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => Config::default(),
    };
    if let Some(data_dir) = cli.data_dir {
        config = config.with_data_dir(data_dir);
    }

    init_tracing(&config);

    match cli.command {
        Command::Run {
            pipeline_path,
            canvas,
        } => run_pipeline(&config, &pipeline_path, canvas),
        Command::NodeTypes => {
            let registry = NodeRegistry::with_builtin_nodes(&config);
            print_json(&json!({ "node_types": registry.list_all_metadata() }));
        }
        Command::Cities => {
            print_json(&json!({ "cities": list_cities(&config.data_dir) }));
        }
    }
}

/// Logs go to stderr so stdout stays valid JSON. `RUST_LOG` takes precedence
/// over the configured filter.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_pipeline(config: &Config, path: &Path, canvas: bool) {
    let load_start = Instant::now();
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read pipeline file '{}': {}",
            path.display(),
            e
        ))
    });

    let pipeline = if canvas {
        let document: CanvasDocument = serde_json::from_str(&content)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse canvas JSON: {}", e)));
        document
            .into_pipeline()
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert canvas: {}", e)))
    } else {
        PipelineDefinition::from_json(&content)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse pipeline JSON: {}", e)))
    };
    info!(
        nodes = pipeline.nodes.len(),
        elapsed = ?load_start.elapsed(),
        "pipeline loaded"
    );

    let registry = NodeRegistry::with_builtin_nodes(config);
    let results = Executor::new(&registry)
        .run(&pipeline)
        .unwrap_or_else(|e| exit_with_error(&format!("Pipeline execution failed: {}", e)));

    print_json(&json!({ "status": "ok", "results": results }));
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => exit_with_error(&format!("Failed to serialize output: {}", e)),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}

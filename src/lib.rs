//! # Nodeflow - Node Pipeline Executor
//!
//! **Nodeflow** runs pipelines built in a node editor: a directed acyclic graph of
//! typed computational nodes whose output ports are wired to the input ports of
//! downstream nodes. The executor orders the graph, builds every node through a
//! registry, routes values along the edges and collects the metrics and previews
//! each node reports.
//!
//! ## Core Workflow
//!
//! 1.  **Build a Registry**: Create a `NodeRegistry` and register node types, or load
//!     the built-in weather forecasting nodes with `NodeRegistry::with_builtin_nodes`.
//! 2.  **Describe the Pipeline**: Deserialize a `PipelineDefinition` from JSON, build it
//!     in code, or convert an editor document with the `IntoPipeline` trait.
//! 3.  **Run**: Hand both to an `Executor`. Nodes execute one at a time in topological
//!     order and the first failure aborts the run.
//! 4.  **Read the Results**: The returned `ResultsMap` holds the `metrics` and `preview`
//!     of every node that produced one, keyed by node id.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nodeflow::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = Config::default().with_data_dir("backend/data");
//!     let registry = NodeRegistry::with_builtin_nodes(&config);
//!
//!     let pipeline = PipelineDefinition::new(
//!         vec![
//!             NodeDefinition::new("source", "data_source").with_param("city", "houston"),
//!             NodeDefinition::new("prep", "preprocess").with_param("scaler", "minmax"),
//!             NodeDefinition::new("model", "xgboost").with_param("n_estimators", 50),
//!         ],
//!         vec![
//!             EdgeDefinition::new("source", "prep"),
//!             EdgeDefinition::new("prep", "model"),
//!         ],
//!     );
//!
//!     let results = Executor::new(&registry).run(&pipeline)?;
//!     if let Some(model) = results.get("model") {
//!         println!("metrics: {}", model.metrics.as_ref().unwrap_or(&serde_json::Value::Null));
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod executor;
pub mod graph;
pub mod node;
pub mod nodes;
pub mod pipeline;
pub mod prelude;
pub mod registry;

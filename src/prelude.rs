//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the nodeflow crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use nodeflow::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let pipeline_json = std::fs::read_to_string("path/to/pipeline.json")?;
//! let pipeline = PipelineDefinition::from_json(&pipeline_json)?;
//!
//! let registry = NodeRegistry::with_builtin_nodes(&Config::default());
//! let results = Executor::new(&registry).run(&pipeline)?;
//!
//! println!("{}", results.to_json());
//! # Ok(())
//! # }
//! ```

// Execution
pub use crate::executor::{Executor, PipelineRun};
pub use crate::registry::{NodeFactory, NodeRegistry};

// Pipeline description
pub use crate::pipeline::{
    CanvasDocument, EdgeDefinition, IntoPipeline, NodeDefinition, NodeResult,
    PipelineDefinition, ResultsMap,
};

// Node contract
pub use crate::data::{Payload, PortData};
pub use crate::node::{Node, NodeMetadata, OutputBag, ParameterSpec, Params, PortMap, PortSpec};

// Configuration
pub use crate::config::Config;

// Error types
pub use crate::error::{GraphError, NodeError, PipelineError, RegistryError};

// Result type alias for convenience
pub type Result<T, E = Box<dyn std::error::Error>> = std::result::Result<T, E>;

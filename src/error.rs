use thiserror::Error;

/// Errors raised while validating or ordering a pipeline graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Pipeline contains a cycle involving nodes: {}", remaining.join(", "))]
    Cycle { remaining: Vec<String> },

    #[error("Node id '{0}' is defined more than once in the pipeline")]
    DuplicateNodeId(String),
}

/// Errors raised by the node registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),
}

/// Errors a node may raise from its `execute` call.
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Missing required input on port '{0}'")]
    MissingInput(String),

    #[error("Input on port '{port}' has the wrong kind: expected {expected}, found {found}")]
    InputKind {
        port: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid value for parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors that abort a pipeline run.
///
/// The variants let callers tell a structural graph problem apart from a
/// missing registration or a failing node without inspecting messages.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Node '{node_id}' references an unknown node type: '{node_type}'")]
    UnknownNodeType { node_id: String, node_type: String },

    #[error("Node '{node_id}' ({node_type}) failed: {source}")]
    NodeFailed {
        node_id: String,
        node_type: String,
        #[source]
        source: NodeError,
    },
}

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors that can occur when converting an editor document into a `PipelineDefinition`.
#[derive(Error, Debug, Clone)]
pub enum PipelineConversionError {
    #[error("Invalid canvas data: {0}")]
    ValidationError(String),
}

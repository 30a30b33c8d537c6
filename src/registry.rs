//! Mapping from node-type identifiers to node factories.

use crate::config::Config;
use crate::error::RegistryError;
use crate::node::{Node, NodeMetadata};
use crate::nodes;
use ahash::AHashMap;
use std::sync::Arc;
use tracing::debug;

/// Builds a fresh node instance.
pub type NodeFactory = Arc<dyn Fn() -> Box<dyn Node> + Send + Sync>;

/// Associates node types with constructible implementations.
///
/// A registry is built once, before any run, and then shared by reference with
/// the executor and metadata queries. Registration order is preserved for
/// [`list_all_metadata`](NodeRegistry::list_all_metadata).
#[derive(Clone, Default)]
pub struct NodeRegistry {
    entries: Vec<(String, NodeFactory)>,
    index: AHashMap<String, usize>,
}

impl NodeRegistry {
    /// Creates an empty registry. Every lookup fails until something is registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in node.
    pub fn with_builtin_nodes(config: &Config) -> Self {
        let mut registry = Self::new();
        registry.discover_all(config);
        registry
    }

    /// Registers the built-in nodes: data source, preprocessing and the two models.
    pub fn discover_all(&mut self, config: &Config) {
        nodes::register_builtin(self, config);
    }

    /// Registers a node type that can be built with `Default`.
    pub fn register<N: Node + Default + 'static>(&mut self) -> &mut Self {
        self.register_factory(|| Box::new(N::default()) as Box<dyn Node>)
    }

    /// Registers a factory under the `node_type` reported by the node it builds.
    ///
    /// A later registration for the same type replaces the earlier factory and
    /// keeps its position.
    pub fn register_factory<F>(&mut self, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Node> + Send + Sync + 'static,
    {
        let node_type = factory().node_type().to_string();
        self.insert(node_type, Arc::new(factory));
        self
    }

    /// Makes `alias` resolve to the factory already registered for `node_type`.
    pub fn with_type_mapping(&mut self, alias: &str, node_type: &str) -> Result<&mut Self, RegistryError> {
        let factory = self.get(node_type)?.clone();
        self.insert(alias.to_string(), factory);
        Ok(self)
    }

    fn insert(&mut self, node_type: String, factory: NodeFactory) {
        match self.index.get(&node_type) {
            Some(&i) => {
                debug!(node_type = %node_type, "replacing registered node type");
                self.entries[i].1 = factory;
            }
            None => {
                debug!(node_type = %node_type, "registered node type");
                self.index.insert(node_type.clone(), self.entries.len());
                self.entries.push((node_type, factory));
            }
        }
    }

    /// Looks up the factory for a node type.
    pub fn get(&self, node_type: &str) -> Result<&NodeFactory, RegistryError> {
        self.index
            .get(node_type)
            .map(|&i| &self.entries[i].1)
            .ok_or_else(|| RegistryError::UnknownNodeType(node_type.to_string()))
    }

    /// Builds a fresh instance of a node type.
    pub fn create(&self, node_type: &str) -> Result<Box<dyn Node>, RegistryError> {
        self.get(node_type).map(|factory| factory())
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.index.contains_key(node_type)
    }

    /// Registered keys in registration order.
    pub fn node_types(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Metadata for every registered type, in registration order.
    ///
    /// Each entry comes from a freshly built instance.
    pub fn list_all_metadata(&self) -> Vec<NodeMetadata> {
        self.entries
            .iter()
            .map(|(_, factory)| factory().metadata())
            .collect()
    }
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("node_types", &self.node_types().collect::<Vec<_>>())
            .finish()
    }
}

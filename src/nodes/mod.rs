//! Built-in nodes for the weather forecasting pipeline.

use crate::config::Config;
use crate::data::{FeatureSet, SplitTable};
use crate::error::NodeError;
use crate::node::{Node, PortMap, require_input};
use crate::registry::NodeRegistry;

mod autoencoder;
mod data_source;
mod preprocess;
mod xgboost;

pub use autoencoder::AutoencoderNode;
pub use data_source::{DataSourceNode, list_cities};
pub use preprocess::{FEATURE_COLUMNS, PreprocessNode};
pub use xgboost::XGBoostNode;

/// Seed used by every stochastic node so that repeated runs agree.
pub const RANDOM_SEED: u64 = 42;

/// Registers the data source, preprocessing, autoencoder and XGBoost nodes.
pub fn register_builtin(registry: &mut NodeRegistry, config: &Config) {
    let data_dir = config.data_dir.clone();
    registry
        .register_factory(move || Box::new(DataSourceNode::new(data_dir.clone())) as Box<dyn Node>)
        .register::<PreprocessNode>()
        .register::<AutoencoderNode>()
        .register::<XGBoostNode>();
}

fn split_input(inputs: &PortMap) -> Result<&SplitTable, NodeError> {
    let data = require_input(inputs, "input")?;
    data.as_split().ok_or_else(|| NodeError::InputKind {
        port: "input".to_string(),
        expected: "split table",
        found: data.kind(),
    })
}

fn features_input(inputs: &PortMap) -> Result<&FeatureSet, NodeError> {
    let data = require_input(inputs, "input")?;
    data.as_features().ok_or_else(|| NodeError::InputKind {
        port: "input".to_string(),
        expected: "features",
        found: data.kind(),
    })
}

/// Rounds to a fixed number of decimal places for reporting.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_to(1.23456, 4), 1.2346);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(0.1234567, 6), 0.123457);
    }
}

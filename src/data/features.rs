use ndarray::{Array1, Array2};
use serde::Serialize;

/// How a feature matrix was scaled, with the statistics fitted on the training split.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FittedScaler {
    Standard { mean: Vec<f32>, scale: Vec<f32> },
    MinMax { min: Vec<f32>, scale: Vec<f32> },
}

/// Train/test feature matrices with their regression targets.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub train_x: Array2<f32>,
    pub test_x: Array2<f32>,
    pub train_y: Array1<f32>,
    pub test_y: Array1<f32>,
    pub feature_names: Vec<String>,
    pub train_dates: Option<Vec<String>>,
    pub test_dates: Option<Vec<String>>,
    pub scaler: Option<FittedScaler>,
}

impl FeatureSet {
    pub fn n_features(&self) -> usize {
        self.train_x.ncols()
    }
}

/// Model predictions on both splits, plus the held-out targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Predictions {
    pub train_pred: Array1<f32>,
    pub test_pred: Array1<f32>,
    pub test_actual: Array1<f32>,
}

use super::{RANDOM_SEED, features_input, round_to};
use crate::data::Predictions;
use crate::error::NodeError;
use crate::node::{Node, OutputBag, ParameterSpec, Params, PortMap, PortSpec};
use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView1};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Map, Value as JsonValue, json};
use tracing::debug;

/// L2 regularisation on leaf weights.
const LAMBDA: f64 = 1.0;
/// Approximate number of points reported in `chart_data`.
const CHART_POINTS: usize = 100;

/// Gradient-boosted regression trees fitted to each row's maximum temperature.
#[derive(Default)]
pub struct XGBoostNode;

impl Node for XGBoostNode {
    fn node_type(&self) -> &str {
        "xgboost"
    }

    fn display_name(&self) -> &str {
        "XGBoost"
    }

    fn category(&self) -> &str {
        "model"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("input", "features")]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("output", "predictions")]
    }

    fn parameter_schema(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::slider("n_estimators", 100, 10.0, 500.0, 10.0),
            ParameterSpec::slider("max_depth", 6, 2.0, 15.0, 1.0),
            ParameterSpec::slider("learning_rate", 0.1, 0.01, 0.3, 0.01),
            ParameterSpec::slider("subsample", 0.8, 0.5, 1.0, 0.05),
        ]
    }

    fn execute(&self, inputs: &PortMap, params: &Params<'_>) -> Result<OutputBag, NodeError> {
        let data = features_input(inputs)?;
        let config = BoosterConfig {
            n_estimators: params.usize_in("n_estimators", 100, 10..=500)?,
            max_depth: params.usize_in("max_depth", 6, 2..=15)?,
            learning_rate: params.f64_or("learning_rate", 0.1)?,
            subsample: params.f64_or("subsample", 0.8)?,
        };
        if !(config.subsample > 0.0 && config.subsample <= 1.0) {
            return Err(NodeError::InvalidParameter {
                name: "subsample".to_string(),
                message: format!("{} is outside (0, 1]", config.subsample),
            });
        }
        if data.train_x.nrows() == 0 {
            return Err(NodeError::InvalidData("training split is empty".to_string()));
        }
        if data.train_x.nrows() != data.train_y.len() || data.test_x.nrows() != data.test_y.len() {
            return Err(NodeError::InvalidData(
                "feature rows and targets have different lengths".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
        let model = Booster::fit(&data.train_x, &data.train_y, &config, &mut rng);
        debug!(trees = model.trees.len(), "boosted trees fitted");

        let train_pred = model.predict(&data.train_x);
        let test_pred = model.predict(&data.test_x);

        let metrics = json!({
            "train_rmse": round_to(rmse(&data.train_y, &train_pred), 4),
            "test_rmse": round_to(rmse(&data.test_y, &test_pred), 4),
            "test_mae": round_to(mae(&data.test_y, &test_pred), 4),
            "test_r2": round_to(r2_score(&data.test_y, &test_pred), 4),
            "chart_data": chart_data(&data.test_y, &test_pred, data.test_dates.as_deref()),
        });

        let predictions = Predictions {
            train_pred,
            test_pred,
            test_actual: data.test_y.clone(),
        };
        Ok(OutputBag::new()
            .with_output("output", predictions)
            .with_metrics(metrics))
    }
}

/// Samples actual vs predicted values for plotting, labelled by date when known.
fn chart_data(actual: &Array1<f32>, predicted: &Array1<f32>, dates: Option<&[String]>) -> Vec<JsonValue> {
    let step = (actual.len() / CHART_POINTS).max(1);
    (0..actual.len())
        .step_by(step)
        .map(|i| {
            let mut entry = Map::new();
            entry.insert("actual".into(), json!(round_to(actual[i] as f64, 2)));
            entry.insert("predicted".into(), json!(round_to(predicted[i] as f64, 2)));
            match dates.and_then(|d| d.get(i)) {
                Some(date) => {
                    entry.insert("date".into(), json!(date.chars().take(10).collect::<String>()))
                }
                None => entry.insert("index".into(), json!(i)),
            };
            JsonValue::Object(entry)
        })
        .collect()
}

fn rmse(actual: &Array1<f32>, predicted: &Array1<f32>) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(&a, &p)| (a as f64 - p as f64).powi(2))
        .sum();
    (sum / actual.len() as f64).sqrt()
}

fn mae(actual: &Array1<f32>, predicted: &Array1<f32>) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(&a, &p)| (a as f64 - p as f64).abs())
        .sum();
    sum / actual.len() as f64
}

/// Coefficient of determination. A constant target scores 1 when predicted
/// exactly and 0 otherwise.
fn r2_score(actual: &Array1<f32>, predicted: &Array1<f32>) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().map(|&a| a as f64).sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|&a| (a as f64 - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(&a, &p)| (a as f64 - p as f64).powi(2))
        .sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

struct BoosterConfig {
    n_estimators: usize,
    max_depth: usize,
    learning_rate: f64,
    subsample: f64,
}

enum TreeNode {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
}

/// A regression tree stored as a flat node list; index 0 is the root.
struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    fn predict_row(&self, row: ArrayView1<f32>) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                TreeNode::Leaf(value) => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if row[feature] < threshold { left } else { right },
            }
        }
    }
}

/// Builds one tree on squared-error gradients (unit hessians) with exact greedy splits.
struct TreeBuilder<'a> {
    x: &'a Array2<f32>,
    grad: &'a [f64],
    max_depth: usize,
    nodes: Vec<TreeNode>,
}

struct SplitCandidate {
    gain: f64,
    feature: usize,
    threshold: f32,
}

impl<'a> TreeBuilder<'a> {
    fn build(mut self, rows: Vec<usize>) -> Tree {
        self.grow(rows, 0);
        Tree { nodes: self.nodes }
    }

    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let idx = self.nodes.len();
        let g_sum: f64 = rows.iter().map(|&r| self.grad[r]).sum();
        let weight = -g_sum / (rows.len() as f64 + LAMBDA);
        self.nodes.push(TreeNode::Leaf(weight));

        if depth >= self.max_depth || rows.len() < 2 {
            return idx;
        }
        let Some(best) = self.best_split(&rows, g_sum) else {
            return idx;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| self.x[[r, best.feature]] < best.threshold);
        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[idx] = TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        idx
    }

    fn best_split(&self, rows: &[usize], g_sum: f64) -> Option<SplitCandidate> {
        let n = rows.len() as f64;
        let parent_score = g_sum * g_sum / (n + LAMBDA);
        let mut best: Option<SplitCandidate> = None;

        for feature in 0..self.x.ncols() {
            let sorted = rows
                .iter()
                .map(|&r| (self.x[[r, feature]], self.grad[r]))
                .sorted_by(|a, b| a.0.total_cmp(&b.0))
                .collect_vec();

            let mut g_left = 0.0;
            for (i, window) in sorted.windows(2).enumerate() {
                g_left += window[0].1;
                if window[0].0 == window[1].0 {
                    continue;
                }
                let n_left = (i + 1) as f64;
                let n_right = n - n_left;
                let g_right = g_sum - g_left;
                let gain = 0.5
                    * (g_left * g_left / (n_left + LAMBDA) + g_right * g_right / (n_right + LAMBDA)
                        - parent_score);
                if gain > 0.0 && best.as_ref().is_none_or(|b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        gain,
                        feature,
                        threshold: (window[0].0 + window[1].0) / 2.0,
                    });
                }
            }
        }
        best
    }
}

/// An additive ensemble of regression trees around a constant base score.
struct Booster {
    base_score: f64,
    learning_rate: f64,
    trees: Vec<Tree>,
}

impl Booster {
    fn fit(x: &Array2<f32>, y: &Array1<f32>, config: &BoosterConfig, rng: &mut StdRng) -> Self {
        let n = x.nrows();
        let base_score = y.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
        let mut margin = vec![base_score; n];
        let sample_size = ((n as f64 * config.subsample).ceil() as usize).clamp(1, n);
        let mut trees = Vec::new();

        for _ in 0..config.n_estimators {
            let grad: Vec<f64> = margin
                .iter()
                .zip(y)
                .map(|(&m, &target)| m - target as f64)
                .collect();
            let rows = if sample_size < n {
                rand::seq::index::sample(rng, n, sample_size).into_vec()
            } else {
                (0..n).collect()
            };

            let tree = TreeBuilder {
                x,
                grad: &grad,
                max_depth: config.max_depth,
                nodes: Vec::new(),
            }
            .build(rows);

            for (i, m) in margin.iter_mut().enumerate() {
                *m += config.learning_rate * tree.predict_row(x.row(i));
            }
            trees.push(tree);
        }

        Self {
            base_score,
            learning_rate: config.learning_rate,
            trees,
        }
    }

    fn predict(&self, x: &Array2<f32>) -> Array1<f32> {
        x.rows()
            .into_iter()
            .map(|row| {
                let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
                (self.base_score + self.learning_rate * sum) as f32
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn boosting_fits_a_step_function() {
        let x = Array2::from_shape_fn((40, 1), |(i, _)| i as f32);
        let y: Array1<f32> = (0..40).map(|i| if i < 20 { 0.0 } else { 10.0 }).collect();
        let config = BoosterConfig {
            n_estimators: 50,
            max_depth: 2,
            learning_rate: 0.3,
            subsample: 1.0,
        };
        let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
        let model = Booster::fit(&x, &y, &config, &mut rng);
        let pred = model.predict(&x);
        assert!(rmse(&y, &pred) < 0.5);
    }

    #[test]
    fn regression_metrics() {
        let actual = array![1.0f32, 2.0, 3.0];
        let perfect = actual.clone();
        assert_eq!(rmse(&actual, &perfect), 0.0);
        assert_eq!(r2_score(&actual, &perfect), 1.0);

        let off = array![2.0f32, 3.0, 4.0];
        assert_eq!(mae(&actual, &off), 1.0);
        assert_eq!(rmse(&actual, &off), 1.0);
        assert_eq!(r2_score(&actual, &off), -0.5);

        let constant = array![5.0f32, 5.0];
        assert_eq!(r2_score(&constant, &array![5.0f32, 4.0]), 0.0);
    }

    #[test]
    fn chart_data_labels_with_dates_or_indices() {
        let actual = array![1.234f32, 2.0];
        let predicted = array![1.0f32, 2.556];
        let dates = vec!["2024-03-01 00:00:00".to_string(), "2024-03-02".to_string()];

        let dated = chart_data(&actual, &predicted, Some(&dates));
        assert_eq!(dated[0]["date"], "2024-03-01");
        assert_eq!(dated[0]["actual"], 1.23);
        assert_eq!(dated[1]["predicted"], 2.56);

        let indexed = chart_data(&actual, &predicted, None);
        assert_eq!(indexed[1]["index"], 1);
    }
}

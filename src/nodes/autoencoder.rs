use super::{RANDOM_SEED, features_input, round_to};
use crate::data::FeatureSet;
use crate::error::NodeError;
use crate::node::{Node, OutputBag, ParameterSpec, Params, PortMap, PortSpec};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tracing::debug;

const BETA1: f32 = 0.9;
const BETA2: f32 = 0.999;
const EPSILON: f32 = 1e-8;
/// Approximate number of points reported in `loss_curve`.
const LOSS_CURVE_POINTS: usize = 20;

/// Compresses the feature matrices through a small dense autoencoder and
/// passes the latent codes downstream.
#[derive(Default)]
pub struct AutoencoderNode;

impl Node for AutoencoderNode {
    fn node_type(&self) -> &str {
        "autoencoder"
    }

    fn display_name(&self) -> &str {
        "Autoencoder"
    }

    fn category(&self) -> &str {
        "model"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("input", "processed")]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("output", "encoded")]
    }

    fn parameter_schema(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::slider("latent_dim", 5, 2.0, 15.0, 1.0),
            ParameterSpec::slider("epochs", 50, 10.0, 200.0, 10.0),
            ParameterSpec::slider("learning_rate", 0.001, 0.0001, 0.01, 0.0001),
            ParameterSpec::slider("batch_size", 32, 8.0, 128.0, 8.0),
        ]
    }

    fn execute(&self, inputs: &PortMap, params: &Params<'_>) -> Result<OutputBag, NodeError> {
        let data = features_input(inputs)?;
        let latent_dim = params.usize_in("latent_dim", 5, 2..=15)?;
        let epochs = params.usize_in("epochs", 50, 10..=200)?;
        let batch_size = params.usize_in("batch_size", 32, 8..=128)?;
        let learning_rate = params.f64_or("learning_rate", 0.001)?;
        if learning_rate <= 0.0 {
            return Err(NodeError::InvalidParameter {
                name: "learning_rate".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if data.train_x.nrows() == 0 || data.train_x.ncols() == 0 {
            return Err(NodeError::InvalidData(
                "autoencoder needs a non-empty training matrix".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
        let mut model = Autoencoder::new(data.train_x.ncols(), latent_dim, &mut rng);
        let losses = model.fit(
            &data.train_x,
            epochs,
            batch_size,
            learning_rate as f32,
            &mut rng,
        );

        let train_encoded = model.encode(&data.train_x);
        let test_encoded = model.encode(&data.test_x);
        let test_loss = if data.test_x.nrows() > 0 {
            mse(&model.decode(&test_encoded), &data.test_x)
        } else {
            0.0
        };

        let final_loss = losses.last().copied().unwrap_or(0.0);
        let stride = (losses.len() / LOSS_CURVE_POINTS).max(1);
        let loss_curve: Vec<f64> = losses
            .iter()
            .step_by(stride)
            .map(|&l| round_to(l, 6))
            .collect();
        debug!(final_loss, test_loss, "autoencoder trained");

        let metrics = json!({
            "final_train_loss": round_to(final_loss, 6),
            "test_reconstruction_loss": round_to(test_loss, 6),
            "latent_dim": latent_dim,
            "epochs_trained": epochs,
            "loss_curve": loss_curve,
        });

        let encoded = FeatureSet {
            train_x: train_encoded,
            test_x: test_encoded,
            train_y: data.train_y.clone(),
            test_y: data.test_y.clone(),
            feature_names: (0..latent_dim).map(|i| format!("latent_{}", i)).collect(),
            train_dates: data.train_dates.clone(),
            test_dates: data.test_dates.clone(),
            scaler: None,
        };

        Ok(OutputBag::new()
            .with_output("output", encoded)
            .with_metrics(metrics))
    }
}

fn mse(prediction: &Array2<f32>, target: &Array2<f32>) -> f64 {
    let diff = prediction - target;
    diff.iter().map(|&d| (d as f64) * (d as f64)).sum::<f64>() / diff.len().max(1) as f64
}

/// Fully connected layer with its Adam moment estimates.
struct Dense {
    weight: Array2<f32>,
    bias: Array1<f32>,
    m_weight: Array2<f32>,
    v_weight: Array2<f32>,
    m_bias: Array1<f32>,
    v_bias: Array1<f32>,
    relu: bool,
}

impl Dense {
    /// Uniform initialisation in `±1/sqrt(fan_in)`.
    fn new(fan_in: usize, fan_out: usize, relu: bool, rng: &mut StdRng) -> Self {
        let bound = 1.0 / (fan_in as f32).sqrt();
        let weight = Array2::from_shape_fn((fan_in, fan_out), |_| rng.random_range(-bound..bound));
        let bias = Array1::from_shape_fn(fan_out, |_| rng.random_range(-bound..bound));
        Self {
            m_weight: Array2::zeros((fan_in, fan_out)),
            v_weight: Array2::zeros((fan_in, fan_out)),
            m_bias: Array1::zeros(fan_out),
            v_bias: Array1::zeros(fan_out),
            weight,
            bias,
            relu,
        }
    }

    /// Returns the pre-activation and the activated output.
    fn forward(&self, x: &Array2<f32>) -> (Array2<f32>, Array2<f32>) {
        let pre = x.dot(&self.weight) + &self.bias;
        let out = if self.relu {
            pre.mapv(|v| v.max(0.0))
        } else {
            pre.clone()
        };
        (pre, out)
    }

    /// Back-propagates `grad_out`, applies one Adam step and returns the
    /// gradient with respect to the layer input.
    fn backward(
        &mut self,
        input: &Array2<f32>,
        pre: &Array2<f32>,
        grad_out: Array2<f32>,
        step: u64,
        lr: f32,
    ) -> Array2<f32> {
        let grad_pre = if self.relu {
            let mask = pre.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
            grad_out * mask
        } else {
            grad_out
        };
        let grad_weight = input.t().dot(&grad_pre);
        let grad_bias = grad_pre.sum_axis(Axis(0));
        let grad_input = grad_pre.dot(&self.weight.t());

        let exponent = i32::try_from(step).unwrap_or(i32::MAX);
        let bias_correction1 = 1.0 - BETA1.powi(exponent);
        let bias_correction2 = 1.0 - BETA2.powi(exponent);
        adam_update(
            &mut self.weight,
            &mut self.m_weight,
            &mut self.v_weight,
            &grad_weight,
            lr,
            bias_correction1,
            bias_correction2,
        );
        adam_update(
            &mut self.bias,
            &mut self.m_bias,
            &mut self.v_bias,
            &grad_bias,
            lr,
            bias_correction1,
            bias_correction2,
        );
        grad_input
    }
}

fn adam_update<D: ndarray::Dimension>(
    param: &mut ndarray::Array<f32, D>,
    m: &mut ndarray::Array<f32, D>,
    v: &mut ndarray::Array<f32, D>,
    grad: &ndarray::Array<f32, D>,
    lr: f32,
    bias_correction1: f32,
    bias_correction2: f32,
) {
    ndarray::Zip::from(param)
        .and(m)
        .and(v)
        .and(grad)
        .for_each(|p, m, v, &g| {
            *m = BETA1 * *m + (1.0 - BETA1) * g;
            *v = BETA2 * *v + (1.0 - BETA2) * g * g;
            let m_hat = *m / bias_correction1;
            let v_hat = *v / bias_correction2;
            *p -= lr * m_hat / (v_hat.sqrt() + EPSILON);
        });
}

/// `input → mid → latent → mid → input`, ReLU on every layer but the last.
struct Autoencoder {
    layers: [Dense; 4],
}

impl Autoencoder {
    fn new(input_dim: usize, latent_dim: usize, rng: &mut StdRng) -> Self {
        let mid = (latent_dim + 2).max((input_dim + latent_dim) / 2);
        Self {
            layers: [
                Dense::new(input_dim, mid, true, rng),
                Dense::new(mid, latent_dim, true, rng),
                Dense::new(latent_dim, mid, true, rng),
                Dense::new(mid, input_dim, false, rng),
            ],
        }
    }

    fn encode(&self, x: &Array2<f32>) -> Array2<f32> {
        let (_, hidden) = self.layers[0].forward(x);
        self.layers[1].forward(&hidden).1
    }

    fn decode(&self, z: &Array2<f32>) -> Array2<f32> {
        let (_, hidden) = self.layers[2].forward(z);
        self.layers[3].forward(&hidden).1
    }

    /// Trains on shuffled mini-batches with a mean-squared reconstruction loss.
    /// Returns the sample-weighted mean loss of each epoch.
    fn fit(
        &mut self,
        x: &Array2<f32>,
        epochs: usize,
        batch_size: usize,
        lr: f32,
        rng: &mut StdRng,
    ) -> Vec<f64> {
        let n = x.nrows();
        let mut indices: Vec<usize> = (0..n).collect();
        let mut losses = Vec::new();
        let mut step: u64 = 0;

        for _ in 0..epochs {
            indices.shuffle(rng);
            let mut epoch_loss = 0.0;
            for batch_idx in indices.chunks(batch_size) {
                step += 1;
                let batch = x.select(Axis(0), batch_idx);
                epoch_loss += self.train_step(&batch, step, lr) * batch_idx.len() as f64;
            }
            losses.push(epoch_loss / n as f64);
        }
        losses
    }

    fn train_step(&mut self, batch: &Array2<f32>, step: u64, lr: f32) -> f64 {
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        let mut pre_activations = Vec::with_capacity(self.layers.len());
        activations.push(batch.clone());
        for layer in &self.layers {
            let (pre, out) = layer.forward(activations.last().unwrap_or(batch));
            pre_activations.push(pre);
            activations.push(out);
        }

        let output = &activations[self.layers.len()];
        let loss = mse(output, batch);
        let scale = 2.0 / output.len() as f32;
        let mut grad = (output - batch) * scale;

        for i in (0..self.layers.len()).rev() {
            grad = self.layers[i].backward(&activations[i], &pre_activations[i], grad, step, lr);
        }
        loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_data() -> Array2<f32> {
        Array2::from_shape_fn((64, 6), |(i, j)| ((i * (j + 1)) % 7) as f32 / 7.0)
    }

    #[test]
    fn training_reduces_reconstruction_loss() {
        let x = toy_data();
        let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
        let mut model = Autoencoder::new(6, 3, &mut rng);
        let losses = model.fit(&x, 60, 16, 0.01, &mut rng);
        assert_eq!(losses.len(), 60);
        assert!(losses.last().unwrap() < losses.first().unwrap());
    }

    #[test]
    fn encode_has_latent_width() {
        let x = toy_data();
        let mut rng = StdRng::seed_from_u64(1);
        let model = Autoencoder::new(6, 2, &mut rng);
        let z = model.encode(&x);
        assert_eq!(z.dim(), (64, 2));
        assert!(z.iter().all(|&v| v >= 0.0));
        assert_eq!(model.decode(&z).dim(), (64, 6));
    }
}

use super::split_input;
use crate::data::{Column, FeatureSet, FittedScaler, Table};
use crate::error::NodeError;
use crate::node::{Node, OutputBag, ParameterSpec, Params, PortMap, PortSpec};
use ndarray::{Array1, Array2, Axis};
use serde_json::json;

/// Weather columns used as model features.
pub const FEATURE_COLUMNS: [&str; 10] = [
    "temp_max",
    "temp_min",
    "precipitation",
    "rain",
    "snowfall",
    "wind_speed",
    "wind_gusts",
    "radiation",
    "sunshine",
    "weather_code",
];

/// Columns that get lagged copies when lag features are requested.
const LAG_COLUMNS: [&str; 3] = ["temp_max", "temp_min", "precipitation"];
const TARGET_COLUMN: &str = "temp_max";
const DATE_COLUMN: &str = "date";

const SCALERS: [&str; 3] = ["standard", "minmax", "none"];
const FILL_METHODS: [&str; 4] = ["interpolate", "ffill", "mean", "zero"];

/// Fills gaps, adds lag features and scales the weather table into model-ready matrices.
#[derive(Default)]
pub struct PreprocessNode;

impl Node for PreprocessNode {
    fn node_type(&self) -> &str {
        "preprocess"
    }

    fn display_name(&self) -> &str {
        "Preprocess"
    }

    fn category(&self) -> &str {
        "preprocess"
    }

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("input", "dataframe")]
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("output", "processed")]
    }

    fn parameter_schema(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::select("scaler", "standard", SCALERS),
            ParameterSpec::select("fill_method", "interpolate", FILL_METHODS),
            ParameterSpec::slider("add_lag_features", 3, 0.0, 7.0, 1.0),
        ]
    }

    fn execute(&self, inputs: &PortMap, params: &Params<'_>) -> Result<OutputBag, NodeError> {
        let split = split_input(inputs)?;
        let scaler_kind = params.choice_or("scaler", "standard", &SCALERS)?;
        let fill_method = params.choice_or("fill_method", "interpolate", &FILL_METHODS)?;
        let lag_days = params.usize_or("add_lag_features", 3)?;

        let mut feature_names: Vec<String> = FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect();
        for lag in 1..=lag_days {
            for col in LAG_COLUMNS {
                feature_names.push(format!("{}_lag{}", col, lag));
            }
        }

        let train = prepare_split(&split.train, fill_method, lag_days)?;
        let test = prepare_split(&split.test, fill_method, lag_days)?;
        if train.is_empty() {
            return Err(NodeError::InvalidData(
                "training split has no rows after preprocessing".to_string(),
            ));
        }

        let mut train_x = feature_matrix(&train, &feature_names)?;
        let mut test_x = feature_matrix(&test, &feature_names)?;

        let scaler = match scaler_kind {
            "standard" => Some(fit_standard(&train_x)),
            "minmax" => Some(fit_minmax(&train_x)),
            _ => None,
        };
        if let Some(scaler) = &scaler {
            apply_scaler(scaler, &mut train_x);
            apply_scaler(scaler, &mut test_x);
        }

        let preview = json!({
            "train_samples": train_x.nrows(),
            "test_samples": test_x.nrows(),
            "n_features": train_x.ncols(),
            "feature_names": feature_names,
        });

        let features = FeatureSet {
            train_y: target(&train)?,
            test_y: target(&test)?,
            train_dates: train.text(DATE_COLUMN).map(<[String]>::to_vec),
            test_dates: test.text(DATE_COLUMN).map(<[String]>::to_vec),
            train_x,
            test_x,
            feature_names,
            scaler,
        };

        Ok(OutputBag::new()
            .with_output("output", features)
            .with_preview(preview))
    }
}

/// Fills missing feature values, appends lag columns and drops incomplete rows.
fn prepare_split(table: &Table, fill_method: &str, lag_days: usize) -> Result<Table, NodeError> {
    let mut table = table.clone();
    for name in FEATURE_COLUMNS {
        let values = table
            .numeric(name)
            .ok_or_else(|| NodeError::InvalidData(format!("missing numeric column '{}'", name)))?;
        let mut filled = fill_missing(values, fill_method);
        backward_fill(&mut filled);
        forward_fill(&mut filled);
        for x in filled.iter_mut().filter(|x| x.is_nan()) {
            *x = 0.0;
        }
        table.set_column(name, Column::Numeric(filled))?;
    }

    if lag_days == 0 {
        return Ok(table);
    }

    for lag in 1..=lag_days {
        for name in LAG_COLUMNS {
            let shifted = table.numeric(name).map(|v| shift(v, lag)).unwrap_or_default();
            table.set_column(&format!("{}_lag{}", name, lag), Column::Numeric(shifted))?;
        }
    }

    let complete: Vec<usize> = (0..table.len())
        .filter(|&row| {
            table.column_names().iter().all(|name| match table.column(name) {
                Some(Column::Numeric(v)) => !v[row].is_nan(),
                _ => true,
            })
        })
        .collect();
    Ok(table.select_rows(&complete))
}

fn fill_missing(values: &[f64], method: &str) -> Vec<f64> {
    let mut out = values.to_vec();
    match method {
        "interpolate" => interpolate_linear(&mut out),
        "ffill" => forward_fill(&mut out),
        "mean" => {
            let present: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
            if !present.is_empty() {
                let mean = present.iter().sum::<f64>() / present.len() as f64;
                for x in out.iter_mut().filter(|x| x.is_nan()) {
                    *x = mean;
                }
            }
        }
        _ => {
            for x in out.iter_mut().filter(|x| x.is_nan()) {
                *x = 0.0;
            }
        }
    }
    out
}

/// Linear interpolation between known points. Gaps after the last known value
/// take that value; gaps before the first known value are left missing.
fn interpolate_linear(values: &mut [f64]) {
    let mut last_known: Option<usize> = None;
    for i in 0..values.len() {
        if values[i].is_nan() {
            continue;
        }
        if let Some(prev) = last_known {
            let gap = i - prev;
            if gap > 1 {
                let (a, b) = (values[prev], values[i]);
                for j in prev + 1..i {
                    let t = (j - prev) as f64 / gap as f64;
                    values[j] = a + (b - a) * t;
                }
            }
        }
        last_known = Some(i);
    }
    if let Some(last) = last_known {
        let fill = values[last];
        for x in values[last + 1..].iter_mut() {
            *x = fill;
        }
    }
}

fn forward_fill(values: &mut [f64]) {
    let mut last = f64::NAN;
    for x in values.iter_mut() {
        if x.is_nan() {
            *x = last;
        } else {
            last = *x;
        }
    }
}

fn backward_fill(values: &mut [f64]) {
    let mut next = f64::NAN;
    for x in values.iter_mut().rev() {
        if x.is_nan() {
            *x = next;
        } else {
            next = *x;
        }
    }
}

/// Delays a series by `lag` rows; the first `lag` entries become missing.
fn shift(values: &[f64], lag: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| if i >= lag { values[i - lag] } else { f64::NAN })
        .collect()
}

fn feature_matrix(table: &Table, names: &[String]) -> Result<Array2<f32>, NodeError> {
    let mut matrix = Array2::<f32>::zeros((table.len(), names.len()));
    for (j, name) in names.iter().enumerate() {
        let values = table
            .numeric(name)
            .ok_or_else(|| NodeError::InvalidData(format!("missing feature column '{}'", name)))?;
        for (i, &v) in values.iter().enumerate() {
            matrix[[i, j]] = v as f32;
        }
    }
    Ok(matrix)
}

fn target(table: &Table) -> Result<Array1<f32>, NodeError> {
    table
        .numeric(TARGET_COLUMN)
        .map(|v| v.iter().map(|&x| x as f32).collect())
        .ok_or_else(|| NodeError::InvalidData(format!("missing target column '{}'", TARGET_COLUMN)))
}

/// Zero-mean, unit-variance scaling with population statistics. Constant
/// columns keep a scale of one.
fn fit_standard(x: &Array2<f32>) -> FittedScaler {
    let n = x.nrows() as f64;
    let mut mean = Vec::with_capacity(x.ncols());
    let mut scale = Vec::with_capacity(x.ncols());
    for column in x.axis_iter(Axis(1)) {
        let m = column.iter().map(|&v| v as f64).sum::<f64>() / n;
        let var = column.iter().map(|&v| (v as f64 - m).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();
        mean.push(m as f32);
        scale.push(if std > 0.0 { std as f32 } else { 1.0 });
    }
    FittedScaler::Standard { mean, scale }
}

/// Scales each column into `[0, 1]` using the training range.
fn fit_minmax(x: &Array2<f32>) -> FittedScaler {
    let mut min = Vec::with_capacity(x.ncols());
    let mut scale = Vec::with_capacity(x.ncols());
    for column in x.axis_iter(Axis(1)) {
        let lo = column.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = column.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let range = hi - lo;
        min.push(lo);
        scale.push(if range > 0.0 { range } else { 1.0 });
    }
    FittedScaler::MinMax { min, scale }
}

fn apply_scaler(scaler: &FittedScaler, x: &mut Array2<f32>) {
    let (offset, scale) = match scaler {
        FittedScaler::Standard { mean, scale } => (mean, scale),
        FittedScaler::MinMax { min, scale } => (min, scale),
    };
    for mut row in x.axis_iter_mut(Axis(0)) {
        for (j, v) in row.iter_mut().enumerate() {
            *v = (*v - offset[j]) / scale[j];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-9, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn interpolates_interior_and_trailing_gaps() {
        let mut v = vec![f64::NAN, 1.0, f64::NAN, f64::NAN, 4.0, f64::NAN];
        interpolate_linear(&mut v);
        assert!(v[0].is_nan());
        assert_close(&v[1..], &[1.0, 2.0, 3.0, 4.0, 4.0]);
    }

    #[test]
    fn fill_methods_then_edges() {
        let nan = f64::NAN;
        let mut ffilled = fill_missing(&[nan, 2.0, nan, 6.0], "ffill");
        backward_fill(&mut ffilled);
        assert_close(&ffilled, &[2.0, 2.0, 2.0, 6.0]);

        assert_close(&fill_missing(&[nan, 2.0, nan, 6.0], "mean"), &[4.0, 2.0, 4.0, 6.0]);
        assert_close(&fill_missing(&[nan, 2.0], "zero"), &[0.0, 2.0]);
    }

    #[test]
    fn shift_introduces_leading_gaps() {
        let shifted = shift(&[1.0, 2.0, 3.0], 2);
        assert!(shifted[0].is_nan() && shifted[1].is_nan());
        assert_eq!(shifted[2], 1.0);
    }

    #[test]
    fn standard_scaler_centres_columns() {
        let mut x = array![[1.0f32, 5.0], [3.0, 5.0]];
        let scaler = fit_standard(&x);
        apply_scaler(&scaler, &mut x);
        assert_eq!(x, array![[-1.0f32, 0.0], [1.0, 0.0]]);
    }

    #[test]
    fn minmax_scaler_maps_to_unit_range() {
        let mut x = array![[2.0f32], [4.0], [6.0]];
        let scaler = fit_minmax(&x);
        apply_scaler(&scaler, &mut x);
        assert_eq!(x, array![[0.0f32], [0.5], [1.0]]);
    }
}

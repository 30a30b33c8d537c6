use crate::config::DEFAULT_DATA_DIR;
use crate::data::{SplitTable, Table};
use crate::error::NodeError;
use crate::node::{Node, OutputBag, ParameterSpec, Params, PortMap, PortSpec};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_CITY: &str = "houston";
const PREVIEW_ROWS: usize = 10;

/// Lists the cities with a `<city>.csv` file in `data_dir`, sorted by name.
///
/// An unreadable directory yields an empty list.
pub fn list_cities(data_dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(data_dir) else {
        return Vec::new();
    };
    let mut cities: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "csv"))
        .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();
    cities.sort();
    cities
}

/// Loads a city's daily weather CSV and splits it into train and test rows.
pub struct DataSourceNode {
    data_dir: PathBuf,
}

impl DataSourceNode {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl Default for DataSourceNode {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl Node for DataSourceNode {
    fn node_type(&self) -> &str {
        "data_source"
    }

    fn display_name(&self) -> &str {
        "Data Source"
    }

    fn category(&self) -> &str {
        "data"
    }

    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("output", "dataframe")]
    }

    fn parameter_schema(&self) -> Vec<ParameterSpec> {
        let cities = list_cities(&self.data_dir);
        let default = cities.first().map(String::as_str).unwrap_or(DEFAULT_CITY);
        vec![
            ParameterSpec::select("city", default, &cities),
            ParameterSpec::slider("train_ratio", 0.8, 0.5, 0.95, 0.05),
        ]
    }

    fn execute(&self, _inputs: &PortMap, params: &Params<'_>) -> Result<OutputBag, NodeError> {
        let city = params.str_or("city", DEFAULT_CITY)?;
        let train_ratio = params.f64_or("train_ratio", 0.8)?;

        if city.is_empty() || city.contains(['/', '\\']) || city.contains("..") {
            return Err(NodeError::InvalidParameter {
                name: "city".to_string(),
                message: format!("'{}' is not a city name", city),
            });
        }
        if !(0.0..=1.0).contains(&train_ratio) {
            return Err(NodeError::InvalidParameter {
                name: "train_ratio".to_string(),
                message: format!("{} is outside 0..=1", train_ratio),
            });
        }

        let csv_path = self.data_dir.join(format!("{}.csv", city));
        if !csv_path.exists() {
            return Err(NodeError::InvalidData(format!("No data for city: {}", city)));
        }
        debug!(path = %csv_path.display(), "loading weather data");
        let full = Table::from_csv_path(&csv_path)?;

        let split_idx = (full.len() as f64 * train_ratio).floor() as usize;
        let train = full.slice(0..split_idx);
        let test = full.slice(split_idx..full.len());

        let preview = json!({
            "rows": full.len(),
            "columns": full.column_names(),
            "train_rows": train.len(),
            "test_rows": test.len(),
            "sample": full.tail_records(PREVIEW_ROWS),
        });

        Ok(OutputBag::new()
            .with_output("output", SplitTable { train, test, full })
            .with_preview(preview))
    }
}

use crate::error::NodeError;
use serde_json::{Map, Value as JsonValue};
use std::fs::File;
use std::io::Read;
use std::ops::Range;
use std::path::Path;

/// A single column of a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Numeric cells. Missing cells are stored as `NaN`.
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slice(&self, range: Range<usize>) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(v[range].to_vec()),
            Column::Text(v) => Column::Text(v[range].to_vec()),
        }
    }

    fn select(&self, rows: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(rows.iter().map(|&i| v[i]).collect()),
            Column::Text(v) => Column::Text(rows.iter().map(|&i| v[i].clone()).collect()),
        }
    }

    fn cell_json(&self, row: usize) -> JsonValue {
        match self {
            Column::Numeric(v) => {
                let x = v[row];
                serde_json::Number::from_f64(x)
                    .map(JsonValue::Number)
                    .unwrap_or(JsonValue::Null)
            }
            Column::Text(v) => JsonValue::String(v[row].clone()),
        }
    }
}

/// A small column-oriented table, enough to carry daily weather records
/// between nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Builds a table from named columns. All columns must have the same length.
    pub fn from_columns(columns: Vec<(String, Column)>) -> Result<Self, NodeError> {
        let rows = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        if let Some((name, _)) = columns.iter().find(|(_, c)| c.len() != rows) {
            return Err(NodeError::InvalidData(format!(
                "column '{}' does not have {} rows",
                name, rows
            )));
        }
        let (names, columns) = columns.into_iter().unzip();
        Ok(Self {
            names,
            columns,
            rows,
        })
    }

    /// Loads a CSV file with a header row.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let file = File::open(path.as_ref())?;
        Self::from_csv_reader(file)
    }

    /// Reads CSV records with a header row.
    ///
    /// A column is numeric when every non-empty cell parses as a number; empty
    /// cells in a numeric column become `NaN`, so a column with no values at all
    /// is numeric and entirely missing. Anything else is kept as text.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, NodeError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let names: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut raw: Vec<Vec<String>> = vec![Vec::new(); names.len()];
        for record in reader.records() {
            let record = record?;
            for (i, cells) in raw.iter_mut().enumerate() {
                cells.push(record.get(i).unwrap_or("").to_string());
            }
        }

        let columns = names
            .into_iter()
            .zip(raw)
            .map(|(name, cells)| (name, infer_column(cells)))
            .collect();
        Self::from_columns(columns)
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        match self.column(name)? {
            Column::Numeric(v) => Some(v),
            Column::Text(_) => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&[String]> {
        match self.column(name)? {
            Column::Text(v) => Some(v),
            Column::Numeric(_) => None,
        }
    }

    /// Adds a column or replaces an existing one with the same name.
    pub fn set_column(&mut self, name: &str, column: Column) -> Result<(), NodeError> {
        if !self.names.is_empty() && column.len() != self.rows {
            return Err(NodeError::InvalidData(format!(
                "column '{}' has {} rows, table has {}",
                name,
                column.len(),
                self.rows
            )));
        }
        self.rows = column.len();
        match self.names.iter().position(|n| n == name) {
            Some(i) => self.columns[i] = column,
            None => {
                self.names.push(name.to_string());
                self.columns.push(column);
            }
        }
        Ok(())
    }

    /// Returns the rows in `range` as a new table.
    pub fn slice(&self, range: Range<usize>) -> Table {
        let end = range.end.min(self.rows);
        let start = range.start.min(end);
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.slice(start..end)).collect(),
            rows: end - start,
        }
    }

    /// Returns the listed rows, in the given order, as a new table.
    pub fn select_rows(&self, rows: &[usize]) -> Table {
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.select(rows)).collect(),
            rows: rows.len(),
        }
    }

    /// The last `n` rows as JSON records, for previews.
    pub fn tail_records(&self, n: usize) -> Vec<Map<String, JsonValue>> {
        let start = self.rows.saturating_sub(n);
        (start..self.rows)
            .map(|row| {
                self.names
                    .iter()
                    .zip(&self.columns)
                    .map(|(name, col)| (name.clone(), col.cell_json(row)))
                    .collect()
            })
            .collect()
    }
}

fn infer_column(cells: Vec<String>) -> Column {
    let parsed: Option<Vec<f64>> = cells
        .iter()
        .map(|c| {
            if c.is_empty() {
                Some(f64::NAN)
            } else {
                c.parse::<f64>().ok()
            }
        })
        .collect();
    match parsed {
        Some(values) => Column::Numeric(values),
        None => Column::Text(cells),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "date,temp_max,rain\n2024-01-01,10.5,0\n2024-01-02,,1.5\n2024-01-03,12,\n";

    #[test]
    fn infers_numeric_and_text_columns() {
        let table = Table::from_csv_reader(CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.column_names(), ["date", "temp_max", "rain"]);
        assert!(table.text("date").is_some());

        let temp = table.numeric("temp_max").unwrap();
        assert_eq!(temp[0], 10.5);
        assert!(temp[1].is_nan());
        assert_eq!(temp[2], 12.0);
    }

    #[test]
    fn all_empty_column_is_missing_numbers() {
        let csv = "date,snowfall\n2024-01-01,\n2024-01-02,\n";
        let table = Table::from_csv_reader(csv.as_bytes()).unwrap();
        let snowfall = table.numeric("snowfall").unwrap();
        assert_eq!(snowfall.len(), 2);
        assert!(snowfall.iter().all(|x| x.is_nan()));
        assert!(table.text("date").is_some());
    }

    #[test]
    fn slice_and_tail_records() {
        let table = Table::from_csv_reader(CSV.as_bytes()).unwrap();
        let head = table.slice(0..2);
        assert_eq!(head.len(), 2);
        assert_eq!(table.slice(2..10).len(), 1);

        let tail = table.tail_records(1);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0]["date"], "2024-01-03");
        assert_eq!(tail[0]["rain"], JsonValue::Null);
    }

    #[test]
    fn set_column_rejects_wrong_length() {
        let mut table = Table::from_csv_reader(CSV.as_bytes()).unwrap();
        let err = table.set_column("extra", Column::Numeric(vec![1.0]));
        assert!(err.is_err());
        table
            .set_column("extra", Column::Numeric(vec![1.0, 2.0, 3.0]))
            .unwrap();
        assert_eq!(table.numeric("extra").unwrap()[2], 3.0);
    }
}

use super::{FeatureSet, Predictions, Table};
use std::fmt;
use std::sync::Arc;

/// A dataset split into training and test rows, plus the full table.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitTable {
    pub train: Table,
    pub test: Table,
    pub full: Table,
}

/// The kinds of value a node can place on an output port.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Table(Table),
    Split(SplitTable),
    Features(FeatureSet),
    Predictions(Predictions),
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Json(_) => "json",
            Payload::Table(_) => "table",
            Payload::Split(_) => "split table",
            Payload::Features(_) => "features",
            Payload::Predictions(_) => "predictions",
        }
    }
}

/// A value travelling along an edge.
///
/// Cloning is cheap and shares the underlying payload, so every consumer of a
/// fanned-out port sees the same instance.
#[derive(Debug, Clone)]
pub struct PortData(Arc<Payload>);

impl PortData {
    pub fn new(payload: Payload) -> Self {
        Self(Arc::new(payload))
    }

    pub fn json(value: impl Into<serde_json::Value>) -> Self {
        Self::new(Payload::Json(value.into()))
    }

    pub fn payload(&self) -> &Payload {
        &self.0
    }

    pub fn kind(&self) -> &'static str {
        self.0.kind()
    }

    /// Whether both handles point at the same payload instance.
    pub fn ptr_eq(&self, other: &PortData) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self.payload() {
            Payload::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self.payload() {
            Payload::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_split(&self) -> Option<&SplitTable> {
        match self.payload() {
            Payload::Split(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_features(&self) -> Option<&FeatureSet> {
        match self.payload() {
            Payload::Features(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_predictions(&self) -> Option<&Predictions> {
        match self.payload() {
            Payload::Predictions(p) => Some(p),
            _ => None,
        }
    }
}

impl From<Payload> for PortData {
    fn from(payload: Payload) -> Self {
        Self::new(payload)
    }
}

impl From<SplitTable> for PortData {
    fn from(split: SplitTable) -> Self {
        Self::new(Payload::Split(split))
    }
}

impl From<FeatureSet> for PortData {
    fn from(features: FeatureSet) -> Self {
        Self::new(Payload::Features(features))
    }
}

impl From<Predictions> for PortData {
    fn from(predictions: Predictions) -> Self {
        Self::new(Payload::Predictions(predictions))
    }
}

impl fmt::Display for PortData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload() {
            Payload::Json(v) => write!(f, "{}", v),
            Payload::Table(t) => write!(f, "table[{} rows x {} cols]", t.len(), t.column_names().len()),
            Payload::Split(s) => write!(f, "split[train {} / test {}]", s.train.len(), s.test.len()),
            Payload::Features(x) => write!(
                f,
                "features[train {} / test {} x {}]",
                x.train_x.nrows(),
                x.test_x.nrows(),
                x.n_features()
            ),
            Payload::Predictions(p) => write!(f, "predictions[test {}]", p.test_pred.len()),
        }
    }
}

//! Common test utilities: fake nodes that record their calls, and pipeline builders.
use nodeflow::prelude::*;
use serde_json::json;
use std::sync::{Arc, Mutex};

/// One `execute` call seen by a fake node.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Call {
    pub label: String,
    pub inputs: PortMap,
}

/// Shared record of every fake-node call, in execution order.
pub type CallLog = Arc<Mutex<Vec<Call>>>;

#[allow(dead_code)]
pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Labels of the nodes that ran, in order.
#[allow(dead_code)]
pub fn executed(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().iter().map(|c| c.label.clone()).collect()
}

/// The inputs the node labelled `label` received on its first call.
#[allow(dead_code)]
pub fn inputs_of(log: &CallLog, label: &str) -> PortMap {
    log.lock()
        .unwrap()
        .iter()
        .find(|c| c.label == label)
        .map(|c| c.inputs.clone())
        .unwrap_or_else(|| panic!("node '{}' never ran", label))
}

fn record(log: &CallLog, params: &Params<'_>, inputs: &PortMap) {
    let label = params.str_or("label", "").unwrap().to_string();
    log.lock().unwrap().push(Call {
        label,
        inputs: inputs.clone(),
    });
}

fn number(inputs: &PortMap, port: &str) -> Result<f64, NodeError> {
    let data = nodeflow::node::require_input(inputs, port)?;
    data.as_json()
        .and_then(|v| v.as_f64())
        .ok_or_else(|| NodeError::InvalidData(format!("port '{}' is not a number", port)))
}

/// Emits the `value` parameter on `output`. No metrics.
pub struct SourceNode {
    log: CallLog,
}

impl Node for SourceNode {
    fn node_type(&self) -> &str {
        "source"
    }
    fn display_name(&self) -> &str {
        "Source"
    }
    fn category(&self) -> &str {
        "data"
    }
    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("output", "number")]
    }
    fn parameter_schema(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::slider("value", 1.0, 0.0, 100.0, 1.0)]
    }
    fn execute(&self, inputs: &PortMap, params: &Params<'_>) -> Result<OutputBag, NodeError> {
        record(&self.log, params, inputs);
        let value = params.f64_or("value", 1.0)?;
        Ok(OutputBag::new().with_output("output", PortData::json(value)))
    }
}

/// Doubles the number on `input` and reports the result as a metric.
pub struct DoubleNode {
    log: CallLog,
}

impl Node for DoubleNode {
    fn node_type(&self) -> &str {
        "double"
    }
    fn display_name(&self) -> &str {
        "Double"
    }
    fn category(&self) -> &str {
        "math"
    }
    fn input_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("input", "number")]
    }
    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("output", "number")]
    }
    fn execute(&self, inputs: &PortMap, params: &Params<'_>) -> Result<OutputBag, NodeError> {
        record(&self.log, params, inputs);
        let result = number(inputs, "input")? * 2.0;
        Ok(OutputBag::new()
            .with_output("output", PortData::json(result))
            .with_metrics(json!({ "value": result })))
    }
}

/// Adds the numbers on `a` and `b`.
pub struct SumNode {
    log: CallLog,
}

impl Node for SumNode {
    fn node_type(&self) -> &str {
        "sum"
    }
    fn display_name(&self) -> &str {
        "Sum"
    }
    fn category(&self) -> &str {
        "math"
    }
    fn input_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("a", "number"), PortSpec::new("b", "number")]
    }
    fn output_ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::new("output", "number")]
    }
    fn execute(&self, inputs: &PortMap, params: &Params<'_>) -> Result<OutputBag, NodeError> {
        record(&self.log, params, inputs);
        let total = number(inputs, "a")? + number(inputs, "b")?;
        Ok(OutputBag::new()
            .with_output("output", PortData::json(total))
            .with_metrics(json!({ "loss": 0.5, "total": total })))
    }
}

/// Accepts any inputs and previews which ports were bound.
pub struct ReportNode {
    log: CallLog,
}

impl Node for ReportNode {
    fn node_type(&self) -> &str {
        "report"
    }
    fn display_name(&self) -> &str {
        "Report"
    }
    fn category(&self) -> &str {
        "output"
    }
    fn execute(&self, inputs: &PortMap, params: &Params<'_>) -> Result<OutputBag, NodeError> {
        record(&self.log, params, inputs);
        let mut ports: Vec<&str> = inputs.keys().map(String::as_str).collect();
        ports.sort();
        Ok(OutputBag::new().with_preview(json!({ "ports": ports })))
    }
}

/// Reports both metrics and a preview alongside its output.
pub struct SummaryNode {
    log: CallLog,
}

impl Node for SummaryNode {
    fn node_type(&self) -> &str {
        "summary"
    }
    fn display_name(&self) -> &str {
        "Summary"
    }
    fn category(&self) -> &str {
        "output"
    }
    fn execute(&self, inputs: &PortMap, params: &Params<'_>) -> Result<OutputBag, NodeError> {
        record(&self.log, params, inputs);
        let value = number(inputs, "input")?;
        Ok(OutputBag::new()
            .with_output("output", PortData::json(value))
            .with_metrics(json!({ "mean": value }))
            .with_preview(json!({ "rows": 1 })))
    }
}

/// Always fails.
pub struct FailNode {
    log: CallLog,
}

impl Node for FailNode {
    fn node_type(&self) -> &str {
        "fail"
    }
    fn display_name(&self) -> &str {
        "Fail"
    }
    fn category(&self) -> &str {
        "test"
    }
    fn execute(&self, inputs: &PortMap, params: &Params<'_>) -> Result<OutputBag, NodeError> {
        record(&self.log, params, inputs);
        Err(NodeError::InvalidData("boom".to_string()))
    }
}

/// A registry holding only the fake nodes, all writing to `log`.
#[allow(dead_code)]
pub fn fake_registry(log: &CallLog) -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    let l = log.clone();
    registry.register_factory(move || Box::new(SourceNode { log: l.clone() }) as Box<dyn Node>);
    let l = log.clone();
    registry.register_factory(move || Box::new(DoubleNode { log: l.clone() }) as Box<dyn Node>);
    let l = log.clone();
    registry.register_factory(move || Box::new(SumNode { log: l.clone() }) as Box<dyn Node>);
    let l = log.clone();
    registry.register_factory(move || Box::new(ReportNode { log: l.clone() }) as Box<dyn Node>);
    let l = log.clone();
    registry.register_factory(move || Box::new(SummaryNode { log: l.clone() }) as Box<dyn Node>);
    let l = log.clone();
    registry.register_factory(move || Box::new(FailNode { log: l.clone() }) as Box<dyn Node>);
    registry
}

/// A node definition whose `label` parameter is its id, so calls can be traced.
#[allow(dead_code)]
pub fn node(id: &str, node_type: &str) -> NodeDefinition {
    NodeDefinition::new(id, node_type).with_param("label", id)
}

/// An edge between the default `output` and `input` ports.
#[allow(dead_code)]
pub fn edge(source: &str, target: &str) -> EdgeDefinition {
    EdgeDefinition::new(source, target)
}

#[allow(dead_code)]
pub fn wire(source: &str, source_handle: &str, target: &str, target_handle: &str) -> EdgeDefinition {
    EdgeDefinition::with_handles(source, source_handle, target, target_handle)
}

/// Writes a small daily weather CSV named `<city>.csv` into `dir`.
///
/// Temperatures follow a smooth pattern so the models have something to learn.
/// Row 3 leaves `precipitation` empty.
#[allow(dead_code)]
pub fn write_weather_csv(dir: &std::path::Path, city: &str, days: usize) {
    let mut text = String::from(
        "date,temp_max,temp_min,precipitation,rain,snowfall,wind_speed,wind_gusts,radiation,sunshine,weather_code\n",
    );
    for day in 0..days {
        let t = 20.0 + 5.0 * ((day as f64) / 7.0).sin();
        let precipitation = if day == 3 {
            String::new()
        } else {
            format!("{:.1}", (day % 5) as f64 * 0.4)
        };
        text.push_str(&format!(
            "2024-{:02}-{:02},{:.2},{:.2},{},{:.1},0,{:.1},{:.1},{:.1},{},{}\n",
            1 + day / 28,
            1 + day % 28,
            t,
            t - 8.0,
            precipitation,
            (day % 5) as f64 * 0.4,
            10.0 + (day % 3) as f64,
            18.0 + (day % 4) as f64,
            15.0 + (day % 6) as f64,
            30_000 + (day % 10) * 500,
            day % 4,
        ));
    }
    std::fs::write(dir.join(format!("{}.csv", city)), text).unwrap();
}

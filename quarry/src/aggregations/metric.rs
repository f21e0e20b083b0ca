//! Single-value and percentile metric aggregations

use crate::node::{insert_some, object, require, sentinel, Node};
use crate::validation::ValidationResults;
use serde_json::{Map, Value};

/// Metric selector tag.
///
/// Tags outside the known five are representable so that tags read from
/// configuration or user input can be rejected by validation instead of at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Cardinality,
    Max,
    Min,
    Avg,
    Sum,
    Unknown(String),
}

impl MetricKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cardinality => "cardinality",
            Self::Max => "max",
            Self::Min => "min",
            Self::Avg => "avg",
            Self::Sum => "sum",
            Self::Unknown(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<&str> for MetricKind {
    fn from(tag: &str) -> Self {
        match tag {
            "cardinality" => Self::Cardinality,
            "max" => Self::Max,
            "min" => Self::Min,
            "avg" => Self::Avg,
            "sum" => Self::Sum,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for MetricKind {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

/// Single-value metric over `field`
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub kind: MetricKind,
    pub field: String,
    pub missing: Option<Value>,
    /// Only meaningful for `cardinality`
    pub precision_threshold: Option<u64>,
}

impl Metric {
    pub fn new(kind: impl Into<MetricKind>, field: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            field: field.into(),
            missing: None,
            precision_threshold: None,
        }
    }

    pub fn cardinality(field: impl Into<String>) -> Self {
        Self::new(MetricKind::Cardinality, field)
    }

    pub fn max(field: impl Into<String>) -> Self {
        Self::new(MetricKind::Max, field)
    }

    pub fn min(field: impl Into<String>) -> Self {
        Self::new(MetricKind::Min, field)
    }

    pub fn avg(field: impl Into<String>) -> Self {
        Self::new(MetricKind::Avg, field)
    }

    pub fn sum(field: impl Into<String>) -> Self {
        Self::new(MetricKind::Sum, field)
    }

    /// Value used for documents without `field`
    pub fn missing(mut self, value: impl Into<Value>) -> Self {
        self.missing = Some(value.into());
        self
    }

    /// Negative values leave the threshold to the store
    pub fn precision_threshold(mut self, threshold: i64) -> Self {
        self.precision_threshold = sentinel(threshold);
        self
    }
}

impl Node for Metric {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        require(&self.field, "field", at, results);
        if !self.kind.is_known() {
            results.add_fatal(format!(
                "{at}: unknown metric `{}`, expected one of cardinality, max, min, avg, sum",
                self.kind.as_str()
            ));
        }
        if self.precision_threshold.is_some() && self.kind != MetricKind::Cardinality {
            results.add_advisory(format!(
                "{at}: precision_threshold only applies to cardinality and is ignored"
            ));
        }
    }

    fn compile(&self) -> Value {
        let mut body = Map::new();
        body.insert("field".to_string(), Value::from(self.field.as_str()));
        insert_some(&mut body, "missing", self.missing.clone());
        if self.kind == MetricKind::Cardinality {
            insert_some(&mut body, "precision_threshold", self.precision_threshold);
        }
        object(self.kind.as_str(), Value::Object(body))
    }
}

/// Percentile estimates over `field`
#[derive(Debug, Clone, PartialEq)]
pub struct Percentiles {
    pub field: String,
    /// Empty means the store's default set
    pub percents: Vec<f64>,
    pub missing: Option<Value>,
    pub keyed: Option<bool>,
}

impl Percentiles {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            percents: Vec::new(),
            missing: None,
            keyed: None,
        }
    }

    pub fn percents(mut self, percents: impl IntoIterator<Item = f64>) -> Self {
        self.percents = percents.into_iter().collect();
        self
    }

    pub fn missing(mut self, value: impl Into<Value>) -> Self {
        self.missing = Some(value.into());
        self
    }

    pub fn keyed(mut self, keyed: bool) -> Self {
        self.keyed = Some(keyed);
        self
    }
}

impl Node for Percentiles {
    fn name(&self) -> &str {
        "percentiles"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        require(&self.field, "field", at, results);
        for percent in &self.percents {
            if !(0.0..=100.0).contains(percent) {
                results.add_fatal(format!("{at}: percent {percent} is outside 0..=100"));
            }
        }
    }

    fn compile(&self) -> Value {
        let mut body = Map::new();
        body.insert("field".to_string(), Value::from(self.field.as_str()));
        if !self.percents.is_empty() {
            body.insert("percents".to_string(), Value::from(self.percents.clone()));
        }
        insert_some(&mut body, "missing", self.missing.clone());
        insert_some(&mut body, "keyed", self.keyed);
        object("percentiles", Value::Object(body))
    }
}

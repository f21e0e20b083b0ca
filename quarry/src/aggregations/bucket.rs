//! Bucket aggregations
//!
//! Every type here implements [`BucketAggregation`] and compiles as
//! `{name: body}` with an `aggs` sibling when it has children.

use super::{compile_bucket, BucketAggregation, SubAggregations};
use crate::node::{compile_orders, insert_some, require, sentinel, Node, Order};
use crate::query::Query;
use crate::validation::ValidationResults;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

macro_rules! impl_bucket_aggregation {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BucketAggregation for $ty {
                fn sub_aggregations(&self) -> &SubAggregations {
                    &self.aggs
                }

                fn sub_aggregations_mut(&mut self) -> &mut SubAggregations {
                    &mut self.aggs
                }
            }
        )*
    };
}

impl_bucket_aggregation!(
    TermsAggregation,
    DateHistogram,
    RangeAggregation,
    DateRangeAggregation,
    FilterAggregation,
);

// ============================================================================
// terms
// ============================================================================

/// One bucket per distinct value of `field`
#[derive(Debug, Clone, PartialEq)]
pub struct TermsAggregation {
    pub field: String,
    pub size: Option<u64>,
    pub shard_size: Option<u64>,
    pub min_doc_count: Option<u64>,
    pub order: Vec<Order>,
    /// Regex include pattern; exclusive with `include_values`
    pub include: Option<String>,
    pub include_values: Vec<String>,
    /// Regex exclude pattern; exclusive with `exclude_values`
    pub exclude: Option<String>,
    pub exclude_values: Vec<String>,
    pub missing: Option<Value>,
    pub aggs: SubAggregations,
}

impl TermsAggregation {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            size: None,
            shard_size: None,
            min_doc_count: None,
            order: Vec::new(),
            include: None,
            include_values: Vec::new(),
            exclude: None,
            exclude_values: Vec::new(),
            missing: None,
            aggs: SubAggregations::new(),
        }
    }

    /// Number of buckets returned; negative defers to the store
    pub fn size(mut self, size: i64) -> Self {
        self.size = sentinel(size);
        self
    }

    pub fn shard_size(mut self, shard_size: i64) -> Self {
        self.shard_size = sentinel(shard_size);
        self
    }

    pub fn min_doc_count(mut self, min_doc_count: i64) -> Self {
        self.min_doc_count = sentinel(min_doc_count);
        self
    }

    /// Append an ordering criterion
    pub fn order(mut self, order: Order) -> Self {
        self.order.push(order);
        self
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include = Some(pattern.into());
        self
    }

    pub fn include_values<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.include_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude = Some(pattern.into());
        self
    }

    pub fn exclude_values<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.exclude_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn missing(mut self, value: impl Into<Value>) -> Self {
        self.missing = Some(value.into());
        self
    }
}

/// Pattern wins over the value list; validation rejects having both
fn pattern_or_values(pattern: &Option<String>, values: &[String]) -> Option<Value> {
    match pattern {
        Some(pattern) => Some(Value::from(pattern.as_str())),
        None if !values.is_empty() => Some(Value::from(values.to_vec())),
        None => None,
    }
}

impl Node for TermsAggregation {
    fn name(&self) -> &str {
        "terms"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        require(&self.field, "field", at, results);
        if self.include.is_some() && !self.include_values.is_empty() {
            results.add_fatal(format!(
                "{at}: include pattern and include values are mutually exclusive"
            ));
        }
        if self.exclude.is_some() && !self.exclude_values.is_empty() {
            results.add_fatal(format!(
                "{at}: exclude pattern and exclude values are mutually exclusive"
            ));
        }
        self.aggs.validate_at(&format!("{at}.aggs"), results);
    }

    fn compile(&self) -> Value {
        let mut body = Map::new();
        body.insert("field".to_string(), Value::from(self.field.as_str()));
        insert_some(&mut body, "size", self.size);
        insert_some(&mut body, "shard_size", self.shard_size);
        insert_some(&mut body, "min_doc_count", self.min_doc_count);
        if !self.order.is_empty() {
            body.insert("order".to_string(), compile_orders(&self.order));
        }
        insert_some(
            &mut body,
            "include",
            pattern_or_values(&self.include, &self.include_values),
        );
        insert_some(
            &mut body,
            "exclude",
            pattern_or_values(&self.exclude, &self.exclude_values),
        );
        insert_some(&mut body, "missing", self.missing.clone());
        compile_bucket(self.name(), Value::Object(body), &self.aggs)
    }
}

// ============================================================================
// date_histogram
// ============================================================================

/// Bucket width of a date histogram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interval {
    /// Calendar-aware unit such as `1d`, `1M` or `quarter`
    Calendar(String),
    /// Fixed duration such as `30m` or `90s`
    Fixed(String),
}

impl Interval {
    fn key(&self) -> &'static str {
        match self {
            Self::Calendar(_) => "calendar_interval",
            Self::Fixed(_) => "fixed_interval",
        }
    }

    fn value(&self) -> &str {
        match self {
            Self::Calendar(v) | Self::Fixed(v) => v,
        }
    }
}

/// Time buckets over a date `field`
#[derive(Debug, Clone, PartialEq)]
pub struct DateHistogram {
    pub field: String,
    pub interval: Option<Interval>,
    pub format: Option<String>,
    pub time_zone: Option<String>,
    pub offset: Option<String>,
    pub min_doc_count: Option<u64>,
    pub order: Vec<Order>,
    pub aggs: SubAggregations,
}

impl DateHistogram {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            interval: None,
            format: None,
            time_zone: None,
            offset: None,
            min_doc_count: None,
            order: Vec::new(),
            aggs: SubAggregations::new(),
        }
    }

    pub fn calendar_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = Some(Interval::Calendar(interval.into()));
        self
    }

    pub fn fixed_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = Some(Interval::Fixed(interval.into()));
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    pub fn offset(mut self, offset: impl Into<String>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn min_doc_count(mut self, min_doc_count: i64) -> Self {
        self.min_doc_count = sentinel(min_doc_count);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order.push(order);
        self
    }
}

impl Node for DateHistogram {
    fn name(&self) -> &str {
        "date_histogram"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        require(&self.field, "field", at, results);
        match &self.interval {
            None => results.add_fatal(format!(
                "{at}: calendar_interval or fixed_interval is required"
            )),
            Some(interval) => require(interval.value(), interval.key(), at, results),
        }
        self.aggs.validate_at(&format!("{at}.aggs"), results);
    }

    fn compile(&self) -> Value {
        let mut body = Map::new();
        body.insert("field".to_string(), Value::from(self.field.as_str()));
        if let Some(interval) = &self.interval {
            body.insert(interval.key().to_string(), Value::from(interval.value()));
        }
        insert_some(&mut body, "format", self.format.clone());
        insert_some(&mut body, "time_zone", self.time_zone.clone());
        insert_some(&mut body, "offset", self.offset.clone());
        insert_some(&mut body, "min_doc_count", self.min_doc_count);
        if !self.order.is_empty() {
            body.insert("order".to_string(), compile_orders(&self.order));
        }
        compile_bucket(self.name(), Value::Object(body), &self.aggs)
    }
}

// ============================================================================
// range
// ============================================================================

/// One numeric range; `from` is inclusive, `to` exclusive
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpec {
    pub key: Option<String>,
    pub from: Option<f64>,
    pub to: Option<f64>,
}

impl RangeSpec {
    fn compile(&self) -> Value {
        let mut map = Map::new();
        insert_some(&mut map, "key", self.key.clone());
        insert_some(&mut map, "from", self.from);
        insert_some(&mut map, "to", self.to);
        Value::Object(map)
    }
}

/// Buckets over numeric ranges of `field`
#[derive(Debug, Clone, PartialEq)]
pub struct RangeAggregation {
    pub field: String,
    pub ranges: Vec<RangeSpec>,
    pub keyed: Option<bool>,
    pub missing: Option<Value>,
    pub aggs: SubAggregations,
}

impl RangeAggregation {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ranges: Vec::new(),
            keyed: None,
            missing: None,
            aggs: SubAggregations::new(),
        }
    }

    pub fn between(self, from: f64, to: f64) -> Self {
        self.range(None, Some(from), Some(to))
    }

    pub fn above(self, from: f64) -> Self {
        self.range(None, Some(from), None)
    }

    pub fn below(self, to: f64) -> Self {
        self.range(None, None, Some(to))
    }

    pub fn keyed_range(self, key: impl Into<String>, from: Option<f64>, to: Option<f64>) -> Self {
        self.range(Some(key.into()), from, to)
    }

    pub fn keyed(mut self, keyed: bool) -> Self {
        self.keyed = Some(keyed);
        self
    }

    pub fn missing(mut self, value: impl Into<Value>) -> Self {
        self.missing = Some(value.into());
        self
    }

    fn range(mut self, key: Option<String>, from: Option<f64>, to: Option<f64>) -> Self {
        self.ranges.push(RangeSpec { key, from, to });
        self
    }
}

impl Node for RangeAggregation {
    fn name(&self) -> &str {
        "range"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        require(&self.field, "field", at, results);
        if self.ranges.is_empty() {
            results.add_fatal(format!("{at}: at least one range is required"));
        }
        for (i, spec) in self.ranges.iter().enumerate() {
            for (bound, value) in [("from", spec.from), ("to", spec.to)] {
                if value.is_some_and(|v| !v.is_finite()) {
                    results.add_fatal(format!("{at}.ranges[{i}]: {bound} must be a finite number"));
                }
            }
            if let (Some(from), Some(to)) = (spec.from, spec.to) {
                if from > to {
                    results.add_advisory(format!(
                        "{at}.ranges[{i}]: from {from} is greater than to {to}, bucket is always empty"
                    ));
                }
            }
        }
        self.aggs.validate_at(&format!("{at}.aggs"), results);
    }

    fn compile(&self) -> Value {
        let mut body = Map::new();
        body.insert("field".to_string(), Value::from(self.field.as_str()));
        body.insert(
            "ranges".to_string(),
            Value::Array(self.ranges.iter().map(RangeSpec::compile).collect()),
        );
        insert_some(&mut body, "keyed", self.keyed);
        insert_some(&mut body, "missing", self.missing.clone());
        compile_bucket(self.name(), Value::Object(body), &self.aggs)
    }
}

// ============================================================================
// date_range
// ============================================================================

/// One date range; bounds are date math expressions or formatted dates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRangeSpec {
    pub key: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DateRangeSpec {
    fn compile(&self) -> Value {
        let mut map = Map::new();
        insert_some(&mut map, "key", self.key.clone());
        insert_some(&mut map, "from", self.from.clone());
        insert_some(&mut map, "to", self.to.clone());
        Value::Object(map)
    }
}

/// Buckets over date ranges of `field`
#[derive(Debug, Clone, PartialEq)]
pub struct DateRangeAggregation {
    pub field: String,
    pub format: Option<String>,
    pub time_zone: Option<String>,
    pub ranges: Vec<DateRangeSpec>,
    pub keyed: Option<bool>,
    pub aggs: SubAggregations,
}

impl DateRangeAggregation {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            format: None,
            time_zone: None,
            ranges: Vec::new(),
            keyed: None,
            aggs: SubAggregations::new(),
        }
    }

    pub fn between(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.range(None, Some(from.into()), Some(to.into()))
    }

    /// Range between two instants, rendered as RFC 3339 with milliseconds
    pub fn between_dates(self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.between(rfc3339(&from), rfc3339(&to))
    }

    pub fn after(self, from: impl Into<String>) -> Self {
        self.range(None, Some(from.into()), None)
    }

    pub fn before(self, to: impl Into<String>) -> Self {
        self.range(None, None, Some(to.into()))
    }

    pub fn keyed_range(self, key: impl Into<String>, from: Option<&str>, to: Option<&str>) -> Self {
        self.range(
            Some(key.into()),
            from.map(str::to_string),
            to.map(str::to_string),
        )
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    pub fn keyed(mut self, keyed: bool) -> Self {
        self.keyed = Some(keyed);
        self
    }

    fn range(mut self, key: Option<String>, from: Option<String>, to: Option<String>) -> Self {
        self.ranges.push(DateRangeSpec { key, from, to });
        self
    }
}

fn rfc3339(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Node for DateRangeAggregation {
    fn name(&self) -> &str {
        "date_range"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        require(&self.field, "field", at, results);
        if self.ranges.is_empty() {
            results.add_fatal(format!("{at}: at least one range is required"));
        }
        for (i, spec) in self.ranges.iter().enumerate() {
            if spec.from.is_none() && spec.to.is_none() {
                results.add_advisory(format!(
                    "{at}.ranges[{i}]: range has neither from nor to and matches every date"
                ));
            }
        }
        self.aggs.validate_at(&format!("{at}.aggs"), results);
    }

    fn compile(&self) -> Value {
        let mut body = Map::new();
        body.insert("field".to_string(), Value::from(self.field.as_str()));
        insert_some(&mut body, "format", self.format.clone());
        insert_some(&mut body, "time_zone", self.time_zone.clone());
        body.insert(
            "ranges".to_string(),
            Value::Array(self.ranges.iter().map(DateRangeSpec::compile).collect()),
        );
        insert_some(&mut body, "keyed", self.keyed);
        compile_bucket(self.name(), Value::Object(body), &self.aggs)
    }
}

// ============================================================================
// filter
// ============================================================================

/// Single bucket of the documents matching a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterAggregation {
    pub filter: Option<Box<Query>>,
    pub aggs: SubAggregations,
}

impl FilterAggregation {
    pub fn new(filter: impl Into<Query>) -> Self {
        Self {
            filter: Some(Box::new(filter.into())),
            aggs: SubAggregations::new(),
        }
    }

    pub fn filter(mut self, filter: impl Into<Query>) -> Self {
        self.filter = Some(Box::new(filter.into()));
        self
    }
}

impl Node for FilterAggregation {
    fn name(&self) -> &str {
        "filter"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        match &self.filter {
            None => results.add_fatal(format!("{at}: filter query is required")),
            Some(query) => query.validate_at(&format!("{at}.filter.{}", query.name()), results),
        }
        self.aggs.validate_at(&format!("{at}.aggs"), results);
    }

    fn compile(&self) -> Value {
        let body = match &self.filter {
            Some(query) => query.compile(),
            None => Value::Object(Map::new()),
        };
        compile_bucket(self.name(), body, &self.aggs)
    }
}

//! Aggregation nodes
//!
//! Metric aggregations (`cardinality`, `max`, `min`, `avg`, `sum`,
//! `percentiles`) are leaves. Bucket aggregations (`terms`,
//! `date_histogram`, `range`, `date_range`, `filter`) own a map of named
//! sub-aggregations, which is where aggregation trees nest. `bucket_sort` is a
//! pipeline aggregation placed among the sub-aggregations of a bucket node.
//!
//! ```
//! use quarry::prelude::*;
//!
//! let by_category = TermsAggregation::new("category")
//!     .size(20)
//!     .order(Order::desc("_count"))
//!     .sub_aggregation("avg_price", Metric::avg("price"));
//!
//! let json = Aggregation::from(by_category).to_json().unwrap();
//! assert_eq!(json["aggs"]["avg_price"]["avg"]["field"], "price");
//! ```

mod bucket;
mod metric;
mod pipeline;

pub use bucket::{
    DateHistogram, DateRangeAggregation, DateRangeSpec, FilterAggregation, Interval,
    RangeAggregation, RangeSpec, TermsAggregation,
};
pub use metric::{Metric, MetricKind, Percentiles};
pub use pipeline::{BucketSort, GapPolicy};

use crate::node::Node;
use crate::validation::ValidationResults;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Any aggregation node
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    Metric(Metric),
    Percentiles(Percentiles),
    Terms(TermsAggregation),
    DateHistogram(DateHistogram),
    Range(RangeAggregation),
    DateRange(DateRangeAggregation),
    Filter(FilterAggregation),
    BucketSort(BucketSort),
}

impl Aggregation {
    /// Sub-aggregations of bucket variants; `None` for metric and pipeline nodes
    pub fn sub_aggregations(&self) -> Option<&SubAggregations> {
        match self {
            Self::Terms(a) => Some(a.sub_aggregations()),
            Self::DateHistogram(a) => Some(a.sub_aggregations()),
            Self::Range(a) => Some(a.sub_aggregations()),
            Self::DateRange(a) => Some(a.sub_aggregations()),
            Self::Filter(a) => Some(a.sub_aggregations()),
            Self::Metric(_) | Self::Percentiles(_) | Self::BucketSort(_) => None,
        }
    }
}

impl Node for Aggregation {
    fn name(&self) -> &str {
        match self {
            Self::Metric(a) => a.name(),
            Self::Percentiles(a) => a.name(),
            Self::Terms(a) => a.name(),
            Self::DateHistogram(a) => a.name(),
            Self::Range(a) => a.name(),
            Self::DateRange(a) => a.name(),
            Self::Filter(a) => a.name(),
            Self::BucketSort(a) => a.name(),
        }
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        match self {
            Self::Metric(a) => a.validate_at(at, results),
            Self::Percentiles(a) => a.validate_at(at, results),
            Self::Terms(a) => a.validate_at(at, results),
            Self::DateHistogram(a) => a.validate_at(at, results),
            Self::Range(a) => a.validate_at(at, results),
            Self::DateRange(a) => a.validate_at(at, results),
            Self::Filter(a) => a.validate_at(at, results),
            Self::BucketSort(a) => a.validate_at(at, results),
        }
    }

    fn compile(&self) -> Value {
        match self {
            Self::Metric(a) => a.compile(),
            Self::Percentiles(a) => a.compile(),
            Self::Terms(a) => a.compile(),
            Self::DateHistogram(a) => a.compile(),
            Self::Range(a) => a.compile(),
            Self::DateRange(a) => a.compile(),
            Self::Filter(a) => a.compile(),
            Self::BucketSort(a) => a.compile(),
        }
    }
}

macro_rules! impl_from_aggregation {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Aggregation {
                fn from(aggregation: $ty) -> Self {
                    Aggregation::$variant(aggregation)
                }
            }
        )*
    };
}

impl_from_aggregation!(
    Metric(Metric),
    Percentiles(Percentiles),
    Terms(TermsAggregation),
    DateHistogram(DateHistogram),
    Range(RangeAggregation),
    DateRange(DateRangeAggregation),
    Filter(FilterAggregation),
    BucketSort(BucketSort),
);

/// Named child aggregations of a bucket node.
///
/// Names are unique: inserting an existing name replaces the earlier
/// aggregation. Iteration is ordered by name; the store does not care about
/// key order here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubAggregations {
    entries: BTreeMap<String, Aggregation>,
}

impl SubAggregations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `aggregation` under `name`, returning the one it replaced
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        aggregation: impl Into<Aggregation>,
    ) -> Option<Aggregation> {
        let name = name.into();
        let replaced = self.entries.insert(name.clone(), aggregation.into());
        if replaced.is_some() {
            debug!(name = %name, "replaced existing sub-aggregation");
        }
        replaced
    }

    pub fn get(&self, name: &str) -> Option<&Aggregation> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Aggregation)> {
        self.entries.iter().map(|(name, agg)| (name.as_str(), agg))
    }

    pub(crate) fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        for (name, aggregation) in &self.entries {
            if name.is_empty() {
                results.add_fatal(format!("{at}: aggregation name is required"));
            }
            aggregation.validate_at(&format!("{at}.{name}.{}", aggregation.name()), results);
        }
    }

    pub(crate) fn compile(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(name, aggregation)| (name.clone(), aggregation.compile()))
            .collect();
        Value::Object(map)
    }
}

impl<N: Into<String>, A: Into<Aggregation>> FromIterator<(N, A)> for SubAggregations {
    fn from_iter<I: IntoIterator<Item = (N, A)>>(iter: I) -> Self {
        let mut aggs = Self::new();
        for (name, aggregation) in iter {
            aggs.insert(name, aggregation);
        }
        aggs
    }
}

/// Capability of aggregations that produce buckets and can nest children
pub trait BucketAggregation: Sized {
    fn sub_aggregations(&self) -> &SubAggregations;

    fn sub_aggregations_mut(&mut self) -> &mut SubAggregations;

    /// Add a named child aggregation and return `self` for chaining.
    /// A name that is already present is overwritten.
    fn sub_aggregation(
        mut self,
        name: impl Into<String>,
        aggregation: impl Into<Aggregation>,
    ) -> Self {
        self.sub_aggregations_mut().insert(name, aggregation);
        self
    }
}

/// `{name: body}` plus a sibling `aggs` object when there are children
pub(crate) fn compile_bucket(name: &str, body: Value, aggs: &SubAggregations) -> Value {
    let mut map = Map::new();
    map.insert(name.to_string(), body);
    if !aggs.is_empty() {
        map.insert("aggs".to_string(), aggs.compile());
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Term;
    use serde_json::json;

    #[test]
    fn test_duplicate_name_overwrites() {
        let terms = TermsAggregation::new("category")
            .sub_aggregation("stat", Metric::avg("price"))
            .sub_aggregation("stat", Metric::max("price"));

        assert_eq!(terms.sub_aggregations().len(), 1);
        assert_eq!(
            terms.sub_aggregations().get("stat"),
            Some(&Aggregation::Metric(Metric::max("price")))
        );
    }

    #[test]
    fn test_sub_aggregations_accessor_by_variant() {
        let terms: Aggregation = TermsAggregation::new("f")
            .sub_aggregation("x", Metric::sum("n"))
            .into();
        assert_eq!(terms.sub_aggregations().map(|s| s.len()), Some(1));

        let metric: Aggregation = Metric::sum("n").into();
        assert!(metric.sub_aggregations().is_none());
    }

    #[test]
    fn test_nested_sub_aggregation_problems_are_located() {
        let agg: Aggregation = TermsAggregation::new("category")
            .sub_aggregation(
                "by_day",
                DateHistogram::new("@timestamp")
                    .calendar_interval("1d")
                    .sub_aggregation("avg", Metric::avg("")),
            )
            .into();

        let results = agg.validate();
        assert_eq!(
            results.messages(),
            vec!["terms.aggs.by_day.date_histogram.aggs.avg.avg: field is required"]
        );
    }

    #[test]
    fn test_empty_sub_aggregation_name_is_fatal() {
        let agg: Aggregation = FilterAggregation::new(Term::new("a", 1))
            .sub_aggregation("", Metric::min("n"))
            .into();
        assert!(agg.validate().is_fatal());
    }

    #[test]
    fn test_collect_into_sub_aggregations() {
        let aggs: SubAggregations = vec![("a", Metric::avg("x")), ("b", Metric::sum("y"))]
            .into_iter()
            .collect();
        assert_eq!(
            aggs.compile(),
            json!({"a": {"avg": {"field": "x"}}, "b": {"sum": {"field": "y"}}})
        );
    }
}

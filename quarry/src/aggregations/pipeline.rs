//! Pipeline aggregations that reshape the buckets of their parent

use crate::node::{compile_orders, insert_some, object, sentinel, Node, Order};
use crate::validation::ValidationResults;
use serde_json::{Map, Value};

/// Policy for buckets missing a value referenced by a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapPolicy {
    Skip,
    InsertZeros,
    KeepValues,
}

impl GapPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::InsertZeros => "insert_zeros",
            Self::KeepValues => "keep_values",
        }
    }
}

/// Sorts and truncates the buckets of its parent aggregation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketSort {
    pub sort: Vec<Order>,
    pub from: Option<u64>,
    pub size: Option<u64>,
    pub gap_policy: Option<GapPolicy>,
}

impl BucketSort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(mut self, order: Order) -> Self {
        self.sort.push(order);
        self
    }

    pub fn from(mut self, from: i64) -> Self {
        self.from = sentinel(from);
        self
    }

    pub fn size(mut self, size: i64) -> Self {
        self.size = sentinel(size);
        self
    }

    pub fn gap_policy(mut self, gap_policy: GapPolicy) -> Self {
        self.gap_policy = Some(gap_policy);
        self
    }
}

impl Node for BucketSort {
    fn name(&self) -> &str {
        "bucket_sort"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        if self.sort.is_empty() && self.from.is_none() && self.size.is_none() {
            results.add_advisory(format!("{at}: no sort, from or size set; buckets pass through unchanged"));
        }
    }

    fn compile(&self) -> Value {
        let mut body = Map::new();
        if !self.sort.is_empty() {
            body.insert("sort".to_string(), compile_orders(&self.sort));
        }
        insert_some(&mut body, "from", self.from);
        insert_some(&mut body, "size", self.size);
        insert_some(&mut body, "gap_policy", self.gap_policy.map(|p| p.as_str()));
        object(self.name(), Value::Object(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregations::{Aggregation, BucketAggregation, Metric, TermsAggregation};
    use serde_json::json;

    #[test]
    fn test_bucket_sort_shape() {
        let sort = BucketSort::new()
            .sort(Order::desc("total"))
            .from(-1)
            .size(3)
            .gap_policy(GapPolicy::InsertZeros);
        assert_eq!(
            sort.to_json().unwrap(),
            json!({"bucket_sort": {"sort": [{"total": "desc"}], "size": 3, "gap_policy": "insert_zeros"}})
        );
    }

    #[test]
    fn test_empty_bucket_sort_is_advisory() {
        let results = BucketSort::new().validate();
        assert_eq!(results.len(), 1);
        assert!(!results.is_fatal());
        assert_eq!(BucketSort::new().to_json().unwrap(), json!({"bucket_sort": {}}));
    }

    #[test]
    fn test_bucket_sort_under_terms() {
        let agg: Aggregation = TermsAggregation::new("customer")
            .sub_aggregation("total", Metric::sum("amount"))
            .sub_aggregation("top", BucketSort::new().sort(Order::desc("total")).size(5))
            .into();
        let json = agg.to_json().unwrap();
        assert_eq!(json["aggs"]["top"]["bucket_sort"]["size"], 5);
    }
}

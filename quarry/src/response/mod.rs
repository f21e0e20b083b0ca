//! Response decoding
//!
//! Top-level response shapes are decoded eagerly. Aggregation results and
//! per-bucket sub-results stay as raw JSON spans until they are read by name:
//!
//! ```
//! use quarry::prelude::*;
//! use quarry::response::{MetricValue, TermsResult};
//!
//! let body = br#"{
//!     "took": 3, "timed_out": false,
//!     "hits": {"total": {"value": 2, "relation": "eq"}, "hits": []},
//!     "aggregations": {
//!         "by_tag": {"buckets": [{"key": "rust", "doc_count": 2, "avg_len": {"value": 7.5}}]}
//!     }
//! }"#;
//!
//! let response = SearchResponse::from_slice(body).unwrap();
//! let tags: TermsResult = response.read_named("by_tag").unwrap().unwrap();
//! let avg: MetricValue = tags.buckets[0].read_named("avg_len").unwrap().unwrap();
//! assert_eq!(avg.value, Some(7.5));
//! assert!(response.read_named::<TermsResult>("missing").unwrap().is_none());
//! ```

mod aggregations;
mod named;
mod search;

pub use aggregations::{
    Bucket, DateHistogramResult, FilterResult, MetricValue, Percentile, PercentilesResult,
    RangeResult, TermsResult,
};
pub use named::{read_named, NamedResults, RawResults};
pub use search::{Hit, Hits, SearchResponse, TotalHits, TotalHitsRelation};

use serde::{Deserialize, Serialize};

/// Shard counters reported by searches and bulk items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardStats {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub successful: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub failed: u32,
}

/// Structured error reported by the store.
///
/// Older stores report a bare string; that decodes into `reason` with an
/// empty `error_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoreErrorRepr")]
pub struct StoreError {
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caused_by: Option<Box<StoreError>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub root_cause: Vec<StoreError>,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.reason, self.error_type.is_empty()) {
            (Some(reason), true) => f.write_str(reason),
            (Some(reason), false) => write!(f, "{}: {}", self.error_type, reason),
            (None, _) => f.write_str(&self.error_type),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoreErrorRepr {
    Message(String),
    Detail {
        #[serde(rename = "type", default)]
        error_type: String,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        index: Option<String>,
        #[serde(default)]
        caused_by: Option<Box<StoreError>>,
        #[serde(default)]
        root_cause: Vec<StoreError>,
    },
}

impl From<StoreErrorRepr> for StoreError {
    fn from(repr: StoreErrorRepr) -> Self {
        match repr {
            StoreErrorRepr::Message(reason) => Self {
                error_type: String::new(),
                reason: Some(reason),
                index: None,
                caused_by: None,
                root_cause: Vec::new(),
            },
            StoreErrorRepr::Detail {
                error_type,
                reason,
                index,
                caused_by,
                root_cause,
            } => Self {
                error_type,
                reason,
                index,
                caused_by,
                root_cause,
            },
        }
    }
}

//! Typed query DSL model for Elasticsearch-compatible document stores
//!
//! This crate builds search requests, aggregations and bulk bodies as trees of
//! typed nodes, validates them before anything is written, compiles them into
//! the JSON the store expects, and decodes the store's responses back into
//! typed results.
//!
//! # Request side
//!
//! - [`query`] - `term`, `terms`, `match`, `match_phrase`, `prefix`,
//!   `wildcard`, `regexp`, `range`, `exists`, `ids`, `nested`, `bool`,
//!   `match_all`
//! - [`aggregations`] - `cardinality` / `max` / `min` / `avg` / `sum`,
//!   `percentiles`, `terms`, `date_histogram`, `range`, `date_range`,
//!   `filter`, `bucket_sort`
//! - [`search`] - the `_search` request envelope
//! - [`bulk`] - NDJSON framing for `_bulk` and per-item response decoding
//!
//! Every node implements [`Node`]: `validate()` walks the whole tree and
//! collects every problem, `to_bytes()` refuses to compile a tree with a
//! fatal problem.
//!
//! # Response side
//!
//! [`response::SearchResponse`] decodes the well-known top-level fields and
//! keeps aggregation results as raw JSON until they are asked for by name
//! with [`response::read_named`].
//!
//! ```
//! use quarry::prelude::*;
//!
//! let query = BoolQuery::new()
//!     .must(Term::new("status", "active"))
//!     .filter(Range::new("age").gte(18).lt(65));
//!
//! let body = Query::from(query).to_bytes().unwrap();
//! assert!(body.starts_with(br#"{"bool":{"must":[{"term""#));
//! ```

pub mod aggregations;
pub mod bulk;
pub mod error;
pub mod node;
pub mod query;
pub mod response;
pub mod search;
pub mod validation;

pub use error::{Error, ItemDecodeError};
pub use node::Node;
pub use validation::{ValidationResult, ValidationResults};

/// Result type for quarry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common imports for building and decoding requests
pub mod prelude {
    pub use crate::aggregations::{
        Aggregation, BucketAggregation, BucketSort, DateHistogram, DateRangeAggregation,
        FilterAggregation, Metric, MetricKind, Percentiles, RangeAggregation, TermsAggregation,
    };
    pub use crate::bulk::{BulkAction, BulkDocument, BulkRequest, BulkResponse, Document, Refresh};
    pub use crate::node::{Direction, Node, Order};
    pub use crate::query::{
        BoolQuery, Exists, Ids, Match, MatchAll, MatchPhrase, Nested, Prefix, Query, Range, Regex,
        Term, Terms, Wildcard,
    };
    pub use crate::response::{read_named, NamedResults, SearchResponse};
    pub use crate::search::{SearchRequest, SourceFilter};
}

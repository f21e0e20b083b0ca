//! The `_search` request body

use crate::aggregations::{Aggregation, SubAggregations};
use crate::node::{compile_orders, insert_some, sentinel, Node, Order};
use crate::query::Query;
use crate::validation::ValidationResults;
use serde_json::{Map, Value};

/// `_source` filtering of returned hits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFilter {
    /// `false`: return no source at all
    Disabled,
    /// A plain list of field patterns to include
    Fields(Vec<String>),
    Filter {
        includes: Vec<String>,
        excludes: Vec<String>,
    },
}

impl SourceFilter {
    pub fn fields<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self::Fields(fields.into_iter().map(Into::into).collect())
    }

    fn compile(&self) -> Value {
        match self {
            Self::Disabled => Value::Bool(false),
            Self::Fields(fields) => Value::from(fields.clone()),
            Self::Filter { includes, excludes } => {
                let mut map = Map::new();
                if !includes.is_empty() {
                    map.insert("includes".to_string(), Value::from(includes.clone()));
                }
                if !excludes.is_empty() {
                    map.insert("excludes".to_string(), Value::from(excludes.clone()));
                }
                Value::Object(map)
            }
        }
    }
}

/// A search over zero or more indices: query, named aggregations, paging,
/// sorting and source filtering.
///
/// ```
/// use quarry::prelude::*;
///
/// let request = SearchRequest::new()
///     .index("orders")
///     .query(Term::new("status", "paid"))
///     .aggregation("per_day", DateHistogram::new("created").calendar_interval("1d"))
///     .size(0);
///
/// assert_eq!(request.path(), "/orders/_search");
/// let body = String::from_utf8(request.to_bytes().unwrap()).unwrap();
/// assert!(body.starts_with(r#"{"query":{"term":{"status":"paid"}},"aggs":"#));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    pub indices: Vec<String>,
    pub query: Option<Query>,
    pub aggregations: SubAggregations,
    pub from: Option<u64>,
    pub size: Option<u64>,
    pub sort: Vec<Order>,
    pub source: Option<SourceFilter>,
    pub track_total_hits: Option<bool>,
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.indices.push(index.into());
        self
    }

    pub fn indices<S: Into<String>>(mut self, indices: impl IntoIterator<Item = S>) -> Self {
        self.indices.extend(indices.into_iter().map(Into::into));
        self
    }

    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Add a named top-level aggregation; an existing name is overwritten
    pub fn aggregation(mut self, name: impl Into<String>, aggregation: impl Into<Aggregation>) -> Self {
        self.aggregations.insert(name, aggregation);
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

    pub fn sort(mut self, order: Order) -> Self {
        self.sort.push(order);
        self
    }

    pub fn source(mut self, source: SourceFilter) -> Self {
        self.source = Some(source);
        self
    }

    pub fn track_total_hits(mut self, track: bool) -> Self {
        self.track_total_hits = Some(track);
        self
    }

    /// Endpoint path: `/{indices}/_search`, or `/_search` across all indices
    pub fn path(&self) -> String {
        if self.indices.is_empty() {
            "/_search".to_string()
        } else {
            format!("/{}/_search", self.indices.join(","))
        }
    }
}

impl Node for SearchRequest {
    fn name(&self) -> &str {
        "search"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        for (i, index) in self.indices.iter().enumerate() {
            if index.is_empty() {
                results.add_fatal(format!("{at}.indices[{i}]: index name is required"));
            }
        }
        if let Some(query) = &self.query {
            query.validate_at(&format!("{at}.query.{}", query.name()), results);
        }
        self.aggregations.validate_at(&format!("{at}.aggs"), results);
    }

    fn compile(&self) -> Value {
        let mut body = Map::new();
        if let Some(query) = &self.query {
            body.insert("query".to_string(), query.compile());
        }
        if !self.aggregations.is_empty() {
            body.insert("aggs".to_string(), self.aggregations.compile());
        }
        insert_some(&mut body, "from", self.from);
        insert_some(&mut body, "size", self.size);
        if !self.sort.is_empty() {
            body.insert("sort".to_string(), compile_orders(&self.sort));
        }
        if let Some(source) = &self.source {
            body.insert("_source".to_string(), source.compile());
        }
        insert_some(&mut body, "track_total_hits", self.track_total_hits);
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregations::{Metric, TermsAggregation};
    use crate::query::{BoolQuery, Nested, Range, Term};

    fn compact(request: &SearchRequest) -> String {
        String::from_utf8(request.to_bytes().unwrap()).unwrap()
    }

    #[test]
    fn test_empty_request() {
        assert_eq!(compact(&SearchRequest::new()), "{}");
        assert_eq!(SearchRequest::new().path(), "/_search");
    }

    #[test]
    fn test_full_request_shape() {
        let request = SearchRequest::new()
            .indices(["logs-a", "logs-b"])
            .query(BoolQuery::new().filter(Range::new("level").gte(3)))
            .aggregation("hosts", TermsAggregation::new("host").size(5))
            .from(-1)
            .size(10)
            .sort(Order::desc("@timestamp"))
            .source(SourceFilter::fields(["host", "message"]))
            .track_total_hits(true);

        assert_eq!(request.path(), "/logs-a,logs-b/_search");
        assert_eq!(
            compact(&request),
            concat!(
                r#"{"query":{"bool":{"filter":[{"range":{"level":{"gte":3}}}]}},"#,
                r#""aggs":{"hosts":{"terms":{"field":"host","size":5}}},"#,
                r#""size":10,"sort":[{"@timestamp":"desc"}],"#,
                r#""_source":["host","message"],"track_total_hits":true}"#
            )
        );
    }

    #[test]
    fn test_source_filter_shapes() {
        let request = SearchRequest::new().source(SourceFilter::Disabled);
        assert_eq!(compact(&request), r#"{"_source":false}"#);

        let request = SearchRequest::new().source(SourceFilter::Filter {
            includes: vec!["a.*".into()],
            excludes: vec!["a.secret".into()],
        });
        assert_eq!(
            compact(&request),
            r#"{"_source":{"includes":["a.*"],"excludes":["a.secret"]}}"#
        );
    }

    #[test]
    fn test_validation_covers_query_and_aggregations() {
        let request = SearchRequest::new()
            .query(Nested::new("comments"))
            .aggregation("avg", Metric::avg(""))
            .aggregation("ok", Metric::sum("n"));

        let results = request.validate();
        assert_eq!(
            results.messages(),
            vec![
                "search.query.nested: query is required",
                "search.aggs.avg.avg: field is required",
            ]
        );
        assert!(request.to_bytes().is_err());
    }

    #[test]
    fn test_empty_index_name_is_fatal() {
        let request = SearchRequest::new().index("").query(Term::new("a", 1));
        assert!(request.validate().is_fatal());
    }
}

use super::named::{NamedResults, RawResults};
use super::{ShardStats, StoreError};
use serde::de::{DeserializeOwned, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Decoded `_search` response.
///
/// Entries of `aggregations`, and any top-level key this type does not know,
/// are kept as raw spans in [`aggregations`](Self::aggregations) and read
/// with [`NamedResults::read_named`].
#[derive(Debug, Clone, Default)]
pub struct SearchResponse {
    pub took: u64,
    pub timed_out: bool,
    pub shards: Option<ShardStats>,
    pub hits: Option<Hits>,
    pub error: Option<StoreError>,
    pub status: Option<u16>,
    pub aggregations: RawResults,
}

impl SearchResponse {
    /// Decode a response body. Unknown keys never fail decoding; only a
    /// body that is not a JSON object, or a known key with the wrong shape,
    /// does.
    pub fn from_slice(body: &[u8]) -> crate::Result<Self> {
        let response: Self = serde_json::from_slice(body)?;
        debug!(
            took = response.took,
            hits = response.hits.as_ref().map(|h| h.hits.len()).unwrap_or(0),
            aggregations = response.aggregations.len(),
            "decoded search response"
        );
        Ok(response)
    }

    /// Total hit count when the store reported one
    pub fn total_hits(&self) -> Option<u64> {
        self.hits.as_ref()?.total.as_ref().map(|t| t.value)
    }

    pub fn hits(&self) -> &[Hit] {
        self.hits.as_ref().map(|h| h.hits.as_slice()).unwrap_or(&[])
    }
}

impl NamedResults for SearchResponse {
    fn raw_results(&self) -> &RawResults {
        &self.aggregations
    }
}

struct SearchResponseVisitor;

impl<'de> Visitor<'de> for SearchResponseVisitor {
    type Value = SearchResponse;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a search response object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<SearchResponse, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut response = SearchResponse::default();
        let mut unknown = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "took" => response.took = map.next_value()?,
                "timed_out" => response.timed_out = map.next_value()?,
                "_shards" => response.shards = map.next_value()?,
                "hits" => response.hits = map.next_value()?,
                "error" => response.error = map.next_value()?,
                "status" => response.status = map.next_value()?,
                "aggregations" => {
                    let aggregations: RawResults = map.next_value()?;
                    for (name, raw) in aggregations {
                        response.aggregations.insert(name, raw);
                    }
                }
                _ => {
                    let raw: Box<RawValue> = map.next_value()?;
                    unknown.push((key, raw));
                }
            }
        }
        // names under "aggregations" win over stray top-level keys
        for (name, raw) in unknown {
            if !response.aggregations.contains(&name) {
                response.aggregations.insert(name, raw);
            }
        }
        Ok(response)
    }
}

impl<'de> Deserialize<'de> for SearchResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(SearchResponseVisitor)
    }
}

/// The `hits` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalHitsRelation {
    #[default]
    Eq,
    Gte,
}

/// Hit count; older stores report a bare number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "TotalHitsRepr")]
pub struct TotalHits {
    pub value: u64,
    pub relation: TotalHitsRelation,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TotalHitsRepr {
    Count(u64),
    Object {
        value: u64,
        #[serde(default)]
        relation: TotalHitsRelation,
    },
}

impl From<TotalHitsRepr> for TotalHits {
    fn from(repr: TotalHitsRepr) -> Self {
        match repr {
            TotalHitsRepr::Count(value) => Self {
                value,
                relation: TotalHitsRelation::Eq,
            },
            TotalHitsRepr::Object { value, relation } => Self { value, relation },
        }
    }
}

/// One matching document. `_source` stays raw until asked for.
#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub raw_source: Option<Box<RawValue>>,
    #[serde(default)]
    pub sort: Vec<Value>,
}

impl Hit {
    /// Decode `_source` into `T`; `Ok(None)` when the hit carries no source
    pub fn source<T: DeserializeOwned>(&self) -> crate::Result<Option<T>> {
        match &self.raw_source {
            None => Ok(None),
            Some(raw) => Ok(Some(serde_json::from_str(raw.get())?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{read_named, MetricValue};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Product {
        name: String,
        price: f64,
    }

    const BODY: &str = r#"{
        "took": 5,
        "timed_out": false,
        "_shards": {"total": 1, "successful": 1, "skipped": 0, "failed": 0},
        "hits": {
            "total": {"value": 1, "relation": "eq"},
            "max_score": 1.0,
            "hits": [
                {"_index": "products", "_id": "1", "_score": 1.0,
                 "_source": {"name": "Laptop", "price": 999.0}}
            ]
        },
        "aggregations": {"avg_price": {"value": 999.0}},
        "suggest": {"s": []}
    }"#;

    #[test]
    fn test_known_fields() {
        let response = SearchResponse::from_slice(BODY.as_bytes()).unwrap();
        assert_eq!(response.took, 5);
        assert!(!response.timed_out);
        assert_eq!(response.shards.as_ref().map(|s| s.successful), Some(1));
        assert_eq!(response.total_hits(), Some(1));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_hit_source_decodes_on_demand() {
        let response = SearchResponse::from_slice(BODY.as_bytes()).unwrap();
        let hit = &response.hits()[0];
        assert_eq!(hit.id.as_deref(), Some("1"));
        let product: Product = hit.source().unwrap().unwrap();
        assert_eq!(
            product,
            Product {
                name: "Laptop".into(),
                price: 999.0
            }
        );
    }

    #[test]
    fn test_aggregations_and_unknown_keys_are_named_results() {
        let response = SearchResponse::from_slice(BODY.as_bytes()).unwrap();
        let avg: MetricValue = read_named(&response, "avg_price").unwrap().unwrap();
        assert_eq!(avg.value, Some(999.0));
        assert!(response.aggregations.contains("suggest"));
        assert!(read_named::<MetricValue, _>(&response, "nope").unwrap().is_none());
    }

    #[test]
    fn test_error_response() {
        let body = br#"{"error": {"type": "parsing_exception", "reason": "unknown query [foo]"}, "status": 400}"#;
        let response = SearchResponse::from_slice(body).unwrap();
        assert_eq!(response.status, Some(400));
        assert_eq!(response.error.unwrap().error_type, "parsing_exception");
    }

    #[test]
    fn test_legacy_total_and_aggregation_precedence() {
        let body = br#"{
            "hits": {"total": 42, "hits": []},
            "a": {"value": 1.0},
            "aggregations": {"a": {"value": 2.0}}
        }"#;
        let response = SearchResponse::from_slice(body).unwrap();
        assert_eq!(response.total_hits(), Some(42));
        let a: MetricValue = response.read_named("a").unwrap().unwrap();
        assert_eq!(a.value, Some(2.0));
    }

    #[test]
    fn test_non_object_body_fails() {
        assert!(SearchResponse::from_slice(b"[1, 2]").is_err());
        assert!(SearchResponse::from_slice(b"{not json").is_err());
    }
}

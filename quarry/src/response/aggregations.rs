//! Typed aggregation results
//!
//! Bucket objects mix well-known keys with caller-named sub-aggregation
//! results, so [`Bucket`] is decoded with a visitor that consumes the
//! well-known keys and keeps every other key as a raw span.

use super::named::{NamedResults, RawResults};
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Result of a single-value metric (`avg`, `sum`, `cardinality`, ...).
/// `value` is `null` for metrics over zero documents.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricValue {
    pub value: Option<f64>,
    #[serde(default)]
    pub value_as_string: Option<String>,
}

/// One percentile estimate
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Percentile {
    pub key: f64,
    pub value: Option<f64>,
}

/// Percentile estimates, from either the keyed (`{"50.0": 12}`) or the
/// array (`[{"key": 50.0, "value": 12}]`) response form
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PercentilesResult {
    #[serde(deserialize_with = "deserialize_percentiles")]
    pub values: Vec<Percentile>,
}

impl PercentilesResult {
    /// Estimate for `percent`, if the store returned it
    pub fn get(&self, percent: f64) -> Option<f64> {
        self.values
            .iter()
            .find(|p| (p.key - percent).abs() < 1e-9)
            .and_then(|p| p.value)
    }
}

fn deserialize_percentiles<'de, D>(deserializer: D) -> Result<Vec<Percentile>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Keyed(BTreeMap<String, Value>),
        List(Vec<Percentile>),
    }

    match Repr::deserialize(deserializer)? {
        Repr::List(values) => Ok(values),
        Repr::Keyed(map) => {
            let mut values = Vec::with_capacity(map.len());
            for (key, value) in map {
                // keyed form also carries "50.0_as_string" entries when a format is set
                if key.ends_with("_as_string") {
                    continue;
                }
                let key: f64 = key
                    .parse()
                    .map_err(|_| de::Error::custom(format!("invalid percentile key `{key}`")))?;
                values.push(Percentile {
                    key,
                    value: value.as_f64(),
                });
            }
            values.sort_by(|a, b| a.key.total_cmp(&b.key));
            Ok(values)
        }
    }
}

// ============================================================================
// Buckets
// ============================================================================

/// One bucket of a bucket aggregation, with its nested sub-results
#[derive(Debug, Clone, Default)]
pub struct Bucket {
    /// String for `terms`, epoch millis for `date_histogram`; absent for
    /// unkeyed ranges
    pub key: Option<Value>,
    pub key_as_string: Option<String>,
    pub doc_count: u64,
    pub from: Option<f64>,
    pub to: Option<f64>,
    pub from_as_string: Option<String>,
    pub to_as_string: Option<String>,
    pub doc_count_error_upper_bound: Option<i64>,
    pub sum_other_doc_count: Option<u64>,
    pub sub_results: RawResults,
}

impl Bucket {
    /// `key` as a string, when it is one
    pub fn key_str(&self) -> Option<&str> {
        self.key.as_ref().and_then(Value::as_str)
    }
}

impl NamedResults for Bucket {
    fn raw_results(&self) -> &RawResults {
        &self.sub_results
    }
}

struct BucketVisitor;

impl<'de> Visitor<'de> for BucketVisitor {
    type Value = Bucket;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an aggregation bucket object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Bucket, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut bucket = Bucket::default();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "key" => bucket.key = Some(map.next_value()?),
                "key_as_string" => bucket.key_as_string = map.next_value()?,
                "doc_count" => bucket.doc_count = map.next_value()?,
                "from" => bucket.from = map.next_value()?,
                "to" => bucket.to = map.next_value()?,
                "from_as_string" => bucket.from_as_string = map.next_value()?,
                "to_as_string" => bucket.to_as_string = map.next_value()?,
                "doc_count_error_upper_bound" => {
                    bucket.doc_count_error_upper_bound = map.next_value()?
                }
                "sum_other_doc_count" => bucket.sum_other_doc_count = map.next_value()?,
                _ => {
                    let raw: Box<RawValue> = map.next_value()?;
                    bucket.sub_results.insert(key, raw);
                }
            }
        }
        Ok(bucket)
    }
}

impl<'de> Deserialize<'de> for Bucket {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(BucketVisitor)
    }
}

/// `buckets` as an array, or as an object keyed by bucket key when the
/// aggregation was requested with `keyed: true`
fn deserialize_buckets<'de, D>(deserializer: D) -> Result<Vec<Bucket>, D::Error>
where
    D: Deserializer<'de>,
{
    struct BucketsVisitor;

    impl<'de> Visitor<'de> for BucketsVisitor {
        type Value = Vec<Bucket>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an array of buckets or an object of keyed buckets")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Vec<Bucket>, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut buckets = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(bucket) = seq.next_element::<Bucket>()? {
                buckets.push(bucket);
            }
            Ok(buckets)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Vec<Bucket>, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut buckets = Vec::new();
            while let Some((key, mut bucket)) = map.next_entry::<String, Bucket>()? {
                if bucket.key.is_none() {
                    bucket.key = Some(Value::String(key));
                }
                buckets.push(bucket);
            }
            Ok(buckets)
        }
    }

    deserializer.deserialize_any(BucketsVisitor)
}

/// Result of a `terms` aggregation
#[derive(Debug, Clone, Deserialize)]
pub struct TermsResult {
    #[serde(default)]
    pub doc_count_error_upper_bound: Option<i64>,
    #[serde(default)]
    pub sum_other_doc_count: Option<u64>,
    #[serde(deserialize_with = "deserialize_buckets")]
    pub buckets: Vec<Bucket>,
}

/// Result of a `date_histogram` aggregation
#[derive(Debug, Clone, Deserialize)]
pub struct DateHistogramResult {
    #[serde(deserialize_with = "deserialize_buckets")]
    pub buckets: Vec<Bucket>,
}

/// Result of a `range` or `date_range` aggregation
#[derive(Debug, Clone, Deserialize)]
pub struct RangeResult {
    #[serde(deserialize_with = "deserialize_buckets")]
    pub buckets: Vec<Bucket>,
}

macro_rules! impl_find_bucket {
    ($($ty:ty),*) => {
        $(
            impl $ty {
                /// First bucket whose `key` (or `key_as_string`) equals `key`
                pub fn bucket(&self, key: &str) -> Option<&Bucket> {
                    self.buckets.iter().find(|b| {
                        b.key_str() == Some(key) || b.key_as_string.as_deref() == Some(key)
                    })
                }
            }
        )*
    };
}

impl_find_bucket!(TermsResult, DateHistogramResult, RangeResult);

/// Result of a `filter` aggregation: a single bucket without a key
#[derive(Debug, Clone, Default)]
pub struct FilterResult {
    pub doc_count: u64,
    pub sub_results: RawResults,
}

impl<'de> Deserialize<'de> for FilterResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bucket = Bucket::deserialize(deserializer)?;
        Ok(Self {
            doc_count: bucket.doc_count,
            sub_results: bucket.sub_results,
        })
    }
}

impl NamedResults for FilterResult {
    fn raw_results(&self) -> &RawResults {
        &self.sub_results
    }
}

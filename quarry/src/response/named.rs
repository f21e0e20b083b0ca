//! Named sub-results kept as raw JSON until read by name

use crate::error::Error;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::collections::BTreeMap;

/// Name → raw JSON span of results not decoded yet.
///
/// Names are chosen by the caller when building the request, so the set of
/// keys is open. Values are decoded on demand with [`read_named`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawResults {
    entries: BTreeMap<String, Box<RawValue>>,
}

impl RawResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, raw: Box<RawValue>) -> Option<Box<RawValue>> {
        self.entries.insert(name.into(), raw)
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.entries.get(name).map(|raw| raw.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for RawResults {
    type Item = (String, Box<RawValue>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Box<RawValue>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Anything holding named sub-results: a search response, a bucket, a filter
/// result. Buckets nest, so this applies recursively down a result tree.
pub trait NamedResults {
    fn raw_results(&self) -> &RawResults;

    /// Decode the sub-result called `name` into `T`; see [`read_named`]
    fn read_named<T: DeserializeOwned>(&self, name: &str) -> crate::Result<Option<T>> {
        read_named(self, name)
    }
}

impl NamedResults for RawResults {
    fn raw_results(&self) -> &RawResults {
        self
    }
}

/// Decode the sub-result called `name` into `T`.
///
/// Returns `Ok(None)` when no such result exists, which is not a fault:
/// callers may probe for optional results. A result that exists but does not
/// decode as `T` is an [`Error::Decode`].
pub fn read_named<T, R>(results: &R, name: &str) -> crate::Result<Option<T>>
where
    T: DeserializeOwned,
    R: NamedResults + ?Sized,
{
    match results.raw_results().get(name) {
        None => Ok(None),
        Some(raw) => serde_json::from_str(raw.get())
            .map(Some)
            .map_err(|source| Error::Decode {
                name: name.to_string(),
                source,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Count {
        value: u64,
    }

    fn results() -> RawResults {
        serde_json::from_str(r#"{"a": {"value": 3}, "b": {"value": "many"}}"#).unwrap()
    }

    #[test]
    fn test_present_and_absent() {
        let results = results();
        assert_eq!(read_named::<Count, _>(&results, "a").unwrap(), Some(Count { value: 3 }));
        assert_eq!(read_named::<Count, _>(&results, "c").unwrap(), None);
    }

    #[test]
    fn test_decode_failure_is_distinct_from_absence() {
        let results = results();
        let err = results.read_named::<Count>("b").unwrap_err();
        match err {
            Error::Decode { name, .. } => assert_eq!(name, "b"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_raw_span_is_kept_verbatim() {
        let results = results();
        assert_eq!(results.get("a").map(RawValue::get), Some(r#"{"value": 3}"#));
        assert_eq!(results.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}

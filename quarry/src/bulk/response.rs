//! Decoding of `_bulk` responses, one item at a time

use super::action::ActionKind;
use crate::error::ItemDecodeError;
use crate::response::{ShardStats, StoreError};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::value::RawValue;
use std::fmt;
use tracing::warn;

/// Result of one bulk action
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResponse {
    pub action: ActionKind,
    pub index: String,
    pub id: Option<String>,
    pub version: Option<u64>,
    /// `created`, `updated`, `deleted`, `noop` or `not_found`
    pub result: Option<String>,
    pub shards: Option<ShardStats>,
    pub seq_no: Option<u64>,
    pub primary_term: Option<u64>,
    pub status: u16,
    pub error: Option<StoreError>,
}

impl ActionResponse {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }
}

#[derive(Deserialize)]
struct ItemBody {
    #[serde(rename = "_index", default)]
    index: String,
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(rename = "_version", default)]
    version: Option<u64>,
    #[serde(default)]
    result: Option<String>,
    #[serde(rename = "_shards", default)]
    shards: Option<ShardStats>,
    #[serde(rename = "_seq_no", default)]
    seq_no: Option<u64>,
    #[serde(rename = "_primary_term", default)]
    primary_term: Option<u64>,
    status: u16,
    #[serde(default)]
    error: Option<StoreError>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    took: u64,
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<Box<RawValue>>,
}

/// Decoded `_bulk` response. Items are decoded one by one, so a malformed
/// item never hides its siblings.
#[derive(Debug, Clone)]
pub struct BulkResponse {
    pub took: u64,
    /// The store's own flag: true if any action failed
    pub errors: bool,
    pub items: Vec<Result<ActionResponse, ItemDecodeError>>,
}

impl BulkResponse {
    /// Fails only when the envelope itself cannot be parsed
    pub fn from_slice(body: &[u8]) -> crate::Result<Self> {
        let envelope: Envelope = serde_json::from_slice(body)?;
        let items: Vec<_> = envelope
            .items
            .iter()
            .enumerate()
            .map(|(position, raw)| {
                decode_item(raw).inspect_err(|e| {
                    warn!(position, error = %e, "failed to decode bulk item");
                })
            })
            .collect();

        if envelope.errors {
            let failed = items
                .iter()
                .filter(|item| !matches!(item, Ok(r) if r.is_success()))
                .count();
            warn!(items = items.len(), failed, "bulk response reports errors");
        }

        Ok(Self {
            took: envelope.took,
            errors: envelope.errors,
            items,
        })
    }

    /// Items that decoded and report a failure
    pub fn failures(&self) -> impl Iterator<Item = &ActionResponse> {
        self.items
            .iter()
            .filter_map(|item| item.as_ref().ok())
            .filter(|r| !r.is_success())
    }

    /// Items that could not be decoded, with their position in the batch
    pub fn decode_errors(&self) -> impl Iterator<Item = (usize, &ItemDecodeError)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| item.as_ref().err().map(|e| (i, e)))
    }
}

/// Keys of one item in document order. Repeated keys are kept, so they count
/// towards the one-key rule instead of overwriting each other.
struct ItemEntries(Vec<(String, Box<RawValue>)>);

impl<'de> Deserialize<'de> for ItemEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = ItemEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a bulk item object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<ItemEntries, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(1));
                while let Some(entry) = map.next_entry::<String, Box<RawValue>>()? {
                    entries.push(entry);
                }
                Ok(ItemEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Decode one `{"<action>": {...}}` element
fn decode_item(raw: &RawValue) -> Result<ActionResponse, ItemDecodeError> {
    let ItemEntries(entries) =
        serde_json::from_str(raw.get()).map_err(|e| ItemDecodeError::Malformed(e.to_string()))?;
    if entries.len() != 1 {
        return Err(ItemDecodeError::KeyCount(entries.len()));
    }
    let Some((key, body)) = entries.into_iter().next() else {
        return Err(ItemDecodeError::KeyCount(0));
    };
    let action = ActionKind::from_key(&key).ok_or(ItemDecodeError::UnknownAction(key))?;
    let body: ItemBody =
        serde_json::from_str(body.get()).map_err(|e| ItemDecodeError::Malformed(e.to_string()))?;

    Ok(ActionResponse {
        action,
        index: body.index,
        id: body.id,
        version: body.version,
        result: body.result,
        shards: body.shards,
        seq_no: body.seq_no,
        primary_term: body.primary_term,
        status: body.status,
        error: body.error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "took": 30,
        "errors": true,
        "items": [
            {"index": {"_index": "items", "_id": "1", "_version": 1, "result": "created",
                       "_shards": {"total": 2, "successful": 1, "failed": 0},
                       "_seq_no": 0, "_primary_term": 1, "status": 201}},
            {"create": {"_index": "items", "_id": "2", "status": 409,
                        "error": {"type": "version_conflict_engine_exception",
                                  "reason": "[2]: version conflict, document already exists"}}},
            {"index": {"_index": "items", "status": 201}, "delete": {"_index": "items", "status": 200}},
            {},
            {"upsert": {"_index": "items", "status": 200}},
            {"delete": {"_index": "items", "_id": "9", "status": "ok"}},
            {"delete": {"_index": "items", "_id": "3", "_version": 2, "result": "not_found",
                        "status": 404, "error": null}}
        ]
    }"#;

    fn response() -> BulkResponse {
        BulkResponse::from_slice(BODY.as_bytes()).unwrap()
    }

    #[test]
    fn test_envelope() {
        let response = response();
        assert_eq!(response.took, 30);
        assert!(response.errors);
        assert_eq!(response.items.len(), 7);
    }

    #[test]
    fn test_successful_item() {
        let response = response();
        let item = response.items[0].as_ref().unwrap();
        assert_eq!(item.action, ActionKind::Index);
        assert_eq!(item.id.as_deref(), Some("1"));
        assert_eq!(item.result.as_deref(), Some("created"));
        assert_eq!(item.shards.as_ref().map(|s| s.total), Some(2));
        assert_eq!(item.seq_no, Some(0));
        assert_eq!(item.primary_term, Some(1));
        assert!(item.is_success());
    }

    #[test]
    fn test_failed_item_carries_store_error() {
        let response = response();
        let item = response.items[1].as_ref().unwrap();
        assert_eq!(item.action, ActionKind::Create);
        assert_eq!(item.status, 409);
        assert_eq!(
            item.error.as_ref().map(|e| e.error_type.as_str()),
            Some("version_conflict_engine_exception")
        );
        assert!(!item.is_success());
    }

    #[test]
    fn test_bad_items_fail_alone() {
        let response = response();
        assert_eq!(response.items[2], Err(ItemDecodeError::KeyCount(2)));
        assert_eq!(response.items[3], Err(ItemDecodeError::KeyCount(0)));
        assert_eq!(
            response.items[4],
            Err(ItemDecodeError::UnknownAction("upsert".to_string()))
        );
        assert!(matches!(response.items[5], Err(ItemDecodeError::Malformed(_))));

        let last = response.items[6].as_ref().unwrap();
        assert_eq!(last.action, ActionKind::Delete);
        assert_eq!(last.result.as_deref(), Some("not_found"));
        assert!(last.error.is_none());
    }

    #[test]
    fn test_repeated_action_key_is_not_collapsed() {
        let body = br#"{"took": 1, "errors": false, "items": [
            {"index": {"_index": "a", "status": 201}, "index": {"_index": "b", "status": 200}},
            {"index": {"_index": "c", "status": 201}}
        ]}"#;
        let response = BulkResponse::from_slice(body).unwrap();
        assert_eq!(response.items[0], Err(ItemDecodeError::KeyCount(2)));
        assert_eq!(response.items[1].as_ref().unwrap().index, "c");
    }

    #[test]
    fn test_failures_and_decode_errors() {
        let response = response();
        let failed: Vec<_> = response.failures().map(|r| r.status).collect();
        assert_eq!(failed, vec![409, 404]);

        let positions: Vec<_> = response.decode_errors().map(|(i, _)| i).collect();
        assert_eq!(positions, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_unparseable_envelope() {
        assert!(BulkResponse::from_slice(b"not json").is_err());
        assert!(BulkResponse::from_slice(br#"{"items": 5}"#).is_err());
    }
}

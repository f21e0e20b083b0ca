use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A document that can be routed into a bulk action.
///
/// `id` may be empty for `create` and `index` actions, in which case the
/// store assigns one. An empty `index` means the batch default applies.
pub trait BulkDocument: Send + Sync {
    fn id(&self) -> &str;

    fn index(&self) -> &str {
        ""
    }

    /// JSON body of the document
    fn source(&self) -> serde_json::Result<Value>;
}

/// A document held as an already-built JSON value
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub index: String,
    pub source: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, source: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            index: String::new(),
            source: source.into(),
        }
    }

    /// Build from any serializable value
    pub fn from_serialize<T: Serialize>(id: impl Into<String>, source: &T) -> serde_json::Result<Self> {
        Ok(Self::new(id, serde_json::to_value(source)?))
    }

    pub fn in_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }
}

impl BulkDocument for Document {
    fn id(&self) -> &str {
        &self.id
    }

    fn index(&self) -> &str {
        &self.index
    }

    fn source(&self) -> serde_json::Result<Value> {
        Ok(self.source.clone())
    }
}

/// The four bulk operations, named as on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Create,
    Index,
    Update,
    Delete,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Index => "index",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "create" => Some(Self::Create),
            "index" => Some(Self::Index),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation of a bulk request
pub enum BulkAction {
    /// Fails on the store side if the id already exists
    Create(Box<dyn BulkDocument>),
    /// Creates or replaces
    Index(Box<dyn BulkDocument>),
    /// Partial update; the source is sent as `{"doc": source}`
    Update(Box<dyn BulkDocument>),
    Delete { index: String, id: String },
}

impl BulkAction {
    pub fn create(document: impl BulkDocument + 'static) -> Self {
        Self::Create(Box::new(document))
    }

    pub fn index(document: impl BulkDocument + 'static) -> Self {
        Self::Index(Box::new(document))
    }

    pub fn update(document: impl BulkDocument + 'static) -> Self {
        Self::Update(Box::new(document))
    }

    pub fn delete(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Delete {
            index: index.into(),
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Create(_) => ActionKind::Create,
            Self::Index(_) => ActionKind::Index,
            Self::Update(_) => ActionKind::Update,
            Self::Delete { .. } => ActionKind::Delete,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Create(doc) | Self::Index(doc) | Self::Update(doc) => doc.id(),
            Self::Delete { id, .. } => id,
        }
    }

    /// Index named by the action itself; empty when the batch default applies
    pub fn target_index(&self) -> &str {
        match self {
            Self::Create(doc) | Self::Index(doc) | Self::Update(doc) => doc.index(),
            Self::Delete { index, .. } => index,
        }
    }

    pub(crate) fn document(&self) -> Option<&dyn BulkDocument> {
        match self {
            Self::Create(doc) | Self::Index(doc) | Self::Update(doc) => Some(doc.as_ref()),
            Self::Delete { .. } => None,
        }
    }
}

impl fmt::Debug for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkAction")
            .field("kind", &self.kind())
            .field("index", &self.target_index())
            .field("id", &self.id())
            .finish()
    }
}

/// `refresh` policy of a bulk request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Refresh {
    True,
    False,
    WaitFor,
}

impl Refresh {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::WaitFor => "wait_for",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct User {
        id: u64,
        name: &'static str,
    }

    impl BulkDocument for User {
        fn id(&self) -> &str {
            // id is not stored as a string; let the store assign one
            ""
        }

        fn source(&self) -> serde_json::Result<Value> {
            Ok(json!({"user_id": self.id, "name": self.name}))
        }
    }

    #[test]
    fn test_custom_document_defaults_to_empty_index() {
        let action = BulkAction::index(User { id: 7, name: "kim" });
        assert_eq!(action.kind(), ActionKind::Index);
        assert_eq!(action.target_index(), "");
        assert_eq!(
            action.document().unwrap().source().unwrap(),
            json!({"user_id": 7, "name": "kim"})
        );
    }

    #[test]
    fn test_debug_shows_routing() {
        let action = BulkAction::delete("users", "9");
        assert_eq!(
            format!("{action:?}"),
            r#"BulkAction { kind: Delete, index: "users", id: "9" }"#
        );
    }

    #[test]
    fn test_refresh_serde_names() {
        assert_eq!(serde_json::to_string(&Refresh::WaitFor).unwrap(), r#""wait_for""#);
        let refresh: Refresh = serde_json::from_str(r#""true""#).unwrap();
        assert_eq!(refresh, Refresh::True);
    }

    #[test]
    fn test_action_kind_from_key() {
        assert_eq!(ActionKind::from_key("update"), Some(ActionKind::Update));
        assert_eq!(ActionKind::from_key("upsert"), None);
    }
}

//! The capability shared by every query, aggregation and request node

use crate::validation::ValidationResults;
use serde_json::{Map, Value};
use tracing::debug;

/// A node that can be validated and compiled into store JSON.
///
/// Implementors provide [`validate_at`](Node::validate_at) and
/// [`compile`](Node::compile); the provided methods run validation over the
/// whole tree before anything is compiled.
pub trait Node {
    /// Wire name of the node (`term`, `bool`, `date_histogram`, ...)
    fn name(&self) -> &str;

    /// Append every problem in this node and its children to `results`.
    /// `at` locates the node in the tree and prefixes each message.
    fn validate_at(&self, at: &str, results: &mut ValidationResults);

    /// Compile without validating. Callers outside this crate should use
    /// [`to_json`](Node::to_json).
    fn compile(&self) -> Value;

    fn validate(&self) -> ValidationResults {
        let mut results = ValidationResults::new();
        self.validate_at(self.name(), &mut results);
        results
    }

    fn to_json(&self) -> crate::Result<Value> {
        self.validate().into_result()?;
        Ok(self.compile())
    }

    fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        let value = self.to_json()?;
        let bytes = serde_json::to_vec(&value)?;
        debug!(node = self.name(), bytes = bytes.len(), "compiled request node");
        Ok(bytes)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One entry of an ordering list, compiled as `{key: "asc"|"desc"}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Order {
    pub key: String,
    pub direction: Direction,
}

impl Order {
    pub fn new(key: impl Into<String>, direction: Direction) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }

    pub fn asc(key: impl Into<String>) -> Self {
        Self::new(key, Direction::Asc)
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self::new(key, Direction::Desc)
    }

    pub(crate) fn compile(&self) -> Value {
        object(self.key.clone(), Value::from(self.direction.as_str()))
    }
}

/// Compile an ordering list, keeping the caller's order
pub(crate) fn compile_orders(orders: &[Order]) -> Value {
    Value::Array(orders.iter().map(Order::compile).collect())
}

/// Single-key JSON object; most nodes compile to `{name: body}`
pub(crate) fn object(key: impl Into<String>, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.into(), value);
    Value::Object(map)
}

/// Insert `key` only when the option is set
pub(crate) fn insert_some<T: Into<Value>>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}

/// Record a fatal result when a required string (field, path, id) is empty
pub(crate) fn require(value: &str, what: &str, at: &str, results: &mut ValidationResults) {
    if value.is_empty() {
        results.add_fatal(format!("{at}: {what} is required"));
    }
}

/// Map a signed builder argument onto the sentinel convention: negative means
/// "unset, defer to the store default".
pub(crate) fn sentinel(value: i64) -> Option<u64> {
    u64::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_compiles_to_single_key_object() {
        assert_eq!(Order::desc("_count").compile(), json!({"_count": "desc"}));
        assert_eq!(Order::asc("_key").compile(), json!({"_key": "asc"}));
    }

    #[test]
    fn test_orders_keep_caller_order() {
        let orders = vec![Order::desc("_count"), Order::asc("_key")];
        let compiled = serde_json::to_string(&compile_orders(&orders)).unwrap();
        assert_eq!(compiled, r#"[{"_count":"desc"},{"_key":"asc"}]"#);
    }

    #[test]
    fn test_sentinel() {
        assert_eq!(sentinel(-1), None);
        assert_eq!(sentinel(-5), None);
        assert_eq!(sentinel(0), Some(0));
        assert_eq!(sentinel(10), Some(10));
    }
}

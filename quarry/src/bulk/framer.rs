//! NDJSON framing of bulk requests

use super::action::{ActionKind, BulkAction, BulkDocument, Refresh};
use crate::node::object;
use crate::validation::ValidationResults;
use serde_json::{Map, Value};
use tracing::debug;

/// An ordered batch of bulk actions
#[derive(Debug, Default)]
pub struct BulkRequest {
    pub actions: Vec<BulkAction>,
    /// Index for actions that do not name one; becomes part of the path
    pub default_index: Option<String>,
    pub refresh: Option<Refresh>,
}

impl BulkRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_index(mut self, index: impl Into<String>) -> Self {
        self.default_index = Some(index.into());
        self
    }

    pub fn refresh(mut self, refresh: Refresh) -> Self {
        self.refresh = Some(refresh);
        self
    }

    pub fn action(mut self, action: BulkAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn create(self, document: impl BulkDocument + 'static) -> Self {
        self.action(BulkAction::create(document))
    }

    pub fn index(self, document: impl BulkDocument + 'static) -> Self {
        self.action(BulkAction::index(document))
    }

    pub fn update(self, document: impl BulkDocument + 'static) -> Self {
        self.action(BulkAction::update(document))
    }

    pub fn delete(self, index: impl Into<String>, id: impl Into<String>) -> Self {
        self.action(BulkAction::delete(index, id))
    }

    pub fn push(&mut self, action: BulkAction) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Check the whole batch, collecting every problem
    pub fn validate(&self) -> ValidationResults {
        let mut results = ValidationResults::new();
        if self.actions.is_empty() {
            results.add_fatal("bulk: at least one action is required");
        }
        let has_default = self.default_index.as_deref().is_some_and(|i| !i.is_empty());
        for (i, action) in self.actions.iter().enumerate() {
            let at = format!("bulk.actions[{i}].{}", action.kind());
            if action.target_index().is_empty() && !has_default {
                results.add_fatal(format!("{at}: index is required when no default index is set"));
            }
            match action.kind() {
                ActionKind::Update | ActionKind::Delete if action.id().is_empty() => {
                    results.add_fatal(format!("{at}: id is required"));
                }
                _ => {}
            }
        }
        results
    }

    /// Frame the batch as NDJSON. Every line, including the last, ends with
    /// `\n`. Refuses to produce anything when validation is fatal.
    pub fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        self.validate().into_result()?;

        let mut body = Vec::new();
        for action in &self.actions {
            serde_json::to_writer(&mut body, &metadata_line(action))?;
            body.push(b'\n');

            if let Some(document) = action.document() {
                let source = document.source()?;
                let line = match action.kind() {
                    ActionKind::Update => object("doc", source),
                    _ => source,
                };
                serde_json::to_writer(&mut body, &line)?;
                body.push(b'\n');
            }
        }
        debug!(actions = self.actions.len(), bytes = body.len(), "framed bulk body");
        Ok(body)
    }

    /// `/_bulk` or `/{default_index}/_bulk`, with `?refresh=` when set
    pub fn path(&self) -> String {
        let mut path = match self.default_index.as_deref() {
            Some(index) if !index.is_empty() => format!("/{index}/_bulk"),
            _ => "/_bulk".to_string(),
        };
        if let Some(refresh) = self.refresh {
            path.push_str("?refresh=");
            path.push_str(refresh.as_str());
        }
        path
    }
}

/// `{"<kind>":{"_id":...,"_index":...}}`; each key only when non-empty
fn metadata_line(action: &BulkAction) -> Value {
    let mut meta = Map::new();
    if !action.id().is_empty() {
        meta.insert("_id".to_string(), Value::from(action.id()));
    }
    if !action.target_index().is_empty() {
        meta.insert("_index".to_string(), Value::from(action.target_index()));
    }
    object(action.kind().as_str(), Value::Object(meta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::Document;
    use serde_json::json;

    fn lines(request: &BulkRequest) -> Vec<String> {
        let body = String::from_utf8(request.to_bytes().unwrap()).unwrap();
        assert!(body.ends_with('\n'));
        body.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_create_delete_update_frames_five_lines_in_order() {
        let request = BulkRequest::new()
            .create(Document::new("a", json!({"n": 1})).in_index("items"))
            .delete("items", "b")
            .update(Document::new("c", json!({"n": 3})).in_index("items"));

        assert_eq!(
            lines(&request),
            vec![
                r#"{"create":{"_id":"a","_index":"items"}}"#,
                r#"{"n":1}"#,
                r#"{"delete":{"_id":"b","_index":"items"}}"#,
                r#"{"update":{"_id":"c","_index":"items"}}"#,
                r#"{"doc":{"n":3}}"#,
            ]
        );
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let request = BulkRequest::new().default_index("items");
        let err = request.to_bytes().unwrap_err();
        assert_eq!(
            err.validation_results().unwrap().messages(),
            vec!["bulk: at least one action is required"]
        );
    }

    #[test]
    fn test_default_index_is_not_repeated_per_line() {
        let request = BulkRequest::new()
            .default_index("items")
            .index(Document::new("1", json!({})));
        assert_eq!(lines(&request)[0], r#"{"index":{"_id":"1"}}"#);
        assert_eq!(request.path(), "/items/_bulk");
    }

    #[test]
    fn test_create_without_id_lets_store_assign() {
        let request = BulkRequest::new().create(Document::new("", json!({"n": 1})).in_index("items"));
        assert_eq!(lines(&request)[0], r#"{"create":{"_index":"items"}}"#);
    }

    #[test]
    fn test_validation_collects_every_problem() {
        let request = BulkRequest::new()
            .update(Document::new("", json!({})).in_index("items"))
            .delete("", "x")
            .index(Document::new("1", json!({})));

        let results = request.validate();
        assert_eq!(
            results.messages(),
            vec![
                "bulk.actions[0].update: id is required",
                "bulk.actions[1].delete: index is required when no default index is set",
                "bulk.actions[2].index: index is required when no default index is set",
            ]
        );
    }

    #[test]
    fn test_path_with_refresh() {
        let request = BulkRequest::new().refresh(Refresh::WaitFor);
        assert_eq!(request.path(), "/_bulk?refresh=wait_for");
    }
}

//! `_bulk` request framing and response decoding
//!
//! A bulk body is newline-delimited JSON: one metadata line per action,
//! followed by a source line for `create`, `index` and `update`.
//!
//! ```
//! use quarry::prelude::*;
//! use serde_json::json;
//!
//! let request = BulkRequest::new()
//!     .create(Document::new("1", json!({"title": "a"})).in_index("books"))
//!     .delete("books", "2");
//!
//! let body = String::from_utf8(request.to_bytes().unwrap()).unwrap();
//! assert_eq!(
//!     body,
//!     "{\"create\":{\"_id\":\"1\",\"_index\":\"books\"}}\n{\"title\":\"a\"}\n\
//!      {\"delete\":{\"_id\":\"2\",\"_index\":\"books\"}}\n"
//! );
//! ```

mod action;
mod framer;
mod response;

pub use action::{ActionKind, BulkAction, BulkDocument, Document, Refresh};
pub use framer::BulkRequest;
pub use response::{ActionResponse, BulkResponse};

//! Query DSL nodes
//!
//! [`Query`] is the sum of every supported query kind. Leaf types convert into
//! it with `From`, so builders accept any of them:
//!
//! ```
//! use quarry::prelude::*;
//!
//! let query = BoolQuery::new()
//!     .must(Match::new("title", "rust"))
//!     .must_not(Exists::new("deleted_at"))
//!     .filter(Nested::with_query("comments", Term::new("comments.author", "kim")));
//! assert!(!query.validate().is_fatal());
//! ```

mod compile;
mod types;

pub use types::{
    BoolQuery, Exists, Ids, Match, MatchAll, MatchPhrase, Nested, Operator, Prefix, Range, Regex,
    ScoreMode, Term, Terms, Wildcard,
};

use crate::node::Node;
use crate::validation::ValidationResults;
use serde_json::Value;

/// Any query node
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    MatchAll(MatchAll),
    Term(Term),
    Terms(Terms),
    Match(Match),
    MatchPhrase(MatchPhrase),
    Prefix(Prefix),
    Wildcard(Wildcard),
    Regex(Regex),
    Range(Range),
    Exists(Exists),
    Ids(Ids),
    Nested(Nested),
    Bool(BoolQuery),
}

macro_rules! each_query {
    ($query:expr, $inner:ident => $body:expr) => {
        match $query {
            Query::MatchAll($inner) => $body,
            Query::Term($inner) => $body,
            Query::Terms($inner) => $body,
            Query::Match($inner) => $body,
            Query::MatchPhrase($inner) => $body,
            Query::Prefix($inner) => $body,
            Query::Wildcard($inner) => $body,
            Query::Regex($inner) => $body,
            Query::Range($inner) => $body,
            Query::Exists($inner) => $body,
            Query::Ids($inner) => $body,
            Query::Nested($inner) => $body,
            Query::Bool($inner) => $body,
        }
    };
}

impl Node for Query {
    fn name(&self) -> &str {
        each_query!(self, q => q.name())
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        each_query!(self, q => q.validate_at(at, results))
    }

    fn compile(&self) -> Value {
        each_query!(self, q => q.compile())
    }
}

macro_rules! impl_from_query {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Query {
                fn from(query: $ty) -> Self {
                    Query::$variant(query)
                }
            }
        )*
    };
}

impl_from_query!(
    MatchAll(MatchAll),
    Term(Term),
    Terms(Terms),
    Match(Match),
    MatchPhrase(MatchPhrase),
    Prefix(Prefix),
    Wildcard(Wildcard),
    Regex(Regex),
    Range(Range),
    Exists(Exists),
    Ids(Ids),
    Nested(Nested),
    Bool(BoolQuery),
);

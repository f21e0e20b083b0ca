//! Query DSL node types
//!
//! Leaf queries hold a target field and a value, pattern or bounds.
//! [`BoolQuery`] and [`Nested`] are the only nodes that own child queries.

use super::Query;
use serde_json::Value;

/// Match operator for analyzed `match` queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// How scores of matching nested documents are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMode {
    Avg,
    Max,
    Min,
    None,
    Sum,
}

impl ScoreMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avg => "avg",
            Self::Max => "max",
            Self::Min => "min",
            Self::None => "none",
            Self::Sum => "sum",
        }
    }
}

/// Match every document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchAll {
    pub boost: Option<f64>,
}

impl MatchAll {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

/// Exact (not analyzed) match on a single value
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub field: String,
    pub value: Value,
    pub boost: Option<f64>,
}

impl Term {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            boost: None,
        }
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

/// Exact match on any of several values
#[derive(Debug, Clone, PartialEq)]
pub struct Terms {
    pub field: String,
    pub values: Vec<Value>,
    pub boost: Option<f64>,
}

impl Terms {
    pub fn new<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
            boost: None,
        }
    }

    /// Append one more accepted value
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

/// Analyzed full-text match
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub field: String,
    pub query: Value,
    pub operator: Option<Operator>,
    pub fuzziness: Option<String>,
    pub boost: Option<f64>,
}

impl Match {
    pub fn new(field: impl Into<String>, query: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
            operator: None,
            fuzziness: None,
            boost: None,
        }
    }

    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn fuzziness(mut self, fuzziness: impl Into<String>) -> Self {
        self.fuzziness = Some(fuzziness.into());
        self
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }

    /// True when any option beyond the query text is set, which forces the
    /// long form `{field: {"query": ...}}`
    pub(crate) fn has_options(&self) -> bool {
        self.operator.is_some() || self.fuzziness.is_some() || self.boost.is_some()
    }
}

/// Analyzed phrase match
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPhrase {
    pub field: String,
    pub query: String,
    pub slop: Option<u32>,
    pub boost: Option<f64>,
}

impl MatchPhrase {
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
            slop: None,
            boost: None,
        }
    }

    pub fn slop(mut self, slop: u32) -> Self {
        self.slop = Some(slop);
        self
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

/// Term-prefix match
#[derive(Debug, Clone, PartialEq)]
pub struct Prefix {
    pub field: String,
    pub value: String,
    pub case_insensitive: Option<bool>,
    pub boost: Option<f64>,
}

impl Prefix {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            case_insensitive: None,
            boost: None,
        }
    }

    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = Some(case_insensitive);
        self
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

/// Wildcard pattern match (`*` and `?`)
#[derive(Debug, Clone, PartialEq)]
pub struct Wildcard {
    pub field: String,
    pub pattern: String,
    pub case_insensitive: Option<bool>,
    pub boost: Option<f64>,
}

impl Wildcard {
    pub fn new(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            pattern: pattern.into(),
            case_insensitive: None,
            boost: None,
        }
    }

    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = Some(case_insensitive);
        self
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

/// Regular expression match, compiled as `regexp`
#[derive(Debug, Clone, PartialEq)]
pub struct Regex {
    pub field: String,
    pub pattern: String,
    pub flags: Option<String>,
    pub case_insensitive: Option<bool>,
    pub max_determinized_states: Option<u32>,
}

impl Regex {
    pub fn new(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            pattern: pattern.into(),
            flags: None,
            case_insensitive: None,
            max_determinized_states: None,
        }
    }

    pub fn flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = Some(flags.into());
        self
    }

    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = Some(case_insensitive);
        self
    }

    pub fn max_determinized_states(mut self, states: u32) -> Self {
        self.max_determinized_states = Some(states);
        self
    }
}

/// Range over numbers, dates or strings
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub field: String,
    pub gt: Option<Value>,
    pub gte: Option<Value>,
    pub lt: Option<Value>,
    pub lte: Option<Value>,
    pub format: Option<String>,
    pub time_zone: Option<String>,
    pub boost: Option<f64>,
}

impl Range {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            gt: None,
            gte: None,
            lt: None,
            lte: None,
            format: None,
            time_zone: None,
            boost: None,
        }
    }

    pub fn gt(mut self, value: impl Into<Value>) -> Self {
        self.gt = Some(value.into());
        self
    }

    pub fn gte(mut self, value: impl Into<Value>) -> Self {
        self.gte = Some(value.into());
        self
    }

    pub fn lt(mut self, value: impl Into<Value>) -> Self {
        self.lt = Some(value.into());
        self
    }

    pub fn lte(mut self, value: impl Into<Value>) -> Self {
        self.lte = Some(value.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }

    pub(crate) fn has_bounds(&self) -> bool {
        self.gt.is_some() || self.gte.is_some() || self.lt.is_some() || self.lte.is_some()
    }
}

/// Documents that have any value for `field`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exists {
    pub field: String,
}

impl Exists {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

/// Documents by `_id`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ids {
    pub values: Vec<String>,
}

impl Ids {
    pub fn new<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.values.push(id.into());
        self
    }
}

/// Query over nested objects at `path`.
///
/// The child query is optional while building; a `Nested` without one fails
/// validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Nested {
    pub path: String,
    pub query: Option<Box<Query>>,
    pub score_mode: Option<ScoreMode>,
    pub ignore_unmapped: Option<bool>,
}

impl Nested {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: None,
            score_mode: None,
            ignore_unmapped: None,
        }
    }

    pub fn with_query(path: impl Into<String>, query: impl Into<Query>) -> Self {
        Self::new(path).query(query)
    }

    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.query = Some(Box::new(query.into()));
        self
    }

    pub fn score_mode(mut self, score_mode: ScoreMode) -> Self {
        self.score_mode = Some(score_mode);
        self
    }

    pub fn ignore_unmapped(mut self, ignore_unmapped: bool) -> Self {
        self.ignore_unmapped = Some(ignore_unmapped);
        self
    }
}

/// Boolean combination of child queries.
///
/// An empty `BoolQuery` is valid, compiles to `{"bool":{}}` and matches every
/// document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<Query>,
    pub must_not: Vec<Query>,
    pub should: Vec<Query>,
    pub filter: Vec<Query>,
    pub minimum_should_match: Option<i32>,
    pub boost: Option<f64>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, query: impl Into<Query>) -> Self {
        self.must.push(query.into());
        self
    }

    pub fn must_not(mut self, query: impl Into<Query>) -> Self {
        self.must_not.push(query.into());
        self
    }

    pub fn should(mut self, query: impl Into<Query>) -> Self {
        self.should.push(query.into());
        self
    }

    pub fn filter(mut self, query: impl Into<Query>) -> Self {
        self.filter.push(query.into());
        self
    }

    pub fn minimum_should_match(mut self, count: i32) -> Self {
        self.minimum_should_match = Some(count);
        self
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.must_not.is_empty()
            && self.should.is_empty()
            && self.filter.is_empty()
    }

    /// Occurrence lists in wire order, paired with their key
    pub(crate) fn clauses(&self) -> [(&'static str, &[Query]); 4] {
        [
            ("must", self.must.as_slice()),
            ("must_not", self.must_not.as_slice()),
            ("should", self.should.as_slice()),
            ("filter", self.filter.as_slice()),
        ]
    }
}

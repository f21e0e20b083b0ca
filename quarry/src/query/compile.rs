//! Validation and compilation of query nodes

use super::types::*;
use super::Query;
use crate::node::{insert_some, object, require, Node};
use crate::validation::ValidationResults;
use serde_json::{json, Map, Value};

/// `{field: value}` when no options are set, `{field: {value_key: value, ..options}}` otherwise
fn short_or_long(field: &str, value_key: &str, value: Value, options: Map<String, Value>) -> Value {
    if options.is_empty() {
        return object(field, value);
    }
    let mut body = Map::new();
    body.insert(value_key.to_string(), value);
    body.extend(options);
    object(field, Value::Object(body))
}

impl Node for MatchAll {
    fn name(&self) -> &str {
        "match_all"
    }

    fn validate_at(&self, _at: &str, _results: &mut ValidationResults) {}

    fn compile(&self) -> Value {
        let mut body = Map::new();
        insert_some(&mut body, "boost", self.boost);
        object("match_all", Value::Object(body))
    }
}

impl Node for Term {
    fn name(&self) -> &str {
        "term"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        require(&self.field, "field", at, results);
    }

    fn compile(&self) -> Value {
        let mut options = Map::new();
        insert_some(&mut options, "boost", self.boost);
        object(
            "term",
            short_or_long(&self.field, "value", self.value.clone(), options),
        )
    }
}

impl Node for Terms {
    fn name(&self) -> &str {
        "terms"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        require(&self.field, "field", at, results);
        if self.values.is_empty() {
            results.add_advisory(format!("{at}: no values given, matches nothing"));
        }
    }

    fn compile(&self) -> Value {
        let mut body = Map::new();
        body.insert(self.field.clone(), Value::Array(self.values.clone()));
        insert_some(&mut body, "boost", self.boost);
        object("terms", Value::Object(body))
    }
}

impl Node for Match {
    fn name(&self) -> &str {
        "match"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        require(&self.field, "field", at, results);
    }

    fn compile(&self) -> Value {
        if !self.has_options() {
            return object("match", object(&self.field, self.query.clone()));
        }
        let mut options = Map::new();
        insert_some(&mut options, "operator", self.operator.map(|o| o.as_str()));
        insert_some(&mut options, "fuzziness", self.fuzziness.clone());
        insert_some(&mut options, "boost", self.boost);
        object(
            "match",
            short_or_long(&self.field, "query", self.query.clone(), options),
        )
    }
}

impl Node for MatchPhrase {
    fn name(&self) -> &str {
        "match_phrase"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        require(&self.field, "field", at, results);
    }

    fn compile(&self) -> Value {
        let mut options = Map::new();
        insert_some(&mut options, "slop", self.slop);
        insert_some(&mut options, "boost", self.boost);
        object(
            "match_phrase",
            short_or_long(&self.field, "query", Value::from(self.query.as_str()), options),
        )
    }
}

impl Node for Prefix {
    fn name(&self) -> &str {
        "prefix"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        require(&self.field, "field", at, results);
    }

    fn compile(&self) -> Value {
        let mut options = Map::new();
        insert_some(&mut options, "case_insensitive", self.case_insensitive);
        insert_some(&mut options, "boost", self.boost);
        object(
            "prefix",
            short_or_long(&self.field, "value", Value::from(self.value.as_str()), options),
        )
    }
}

impl Node for Wildcard {
    fn name(&self) -> &str {
        "wildcard"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        require(&self.field, "field", at, results);
    }

    fn compile(&self) -> Value {
        let mut options = Map::new();
        insert_some(&mut options, "case_insensitive", self.case_insensitive);
        insert_some(&mut options, "boost", self.boost);
        object(
            "wildcard",
            short_or_long(&self.field, "value", Value::from(self.pattern.as_str()), options),
        )
    }
}

impl Node for Regex {
    fn name(&self) -> &str {
        "regexp"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        require(&self.field, "field", at, results);
    }

    fn compile(&self) -> Value {
        let mut options = Map::new();
        insert_some(&mut options, "flags", self.flags.clone());
        insert_some(&mut options, "case_insensitive", self.case_insensitive);
        insert_some(
            &mut options,
            "max_determinized_states",
            self.max_determinized_states,
        );
        object(
            "regexp",
            short_or_long(&self.field, "value", Value::from(self.pattern.as_str()), options),
        )
    }
}

impl Node for Range {
    fn name(&self) -> &str {
        "range"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        require(&self.field, "field", at, results);
        if !self.has_bounds() {
            results.add_advisory(format!("{at}: no bounds given, matches any value"));
        }
    }

    fn compile(&self) -> Value {
        let mut bounds = Map::new();
        insert_some(&mut bounds, "gt", self.gt.clone());
        insert_some(&mut bounds, "gte", self.gte.clone());
        insert_some(&mut bounds, "lt", self.lt.clone());
        insert_some(&mut bounds, "lte", self.lte.clone());
        insert_some(&mut bounds, "format", self.format.clone());
        insert_some(&mut bounds, "time_zone", self.time_zone.clone());
        insert_some(&mut bounds, "boost", self.boost);
        object("range", object(&self.field, Value::Object(bounds)))
    }
}

impl Node for Exists {
    fn name(&self) -> &str {
        "exists"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        require(&self.field, "field", at, results);
    }

    fn compile(&self) -> Value {
        json!({ "exists": { "field": self.field } })
    }
}

impl Node for Ids {
    fn name(&self) -> &str {
        "ids"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        if self.values.is_empty() {
            results.add_advisory(format!("{at}: no ids given, matches nothing"));
        }
    }

    fn compile(&self) -> Value {
        json!({ "ids": { "values": self.values } })
    }
}

impl Node for Nested {
    fn name(&self) -> &str {
        "nested"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        require(&self.path, "path", at, results);
        match &self.query {
            None => results.add_fatal(format!("{at}: query is required")),
            Some(query) => query.validate_at(&format!("{at}.query.{}", query.name()), results),
        }
    }

    fn compile(&self) -> Value {
        let mut body = Map::new();
        body.insert("path".to_string(), Value::from(self.path.as_str()));
        body.insert(
            "query".to_string(),
            self.query
                .as_ref()
                .map(|q| q.compile())
                .unwrap_or_else(|| Value::Object(Map::new())),
        );
        insert_some(&mut body, "score_mode", self.score_mode.map(|m| m.as_str()));
        insert_some(&mut body, "ignore_unmapped", self.ignore_unmapped);
        object("nested", Value::Object(body))
    }
}

impl Node for BoolQuery {
    fn name(&self) -> &str {
        "bool"
    }

    fn validate_at(&self, at: &str, results: &mut ValidationResults) {
        for (key, clauses) in self.clauses() {
            for (i, child) in clauses.iter().enumerate() {
                child.validate_at(&format!("{at}.{key}[{i}].{}", child.name()), results);
            }
        }
        if self.should.is_empty() && self.minimum_should_match.is_some_and(|n| n > 0) {
            results.add_advisory(format!(
                "{at}: minimum_should_match is set but there are no should clauses"
            ));
        }
    }

    fn compile(&self) -> Value {
        let mut body = Map::new();
        for (key, clauses) in self.clauses() {
            if !clauses.is_empty() {
                body.insert(
                    key.to_string(),
                    Value::Array(clauses.iter().map(Query::compile).collect()),
                );
            }
        }
        insert_some(&mut body, "minimum_should_match", self.minimum_should_match);
        insert_some(&mut body, "boost", self.boost);
        object("bool", Value::Object(body))
    }
}

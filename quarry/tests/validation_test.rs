//! Validation is aggregated over whole trees and blocks compilation only
//! when something is fatal.

use quarry::prelude::*;
use quarry::Error;

fn messages(node: &impl Node) -> Vec<String> {
    node.validate()
        .iter()
        .map(|r| r.message.clone())
        .collect()
}

#[test]
fn test_two_invalid_children_produce_two_fatal_results() {
    let query: Query = BoolQuery::new()
        .must(Nested::with_query("", Term::new("a", 1)))
        .must(Nested::with_query("", Term::new("b", 2)))
        .into();

    let results = query.validate();
    assert_eq!(results.fatal_count(), 2);
    assert!(results.is_fatal());
}

#[test]
fn test_absent_and_invalid_nested_child_are_distinct() {
    let absent: Query = Nested::new("comments").into();
    let invalid: Query = Nested::with_query("comments", Exists::new("")).into();

    assert_eq!(messages(&absent), vec!["nested: query is required"]);
    assert_eq!(
        messages(&invalid),
        vec!["nested.query.exists: field is required"]
    );
}

#[test]
fn test_compilation_error_retains_every_message() {
    let query: Query = BoolQuery::new()
        .must(Prefix::new("", "a"))
        .should(Wildcard::new("", "*"))
        .filter(Regex::new("", ".*"))
        .must_not(MatchPhrase::new("", "x"))
        .into();

    let err = query.to_bytes().unwrap_err();
    let results = err.validation_results().unwrap();
    assert_eq!(results.fatal_count(), 4);

    let text = err.to_string();
    for clause in ["must[0].prefix", "must_not[0].match_phrase", "should[0].wildcard", "filter[0].regexp"] {
        assert!(text.contains(clause), "missing {clause} in {text}");
    }
}

#[test]
fn test_include_exclusivity() {
    let both = TermsAggregation::new("f")
        .include("x")
        .include_values(["a", "b"]);
    assert!(both.validate().is_fatal());

    assert!(!TermsAggregation::new("f").include("x").validate().is_fatal());
    assert!(!TermsAggregation::new("f")
        .include_values(["a", "b"])
        .validate()
        .is_fatal());

    let excluded = TermsAggregation::new("f")
        .exclude("x")
        .exclude_values(["a"]);
    assert!(excluded.validate().is_fatal());
}

#[test]
fn test_field_required_for_every_field_aggregation() {
    let aggregations: Vec<Aggregation> = vec![
        Metric::cardinality("").into(),
        Metric::max("").into(),
        Metric::min("").into(),
        Metric::avg("").into(),
        Metric::sum("").into(),
        Percentiles::new("").into(),
        TermsAggregation::new("").into(),
        DateHistogram::new("").calendar_interval("1d").into(),
        RangeAggregation::new("").above(1.0).into(),
        DateRangeAggregation::new("").after("now-1d").into(),
    ];

    for aggregation in aggregations {
        let expected = format!("{}: field is required", aggregation.name());
        assert_eq!(
            aggregation.validate().messages(),
            vec![expected.as_str()],
            "{aggregation:?}"
        );
    }
}

#[test]
fn test_ranges_required() {
    assert!(RangeAggregation::new("price").validate().is_fatal());
    assert!(DateRangeAggregation::new("created").validate().is_fatal());
}

#[test]
fn test_unknown_metric_tag_blocks_compilation() {
    let err = Metric::new("median", "price").to_bytes().unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn test_advisory_results_do_not_block() {
    let query: Query = BoolQuery::new()
        .filter(Range::new("age"))
        .filter(Terms::new("tag", Vec::<&str>::new()))
        .into();

    let results = query.validate();
    assert_eq!(results.len(), 2);
    assert!(!results.is_fatal());
    assert_eq!(
        String::from_utf8(query.to_bytes().unwrap()).unwrap(),
        r#"{"bool":{"filter":[{"range":{"age":{}}},{"terms":{"tag":[]}}]}}"#
    );
}

#[test]
fn test_empty_bool_is_valid() {
    let query: Query = BoolQuery::new().into();
    assert!(query.validate().is_empty());
}

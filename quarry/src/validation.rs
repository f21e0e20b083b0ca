//! Validation results collected across a node tree

use crate::error::Error;
use std::fmt;

/// A single problem found while validating a node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidationResult {
    pub message: String,
    /// Fatal results block compilation; advisory ones never do
    pub fatal: bool,
}

impl ValidationResult {
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fatal: true,
        }
    }

    pub fn advisory(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fatal: false,
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fatal {
            f.write_str(&self.message)
        } else {
            write!(f, "(advisory) {}", self.message)
        }
    }
}

/// Ordered collection of validation results.
///
/// Adding a result that is already present (same message and flag) is a
/// no-op, so revisiting a node never duplicates its findings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResults {
    results: Vec<ValidationResult>,
}

impl ValidationResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: ValidationResult) {
        if !self.results.contains(&result) {
            self.results.push(result);
        }
    }

    pub fn add_fatal(&mut self, message: impl Into<String>) {
        self.add(ValidationResult::fatal(message));
    }

    pub fn add_advisory(&mut self, message: impl Into<String>) {
        self.add(ValidationResult::advisory(message));
    }

    /// Append every result of `other`, keeping the set semantics of [`add`](Self::add)
    pub fn extend(&mut self, other: ValidationResults) {
        for result in other.results {
            self.add(result);
        }
    }

    /// True iff any result is fatal
    pub fn is_fatal(&self) -> bool {
        self.results.iter().any(|r| r.fatal)
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationResult> {
        self.results.iter()
    }

    pub fn fatal_count(&self) -> usize {
        self.results.iter().filter(|r| r.fatal).count()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.message.as_str()).collect()
    }

    /// Turn a fatal collection into [`Error::Validation`]
    pub fn into_result(self) -> crate::Result<()> {
        if self.is_fatal() {
            Err(Error::Validation(self))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for ValidationResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, result) in self.results.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", result)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValidationResults {
    type Item = &'a ValidationResult;
    type IntoIter = std::slice::Iter<'a, ValidationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl IntoIterator for ValidationResults {
    type Item = ValidationResult;
    type IntoIter = std::vec::IntoIter<ValidationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_results_are_not_readded() {
        let mut results = ValidationResults::new();
        results.add_fatal("term: field is required");
        results.add_fatal("term: field is required");
        results.add_advisory("term: field is required");

        assert_eq!(results.len(), 2);
        assert_eq!(results.fatal_count(), 1);
    }

    #[test]
    fn test_is_fatal_only_with_fatal_member() {
        let mut results = ValidationResults::new();
        assert!(!results.is_fatal());

        results.add_advisory("range: no bounds");
        assert!(!results.is_fatal());
        assert!(results.clone().into_result().is_ok());

        results.add_fatal("exists: field is required");
        assert!(results.is_fatal());
        assert!(results.into_result().is_err());
    }

    #[test]
    fn test_extend_keeps_order_and_set_semantics() {
        let mut parent = ValidationResults::new();
        parent.add_fatal("a");

        let mut child = ValidationResults::new();
        child.add_fatal("b");
        child.add_fatal("a");
        child.add_advisory("c");

        parent.extend(child);
        assert_eq!(parent.messages(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_display_lists_every_message() {
        let mut results = ValidationResults::new();
        results.add_fatal("nested: path is required");
        results.add_advisory("range: no bounds");

        let error = results.into_result().unwrap_err();
        let text = error.to_string();
        assert!(text.contains("nested: path is required"));
        assert!(text.contains("(advisory) range: no bounds"));
    }
}

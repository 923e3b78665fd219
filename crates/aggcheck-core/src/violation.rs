//! Non-compliant findings collected from an aggregator

use std::collections::HashMap;

/// A config rule that is non-compliant in one region
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComplianceViolation {
    pub rule_name: String,
    pub region: String,
}

impl ComplianceViolation {
    pub fn new(rule_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.into(),
            region: region.into(),
        }
    }
}

/// Violations grouped by rule name.
///
/// Region order within a rule is whatever order pages arrived in; callers that
/// display the index sort it first (see [`crate::report`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationIndex {
    rules: HashMap<String, Vec<String>>,
}

impl ViolationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single violation
    pub fn insert(&mut self, violation: ComplianceViolation) {
        self.rules
            .entry(violation.rule_name)
            .or_default()
            .push(violation.region);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of distinct rules with at least one violation
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Total number of recorded violations
    pub fn violation_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Rules and their regions, both sorted lexicographically
    pub fn sorted(&self) -> Vec<(&str, Vec<&str>)> {
        let mut rules: Vec<(&str, Vec<&str>)> = self
            .rules
            .iter()
            .map(|(rule, regions)| {
                let mut regions: Vec<&str> = regions.iter().map(String::as_str).collect();
                regions.sort_unstable();
                (rule.as_str(), regions)
            })
            .collect();
        rules.sort_unstable_by(|a, b| a.0.cmp(b.0));
        rules
    }
}

impl Extend<ComplianceViolation> for ViolationIndex {
    fn extend<I: IntoIterator<Item = ComplianceViolation>>(&mut self, iter: I) {
        for violation in iter {
            self.insert(violation);
        }
    }
}

impl FromIterator<ComplianceViolation> for ViolationIndex {
    fn from_iter<I: IntoIterator<Item = ComplianceViolation>>(iter: I) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_rule() {
        let index: ViolationIndex = vec![
            ComplianceViolation::new("r1", "us-west-2"),
            ComplianceViolation::new("r2", "eu-west-1"),
            ComplianceViolation::new("r1", "us-east-1"),
        ]
        .into_iter()
        .collect();

        assert_eq!(index.rule_count(), 2);
        assert_eq!(index.violation_count(), 3);
        assert_eq!(
            index.sorted(),
            vec![("r1", vec!["us-east-1", "us-west-2"]), ("r2", vec!["eu-west-1"])]
        );
    }

    #[test]
    fn test_sorted_orders_rules_and_regions() {
        let index: ViolationIndex = vec![
            ComplianceViolation::new("r2", "us-east-1"),
            ComplianceViolation::new("r1", "us-west-2"),
            ComplianceViolation::new("r1", "ap-south-1"),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            index.sorted(),
            vec![
                ("r1", vec!["ap-south-1", "us-west-2"]),
                ("r2", vec!["us-east-1"]),
            ]
        );
    }

    #[test]
    fn test_empty_index() {
        let index = ViolationIndex::new();
        assert!(index.is_empty());
        assert!(index.sorted().is_empty());
    }
}

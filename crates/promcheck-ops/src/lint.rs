//! Duplicate-rule detection.

use std::fmt;

use promcheck_config::Labels;
use promcheck_rules::{Rule, RuleGroups};
use serde::Serialize;

/// Projection of a rule used to detect rules that would overwrite each other.
///
/// Ordering is by name (bytewise), then by label set.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ComparableRule {
    pub name: String,
    pub labels: Labels,
}

impl From<&Rule> for ComparableRule {
    fn from(rule: &Rule) -> Self {
        ComparableRule {
            name: rule.name().to_owned(),
            labels: rule.label_set(),
        }
    }
}

/// Returns one entry per distinct (name, labels) value that occurs more than
/// once across all groups, in sorted order.
pub fn find_duplicates(groups: &RuleGroups) -> Vec<ComparableRule> {
    let mut rules: Vec<ComparableRule> = groups.rules().map(ComparableRule::from).collect();
    let mut duplicates: Vec<ComparableRule> = Vec::new();
    if rules.len() < 2 {
        return duplicates;
    }
    rules.sort();

    for pair in rules.windows(2) {
        if pair[0] == pair[1] && duplicates.last() != Some(&pair[1]) {
            duplicates.push(pair[1].clone());
        }
    }
    duplicates
}

/// Aggregated report of every duplicate found in one pass.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DuplicateRulesError {
    pub duplicates: Vec<ComparableRule>,
}

impl fmt::Display for DuplicateRulesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} duplicate rule(s) found.", self.duplicates.len())?;
        for rule in &self.duplicates {
            writeln!(f, "Metric: {}", rule.name)?;
            writeln!(f, "Label(s):")?;
            for label in rule.labels.iter() {
                writeln!(f, "\t{}: {}", label.name, label.value)?;
            }
        }
        f.write_str("Might cause inconsistency while recording expressions")
    }
}

impl std::error::Error for DuplicateRulesError {}

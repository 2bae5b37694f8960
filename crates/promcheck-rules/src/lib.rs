//! Rule-document model and parser.
//!
//! A rule document is a YAML file with a top-level `groups` list. Each group
//! holds alerting rules (`alert`) and recording rules (`record`). Parsing
//! performs the structural checks the evaluation engine would perform on load
//! and reports every problem it finds, not only the first. Expressions are
//! carried as text and are not parsed.

use std::collections::BTreeMap;

use promcheck_config::{Duration, Labels};
use thiserror::Error;

mod parse;

/// Parsed rule document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleGroups {
    pub groups: Vec<RuleGroup>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleGroup {
    pub name: String,
    pub interval: Option<Duration>,
    pub limit: Option<u64>,
    pub rules: Vec<Rule>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub kind: RuleKind,
    pub expr: String,
    pub for_duration: Option<Duration>,
    pub keep_firing_for: Option<Duration>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

/// Alerting and recording rules are mutually exclusive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RuleKind {
    Alerting { alert: String },
    Recording { record: String },
}

impl Rule {
    /// Alert name for alerting rules, metric name for recording rules.
    pub fn name(&self) -> &str {
        match &self.kind {
            RuleKind::Alerting { alert } => alert,
            RuleKind::Recording { record } => record,
        }
    }

    pub fn is_alerting(&self) -> bool {
        matches!(self.kind, RuleKind::Alerting { .. })
    }

    /// The rule's labels as a sorted label set.
    pub fn label_set(&self) -> Labels {
        Labels::from_map(&self.labels)
    }
}

impl RuleGroups {
    /// Parses `contents` and validates its structure. All validation problems
    /// are returned together.
    pub fn parse(contents: &str, options: ParseOptions) -> Result<Self, Vec<RuleParseError>> {
        parse::parse_document(contents, options)
    }

    /// Total rules across every group.
    pub fn rule_count(&self) -> usize {
        self.groups.iter().map(|group| group.rules.len()).sum()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.groups.iter().flat_map(|group| group.rules.iter())
    }
}

/// Parser behaviour switches.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ParseOptions {
    /// Reject fields the rule grammar does not define.
    pub strict: bool,
}

impl ParseOptions {
    pub fn strict() -> Self {
        ParseOptions { strict: true }
    }
}

#[derive(Debug, Error)]
pub enum RuleParseError {
    #[error("{0}")]
    Syntax(serde_yaml::Error),
    #[error("field {field:?} not found in {section}")]
    UnknownField { section: String, field: String },
    #[error("{message}")]
    Group { group: String, message: String },
    #[error("group {group:?}, rule {index}, {name:?}: {message}")]
    Rule {
        group: String,
        /// 1-based position within the group.
        index: usize,
        name: String,
        message: String,
    },
}

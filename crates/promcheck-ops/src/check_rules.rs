//! Rule-document checks.

use promcheck_config::LintConfig;
use promcheck_rules::{ParseOptions, RuleGroups};
use tracing::{debug, warn};

use crate::error::OperationError;
use crate::lint::{find_duplicates, ComparableRule, DuplicateRulesError};

/// Result of checking parsed rule groups.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RulesCheckOutcome {
    pub rule_count: usize,
    /// Duplicates found by a non-fatal lint run.
    pub duplicates: Vec<ComparableRule>,
}

/// Parses a rule document and lints it with every check enabled and fatal.
/// Returns the number of rules on success.
pub fn check_rules(contents: &str) -> Result<usize, Vec<OperationError>> {
    check_rules_with(contents, LintConfig::strict(), ParseOptions::default())
        .map(|outcome| outcome.rule_count)
}

/// Like [`check_rules`] with caller-chosen lint and parse settings.
pub fn check_rules_with(
    contents: &str,
    lint: LintConfig,
    options: ParseOptions,
) -> Result<RulesCheckOutcome, Vec<OperationError>> {
    let groups = RuleGroups::parse(contents, options)
        .map_err(|errors| errors.into_iter().map(OperationError::from).collect::<Vec<_>>())?;
    check_rule_groups(&groups, lint).map_err(|err| vec![err])
}

/// Counts rules and runs the enabled lints. Findings fail the call only when
/// the lint configuration is fatal.
pub fn check_rule_groups(
    groups: &RuleGroups,
    lint: LintConfig,
) -> Result<RulesCheckOutcome, OperationError> {
    let rule_count = groups.rule_count();
    debug!(groups = groups.groups.len(), rules = rule_count, "checking rule groups");

    if !lint.lint_duplicate_rules() {
        return Ok(RulesCheckOutcome {
            rule_count,
            duplicates: Vec::new(),
        });
    }

    let duplicates = find_duplicates(groups);
    if duplicates.is_empty() {
        return Ok(RulesCheckOutcome {
            rule_count,
            duplicates,
        });
    }
    if lint.is_fatal() {
        return Err(DuplicateRulesError { duplicates }.into());
    }
    warn!(count = duplicates.len(), "duplicate rules found");
    Ok(RulesCheckOutcome {
        rule_count,
        duplicates,
    })
}

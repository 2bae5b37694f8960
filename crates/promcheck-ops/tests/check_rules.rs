use pretty_assertions::assert_eq;
use promcheck_config::LintConfig;
use promcheck_ops::{check_rules, check_rules_with, ErrorKind};
use promcheck_rules::ParseOptions;
use promcheck_test_support::{DUPLICATE_RULES, VALID_RULES};

#[test]
fn counts_rules_across_groups() {
    assert_eq!(check_rules(VALID_RULES).expect("valid rules"), 3);
}

#[test]
fn empty_document_has_no_rules() {
    assert_eq!(check_rules("").expect("empty document"), 0);
    assert_eq!(check_rules("groups: []\n").expect("no groups"), 0);
}

#[test]
fn duplicate_rules_fail_by_default() {
    let errors = check_rules(DUPLICATE_RULES).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), ErrorKind::DuplicateRules);
    assert_eq!(
        errors[0].to_string(),
        "lint error 1 duplicate rule(s) found.\nMetric: up_total\nLabel(s):\nMight cause inconsistency while recording expressions"
    );
}

#[test]
fn three_identical_rules_are_one_duplicate() {
    let doc = r#"
groups:
  - name: a
    rules:
      - record: job:up:sum
        expr: sum(up)
        labels:
          team: infra
      - record: job:up:sum
        expr: sum by (job) (up)
        labels:
          team: infra
  - name: b
    rules:
      - record: job:up:sum
        expr: count(up)
        labels:
          team: infra
"#;
    let outcome = check_rules_with(
        doc,
        LintConfig::new("duplicate-rules", false),
        ParseOptions::default(),
    )
    .expect("non-fatal lint");
    assert_eq!(outcome.rule_count, 3);
    assert_eq!(outcome.duplicates.len(), 1);
    assert_eq!(outcome.duplicates[0].name, "job:up:sum");
    assert_eq!(outcome.duplicates[0].labels.get("team"), Some("infra"));
}

#[test]
fn differing_labels_are_not_duplicates() {
    let doc = r#"
groups:
  - name: g
    rules:
      - alert: HighLatency
        expr: latency > 1
        labels:
          severity: page
      - alert: HighLatency
        expr: latency > 0.5
        labels:
          severity: ticket
"#;
    assert_eq!(check_rules(doc).expect("distinct label sets"), 2);
}

#[test]
fn disabled_lint_ignores_duplicates() {
    let outcome = check_rules_with(
        DUPLICATE_RULES,
        LintConfig::new("none", true),
        ParseOptions::default(),
    )
    .expect("lint disabled");
    assert_eq!(outcome.rule_count, 2);
    assert!(outcome.duplicates.is_empty());
}

#[test]
fn parse_errors_are_returned_together() {
    let doc = r#"
groups:
  - name: ""
    rules: []
  - name: g
    rules:
      - record: "bad name"
        expr: up
      - alert: NoExpr
"#;
    let errors = check_rules(doc).unwrap_err();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().all(|err| err.kind() == ErrorKind::RuleParse));
    assert_eq!(errors[0].to_string(), "Groupname must not be empty");
    assert_eq!(
        errors[1].to_string(),
        "group \"g\", rule 1, \"bad name\": invalid recording rule name: bad name"
    );
    assert_eq!(
        errors[2].to_string(),
        "group \"g\", rule 2, \"NoExpr\": field 'expr' must be set in rule"
    );
}

#[test]
fn strict_parsing_rejects_unknown_fields() {
    let doc = "groups:\n  - name: g\n    rules:\n      - record: a\n        expr: up\n        owner: me\n";
    assert!(check_rules(doc).is_ok());

    let errors = check_rules_with(doc, LintConfig::strict(), ParseOptions::strict()).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), ErrorKind::RuleParse);
}

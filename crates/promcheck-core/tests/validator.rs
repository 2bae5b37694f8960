use pretty_assertions::assert_eq;
use promcheck_config::LintConfig;
use promcheck_core::{check_config, check_rules, Input, Validator, ValidatorOptions};
use promcheck_format::{CheckKind, CheckStatus};
use promcheck_test_support::{Fixture, DUPLICATE_RULES, VALID_RULES};

#[test]
fn config_file_checks_resolved_rule_files() {
    let fixture = Fixture::new();
    fixture.write("rules/a.yml", VALID_RULES);
    fixture.write("rules/b.yml", DUPLICATE_RULES);
    let config = fixture.write(
        "prometheus.yml",
        "rule_files:\n  - rules/*.yml\nscrape_configs:\n  - job_name: self\n    static_configs:\n      - targets: [\"localhost:9090\"]\n",
    );

    let reports = Validator::new(ValidatorOptions::default()).check_config_file(&Input::Path(config));
    assert_eq!(reports.len(), 3);

    assert_eq!(reports[0].kind, CheckKind::Config);
    assert_eq!(reports[0].status, CheckStatus::Success);
    assert_eq!(reports[0].rule_files.as_ref().map(Vec::len), Some(2));

    assert_eq!(reports[1].status, CheckStatus::Success);
    assert_eq!(reports[1].rule_count, Some(3));

    assert_eq!(reports[2].status, CheckStatus::LintFailed);
    assert_eq!(reports[2].errors[0].kind, "duplicate-rules");
}

#[test]
fn syntax_only_skips_rule_files() {
    let fixture = Fixture::new();
    let config = fixture.write("prometheus.yml", "rule_files:\n  - missing.yml\n");

    let validator = Validator::new(ValidatorOptions {
        syntax_only: true,
        ..ValidatorOptions::default()
    });
    let reports = validator.check_config_file(&Input::Path(config));
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, CheckStatus::Success);
    assert_eq!(reports[0].rule_files, None);
}

#[test]
fn config_failure_is_reported() {
    let fixture = Fixture::new();
    let config = fixture.write("prometheus.yml", "rule_files:\n  - missing.yml\n");

    let reports = Validator::new(ValidatorOptions::default()).check_config_file(&Input::Path(config));
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, CheckStatus::Failed);
    assert_eq!(reports[0].errors[0].kind, "missing-file");
    assert!(reports[0].errors[0].message.contains("missing.yml"));
}

#[test]
fn non_fatal_lint_reports_warning() {
    let fixture = Fixture::new();
    let rules = fixture.write("rules.yml", DUPLICATE_RULES);

    let validator = Validator::new(ValidatorOptions {
        syntax_only: false,
        lint: LintConfig::new("duplicate-rules", false),
    });
    let report = validator.check_rules_file(&Input::Path(rules));
    assert_eq!(report.status, CheckStatus::Success);
    assert_eq!(report.rule_count, Some(2));
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].starts_with("  WARNING: 1 duplicate rule(s) found."));
}

#[test]
fn unreadable_input() {
    let fixture = Fixture::new();
    let report = Validator::new(ValidatorOptions::default())
        .check_rules_file(&Input::Path(fixture.path("absent.yml")));
    assert_eq!(report.status, CheckStatus::Unreadable);
    assert_eq!(report.errors[0].kind, "io");
}

#[test]
fn rule_parse_errors_are_all_reported() {
    let fixture = Fixture::new();
    let rules = fixture.write(
        "rules.yml",
        "groups:\n  - name: g\n    rules:\n      - expr: up\n  - name: g\n    rules: []\n",
    );
    let report = Validator::new(ValidatorOptions::default()).check_rules_file(&Input::Path(rules));
    assert_eq!(report.status, CheckStatus::Failed);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors.iter().all(|finding| finding.kind == "rule-parse"));
}

#[test]
fn document_entry_points() {
    assert_eq!(check_rules(VALID_RULES).expect("valid rules"), 3);
    assert_eq!(check_rules(DUPLICATE_RULES).unwrap_err().len(), 1);

    let paths = check_config("rule_files:\n  - /nonexistent/*.yml\n", true).expect("syntax only");
    assert!(paths.is_empty());
    assert!(check_config("rule_files:\n  - /nonexistent/rules.yml\n", false).is_err());
}

#[test]
fn stdin_argument() {
    assert_eq!(Input::from_arg("-".as_ref()), Input::Stdin);
    assert_eq!(Input::Stdin.to_string(), "(stdin)");
}

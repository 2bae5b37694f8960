//! Core orchestration layer for promcheck.
//!
//! [`check_config`] and [`check_rules`] are the two document-level entry
//! points. [`Validator`] drives them over files and standard input and
//! produces the reports the CLI renders.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use promcheck_config::LintConfig;
use promcheck_format::{CheckKind, CheckStatus, FileReport, Finding};
use promcheck_ops::{
    check_rule_groups, CheckOptions, DuplicateRulesError, ErrorKind, OperationError,
};
use promcheck_rules::{ParseOptions, RuleGroups};
use tracing::{debug, info};

/// Validates a configuration document and returns the rule files it
/// references. Relative paths resolve against the working directory, and
/// discovery warnings are printed to standard output.
pub fn check_config(contents: &str, syntax_only: bool) -> Result<Vec<PathBuf>, OperationError> {
    let options = if syntax_only {
        CheckOptions::syntax_only()
    } else {
        CheckOptions::default()
    };
    promcheck_ops::check_config(contents, &options).map(|outcome| outcome.rule_files)
}

/// Validates a rule document with every lint enabled and fatal. Returns the
/// rule count or every error found.
pub fn check_rules(contents: &str) -> Result<usize, Vec<OperationError>> {
    promcheck_ops::check_rules(contents)
}

/// A file argument; `-` means standard input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Input {
    Stdin,
    Path(PathBuf),
}

impl Input {
    pub fn from_arg(arg: &Path) -> Self {
        if arg == Path::new("-") {
            Input::Stdin
        } else {
            Input::Path(arg.to_path_buf())
        }
    }

    fn read(&self) -> io::Result<String> {
        match self {
            Input::Stdin => {
                let mut contents = String::new();
                io::stdin().read_to_string(&mut contents)?;
                Ok(contents)
            }
            Input::Path(path) => std::fs::read_to_string(path),
        }
    }

    /// Directory relative references in a configuration resolve against.
    fn base_dir(&self) -> Option<PathBuf> {
        match self {
            Input::Stdin => None,
            Input::Path(path) => path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf),
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Stdin => f.write_str("(stdin)"),
            Input::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ValidatorOptions {
    pub syntax_only: bool,
    pub lint: LintConfig,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        ValidatorOptions {
            syntax_only: false,
            lint: LintConfig::strict(),
        }
    }
}

/// File-level driver behind the `check` commands.
pub struct Validator {
    options: ValidatorOptions,
}

impl Validator {
    pub fn new(options: ValidatorOptions) -> Self {
        Self { options }
    }

    /// Checks a configuration file, then every rule file it resolves. The
    /// configuration report comes first.
    pub fn check_config_file(&self, input: &Input) -> Vec<FileReport> {
        let name = input.to_string();
        let contents = match input.read() {
            Ok(contents) => contents,
            Err(err) => return vec![unreadable(name, CheckKind::Config, &err)],
        };

        let mut options = CheckOptions {
            syntax_only: self.options.syntax_only,
            ..CheckOptions::default()
        }
        .with_echo_warnings(false);
        options.base_dir = input.base_dir();

        let outcome = match promcheck_ops::check_config(&contents, &options) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(input = %name, kind = %err.kind(), "configuration check failed");
                return vec![FileReport::failure(
                    name,
                    CheckKind::Config,
                    CheckStatus::Failed,
                    vec![finding(&err)],
                )];
            }
        };

        let mut report =
            FileReport::success(name, CheckKind::Config).with_warnings(outcome.warnings);
        if !self.options.syntax_only {
            report = report.with_rule_files(
                outcome
                    .rule_files
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect(),
            );
        }

        let mut reports = vec![report];
        for rule_file in outcome.rule_files {
            reports.push(self.check_rules_file(&Input::Path(rule_file)));
        }
        reports
    }

    pub fn check_rules_file(&self, input: &Input) -> FileReport {
        let name = input.to_string();
        let contents = match input.read() {
            Ok(contents) => contents,
            Err(err) => return unreadable(name, CheckKind::Rules, &err),
        };

        let groups = match RuleGroups::parse(&contents, ParseOptions::default()) {
            Ok(groups) => groups,
            Err(errors) => {
                let findings = errors
                    .into_iter()
                    .map(|err| finding(&OperationError::from(err)))
                    .collect();
                return FileReport::failure(name, CheckKind::Rules, CheckStatus::Failed, findings);
            }
        };

        match check_rule_groups(&groups, self.options.lint) {
            Ok(outcome) => {
                info!(input = %name, rules = outcome.rule_count, "rule check passed");
                let mut report =
                    FileReport::success(name, CheckKind::Rules).with_rule_count(outcome.rule_count);
                if !outcome.duplicates.is_empty() {
                    let duplicates = DuplicateRulesError {
                        duplicates: outcome.duplicates,
                    };
                    report = report.with_warnings(vec![format!("  WARNING: {duplicates}")]);
                }
                report
            }
            Err(err) => {
                let status = if err.kind() == ErrorKind::DuplicateRules {
                    CheckStatus::LintFailed
                } else {
                    CheckStatus::Failed
                };
                FileReport::failure(name, CheckKind::Rules, status, vec![finding(&err)])
            }
        }
    }
}

fn finding(err: &OperationError) -> Finding {
    Finding::new(err.kind().as_str(), err.to_string())
}

fn unreadable(name: String, kind: CheckKind, err: &io::Error) -> FileReport {
    let message = format!("failed to read {name}: {err}");
    FileReport::failure(
        name,
        kind,
        CheckStatus::Unreadable,
        vec![Finding::new(ErrorKind::Io.as_str(), message)],
    )
}

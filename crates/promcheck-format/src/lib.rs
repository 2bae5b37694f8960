//! Report rendering for promcheck commands.
//!
//! Checks produce one [`FileReport`] per inspected file. A [`Report`] collects
//! them, derives the process exit code, and renders either the plain text
//! layout or a JSON document.

use std::fmt::Write as _;

use serde::Serialize;

/// Output layout selected on the command line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Config,
    Rules,
}

/// Outcome of checking one file, ordered by how it affects the exit code.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Success,
    LintFailed,
    Failed,
    Unreadable,
}

impl CheckStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            CheckStatus::Success => 0,
            CheckStatus::Failed => 1,
            CheckStatus::LintFailed => 3,
            CheckStatus::Unreadable => 4,
        }
    }
}

/// One error attached to a report.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Finding {
    pub kind: String,
    pub message: String,
}

impl Finding {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Finding {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FileReport {
    pub path: String,
    pub kind: CheckKind,
    pub status: CheckStatus,
    /// Rule files resolved by a configuration check. Absent in syntax-only
    /// mode and for rule checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_files: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_count: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Finding>,
}

impl FileReport {
    pub fn success(path: impl Into<String>, kind: CheckKind) -> Self {
        FileReport {
            path: path.into(),
            kind,
            status: CheckStatus::Success,
            rule_files: None,
            rule_count: None,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn failure(
        path: impl Into<String>,
        kind: CheckKind,
        status: CheckStatus,
        errors: Vec<Finding>,
    ) -> Self {
        FileReport {
            status,
            errors,
            ..FileReport::success(path, kind)
        }
    }

    pub fn with_rule_files(mut self, files: Vec<String>) -> Self {
        self.rule_files = Some(files);
        self
    }

    pub fn with_rule_count(mut self, count: usize) -> Self {
        self.rule_count = Some(count);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    fn render_plain(&self, out: &mut String) {
        let _ = writeln!(out, "Checking {}", self.path);
        for warning in &self.warnings {
            let _ = writeln!(out, "{warning}");
        }
        if self.status == CheckStatus::Success {
            match self.kind {
                CheckKind::Config => {
                    if let Some(files) = &self.rule_files {
                        let _ = writeln!(out, " SUCCESS: {} rule files found", files.len());
                    }
                    let _ = writeln!(out, " SUCCESS: {} is valid configuration syntax", self.path);
                }
                CheckKind::Rules => {
                    let _ = writeln!(out, "  SUCCESS: {} rules found", self.rule_count.unwrap_or(0));
                }
            }
        } else {
            out.push_str("  FAILED:\n");
            for error in &self.errors {
                let _ = writeln!(out, "{}", error.message);
            }
        }
        out.push('\n');
    }
}

/// Every file report produced by one invocation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Report {
    pub files: Vec<FileReport>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    success: bool,
    exit_code: i32,
    files: &'a [FileReport],
}

impl Report {
    pub fn push(&mut self, report: FileReport) {
        self.files.push(report);
    }

    pub fn is_success(&self) -> bool {
        self.files
            .iter()
            .all(|file| file.status == CheckStatus::Success)
    }

    /// Unreadable input wins over check failures, which win over lint
    /// failures.
    pub fn exit_code(&self) -> i32 {
        [
            CheckStatus::Unreadable,
            CheckStatus::Failed,
            CheckStatus::LintFailed,
        ]
        .into_iter()
        .find(|status| self.files.iter().any(|file| file.status == *status))
        .map_or(0, CheckStatus::exit_code)
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Plain => {
                let mut out = String::new();
                for file in &self.files {
                    file.render_plain(&mut out);
                }
                Ok(out)
            }
            OutputFormat::Json => {
                let payload = JsonReport {
                    success: self.is_success(),
                    exit_code: self.exit_code(),
                    files: &self.files,
                };
                let mut rendered = serde_json::to_string_pretty(&payload)?;
                rendered.push('\n');
                Ok(rendered)
            }
        }
    }
}

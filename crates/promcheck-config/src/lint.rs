//! Lint selection for rule documents.

use std::fmt;

use tracing::warn;

/// Individual lint options accepted in the comma-separated option string.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LintOption {
    All,
    DuplicateRules,
    None,
}

impl LintOption {
    pub fn as_str(self) -> &'static str {
        match self {
            LintOption::All => "all",
            LintOption::DuplicateRules => "duplicate-rules",
            LintOption::None => "none",
        }
    }
}

impl fmt::Display for LintOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LintOption {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(LintOption::All),
            "duplicate-rules" => Ok(LintOption::DuplicateRules),
            "none" => Ok(LintOption::None),
            _ => Err(()),
        }
    }
}

/// Immutable set of enabled lint checks plus whether findings are fatal.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LintConfig {
    all: bool,
    duplicate_rules: bool,
    fatal: bool,
}

impl LintConfig {
    /// Parses a comma-separated option string such as `"all"` or
    /// `"duplicate-rules,none"`. Unknown options are reported and skipped.
    pub fn new(options: &str, fatal: bool) -> Self {
        let mut config = LintConfig {
            fatal,
            ..LintConfig::default()
        };
        for setting in options.split(',') {
            match setting.parse::<LintOption>() {
                Ok(LintOption::All) => config.all = true,
                Ok(LintOption::DuplicateRules) => config.duplicate_rules = true,
                Ok(LintOption::None) => {}
                Err(()) => warn!(option = setting, "unknown lint option {setting}"),
            }
        }
        config
    }

    /// Everything enabled and fatal.
    pub fn strict() -> Self {
        LintConfig::new(LintOption::All.as_str(), true)
    }

    pub fn lint_duplicate_rules(&self) -> bool {
        self.all || self.duplicate_rules
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }
}

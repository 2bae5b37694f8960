use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use promcheck_config::{ConfigError, DurationError};
use promcheck_rules::RuleParseError;
use thiserror::Error;

use crate::lint::DuplicateRulesError;

/// Errors surfaced by validation operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    ConfigParse(#[from] ConfigError),
    #[error("error loading scrape configs: {0}")]
    ScrapeConfigResolution(#[source] Box<OperationError>),
    #[error("invalid glob pattern {pattern:?}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("{}", describe_missing(.role, .path, .source.as_ref()))]
    MissingFile {
        role: FileRole,
        path: PathBuf,
        #[source]
        source: Option<io::Error>,
    },
    #[error(transparent)]
    TlsPair(#[from] TlsPairError),
    #[error("invalid file extension: {extension:?}")]
    UnsupportedFormat { path: PathBuf, extension: String },
    #[error("nil target group item found (index {index})")]
    NullEntry { path: PathBuf, index: usize },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("instance {index} in group {group}: {source}")]
    TargetExpansion {
        index: usize,
        group: String,
        #[source]
        source: ExpansionError,
    },
    #[error(transparent)]
    RuleParse(#[from] RuleParseError),
    #[error("lint error {0}")]
    DuplicateRules(#[from] DuplicateRulesError),
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<OperationError>,
    },
}

/// Coarse classification of [`OperationError`], looking through context wrappers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    ConfigParse,
    ScrapeConfigResolution,
    Glob,
    MissingFile,
    TlsPair,
    UnsupportedFormat,
    NullEntry,
    Io,
    Decode,
    TargetExpansion,
    RuleParse,
    DuplicateRules,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ConfigParse => "config-parse",
            ErrorKind::ScrapeConfigResolution => "scrape-config-resolution",
            ErrorKind::Glob => "glob",
            ErrorKind::MissingFile => "missing-file",
            ErrorKind::TlsPair => "tls-pair",
            ErrorKind::UnsupportedFormat => "unsupported-format",
            ErrorKind::NullEntry => "null-entry",
            ErrorKind::Io => "io",
            ErrorKind::Decode => "decode",
            ErrorKind::TargetExpansion => "target-expansion",
            ErrorKind::RuleParse => "rule-parse",
            ErrorKind::DuplicateRules => "duplicate-rules",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl OperationError {
    /// Classification of the error. Context wrappers report the kind of the
    /// error they wrap; scrape-config resolution failures keep their own kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OperationError::ConfigParse(_) => ErrorKind::ConfigParse,
            OperationError::ScrapeConfigResolution(_) => ErrorKind::ScrapeConfigResolution,
            OperationError::Glob { .. } => ErrorKind::Glob,
            OperationError::MissingFile { .. } => ErrorKind::MissingFile,
            OperationError::TlsPair(_) => ErrorKind::TlsPair,
            OperationError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            OperationError::NullEntry { .. } => ErrorKind::NullEntry,
            OperationError::Io { .. } => ErrorKind::Io,
            OperationError::Decode { .. } => ErrorKind::Decode,
            OperationError::TargetExpansion { .. } => ErrorKind::TargetExpansion,
            OperationError::RuleParse(_) => ErrorKind::RuleParse,
            OperationError::DuplicateRules(_) => ErrorKind::DuplicateRules,
            OperationError::Context { source, .. } => source.kind(),
        }
    }

    pub fn with_context(self, context: impl Into<String>) -> Self {
        OperationError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error beneath any context wrappers.
    pub fn root(&self) -> &OperationError {
        match self {
            OperationError::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Which configured file a [`OperationError::MissingFile`] refers to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FileRole {
    RuleFile,
    Credentials,
    ClientCert,
    ClientKey,
}

fn describe_missing(role: &FileRole, path: &Path, source: Option<&io::Error>) -> String {
    let path = quoted(path);
    let cause = source
        .map(ToString::to_string)
        .unwrap_or_else(|| "no such file".to_owned());
    match (*role, source) {
        (FileRole::RuleFile, None) => format!("{path} does not point to an existing file"),
        (FileRole::RuleFile, Some(_)) => format!("error checking rule file {path}: {cause}"),
        (FileRole::Credentials, _) => format!(
            "error checking authorization credentials or bearer token file {path}: {cause}"
        ),
        (FileRole::ClientCert, _) => format!("error checking client cert file {path}: {cause}"),
        (FileRole::ClientKey, _) => format!("error checking client key file {path}: {cause}"),
    }
}

/// Renders a path as a double-quoted, escaped string.
pub(crate) fn quoted(path: &Path) -> String {
    format!("{:?}", path.to_string_lossy())
}

/// A client certificate configured without its key, or the reverse.
#[derive(Debug, Error)]
pub enum TlsPairError {
    #[error("client cert file {} specified without client key file", quoted(.cert))]
    CertWithoutKey { cert: PathBuf },
    #[error("client key file {} specified without client cert file", quoted(.key))]
    KeyWithoutCert { key: PathBuf },
}

/// Failure decoding a target-group file.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("target group {index}: {message}")]
    InvalidGroup { index: usize, message: String },
}

/// Reasons a single discovered target cannot be turned into a scrape target
/// or alertmanager endpoint.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ExpansionError {
    #[error("no address")]
    NoAddress,
    #[error("invalid scheme: {0:?}")]
    InvalidScheme(String),
    #[error("{0:?} is not a valid hostname")]
    InvalidHostname(String),
    #[error("error parsing scrape interval: {0}")]
    InvalidInterval(DurationError),
    #[error("error parsing scrape timeout: {0}")]
    InvalidTimeout(DurationError),
    #[error("scrape interval cannot be 0")]
    ZeroInterval,
    #[error("scrape timeout cannot be 0")]
    ZeroTimeout,
    #[error("scrape timeout cannot be greater than scrape interval ({timeout:?} > {interval:?})")]
    TimeoutExceedsInterval { timeout: String, interval: String },
}

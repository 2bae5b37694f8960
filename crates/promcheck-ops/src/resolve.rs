//! File-reference resolution: glob expansion and existence checks.

use std::fs;
use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use promcheck_config::TlsConfig;
use tracing::trace;
use walkdir::WalkDir;

use crate::error::{FileRole, OperationError, TlsPairError};

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Whether `pattern` contains glob metacharacters.
pub fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(GLOB_META)
}

/// Expands `pattern` into the sorted list of existing paths it matches.
///
/// A pattern without metacharacters resolves to itself when the path exists
/// (dangling symlinks included) and to nothing otherwise. `*`, `?` and
/// character classes never cross a `/`; `**` matches any number of
/// directories.
pub fn resolve_glob(pattern: &str) -> Result<Vec<PathBuf>, OperationError> {
    if !has_glob_meta(pattern) {
        return Ok(match fs::symlink_metadata(pattern) {
            Ok(_) => vec![PathBuf::from(pattern)],
            Err(_) => Vec::new(),
        });
    }

    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| OperationError::Glob {
            pattern: pattern.to_owned(),
            source,
        })?
        .compile_matcher();

    let segments: Vec<&str> = pattern.split('/').collect();
    let first_meta = segments
        .iter()
        .position(|segment| has_glob_meta(segment))
        .unwrap_or(segments.len());
    let prefix = segments[..first_meta].join("/");
    let (base, implicit_base) = if prefix.is_empty() {
        if pattern.starts_with('/') {
            (PathBuf::from("/"), false)
        } else {
            (PathBuf::from("."), true)
        }
    } else {
        (PathBuf::from(&prefix), false)
    };
    let depth = segments.len() - first_meta;

    let mut walker = WalkDir::new(&base)
        .follow_links(true)
        .sort_by_file_name()
        .min_depth(1);
    if !pattern.contains("**") {
        walker = walker.min_depth(depth).max_depth(depth);
    }

    let mut matches = Vec::new();
    for entry in walker.into_iter().filter_map(Result::ok) {
        let path = entry.path();
        let candidate = if implicit_base {
            path.strip_prefix(".").unwrap_or(path)
        } else {
            path
        };
        if matcher.is_match(candidate) {
            matches.push(candidate.to_path_buf());
        }
    }
    trace!(pattern, matched = matches.len(), "resolved glob");
    Ok(matches)
}

/// Enforces that a pattern without metacharacters names an existing file.
pub fn require_explicit_file(pattern: &str, matches: &[PathBuf]) -> Result<(), OperationError> {
    if has_glob_meta(pattern) {
        return Ok(());
    }
    let Some(first) = matches.first() else {
        return Err(OperationError::MissingFile {
            role: FileRole::RuleFile,
            path: PathBuf::from(pattern),
            source: None,
        });
    };
    check_file_exists(FileRole::RuleFile, Some(first))
}

/// Succeeds when `path` is unset, empty, or names something `stat` can see.
pub fn check_file_exists(role: FileRole, path: Option<&Path>) -> Result<(), OperationError> {
    let Some(path) = path.filter(|path| !path.as_os_str().is_empty()) else {
        return Ok(());
    };
    fs::metadata(path)
        .map(|_| ())
        .map_err(|source| OperationError::MissingFile {
            role,
            path: path.to_path_buf(),
            source: Some(source),
        })
}

/// Client certificate and key must be configured together. Existence of both
/// is checked unless `syntax_only` is set.
pub fn check_tls(tls: &TlsConfig, syntax_only: bool) -> Result<(), OperationError> {
    match (&tls.cert_file, &tls.key_file) {
        (Some(cert), None) => {
            return Err(TlsPairError::CertWithoutKey { cert: cert.clone() }.into());
        }
        (None, Some(key)) => {
            return Err(TlsPairError::KeyWithoutCert { key: key.clone() }.into());
        }
        _ => {}
    }
    if syntax_only {
        return Ok(());
    }
    check_file_exists(FileRole::ClientCert, tls.cert_file.as_deref())?;
    check_file_exists(FileRole::ClientKey, tls.key_file.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_metacharacters() {
        assert!(has_glob_meta("rules/*.yml"));
        assert!(has_glob_meta("rules/alert?.yml"));
        assert!(has_glob_meta("rules/[ab].yml"));
        assert!(has_glob_meta("rules/{a,b}.yml"));
        assert!(!has_glob_meta("rules/alerts.yml"));
    }

    #[test]
    fn tls_pair_is_checked_even_in_syntax_only_mode() {
        let tls = TlsConfig {
            cert_file: Some(PathBuf::from("/nonexistent/client.crt")),
            ..TlsConfig::default()
        };
        let err = check_tls(&tls, true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "client cert file \"/nonexistent/client.crt\" specified without client key file"
        );

        let tls = TlsConfig {
            key_file: Some(PathBuf::from("client.key")),
            ..TlsConfig::default()
        };
        assert!(check_tls(&tls, false).is_err());
    }

    #[test]
    fn unset_tls_always_passes() {
        assert!(check_tls(&TlsConfig::default(), true).is_ok());
        assert!(check_tls(&TlsConfig::default(), false).is_ok());
    }

    #[test]
    fn syntax_only_skips_existence() {
        let tls = TlsConfig {
            cert_file: Some(PathBuf::from("/nonexistent/client.crt")),
            key_file: Some(PathBuf::from("/nonexistent/client.key")),
            ..TlsConfig::default()
        };
        assert!(check_tls(&tls, true).is_ok());
        let err = check_tls(&tls, false).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("error checking client cert file \"/nonexistent/client.crt\""));
    }
}

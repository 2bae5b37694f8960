//! Shared test harness utilities for promcheck crates.

use std::fs;
use std::path::{Path, PathBuf};

use promcheck_config::Configuration;
use tempfile::TempDir;

/// Rule document with two groups and three valid rules.
pub const VALID_RULES: &str = r#"groups:
  - name: node
    rules:
      - record: job:up:sum
        expr: sum by (job) (up)
      - alert: InstanceDown
        expr: up == 0
        for: 5m
        labels:
          severity: page
  - name: api
    rules:
      - alert: HighErrorRate
        expr: rate(http_errors_total[5m]) > 1
"#;

/// Rule document where `up_total` is recorded twice with identical labels.
pub const DUPLICATE_RULES: &str = r#"groups:
  - name: g
    rules:
      - record: up_total
        expr: sum(up)
      - record: up_total
        expr: count(up)
"#;

/// Temporary directory that test documents and referenced files are written into.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Fixture {
            dir: TempDir::new().expect("create fixture dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `relative` inside the fixture.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Writes `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture parent");
        }
        fs::write(&path, contents).expect("write fixture file");
        path
    }

    /// Creates an empty file, for references that only need to exist.
    pub fn touch(&self, relative: &str) -> PathBuf {
        self.write(relative, "")
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Fixture::new()
    }
}

/// Parses a configuration document, panicking on failure.
pub fn parse_config(contents: &str) -> Configuration {
    Configuration::parse(contents).expect("parse test configuration")
}

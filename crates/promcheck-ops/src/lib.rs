//! Validation operations behind the `promcheck` entry points.
//!
//! [`check_config`] runs the configuration pipeline (parse, resolve rule files
//! and scrape-config files, check credentials and TLS material, load and
//! expand discovered targets) and stops at the first failure.
//! [`check_rules`] parses a rule document and lints it for duplicate rules,
//! reporting every duplicate at once.

mod check_config;
mod check_rules;
mod discovery;
mod error;
mod lint;
mod relabel;
mod resolve;
mod targets;

pub use check_config::{check_config, CheckOptions, ConfigCheckOutcome};
pub use check_rules::{check_rule_groups, check_rules, check_rules_with, RulesCheckOutcome};
pub use discovery::load_target_group_file;
pub use error::{DecodeError, ErrorKind, ExpansionError, FileRole, OperationError, TlsPairError};
pub use lint::{find_duplicates, ComparableRule, DuplicateRulesError};
pub use relabel::process as apply_relabel_configs;
pub use resolve::{check_file_exists, check_tls, has_glob_meta, require_explicit_file, resolve_glob};
pub use targets::{expand_alertmanager_targets, expand_scrape_targets, split_host_port};

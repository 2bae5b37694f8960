//! Typed configuration model for the monitoring system's scrape/alerting document.
//!
//! The parser turns raw YAML into plain data structures with all documented
//! defaults applied, so the checks in `promcheck-ops` never touch raw YAML.
//! Only the sections the validator reasons about are modelled; everything
//! else is accepted and ignored.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

mod duration;
mod labels;
mod lint;
mod parse;
mod relabel;

pub use duration::{Duration, DurationError};
pub use labels::{
    is_valid_label_name, is_valid_metric_name, Label, Labels, LabelsBuilder, ADDRESS_LABEL,
    ALERTS_PATH_LABEL, INSTANCE_LABEL, JOB_LABEL, META_LABEL_PREFIX, METRICS_PATH_LABEL,
    PARAM_LABEL_PREFIX, SCHEME_LABEL, SCRAPE_INTERVAL_LABEL, SCRAPE_TIMEOUT_LABEL,
};
pub use lint::{LintConfig, LintOption};
pub use relabel::{RelabelAction, RelabelConfig, RelabelRegex};

/// Root of a parsed configuration document.
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub global: GlobalConfig,
    pub rule_files: Vec<String>,
    pub scrape_config_files: Vec<String>,
    pub scrape_configs: Vec<ScrapeConfig>,
    pub alerting: AlertingConfig,
}

/// Settings inherited by every scrape config that does not override them.
#[derive(Clone, Debug)]
pub struct GlobalConfig {
    pub scrape_interval: Duration,
    pub scrape_timeout: Duration,
    pub evaluation_interval: Duration,
    pub external_labels: Labels,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        GlobalConfig {
            scrape_interval: Duration::from_mins(1),
            scrape_timeout: Duration::from_secs(10),
            evaluation_interval: Duration::from_mins(1),
            external_labels: Labels::empty(),
        }
    }
}

/// One scrape job.
#[derive(Clone, Debug)]
pub struct ScrapeConfig {
    pub job_name: String,
    pub scrape_interval: Duration,
    pub scrape_timeout: Duration,
    pub metrics_path: String,
    pub scheme: String,
    pub honor_labels: bool,
    pub params: BTreeMap<String, Vec<String>>,
    pub http_client: HttpClientConfig,
    pub relabel_configs: Vec<RelabelConfig>,
    pub metric_relabel_configs: Vec<RelabelConfig>,
    pub service_discovery: Vec<ServiceDiscoveryConfig>,
}

/// HTTP client settings shared by scrape jobs, alertmanagers and API-based discovery.
#[derive(Clone, Debug, Default)]
pub struct HttpClientConfig {
    pub authorization: Option<Authorization>,
    pub basic_auth: Option<BasicAuth>,
    pub tls_config: TlsConfig,
}

#[derive(Clone, Debug)]
pub struct Authorization {
    pub kind: String,
    pub credentials: Option<String>,
    pub credentials_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct BasicAuth {
    pub username: String,
    pub password: Option<String>,
    pub password_file: Option<PathBuf>,
}

/// Client TLS settings. Certificate and key must be configured together.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TlsConfig {
    pub ca_file: Option<PathBuf>,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    pub server_name: Option<String>,
    pub insecure_skip_verify: bool,
}

/// Discovery mechanism attached to a scrape job or alertmanager.
///
/// Mechanisms the validator has no checks for are kept as [`Other`] so
/// callers can skip them without failing.
///
/// [`Other`]: ServiceDiscoveryConfig::Other
#[derive(Clone, Debug)]
pub enum ServiceDiscoveryConfig {
    File(FileSdConfig),
    Kubernetes(KubernetesSdConfig),
    Static(Vec<TargetGroup>),
    Other { mechanism: String },
}

impl ServiceDiscoveryConfig {
    pub fn mechanism(&self) -> &str {
        match self {
            ServiceDiscoveryConfig::File(_) => "file",
            ServiceDiscoveryConfig::Kubernetes(_) => "kubernetes",
            ServiceDiscoveryConfig::Static(_) => "static",
            ServiceDiscoveryConfig::Other { mechanism } => mechanism,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FileSdConfig {
    pub files: Vec<String>,
    pub refresh_interval: Duration,
}

#[derive(Clone, Debug)]
pub struct KubernetesSdConfig {
    pub role: String,
    pub api_server: Option<String>,
    pub namespaces: Vec<String>,
    pub http_client: HttpClientConfig,
}

/// Targets sharing a label set, tagged with where they came from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetGroup {
    /// One label set per target, each holding at least `__address__`.
    pub targets: Vec<Labels>,
    pub labels: Labels,
    pub source: String,
}

impl TargetGroup {
    /// Builds a group from decoded `targets`/`labels` fields, rejecting
    /// invalid label names.
    pub fn from_parts(
        targets: Vec<String>,
        labels: BTreeMap<String, String>,
        source: impl Into<String>,
    ) -> Result<Self, String> {
        if let Some(name) = labels.keys().find(|name| !is_valid_label_name(name)) {
            return Err(format!("{name:?} is not a valid label name"));
        }
        Ok(TargetGroup {
            targets: targets
                .iter()
                .map(|target| Labels::from_pairs(&[(ADDRESS_LABEL, target.as_str())]))
                .collect(),
            labels: Labels::from_map(&labels),
            source: source.into(),
        })
    }
}

impl fmt::Display for TargetGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Clone, Debug, Default)]
pub struct AlertingConfig {
    pub alert_relabel_configs: Vec<RelabelConfig>,
    pub alertmanagers: Vec<AlertmanagerConfig>,
}

#[derive(Clone, Debug)]
pub struct AlertmanagerConfig {
    pub scheme: String,
    pub path_prefix: String,
    pub api_version: String,
    pub timeout: Duration,
    pub http_client: HttpClientConfig,
    pub relabel_configs: Vec<RelabelConfig>,
    pub service_discovery: Vec<ServiceDiscoveryConfig>,
}

/// Errors surfaced while parsing configuration documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse {}: {source}", describe_origin(.origin.as_deref()))]
    Parse {
        origin: Option<PathBuf>,
        source: serde_yaml::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
    #[error("found multiple scrape configs with job name {job:?} ({})", .origin.display())]
    DuplicateJob { job: String, origin: PathBuf },
}

fn describe_origin(origin: Option<&Path>) -> String {
    match origin {
        Some(path) => format!("config {}", path.display()),
        None => "configuration".to_owned(),
    }
}

impl Configuration {
    /// Parses a configuration document with defaults applied. Relative paths
    /// are left untouched; see [`Configuration::set_directory`].
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        parse::parse_document(contents)
    }

    /// Rebases every relative file reference onto `dir`.
    pub fn set_directory(&mut self, dir: &Path) {
        self.rule_files = self
            .rule_files
            .iter()
            .map(|pattern| join_pattern(dir, pattern))
            .collect();
        self.scrape_config_files = self
            .scrape_config_files
            .iter()
            .map(|pattern| join_pattern(dir, pattern))
            .collect();
        for scrape in &mut self.scrape_configs {
            scrape.set_directory(dir);
        }
        for alertmanager in &mut self.alerting.alertmanagers {
            alertmanager.http_client.set_directory(dir);
            set_discovery_directory(&mut alertmanager.service_discovery, dir);
        }
    }

    /// Appends scrape configs loaded from `scrape_config_files`, rejecting job
    /// names that are already taken.
    pub fn merge_scrape_configs(
        &self,
        loaded: Vec<(PathBuf, Vec<ScrapeConfig>)>,
    ) -> Result<Vec<ScrapeConfig>, ConfigError> {
        let mut seen: HashSet<String> = self
            .scrape_configs
            .iter()
            .map(|scrape| scrape.job_name.clone())
            .collect();
        let mut merged = self.scrape_configs.clone();
        for (origin, configs) in loaded {
            for scrape in configs {
                if !seen.insert(scrape.job_name.clone()) {
                    return Err(ConfigError::DuplicateJob {
                        job: scrape.job_name,
                        origin,
                    });
                }
                merged.push(scrape);
            }
        }
        Ok(merged)
    }
}

/// Parses a file referenced from `scrape_config_files`. Defaults come from
/// `global` and relative paths are resolved against the file's directory.
pub fn parse_scrape_config_file(
    contents: &str,
    origin: &Path,
    global: &GlobalConfig,
) -> Result<Vec<ScrapeConfig>, ConfigError> {
    let mut configs = parse::parse_scrape_config_file(contents, origin, global)?;
    if let Some(dir) = origin.parent() {
        for scrape in &mut configs {
            scrape.set_directory(dir);
        }
    }
    Ok(configs)
}

impl ScrapeConfig {
    fn set_directory(&mut self, dir: &Path) {
        self.http_client.set_directory(dir);
        set_discovery_directory(&mut self.service_discovery, dir);
    }
}

impl HttpClientConfig {
    fn set_directory(&mut self, dir: &Path) {
        if let Some(authorization) = &mut self.authorization {
            join_optional(dir, &mut authorization.credentials_file);
        }
        if let Some(basic_auth) = &mut self.basic_auth {
            join_optional(dir, &mut basic_auth.password_file);
        }
        join_optional(dir, &mut self.tls_config.ca_file);
        join_optional(dir, &mut self.tls_config.cert_file);
        join_optional(dir, &mut self.tls_config.key_file);
    }
}

fn set_discovery_directory(configs: &mut [ServiceDiscoveryConfig], dir: &Path) {
    for config in configs {
        match config {
            ServiceDiscoveryConfig::File(file) => {
                file.files = file
                    .files
                    .iter()
                    .map(|pattern| join_pattern(dir, pattern))
                    .collect();
            }
            ServiceDiscoveryConfig::Kubernetes(kubernetes) => {
                kubernetes.http_client.set_directory(dir);
            }
            ServiceDiscoveryConfig::Static(_) | ServiceDiscoveryConfig::Other { .. } => {}
        }
    }
}

fn join_optional(dir: &Path, path: &mut Option<PathBuf>) {
    if let Some(current) = path {
        if current.is_relative() {
            *current = dir.join(&*current);
        }
    }
}

fn join_pattern(dir: &Path, pattern: &str) -> String {
    if pattern.is_empty() || Path::new(pattern).is_absolute() {
        pattern.to_owned()
    } else {
        dir.join(pattern).to_string_lossy().into_owned()
    }
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with the section it was found in.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub message: String,
    pub context: Option<String>,
    pub origin: Option<PathBuf>,
}

impl ConfigValidationError {
    fn new(message: impl Into<String>) -> Self {
        ConfigValidationError {
            message: message.into(),
            context: None,
            origin: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    fn with_origin(mut self, origin: Option<&Path>) -> Self {
        self.origin = origin.map(Path::to_path_buf);
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(origin) = &self.origin {
            write!(f, " ({})", origin.display())?;
        }
        Ok(())
    }
}

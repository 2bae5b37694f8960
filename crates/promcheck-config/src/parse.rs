use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

use crate::relabel::RawRelabelConfig;
use crate::{
    is_valid_label_name, AlertingConfig, AlertmanagerConfig, Authorization, BasicAuth,
    ConfigError, ConfigValidationError, ConfigValidationErrors, Configuration, Duration,
    FileSdConfig, GlobalConfig, HttpClientConfig, KubernetesSdConfig, Labels, RelabelConfig,
    ScrapeConfig, ServiceDiscoveryConfig, TargetGroup, TlsConfig,
};

const DEFAULT_METRICS_PATH: &str = "/metrics";
const DEFAULT_SCHEME: &str = "http";
const DEFAULT_PATH_PREFIX: &str = "/";
const ALERTMANAGER_API_VERSION: &str = "v2";
const DEFAULT_ALERTMANAGER_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_FILE_SD_REFRESH: Duration = Duration::from_mins(5);
const DEFAULT_AUTHORIZATION_TYPE: &str = "Bearer";
const KUBERNETES_ROLES: &[&str] = &[
    "pod",
    "service",
    "endpoints",
    "endpointslice",
    "node",
    "ingress",
];
const SD_CONFIGS_SUFFIX: &str = "_sd_configs";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    global: Option<RawGlobalConfig>,
    #[serde(default)]
    rule_files: Option<Vec<String>>,
    #[serde(default)]
    scrape_config_files: Option<Vec<String>>,
    #[serde(default)]
    scrape_configs: Option<Vec<Option<RawScrapeConfig>>>,
    #[serde(default)]
    alerting: Option<RawAlertingConfig>,
    // Sections the validator accepts but has no checks for.
    #[serde(default)]
    #[allow(dead_code)]
    remote_write: Option<Value>,
    #[serde(default)]
    #[allow(dead_code)]
    remote_read: Option<Value>,
    #[serde(default)]
    #[allow(dead_code)]
    storage: Option<Value>,
    #[serde(default)]
    #[allow(dead_code)]
    tracing: Option<Value>,
    #[serde(default)]
    #[allow(dead_code)]
    otlp: Option<Value>,
    #[serde(default)]
    #[allow(dead_code)]
    runtime: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawGlobalConfig {
    scrape_interval: Option<Duration>,
    scrape_timeout: Option<Duration>,
    evaluation_interval: Option<Duration>,
    #[serde(default)]
    external_labels: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScrapeConfigFile {
    #[serde(default)]
    scrape_configs: Option<Vec<Option<RawScrapeConfig>>>,
}

#[derive(Debug, Deserialize)]
struct RawScrapeConfig {
    job_name: Option<String>,
    scrape_interval: Option<Duration>,
    scrape_timeout: Option<Duration>,
    metrics_path: Option<String>,
    scheme: Option<String>,
    honor_labels: Option<bool>,
    #[serde(default)]
    params: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    relabel_configs: Option<Vec<Option<RawRelabelConfig>>>,
    #[serde(default)]
    metric_relabel_configs: Option<Vec<Option<RawRelabelConfig>>>,
    #[serde(flatten)]
    http: RawHttpClientConfig,
    #[serde(flatten)]
    discovery: RawDiscoveryConfigs,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAlertingConfig {
    #[serde(default)]
    alert_relabel_configs: Option<Vec<Option<RawRelabelConfig>>>,
    #[serde(default)]
    alertmanagers: Option<Vec<Option<RawAlertmanagerConfig>>>,
}

#[derive(Debug, Deserialize)]
struct RawAlertmanagerConfig {
    scheme: Option<String>,
    path_prefix: Option<String>,
    api_version: Option<String>,
    timeout: Option<Duration>,
    #[serde(default)]
    relabel_configs: Option<Vec<Option<RawRelabelConfig>>>,
    #[serde(flatten)]
    http: RawHttpClientConfig,
    #[serde(flatten)]
    discovery: RawDiscoveryConfigs,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawHttpClientConfig {
    authorization: Option<RawAuthorization>,
    basic_auth: Option<RawBasicAuth>,
    bearer_token: Option<String>,
    bearer_token_file: Option<String>,
    tls_config: Option<RawTlsConfig>,
}

/// Unmodelled keys such as `credentials_ref` are ignored.
#[derive(Debug, Default, Deserialize)]
struct RawAuthorization {
    #[serde(rename = "type")]
    kind: Option<String>,
    credentials: Option<String>,
    credentials_file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBasicAuth {
    username: Option<String>,
    username_file: Option<String>,
    password: Option<String>,
    password_file: Option<String>,
}

/// Unmodelled keys such as `ca_ref` or `min_version` are ignored.
#[derive(Debug, Default, Deserialize)]
struct RawTlsConfig {
    ca: Option<String>,
    ca_file: Option<String>,
    cert: Option<String>,
    cert_file: Option<String>,
    key: Option<String>,
    key_file: Option<String>,
    server_name: Option<String>,
    insecure_skip_verify: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDiscoveryConfigs {
    #[serde(default)]
    static_configs: Option<Vec<Option<RawStaticGroup>>>,
    #[serde(default)]
    file_sd_configs: Option<Vec<Option<RawFileSdConfig>>>,
    #[serde(default)]
    kubernetes_sd_configs: Option<Vec<Option<RawKubernetesSdConfig>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStaticGroup {
    #[serde(default)]
    targets: Option<Vec<String>>,
    #[serde(default)]
    labels: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFileSdConfig {
    #[serde(default)]
    files: Option<Vec<String>>,
    refresh_interval: Option<Duration>,
}

#[derive(Debug, Deserialize)]
struct RawKubernetesSdConfig {
    role: Option<String>,
    api_server: Option<String>,
    #[serde(default)]
    namespaces: Option<RawNamespaces>,
    #[serde(flatten)]
    http: RawHttpClientConfig,
}

#[derive(Debug, Default, Deserialize)]
struct RawNamespaces {
    #[serde(default)]
    names: Option<Vec<String>>,
}

pub(crate) fn parse_document(contents: &str) -> Result<Configuration, ConfigError> {
    let raw: RawConfig = decode(contents, None)?.unwrap_or_default();
    raw.finalize()
}

pub(crate) fn parse_scrape_config_file(
    contents: &str,
    origin: &Path,
    global: &GlobalConfig,
) -> Result<Vec<ScrapeConfig>, ConfigError> {
    let raw: RawScrapeConfigFile = decode(contents, Some(origin))?.unwrap_or_default();
    let mut errors = Vec::new();
    let configs = finalize_scrape_configs(
        raw.scrape_configs.unwrap_or_default(),
        global,
        Some(origin),
        &mut errors,
    );
    if errors.is_empty() {
        Ok(configs)
    } else {
        Err(ConfigError::Validation(ConfigValidationErrors(errors)))
    }
}

/// Decodes a YAML document, treating a document made only of comments or
/// separators as absent.
fn decode<T>(contents: &str, origin: Option<&Path>) -> Result<Option<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    if is_blank_document(contents) {
        return Ok(None);
    }
    serde_yaml::from_str::<Option<T>>(contents).map_err(|source| ConfigError::Parse {
        origin: origin.map(Path::to_path_buf),
        source,
    })
}

fn is_blank_document(contents: &str) -> bool {
    contents.lines().all(|line| {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "---" || trimmed == "..."
    })
}

impl RawConfig {
    fn finalize(self) -> Result<Configuration, ConfigError> {
        let mut errors = Vec::new();

        let global = match self.global.unwrap_or_default().finalize() {
            Ok(global) => global,
            Err(message) => {
                errors.push(ConfigValidationError::new(message).with_context("global"));
                GlobalConfig::default()
            }
        };

        let scrape_configs = finalize_scrape_configs(
            self.scrape_configs.unwrap_or_default(),
            &global,
            None,
            &mut errors,
        );

        let alerting = self
            .alerting
            .unwrap_or_default()
            .finalize(&mut errors);

        if !errors.is_empty() {
            return Err(ConfigError::Validation(ConfigValidationErrors(errors)));
        }

        Ok(Configuration {
            global,
            rule_files: self.rule_files.unwrap_or_default(),
            scrape_config_files: self.scrape_config_files.unwrap_or_default(),
            scrape_configs,
            alerting,
        })
    }
}

impl RawGlobalConfig {
    fn finalize(self) -> Result<GlobalConfig, String> {
        let defaults = GlobalConfig::default();
        let scrape_interval = non_zero(self.scrape_interval).unwrap_or(defaults.scrape_interval);
        let scrape_timeout = match non_zero(self.scrape_timeout) {
            Some(timeout) if timeout > scrape_interval => {
                return Err("global scrape timeout greater than scrape interval".into());
            }
            Some(timeout) => timeout,
            None => defaults.scrape_timeout.min(scrape_interval),
        };
        let external_labels = self.external_labels.unwrap_or_default();
        if let Some(name) = external_labels
            .keys()
            .find(|name| !is_valid_label_name(name))
        {
            return Err(format!("{name:?} is not a valid label name"));
        }
        Ok(GlobalConfig {
            scrape_interval,
            scrape_timeout,
            evaluation_interval: non_zero(self.evaluation_interval)
                .unwrap_or(defaults.evaluation_interval),
            external_labels: Labels::from_map(&external_labels),
        })
    }
}

fn finalize_scrape_configs(
    raw: Vec<Option<RawScrapeConfig>>,
    global: &GlobalConfig,
    origin: Option<&Path>,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<ScrapeConfig> {
    let mut seen = HashSet::new();
    let mut configs = Vec::with_capacity(raw.len());
    for (idx, entry) in raw.into_iter().enumerate() {
        let Some(entry) = entry else {
            errors.push(
                ConfigValidationError::new("empty or null scrape config section")
                    .with_context(format!("scrape_configs[{idx}]"))
                    .with_origin(origin),
            );
            continue;
        };
        let context = match entry.job_name.as_deref() {
            Some(name) if !name.is_empty() => format!("scrape_configs[{name}]"),
            _ => format!("scrape_configs[{idx}]"),
        };
        let job_name = entry.job_name.clone().unwrap_or_default();
        let result = entry.finalize(global);
        if !job_name.is_empty() && !seen.insert(job_name.clone()) {
            errors.push(
                ConfigValidationError::new(format!(
                    "found multiple scrape configs with job name {job_name:?}"
                ))
                .with_context(context)
                .with_origin(origin),
            );
            continue;
        }
        match result {
            Ok(scrape) => configs.push(scrape),
            Err(messages) => {
                errors.extend(messages.into_iter().map(|message| {
                    ConfigValidationError::new(message)
                        .with_context(context.clone())
                        .with_origin(origin)
                }));
            }
        }
    }
    configs
}

impl RawScrapeConfig {
    fn finalize(self, global: &GlobalConfig) -> Result<ScrapeConfig, Vec<String>> {
        let mut errors = Vec::new();

        let job_name = self.job_name.unwrap_or_default();
        if job_name.is_empty() {
            errors.push("job_name is empty".to_owned());
        }

        let scrape_interval = non_zero(self.scrape_interval).unwrap_or(global.scrape_interval);
        let scrape_timeout = match non_zero(self.scrape_timeout) {
            Some(timeout) => {
                if timeout > scrape_interval {
                    errors.push(format!(
                        "scrape timeout greater than scrape interval for scrape config with job name {job_name:?}"
                    ));
                }
                timeout
            }
            None => global.scrape_timeout.min(scrape_interval),
        };

        let scheme = non_empty(self.scheme).unwrap_or_else(|| DEFAULT_SCHEME.to_owned());
        if scheme != "http" && scheme != "https" {
            errors.push(format!(
                "unsupported scheme {scheme:?} for scrape config with job name {job_name:?}"
            ));
        }

        let http_client = self.http.finalize().unwrap_or_else(|message| {
            errors.push(message);
            HttpClientConfig::default()
        });
        let relabel_configs =
            finalize_relabel_configs("relabel_configs", self.relabel_configs, &mut errors);
        let metric_relabel_configs = finalize_relabel_configs(
            "metric_relabel_configs",
            self.metric_relabel_configs,
            &mut errors,
        );
        let service_discovery = self.discovery.finalize(self.extra, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ScrapeConfig {
            job_name,
            scrape_interval,
            scrape_timeout,
            metrics_path: non_empty(self.metrics_path)
                .unwrap_or_else(|| DEFAULT_METRICS_PATH.to_owned()),
            scheme,
            honor_labels: self.honor_labels.unwrap_or(false),
            params: self.params.unwrap_or_default(),
            http_client,
            relabel_configs,
            metric_relabel_configs,
            service_discovery,
        })
    }
}

impl RawAlertingConfig {
    fn finalize(self, errors: &mut Vec<ConfigValidationError>) -> AlertingConfig {
        let mut messages = Vec::new();
        let alert_relabel_configs = finalize_relabel_configs(
            "alert_relabel_configs",
            self.alert_relabel_configs,
            &mut messages,
        );
        errors.extend(
            messages
                .drain(..)
                .map(|message| ConfigValidationError::new(message).with_context("alerting")),
        );

        let mut alertmanagers = Vec::new();
        for (idx, entry) in self
            .alertmanagers
            .unwrap_or_default()
            .into_iter()
            .enumerate()
        {
            let context = format!("alerting.alertmanagers[{idx}]");
            let Some(entry) = entry else {
                errors.push(
                    ConfigValidationError::new("empty or null alertmanager config section")
                        .with_context(context),
                );
                continue;
            };
            match entry.finalize() {
                Ok(alertmanager) => alertmanagers.push(alertmanager),
                Err(messages) => errors.extend(messages.into_iter().map(|message| {
                    ConfigValidationError::new(message).with_context(context.clone())
                })),
            }
        }

        AlertingConfig {
            alert_relabel_configs,
            alertmanagers,
        }
    }
}

impl RawAlertmanagerConfig {
    fn finalize(self) -> Result<AlertmanagerConfig, Vec<String>> {
        let mut errors = Vec::new();

        let scheme = non_empty(self.scheme).unwrap_or_else(|| DEFAULT_SCHEME.to_owned());
        let api_version =
            non_empty(self.api_version).unwrap_or_else(|| ALERTMANAGER_API_VERSION.to_owned());
        if api_version != ALERTMANAGER_API_VERSION {
            errors.push(format!(
                "expected Alertmanager api version to be one of [{ALERTMANAGER_API_VERSION}] but got {api_version}"
            ));
        }
        let http_client = self.http.finalize().unwrap_or_else(|message| {
            errors.push(message);
            HttpClientConfig::default()
        });
        let relabel_configs =
            finalize_relabel_configs("relabel_configs", self.relabel_configs, &mut errors);
        let service_discovery = self.discovery.finalize(self.extra, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(AlertmanagerConfig {
            scheme,
            path_prefix: non_empty(self.path_prefix)
                .unwrap_or_else(|| DEFAULT_PATH_PREFIX.to_owned()),
            api_version,
            timeout: non_zero(self.timeout).unwrap_or(DEFAULT_ALERTMANAGER_TIMEOUT),
            http_client,
            relabel_configs,
            service_discovery,
        })
    }
}

impl RawHttpClientConfig {
    fn finalize(self) -> Result<HttpClientConfig, String> {
        let bearer_token = non_empty(self.bearer_token);
        let bearer_token_file = non_empty(self.bearer_token_file);

        if bearer_token.is_some() && bearer_token_file.is_some() {
            return Err("at most one of bearer_token & bearer_token_file must be configured".into());
        }
        let legacy_bearer = bearer_token.is_some() || bearer_token_file.is_some();
        if self.basic_auth.is_some() && legacy_bearer {
            return Err(
                "at most one of basic_auth, oauth2, bearer_token & bearer_token_file must be configured"
                    .into(),
            );
        }
        if self.basic_auth.is_some() && self.authorization.is_some() {
            return Err("at most one of basic_auth, oauth2 & authorization must be configured".into());
        }
        if self.authorization.is_some() && legacy_bearer {
            return Err(
                "authorization is not compatible with bearer_token & bearer_token_file".into(),
            );
        }

        let authorization = match self.authorization {
            Some(raw) => Some(raw.finalize()?),
            None if legacy_bearer => Some(Authorization {
                kind: DEFAULT_AUTHORIZATION_TYPE.to_owned(),
                credentials: bearer_token,
                credentials_file: bearer_token_file.map(Into::into),
            }),
            None => None,
        };
        let basic_auth = self.basic_auth.map(RawBasicAuth::finalize).transpose()?;
        let tls_config = self
            .tls_config
            .map(RawTlsConfig::finalize)
            .transpose()?
            .unwrap_or_default();

        Ok(HttpClientConfig {
            authorization,
            basic_auth,
            tls_config,
        })
    }
}

impl RawAuthorization {
    fn finalize(self) -> Result<Authorization, String> {
        let kind = non_empty(self.kind).unwrap_or_else(|| DEFAULT_AUTHORIZATION_TYPE.to_owned());
        if kind.eq_ignore_ascii_case("basic") {
            return Err(
                "authorization type cannot be set to \"basic\", use \"basic_auth\" instead".into(),
            );
        }
        let credentials = non_empty(self.credentials);
        let credentials_file = non_empty(self.credentials_file);
        if credentials.is_some() && credentials_file.is_some() {
            return Err(
                "at most one of authorization credentials & credentials_file must be configured"
                    .into(),
            );
        }
        Ok(Authorization {
            kind,
            credentials,
            credentials_file: credentials_file.map(Into::into),
        })
    }
}

impl RawBasicAuth {
    fn finalize(self) -> Result<BasicAuth, String> {
        let username = non_empty(self.username);
        if username.is_some() && non_empty(self.username_file).is_some() {
            return Err(
                "at most one of basic_auth username & username_file must be configured".into(),
            );
        }
        let password = non_empty(self.password);
        let password_file = non_empty(self.password_file);
        if password.is_some() && password_file.is_some() {
            return Err(
                "at most one of basic_auth password & password_file must be configured".into(),
            );
        }
        Ok(BasicAuth {
            username: username.unwrap_or_default(),
            password,
            password_file: password_file.map(Into::into),
        })
    }
}

impl RawTlsConfig {
    fn finalize(self) -> Result<TlsConfig, String> {
        let pairs = [
            ("ca", &self.ca, &self.ca_file),
            ("cert", &self.cert, &self.cert_file),
            ("key", &self.key, &self.key_file),
        ];
        for (name, inline, file) in pairs {
            if is_set(inline) && is_set(file) {
                return Err(format!(
                    "at most one of {name} and {name}_file must be configured"
                ));
            }
        }
        Ok(TlsConfig {
            ca_file: non_empty(self.ca_file).map(Into::into),
            cert_file: non_empty(self.cert_file).map(Into::into),
            key_file: non_empty(self.key_file).map(Into::into),
            server_name: non_empty(self.server_name),
            insecure_skip_verify: self.insecure_skip_verify.unwrap_or(false),
        })
    }
}

impl RawDiscoveryConfigs {
    /// Discovery configs ordered by their YAML key.
    fn finalize(
        self,
        extra: BTreeMap<String, Value>,
        errors: &mut Vec<String>,
    ) -> Vec<ServiceDiscoveryConfig> {
        let mut by_key: BTreeMap<String, Vec<ServiceDiscoveryConfig>> = BTreeMap::new();

        let mut groups = Vec::new();
        for (idx, entry) in self
            .static_configs
            .unwrap_or_default()
            .into_iter()
            .enumerate()
        {
            let Some(entry) = entry else {
                errors.push(format!("static_configs[{idx}]: empty or null target group"));
                continue;
            };
            match TargetGroup::from_parts(
                entry.targets.unwrap_or_default(),
                entry.labels.unwrap_or_default(),
                idx.to_string(),
            ) {
                Ok(group) => groups.push(group),
                Err(message) => errors.push(format!("static_configs[{idx}]: {message}")),
            }
        }
        if !groups.is_empty() {
            by_key.insert(
                "static_configs".to_owned(),
                vec![ServiceDiscoveryConfig::Static(groups)],
            );
        }

        let mut files = Vec::new();
        for (idx, entry) in self
            .file_sd_configs
            .unwrap_or_default()
            .into_iter()
            .enumerate()
        {
            match entry {
                Some(raw) => files.push(ServiceDiscoveryConfig::File(FileSdConfig {
                    files: raw.files.unwrap_or_default(),
                    refresh_interval: non_zero(raw.refresh_interval)
                        .unwrap_or(DEFAULT_FILE_SD_REFRESH),
                })),
                None => errors.push(format!("file_sd_configs[{idx}]: empty or null section")),
            }
        }
        by_key.insert("file_sd_configs".to_owned(), files);

        let mut kubernetes = Vec::new();
        for (idx, entry) in self
            .kubernetes_sd_configs
            .unwrap_or_default()
            .into_iter()
            .enumerate()
        {
            match entry.map(RawKubernetesSdConfig::finalize) {
                Some(Ok(config)) => kubernetes.push(ServiceDiscoveryConfig::Kubernetes(config)),
                Some(Err(message)) => {
                    errors.push(format!("kubernetes_sd_configs[{idx}]: {message}"))
                }
                None => errors.push(format!(
                    "kubernetes_sd_configs[{idx}]: empty or null section"
                )),
            }
        }
        by_key.insert("kubernetes_sd_configs".to_owned(), kubernetes);

        for (key, value) in extra {
            let Some(mechanism) = key.strip_suffix(SD_CONFIGS_SUFFIX) else {
                debug!(option = %key, "ignoring unmodelled option");
                continue;
            };
            let count = match &value {
                Value::Sequence(entries) => entries.len(),
                Value::Null => 0,
                _ => 1,
            };
            let other = (0..count)
                .map(|_| ServiceDiscoveryConfig::Other {
                    mechanism: mechanism.to_owned(),
                })
                .collect();
            by_key.insert(key, other);
        }

        by_key.into_values().flatten().collect()
    }
}

impl RawKubernetesSdConfig {
    fn finalize(self) -> Result<KubernetesSdConfig, String> {
        let role = non_empty(self.role).ok_or_else(|| {
            format!("role missing (one of: {})", KUBERNETES_ROLES.join(", "))
        })?;
        if !KUBERNETES_ROLES.contains(&role.as_str()) {
            return Err(format!("unknown Kubernetes SD role {role:?}"));
        }
        Ok(KubernetesSdConfig {
            role,
            api_server: non_empty(self.api_server),
            namespaces: self
                .namespaces
                .and_then(|namespaces| namespaces.names)
                .unwrap_or_default(),
            http_client: self.http.finalize()?,
        })
    }
}

fn finalize_relabel_configs(
    field: &str,
    raw: Option<Vec<Option<RawRelabelConfig>>>,
    errors: &mut Vec<String>,
) -> Vec<RelabelConfig> {
    let mut configs = Vec::new();
    for (idx, entry) in raw.unwrap_or_default().into_iter().enumerate() {
        match entry.map(RawRelabelConfig::finalize) {
            Some(Ok(config)) => configs.push(config),
            Some(Err(message)) => errors.push(format!("{field}[{idx}]: {message}")),
            None => errors.push(format!("{field}[{idx}]: empty or null relabel config")),
        }
    }
    configs
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn non_zero(value: Option<Duration>) -> Option<Duration> {
    value.filter(|value| !value.is_zero())
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|value| !value.is_empty())
}

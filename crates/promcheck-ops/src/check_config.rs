//! Configuration checks: parse, resolve file references, expand targets.

use std::fs;
use std::path::{Path, PathBuf};

use promcheck_config::{
    parse_scrape_config_file, AlertmanagerConfig, Configuration, LabelsBuilder, ScrapeConfig,
    ServiceDiscoveryConfig, TargetGroup,
};
use tracing::{debug, info, warn};

use crate::discovery::load_target_group_file;
use crate::error::{quoted, FileRole, OperationError};
use crate::resolve::{check_file_exists, check_tls, require_explicit_file, resolve_glob};
use crate::targets::{expand_alertmanager_targets, expand_scrape_targets};

/// Settings for [`check_config`].
#[derive(Clone, Debug)]
pub struct CheckOptions {
    /// Skip every check that touches the filesystem except the TLS pairing rule.
    pub syntax_only: bool,
    /// Directory relative paths in the document are resolved against.
    pub base_dir: Option<PathBuf>,
    /// Print discovery warnings to stdout as they occur.
    pub echo_warnings: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            syntax_only: false,
            base_dir: None,
            echo_warnings: true,
        }
    }
}

impl CheckOptions {
    pub fn syntax_only() -> Self {
        CheckOptions {
            syntax_only: true,
            ..CheckOptions::default()
        }
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn with_echo_warnings(mut self, echo: bool) -> Self {
        self.echo_warnings = echo;
        self
    }
}

/// Successful configuration check.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConfigCheckOutcome {
    /// Resolved rule files, in pattern order then match order.
    pub rule_files: Vec<PathBuf>,
    /// Non-fatal findings such as discovery patterns matching nothing.
    pub warnings: Vec<String>,
}

/// Validates a configuration document. The first failure aborts the check.
pub fn check_config(
    contents: &str,
    options: &CheckOptions,
) -> Result<ConfigCheckOutcome, OperationError> {
    let mut config = Configuration::parse(contents)?;
    if let Some(dir) = &options.base_dir {
        config.set_directory(dir);
    }

    let mut run = CheckRun {
        options,
        builder: LabelsBuilder::default(),
        warnings: Vec::new(),
    };

    let mut rule_files = Vec::new();
    if !options.syntax_only {
        for pattern in &config.rule_files {
            let matches = resolve_glob(pattern)?;
            require_explicit_file(pattern, &matches)?;
            rule_files.extend(matches);
        }
    }

    let scrape_configs = if options.syntax_only {
        config.scrape_configs.clone()
    } else {
        resolve_scrape_configs(&config)
            .map_err(|err| OperationError::ScrapeConfigResolution(Box::new(err)))?
    };

    for scrape in &scrape_configs {
        run.check_scrape_config(scrape)?;
    }
    for alertmanager in &config.alerting.alertmanagers {
        run.check_alertmanager(alertmanager)?;
    }

    info!(
        rule_files = rule_files.len(),
        scrape_configs = scrape_configs.len(),
        "configuration check passed"
    );
    Ok(ConfigCheckOutcome {
        rule_files,
        warnings: run.warnings,
    })
}

/// Loads every file matched by `scrape_config_files` and merges it with the
/// inline scrape configs.
fn resolve_scrape_configs(config: &Configuration) -> Result<Vec<ScrapeConfig>, OperationError> {
    let mut loaded = Vec::new();
    for pattern in &config.scrape_config_files {
        for path in resolve_glob(pattern)? {
            let contents = fs::read_to_string(&path).map_err(|source| OperationError::Io {
                path: path.clone(),
                source,
            })?;
            let configs = parse_scrape_config_file(&contents, &path, &config.global)?;
            debug!(path = %path.display(), jobs = configs.len(), "loaded scrape config file");
            loaded.push((path, configs));
        }
    }
    Ok(config.merge_scrape_configs(loaded)?)
}

/// Where discovered targets are routed.
enum Destination<'a> {
    Scrape(&'a ScrapeConfig),
    Alertmanager(&'a AlertmanagerConfig),
}

impl Destination<'_> {
    fn missing_file_warning(&self, pattern: &str) -> String {
        match self {
            Destination::Scrape(scrape) => format!(
                "  WARNING: file {:?} for file_sd in scrape job {:?} does not exist",
                pattern, scrape.job_name
            ),
            Destination::Alertmanager(_) => format!(
                "  WARNING: file {pattern:?} for file_sd in alertmanager config does not exist"
            ),
        }
    }
}

/// State for one [`check_config`] call. The label builder is reused across
/// every expansion in the call.
struct CheckRun<'a> {
    options: &'a CheckOptions,
    builder: LabelsBuilder,
    warnings: Vec<String>,
}

impl CheckRun<'_> {
    fn check_scrape_config(&mut self, scrape: &ScrapeConfig) -> Result<(), OperationError> {
        debug!(job = %scrape.job_name, "checking scrape config");
        if !self.options.syntax_only {
            if let Some(authorization) = &scrape.http_client.authorization {
                check_file_exists(
                    FileRole::Credentials,
                    authorization.credentials_file.as_deref(),
                )?;
            }
        }
        check_tls(&scrape.http_client.tls_config, self.options.syntax_only)?;
        self.check_discovery(&scrape.service_discovery, Destination::Scrape(scrape))
    }

    fn check_alertmanager(
        &mut self,
        alertmanager: &AlertmanagerConfig,
    ) -> Result<(), OperationError> {
        self.check_discovery(
            &alertmanager.service_discovery,
            Destination::Alertmanager(alertmanager),
        )
    }

    fn check_discovery(
        &mut self,
        configs: &[ServiceDiscoveryConfig],
        destination: Destination<'_>,
    ) -> Result<(), OperationError> {
        for config in configs {
            match config {
                ServiceDiscoveryConfig::Kubernetes(kubernetes) => {
                    check_tls(&kubernetes.http_client.tls_config, self.options.syntax_only)?;
                }
                ServiceDiscoveryConfig::File(file_sd) => {
                    if self.options.syntax_only {
                        continue;
                    }
                    for pattern in &file_sd.files {
                        self.check_file_sd_pattern(pattern, &destination)?;
                    }
                }
                ServiceDiscoveryConfig::Static(groups) => {
                    self.expand(groups, &destination)?;
                }
                ServiceDiscoveryConfig::Other { mechanism } => {
                    debug!(mechanism = %mechanism, "skipping discovery mechanism");
                }
            }
        }
        Ok(())
    }

    fn check_file_sd_pattern(
        &mut self,
        pattern: &str,
        destination: &Destination<'_>,
    ) -> Result<(), OperationError> {
        let files = resolve_glob(pattern)?;
        if files.is_empty() {
            self.warn(destination.missing_file_warning(pattern));
            return Ok(());
        }
        for file in &files {
            let groups = load_target_group_file(file).map_err(|err| {
                err.with_context(format!("checking SD file {}", quoted(Path::new(pattern))))
            })?;
            self.expand(&groups, destination)?;
        }
        Ok(())
    }

    fn expand(
        &mut self,
        groups: &[TargetGroup],
        destination: &Destination<'_>,
    ) -> Result<(), OperationError> {
        match destination {
            Destination::Scrape(scrape) => {
                expand_scrape_targets(groups, scrape, &mut self.builder)?;
            }
            Destination::Alertmanager(alertmanager) => {
                expand_alertmanager_targets(groups, alertmanager, &mut self.builder)?;
            }
        }
        Ok(())
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message.trim_start());
        if self.options.echo_warnings {
            println!("{message}");
        }
        self.warnings.push(message);
    }
}

//! Expansion of discovered target groups into concrete scrape targets and
//! alertmanager endpoints.

use promcheck_config::{
    AlertmanagerConfig, Duration, Labels, LabelsBuilder, ScrapeConfig, TargetGroup,
    ADDRESS_LABEL, ALERTS_PATH_LABEL, INSTANCE_LABEL, JOB_LABEL, META_LABEL_PREFIX,
    METRICS_PATH_LABEL, PARAM_LABEL_PREFIX, SCHEME_LABEL, SCRAPE_INTERVAL_LABEL,
    SCRAPE_TIMEOUT_LABEL,
};

use crate::error::{ExpansionError, OperationError};
use crate::relabel;

/// Expands every group against `scrape`, returning the final label set of
/// each kept target. Stops at the first target that cannot be expanded.
pub fn expand_scrape_targets(
    groups: &[TargetGroup],
    scrape: &ScrapeConfig,
    builder: &mut LabelsBuilder,
) -> Result<Vec<Labels>, OperationError> {
    let mut targets = Vec::new();
    for group in groups {
        for (index, target) in group.targets.iter().enumerate() {
            seed_builder(builder, target, group);
            match populate_labels(builder, scrape) {
                Ok(Some(labels)) => targets.push(labels),
                Ok(None) => {}
                Err(source) => {
                    return Err(OperationError::TargetExpansion {
                        index,
                        group: group.to_string(),
                        source,
                    })
                }
            }
        }
    }
    Ok(targets)
}

/// Expands every group into alertmanager endpoints for `alertmanager`.
pub fn expand_alertmanager_targets(
    groups: &[TargetGroup],
    alertmanager: &AlertmanagerConfig,
    builder: &mut LabelsBuilder,
) -> Result<Vec<Labels>, OperationError> {
    let alerts_path = alerts_path(&alertmanager.path_prefix, &alertmanager.api_version);
    let mut endpoints = Vec::new();
    for group in groups {
        for (index, target) in group.targets.iter().enumerate() {
            builder.reset();
            for label in target.iter() {
                builder.set(&label.name, &label.value);
            }
            builder.set(SCHEME_LABEL, &alertmanager.scheme);
            builder.set(ALERTS_PATH_LABEL, &alerts_path);
            for label in group.labels.iter() {
                if !target.contains(&label.name) {
                    builder.set(&label.name, &label.value);
                }
            }

            if !relabel::process(builder, &alertmanager.relabel_configs) {
                continue;
            }
            let address = builder.get(ADDRESS_LABEL).to_owned();
            if let Err(source) = check_target_address(&address) {
                return Err(OperationError::TargetExpansion {
                    index,
                    group: group.to_string(),
                    source,
                });
            }
            endpoints.push(builder.labels());
        }
    }
    Ok(endpoints)
}

/// Target labels first, then group labels the target does not set itself.
fn seed_builder(builder: &mut LabelsBuilder, target: &Labels, group: &TargetGroup) {
    builder.reset();
    for label in target.iter() {
        builder.set(&label.name, &label.value);
    }
    for label in group.labels.iter() {
        if !target.contains(&label.name) {
            builder.set(&label.name, &label.value);
        }
    }
}

/// Computes the final label set of one scrape target. `Ok(None)` means
/// relabelling dropped the target.
fn populate_labels(
    builder: &mut LabelsBuilder,
    scrape: &ScrapeConfig,
) -> Result<Option<Labels>, ExpansionError> {
    let defaults = [
        (JOB_LABEL, scrape.job_name.clone()),
        (SCRAPE_INTERVAL_LABEL, scrape.scrape_interval.to_string()),
        (SCRAPE_TIMEOUT_LABEL, scrape.scrape_timeout.to_string()),
        (METRICS_PATH_LABEL, scrape.metrics_path.clone()),
        (SCHEME_LABEL, scrape.scheme.clone()),
    ];
    for (name, value) in &defaults {
        if builder.get(name).is_empty() {
            builder.set(name, value);
        }
    }
    for (name, values) in &scrape.params {
        if let Some(first) = values.first() {
            builder.set(&format!("{PARAM_LABEL_PREFIX}{name}"), first);
        }
    }

    if !relabel::process(builder, &scrape.relabel_configs) {
        return Ok(None);
    }

    let mut address = builder.get(ADDRESS_LABEL).to_owned();
    if address.is_empty() {
        return Err(ExpansionError::NoAddress);
    }
    if needs_port(&address) {
        let port = match builder.get(SCHEME_LABEL) {
            "http" | "" => "80",
            "https" => "443",
            other => return Err(ExpansionError::InvalidScheme(other.to_owned())),
        };
        address = format!("{address}:{port}");
        builder.set(ADDRESS_LABEL, &address);
    }
    check_target_address(&address)?;

    let interval = builder.get(SCRAPE_INTERVAL_LABEL).to_owned();
    let interval_duration: Duration = interval.parse().map_err(ExpansionError::InvalidInterval)?;
    if interval_duration.is_zero() {
        return Err(ExpansionError::ZeroInterval);
    }
    let timeout = builder.get(SCRAPE_TIMEOUT_LABEL).to_owned();
    let timeout_duration: Duration = timeout.parse().map_err(ExpansionError::InvalidTimeout)?;
    if timeout_duration.is_zero() {
        return Err(ExpansionError::ZeroTimeout);
    }
    if timeout_duration > interval_duration {
        return Err(ExpansionError::TimeoutExceedsInterval { timeout, interval });
    }

    for (name, _) in builder.snapshot() {
        if name.starts_with(META_LABEL_PREFIX) {
            builder.del(&name);
        }
    }
    if builder.get(INSTANCE_LABEL).is_empty() {
        builder.set(INSTANCE_LABEL, &address);
    }
    Ok(Some(builder.labels()))
}

fn check_target_address(address: &str) -> Result<(), ExpansionError> {
    if address.contains('/') {
        return Err(ExpansionError::InvalidHostname(address.to_owned()));
    }
    Ok(())
}

/// True when `address` lacks a port but would be valid with one appended.
fn needs_port(address: &str) -> bool {
    split_host_port(address).is_none() && split_host_port(&format!("{address}:1234")).is_some()
}

const BRACKETS: &[char] = &['[', ']'];

/// Splits `host:port` or `[host]:port`. The port may be empty; the host may
/// not contain a colon unless bracketed.
pub fn split_host_port(address: &str) -> Option<(&str, &str)> {
    let last_colon = address.rfind(':')?;
    let (host, port) = if let Some(rest) = address.strip_prefix('[') {
        let end = rest.find(']')? + 1;
        if end + 1 != last_colon {
            return None;
        }
        (&address[1..end], &address[last_colon + 1..])
    } else {
        let host = &address[..last_colon];
        if host.contains(':') {
            return None;
        }
        (host, &address[last_colon + 1..])
    };
    if host.contains(BRACKETS) || port.contains(BRACKETS) {
        return None;
    }
    Some((host, port))
}

/// `/<prefix>/api/<version>/alerts` with the prefix cleaned: empty and `.`
/// segments are dropped and `..` removes the previous segment, never going
/// above the root.
fn alerts_path(prefix: &str, api_version: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in prefix.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    let mut path = String::new();
    for segment in segments {
        path.push('/');
        path.push_str(segment);
    }
    format!("{path}/api/{api_version}/alerts")
}

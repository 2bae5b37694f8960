use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use promcheck_config::{
    parse_scrape_config_file, ConfigError, Configuration, Duration, RelabelAction,
    ServiceDiscoveryConfig, ADDRESS_LABEL,
};
use tempfile::TempDir;

fn write_file(path: impl AsRef<Path>, contents: &str) {
    let mut file = fs::File::create(path).expect("create file");
    file.write_all(contents.as_bytes()).expect("write file");
}

fn validation_messages(err: ConfigError) -> Vec<String> {
    match err {
        ConfigError::Validation(errors) => errors.iter().map(ToString::to_string).collect(),
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn applies_global_defaults_to_scrape_configs() {
    let config = Configuration::parse(
        r#"
global:
  scrape_interval: 30s
rule_files:
  - rules/*.yml
scrape_configs:
  - job_name: node
    static_configs:
      - targets: ["localhost:9100"]
        labels:
          env: prod
  - job_name: fast
    scrape_interval: 5s
"#,
    )
    .expect("parse config");

    assert_eq!(config.rule_files, vec!["rules/*.yml".to_string()]);
    let node = &config.scrape_configs[0];
    assert_eq!(node.scrape_interval, Duration::from_secs(30));
    assert_eq!(node.scrape_timeout, Duration::from_secs(10));
    assert_eq!(node.metrics_path, "/metrics");
    assert_eq!(node.scheme, "http");

    let fast = &config.scrape_configs[1];
    assert_eq!(fast.scrape_interval, Duration::from_secs(5));
    assert_eq!(fast.scrape_timeout, Duration::from_secs(5));

    let ServiceDiscoveryConfig::Static(groups) = &node.service_discovery[0] else {
        panic!("expected static discovery");
    };
    assert_eq!(groups[0].source, "0");
    assert_eq!(groups[0].targets[0].get(ADDRESS_LABEL), Some("localhost:9100"));
    assert_eq!(groups[0].labels.get("env"), Some("prod"));
}

#[test]
fn rejects_unknown_top_level_keys() {
    let err = Configuration::parse("scrape_confs: []\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("scrape_confs"));
}

#[test]
fn accepts_unmodelled_sections() {
    let config = Configuration::parse(
        r#"
remote_write:
  - url: http://remote/write
storage:
  tsdb:
    out_of_order_time_window: 10m
scrape_configs:
  - job_name: node
    sample_limit: 1000
"#,
    )
    .expect("parse config");
    assert_eq!(config.scrape_configs.len(), 1);
}

#[test]
fn collects_validation_errors_across_sections() {
    let err = Configuration::parse(
        r#"
scrape_configs:
  - job_name: node
    scrape_interval: 10s
    scrape_timeout: 20s
  - job_name: node
  - job_name: api
    bearer_token: secret
    bearer_token_file: /tmp/token
  - job_name: relabel
    relabel_configs:
      - action: hashmod
        target_label: shard
alerting:
  alertmanagers:
    - api_version: v1
"#,
    )
    .unwrap_err();

    let messages = validation_messages(err);
    assert_eq!(messages.len(), 5, "{messages:#?}");
    assert!(messages[0].contains("scrape timeout greater than scrape interval"));
    assert!(messages[1].contains("found multiple scrape configs with job name \"node\""));
    assert!(messages[2].starts_with("scrape_configs[api]: at most one of bearer_token"));
    assert!(messages[3].contains("relabel_configs[0]: relabel configuration for hashmod"));
    assert!(messages[4].starts_with("alerting.alertmanagers[0]: expected Alertmanager api version"));
}

#[test]
fn rejects_invalid_static_label_names() {
    let err = Configuration::parse(
        r#"
scrape_configs:
  - job_name: node
    static_configs:
      - targets: ["a:1"]
        labels:
          "bad-name": x
"#,
    )
    .unwrap_err();
    let messages = validation_messages(err);
    assert!(messages[0].contains("\"bad-name\" is not a valid label name"));
}

#[test]
fn rejects_conflicting_tls_material() {
    let err = Configuration::parse(
        r#"
scrape_configs:
  - job_name: node
    tls_config:
      cert: inline
      cert_file: client.crt
"#,
    )
    .unwrap_err();
    let messages = validation_messages(err);
    assert!(messages[0].contains("at most one of cert and cert_file"));
}

#[test]
fn ignores_unmodelled_authorization_and_tls_keys() {
    let config = Configuration::parse(
        r#"
scrape_configs:
  - job_name: api
    authorization:
      credentials_ref: api-token
    tls_config:
      ca_ref: ca
      cert_ref: client-cert
      key_ref: client-key
      min_version: TLS12
"#,
    )
    .expect("parse config");
    let http = &config.scrape_configs[0].http_client;
    assert_eq!(http.tls_config.cert_file, None);
    assert_eq!(
        http.authorization.as_ref().and_then(|auth| auth.credentials_file.clone()),
        None
    );
}

#[test]
fn orders_discovery_configs_by_key() {
    let config = Configuration::parse(
        r#"
scrape_configs:
  - job_name: mixed
    static_configs:
      - targets: ["a:1"]
    kubernetes_sd_configs:
      - role: pod
    file_sd_configs:
      - files: ["sd/*.json"]
    dns_sd_configs:
      - names: ["srv.example"]
"#,
    )
    .expect("parse config");
    let mechanisms: Vec<&str> = config.scrape_configs[0]
        .service_discovery
        .iter()
        .map(ServiceDiscoveryConfig::mechanism)
        .collect();
    assert_eq!(mechanisms, vec!["dns", "file", "kubernetes", "static"]);
}

#[test]
fn rejects_unknown_kubernetes_roles() {
    let err = Configuration::parse(
        r#"
scrape_configs:
  - job_name: k8s
    kubernetes_sd_configs:
      - role: cluster
"#,
    )
    .unwrap_err();
    let messages = validation_messages(err);
    assert!(messages[0].contains("unknown Kubernetes SD role \"cluster\""));
}

#[test]
fn alertmanager_defaults() {
    let config = Configuration::parse(
        r#"
alerting:
  alert_relabel_configs:
    - action: labeldrop
      regex: replica
  alertmanagers:
    - static_configs:
        - targets: ["am:9093"]
"#,
    )
    .expect("parse config");
    let alertmanager = &config.alerting.alertmanagers[0];
    assert_eq!(alertmanager.scheme, "http");
    assert_eq!(alertmanager.path_prefix, "/");
    assert_eq!(alertmanager.api_version, "v2");
    assert_eq!(alertmanager.timeout, Duration::from_secs(10));
    assert_eq!(
        config.alerting.alert_relabel_configs[0].action,
        RelabelAction::LabelDrop
    );
}

#[test]
fn set_directory_rebases_relative_paths() {
    let mut config = Configuration::parse(
        r#"
rule_files:
  - rules/*.yml
  - /etc/rules/abs.yml
scrape_configs:
  - job_name: node
    authorization:
      credentials_file: secrets/token
    tls_config:
      cert_file: tls/client.crt
      key_file: /etc/tls/client.key
    file_sd_configs:
      - files: ["sd/*.json"]
"#,
    )
    .expect("parse config");
    config.set_directory(Path::new("/srv/prom"));

    assert_eq!(
        config.rule_files,
        vec![
            "/srv/prom/rules/*.yml".to_string(),
            "/etc/rules/abs.yml".to_string()
        ]
    );
    let scrape = &config.scrape_configs[0];
    let tls = &scrape.http_client.tls_config;
    assert_eq!(
        tls.cert_file.as_deref(),
        Some(Path::new("/srv/prom/tls/client.crt"))
    );
    assert_eq!(tls.key_file.as_deref(), Some(Path::new("/etc/tls/client.key")));
    let credentials = scrape
        .http_client
        .authorization
        .as_ref()
        .and_then(|auth| auth.credentials_file.clone());
    assert_eq!(credentials, Some(PathBuf::from("/srv/prom/secrets/token")));
    let ServiceDiscoveryConfig::File(file_sd) = &scrape.service_discovery[0] else {
        panic!("expected file discovery");
    };
    assert_eq!(file_sd.files, vec!["/srv/prom/sd/*.json".to_string()]);
}

#[test]
fn scrape_config_files_inherit_globals_and_reject_duplicate_jobs() {
    let temp = TempDir::new().expect("tempdir");
    let extra = temp.path().join("extra.yml");
    write_file(
        &extra,
        "scrape_configs:\n  - job_name: node\n  - job_name: api\n    file_sd_configs:\n      - files: [targets.json]\n",
    );

    let config = Configuration::parse(
        "global:\n  scrape_interval: 20s\nscrape_configs:\n  - job_name: node\n",
    )
    .expect("parse config");
    let contents = fs::read_to_string(&extra).expect("read extra");
    let loaded =
        parse_scrape_config_file(&contents, &extra, &config.global).expect("parse extra");

    assert_eq!(loaded[1].scrape_interval, Duration::from_secs(20));
    let ServiceDiscoveryConfig::File(file_sd) = &loaded[1].service_discovery[0] else {
        panic!("expected file discovery");
    };
    assert_eq!(
        file_sd.files,
        vec![temp.path().join("targets.json").to_string_lossy().into_owned()]
    );

    let err = config
        .merge_scrape_configs(vec![(extra.clone(), loaded)])
        .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateJob { ref job, .. } if job == "node"));
}

#[test]
fn scrape_config_file_errors_name_the_file() {
    let err = parse_scrape_config_file(
        "scrape_configs:\n  - scrape_interval: 5s\n",
        Path::new("/srv/prom/extra.yml"),
        &Default::default(),
    )
    .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("job_name is empty"));
    assert!(message.contains("/srv/prom/extra.yml"));
}

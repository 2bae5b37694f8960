use pretty_assertions::assert_eq;
use promcheck_config::{LabelsBuilder, ServiceDiscoveryConfig, TargetGroup};
use promcheck_ops::{expand_alertmanager_targets, expand_scrape_targets, ExpansionError, OperationError};
use promcheck_test_support::parse_config;

fn static_groups(discovery: &[ServiceDiscoveryConfig]) -> Vec<TargetGroup> {
    discovery
        .iter()
        .find_map(|config| match config {
            ServiceDiscoveryConfig::Static(groups) => Some(groups.clone()),
            _ => None,
        })
        .expect("static discovery config")
}

#[test]
fn applies_scrape_defaults() {
    let config = parse_config(
        r#"
scrape_configs:
  - job_name: node
    scheme: https
    params:
      module: [icmp, tcp]
    static_configs:
      - targets: ["node-1", "node-2:9100"]
        labels:
          __meta_zone: eu
          env: prod
"#,
    );
    let scrape = &config.scrape_configs[0];
    let groups = static_groups(&scrape.service_discovery);

    let targets =
        expand_scrape_targets(&groups, scrape, &mut LabelsBuilder::default()).expect("expand");
    assert_eq!(targets.len(), 2);

    let first = &targets[0];
    assert_eq!(first.get("__address__"), Some("node-1:443"));
    assert_eq!(first.get("instance"), Some("node-1:443"));
    assert_eq!(first.get("job"), Some("node"));
    assert_eq!(first.get("env"), Some("prod"));
    assert_eq!(first.get("__scheme__"), Some("https"));
    assert_eq!(first.get("__metrics_path__"), Some("/metrics"));
    assert_eq!(first.get("__scrape_interval__"), Some("1m"));
    assert_eq!(first.get("__scrape_timeout__"), Some("10s"));
    assert_eq!(first.get("__param_module"), Some("icmp"));
    assert_eq!(first.get("__meta_zone"), None);

    assert_eq!(targets[1].get("instance"), Some("node-2:9100"));
}

#[test]
fn group_labels_override_defaults() {
    let config = parse_config(
        r#"
scrape_configs:
  - job_name: node
    static_configs:
      - targets: ["localhost:9090"]
        labels:
          job: self
          instance: primary
"#,
    );
    let scrape = &config.scrape_configs[0];
    let groups = static_groups(&scrape.service_discovery);
    let targets =
        expand_scrape_targets(&groups, scrape, &mut LabelsBuilder::default()).expect("expand");
    assert_eq!(targets[0].get("job"), Some("self"));
    assert_eq!(targets[0].get("instance"), Some("primary"));
}

#[test]
fn reports_failing_instance_index() {
    let config = parse_config(
        r#"
scrape_configs:
  - job_name: node
    static_configs:
      - targets: ["ok:1"]
      - targets: ["fine:1", "bad/host:1"]
"#,
    );
    let scrape = &config.scrape_configs[0];
    let groups = static_groups(&scrape.service_discovery);
    let err = expand_scrape_targets(&groups, scrape, &mut LabelsBuilder::default()).unwrap_err();
    match err {
        OperationError::TargetExpansion {
            index,
            group,
            source,
        } => {
            assert_eq!(index, 1);
            assert_eq!(group, "1");
            assert_eq!(source, ExpansionError::InvalidHostname("bad/host:1".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn relabelled_scheme_must_be_known_when_port_is_missing() {
    let config = parse_config(
        r#"
scrape_configs:
  - job_name: node
    static_configs:
      - targets: ["node-1"]
    relabel_configs:
      - target_label: __scheme__
        replacement: ftp
"#,
    );
    let scrape = &config.scrape_configs[0];
    let groups = static_groups(&scrape.service_discovery);
    let err = expand_scrape_targets(&groups, scrape, &mut LabelsBuilder::default()).unwrap_err();
    assert_eq!(err.to_string(), "instance 0 in group 0: invalid scheme: \"ftp\"");
}

#[test]
fn empty_address_after_relabelling() {
    let config = parse_config(
        r#"
scrape_configs:
  - job_name: node
    static_configs:
      - targets: ["node-1:9100"]
    relabel_configs:
      - action: labeldrop
        regex: __address__
"#,
    );
    let scrape = &config.scrape_configs[0];
    let groups = static_groups(&scrape.service_discovery);
    let err = expand_scrape_targets(&groups, scrape, &mut LabelsBuilder::default()).unwrap_err();
    assert_eq!(err.to_string(), "instance 0 in group 0: no address");
}

#[test]
fn keep_filters_targets() {
    let config = parse_config(
        r#"
scrape_configs:
  - job_name: node
    static_configs:
      - targets: ["a:1", "b:1", "c:1"]
    relabel_configs:
      - source_labels: [__address__]
        regex: "(a|c):1"
        action: keep
"#,
    );
    let scrape = &config.scrape_configs[0];
    let groups = static_groups(&scrape.service_discovery);
    let targets =
        expand_scrape_targets(&groups, scrape, &mut LabelsBuilder::default()).expect("expand");
    let addresses: Vec<_> = targets
        .iter()
        .filter_map(|labels| labels.get("__address__"))
        .collect();
    assert_eq!(addresses, vec!["a:1", "c:1"]);
}

#[test]
fn alertmanager_endpoints_carry_scheme_and_path() {
    let config = parse_config(
        r#"
alerting:
  alertmanagers:
    - scheme: https
      path_prefix: /am/
      static_configs:
        - targets: ["am-1:9093", "am-2:9093"]
          labels:
            __scheme__: http
            cluster: east
"#,
    );
    let alertmanager = &config.alerting.alertmanagers[0];
    let groups = static_groups(&alertmanager.service_discovery);
    let endpoints =
        expand_alertmanager_targets(&groups, alertmanager, &mut LabelsBuilder::default())
            .expect("expand");

    assert_eq!(endpoints.len(), 2);
    assert_eq!(endpoints[0].get("__address__"), Some("am-1:9093"));
    assert_eq!(endpoints[0].get("__alerts_path__"), Some("/am/api/v2/alerts"));
    assert_eq!(endpoints[0].get("__scheme__"), Some("http"));
    assert_eq!(endpoints[0].get("cluster"), Some("east"));
}

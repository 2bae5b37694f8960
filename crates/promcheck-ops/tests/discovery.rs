use pretty_assertions::assert_eq;
use promcheck_ops::{load_target_group_file, ErrorKind, OperationError};
use promcheck_test_support::Fixture;

#[test]
fn loads_json_groups_with_sources() {
    let fixture = Fixture::new();
    let path = fixture.write(
        "targets.json",
        r#"[
  {"targets": ["a:9100", "b:9100"], "labels": {"env": "prod"}, "comment": "ignored"},
  {"targets": ["c:9100"]}
]"#,
    );

    let groups = load_target_group_file(&path).expect("load json");
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].targets.len(), 2);
    assert_eq!(groups[0].targets[1].get("__address__"), Some("b:9100"));
    assert_eq!(groups[0].labels.get("env"), Some("prod"));
    assert_eq!(groups[1].source, format!("{}:1", path.display()));
}

#[test]
fn extension_is_case_insensitive() {
    let fixture = Fixture::new();
    let path = fixture.write("targets.YAML", "- targets: [\"a:1\"]\n");
    assert_eq!(load_target_group_file(&path).expect("load yaml").len(), 1);
}

#[test]
fn dot_file_name_is_its_own_extension() {
    let fixture = Fixture::new();
    let path = fixture.write("sd/.json", r#"[{"targets": ["a:1"]}]"#);
    let groups = load_target_group_file(&path).expect("load dot-file json");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].targets[0].get("__address__"), Some("a:1"));

    let path = fixture.write("sd/.yml", "- targets: [\"b:1\"]\n");
    assert_eq!(load_target_group_file(&path).expect("load dot-file yaml").len(), 1);

    let err = load_target_group_file(&fixture.write("sd/targets", "[]")).unwrap_err();
    assert_eq!(err.to_string(), "invalid file extension: \"\"");
}

#[test]
fn yaml_rejects_unknown_fields() {
    let fixture = Fixture::new();
    let path = fixture.write("targets.yml", "- targets: [\"a:1\"]\n  comment: nope\n");
    let err = load_target_group_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn blank_yaml_has_no_groups() {
    let fixture = Fixture::new();
    let path = fixture.write("empty.yml", "# nothing yet\n");
    assert!(load_target_group_file(&path).expect("load blank").is_empty());
}

#[test]
fn first_null_entry_is_reported() {
    let fixture = Fixture::new();
    let path = fixture.write("targets.json", r#"[{"targets": ["a:1"]}, null, null]"#);
    match load_target_group_file(&path).unwrap_err() {
        OperationError::NullEntry { index, .. } => assert_eq!(index, 1),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unsupported_extension() {
    let fixture = Fixture::new();
    let path = fixture.write("targets.txt", "a:1\n");
    let err = load_target_group_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    assert_eq!(err.to_string(), "invalid file extension: \".txt\"");
}

#[test]
fn invalid_group_label_name() {
    let fixture = Fixture::new();
    let path = fixture.write(
        "targets.json",
        r#"[{"targets": ["a:1"], "labels": {"bad-name": "x"}}]"#,
    );
    let err = load_target_group_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().starts_with("target group 0:"));
}

#[test]
fn unreadable_file_is_io_error() {
    let fixture = Fixture::new();
    let err = load_target_group_file(&fixture.path("missing.json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn malformed_json_is_decode_error() {
    let fixture = Fixture::new();
    let path = fixture.write("targets.json", "[{\"targets\": ");
    assert_eq!(
        load_target_group_file(&path).unwrap_err().kind(),
        ErrorKind::Decode
    );
}

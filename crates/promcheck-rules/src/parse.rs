use std::collections::{BTreeMap, HashSet};

use promcheck_config::{is_valid_label_name, is_valid_metric_name, Duration};
use serde::Deserialize;
use serde_yaml::Value;

use crate::{ParseOptions, Rule, RuleGroup, RuleGroups, RuleKind, RuleParseError};

const METRIC_NAME_LABEL: &str = "__name__";

#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    groups: Option<Vec<Option<RawGroup>>>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawGroup {
    #[serde(default)]
    name: Option<String>,
    interval: Option<Duration>,
    limit: Option<u64>,
    #[serde(default)]
    rules: Option<Vec<Option<RawRule>>>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRule {
    #[serde(default)]
    record: Option<Value>,
    #[serde(default)]
    alert: Option<Value>,
    #[serde(default)]
    expr: Option<Value>,
    #[serde(rename = "for")]
    for_duration: Option<Duration>,
    keep_firing_for: Option<Duration>,
    #[serde(default)]
    labels: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    annotations: Option<BTreeMap<String, Value>>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

pub(crate) fn parse_document(
    contents: &str,
    options: ParseOptions,
) -> Result<RuleGroups, Vec<RuleParseError>> {
    if is_blank_document(contents) {
        return Ok(RuleGroups::default());
    }
    let raw: RawDocument = serde_yaml::from_str::<Option<RawDocument>>(contents)
        .map_err(|err| vec![RuleParseError::Syntax(err)])?
        .unwrap_or_default();

    let mut errors = Vec::new();
    if options.strict {
        report_unknown_fields("rule document", &raw.extra, &mut errors);
    }

    let mut seen = HashSet::new();
    let mut groups = Vec::new();
    for raw_group in raw.groups.unwrap_or_default() {
        let raw_group = raw_group.unwrap_or_default();
        let name = raw_group.name.clone().unwrap_or_default();
        if name.is_empty() {
            errors.push(RuleParseError::Group {
                group: name.clone(),
                message: "Groupname must not be empty".to_owned(),
            });
        } else if !seen.insert(name.clone()) {
            errors.push(RuleParseError::Group {
                group: name.clone(),
                message: format!("groupname: {name:?} is repeated in the same file"),
            });
        }
        if options.strict {
            report_unknown_fields(&format!("group {name:?}"), &raw_group.extra, &mut errors);
        }

        let mut rules = Vec::new();
        for (idx, raw_rule) in raw_group
            .rules
            .unwrap_or_default()
            .into_iter()
            .enumerate()
        {
            let raw_rule = raw_rule.unwrap_or_default();
            if options.strict {
                report_unknown_fields(
                    &format!("group {name:?}, rule {}", idx + 1),
                    &raw_rule.extra,
                    &mut errors,
                );
            }
            match raw_rule.finalize() {
                Ok(rule) => rules.push(rule),
                Err((rule_name, messages)) => {
                    errors.extend(messages.into_iter().map(|message| RuleParseError::Rule {
                        group: name.clone(),
                        index: idx + 1,
                        name: rule_name.clone(),
                        message,
                    }))
                }
            }
        }

        groups.push(RuleGroup {
            name,
            interval: raw_group.interval,
            limit: raw_group.limit,
            rules,
        });
    }

    if errors.is_empty() {
        Ok(RuleGroups { groups })
    } else {
        Err(errors)
    }
}

impl RawRule {
    /// Validates one rule. On failure returns the rule's display name with
    /// every problem found.
    fn finalize(self) -> Result<Rule, (String, Vec<String>)> {
        let mut errors = Vec::new();

        let record = scalar_field("record", self.record, &mut errors);
        let alert = scalar_field("alert", self.alert, &mut errors);
        let expr = scalar_field("expr", self.expr, &mut errors);
        let labels = scalar_map("labels", self.labels, &mut errors);
        let annotations = scalar_map("annotations", self.annotations, &mut errors);
        let display_name = if record.is_empty() {
            alert.clone()
        } else {
            record.clone()
        };

        match (record.is_empty(), alert.is_empty()) {
            (false, false) => errors.push("only one of 'record' and 'alert' must be set".into()),
            (true, true) => errors.push("one of 'record' or 'alert' must be set".into()),
            _ => {}
        }
        if expr.trim().is_empty() {
            errors.push("field 'expr' must be set in rule".into());
        }

        let for_duration = self.for_duration.filter(|value| !value.is_zero());
        let keep_firing_for = self.keep_firing_for.filter(|value| !value.is_zero());
        if !record.is_empty() {
            if !annotations.is_empty() {
                errors.push("invalid field 'annotations' in recording rule".into());
            }
            if for_duration.is_some() {
                errors.push("invalid field 'for' in recording rule".into());
            }
            if keep_firing_for.is_some() {
                errors.push("invalid field 'keep_firing_for' in recording rule".into());
            }
            if !is_valid_metric_name(&record) {
                errors.push(format!("invalid recording rule name: {record}"));
            }
        }

        for name in labels.keys() {
            if !is_valid_label_name(name) || name == METRIC_NAME_LABEL {
                errors.push(format!("invalid label name: {name}"));
            }
        }
        for name in annotations.keys() {
            if !is_valid_label_name(name) {
                errors.push(format!("invalid annotation name: {name}"));
            }
        }

        if !errors.is_empty() {
            return Err((display_name, errors));
        }

        let kind = if record.is_empty() {
            RuleKind::Alerting { alert }
        } else {
            RuleKind::Recording { record }
        };
        Ok(Rule {
            kind,
            expr,
            for_duration,
            keep_firing_for,
            labels,
            annotations,
        })
    }
}

/// Reads a scalar the way the rule grammar does: numbers and booleans are
/// accepted and kept in their textual form.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.clone()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

fn scalar_field(field: &str, value: Option<Value>, errors: &mut Vec<String>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    scalar_to_string(&value).unwrap_or_else(|| {
        errors.push(format!("field '{field}' must be a string"));
        String::new()
    })
}

fn scalar_map(
    field: &str,
    values: Option<BTreeMap<String, Value>>,
    errors: &mut Vec<String>,
) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (name, value) in values.unwrap_or_default() {
        match scalar_to_string(&value) {
            Some(text) => {
                out.insert(name, text);
            }
            None => errors.push(format!("value of {field} entry {name:?} must be a string")),
        }
    }
    out
}

fn report_unknown_fields(
    section: &str,
    extra: &BTreeMap<String, Value>,
    errors: &mut Vec<RuleParseError>,
) {
    errors.extend(extra.keys().map(|field| RuleParseError::UnknownField {
        section: section.to_owned(),
        field: field.clone(),
    }));
}

fn is_blank_document(contents: &str) -> bool {
    contents.lines().all(|line| {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "---"
    })
}

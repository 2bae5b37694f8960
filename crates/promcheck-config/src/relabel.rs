//! Relabelling rule definitions. Evaluation lives in `promcheck-ops`.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::Deserialize;

use crate::labels::is_valid_label_name;

pub const DEFAULT_SEPARATOR: &str = ";";
pub const DEFAULT_REGEX: &str = "(.*)";
pub const DEFAULT_REPLACEMENT: &str = "$1";

/// Relabelling actions understood by the validator.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RelabelAction {
    Replace,
    Keep,
    Drop,
    KeepEqual,
    DropEqual,
    HashMod,
    LabelMap,
    LabelDrop,
    LabelKeep,
    Lowercase,
    Uppercase,
}

impl RelabelAction {
    pub fn as_str(self) -> &'static str {
        match self {
            RelabelAction::Replace => "replace",
            RelabelAction::Keep => "keep",
            RelabelAction::Drop => "drop",
            RelabelAction::KeepEqual => "keepequal",
            RelabelAction::DropEqual => "dropequal",
            RelabelAction::HashMod => "hashmod",
            RelabelAction::LabelMap => "labelmap",
            RelabelAction::LabelDrop => "labeldrop",
            RelabelAction::LabelKeep => "labelkeep",
            RelabelAction::Lowercase => "lowercase",
            RelabelAction::Uppercase => "uppercase",
        }
    }

    fn requires_target_label(self) -> bool {
        matches!(
            self,
            RelabelAction::Replace
                | RelabelAction::HashMod
                | RelabelAction::Lowercase
                | RelabelAction::Uppercase
                | RelabelAction::KeepEqual
                | RelabelAction::DropEqual
        )
    }
}

impl fmt::Display for RelabelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelabelAction {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "replace" => Ok(RelabelAction::Replace),
            "keep" => Ok(RelabelAction::Keep),
            "drop" => Ok(RelabelAction::Drop),
            "keepequal" => Ok(RelabelAction::KeepEqual),
            "dropequal" => Ok(RelabelAction::DropEqual),
            "hashmod" => Ok(RelabelAction::HashMod),
            "labelmap" => Ok(RelabelAction::LabelMap),
            "labeldrop" => Ok(RelabelAction::LabelDrop),
            "labelkeep" => Ok(RelabelAction::LabelKeep),
            "lowercase" => Ok(RelabelAction::Lowercase),
            "uppercase" => Ok(RelabelAction::Uppercase),
            _ => Err(()),
        }
    }
}

/// Fully anchored regular expression plus the source text it was built from.
#[derive(Clone, Debug)]
pub struct RelabelRegex {
    original: String,
    compiled: Regex,
}

impl RelabelRegex {
    pub fn new(expr: &str) -> Result<Self, regex::Error> {
        let compiled = Regex::new(&format!("^(?s:(?:{expr}))$"))?;
        Ok(RelabelRegex {
            original: expr.to_owned(),
            compiled,
        })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn regex(&self) -> &Regex {
        &self.compiled
    }
}

/// Validated relabelling step.
#[derive(Clone, Debug)]
pub struct RelabelConfig {
    pub source_labels: Vec<String>,
    pub separator: String,
    pub regex: RelabelRegex,
    pub modulus: u64,
    pub target_label: String,
    pub replacement: String,
    pub action: RelabelAction,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawRelabelConfig {
    #[serde(default)]
    source_labels: Option<Vec<String>>,
    #[serde(default)]
    separator: Option<String>,
    #[serde(default)]
    regex: Option<String>,
    #[serde(default)]
    modulus: Option<u64>,
    #[serde(default)]
    target_label: Option<String>,
    #[serde(default)]
    replacement: Option<String>,
    #[serde(default)]
    action: Option<String>,
}

impl RawRelabelConfig {
    pub(crate) fn finalize(self) -> Result<RelabelConfig, String> {
        let action_text = self.action.unwrap_or_else(|| "replace".to_owned());
        let action: RelabelAction = action_text
            .parse()
            .map_err(|_| format!("unknown relabel action {action_text:?}"))?;

        let regex_text = self.regex.unwrap_or_else(|| DEFAULT_REGEX.to_owned());
        let regex = RelabelRegex::new(&regex_text)
            .map_err(|err| format!("invalid relabel regex {regex_text:?}: {err}"))?;

        let target_label = self.target_label.unwrap_or_default();
        let modulus = self.modulus.unwrap_or(0);

        if action == RelabelAction::HashMod && modulus == 0 {
            return Err("relabel configuration for hashmod requires non-zero modulus".into());
        }
        if action.requires_target_label() && target_label.is_empty() {
            return Err(format!(
                "relabel configuration for {action} action requires 'target_label' value"
            ));
        }
        let templated = target_label.contains('$');
        if action == RelabelAction::Replace && !templated && !is_valid_label_name(&target_label) {
            return Err(format!(
                "{target_label:?} is invalid 'target_label' for {action} action"
            ));
        }
        if matches!(
            action,
            RelabelAction::Lowercase
                | RelabelAction::Uppercase
                | RelabelAction::KeepEqual
                | RelabelAction::DropEqual
        ) && !is_valid_label_name(&target_label)
        {
            return Err(format!(
                "{target_label:?} is invalid 'target_label' for {action} action"
            ));
        }
        if matches!(action, RelabelAction::KeepEqual | RelabelAction::DropEqual)
            && regex_text != DEFAULT_REGEX
        {
            return Err(format!("'regex' field must not be set for {action} action"));
        }
        if matches!(action, RelabelAction::LabelDrop | RelabelAction::LabelKeep)
            && (self.source_labels.is_some()
                || !target_label.is_empty()
                || modulus != 0
                || self.separator.is_some()
                || self.replacement.is_some())
        {
            return Err(format!(
                "{action} action requires only 'regex', and no other fields"
            ));
        }

        let source_labels = self.source_labels.unwrap_or_default();
        if let Some(invalid) = source_labels
            .iter()
            .find(|name| !is_valid_label_name(name))
        {
            return Err(format!("{invalid:?} is not a valid label name"));
        }

        Ok(RelabelConfig {
            source_labels,
            separator: self
                .separator
                .unwrap_or_else(|| DEFAULT_SEPARATOR.to_owned()),
            regex,
            modulus,
            target_label,
            replacement: self
                .replacement
                .unwrap_or_else(|| DEFAULT_REPLACEMENT.to_owned()),
            action,
        })
    }
}

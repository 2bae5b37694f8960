//! Target-group files used by file-based service discovery.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use promcheck_config::TargetGroup;
use serde::Deserialize;

use crate::error::{DecodeError, OperationError};

/// JSON decoding ignores unknown fields.
#[derive(Debug, Default, Deserialize)]
struct JsonTargetGroup {
    #[serde(default)]
    targets: Option<Vec<String>>,
    #[serde(default)]
    labels: Option<BTreeMap<String, String>>,
}

/// YAML decoding is strict.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct YamlTargetGroup {
    #[serde(default)]
    targets: Option<Vec<String>>,
    #[serde(default)]
    labels: Option<BTreeMap<String, String>>,
}

enum Format {
    Json,
    Yaml,
}

/// Reads and validates a target-group file. The format follows the file
/// extension (`.json`, `.yml`, `.yaml`, any case). Group sources are
/// `<path>:<index>`.
pub fn load_target_group_file(path: &Path) -> Result<Vec<TargetGroup>, OperationError> {
    // Everything from the last dot of the file name, so `.json` is its own
    // extension.
    let extension = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.rfind('.').map(|dot| name[dot..].to_owned()))
        .unwrap_or_default();
    let format = match extension.to_ascii_lowercase().as_str() {
        ".json" => Format::Json,
        ".yml" | ".yaml" => Format::Yaml,
        _ => {
            return Err(OperationError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            })
        }
    };

    let content = fs::read(path).map_err(|source| OperationError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let decode_error = |source: DecodeError| OperationError::Decode {
        path: path.to_path_buf(),
        source,
    };
    let entries: Vec<Option<(Vec<String>, BTreeMap<String, String>)>> = match format {
        Format::Json => serde_json::from_slice::<Option<Vec<Option<JsonTargetGroup>>>>(&content)
            .map_err(|err| decode_error(err.into()))?
            .unwrap_or_default()
            .into_iter()
            .map(|entry| {
                entry.map(|group| {
                    (
                        group.targets.unwrap_or_default(),
                        group.labels.unwrap_or_default(),
                    )
                })
            })
            .collect(),
        Format::Yaml => decode_yaml(&content)
            .map_err(|err| decode_error(err.into()))?
            .into_iter()
            .map(|entry| {
                entry.map(|group| {
                    (
                        group.targets.unwrap_or_default(),
                        group.labels.unwrap_or_default(),
                    )
                })
            })
            .collect(),
    };

    if let Some(index) = entries.iter().position(Option::is_none) {
        return Err(OperationError::NullEntry {
            path: path.to_path_buf(),
            index,
        });
    }

    let display = path.display();
    entries
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(index, (targets, labels))| {
            TargetGroup::from_parts(targets, labels, format!("{display}:{index}")).map_err(
                |message| decode_error(DecodeError::InvalidGroup { index, message }),
            )
        })
        .collect()
}

fn decode_yaml(content: &[u8]) -> Result<Vec<Option<YamlTargetGroup>>, serde_yaml::Error> {
    let blank = std::str::from_utf8(content)
        .map(|text| {
            text.lines().all(|line| {
                let trimmed = line.trim();
                trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "---"
            })
        })
        .unwrap_or(false);
    if blank {
        return Ok(Vec::new());
    }
    Ok(serde_yaml::from_slice::<Option<Vec<Option<YamlTargetGroup>>>>(content)?.unwrap_or_default())
}

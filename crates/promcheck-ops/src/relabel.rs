//! Relabelling applied to a label builder.

use md5::{Digest, Md5};
use promcheck_config::{is_valid_label_name, LabelsBuilder, RelabelAction, RelabelConfig};

/// Applies `configs` in order. Returns `false` as soon as a step drops the
/// label set; the builder is left in its partially relabelled state.
pub fn process(builder: &mut LabelsBuilder, configs: &[RelabelConfig]) -> bool {
    configs.iter().all(|config| apply(builder, config))
}

fn apply(builder: &mut LabelsBuilder, config: &RelabelConfig) -> bool {
    let value = config
        .source_labels
        .iter()
        .map(|name| builder.get(name))
        .collect::<Vec<_>>()
        .join(&config.separator);
    let regex = config.regex.regex();

    match config.action {
        RelabelAction::Drop => return !regex.is_match(&value),
        RelabelAction::Keep => return regex.is_match(&value),
        RelabelAction::DropEqual => return builder.get(&config.target_label) != value,
        RelabelAction::KeepEqual => return builder.get(&config.target_label) == value,
        RelabelAction::Replace => {
            let Some(captures) = regex.captures(&value) else {
                return true;
            };
            let mut target = String::new();
            captures.expand(&config.target_label, &mut target);
            if !is_valid_label_name(&target) {
                return true;
            }
            let mut replaced = String::new();
            captures.expand(&config.replacement, &mut replaced);
            if replaced.is_empty() {
                builder.del(&target);
            } else {
                builder.set(&target, &replaced);
            }
        }
        RelabelAction::Lowercase => builder.set(&config.target_label, &value.to_lowercase()),
        RelabelAction::Uppercase => builder.set(&config.target_label, &value.to_uppercase()),
        RelabelAction::HashMod => {
            // Low 64 bits of the digest, big-endian.
            let digest = Md5::digest(value.as_bytes());
            let mut tail = [0u8; 8];
            tail.copy_from_slice(&digest[digest.len() - 8..]);
            let bucket = u64::from_be_bytes(tail) % config.modulus;
            builder.set(&config.target_label, &bucket.to_string());
        }
        RelabelAction::LabelMap => {
            for (name, label_value) in builder.snapshot() {
                if regex.is_match(&name) {
                    let mapped = regex.replace_all(&name, config.replacement.as_str());
                    builder.set(&mapped, &label_value);
                }
            }
        }
        RelabelAction::LabelDrop => {
            for (name, _) in builder.snapshot() {
                if regex.is_match(&name) {
                    builder.del(&name);
                }
            }
        }
        RelabelAction::LabelKeep => {
            for (name, _) in builder.snapshot() {
                if !regex.is_match(&name) {
                    builder.del(&name);
                }
            }
        }
    }
    true
}

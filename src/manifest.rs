//! Structural merging of JSON manifests.
//!
//! Objects merge key by key, arrays concatenate (skipping elements already
//! present, so applying the same fragment twice changes nothing) and
//! scalars are last-applied-wins. Any other shape combination is a conflict.
//!
//! Targets are parsed as strict JSON; JSONC comments are not supported.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::Path;

use log::debug;
use serde_json::{json, Map, Value};

use crate::constants::DEPENDENCY_KEYS;
use crate::error::{Error, Result};

/// Where and why a merge failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub key: String,
    pub reason: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.reason)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_container(value: &Value) -> bool {
    value.is_array() || value.is_object()
}

/// Deep-merges `fragment` into `base`.
pub fn deep_merge(base: &mut Value, fragment: &Value) -> std::result::Result<(), Conflict> {
    merge_at(base, fragment, "")
}

fn merge_at(base: &mut Value, fragment: &Value, key: &str) -> std::result::Result<(), Conflict> {
    match (base, fragment) {
        (Value::Object(base), Value::Object(fragment)) => {
            for (name, value) in fragment {
                let child = if key.is_empty() { name.clone() } else { format!("{key}.{name}") };
                match base.get_mut(name) {
                    Some(existing) => merge_at(existing, value, &child)?,
                    None => {
                        base.insert(name.clone(), value.clone());
                    }
                }
            }
        }
        (Value::Array(base), Value::Array(fragment)) => {
            for item in fragment {
                if !base.contains(item) {
                    base.push(item.clone());
                }
            }
        }
        (base, fragment) => {
            if is_container(base) || is_container(fragment) {
                return Err(Conflict {
                    key: if key.is_empty() { "<root>".to_string() } else { key.to_string() },
                    reason: format!("cannot merge {} into {}", kind(fragment), kind(base)),
                });
            }
            *base = fragment.clone();
        }
    }
    Ok(())
}

/// Sorts the keys of every dependency map, as package managers do.
pub fn sort_dependency_maps(manifest: &mut Value) {
    let Some(object) = manifest.as_object_mut() else {
        return;
    };
    for key in DEPENDENCY_KEYS {
        if let Some(Value::Object(deps)) = object.get_mut(key) {
            let mut entries: Vec<(String, Value)> = std::mem::take(deps).into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            *deps = entries.into_iter().collect::<Map<String, Value>>();
        }
    }
}

/// Removes commas left dangling before a closing brace or bracket, which
/// appear when fragment filtering drops the last entry of a block. Commas
/// inside string literals are kept.
pub fn strip_trailing_commas(json: &str) -> Cow<'_, str> {
    let mut output = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut changed = false;

    for (index, c) in json.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
        } else if c == '"' {
            in_string = true;
        } else if c == ',' && json[index + 1..].trim_start().starts_with(['}', ']']) {
            changed = true;
            continue;
        }
        output.push(c);
    }

    if changed {
        Cow::Owned(output)
    } else {
        Cow::Borrowed(json)
    }
}

fn string_map() -> Value {
    json!({ "type": "object", "additionalProperties": { "type": "string" } })
}

fn manifest_schema() -> Value {
    let mut properties = Map::new();
    properties.insert("name".into(), json!({ "type": "string" }));
    properties.insert("version".into(), json!({ "type": "string" }));
    properties.insert("scripts".into(), string_map());
    for key in DEPENDENCY_KEYS {
        properties.insert(key.into(), string_map());
    }
    json!({ "type": "object", "properties": properties })
}

/// Checks the shape of a package manifest.
pub fn validate_manifest(manifest: &Value) -> std::result::Result<(), String> {
    let validator = jsonschema::validator_for(&manifest_schema()).map_err(|e| e.to_string())?;
    let errors: Vec<String> = validator.iter_errors(manifest).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

/// Merges JSON `additions` into the file at `target`, creating it if needed.
/// `source` names the fragment for error reporting.
pub fn merge_into_file(target: &Path, additions: &str, source: &Path) -> Result<()> {
    let fragment: Value = serde_json::from_str(&strip_trailing_commas(additions)).map_err(|e| {
        Error::MalformedFragment { path: source.to_path_buf(), line: e.line(), reason: e.to_string() }
    })?;

    let mut manifest = if target.is_file() {
        let content = fs::read_to_string(target).map_err(Error::io(target))?;
        serde_json::from_str(&content).map_err(|e| Error::InvalidManifest {
            path: target.to_path_buf(),
            reason: e.to_string(),
        })?
    } else {
        Value::Object(Map::new())
    };

    deep_merge(&mut manifest, &fragment).map_err(|conflict| Error::MergeConflict {
        path: target.to_path_buf(),
        key: conflict.key,
        reason: conflict.reason,
    })?;

    if target.file_name().is_some_and(|name| name == "package.json") {
        sort_dependency_maps(&mut manifest);
        validate_manifest(&manifest)
            .map_err(|reason| Error::InvalidManifest { path: target.to_path_buf(), reason })?;
    }

    debug!("Writing merged manifest {}", target.display());
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(Error::io(parent))?;
    }
    let mut rendered = serde_json::to_string_pretty(&manifest)?;
    rendered.push('\n');
    fs::write(target, rendered).map_err(Error::io(target))
}

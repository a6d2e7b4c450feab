//! Conditional inclusion.
//!
//! Two independent mechanisms decide what ends up in a generated project:
//! whole-file skip rules evaluated against each layer-relative path, and
//! addition fragments (`<target>.additions`) that are filtered, substituted
//! and merged into their target file once every layer has been copied.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use globset::{Glob, GlobMatcher};
use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::constants::{ADDITIONS_SUFFIX, RULES_FILES};
use crate::context::{TemplateData, AXES};
use crate::error::{Error, Result};
use crate::manifest;
use crate::substitute::substitute;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RulesFile {
    #[serde(default)]
    rules: Vec<RuleSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleSpec {
    pattern: String,
    requires: IndexMap<String, String>,
}

/// A file applies only when every `requires` entry matches the configuration.
#[derive(Debug, Clone)]
pub struct InclusionRule {
    pattern: String,
    matcher: GlobMatcher,
    requires: IndexMap<String, String>,
}

impl InclusionRule {
    pub fn new<S: Into<String>>(pattern: S, requires: IndexMap<String, String>) -> Result<Self> {
        let pattern = pattern.into();
        if let Some(axis) = requires.keys().find(|axis| !AXES.contains(&axis.as_str())) {
            return Err(Error::Rules(format!("rule '{pattern}' requires unknown axis '{axis}'")));
        }
        let matcher = Glob::new(&pattern)
            .map_err(|e| Error::Rules(format!("invalid pattern '{pattern}': {e}")))?
            .compile_matcher();
        Ok(Self { pattern, matcher, requires })
    }

    fn requirement(pattern: &str, axis: &str, value: &str) -> Result<Self> {
        let mut requires = IndexMap::new();
        requires.insert(axis.to_string(), value.to_string());
        Self::new(pattern, requires)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn is_satisfied(&self, data: &TemplateData) -> bool {
        self.requires
            .iter()
            .all(|(axis, expected)| data.axis(axis).flatten() == Some(expected.as_str()))
    }
}

/// Whole-file skip rules for one layer.
#[derive(Debug, Clone)]
pub struct InclusionRules {
    rules: Vec<InclusionRule>,
}

impl InclusionRules {
    /// Rules every layer carries: files whose path mentions an ORM only ship
    /// when that ORM is selected.
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            rules: vec![
                InclusionRule::requirement("*electric*", "orm", "electric")?,
                InclusionRule::requirement("*drizzle*", "orm", "drizzle")?,
            ],
        })
    }

    /// Built-in rules plus the ones declared in the layer's rules manifest.
    pub fn for_layer(layer_root: &Path) -> Result<Self> {
        let mut rules = Self::builtin()?;
        if let Some(path) = rules_file(layer_root) {
            debug!("Loading inclusion rules from {}", path.display());
            rules.rules.extend(load_rules_file(&path)?);
        }
        Ok(rules)
    }

    pub fn rules(&self) -> &[InclusionRule] {
        &self.rules
    }

    /// Whether a layer-relative, `/`-separated path is excluded for this
    /// configuration.
    pub fn should_skip(&self, relative: &str, data: &TemplateData) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.matcher.is_match(relative) && !rule.is_satisfied(data))
    }
}

/// The rules manifest at a layer root, if any.
pub fn rules_file(layer_root: &Path) -> Option<PathBuf> {
    RULES_FILES.iter().map(|name| layer_root.join(name)).find(|path| path.is_file())
}

pub fn is_rules_file(relative: &str) -> bool {
    RULES_FILES.contains(&relative)
}

fn load_rules_file(path: &Path) -> Result<Vec<InclusionRule>> {
    let content = fs::read_to_string(path).map_err(Error::io(path))?;
    let parsed: RulesFile = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)
            .map_err(|e| Error::Rules(format!("{}: {e}", path.display())))?
    } else {
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Rules(format!("{}: {e}", path.display())))?
    };
    parsed.rules.into_iter().map(|spec| InclusionRule::new(spec.pattern, spec.requires)).collect()
}

/// A side-car addition discovered while copying layers.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Where the fragment was read from, for error reporting.
    pub source: PathBuf,
    /// Output-relative path of the file it merges into.
    pub target: PathBuf,
    pub content: String,
}

/// Output-relative target of a side-car path, or `None` for ordinary files.
pub fn fragment_target(relative: &Path) -> Option<PathBuf> {
    let name = relative.file_name()?.to_str()?;
    let target = name.strip_suffix(ADDITIONS_SUFFIX)?;
    if target.is_empty() {
        return None;
    }
    Some(relative.with_file_name(target))
}

struct Markers {
    open: Regex,
    close: Regex,
    inline: Regex,
}

fn markers() -> &'static Markers {
    static MARKERS: OnceLock<Markers> = OnceLock::new();
    MARKERS.get_or_init(|| {
        const COMMENT_OPEN: &str = r"(?://|#|/\*|<!--)?";
        const COMMENT_CLOSE: &str = r"(?:\*/|-->)?";
        const CONDITION: &str = r"([A-Za-z]+)\s*(!=|=)\s*([A-Za-z0-9_.-]+)";
        Markers {
            open: Regex::new(&format!(
                r"^\s*{COMMENT_OPEN}\s*@amp-if\s+{CONDITION}\s*{COMMENT_CLOSE}\s*$"
            ))
            .expect("valid regex"),
            close: Regex::new(&format!(r"^\s*{COMMENT_OPEN}\s*@amp-endif\s*{COMMENT_CLOSE}\s*$"))
                .expect("valid regex"),
            inline: Regex::new(&format!(
                r"\s*{COMMENT_OPEN}\s*@amp-when\s+{CONDITION}\s*{COMMENT_CLOSE}\s*$"
            ))
            .expect("valid regex"),
        }
    })
}

fn evaluate(
    caps: &regex::Captures,
    data: &TemplateData,
    source: &Path,
    line: usize,
) -> Result<bool> {
    let axis = &caps[1];
    let value = data.axis(axis).ok_or_else(|| Error::MalformedFragment {
        path: source.to_path_buf(),
        line,
        reason: format!("unknown axis '{axis}'"),
    })?;
    let equal = value == Some(&caps[3]);
    Ok(if &caps[2] == "=" { equal } else { !equal })
}

/// Drops fragment lines guarded by markers that do not match the
/// configuration and removes the markers themselves.
///
/// `@amp-if <axis>=<value>` / `@amp-endif` wrap blocks (nesting allowed);
/// a trailing `@amp-when <axis>=<value>` guards a single line. `!=` negates.
pub fn filter_fragment(content: &str, data: &TemplateData, source: &Path) -> Result<String> {
    let markers = markers();
    let mut blocks: Vec<(usize, bool)> = Vec::new();
    let mut output = String::with_capacity(content.len());

    for (index, line) in content.lines().enumerate() {
        let number = index + 1;
        if let Some(caps) = markers.open.captures(line) {
            blocks.push((number, evaluate(&caps, data, source, number)?));
            continue;
        }
        if markers.close.is_match(line) {
            if blocks.pop().is_none() {
                return Err(Error::MalformedFragment {
                    path: source.to_path_buf(),
                    line: number,
                    reason: "'@amp-endif' without a matching '@amp-if'".to_string(),
                });
            }
            continue;
        }
        if !blocks.iter().all(|(_, active)| *active) {
            continue;
        }
        match markers.inline.captures(line) {
            Some(caps) => {
                if evaluate(&caps, data, source, number)? {
                    let start = caps.get(0).map(|m| m.start()).unwrap_or(line.len());
                    output.push_str(&line[..start]);
                    output.push('\n');
                }
            }
            None => {
                output.push_str(line);
                output.push('\n');
            }
        }
    }

    if let Some((line, _)) = blocks.pop() {
        return Err(Error::MalformedFragment {
            path: source.to_path_buf(),
            line,
            reason: "'@amp-if' is never closed".to_string(),
        });
    }
    if !content.ends_with('\n') && output.ends_with('\n') {
        output.pop();
    }
    Ok(output)
}

/// Merges a fragment into its target under `output_root`.
///
/// JSON targets are deep-merged structurally; anything else gets the
/// fragment appended below its existing content. A missing target is created
/// from the fragment alone.
///
/// Structural merge needs plain JSON: a `.json` target carrying comments,
/// such as a commented `tsconfig.json`, fails with
/// [`Error::InvalidManifest`] and is left untouched.
pub fn apply_fragment(fragment: &Fragment, output_root: &Path, data: &TemplateData) -> Result<()> {
    let filtered = filter_fragment(&fragment.content, data, &fragment.source)?;
    let additions = substitute(&filtered, data);
    let target = output_root.join(&fragment.target);

    debug!("Merging '{}' into '{}'", fragment.source.display(), target.display());

    if target.extension().is_some_and(|ext| ext == "json") {
        return manifest::merge_into_file(&target, &additions, &fragment.source);
    }

    let merged = if target.is_file() {
        let existing = fs::read_to_string(&target).map_err(Error::io(&target))?;
        format!("{existing}\n{additions}")
    } else {
        additions.into_owned()
    };
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(Error::io(parent))?;
    }
    fs::write(&target, merged).map_err(Error::io(&target))
}

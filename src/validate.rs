//! Project name validation and target path resolution.

use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use cruet::Inflector;
use regex::Regex;

use crate::constants::MAX_NAME_LENGTH;
use crate::environment::Environment;
use crate::error::{Error, NameRule, Result, Violation};

/// Names npm refuses regardless of their shape.
const BLOCKLIST: [&str; 2] = ["node_modules", "favicon.ico"];

/// Node.js core module names; a package with one of these names would shadow it.
const BUILTIN_MODULES: [&str; 42] = [
    "assert", "async_hooks", "buffer", "child_process", "cluster", "console", "constants",
    "crypto", "dgram", "diagnostics_channel", "dns", "domain", "events", "fs", "http", "http2",
    "https", "inspector", "module", "net", "os", "path", "perf_hooks", "process", "punycode",
    "querystring", "readline", "repl", "stream", "string_decoder", "sys", "timers", "tls",
    "trace_events", "tty", "url", "util", "v8", "vm", "wasi", "worker_threads", "zlib",
];

fn segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9~-][a-z0-9._~-]*$").expect("valid regex"))
}

/// Checks a project name against every rule, returning the first violated one.
pub fn check_project_name(name: &str) -> std::result::Result<(), NameRule> {
    if name.is_empty() {
        return Err(NameRule::Empty);
    }
    if name.trim() != name {
        return Err(NameRule::SurroundingWhitespace);
    }
    if name.starts_with('.') {
        return Err(NameRule::LeadingDot);
    }
    if name.starts_with('_') {
        return Err(NameRule::LeadingUnderscore);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(NameRule::TooLong);
    }
    if name.to_lowercase() != name {
        return Err(NameRule::Uppercase);
    }
    if BLOCKLIST.contains(&name) {
        return Err(NameRule::Blocklisted);
    }
    if BUILTIN_MODULES.contains(&name) {
        return Err(NameRule::ReservedBuiltin);
    }

    if let Some(scoped) = name.strip_prefix('@') {
        let (scope, package) = scoped.split_once('/').ok_or(NameRule::MalformedScope)?;
        if scope.is_empty() || package.is_empty() || package.contains('/') {
            return Err(NameRule::MalformedScope);
        }
        if !segment_pattern().is_match(scope) || !segment_pattern().is_match(package) {
            return Err(NameRule::UnsafeCharacters);
        }
        return Ok(());
    }

    if !segment_pattern().is_match(name) {
        return Err(NameRule::UnsafeCharacters);
    }
    Ok(())
}

/// Validates a project name, reporting the violated rule as a validation error.
pub fn validate_project_name(name: &str) -> Result<()> {
    check_project_name(name).map_err(|rule| Error::Validation {
        field: "project name",
        violation: Violation::Name(rule),
    })
}

/// Proposes a valid alternative for an invalid name, if one can be derived.
pub fn suggest_project_name(name: &str) -> Option<String> {
    let candidate = name.trim().trim_start_matches(['.', '_']).to_kebab_case();
    if candidate != name && check_project_name(&candidate).is_ok() {
        Some(candidate)
    } else {
        None
    }
}

/// Directory name used for a project when no explicit path is given: the
/// package part of a scoped name, the name itself otherwise.
pub fn default_directory_name(name: &str) -> &str {
    match name.strip_prefix('@').and_then(|s| s.split_once('/')) {
        Some((_, package)) => package,
        None => name,
    }
}

/// Resolves an operator-supplied path to an absolute, normalized path.
///
/// A bare `~` or leading `~/` expands to the home directory and relative
/// paths resolve against the captured working directory. Other users' homes
/// (`~user`) are not supported and rejected.
pub fn resolve_path(input: &str, env: &Environment) -> Result<PathBuf> {
    let home_relative = match input.strip_prefix('~') {
        None => None,
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '\\']) => {
            Some(rest.trim_start_matches(['/', '\\']))
        }
        Some(_) => {
            let reason = format!("cannot expand '{input}': only '~' and '~/' are supported");
            return Err(Error::validation("path", reason));
        }
    };
    let expanded = match home_relative {
        Some(rest) => {
            let home = env
                .home
                .as_ref()
                .ok_or_else(|| Error::validation("path", "cannot expand '~': no home directory"))?;
            home.join(rest)
        }
        None => PathBuf::from(input),
    };

    let absolute = if expanded.is_absolute() { expanded } else { env.cwd.join(expanded) };
    Ok(normalize_path(&absolute))
}

/// Resolves `.` and `..` components lexically, without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::ParentDir) | None => normalized.push(".."),
                // `..` at the root stays at the root
                _ => {}
            },
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

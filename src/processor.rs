//! Project materialization.
//! Turns a resolved configuration and a corpus checkout into a project
//! directory: layers are walked in order, skip rules applied, text files
//! substituted, fragments merged and root files written. Each step is a
//! public function so it can be exercised on its own.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::catalog::TemplateKey;
use crate::config::ProjectConfig;
use crate::constants::{COMPOSE_DIRECTORY, COMPOSE_FILE};
use crate::context::TemplateData;
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::inclusion::{apply_fragment, fragment_target, is_rules_file, Fragment, InclusionRules};
use crate::readme::{write_root_files, TemplateRenderer};
use crate::selector::{select_amp_layer, select_layers, Layer};
use crate::substitute::{is_binary, substitute};
use crate::validate::validate_project_name;

/// Outcome of a successful materialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub target: PathBuf,
    pub layers: Vec<TemplateKey>,
    /// Files copied or written from layers, root files included.
    pub files: usize,
    pub fragments: usize,
}

/// Fails unless `target` is missing or an empty directory.
pub fn check_target(target: &Path) -> Result<()> {
    if !target.exists() {
        return Ok(());
    }
    if !target.is_dir() {
        return Err(Error::TargetNotEmpty { path: target.to_path_buf() });
    }
    let mut entries = fs::read_dir(target).map_err(Error::io(target))?;
    if entries.next().is_some() {
        return Err(Error::TargetNotEmpty { path: target.to_path_buf() });
    }
    Ok(())
}

/// Creates the target directory, returning whether it was created by this
/// call. An existing directory is not an error.
pub fn prepare_target(target: &Path) -> Result<bool> {
    if target.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(target).map_err(Error::io(target))?;
    Ok(true)
}

/// Best-effort removal of partial output. A directory this run created is
/// removed; a pre-existing one is emptied and kept.
pub fn cleanup(target: &Path, created: bool) {
    let result = if created {
        fs::remove_dir_all(target)
    } else {
        fs::read_dir(target).and_then(|entries| {
            for entry in entries {
                let path = entry?.path();
                if path.is_dir() && !path.is_symlink() {
                    fs::remove_dir_all(&path)?;
                } else {
                    fs::remove_file(&path)?;
                }
            }
            Ok(())
        })
    };
    if let Err(e) = result {
        warn!("Could not clean up '{}': {}", target.display(), e);
    }
}

/// Layer-relative path with `/` separators, as matched by globs.
fn slash_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Copies one file, substituting placeholders unless the content is binary.
/// An existing destination is replaced and the source permissions kept.
pub fn copy_file(source: &Path, dest: &Path, data: &TemplateData) -> Result<()> {
    let bytes = fs::read(source).map_err(Error::io(source))?;
    let content = if is_binary(source, &bytes) {
        debug!("Copying binary file: {}", dest.display());
        bytes
    } else {
        match String::from_utf8(bytes) {
            Ok(text) => {
                debug!("Writing file: {}", dest.display());
                substitute(&text, data).into_owned().into_bytes()
            }
            Err(e) => e.into_bytes(),
        }
    };

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(Error::io(parent))?;
    }
    if dest.is_file() {
        debug!("Overriding '{}' from an earlier layer", dest.display());
        fs::remove_file(dest).map_err(Error::io(dest))?;
    }
    fs::write(dest, content).map_err(Error::io(dest))?;

    let permissions = fs::metadata(source).map_err(Error::io(source))?.permissions();
    fs::set_permissions(dest, permissions).map_err(Error::io(dest))
}

/// Writes `docker-compose.yml` from the corpus's compose file for the chosen
/// data layer. Skipped when the corpus has none or a layer already wrote one.
pub fn write_compose_file(
    corpus_root: &Path,
    target: &Path,
    data: &TemplateData,
) -> Result<Option<PathBuf>> {
    let source = corpus_root
        .join(COMPOSE_DIRECTORY)
        .join(format!("docker-compose.{}.yml", data.config.data_layer));
    let dest = target.join(COMPOSE_FILE);
    if !source.is_file() || dest.exists() {
        return Ok(None);
    }
    debug!("Writing {} from {}", COMPOSE_FILE, source.display());
    copy_file(&source, &dest, data)?;
    Ok(Some(dest))
}

/// Walks and materializes layers for one configuration.
pub struct Processor<'a> {
    config: &'a ProjectConfig,
    data: TemplateData,
    corpus_root: &'a Path,
    renderer: &'a dyn TemplateRenderer,
    interrupt: Option<&'a AtomicBool>,
}

impl<'a> Processor<'a> {
    pub fn new(
        config: &'a ProjectConfig,
        env: &Environment,
        corpus_root: &'a Path,
        renderer: &'a dyn TemplateRenderer,
    ) -> Self {
        Self { data: TemplateData::new(config, env), config, corpus_root, renderer, interrupt: None }
    }

    /// Aborts with [`Error::Interrupted`] once `flag` is set.
    pub fn with_interrupt(mut self, flag: &'a AtomicBool) -> Self {
        self.interrupt = Some(flag);
        self
    }

    pub fn data(&self) -> &TemplateData {
        &self.data
    }

    fn check_interrupt(&self) -> Result<()> {
        match self.interrupt {
            Some(flag) if flag.load(Ordering::SeqCst) => Err(Error::Interrupted),
            _ => Ok(()),
        }
    }

    /// Runs every step. Nothing is written before validation, target checks,
    /// layer lookup and rules loading have all passed; later failures trigger
    /// [`cleanup`].
    pub fn materialize(&self) -> Result<Summary> {
        let target = self.config.path.as_path();

        validate_project_name(&self.config.name)?;
        self.config.check()?;
        check_target(target)?;

        let mut layers = select_layers(self.config, self.corpus_root)?;
        // the dataset config goes first so an example's own `amp/` files win
        if let Some(amp) = select_amp_layer(self.config, self.corpus_root)? {
            layers.insert(0, amp);
        }
        let rules = layers
            .iter()
            .map(|layer| InclusionRules::for_layer(&layer.root))
            .collect::<Result<Vec<_>>>()?;

        let created = prepare_target(target)?;
        match self.write(&layers, &rules, target) {
            Ok(summary) => Ok(summary),
            Err(err) => {
                warn!("Generation failed, removing partial output in '{}'", target.display());
                cleanup(target, created);
                Err(err)
            }
        }
    }

    fn write(&self, layers: &[Layer], rules: &[InclusionRules], target: &Path) -> Result<Summary> {
        let mut fragments = IndexMap::new();
        let mut files = 0;
        for (layer, rules) in layers.iter().zip(rules) {
            info!("Applying template '{}'", layer.key);
            files += self.process_layer(layer, rules, target, &mut fragments)?;
        }

        for fragment in fragments.values() {
            self.check_interrupt()?;
            apply_fragment(fragment, target, &self.data)?;
        }

        if write_compose_file(self.corpus_root, target, &self.data)?.is_some() {
            files += 1;
        }
        files += write_root_files(target, &self.data, self.renderer)?.len();

        Ok(Summary {
            target: target.to_path_buf(),
            layers: layers.iter().map(|layer| layer.key).collect(),
            files,
            fragments: fragments.len(),
        })
    }

    /// Copies one layer into `target`, collecting its fragments instead of
    /// writing them. Fragments are keyed by output-relative target, so a
    /// later layer's side-car replaces an earlier one at the same path.
    /// Returns the number of files written.
    pub fn process_layer(
        &self,
        layer: &Layer,
        rules: &InclusionRules,
        target: &Path,
        fragments: &mut IndexMap<PathBuf, Fragment>,
    ) -> Result<usize> {
        let mut written = 0;
        let mut walker = WalkDir::new(&layer.root).min_depth(1).sort_by_file_name().into_iter();
        let output = target.join(&layer.output);

        while let Some(entry) = walker.next() {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| layer.root.clone());
                Error::Io { path, source: e.into() }
            })?;
            let path = entry.path();
            let relative = path.strip_prefix(&layer.root).unwrap_or(path);
            let matched = slash_path(relative);

            if layer.skip.is_match(&matched) {
                debug!("Skipping '{}': excluded for template '{}'", matched, layer.key);
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
                continue;
            }
            if entry.file_type().is_dir() || is_rules_file(&matched) {
                continue;
            }
            if rules.should_skip(&matched, &self.data) {
                debug!("Skipping '{}': inclusion rule not met", matched);
                continue;
            }

            if let Some(fragment_to) = fragment_target(relative) {
                let content = fs::read_to_string(path).map_err(Error::io(path))?;
                let fragment_to = layer.output.join(fragment_to);
                debug!("Collected fragment '{}' for '{}'", matched, fragment_to.display());
                // shift so the map stays in layer order
                if fragments.shift_remove(&fragment_to).is_some() {
                    debug!("Replacing earlier fragment for '{}'", fragment_to.display());
                }
                let fragment =
                    Fragment { source: path.to_path_buf(), target: fragment_to.clone(), content };
                fragments.insert(fragment_to, fragment);
                continue;
            }

            self.check_interrupt()?;
            copy_file(path, &output.join(relative), &self.data)?;
            written += 1;
        }

        Ok(written)
    }
}

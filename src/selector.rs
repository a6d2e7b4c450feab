//! Template selection.
//! Maps a resolved configuration onto the ordered list of template layers.
//! Later layers overwrite earlier ones file-for-file, so the list runs from
//! the most general template to the most specific one.

use std::path::{Path, PathBuf};

use globset::GlobSet;
use log::debug;

use crate::catalog::{TemplateDescriptor, TemplateKey};
use crate::config::{DataLayer, Example, Framework, ProjectConfig, ProjectType};
use crate::constants::AMP_DIRECTORY;
use crate::error::{Error, Result};

/// One template directory ready to be applied.
#[derive(Debug)]
pub struct Layer {
    pub key: TemplateKey,
    pub root: PathBuf,
    /// Output-relative directory the layer is copied into; empty for the
    /// project root.
    pub output: PathBuf,
    pub skip: GlobSet,
}

impl Layer {
    fn new(key: TemplateKey, corpus_root: &Path, output: PathBuf) -> Result<Self> {
        let descriptor = key.descriptor();
        Ok(Layer {
            key,
            root: descriptor.source_dir(corpus_root),
            output,
            skip: descriptor.skip_set()?,
        })
    }

    pub fn descriptor(&self) -> &'static TemplateDescriptor {
        self.key.descriptor()
    }
}

/// Returns the template keys to apply, in application order.
pub fn select_templates(config: &ProjectConfig) -> Result<Vec<TemplateKey>> {
    let keys = match config.project_type {
        ProjectType::Frontend => match config.framework {
            // Next.js templates are self-contained
            Some(Framework::Nextjs) => vec![TemplateKey::Nextjs],
            Some(Framework::Vite) => {
                let mut keys = vec![TemplateKey::ViteReactBase];
                keys.push(match config.data_layer {
                    DataLayer::ArrowFlight => TemplateKey::ViteReactArrowFlight,
                    DataLayer::AmpSync => TemplateKey::ViteReactAmpSync,
                });
                keys.push(TemplateKey::for_data_layer(config.data_layer));
                if config.example == Example::Wallet {
                    keys.push(TemplateKey::ExampleWallet);
                }
                keys
            }
            None => {
                return Err(Error::validation("framework", "frontend projects need a framework"))
            }
        },
        ProjectType::Backend => match config.backend {
            Some(backend) => vec![TemplateKey::BackendBase, TemplateKey::for_backend(backend)],
            None => {
                let reason = "backend projects need a backend framework";
                return Err(Error::validation("backend", reason));
            }
        },
    };
    debug!("Selected templates: {:?}", keys);
    Ok(keys)
}

/// Resolves the selected templates against a corpus checkout.
///
/// Fails with [`Error::TemplateNotFound`] before anything is written when any
/// selected directory is missing.
pub fn select_layers(config: &ProjectConfig, corpus_root: &Path) -> Result<Vec<Layer>> {
    select_templates(config)?
        .into_iter()
        .map(|key| {
            let layer = Layer::new(key, corpus_root, PathBuf::new())?;
            if !layer.root.is_dir() {
                return Err(Error::TemplateNotFound {
                    key: key.descriptor().key.to_string(),
                    path: layer.root,
                });
            }
            Ok(layer)
        })
        .collect()
}

/// The Amp dataset config layer, copied into `amp/` when a local Anvil node
/// is part of the setup. Optional: `None` when the corpus does not ship one.
pub fn select_amp_layer(config: &ProjectConfig, corpus_root: &Path) -> Result<Option<Layer>> {
    if !config.local_setup.includes_anvil() {
        return Ok(None);
    }
    let layer = Layer::new(TemplateKey::AmpConfig, corpus_root, PathBuf::from(AMP_DIRECTORY))?;
    if !layer.root.is_dir() {
        debug!("No Amp config in corpus at '{}'", layer.root.display());
        return Ok(None);
    }
    Ok(Some(layer))
}

//! Process environment captured once at startup.
//!
//! Components never read environment variables or the working directory
//! themselves; `main` builds an [`Environment`] and passes it down.

use std::path::PathBuf;

use log::debug;

use crate::constants::TEMPLATES_ENV_VAR;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Working directory relative paths resolve against.
    pub cwd: PathBuf,
    /// Operator's home directory, used for `~` expansion.
    pub home: Option<PathBuf>,
    /// `npm_config_user_agent`, set when launched through a package manager.
    pub user_agent: Option<String>,
    /// Template corpus override.
    pub templates: Option<String>,
}

impl Environment {
    pub fn capture() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(Error::io("."))?;
        let env = Self {
            cwd,
            home: dirs::home_dir(),
            user_agent: std::env::var("npm_config_user_agent").ok(),
            templates: std::env::var(TEMPLATES_ENV_VAR).ok().filter(|s| !s.trim().is_empty()),
        };
        debug!("Captured environment: {:?}", env);
        Ok(env)
    }
}

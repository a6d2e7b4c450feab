//! Post-generation actions.
//! Git initialization and dependency installation are optional conveniences:
//! failures are logged as warnings and never undo the generated project.
//! Both go through injected capabilities so they can be replaced in tests.

use std::path::Path;
use std::process::{Command, Stdio};

use git2::{IndexAddOption, Repository, Signature};
use log::{debug, info, warn};

use crate::config::{PackageManager, ProjectConfig};
use crate::constants::INITIAL_COMMIT_MESSAGE;
use crate::error::{Error, Result};

/// Runs an external program to completion.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<()>;
}

/// Runs programs with inherited stdout/stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<()> {
        debug!("Running '{} {}' in {}", program, args.join(" "), cwd.display());
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Error::ExternalTool { tool: program.to_string(), message: e.to_string() })?;

        if !status.success() {
            return Err(Error::ExternalTool {
                tool: program.to_string(),
                message: format!("exited with {status}"),
            });
        }
        Ok(())
    }
}

/// Creates a repository with an initial commit of the whole tree.
pub trait VersionControl {
    fn init(&self, path: &Path, message: &str) -> Result<()>;
}

/// libgit2-backed version control.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2Vcs;

impl VersionControl for Git2Vcs {
    fn init(&self, path: &Path, message: &str) -> Result<()> {
        let repo = Repository::init(path)?;
        let mut index = repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.write()?;
        let tree = repo.find_tree(index.write_tree()?)?;
        let signature = repo
            .signature()
            .or_else(|_| Signature::now("create-amp", "create-amp@localhost"))?;
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &[])?;
        Ok(())
    }
}

/// What the post-generation step did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostGeneration {
    pub git_initialized: bool,
    pub dependencies_installed: bool,
    /// Failures downgraded to warnings.
    pub warnings: Vec<String>,
}

/// Initializes git and installs dependencies unless skipped. Never fails.
pub fn run_post_generation(
    config: &ProjectConfig,
    package_manager: PackageManager,
    vcs: &dyn VersionControl,
    runner: &dyn CommandRunner,
) -> PostGeneration {
    let mut outcome = PostGeneration::default();

    if config.skip_git {
        debug!("Skipping git initialization");
    } else {
        info!("Initializing git repository");
        match vcs.init(&config.path, INITIAL_COMMIT_MESSAGE) {
            Ok(()) => outcome.git_initialized = true,
            Err(e) => {
                warn!("Git initialization failed: {e}");
                outcome.warnings.push(e.to_string());
            }
        }
    }

    if config.skip_install {
        debug!("Skipping dependency installation");
    } else {
        let (program, args) = package_manager.install_command();
        info!("Installing dependencies with {program}");
        match runner.run(program, args, &config.path) {
            Ok(()) => outcome.dependencies_installed = true,
            Err(e) => {
                warn!("Dependency installation failed: {e}");
                outcome.warnings.push(e.to_string());
            }
        }
    }

    outcome
}

//! Template corpus retrieval.
//! The corpus is either a local directory or a git repository cloned into a
//! temporary directory that lives as long as the returned [`Corpus`].

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::debug;
use tempfile::TempDir;
use url::Url;

use crate::error::{Error, Result};

/// Represents the source location of the template corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Local filesystem path
    FileSystem(PathBuf),
    /// Git repository URL (HTTPS, git or SSH)
    Git(String),
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateSource::FileSystem(path) => write!(f, "local path: '{}'", path.display()),
            TemplateSource::Git(repo) => write!(f, "git repository: '{repo}'"),
        }
    }
}

impl TemplateSource {
    pub fn is_git_url(s: &str) -> bool {
        if s.starts_with("git@") {
            return true;
        }
        Url::parse(s)
            .map(|url| matches!(url.scheme(), "https" | "http" | "git" | "ssh"))
            .unwrap_or(false)
    }

    pub fn from_string(s: &str) -> Self {
        if Self::is_git_url(s) {
            Self::Git(s.to_string())
        } else {
            Self::FileSystem(PathBuf::from(s))
        }
    }
}

/// A corpus checkout ready to be read.
#[derive(Debug)]
pub struct Corpus {
    root: PathBuf,
    _checkout: Option<TempDir>,
}

impl Corpus {
    /// Directory template descriptors resolve against. A checkout holding its
    /// templates under `templates/` is entered automatically.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn corpus_root(checkout: &Path) -> PathBuf {
    let nested = checkout.join("templates");
    if nested.is_dir() {
        nested
    } else {
        checkout.to_path_buf()
    }
}

/// Trait for loading the corpus from different sources.
pub trait TemplateLoader {
    fn load(&self) -> Result<Corpus>;
}

/// Loader for a corpus on the local filesystem.
pub struct LocalLoader<P: AsRef<Path>> {
    path: P,
}

impl<P: AsRef<Path>> LocalLoader<P> {
    pub fn new(path: P) -> Self {
        Self { path }
    }
}

impl<P: AsRef<Path>> TemplateLoader for LocalLoader<P> {
    fn load(&self) -> Result<Corpus> {
        let path = self.path.as_ref();
        if !path.is_dir() {
            return Err(Error::TemplateNotFound {
                key: "corpus".to_string(),
                path: path.to_path_buf(),
            });
        }
        Ok(Corpus { root: corpus_root(path), _checkout: None })
    }
}

/// Loader cloning a single branch of a git repository.
pub struct GitLoader<S: AsRef<str>> {
    repo: S,
    branch: String,
    timeout: Duration,
}

impl<S: AsRef<str>> GitLoader<S> {
    pub fn new<B: Into<String>>(repo: S, branch: B, timeout: Duration) -> Self {
        Self { repo, branch: branch.into(), timeout }
    }
}

impl<S: AsRef<str>> TemplateLoader for GitLoader<S> {
    /// Shallow-clones the repository. The transfer is aborted once the
    /// timeout elapses and reported as a network error.
    fn load(&self) -> Result<Corpus> {
        let repo_url = self.repo.as_ref();
        let checkout = TempDir::new().map_err(Error::io(std::env::temp_dir()))?;
        debug!("Cloning '{}' ({}) into '{}'", repo_url, self.branch, checkout.path().display());

        let started = Instant::now();
        let timeout = self.timeout;

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.transfer_progress(|_| started.elapsed() < timeout);
        callbacks.sideband_progress(|_| started.elapsed() < timeout);

        let mut fetch_opts = git2::FetchOptions::new();
        fetch_opts.remote_callbacks(callbacks);
        fetch_opts.depth(1);

        let mut builder = git2::build::RepoBuilder::new();
        builder.fetch_options(fetch_opts);
        builder.branch(&self.branch);

        match builder.clone(repo_url, checkout.path()) {
            Ok(_) => Ok(Corpus { root: corpus_root(checkout.path()), _checkout: Some(checkout) }),
            Err(_) if started.elapsed() >= timeout => Err(Error::Network(format!(
                "downloading templates from '{repo_url}' timed out after {}s",
                timeout.as_secs()
            ))),
            Err(e) => Err(Error::Network(format!("cloning '{repo_url}' failed: {}", e.message()))),
        }
    }
}

/// Loads the corpus from a local path or git URL.
pub fn load_corpus(source: &str, branch: &str, timeout: Duration) -> Result<Corpus> {
    let source = TemplateSource::from_string(source);
    println!("Using templates from the {source}");

    let loader: Box<dyn TemplateLoader> = match source {
        TemplateSource::Git(repo) => Box::new(GitLoader::new(repo, branch, timeout)),
        TemplateSource::FileSystem(path) => Box::new(LocalLoader::new(path)),
    };
    loader.load()
}

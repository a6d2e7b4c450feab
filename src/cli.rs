//! Command-line interface.
//! Every flag is optional: anything left unset is asked for interactively,
//! or takes its default with `--yes`.

use clap::{error::ErrorKind, CommandFactory, Parser};

use crate::config::{
    BackendFramework, DataLayer, Example, Framework, LocalSetup, Network, NetworkEnv, Orm,
    PackageManager, PartialConfig, ProjectType,
};
use crate::constants::{DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_TEMPLATES_REF};

/// Command-line arguments structure for create-amp.
#[derive(Parser, Debug)]
#[command(author, version, about = "create-amp: scaffold Amp-powered applications", long_about = None)]
pub struct Args {
    /// Project name, also used as the package name
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    #[arg(long, value_enum)]
    pub project_type: Option<ProjectType>,

    /// Frontend framework
    #[arg(long, value_enum)]
    pub framework: Option<Framework>,

    /// Backend framework
    #[arg(long, value_enum)]
    pub backend: Option<BackendFramework>,

    #[arg(long, value_enum)]
    pub data_layer: Option<DataLayer>,

    /// Database layer for amp-sync
    #[arg(long, value_enum)]
    pub orm: Option<Orm>,

    #[arg(long, value_enum)]
    pub example: Option<Example>,

    #[arg(long, value_enum)]
    pub local_setup: Option<LocalSetup>,

    /// Network queried by public dataset setups
    #[arg(long, value_enum)]
    pub network: Option<Network>,

    #[arg(long, value_enum)]
    pub network_env: Option<NetworkEnv>,

    /// Package manager used for installation (detected when omitted)
    #[arg(long, value_enum)]
    pub package_manager: Option<PackageManager>,

    /// Skip dependency installation
    #[arg(long)]
    pub skip_install: bool,

    /// Skip git initialization
    #[arg(long)]
    pub skip_git: bool,

    /// Directory to create the project in (defaults to ./<name>)
    #[arg(long, value_name = "DIR")]
    pub path: Option<String>,

    /// Template corpus: a local directory or git repository URL
    #[arg(long, value_name = "SOURCE")]
    pub templates: Option<String>,

    /// Branch of a git template corpus
    #[arg(long, value_name = "BRANCH", default_value = DEFAULT_TEMPLATES_REF)]
    pub templates_ref: String,

    /// Seconds before a corpus download is abandoned
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_DOWNLOAD_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Answer every unset question with its default instead of prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The configuration fields given on the command line.
    pub fn to_partial(&self) -> PartialConfig {
        PartialConfig {
            name: self.name.clone(),
            path: self.path.clone(),
            project_type: self.project_type,
            framework: self.framework,
            backend: self.backend,
            data_layer: self.data_layer,
            orm: self.orm,
            example: self.example,
            local_setup: self.local_setup,
            network: self.network,
            network_env: self.network_env,
            package_manager: self.package_manager,
            skip_install: self.skip_install,
            skip_git: self.skip_git,
        }
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if the arguments cannot be parsed
/// * With clap's default handling for `--help` and `--version`
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                let _ = Args::command().print_help();
                std::process::exit(1);
            }
        },
    }
}

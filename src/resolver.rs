//! Configuration resolution.
//!
//! Fills every field a [`PartialConfig`] leaves unset by asking the
//! [`Prompter`], in dependency order: project type before framework or
//! backend, data layer before ORM, local setup before network. Fields whose
//! governing axis does not select them are dropped, so the resulting
//! [`ProjectConfig`] is always internally consistent.

use log::{debug, warn};

use crate::catalog::TemplateKey;
use crate::config::{
    BackendFramework, DataLayer, Example, Framework, LocalSetup, Network, NetworkEnv, Orm,
    PartialConfig, ProjectConfig, ProjectType,
};
use crate::environment::Environment;
use crate::error::Result;
use crate::prompt::{Choice, Prompter};
use crate::validate::{
    check_project_name, default_directory_name, resolve_path, suggest_project_name,
    validate_project_name,
};

/// Name offered when the operator has not given one.
pub const DEFAULT_PROJECT_NAME: &str = "my-amp-app";

/// An answer together with how it is presented.
struct Answer<T> {
    value: T,
    label: &'static str,
    hint: &'static str,
}

const fn opt<T>(value: T, label: &'static str, hint: &'static str) -> Answer<T> {
    Answer { value, label, hint }
}

const PROJECT_TYPES: [Answer<ProjectType>; 2] = [
    opt(ProjectType::Frontend, "Frontend", "Web application"),
    opt(ProjectType::Backend, "Backend", "API server"),
];

const FRAMEWORKS: [Answer<Framework>; 2] = [
    opt(Framework::Nextjs, "Next.js", "React framework with SSR"),
    opt(Framework::Vite, "React (Vite)", "Fast development with HMR"),
];

const DATA_LAYERS: [Answer<DataLayer>; 2] = [
    opt(DataLayer::ArrowFlight, "Arrow Flight", "High-performance binary protocol"),
    opt(DataLayer::AmpSync, "Amp Sync", "PostgreSQL synchronization"),
];

const ORMS: [Answer<Orm>; 2] = [
    opt(Orm::Electric, "ElectricSQL", "Real-time sync with offline support"),
    opt(Orm::Drizzle, "Drizzle", "Type-safe SQL query builder"),
];

const EXAMPLES: [Answer<Example>; 2] = [
    opt(Example::Wallet, "ERC20 Wallet App", "Token wallet with transfers"),
    opt(Example::Blank, "Blank Template", "Start from scratch"),
];

const LOCAL_SETUPS: [Answer<LocalSetup>; 3] = [
    opt(LocalSetup::Anvil, "Anvil + Amp", "Local blockchain + Amp server"),
    opt(LocalSetup::Public, "Public Dataset", "Connect to public Amp datasets"),
    opt(LocalSetup::Both, "Both", "Local dev with public fallback"),
];

const NETWORKS: [Answer<Network>; 2] = [
    opt(Network::Arbitrum, "Arbitrum", "Ethereum L2 with low fees"),
    opt(Network::Solana, "Solana", "High-performance blockchain"),
];

const NETWORK_ENVS: [Answer<NetworkEnv>; 2] = [
    opt(NetworkEnv::Testnet, "Testnet", "For testing and development"),
    opt(NetworkEnv::Mainnet, "Mainnet", "Production network"),
];

/// Backend choices carry the template's category as their hint.
fn backend_choices() -> Vec<(BackendFramework, Choice)> {
    BackendFramework::ALL
        .iter()
        .map(|&backend| {
            let descriptor = TemplateKey::for_backend(backend).descriptor();
            (backend, Choice::new(descriptor.name, descriptor.category.to_string()))
        })
        .collect()
}

pub struct Resolver<'a> {
    prompter: &'a dyn Prompter,
    env: &'a Environment,
}

impl<'a> Resolver<'a> {
    pub fn new(prompter: &'a dyn Prompter, env: &'a Environment) -> Self {
        Self { prompter, env }
    }

    fn choose<T: Copy + PartialEq>(
        &self,
        preset: Option<T>,
        prompt: &str,
        options: &[Answer<T>],
        default: T,
    ) -> Result<T> {
        if let Some(value) = preset {
            return Ok(value);
        }
        let choices: Vec<Choice> =
            options.iter().map(|o| Choice::new(o.label, o.hint)).collect();
        let default = options.iter().position(|o| o.value == default).unwrap_or(0);
        let index = self.prompter.select(prompt, &choices, default)?;
        Ok(options[index.min(options.len() - 1)].value)
    }

    fn resolve_name(&self, preset: Option<String>) -> Result<String> {
        if let Some(name) = preset {
            validate_project_name(&name)?;
            return Ok(name);
        }
        let validate = |value: &str| {
            check_project_name(value).map_err(|rule| match suggest_project_name(value) {
                Some(suggestion) => format!("{rule} (try '{suggestion}')"),
                None => rule.to_string(),
            })
        };
        self.prompter.text("What is your project named?", Some(DEFAULT_PROJECT_NAME), &validate)
    }

    fn resolve_backend(&self, preset: Option<BackendFramework>) -> Result<BackendFramework> {
        if let Some(backend) = preset {
            return Ok(backend);
        }
        let (values, choices): (Vec<_>, Vec<_>) = backend_choices().into_iter().unzip();
        let default = values.iter().position(|b| *b == BackendFramework::Express).unwrap_or(0);
        let index = self.prompter.select(
            "Which backend framework would you like to use?",
            &choices,
            default,
        )?;
        Ok(values[index.min(values.len() - 1)])
    }

    /// Produces a complete, checked configuration.
    pub fn resolve(&self, partial: PartialConfig) -> Result<ProjectConfig> {
        let name = self.resolve_name(partial.name)?;
        let path = match partial.path.as_deref() {
            Some(path) => resolve_path(path, self.env)?,
            None => resolve_path(&format!("./{}", default_directory_name(&name)), self.env)?,
        };

        let project_type = self.choose(
            partial.project_type,
            "What kind of project would you like to create?",
            &PROJECT_TYPES,
            ProjectType::Frontend,
        )?;

        let (framework, backend) = match project_type {
            ProjectType::Frontend => {
                drop_scoped("backend", partial.backend, "frontend projects");
                let framework = self.choose(
                    partial.framework,
                    "Which framework would you like to use?",
                    &FRAMEWORKS,
                    Framework::Vite,
                )?;
                (Some(framework), None)
            }
            ProjectType::Backend => {
                drop_scoped("framework", partial.framework, "backend projects");
                (None, Some(self.resolve_backend(partial.backend)?))
            }
        };

        let data_layer = self.choose(
            partial.data_layer,
            "Which data layer would you like to use?",
            &DATA_LAYERS,
            DataLayer::ArrowFlight,
        )?;
        let orm = match data_layer {
            DataLayer::AmpSync => Some(self.choose(
                partial.orm,
                "Which ORM/database layer would you like to use?",
                &ORMS,
                Orm::Electric,
            )?),
            DataLayer::ArrowFlight => {
                drop_scoped("orm", partial.orm, "the arrow-flight data layer");
                None
            }
        };

        let example = self.choose(
            partial.example,
            "Which example would you like to start with?",
            &EXAMPLES,
            Example::Blank,
        )?;

        let local_setup = self.choose(
            partial.local_setup,
            "What local development setup would you like?",
            &LOCAL_SETUPS,
            LocalSetup::Anvil,
        )?;
        let (network, network_env) = if local_setup.includes_public() {
            let network = self.choose(
                partial.network,
                "Which blockchain network would you like to use?",
                &NETWORKS,
                Network::Arbitrum,
            )?;
            let network_env = self.choose(
                partial.network_env,
                "Which network environment?",
                &NETWORK_ENVS,
                NetworkEnv::Testnet,
            )?;
            (Some(network), Some(network_env))
        } else {
            drop_scoped("network", partial.network, "a local-only setup");
            drop_scoped("network-env", partial.network_env, "a local-only setup");
            (None, None)
        };

        let config = ProjectConfig {
            name,
            path,
            project_type,
            framework,
            backend,
            data_layer,
            orm,
            example,
            local_setup,
            network,
            network_env,
            package_manager: partial.package_manager,
            skip_install: partial.skip_install,
            skip_git: partial.skip_git,
        };
        config.check()?;
        debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }
}

fn drop_scoped<T: std::fmt::Display>(field: &str, value: Option<T>, scope: &str) {
    if let Some(value) = value {
        warn!("Ignoring --{field} '{value}': it does not apply to {scope}");
    }
}

//! Project configuration model.
//! Axis enums shared by the CLI, the resolver and the template selector, plus
//! the fully resolved [`ProjectConfig`] every downstream stage consumes.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::{Error, Result};

macro_rules! axis {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
        pub enum $name {
            $(
                #[value(name = $value)]
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

axis!(
    /// Whether the generated project is a web frontend or an API server.
    ProjectType { Frontend => "frontend", Backend => "backend" }
);

axis!(
    /// Frontend framework, only meaningful for frontend projects.
    Framework { Nextjs => "nextjs", Vite => "vite" }
);

axis!(
    /// Backend framework, only meaningful for backend projects.
    BackendFramework {
        Express => "express",
        Fastify => "fastify",
        ApolloGraphql => "apollo-graphql",
        ExpressGateway => "express-gateway",
        FastifyGateway => "fastify-gateway",
        ApolloGraphqlGateway => "apollo-graphql-gateway",
    }
);

axis!(
    /// How the generated app fetches data.
    DataLayer { ArrowFlight => "arrow-flight", AmpSync => "amp-sync" }
);

axis!(
    /// Database layer, only meaningful when the data layer is `amp-sync`.
    Orm { Electric => "electric", Drizzle => "drizzle" }
);

axis!(
    Example { Wallet => "wallet", Blank => "blank" }
);

axis!(
    /// Local development setup.
    LocalSetup { Anvil => "anvil", Public => "public", Both => "both" }
);

axis!(
    Network { Arbitrum => "arbitrum", Solana => "solana" }
);

axis!(
    NetworkEnv { Testnet => "testnet", Mainnet => "mainnet" }
);

axis!(
    PackageManager { Pnpm => "pnpm", Bun => "bun", Yarn => "yarn", Npm => "npm" }
);

impl LocalSetup {
    pub fn includes_anvil(&self) -> bool {
        matches!(self, LocalSetup::Anvil | LocalSetup::Both)
    }

    /// Whether the setup queries a public dataset, which is when a network
    /// and network environment are needed.
    pub fn includes_public(&self) -> bool {
        matches!(self, LocalSetup::Public | LocalSetup::Both)
    }
}

impl PackageManager {
    /// Program and arguments that install dependencies.
    pub fn install_command(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            PackageManager::Pnpm => ("pnpm", &["install"]),
            PackageManager::Yarn => ("yarn", &[]),
            PackageManager::Bun => ("bun", &["install"]),
            PackageManager::Npm => ("npm", &["install"]),
        }
    }

    /// Detects the package manager that launched the process from the
    /// `npm_config_user_agent` string, falling back to npm.
    pub fn detect(user_agent: Option<&str>) -> PackageManager {
        let user_agent = user_agent.unwrap_or_default();
        if user_agent.contains("pnpm") {
            PackageManager::Pnpm
        } else if user_agent.contains("yarn") {
            PackageManager::Yarn
        } else if user_agent.contains("bun") {
            PackageManager::Bun
        } else {
            PackageManager::Npm
        }
    }
}

/// Raw, possibly incomplete configuration as parsed from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct PartialConfig {
    pub name: Option<String>,
    pub path: Option<String>,
    pub project_type: Option<ProjectType>,
    pub framework: Option<Framework>,
    pub backend: Option<BackendFramework>,
    pub data_layer: Option<DataLayer>,
    pub orm: Option<Orm>,
    pub example: Option<Example>,
    pub local_setup: Option<LocalSetup>,
    pub network: Option<Network>,
    pub network_env: Option<NetworkEnv>,
    pub package_manager: Option<PackageManager>,
    pub skip_install: bool,
    pub skip_git: bool,
}

/// The operator's fully resolved choices. Built once by the resolver and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub name: String,
    pub path: PathBuf,
    pub project_type: ProjectType,
    pub framework: Option<Framework>,
    pub backend: Option<BackendFramework>,
    pub data_layer: DataLayer,
    pub orm: Option<Orm>,
    pub example: Example,
    pub local_setup: LocalSetup,
    pub network: Option<Network>,
    pub network_env: Option<NetworkEnv>,
    /// Explicit choice; detected from the environment when unset.
    #[serde(skip)]
    pub package_manager: Option<PackageManager>,
    pub skip_install: bool,
    pub skip_git: bool,
}

impl ProjectConfig {
    /// Checks that axis-scoped fields are present exactly when their
    /// governing axis selects them.
    pub fn check(&self) -> Result<()> {
        match (self.project_type, self.framework, self.backend) {
            (ProjectType::Frontend, None, _) => {
                return Err(Error::validation("framework", "frontend projects need a framework"))
            }
            (ProjectType::Frontend, Some(_), Some(_)) => {
                return Err(Error::validation(
                    "backend",
                    "a backend framework cannot be combined with a frontend project",
                ))
            }
            (ProjectType::Backend, _, None) => {
                return Err(Error::validation("backend", "backend projects need a backend framework"))
            }
            (ProjectType::Backend, Some(_), Some(_)) => {
                return Err(Error::validation(
                    "framework",
                    "a frontend framework cannot be combined with a backend project",
                ))
            }
            _ => {}
        }

        match (self.data_layer, self.orm) {
            (DataLayer::AmpSync, None) => {
                return Err(Error::validation("orm", "amp-sync needs an ORM"))
            }
            (DataLayer::ArrowFlight, Some(orm)) => {
                return Err(Error::validation(
                    "orm",
                    format!("'{orm}' only applies to the amp-sync data layer"),
                ))
            }
            _ => {}
        }

        let public = self.local_setup.includes_public();
        if !public && (self.network.is_some() || self.network_env.is_some()) {
            return Err(Error::validation(
                "network",
                format!("local setup '{}' does not query a public dataset", self.local_setup),
            ));
        }
        if public && (self.network.is_none() || self.network_env.is_none()) {
            return Err(Error::validation(
                "network",
                "public dataset setups need a network and network environment",
            ));
        }

        if !self.path.is_absolute() {
            return Err(Error::validation("path", "project path must be absolute"));
        }

        Ok(())
    }
}

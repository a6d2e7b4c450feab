//! Substitution context.
//! [`TemplateData`] augments the resolved configuration with derived values
//! and answers placeholder and axis lookups during materialization.

use serde::Serialize;

use crate::config::{DataLayer, Example, Network, NetworkEnv, PackageManager, ProjectConfig};
use crate::environment::Environment;

/// Every placeholder key the substitution engine recognizes.
pub const PLACEHOLDER_KEYS: [&str; 14] = [
    "projectName",
    "packageManager",
    "framework",
    "dataLayer",
    "orm",
    "networkDisplayName",
    "rpcUrl",
    "chainId",
    "projectType",
    "backend",
    "example",
    "localSetup",
    "network",
    "networkEnv",
];

/// Configuration axes fragment markers and inclusion rules may test.
pub const AXES: [&str; 10] = [
    "projectType",
    "framework",
    "backend",
    "dataLayer",
    "orm",
    "example",
    "localSetup",
    "network",
    "networkEnv",
    "packageManager",
];

/// Display values for a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    pub display_name: &'static str,
    pub rpc_url: &'static str,
    pub chain_id: &'static str,
}

const LOCAL_ANVIL: NetworkInfo = NetworkInfo {
    display_name: "Anvil (Local)",
    rpc_url: "http://localhost:8545",
    chain_id: "31337",
};

/// Looks up the chain for a (network, environment) pair. Without a public
/// network the local Anvil chain is used.
pub fn network_info(network: Option<Network>, env: Option<NetworkEnv>) -> NetworkInfo {
    match (network, env) {
        (Some(Network::Arbitrum), Some(NetworkEnv::Testnet)) => NetworkInfo {
            display_name: "Arbitrum Sepolia",
            rpc_url: "https://sepolia-rollup.arbitrum.io/rpc",
            chain_id: "421614",
        },
        (Some(Network::Arbitrum), Some(NetworkEnv::Mainnet)) => NetworkInfo {
            display_name: "Arbitrum One",
            rpc_url: "https://arb1.arbitrum.io/rpc",
            chain_id: "42161",
        },
        (Some(Network::Solana), Some(NetworkEnv::Testnet)) => NetworkInfo {
            display_name: "Solana Devnet",
            rpc_url: "https://api.devnet.solana.com",
            chain_id: "devnet",
        },
        (Some(Network::Solana), Some(NetworkEnv::Mainnet)) => NetworkInfo {
            display_name: "Solana Mainnet",
            rpc_url: "https://api.mainnet-beta.solana.com",
            chain_id: "mainnet-beta",
        },
        _ => LOCAL_ANVIL,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateData {
    #[serde(flatten)]
    pub config: ProjectConfig,
    pub package_manager: PackageManager,
    pub include_anvil: bool,
    pub include_public: bool,
    pub is_wallet_example: bool,
    pub use_amp_sync: bool,
    pub use_arrow_flight: bool,
    pub network_display_name: String,
    pub rpc_url: String,
    pub chain_id: String,
}

impl TemplateData {
    pub fn new(config: &ProjectConfig, env: &Environment) -> Self {
        let network = network_info(config.network, config.network_env);
        Self {
            package_manager: config
                .package_manager
                .unwrap_or_else(|| PackageManager::detect(env.user_agent.as_deref())),
            include_anvil: config.local_setup.includes_anvil(),
            include_public: config.local_setup.includes_public(),
            is_wallet_example: config.example == Example::Wallet,
            use_amp_sync: config.data_layer == DataLayer::AmpSync,
            use_arrow_flight: config.data_layer == DataLayer::ArrowFlight,
            network_display_name: network.display_name.to_string(),
            rpc_url: network.rpc_url.to_string(),
            chain_id: network.chain_id.to_string(),
            config: config.clone(),
        }
    }

    /// Current value of a configuration axis. The outer `None` means the
    /// axis is unknown, the inner one that it does not apply.
    pub fn axis(&self, axis: &str) -> Option<Option<&'static str>> {
        let c = &self.config;
        let value = match axis {
            "projectType" => Some(c.project_type.as_str()),
            "framework" => c.framework.map(|v| v.as_str()),
            "backend" => c.backend.map(|v| v.as_str()),
            "dataLayer" => Some(c.data_layer.as_str()),
            "orm" => c.orm.map(|v| v.as_str()),
            "example" => Some(c.example.as_str()),
            "localSetup" => Some(c.local_setup.as_str()),
            "network" => c.network.map(|v| v.as_str()),
            "networkEnv" => c.network_env.map(|v| v.as_str()),
            "packageManager" => Some(self.package_manager.as_str()),
            _ => return None,
        };
        Some(value)
    }

    /// Replacement for a recognized placeholder key. Recognized keys whose
    /// axis does not apply resolve to the empty string; unknown keys yield
    /// `None`.
    pub fn placeholder(&self, key: &str) -> Option<&str> {
        match key {
            "projectName" => Some(self.config.name.as_str()),
            "networkDisplayName" => Some(self.network_display_name.as_str()),
            "rpcUrl" => Some(self.rpc_url.as_str()),
            "chainId" => Some(self.chain_id.as_str()),
            _ if PLACEHOLDER_KEYS.contains(&key) => self.axis(key).map(Option::unwrap_or_default),
            _ => None,
        }
    }
}

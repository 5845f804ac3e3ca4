//! Named networks and chain id resolution.

use anyhow::{anyhow, Result};

use abi_call_types::env_utils::{env_string, env_var};
use abi_call_types::ChainId;

/// Overrides the chain id of whatever network is selected.
pub const CHAIN_ID_ENV: &str = "ABI_CALL_CHAIN_ID";
/// Selects the network by name when none is given explicitly.
pub const NETWORK_ENV: &str = "ABI_CALL_NETWORK";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    pub name: &'static str,
    pub chain_id: ChainId,
}

pub const MAINNET: NetworkConfig = NetworkConfig {
    name: "mainnet",
    chain_id: ChainId::new(9889),
};

pub const TESTNET: NetworkConfig = NetworkConfig {
    name: "testnet",
    chain_id: ChainId::new(0),
};

pub const DEVNET: NetworkConfig = NetworkConfig {
    name: "devnet",
    chain_id: ChainId::new(3),
};

pub const LOCAL: NetworkConfig = NetworkConfig {
    name: "local",
    chain_id: ChainId::new(1337),
};

const KNOWN_NETWORKS: [NetworkConfig; 4] = [MAINNET, TESTNET, DEVNET, LOCAL];

impl NetworkConfig {
    /// Look up a network by name (case-insensitive).
    pub fn named(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        KNOWN_NETWORKS.iter().copied().find(|n| n.name == lower)
    }

    /// Resolve a network by name, applying the `ABI_CALL_CHAIN_ID` override.
    pub fn resolve(name: &str) -> Result<Self> {
        let network = Self::named(name).ok_or_else(|| {
            anyhow!(
                "unknown network '{}' (expected mainnet, testnet, devnet or local)",
                name
            )
        })?;
        Ok(network.with_env_override())
    }

    /// Network named by `ABI_CALL_NETWORK`, defaulting to `local`.
    pub fn from_env() -> Result<Self> {
        match env_string(NETWORK_ENV) {
            Some(name) => Self::resolve(&name),
            None => Ok(LOCAL.with_env_override()),
        }
    }

    /// Network implied by an endpoint URL, if recognizable.
    pub fn from_url(url: &str) -> Option<Self> {
        infer_network_from_url(url).and_then(Self::named)
    }

    fn with_env_override(mut self) -> Self {
        if let Some(chain_id) = env_var::<u64>(CHAIN_ID_ENV) {
            self.chain_id = ChainId::new(chain_id);
        }
        self
    }
}

pub fn infer_network_from_url(url: &str) -> Option<&'static str> {
    let lower = url.to_lowercase();
    if lower.contains("testnet") {
        Some("testnet")
    } else if lower.contains("devnet") {
        Some("devnet")
    } else if lower.contains("mainnet") {
        Some("mainnet")
    } else if lower.contains("localhost") || lower.contains("127.0.0.1") {
        Some("local")
    } else {
        None
    }
}

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the scripts.
//! All types derive Serde traits for deserialization from config files.
//! Signer keys are the exception: they come from the environment only.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Signer keys (environment only).
    #[serde(skip)]
    pub signers: SignerKeys,

    /// Deployed package and shared objects.
    pub contract: ContractConfig,

    /// Fullnode endpoint settings.
    pub network: NetworkConfig,

    /// Gas budget policy.
    pub gas: GasConfig,

    /// Coffee order defaults.
    pub coffee: CoffeeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Base64 private keys of the two actors.
#[derive(Clone, Default)]
pub struct SignerKeys {
    pub admin_key: Option<String>,
    pub customer_key: Option<String>,
}

impl std::fmt::Debug for SignerKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("SignerKeys")
            .field("admin_key", &redact(&self.admin_key))
            .field("customer_key", &redact(&self.customer_key))
            .finish()
    }
}

/// Identifiers of the deployed contract.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Package id, `0x...`.
    pub package_id: String,

    /// Shared `CashRegistry` object id.
    pub cash_registry: String,
}

/// Well-known public networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
    Localnet,
}

impl Network {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mainnet" => Some(Self::Mainnet),
            "testnet" => Some(Self::Testnet),
            "devnet" => Some(Self::Devnet),
            "localnet" => Some(Self::Localnet),
            _ => None,
        }
    }

    /// Public fullnode URL of the network.
    pub fn fullnode_url(self) -> &'static str {
        match self {
            Self::Mainnet => "https://fullnode.mainnet.sui.io:443",
            Self::Testnet => "https://fullnode.testnet.sui.io:443",
            Self::Devnet => "https://fullnode.devnet.sui.io:443",
            Self::Localnet => "http://127.0.0.1:9000",
        }
    }
}

/// Fullnode endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC URL or a network name (`mainnet`, `testnet`, `devnet`, `localnet`).
    pub rpc_url: String,

    /// Failover JSON-RPC URLs, used for read queries only.
    pub failover_urls: Vec<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl NetworkConfig {
    /// The URL to connect to, with network names expanded.
    pub fn resolved_rpc_url(&self) -> String {
        match Network::from_name(&self.rpc_url) {
            Some(network) => network.fullnode_url().to_string(),
            None => self.rpc_url.clone(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "testnet".to_string(),
            failover_urls: Vec::new(),
            rpc_timeout_secs: 30,
        }
    }
}

/// Gas budget policy, amounts in MIST.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasConfig {
    /// Fixed budget; estimated by dry run when unset.
    pub budget: Option<u64>,

    /// Upper bound for the dry-run budget.
    pub max_budget: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            budget: None,
            max_budget: 50_000_000_000, // 50 SUI
        }
    }
}

/// Coffee workflow defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CoffeeConfig {
    /// Amount split off the gas coin to pay for one coffee.
    pub price_mist: u64,

    /// Name written onto new membership cards.
    pub member_name: String,
}

impl Default for CoffeeConfig {
    fn default() -> Self {
        Self {
            price_mist: 1_000_000_000,
            member_name: "Dionisis".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit JSON lines instead of human-readable logs.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "suispresso=info".to_string(),
            json_logs: false,
        }
    }
}

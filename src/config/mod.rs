//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file (--config or SUISPRESSO_CONFIG)
//!     → .env file (dotenvy)
//!     → process environment (keys, package, registry, network)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, read-only for the rest of the run)
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at process start; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Private keys are never read from files
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_dotenv, ConfigError};
pub use schema::{
    AppConfig, CoffeeConfig, ContractConfig, GasConfig, NetworkConfig, ObservabilityConfig,
    SignerKeys,
};

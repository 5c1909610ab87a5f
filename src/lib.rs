//! Client scripts for the suispresso package on Sui.
//!
//! Builds programmable transactions for the coffee shop contract, signs
//! them with keys from the environment and submits them over JSON-RPC.

pub mod blockchain;
pub mod config;
pub mod observability;
pub mod runner;
pub mod suispresso;

pub use blockchain::responses::{ExecutionResponse, ObjectData};
pub use blockchain::types::{BlockchainError, BlockchainResult};
pub use config::schema::AppConfig;
pub use suispresso::Suispresso;

//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private keys, RPC URL)
//!     → wallet.rs (key loading, address derivation, intent signing)
//!     → transaction.rs (ordered commands, inputs, result threading, BCS)
//!     → executor.rs (object resolution, gas selection, sign, submit once)
//!     → client.rs (JSON-RPC with timeouts; reads fail over, execution does not)
//!     → responses.rs (typed execution results)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - A submitted transaction is never retried

pub mod client;
pub mod executor;
pub mod responses;
pub mod transaction;
pub mod type_tag;
pub mod types;
pub mod wallet;

pub use client::{ExecuteOptions, HttpTransport, RpcTransport, SuiClient};
pub use executor::TransactionExecutor;
pub use responses::{ExecutionResponse, ObjectData};
pub use transaction::{Argument, BuilderError, CommandResult, MoveTarget, TransactionBuilder};
pub use types::{BlockchainError, BlockchainResult, ObjectId, SuiAddress};
pub use wallet::Wallet;

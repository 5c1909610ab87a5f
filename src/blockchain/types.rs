//! Chain-specific identifiers and error definitions.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::blockchain::transaction::BuilderError;

/// Blake2b with a 32-byte output, the hash used for addresses and digests.
pub type Blake2b256 = Blake2b<U32>;

/// Length of addresses, object ids and digests.
pub const ADDRESS_LENGTH: usize = 32;

/// Hash `parts` with Blake2b-256.
pub fn blake2b256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Account address on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SuiAddress([u8; ADDRESS_LENGTH]);

impl SuiAddress {
    pub const ZERO: Self = Self([0u8; ADDRESS_LENGTH]);

    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl FromStr for SuiAddress {
    type Err = BlockchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_32(s).map(Self)
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Identifier of a ledger-resident object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectId([u8; ADDRESS_LENGTH]);

impl ObjectId {
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl FromStr for ObjectId {
    type Err = BlockchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_32(s).map(Self)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<SuiAddress> for ObjectId {
    fn from(address: SuiAddress) -> Self {
        Self(address.0)
    }
}

/// Parse a `0x`-prefixed (or bare) hex string into 32 bytes.
///
/// Short forms such as `0x2` are left-padded with zeros.
fn parse_hex_32(s: &str) -> BlockchainResult<[u8; ADDRESS_LENGTH]> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() || digits.len() > ADDRESS_LENGTH * 2 {
        return Err(BlockchainError::InvalidAddress(s.to_string()));
    }
    let padded = format!("{:0>64}", digits);
    let mut out = [0u8; ADDRESS_LENGTH];
    hex::decode_to_slice(&padded, &mut out)
        .map_err(|_| BlockchainError::InvalidAddress(s.to_string()))?;
    Ok(out)
}

/// Base58 digest of an object version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectDigest([u8; 32]);

impl ObjectDigest {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

// Digests go over the wire as length-prefixed byte strings.
impl Serialize for ObjectDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl FromStr for ObjectDigest {
    type Err = BlockchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_base58_32(s).map(Self)
    }
}

impl fmt::Display for ObjectDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

/// Digest identifying a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionDigest([u8; 32]);

impl TransactionDigest {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl FromStr for TransactionDigest {
    type Err = BlockchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_base58_32(s).map(Self)
    }
}

impl fmt::Display for TransactionDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

fn decode_base58_32(s: &str) -> BlockchainResult<[u8; 32]> {
    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|e| BlockchainError::InvalidDigest(format!("{}: {}", s, e)))?;
    bytes
        .try_into()
        .map_err(|_| BlockchainError::InvalidDigest(format!("{}: expected 32 bytes", s)))
}

/// Reference to a specific version of an object.
pub type ObjectRef = (ObjectId, u64, ObjectDigest);

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid private key format or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// A setting the operation needs was left empty.
    #[error("{0} is not set")]
    NotConfigured(&'static str),

    /// Malformed address or object id.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Malformed Base58 digest.
    #[error("Invalid digest: {0}")]
    InvalidDigest(String),

    /// Transaction construction failed.
    #[error("Transaction build failed: {0}")]
    Builder(#[from] BuilderError),

    /// An input object does not exist on the ledger.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Query for an owned object matched nothing.
    #[error("No object of type {struct_type} owned by {owner}")]
    NoMatchingObject { struct_type: String, owner: String },

    /// The signer has no usable gas coins.
    #[error("No gas coins available for {0}")]
    NoGasCoins(String),

    /// Gas coins do not cover the budget.
    #[error("Insufficient gas: budget {budget} MIST, available {available} MIST")]
    InsufficientGas { budget: u64, available: u64 },

    /// The remote endpoint returned something this client cannot interpret.
    #[error("Unexpected response from {method}: {message}")]
    UnexpectedResponse { method: String, message: String },

    /// The ledger accepted the transaction but execution aborted.
    #[error("Transaction {digest} failed: {error}")]
    ExecutionFailed { digest: String, error: String },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

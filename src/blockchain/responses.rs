//! JSON shapes returned by the fullnode RPC.
//!
//! Only the fields this client reads are typed; numbers that the node
//! encodes as strings are accepted in either form.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::blockchain::transaction::ObjectArg;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ObjectId, ObjectRef};

/// Deserialize a `u64` sent either as a JSON number or a decimal string.
pub fn u64_from_str_or_num<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

fn unexpected(method: &str, message: impl Into<String>) -> BlockchainError {
    BlockchainError::UnexpectedResponse {
        method: method.to_string(),
        message: message.into(),
    }
}

/// One page of a cursor-paginated query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<Value>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// Coin object owned by an address.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub coin_type: String,
    pub coin_object_id: String,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub version: u64,
    pub digest: String,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub balance: u64,
}

impl Coin {
    pub fn object_ref(&self) -> BlockchainResult<ObjectRef> {
        Ok((
            self.coin_object_id.parse()?,
            self.version,
            self.digest.parse()?,
        ))
    }
}

/// Ownership of an object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum Owner {
    AddressOwner(String),
    ObjectOwner(String),
    Shared {
        #[serde(deserialize_with = "u64_from_str_or_num")]
        initial_shared_version: u64,
    },
    Immutable,
    ConsensusAddressOwner {
        #[serde(deserialize_with = "u64_from_str_or_num")]
        start_version: u64,
        owner: String,
    },
}

/// Entry of `sui_multiGetObjects` / `suix_getOwnedObjects`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjectResponse {
    #[serde(default)]
    pub data: Option<ObjectData>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    pub object_id: String,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub version: u64,
    pub digest: String,
    #[serde(rename = "type", default)]
    pub object_type: Option<String>,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub content: Option<Value>,
}

impl ObjectData {
    pub fn id(&self) -> BlockchainResult<ObjectId> {
        self.object_id.parse()
    }

    pub fn object_ref(&self) -> BlockchainResult<ObjectRef> {
        Ok((self.id()?, self.version, self.digest.parse()?))
    }

    /// Transaction input for this object. Shared objects are taken mutably.
    pub fn object_arg(&self) -> BlockchainResult<ObjectArg> {
        let owner = self
            .owner
            .as_ref()
            .ok_or_else(|| unexpected("sui_multiGetObjects", "object owner missing"))?;
        let arg = match owner {
            Owner::Shared {
                initial_shared_version,
            } => ObjectArg::SharedObject {
                id: self.id()?,
                initial_shared_version: *initial_shared_version,
                mutable: true,
            },
            Owner::ConsensusAddressOwner { start_version, .. } => ObjectArg::SharedObject {
                id: self.id()?,
                initial_shared_version: *start_version,
                mutable: true,
            },
            Owner::AddressOwner(_) | Owner::ObjectOwner(_) | Owner::Immutable => {
                ObjectArg::ImmOrOwnedObject(self.object_ref()?)
            }
        };
        Ok(arg)
    }
}

/// Execution status reported in effects.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Gas charged for a transaction, in MIST.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GasCostSummary {
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub computation_cost: u64,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub storage_cost: u64,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub storage_rebate: u64,
    #[serde(default, deserialize_with = "u64_from_str_or_num")]
    pub non_refundable_storage_fee: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    #[serde(default)]
    pub gas_used: GasCostSummary,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransactionEffects {
    pub fn is_success(&self) -> bool {
        self.status.status == "success"
    }
}

/// Result of `sui_dryRunTransactionBlock`.
#[derive(Debug, Clone, Deserialize)]
pub struct DryRunResponse {
    pub effects: TransactionEffects,
}

/// One entry of `objectChanges`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectChange {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub object_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `sui_executeTransactionBlock`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
    pub digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<TransactionEffects>,
    #[serde(default)]
    pub object_changes: Vec<ObjectChange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExecutionResponse {
    /// True when effects report success and the node raised no errors.
    ///
    /// A response without effects is only trusted when no errors came back.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.effects.as_ref().map_or(true, |e| e.is_success())
    }

    /// Failure reason, when the transaction did not succeed.
    pub fn failure(&self) -> Option<String> {
        if let Some(effects) = &self.effects {
            if !effects.is_success() {
                return Some(
                    effects
                        .status
                        .error
                        .clone()
                        .unwrap_or_else(|| effects.status.status.clone()),
                );
            }
        }
        if !self.errors.is_empty() {
            return Some(self.errors.join("; "));
        }
        None
    }

    /// Objects created by the transaction, as `(id, type)`.
    pub fn created_objects(&self) -> Vec<(String, Option<String>)> {
        self.object_changes
            .iter()
            .filter(|change| change.kind == "created")
            .filter_map(|change| {
                change
                    .object_id
                    .clone()
                    .map(|id| (id, change.object_type.clone()))
            })
            .collect()
    }
}

//! Fullnode JSON-RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint (primary + failovers)
//! - Query chain state (gas price, coins, objects)
//! - Dry-run and execute signed transactions
//! - Handle timeouts and network errors gracefully
//!
//! # Design Decisions
//! - Transports sit behind a trait so tests can stand in for the node
//! - Reads fail over across endpoints; execution goes to the primary once

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::timeout;

use crate::blockchain::responses::{
    u64_from_str_or_num, Coin, DryRunResponse, ExecutionResponse, ObjectData, ObjectResponse,
    Page,
};
use crate::blockchain::types::{BlockchainError, BlockchainResult, ObjectId, SuiAddress};
use crate::config::schema::NetworkConfig;
use crate::observability::metrics;

/// Coin type of the native gas token.
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

/// Page size requested from paginated queries.
const PAGE_LIMIT: u32 = 50;

/// One JSON-RPC endpoint.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Invoke `method` and return the `result` member.
    async fn call(&self, method: &str, params: Value) -> BlockchainResult<Value>;

    /// Endpoint description for logs.
    fn endpoint(&self) -> &str;
}

/// JSON-RPC 2.0 over HTTP.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> BlockchainResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| BlockchainError::Rpc(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }
}

/// JSON-RPC envelope.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, method: &str, params: Value) -> BlockchainResult<Value> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| BlockchainError::Rpc(format!("{} request failed: {}", method, e)))?;

        let parsed: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| BlockchainError::Rpc(format!("{} returned invalid JSON: {}", method, e)))?;

        if let Some(error) = parsed.error {
            return Err(BlockchainError::Rpc(format!(
                "{} error {}: {}",
                method, error.code, error.message
            )));
        }
        parsed.result.ok_or_else(|| BlockchainError::UnexpectedResponse {
            method: method.to_string(),
            message: "neither result nor error".to_string(),
        })
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// What the node should include in an execution response.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    pub show_effects: bool,
    pub show_object_changes: bool,
}

impl ExecuteOptions {
    pub fn full() -> Self {
        Self {
            show_effects: true,
            show_object_changes: true,
        }
    }
}

/// Fullnode client with failover support.
#[derive(Clone)]
pub struct SuiClient {
    /// Primary endpoint first, then failovers.
    transports: Vec<Arc<dyn RpcTransport>>,
    /// Per-call timeout.
    timeout_duration: Duration,
}

impl SuiClient {
    /// Create a client for the configured network.
    pub fn new(config: &NetworkConfig) -> BlockchainResult<Self> {
        let primary = config.resolved_rpc_url();
        let primary_url: url::Url = primary
            .parse()
            .map_err(|e| BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", primary, e)))?;

        let mut transports: Vec<Arc<dyn RpcTransport>> =
            vec![Arc::new(HttpTransport::new(primary_url.as_str())?)];

        for url_str in &config.failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => transports.push(Arc::new(HttpTransport::new(url.as_str())?)),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        tracing::info!(
            rpc_url = %primary_url,
            failovers = transports.len() - 1,
            "Sui client initialized"
        );

        Ok(Self::with_transports(
            transports,
            Duration::from_secs(config.rpc_timeout_secs),
        ))
    }

    /// Create a client over explicit transports.
    pub fn with_transports(transports: Vec<Arc<dyn RpcTransport>>, timeout: Duration) -> Self {
        Self {
            transports,
            timeout_duration: timeout,
        }
    }

    /// Call `method` on the first endpoint that answers.
    async fn query<T: DeserializeOwned>(&self, method: &str, params: Value) -> BlockchainResult<T> {
        let mut last_error = BlockchainError::Rpc("No RPC endpoints configured".to_string());
        for (i, transport) in self.transports.iter().enumerate() {
            match self.call_one(transport.as_ref(), method, params.clone()).await {
                Ok(value) => return decode(method, value),
                Err(e) => {
                    tracing::warn!(
                        provider_idx = i,
                        endpoint = transport.endpoint(),
                        method,
                        error = %e,
                        "RPC error, trying next provider"
                    );
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    async fn call_one(
        &self,
        transport: &dyn RpcTransport,
        method: &str,
        params: Value,
    ) -> BlockchainResult<Value> {
        let result = match timeout(self.timeout_duration, transport.call(method, params)).await {
            Ok(result) => result,
            Err(_) => Err(BlockchainError::Timeout(self.timeout_duration)),
        };
        if result.is_err() {
            metrics::record_rpc_error(method);
        }
        result
    }

    /// Reference gas price for the current epoch, in MIST.
    pub async fn reference_gas_price(&self) -> BlockchainResult<u64> {
        #[derive(Deserialize)]
        struct Price(#[serde(deserialize_with = "u64_from_str_or_num")] u64);

        let Price(price) = self.query("suix_getReferenceGasPrice", json!([])).await?;
        Ok(price)
    }

    /// Every coin of `coin_type` owned by `owner`.
    pub async fn coins(&self, owner: SuiAddress, coin_type: &str) -> BlockchainResult<Vec<Coin>> {
        let mut coins = Vec::new();
        let mut cursor = Value::Null;
        loop {
            let page: Page<Coin> = self
                .query(
                    "suix_getCoins",
                    json!([owner.to_string(), coin_type, cursor, PAGE_LIMIT]),
                )
                .await?;
            coins.extend(page.data);
            match page.next_cursor {
                Some(next) if page.has_next_page && !next.is_null() => cursor = next,
                _ => break,
            }
        }
        Ok(coins)
    }

    /// Current state of each object, in request order.
    ///
    /// A missing or deleted object is an error.
    pub async fn objects(&self, ids: &[ObjectId]) -> BlockchainResult<Vec<ObjectData>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let id_strings: Vec<String> = ids.iter().map(ToString::to_string).collect();
        let responses: Vec<ObjectResponse> = self
            .query(
                "sui_multiGetObjects",
                json!([id_strings, {"showOwner": true, "showType": true}]),
            )
            .await?;

        if responses.len() != ids.len() {
            return Err(BlockchainError::UnexpectedResponse {
                method: "sui_multiGetObjects".to_string(),
                message: format!("asked for {} objects, got {}", ids.len(), responses.len()),
            });
        }

        responses
            .into_iter()
            .zip(ids)
            .map(|(response, id)| {
                response
                    .data
                    .ok_or_else(|| BlockchainError::ObjectNotFound(id.to_string()))
            })
            .collect()
    }

    /// Objects of exactly `struct_type` owned by `owner`.
    pub async fn owned_objects(
        &self,
        owner: SuiAddress,
        struct_type: &str,
    ) -> BlockchainResult<Vec<ObjectData>> {
        let mut objects = Vec::new();
        let mut cursor = Value::Null;
        loop {
            let query = json!({
                "filter": {"StructType": struct_type},
                "options": {"showContent": true, "showType": true, "showOwner": true},
            });
            let page: Page<ObjectResponse> = self
                .query(
                    "suix_getOwnedObjects",
                    json!([owner.to_string(), query, cursor, PAGE_LIMIT]),
                )
                .await?;
            objects.extend(page.data.into_iter().filter_map(|r| r.data));
            match page.next_cursor {
                Some(next) if page.has_next_page && !next.is_null() => cursor = next,
                _ => break,
            }
        }
        Ok(objects)
    }

    /// Simulate a transaction without committing it.
    pub async fn dry_run(&self, tx_bytes: &str) -> BlockchainResult<DryRunResponse> {
        self.query("sui_dryRunTransactionBlock", json!([tx_bytes]))
            .await
    }

    /// Submit a signed transaction to the primary endpoint and wait for local execution.
    ///
    /// Sent exactly once: a failure here is returned, never retried.
    pub async fn execute(
        &self,
        tx_bytes: &str,
        signature: &str,
        options: ExecuteOptions,
    ) -> BlockchainResult<ExecutionResponse> {
        let method = "sui_executeTransactionBlock";
        let primary = self
            .transports
            .first()
            .ok_or_else(|| BlockchainError::Rpc("No RPC endpoints configured".to_string()))?;
        let params = json!([
            tx_bytes,
            [signature],
            {
                "showEffects": options.show_effects,
                "showObjectChanges": options.show_object_changes,
            },
            "WaitForLocalExecution",
        ]);
        let value = self.call_one(primary.as_ref(), method, params).await?;
        decode(method, value)
    }
}

fn decode<T: DeserializeOwned>(method: &str, value: Value) -> BlockchainResult<T> {
    serde_json::from_value(value).map_err(|e| BlockchainError::UnexpectedResponse {
        method: method.to_string(),
        message: e.to_string(),
    })
}

impl std::fmt::Debug for SuiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let endpoints: Vec<&str> = self.transports.iter().map(|t| t.endpoint()).collect();
        f.debug_struct("SuiClient")
            .field("endpoints", &endpoints)
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}

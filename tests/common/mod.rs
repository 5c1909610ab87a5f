//! Shared utilities for integration testing against a mock fullnode.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use suispresso::blockchain::client::{SuiClient, SUI_COIN_TYPE};
use suispresso::blockchain::executor::TransactionExecutor;
use suispresso::blockchain::types::ObjectId;
use suispresso::config::schema::{AppConfig, CoffeeConfig, GasConfig, NetworkConfig};
use suispresso::Suispresso;

pub const PACKAGE: &str = "0xc0ffee";
pub const CASH_REGISTRY: &str = "0xca5e";

/// What the mock node answers to one request.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Reply {
    Result(Value),
    RpcError(String),
    Status(u16),
}

/// Requests the mock node has seen, as `(method, params)`.
pub type Calls = Arc<Mutex<Vec<(String, Value)>>>;

pub fn calls_to(calls: &Calls, method: &str) -> Vec<Value> {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|(m, _)| m == method)
        .map(|(_, p)| p.clone())
        .collect()
}

/// Start a JSON-RPC node on an ephemeral port that answers with `handler`.
pub async fn start_mock_node<F>(handler: F) -> (SocketAddr, Calls)
where
    F: Fn(&str, &Value) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));

    let seen = calls.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let handler = handler.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let _ = serve(socket, handler.as_ref(), &seen).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
    (addr, calls)
}

async fn serve<F>(mut socket: TcpStream, handler: &F, seen: &Calls) -> std::io::Result<()>
where
    F: Fn(&str, &Value) -> Reply,
{
    let request = read_body(&mut socket).await?;
    let request: Value = serde_json::from_slice(&request).unwrap_or(Value::Null);
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = request["params"].clone();
    seen.lock().unwrap().push((method.clone(), params.clone()));

    let (status, body) = match handler(&method, &params) {
        Reply::Result(result) => (200, json!({"jsonrpc": "2.0", "id": request["id"], "result": result})),
        Reply::RpcError(message) => (
            200,
            json!({"jsonrpc": "2.0", "id": request["id"], "error": {"code": -32000, "message": message}}),
        ),
        Reply::Status(status) => (status, json!({})),
    };
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    };
    let status_text = format!("{} {}", status, reason);
    let body = body.to_string();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await?;
    tokio::time::sleep(Duration::from_millis(10)).await;
    Ok(())
}

/// Read one HTTP request and return its body.
async fn read_body(socket: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(Vec::new());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(buf[header_end..].to_vec())
}

pub fn digest(byte: u8) -> String {
    bs58::encode([byte; 32]).into_string()
}

pub fn coin_page(id: &str, balance: u64) -> Value {
    coins_page(&[(id, balance)])
}

/// One page of SUI coins, in the order given.
pub fn coins_page(coins: &[(&str, u64)]) -> Value {
    let data: Vec<Value> = coins
        .iter()
        .map(|(id, balance)| {
            json!({
                "coinType": SUI_COIN_TYPE,
                "coinObjectId": id,
                "version": "2",
                "digest": digest(2),
                "balance": balance.to_string(),
            })
        })
        .collect();
    json!({
        "data": data,
        "nextCursor": null,
        "hasNextPage": false,
    })
}

/// Answers every read a workflow needs before submission.
pub fn chain_state(method: &str) -> Option<Reply> {
    let reply = match method {
        "suix_getReferenceGasPrice" => Reply::Result(json!("1000")),
        "suix_getCoins" => Reply::Result(coin_page("0xa11ce", 10_000_000_000)),
        "sui_dryRunTransactionBlock" => Reply::Result(json!({"effects": {
            "status": {"status": "success"},
            "gasUsed": {"computationCost": "1000000", "storageCost": "2000000", "storageRebate": "0"}
        }})),
        "sui_multiGetObjects" => Reply::Result(json!([{"data": {
            "objectId": CASH_REGISTRY,
            "version": "12",
            "digest": digest(12),
            "owner": {"Shared": {"initial_shared_version": 3}}
        }}])),
        _ => return None,
    };
    Some(reply)
}

pub fn config(addr: SocketAddr) -> AppConfig {
    let mut config = AppConfig::default();
    config.contract.package_id = PACKAGE.to_string();
    config.contract.cash_registry = CASH_REGISTRY.to_string();
    config.network = NetworkConfig {
        rpc_url: format!("http://{}", addr),
        failover_urls: Vec::new(),
        rpc_timeout_secs: 5,
    };
    config
}

/// Workflow handle wired to the mock node.
pub fn shop(addr: SocketAddr) -> Suispresso {
    Suispresso::from_config(&config(addr)).unwrap()
}

/// Same as [`shop`] with a fixed gas budget, so no dry run happens.
#[allow(dead_code)]
pub fn shop_with_budget(addr: SocketAddr, budget: u64) -> Suispresso {
    let config = config(addr);
    let client = SuiClient::new(&config.network).unwrap();
    Suispresso::new(
        TransactionExecutor::new(
            client,
            GasConfig {
                budget: Some(budget),
                ..GasConfig::default()
            },
        ),
        PACKAGE.parse::<ObjectId>().unwrap(),
        CASH_REGISTRY.parse().ok(),
        CoffeeConfig::default(),
    )
}

#[allow(dead_code)]
pub fn counts(calls: &Calls) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for (method, _) in calls.lock().unwrap().iter() {
        *counts.entry(method.clone()).or_insert(0) += 1;
    }
    counts
}

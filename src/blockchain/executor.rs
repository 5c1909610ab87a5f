//! Turning a built transaction into a signed, submitted one.
//!
//! # Responsibilities
//! - Resolve object inputs added by id against the ledger
//! - Pick gas coins and a gas budget for the signer
//! - Sign once and submit once
//! - Classify the outcome: success, or a single failure
//!
//! # Design Decisions
//! - No retries and no deduplication; every call is a new transaction
//! - A fixed budget from config skips the dry run
//! - Gas is paid with every usable coin, and the dry run simulates that
//!   same payment

use std::collections::{HashMap, HashSet};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::blockchain::client::{ExecuteOptions, SuiClient, SUI_COIN_TYPE};
use crate::blockchain::responses::{Coin, DryRunResponse, ExecutionResponse, GasCostSummary};
use crate::blockchain::transaction::{ObjectArg, ProgrammableTransaction, TransactionBuilder, TransactionData};
use crate::blockchain::types::{BlockchainError, BlockchainResult, ObjectId, ObjectRef, SuiAddress};
use crate::blockchain::wallet::Wallet;
use crate::config::schema::GasConfig;
use crate::observability::metrics;

/// Maximum number of coins in a gas payment.
pub const MAX_GAS_OBJECTS: usize = 256;

/// Gas units added on top of a dry-run estimate, multiplied by the gas price.
const GAS_SAFE_OVERHEAD: u64 = 1_000;

/// Budget derived from a dry run.
pub fn estimate_budget(gas_used: &GasCostSummary, gas_price: u64) -> u64 {
    let net = gas_used
        .computation_cost
        .saturating_add(gas_used.storage_cost)
        .saturating_sub(gas_used.storage_rebate);
    net.max(gas_used.computation_cost)
        .saturating_add(GAS_SAFE_OVERHEAD.saturating_mul(gas_price))
}

/// Coins paying for a transaction, merged into the gas coin on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPayment {
    pub coins: Vec<ObjectRef>,
    pub balance: u64,
}

impl GasPayment {
    /// Fails when the whole payment is below `budget`.
    pub fn cover(&self, budget: u64) -> BlockchainResult<()> {
        if self.balance < budget {
            return Err(BlockchainError::InsufficientGas {
                budget,
                available: self.balance,
            });
        }
        Ok(())
    }
}

/// Pay with every usable coin, up to the gas object limit.
///
/// Commands may draw on the gas coin (`SplitCoins(GasCoin, ..)`), so the
/// payment is not cut down to the budget.
pub fn gas_payment(coins: &[Coin]) -> BlockchainResult<GasPayment> {
    let mut payment = GasPayment {
        coins: Vec::new(),
        balance: 0,
    };
    for coin in coins.iter().take(MAX_GAS_OBJECTS) {
        payment.coins.push(coin.object_ref()?);
        payment.balance = payment.balance.saturating_add(coin.balance);
    }
    Ok(payment)
}

/// Signs and submits transactions for one network.
#[derive(Debug, Clone)]
pub struct TransactionExecutor {
    client: SuiClient,
    gas: GasConfig,
}

impl TransactionExecutor {
    pub fn new(client: SuiClient, gas: GasConfig) -> Self {
        Self { client, gas }
    }

    pub fn client(&self) -> &SuiClient {
        &self.client
    }

    /// Resolve inputs and gas so the transaction is ready to sign.
    pub async fn prepare(
        &self,
        builder: TransactionBuilder,
        sender: SuiAddress,
    ) -> BlockchainResult<TransactionData> {
        let input_ids: HashSet<ObjectId> = builder.object_ids().into_iter().collect();
        let pt = self.resolve_inputs(builder).await?;
        let price = self.client.reference_gas_price().await?;

        let coins: Vec<Coin> = self
            .client
            .coins(sender, SUI_COIN_TYPE)
            .await?
            .into_iter()
            .filter(|coin| {
                coin.coin_object_id
                    .parse::<ObjectId>()
                    .map_or(true, |id| !input_ids.contains(&id))
            })
            .collect();
        if coins.is_empty() {
            return Err(BlockchainError::NoGasCoins(sender.to_string()));
        }

        let payment = gas_payment(&coins)?;
        let budget = match self.gas.budget {
            Some(budget) => budget,
            None => self.estimate(&pt, sender, &payment, price).await?,
        };
        payment.cover(budget)?;

        tracing::debug!(
            sender = %sender,
            gas_price = price,
            gas_budget = budget,
            gas_coins = payment.coins.len(),
            gas_balance = payment.balance,
            "Transaction prepared"
        );
        Ok(TransactionData::new_programmable(
            sender,
            payment.coins,
            pt,
            budget,
            price,
        ))
    }

    /// Sign `builder` with `wallet` and submit it once.
    ///
    /// # Returns
    /// The node's response when effects report success; any failure,
    /// including an on-chain abort, is an error.
    pub async fn execute(
        &self,
        builder: TransactionBuilder,
        wallet: &Wallet,
        options: ExecuteOptions,
    ) -> BlockchainResult<ExecutionResponse> {
        let data = self.prepare(builder, wallet.address()).await?;
        let digest = data.digest()?;
        let signature = wallet.sign_transaction(&data)?;
        let tx_bytes = BASE64.encode(data.to_bytes()?);

        tracing::info!(digest = %digest, sender = %wallet.address(), "Submitting transaction");
        let response = self.client.execute(&tx_bytes, &signature, options).await?;

        if let Some(error) = response.failure() {
            tracing::warn!(digest = %response.digest, error = %error, "Transaction failed");
            return Err(BlockchainError::ExecutionFailed {
                digest: response.digest,
                error,
            });
        }

        tracing::info!(digest = %response.digest, "Transaction executed");
        Ok(response)
    }

    /// Simulate `builder` as `sender`.
    pub async fn dry_run(
        &self,
        builder: TransactionBuilder,
        sender: SuiAddress,
    ) -> BlockchainResult<DryRunResponse> {
        let data = self.prepare(builder, sender).await?;
        let tx_bytes = BASE64.encode(data.to_bytes()?);
        self.client.dry_run(&tx_bytes).await
    }

    async fn resolve_inputs(&self, builder: TransactionBuilder) -> BlockchainResult<ProgrammableTransaction> {
        let unresolved = builder.unresolved_objects();
        let objects = self.client.objects(&unresolved).await?;

        let mut resolved: HashMap<ObjectId, ObjectArg> = HashMap::new();
        for object in &objects {
            resolved.insert(object.id()?, object.object_arg()?);
        }
        Ok(builder.resolve(|id| resolved.get(id).cloned())?)
    }

    async fn estimate(
        &self,
        pt: &ProgrammableTransaction,
        sender: SuiAddress,
        payment: &GasPayment,
        price: u64,
    ) -> BlockchainResult<u64> {
        let dry_budget = self.gas.max_budget.min(payment.balance);
        let data = TransactionData::new_programmable(
            sender,
            payment.coins.clone(),
            pt.clone(),
            dry_budget,
            price,
        );
        let tx_bytes = BASE64.encode(data.to_bytes()?);
        let dry_run = self.client.dry_run(&tx_bytes).await?;

        if !dry_run.effects.is_success() {
            metrics::record_transaction("dry_run", false);
            return Err(BlockchainError::ExecutionFailed {
                digest: data.digest()?.to_string(),
                error: dry_run
                    .effects
                    .status
                    .error
                    .unwrap_or_else(|| dry_run.effects.status.status.clone()),
            });
        }

        let budget = estimate_budget(&dry_run.effects.gas_used, price);
        tracing::debug!(estimated_budget = budget, "Gas budget estimated by dry run");
        Ok(budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::client::tests::MockTransport;
    use crate::blockchain::client::RpcTransport;
    use crate::blockchain::transaction::{Argument, CallArg, MoveTarget};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    fn digest(byte: u8) -> String {
        bs58::encode([byte; 32]).into_string()
    }

    fn coin(id: &str, balance: u64) -> Value {
        json!({
            "coinType": SUI_COIN_TYPE,
            "coinObjectId": id,
            "version": "4",
            "digest": digest(4),
            "balance": balance.to_string(),
        })
    }

    fn mint() -> TransactionBuilder {
        let mut tx = TransactionBuilder::new();
        let target: MoveTarget = "0xc0ffee::suispresso::new_employee_card".parse().unwrap();
        tx.move_call(target, vec![], vec![]).unwrap();
        tx
    }

    fn node() -> MockTransport {
        MockTransport::new("node")
            .respond("suix_getReferenceGasPrice", Ok(json!("1000")))
            .respond(
                "suix_getCoins",
                Ok(json!({"data": [coin("0xa1", 5_000_000_000)], "nextCursor": null, "hasNextPage": false})),
            )
            .respond(
                "sui_dryRunTransactionBlock",
                Ok(json!({"effects": {
                    "status": {"status": "success"},
                    "gasUsed": {"computationCost": "1000000", "storageCost": "2000000", "storageRebate": "500000"}
                }})),
            )
    }

    fn executor(mock: Arc<MockTransport>, budget: Option<u64>) -> TransactionExecutor {
        let client = SuiClient::with_transports(
            vec![mock as Arc<dyn RpcTransport>],
            Duration::from_secs(5),
        );
        TransactionExecutor::new(
            client,
            GasConfig {
                budget,
                ..GasConfig::default()
            },
        )
    }

    #[test]
    fn test_budget_estimate() {
        let used = GasCostSummary {
            computation_cost: 1_000_000,
            storage_cost: 2_000_000,
            storage_rebate: 500_000,
            non_refundable_storage_fee: 0,
        };
        assert_eq!(estimate_budget(&used, 1_000), 2_500_000 + 1_000_000);

        let rebate_heavy = GasCostSummary {
            computation_cost: 1_000,
            storage_cost: 0,
            storage_rebate: 50_000,
            non_refundable_storage_fee: 0,
        };
        assert_eq!(estimate_budget(&rebate_heavy, 1), 2_000);
    }

    #[test]
    fn test_payment_uses_every_coin() {
        let coins: Vec<Coin> = [coin("0x1", 10), coin("0x2", 10), coin("0x3", 10)]
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect();
        let payment = gas_payment(&coins).unwrap();
        assert_eq!(payment.coins.len(), 3);
        assert_eq!(payment.balance, 30);

        assert!(payment.cover(15).is_ok());
        assert!(payment.cover(30).is_ok());
        let err = payment.cover(100).unwrap_err();
        assert!(matches!(err, BlockchainError::InsufficientGas { budget: 100, available: 30 }));
    }

    #[test]
    fn test_payment_is_capped_at_gas_object_limit() {
        let coins: Vec<Coin> = (1..=MAX_GAS_OBJECTS + 4)
            .map(|n| serde_json::from_value(coin(&format!("{:#x}", n), 1)).unwrap())
            .collect();
        let payment = gas_payment(&coins).unwrap();
        assert_eq!(payment.coins.len(), MAX_GAS_OBJECTS);
        assert_eq!(payment.balance, MAX_GAS_OBJECTS as u64);
    }

    #[tokio::test]
    async fn test_split_from_gas_coin_pays_with_all_coins() {
        // The first coin alone covers the budget but not the 1 SUI split.
        let mock = Arc::new(
            MockTransport::new("node")
                .respond("suix_getReferenceGasPrice", Ok(json!("1000")))
                .respond(
                    "suix_getCoins",
                    Ok(json!({
                        "data": [coin("0xa1", 10_000_000), coin("0xa2", 10_000_000_000)],
                        "nextCursor": null,
                        "hasNextPage": false
                    })),
                )
                .respond(
                    "sui_dryRunTransactionBlock",
                    Ok(json!({"effects": {
                        "status": {"status": "success"},
                        "gasUsed": {"computationCost": "1000000", "storageCost": "2000000", "storageRebate": "500000"}
                    }})),
                ),
        );
        let sender = SuiAddress::new([1; 32]);
        let mut tx = TransactionBuilder::new();
        let price = tx.pure(&1_000_000_000u64).unwrap();
        let paid = tx.split_coins(Argument::GasCoin, vec![price]).unwrap();
        let to = tx.pure(&sender).unwrap();
        tx.transfer_objects(vec![paid.nested(0)], to).unwrap();

        let data = executor(mock.clone(), None).prepare(tx, sender).await.unwrap();
        assert_eq!(data.gas_data().payment.len(), 2);
        assert_eq!(data.gas_data().budget, 3_500_000);

        // The dry run simulated the same payment that gets signed.
        let dry = mock.calls_to("sui_dryRunTransactionBlock");
        let simulated: Vec<u8> = BASE64.decode(dry[0][0].as_str().unwrap()).unwrap();
        let TransactionData::V1(mut v1) = data.clone();
        v1.gas_data.budget = 10_010_000_000;
        let expected = TransactionData::V1(v1);
        assert_eq!(simulated, expected.to_bytes().unwrap());
    }

    #[tokio::test]
    async fn test_budget_above_total_balance_is_insufficient() {
        let mock = Arc::new(
            MockTransport::new("node")
                .respond("suix_getReferenceGasPrice", Ok(json!("1000")))
                .respond(
                    "suix_getCoins",
                    Ok(json!({
                        "data": [coin("0xa1", 1_000), coin("0xa2", 2_000)],
                        "nextCursor": null,
                        "hasNextPage": false
                    })),
                ),
        );
        let err = executor(mock, Some(10_000))
            .prepare(mint(), SuiAddress::new([1; 32]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BlockchainError::InsufficientGas {
                budget: 10_000,
                available: 3_000
            }
        ));
    }

    #[tokio::test]
    async fn test_prepare_uses_dry_run_estimate() {
        let mock = Arc::new(node());
        let data = executor(mock.clone(), None)
            .prepare(mint(), SuiAddress::new([1; 32]))
            .await
            .unwrap();
        assert_eq!(data.gas_data().price, 1000);
        assert_eq!(data.gas_data().budget, 3_500_000);
        assert_eq!(data.gas_data().payment.len(), 1);
        assert_eq!(mock.calls_to("sui_dryRunTransactionBlock").len(), 1);
    }

    #[tokio::test]
    async fn test_fixed_budget_skips_dry_run() {
        let mock = Arc::new(node());
        let data = executor(mock.clone(), Some(10_000_000))
            .prepare(mint(), SuiAddress::new([1; 32]))
            .await
            .unwrap();
        assert_eq!(data.gas_data().budget, 10_000_000);
        assert!(mock.calls_to("sui_dryRunTransactionBlock").is_empty());
    }

    #[tokio::test]
    async fn test_input_objects_are_resolved_and_not_used_for_gas() {
        let registry = "0x00000000000000000000000000000000000000000000000000000000000000a1";
        let mock = Arc::new(node().respond(
            "sui_multiGetObjects",
            Ok(json!([{"data": {
                "objectId": registry,
                "version": "8",
                "digest": digest(8),
                "owner": {"Shared": {"initial_shared_version": 2}}
            }}])),
        ));
        let mut tx = TransactionBuilder::new();
        let reg = tx.object(registry.parse().unwrap()).unwrap();
        tx.move_call("0xc::coffee::open".parse().unwrap(), vec![], vec![reg])
            .unwrap();

        // The only coin is also the input, so nothing is left to pay gas.
        let err = executor(mock, Some(1)).prepare(tx, SuiAddress::ZERO).await.unwrap_err();
        assert!(matches!(err, BlockchainError::NoGasCoins(_)));
    }

    #[tokio::test]
    async fn test_shared_input_resolution() {
        let mock = Arc::new(node().respond(
            "sui_multiGetObjects",
            Ok(json!([{"data": {
                "objectId": "0xbeef",
                "version": "8",
                "digest": digest(8),
                "owner": {"Shared": {"initial_shared_version": 2}}
            }}])),
        ));
        let mut tx = TransactionBuilder::new();
        let reg = tx.object("0xbeef".parse().unwrap()).unwrap();
        tx.move_call("0xc::coffee::open".parse().unwrap(), vec![], vec![reg])
            .unwrap();
        let data = executor(mock, Some(1_000)).prepare(tx, SuiAddress::ZERO).await.unwrap();
        let TransactionData::V1(v1) = data;
        let crate::blockchain::transaction::TransactionKind::ProgrammableTransaction(pt) = v1.kind;
        assert!(matches!(
            pt.inputs[0],
            CallArg::Object(ObjectArg::SharedObject {
                initial_shared_version: 2,
                mutable: true,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_execute_success_and_failure() {
        let wallet = Wallet::from_seed([1; 32]);
        let ok = Arc::new(node().respond(
            "sui_executeTransactionBlock",
            Ok(json!({
                "digest": "D1",
                "effects": {"status": {"status": "success"}},
                "objectChanges": [{"type": "created", "objectId": "0x77", "objectType": "0xc::suispresso::EmployeeCard"}]
            })),
        ));
        let response = executor(ok.clone(), Some(10_000))
            .execute(mint(), &wallet, ExecuteOptions::full())
            .await
            .unwrap();
        assert_eq!(response.created_objects().len(), 1);

        let params = &ok.calls_to("sui_executeTransactionBlock")[0];
        assert_eq!(params[3], json!("WaitForLocalExecution"));
        assert_eq!(params[1].as_array().map(Vec::len), Some(1));

        let aborted = Arc::new(node().respond(
            "sui_executeTransactionBlock",
            Ok(json!({
                "digest": "D2",
                "effects": {"status": {"status": "failure", "error": "InsufficientCoinBalance"}}
            })),
        ));
        let err = executor(aborted, Some(10_000))
            .execute(mint(), &wallet, ExecuteOptions::full())
            .await
            .unwrap_err();
        assert!(matches!(err, BlockchainError::ExecutionFailed { ref digest, .. } if digest == "D2"));
    }

    #[tokio::test]
    async fn test_execute_twice_submits_twice() {
        let wallet = Wallet::from_seed([1; 32]);
        let mock = Arc::new(node().respond(
            "sui_executeTransactionBlock",
            Ok(json!({"digest": "D", "effects": {"status": {"status": "success"}}})),
        ));
        let exec = executor(mock.clone(), Some(10_000));
        exec.execute(mint(), &wallet, ExecuteOptions::full()).await.unwrap();
        exec.execute(mint(), &wallet, ExecuteOptions::full()).await.unwrap();
        assert_eq!(mock.calls_to("sui_executeTransactionBlock").len(), 2);
    }

    #[tokio::test]
    async fn test_endpoint_failure_is_single_error() {
        let wallet = Wallet::from_seed([1; 32]);
        let mock = Arc::new(node().respond(
            "sui_executeTransactionBlock",
            Err(BlockchainError::Rpc("503 Service Unavailable".to_string())),
        ));
        let result = executor(mock.clone(), Some(10_000))
            .execute(mint(), &wallet, ExecuteOptions::full())
            .await;
        assert!(matches!(result, Err(BlockchainError::Rpc(_))));
        assert_eq!(mock.calls_to("sui_executeTransactionBlock").len(), 1);
    }
}

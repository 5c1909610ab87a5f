//! Workflows against the deployed suispresso package.
//!
//! # Responsibilities
//! - Describe each workflow as an ordered list of commands
//! - Pick the signer for each workflow (admin mints, customer buys)
//! - Submit through the executor and record the outcome
//!
//! # Design Decisions
//! - Builders are free functions so the command sequence can be
//!   inspected without a network
//! - Every workflow submits exactly one transaction per call
//!
//! # Data Flow
//! ```text
//! AppConfig (package, registry, coffee defaults)
//!     → *_transaction (TransactionBuilder)
//!     → Suispresso::submit (executor: resolve, gas, sign, execute)
//!     → ExecutionResponse
//! ```

pub mod cards;
pub mod coffee;

pub use cards::{
    employee_card_type, mint_employee_card_transaction, mint_membership_card_transaction,
};
pub use coffee::{buy_coffee_transaction, CoffeeOrder, Extra};

use crate::blockchain::client::{ExecuteOptions, SuiClient};
use crate::blockchain::executor::TransactionExecutor;
use crate::blockchain::responses::ExecutionResponse;
use crate::blockchain::transaction::{BuilderResult, MoveTarget, TransactionBuilder};
use crate::blockchain::types::{BlockchainError, BlockchainResult, ObjectId};
use crate::blockchain::wallet::Wallet;
use crate::config::loader::{ENV_ADMIN_KEY, ENV_CUSTOMER_KEY};
use crate::config::schema::{AppConfig, CoffeeConfig};
use crate::observability::metrics;

pub const SUISPRESSO_MODULE: &str = "suispresso";
pub const MEMBERSHIP_MODULE: &str = "membership";
pub const COFFEE_MODULE: &str = "coffee";

pub(crate) fn target(package: ObjectId, module: &str, function: &str) -> BuilderResult<MoveTarget> {
    MoveTarget::new(package, module, function)
}

/// Wallet for the key stored under `var`.
pub fn signer(key: Option<&str>, var: &'static str) -> BlockchainResult<Wallet> {
    match key {
        Some(key) => Wallet::from_base64(key),
        None => Err(BlockchainError::NotConfigured(var)),
    }
}

pub fn admin_wallet(config: &AppConfig) -> BlockchainResult<Wallet> {
    signer(config.signers.admin_key.as_deref(), ENV_ADMIN_KEY)
}

pub fn customer_wallet(config: &AppConfig) -> BlockchainResult<Wallet> {
    signer(config.signers.customer_key.as_deref(), ENV_CUSTOMER_KEY)
}

/// Handle on one deployment of the package.
#[derive(Debug, Clone)]
pub struct Suispresso {
    executor: TransactionExecutor,
    package: ObjectId,
    cash_registry: Option<ObjectId>,
    coffee: CoffeeConfig,
}

impl Suispresso {
    pub fn new(
        executor: TransactionExecutor,
        package: ObjectId,
        cash_registry: Option<ObjectId>,
        coffee: CoffeeConfig,
    ) -> Self {
        Self {
            executor,
            package,
            cash_registry,
            coffee,
        }
    }

    /// Connect to the configured network.
    pub fn from_config(config: &AppConfig) -> BlockchainResult<Self> {
        let client = SuiClient::new(&config.network)?;
        let package = config.contract.package_id.parse()?;
        let cash_registry = match config.contract.cash_registry.as_str() {
            "" => None,
            id => Some(id.parse()?),
        };
        Ok(Self::new(
            TransactionExecutor::new(client, config.gas.clone()),
            package,
            cash_registry,
            config.coffee.clone(),
        ))
    }

    pub fn package(&self) -> ObjectId {
        self.package
    }

    pub fn cash_registry(&self) -> BlockchainResult<ObjectId> {
        self.cash_registry
            .ok_or(BlockchainError::NotConfigured("CASH_REGISTRY"))
    }

    pub fn coffee(&self) -> &CoffeeConfig {
        &self.coffee
    }

    pub fn executor(&self) -> &TransactionExecutor {
        &self.executor
    }

    async fn submit(
        &self,
        workflow: &'static str,
        builder: TransactionBuilder,
        wallet: &Wallet,
    ) -> BlockchainResult<ExecutionResponse> {
        let result = self
            .executor
            .execute(builder, wallet, ExecuteOptions::full())
            .await;
        metrics::record_transaction(workflow, result.is_ok());

        if let Ok(response) = &result {
            tracing::info!(
                workflow,
                digest = %response.digest,
                created = response.created_objects().len(),
                "Workflow completed"
            );
        }
        result
    }
}

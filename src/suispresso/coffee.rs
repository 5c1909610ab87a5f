//! Buying coffee at the shared cash registry.

use std::fmt;

use crate::blockchain::responses::ExecutionResponse;
use crate::blockchain::transaction::{Argument, BuilderResult, TransactionBuilder};
use crate::blockchain::types::{BlockchainResult, ObjectId, SuiAddress};
use crate::blockchain::wallet::Wallet;
use crate::suispresso::{target, Suispresso, COFFEE_MODULE};

/// Modifier applied to a coffee after it is bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extra {
    Milk,
    Sugar,
    Cup,
}

impl Extra {
    /// Entry point in the `coffee` module.
    pub fn function(self) -> &'static str {
        match self {
            Extra::Milk => "add_milk",
            Extra::Sugar => "add_sugar",
            Extra::Cup => "add_cup",
        }
    }
}

impl fmt::Display for Extra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Extra::Milk => "milk",
            Extra::Sugar => "sugar",
            Extra::Cup => "cup",
        };
        f.write_str(name)
    }
}

/// One coffee: what to pay, what to add, who receives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoffeeOrder {
    pub price_mist: u64,
    pub extras: Vec<Extra>,
    pub recipient: SuiAddress,
}

impl CoffeeOrder {
    pub fn new(price_mist: u64, recipient: SuiAddress) -> Self {
        Self {
            price_mist,
            extras: Vec::new(),
            recipient,
        }
    }

    /// Add an extra; extras are applied in the order given.
    pub fn with(mut self, extra: Extra) -> Self {
        self.extras.push(extra);
        self
    }
}

/// Split the price off the gas coin, buy, apply extras, send the coffee to the recipient.
pub fn buy_coffee_transaction(
    package: ObjectId,
    cash_registry: ObjectId,
    order: &CoffeeOrder,
) -> BuilderResult<TransactionBuilder> {
    let mut tx = TransactionBuilder::new();
    let price = tx.pure(&order.price_mist)?;
    let payment = tx.split_coins(Argument::GasCoin, vec![price])?;

    let registry = tx.object(cash_registry)?;
    let coffee = tx.move_call(
        target(package, COFFEE_MODULE, "buy_coffee")?,
        vec![],
        vec![registry, payment.nested(0)],
    )?;

    for extra in &order.extras {
        tx.move_call(
            target(package, COFFEE_MODULE, extra.function())?,
            vec![],
            vec![coffee.into()],
        )?;
    }

    let recipient = tx.pure(&order.recipient)?;
    tx.transfer_objects(vec![coffee.into()], recipient)?;
    Ok(tx)
}

impl Suispresso {
    /// Order at the configured price, delivered to the buyer.
    pub fn order(&self, buyer: SuiAddress, extras: &[Extra]) -> CoffeeOrder {
        extras
            .iter()
            .fold(CoffeeOrder::new(self.coffee().price_mist, buyer), |order, extra| {
                order.with(*extra)
            })
    }

    pub async fn buy_coffee(
        &self,
        customer: &Wallet,
        order: &CoffeeOrder,
    ) -> BlockchainResult<ExecutionResponse> {
        let tx = buy_coffee_transaction(self.package(), self.cash_registry()?, order)?;
        tracing::debug!(
            price_mist = order.price_mist,
            extras = ?order.extras,
            recipient = %order.recipient,
            "Buying coffee"
        );
        self.submit("buy_coffee", tx, customer).await
    }
}

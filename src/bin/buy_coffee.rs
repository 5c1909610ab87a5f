//! Buy a coffee with milk, sugar and a cup as the customer.

use std::process::ExitCode;

use suispresso::runner::{bootstrap, finish};
use suispresso::suispresso::{customer_wallet, Extra, Suispresso};
use suispresso::{AppConfig, BlockchainResult, ExecutionResponse};

async fn run(config: &AppConfig) -> BlockchainResult<ExecutionResponse> {
    let customer = customer_wallet(config)?;
    let shop = Suispresso::from_config(config)?;
    let order = shop.order(customer.address(), &[Extra::Milk, Extra::Sugar, Extra::Cup]);
    println!(
        "Buying coffee for {} MIST as {}...",
        order.price_mist,
        customer.address()
    );
    shop.buy_coffee(&customer, &order).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let Some(config) = bootstrap(None) else {
        return ExitCode::FAILURE;
    };
    finish("buying coffee", run(&config).await)
}

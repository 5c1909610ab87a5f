//! Mint one employee card for the admin.

use std::process::ExitCode;

use suispresso::runner::{bootstrap, finish};
use suispresso::suispresso::{admin_wallet, Suispresso};
use suispresso::{AppConfig, BlockchainResult, ExecutionResponse};

async fn run(config: &AppConfig) -> BlockchainResult<ExecutionResponse> {
    let admin = admin_wallet(config)?;
    let shop = Suispresso::from_config(config)?;
    println!("Minting employee card...");
    shop.mint_employee_card(&admin).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let Some(config) = bootstrap(None) else {
        return ExitCode::FAILURE;
    };
    finish("minting employee card", run(&config).await)
}

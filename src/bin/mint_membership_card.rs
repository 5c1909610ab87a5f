//! Mint an employee card and register it as a membership card in one transaction.

use std::process::ExitCode;

use suispresso::runner::{bootstrap, finish};
use suispresso::suispresso::{admin_wallet, Suispresso};
use suispresso::{AppConfig, BlockchainResult, ExecutionResponse};

async fn run(config: &AppConfig) -> BlockchainResult<ExecutionResponse> {
    let admin = admin_wallet(config)?;
    let shop = Suispresso::from_config(config)?;
    println!(
        "Minting membership card for {} ({})...",
        config.coffee.member_name,
        admin.address()
    );
    shop.mint_membership_card(&admin, None).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let Some(config) = bootstrap(None) else {
        return ExitCode::FAILURE;
    };
    finish("minting membership card", run(&config).await)
}

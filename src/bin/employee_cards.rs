//! List the employee cards owned by the admin.

use std::process::ExitCode;

use suispresso::runner::{bootstrap, finish};
use suispresso::suispresso::{admin_wallet, Suispresso};
use suispresso::{AppConfig, BlockchainResult, ObjectData};

async fn run(config: &AppConfig) -> BlockchainResult<ObjectData> {
    let admin = admin_wallet(config)?;
    let shop = Suispresso::from_config(config)?;
    let card = shop.first_employee_card(admin.address()).await?;
    println!("Objects owned by {}:", admin.address());
    Ok(card)
}

#[tokio::main]
async fn main() -> ExitCode {
    let Some(config) = bootstrap(None) else {
        return ExitCode::FAILURE;
    };
    finish("querying employee cards", run(&config).await)
}

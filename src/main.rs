//! suispresso command line.
//!
//! The same workflows as the standalone scripts, with flags in place of
//! fixed choices.
//!
//! ```text
//! suispresso mint-employee-card
//! suispresso mint-membership-card --name Dionisis
//! suispresso buy-coffee --milk --cup
//! suispresso employee-cards
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::{to_value, Value};

use suispresso::runner::{bootstrap, finish};
use suispresso::suispresso::{admin_wallet, customer_wallet, Extra, Suispresso};
use suispresso::AppConfig;

#[derive(Parser)]
#[command(name = "suispresso")]
#[command(about = "Mint cards and buy coffee on the suispresso package", long_about = None)]
struct Cli {
    /// TOML file with network, gas and coffee settings
    #[arg(short, long, env = "SUISPRESSO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mint an employee card for the admin
    MintEmployeeCard,
    /// Mint an employee card and register it as a membership card
    MintMembershipCard {
        /// Name written on the card
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Buy a coffee as the customer
    BuyCoffee {
        #[arg(long)]
        milk: bool,
        #[arg(long)]
        sugar: bool,
        #[arg(long)]
        cup: bool,
        /// Price in MIST, overriding the configured one
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        price: Option<u64>,
    },
    /// List employee cards owned by the admin
    EmployeeCards,
}

async fn run(command: Commands, config: &AppConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let shop = Suispresso::from_config(config)?;
    let value = match command {
        Commands::MintEmployeeCard => {
            let admin = admin_wallet(config)?;
            to_value(shop.mint_employee_card(&admin).await?)
        }
        Commands::MintMembershipCard { name } => {
            let admin = admin_wallet(config)?;
            to_value(shop.mint_membership_card(&admin, name.as_deref()).await?)
        }
        Commands::BuyCoffee {
            milk,
            sugar,
            cup,
            price,
        } => {
            let customer = customer_wallet(config)?;
            let extras: Vec<Extra> = [(milk, Extra::Milk), (sugar, Extra::Sugar), (cup, Extra::Cup)]
                .into_iter()
                .filter_map(|(wanted, extra)| wanted.then_some(extra))
                .collect();
            let mut order = shop.order(customer.address(), &extras);
            if let Some(price) = price {
                order.price_mist = price;
            }
            to_value(shop.buy_coffee(&customer, &order).await?)
        }
        Commands::EmployeeCards => {
            let admin = admin_wallet(config)?;
            to_value(shop.employee_cards(admin.address()).await?)
        }
    };
    Ok(value?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let Some(config) = bootstrap(cli.config.as_deref()) else {
        return ExitCode::FAILURE;
    };

    tracing::info!("suispresso v{} starting", env!("CARGO_PKG_VERSION"));
    finish("running command", run(cli.command, &config).await)
}

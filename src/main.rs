//! # order-saga
//!
//! Runs the User, Product and Order services, alone or together, and replays workload
//! files against them. Every subcommand reads the same `config.json`.
//!
//! ```bash
//! order-saga all --config config.json
//! order-saga product-service --config config.json
//! order-saga workload --config config.json workload.txt
//! ```

use clap::{Args, Parser, Subcommand};
use order_saga::config::Config;
use order_saga::lifecycle::{setup_tracing, OrderSystem};
use order_saga::workload::WorkloadDriver;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "order-saga", about = "Order placement across the User and Product services", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the User service
    UserService(ConfigArgs),
    /// Run the Product service
    ProductService(ConfigArgs),
    /// Run the Order service against the configured User and Product services
    OrderService(ConfigArgs),
    /// Run all three services in one process
    All(ConfigArgs),
    /// Replay a workload file against running services
    Workload(WorkloadArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Path to config.json
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
}

#[derive(Debug, Args)]
struct WorkloadArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Workload file to replay
    file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();
    let cli = Cli::parse();
    run(cli).await
}

fn load(args: &ConfigArgs) -> Result<Config, String> {
    Config::load(&args.config).map_err(|e| e.to_string())
}

async fn bind(address: &order_saga::config::ServiceAddress) -> Result<TcpListener, String> {
    let addr = address.socket_addr().map_err(|e| e.to_string())?;
    TcpListener::bind(addr)
        .await
        .map_err(|e| format!("cannot bind {addr}: {e}"))
}

async fn run(cli: Cli) -> Result<(), String> {
    let system = match cli.command {
        Commands::UserService(args) => {
            let config = load(&args)?;
            OrderSystem::builder(config.orchestrator.clone())
                .user(bind(&config.user_service).await?)
                .start()
        }
        Commands::ProductService(args) => {
            let config = load(&args)?;
            OrderSystem::builder(config.orchestrator.clone())
                .product(bind(&config.product_service).await?)
                .start()
        }
        Commands::OrderService(args) => {
            let config = load(&args)?;
            OrderSystem::builder(config.orchestrator.clone())
                .order(
                    bind(&config.order_service).await?,
                    config.user_service.base_url(),
                    config.product_service.base_url(),
                )
                .start()
        }
        Commands::All(args) => {
            let config = load(&args)?;
            OrderSystem::bind(&config).await
        }
        Commands::Workload(args) => {
            let config = load(&args.config)?;
            let driver = WorkloadDriver::new(&config).map_err(|e| e.to_string())?;
            let summary = driver.run_file(&args.file).await.map_err(|e| e.to_string())?;
            info!(sent = summary.sent, skipped = summary.skipped, "Workload finished");
            return Ok(());
        }
    }
    .map_err(|e| e.to_string())?;

    info!("Services running, press Ctrl-C to stop");
    system.run_until_ctrl_c().await
}

mod billing;
mod docker;
mod server;
mod service;
mod shared;
mod shutdown;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use crate::billing::{reconcile_startup, BillingClient, CarryoverStore, CycleLedger, UptimeAccountant};
use crate::docker::{DockerClient, DockerConfig};
use crate::server::rest::run_rest_server;
use crate::service::ServiceController;
use crate::shared::config::{AgentConfig, DEFAULT_DATABASE_URL};
use crate::shared::logging::init_logging;
use crate::shared::models::AppState;
use crate::shutdown::{settle, wait_for_stop, StopReason};

#[derive(Parser)]
#[command(name = "gamehost")]
#[command(about = "Gamehost - per-instance game server agent", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile billing, manage the game container and meter uptime (default command)
    Serve,

    /// Print the cycles a previous run failed to report
    Carryover {
        /// Carryover database
        #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
        database_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Carryover { database_url } => print_carryover(&database_url).await,
    }
}

async fn print_carryover(database_url: &str) -> Result<()> {
    let store = CarryoverStore::connect(database_url)
        .await
        .context("failed to open carryover store")?;
    let total = store.total().await?;
    store.close().await;

    println!("{}", total);
    Ok(())
}

async fn serve() -> Result<()> {
    let config = AgentConfig::load()?;
    let _log_guards = init_logging(&config.log_dir, "gamehost")?;

    info!(
        "Starting gamehost agent for instance {} ({:?}), PID: {}",
        config.instance_id,
        config.app_env,
        std::process::id()
    );

    let store = CarryoverStore::connect(&config.database_url)
        .await
        .context("failed to open carryover store")?;
    let billing = BillingClient::new(&config.billing_url, &config.instance_id, config.billing_timeout)?;

    // Never serve on an unreconciled budget.
    let payload = match reconcile_startup(&store, &billing).await {
        Ok(payload) => payload,
        Err(e) => {
            error!("Billing reconciliation failed: {}", e);
            return Err(e).context("startup reconciliation failed");
        }
    };
    info!(
        "Granted {} cycles, plan memory {}MB, owner {}",
        payload.cycles, payload.instance_memory, payload.owner_id
    );

    let (signal_tx, mut signal_rx) = mpsc::unbounded_channel::<()>();
    ctrlc::set_handler(move || {
        let _ = signal_tx.send(());
    })
    .context("failed to install signal handler")?;

    let ledger = Arc::new(CycleLedger::new(payload.cycles));

    let runtime = DockerClient::connect(DockerConfig {
        socket_path: config.docker_socket.clone(),
    })
    .await
    .context("failed to connect to docker")?;
    let controller = ServiceController::init(Arc::new(runtime), payload.catalog(), payload.plan())
        .await
        .context("failed to initialize service controller")?;

    let state = Arc::new(AppState {
        controller: Arc::new(controller),
        ledger: ledger.clone(),
        owner_id: payload.owner_id,
    });

    let mut accountant = tokio::spawn(UptimeAccountant::new(ledger.clone(), config.cycle_interval).run());

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn({
        let config = config.clone();
        async move {
            run_rest_server(state, &config, async {
                let _ = stop_rx.await;
            })
            .await
        }
    });

    let reason = wait_for_stop(&mut signal_rx, &mut accountant, &mut server).await;
    let _ = stop_tx.send(());

    let result = settle(
        &reason,
        &ledger,
        &store,
        &billing,
        config.shutdown_grace,
        config.shutdown_grace * 2,
    )
    .await;

    accountant.abort();
    let server_done = matches!(reason, StopReason::ServerExited(_));
    if !server_done && tokio::time::timeout(config.shutdown_grace, &mut server).await.is_err() {
        warn!("REST API did not drain in time");
        server.abort();
    }
    store.close().await;

    result.map(|_| info!("Shutdown complete"))
}

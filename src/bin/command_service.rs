//! Command service binary.
//!
//! Wires the process together: configuration, logging, the PostgreSQL
//! record store, both pgmq queues, the lifecycle engine, the inbound queue
//! poller, and the HTTP front door.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use command_core::lifecycle::{CommandPoller, LifecycleEngine, PollerConfig};
use command_core::messaging::{PgmqQueueClient, QueueClient};
use command_core::models::{CommandStore, PgCommandStore};
use command_core::web::{self, state::AppState};
use command_core::CommandCoreConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    command_core::logging::init_structured_logging();

    let config = CommandCoreConfig::from_env().context("Failed to load configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    let pg_store = PgCommandStore::new(pool, config.commands_table.clone());
    pg_store
        .ensure_schema()
        .await
        .context("Failed to prepare commands table")?;

    let queue_client = PgmqQueueClient::new(&config.database_url)
        .await
        .context("Failed to connect to pgmq")?;
    queue_client
        .create_queue(&config.inbound_queue)
        .await
        .context("Failed to create inbound queue")?;
    queue_client
        .create_queue(&config.orchestrator_queue)
        .await
        .context("Failed to create orchestrator queue")?;

    let store: Arc<dyn CommandStore> = Arc::new(pg_store);
    let queue: Arc<dyn QueueClient> = Arc::new(queue_client);

    let engine = Arc::new(LifecycleEngine::new(
        store,
        queue.clone(),
        config.orchestrator_queue.clone(),
    ));

    let poller = CommandPoller::new(
        engine.clone(),
        queue,
        config.inbound_queue.clone(),
        PollerConfig::default(),
    );
    let poller_handle = tokio::spawn(async move { poller.start().await });

    let result = web::serve(&config.bind_address, AppState::new(engine)).await;

    // The HTTP server exited (shutdown signal or bind failure); stop polling.
    poller_handle.abort();

    result.context("HTTP front door failed")
}

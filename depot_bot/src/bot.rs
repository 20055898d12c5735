use std::{future::Future, pin::Pin, sync::Arc};

use depot_engine::{
    events::{DepositCreditedEvent, DepositFailedEvent, EventHandlers, EventHooks},
    DepositDispatcher,
    DepositSwitch,
    DepositWatcher,
    LedgerApi,
    SqliteDatabase,
};
use earthmc_tools::EarthMcApi;
use log::*;
use tokio::sync::Mutex;

use crate::{
    config::BotConfig,
    deposit_worker::start_deposit_worker,
    discord::DiscordNotifier,
    errors::BotError,
    integrations::earthmc::EarthMcWorld,
};

pub const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_bot(config: BotConfig) -> Result<(), BotError> {
    config.validate()?;
    let mut db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| BotError::InitializeError(e.to_string()))?;
    db.run_migrations().await?;

    let world = EarthMcWorld::new(EarthMcApi::new(config.earthmc.clone())?);
    let geofence = world.geofence_for_town(&config.town).await.map_err(|e| {
        BotError::InitializeError(format!("Could not fetch the chunks of {}. {e}", config.town))
    })?;
    let notifier = DiscordNotifier::new(&config.discord)?;

    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, audit_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let switch = DepositSwitch::new(config.auto_deposits);
    let dispatcher = DepositDispatcher::new(LedgerApi::new(db.clone()), notifier, producers);
    let watcher = DepositWatcher::new(world, geofence, config.watcher_config(), dispatcher, switch);
    let worker = start_deposit_worker(Arc::new(Mutex::new(watcher)));
    info!("🚀️ Watching {} for deposits to {}", config.town, config.shop_owner);

    tokio::signal::ctrl_c().await?;
    info!("🚀️ Shutting down");
    worker.abort();
    db.close().await?;
    Ok(())
}

/// Hooks that write every deposit outcome to the application log as a JSON record.
pub fn audit_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_deposit_credited(audit_credit).on_deposit_failed(audit_failure);
    hooks
}

fn audit_credit(ev: DepositCreditedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async move {
        match serde_json::to_string(&ev) {
            Ok(record) => info!(target: "depot::audit", "{record}"),
            Err(e) => error!("📬️ Could not serialize {ev:?}. {e}"),
        }
    })
}

fn audit_failure(ev: DepositFailedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async move {
        match serde_json::to_string(&ev) {
            Ok(record) => warn!(target: "depot::audit", "{record}"),
            Err(e) => error!("📬️ Could not serialize {ev:?}. {e}"),
        }
    })
}

use std::sync::Arc;

use depot_engine::{DepositWatcher, SqliteDatabase};
use log::*;
use tokio::{sync::Mutex, task::JoinHandle};

use crate::{discord::DiscordNotifier, integrations::earthmc::EarthMcWorld};

pub type BotWatcher = DepositWatcher<EarthMcWorld, SqliteDatabase, DiscordNotifier>;

/// Starts the deposit worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// The worker holds the watcher's lock for as long as it runs. Starting a second worker on the same watcher queues it
/// behind the first.
pub fn start_deposit_worker(watcher: Arc<Mutex<BotWatcher>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("🔎️ Deposit worker started");
        DepositWatcher::run_exclusive(watcher).await;
        warn!("🔎️ Deposit worker stopped");
    })
}

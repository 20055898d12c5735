//! Stateless pub-sub for deposit events.
//!
//! Components publish events through an [`EventProducer`]; a single [`EventHandler`] per event type drains the
//! channel and runs the registered async hook for each event on its own task. Hooks only ever see the event, never
//! the reconciler's state.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{
    sync::mpsc,
    task::{JoinError, JoinSet},
};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Runs the hook for every event until all producers have been dropped, then waits for the hooks still in flight.
    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        drop(self.sender);
        let mut hooks = JoinSet::new();
        loop {
            tokio::select! {
                event = self.listener.recv() => match event {
                    Some(ev) => {
                        trace!("📬️ Handling event");
                        hooks.spawn((self.handler)(ev));
                    },
                    None => break,
                },
                Some(done) = hooks.join_next(), if !hooks.is_empty() => hook_finished(done),
            }
        }
        if !hooks.is_empty() {
            debug!("📬️ Waiting for {} hook(s) to complete", hooks.len());
        }
        while let Some(done) = hooks.join_next().await {
            hook_finished(done);
        }
        debug!("📬️ Event handler has shut down");
    }
}

fn hook_finished(result: Result<(), JoinError>) {
    match result {
        Ok(()) => trace!("📬️ Event handled"),
        Err(e) => warn!("📬️ An event hook did not complete: {e}"),
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to send event: {e}");
        }
    }
}

use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{DepositCreditedEvent, DepositFailedEvent, EventHandler, EventProducer, Handler};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub deposit_credited_producer: Vec<EventProducer<DepositCreditedEvent>>,
    pub deposit_failed_producer: Vec<EventProducer<DepositFailedEvent>>,
}

impl EventProducers {
    pub async fn publish_credited(&self, event: DepositCreditedEvent) {
        for producer in &self.deposit_credited_producer {
            producer.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_failed(&self, event: DepositFailedEvent) {
        for producer in &self.deposit_failed_producer {
            producer.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_deposit_credited: Option<EventHandler<DepositCreditedEvent>>,
    pub on_deposit_failed: Option<EventHandler<DepositFailedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_deposit_credited = hooks.on_deposit_credited.map(|f| EventHandler::new(buffer_size, f));
        let on_deposit_failed = hooks.on_deposit_failed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_deposit_credited, on_deposit_failed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_deposit_credited {
            result.deposit_credited_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_deposit_failed {
            result.deposit_failed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_deposit_credited {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_deposit_failed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_deposit_credited: Option<Handler<DepositCreditedEvent>>,
    pub on_deposit_failed: Option<Handler<DepositFailedEvent>>,
}

impl EventHooks {
    pub fn on_deposit_credited<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(DepositCreditedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_deposit_credited = Some(Arc::new(f));
        self
    }

    pub fn on_deposit_failed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(DepositFailedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_deposit_failed = Some(Arc::new(f));
        self
    }
}

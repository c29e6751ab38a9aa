//! Wiring: store + queue + notifier + service, assembled once.

use std::sync::Arc;

use turnhall_jobs::{QueueConfig, TokioJobQueue};
use turnhall_session::{register_expiry_handlers, GameService, LogNotifier, Notifier, ServiceConfig};
use turnhall_store::{GameStore, MemoryStore};

/// Builder for a [`Turnhall`] instance.
///
/// Defaults: in-memory store, logging notifier, queue with ten workers
/// per job name.
pub struct TurnhallBuilder {
    service_config: ServiceConfig,
    queue_config: QueueConfig,
    store: Option<Arc<dyn GameStore>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl TurnhallBuilder {
    pub fn new() -> Self {
        Self {
            service_config: ServiceConfig::default(),
            queue_config: QueueConfig::default(),
            store: None,
            notifier: None,
        }
    }

    /// Overrides the session-layer configuration (limits, grace periods).
    pub fn service_config(mut self, config: ServiceConfig) -> Self {
        self.service_config = config;
        self
    }

    /// Overrides the job-queue configuration (workers, retries).
    pub fn queue_config(mut self, config: QueueConfig) -> Self {
        self.queue_config = config;
        self
    }

    /// Uses a custom store instead of the in-memory one.
    pub fn store(mut self, store: Arc<dyn GameStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Uses a custom notifier instead of the logging one.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Assembles the service and registers the expiry job handlers.
    pub fn build(self) -> Turnhall {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(LogNotifier));
        let queue = Arc::new(TokioJobQueue::new(self.queue_config));
        let service = Arc::new(GameService::new(
            store.clone(),
            queue.clone(),
            notifier.clone(),
            self.service_config,
        ));
        register_expiry_handlers(&queue, &service);
        tracing::info!("turnhall assembled");

        Turnhall { service, queue, store, notifier }
    }
}

impl Default for TurnhallBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully wired Turnhall instance: the game service plus the
/// collaborators it was built around.
pub struct Turnhall {
    service: Arc<GameService>,
    queue: Arc<TokioJobQueue>,
    store: Arc<dyn GameStore>,
    notifier: Arc<dyn Notifier>,
}

impl Turnhall {
    /// Creates a new builder.
    pub fn builder() -> TurnhallBuilder {
        TurnhallBuilder::new()
    }

    /// The session lifecycle service.
    pub fn service(&self) -> &Arc<GameService> {
        &self.service
    }

    /// The delayed job queue backing the timeout scheduler.
    pub fn queue(&self) -> &Arc<TokioJobQueue> {
        &self.queue
    }

    /// The store everything is persisted in.
    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    /// The outbound notification transport.
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }
}

//! Node services
//!
//! [`BreezServices`] is the handle returned by a successful connect. It owns
//! the node backend, the storage, the event dispatcher, and a background task
//! that syncs the node state every `sync_interval_sec` seconds until
//! [`BreezServices::disconnect`] is called.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use adapters::{Greenlight, NodeApi};
use http::HttpTransportFactory;
use tokio::sync::oneshot;
use transport::TransportFactory;
use types::{
    BreezEvent, CheckMessageRequest, CheckMessageResponse, Config, ConnectRequest, NodeState,
    SignMessageRequest, SignMessageResponse,
};

use crate::error::{SdkError, SdkResult};
use crate::events::{EventDispatcher, EventListener};
use crate::persist::SdkStorage;

/// Shortest seed accepted by [`BreezServices::connect`].
pub const MIN_SEED_LEN: usize = 32;

/// Connected node services.
pub struct BreezServices {
    node_api: Arc<dyn NodeApi>,
    storage: Arc<SdkStorage>,
    dispatcher: EventDispatcher,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    sync_lock: tokio::sync::Mutex<()>,
}

impl BreezServices {
    /// Connects to the node owned by `req.seed` and starts syncing it.
    ///
    /// On error nothing keeps running and no handle is returned.
    pub async fn connect(
        req: ConnectRequest,
        listener: Box<dyn EventListener>,
    ) -> SdkResult<Arc<BreezServices>> {
        BreezServicesBuilder::new(req.config).build(req.seed, listener).await
    }

    /// Node id of the connected node.
    pub fn node_id(&self) -> String { self.node_api.node_id() }

    /// The last synced node state.
    pub fn node_info(&self) -> SdkResult<NodeState> {
        self.storage
            .get_node_state()?
            .ok_or_else(|| SdkError::NotReady("node state has not been synced yet".to_string()))
    }

    /// Pulls the node state, persists it, and raises the matching events.
    pub async fn sync(&self) -> SdkResult<()> {
        self.ensure_connected()?;
        let _guard = self.sync_lock.lock().await;

        let previous = self.storage.get_node_state()?;
        let state = self.node_api.pull_changed().await?;
        self.storage.set_node_state(&state)?;

        if previous.as_ref().map_or(true, |p| state.block_height > p.block_height) {
            self.dispatcher.raise(BreezEvent::NewBlock { block: state.block_height });
        }
        if previous.as_ref() != Some(&state) {
            self.dispatcher.raise(BreezEvent::NodeStateChanged { node_state: state.clone() });
        }
        self.dispatcher.raise(BreezEvent::Synced);

        tracing::debug!("synced node {} at height {}", state.id, state.block_height);
        Ok(())
    }

    /// Signs `req.message` with the node key.
    pub async fn sign_message(&self, req: SignMessageRequest) -> SdkResult<SignMessageResponse> {
        let signature = self.node_api.sign_message(&req.message).await?;
        Ok(SignMessageResponse { signature })
    }

    /// Checks that `req.signature` over `req.message` was made by `req.pubkey`.
    pub async fn check_message(&self, req: CheckMessageRequest) -> SdkResult<CheckMessageResponse> {
        let is_valid =
            self.node_api.check_message(&req.message, &req.pubkey, &req.signature).await?;
        Ok(CheckMessageResponse { is_valid })
    }

    /// Runs a read-only node command, such as `listfunds`, and returns its JSON output.
    pub async fn execute_dev_command(&self, command: String) -> SdkResult<String> {
        self.ensure_connected()?;
        Ok(self.node_api.execute_command(&command).await?)
    }

    /// Stops background syncing. A second call fails with [`SdkError::NotConnected`].
    pub fn disconnect(&self) -> SdkResult<()> {
        let sender = self
            .shutdown
            .lock()
            .map_err(|_| SdkError::Generic("shutdown lock poisoned".to_string()))?
            .take()
            .ok_or(SdkError::NotConnected)?;
        // The receiver is gone only if the sync task already ended.
        let _ = sender.send(());
        tracing::info!("disconnected from node {}", self.node_id());
        Ok(())
    }

    fn ensure_connected(&self) -> SdkResult<()> {
        let shutdown =
            self.shutdown.lock().map_err(|_| SdkError::Generic("shutdown lock poisoned".to_string()))?;
        match *shutdown {
            Some(_) => Ok(()),
            None => Err(SdkError::NotConnected),
        }
    }

    fn start_background_sync(self: &Arc<Self>, interval: Duration, mut stop: oneshot::Receiver<()>) {
        let services = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // first tick completes immediately and the initial sync already ran
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = &mut stop => break,
                    _ = ticker.tick() => {
                        let Some(services) = services.upgrade() else { break };
                        if let Err(e) = services.sync().await {
                            tracing::warn!("background sync failed: {}", e);
                        }
                    }
                }
            }
            tracing::debug!("background sync stopped");
        });
    }
}

/// Assembles [`BreezServices`], with optional injected collaborators.
pub struct BreezServicesBuilder {
    config: Config,
    node_api: Option<Arc<dyn NodeApi>>,
    storage: Option<Arc<SdkStorage>>,
    transport_factory: Option<Arc<dyn TransportFactory>>,
}

impl BreezServicesBuilder {
    /// Builder for services using `config`.
    pub fn new(config: Config) -> Self {
        Self { config, node_api: None, storage: None, transport_factory: None }
    }

    /// Uses `node_api` instead of connecting the Greenlight backend.
    pub fn node_api(&mut self, node_api: Arc<dyn NodeApi>) -> &mut Self {
        self.node_api = Some(node_api);
        self
    }

    /// Uses `storage` instead of opening the one in the working directory.
    pub fn storage(&mut self, storage: Arc<SdkStorage>) -> &mut Self {
        self.storage = Some(storage);
        self
    }

    /// Opens scheduler and node transports through `factory` instead of HTTP.
    pub fn transport_factory(&mut self, factory: Arc<dyn TransportFactory>) -> &mut Self {
        self.transport_factory = Some(factory);
        self
    }

    /// Connects, starts the node, runs the first sync and starts background syncing.
    pub async fn build(
        &self,
        seed: Vec<u8>,
        listener: Box<dyn EventListener>,
    ) -> SdkResult<Arc<BreezServices>> {
        if seed.len() < MIN_SEED_LEN {
            return Err(SdkError::InvalidSeed(format!(
                "seed must be at least {} bytes, got {}",
                MIN_SEED_LEN,
                seed.len()
            )));
        }

        let storage = match &self.storage {
            Some(storage) => storage.clone(),
            None => {
                std::fs::create_dir_all(&self.config.working_dir)?;
                Arc::new(SdkStorage::open(&self.config.working_dir)?)
            }
        };

        let node_api: Arc<dyn NodeApi> = match &self.node_api {
            Some(node_api) => node_api.clone(),
            None => {
                let factory: Arc<dyn TransportFactory> = match &self.transport_factory {
                    Some(factory) => factory.clone(),
                    None => Arc::new(HttpTransportFactory),
                };
                let greenlight =
                    Greenlight::connect(self.config.clone(), &seed, storage.clone(), factory).await?;
                Arc::new(greenlight)
            }
        };

        tracing::info!("starting node {}", node_api.node_id());
        node_api.start().await?;

        let (stop_tx, stop_rx) = oneshot::channel();
        let services = Arc::new(BreezServices {
            node_api,
            storage,
            dispatcher: EventDispatcher::new(listener)?,
            shutdown: Mutex::new(Some(stop_tx)),
            sync_lock: tokio::sync::Mutex::new(()),
        });

        services.sync().await?;
        let interval = Duration::from_secs(self.config.sync_interval_sec.max(1));
        services.start_background_sync(interval, stop_rx);

        tracing::info!("connected to node {}", services.node_id());
        Ok(services)
    }
}

//! The connect flow: log stream, seed, config, connect, node info.
//!
//! The SDK is reached through [`Sdk`] so the flow can run against a fake.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sdk::binding::{self, BlockingBreezServices};
use sdk::{EventListener, LogStream, SdkResult};
use types::{Config, ConnectRequest, EnvironmentType, LevelFilter, NodeConfig, NodeState};

/// Calls of the blocking SDK surface used by the CLI.
pub trait Sdk {
    /// Handle returned by a successful connect
    type Services: Services;

    /// See [`binding::set_log_stream`].
    fn set_log_stream(&self, listener: Box<dyn LogStream>, filter: LevelFilter) -> SdkResult<()>;
    /// See [`binding::mnemonic_to_seed`].
    fn mnemonic_to_seed(&self, phrase: String) -> SdkResult<Vec<u8>>;
    /// See [`binding::default_config`].
    fn default_config(&self, env: EnvironmentType, api_key: String, node_config: NodeConfig)
        -> Config;
    /// See [`binding::connect`].
    fn connect(
        &self,
        req: ConnectRequest,
        listener: Box<dyn EventListener>,
    ) -> SdkResult<Arc<Self::Services>>;
}

/// Calls on a connected handle.
pub trait Services {
    /// The last synced node state.
    fn node_info(&self) -> SdkResult<NodeState>;
}

/// The real SDK.
pub struct BlockingSdk;

impl Sdk for BlockingSdk {
    type Services = BlockingBreezServices;

    fn set_log_stream(&self, listener: Box<dyn LogStream>, filter: LevelFilter) -> SdkResult<()> {
        binding::set_log_stream(listener, filter)
    }

    fn mnemonic_to_seed(&self, phrase: String) -> SdkResult<Vec<u8>> {
        binding::mnemonic_to_seed(phrase)
    }

    fn default_config(
        &self,
        env: EnvironmentType,
        api_key: String,
        node_config: NodeConfig,
    ) -> Config {
        binding::default_config(env, api_key, node_config)
    }

    fn connect(
        &self,
        req: ConnectRequest,
        listener: Box<dyn EventListener>,
    ) -> SdkResult<Arc<BlockingBreezServices>> {
        binding::connect(req, listener)
    }
}

impl Services for BlockingBreezServices {
    fn node_info(&self) -> SdkResult<NodeState> { BlockingBreezServices::node_info(self) }
}

/// Inputs of [`run`].
#[derive(Debug, Clone)]
pub struct FlowSettings {
    /// Provider deployment
    pub environment: EnvironmentType,
    /// API key, empty for none
    pub api_key: String,
    /// Registration settings
    pub node_config: NodeConfig,
    /// SDK working directory
    pub working_dir: PathBuf,
    /// Minimum severity forwarded to the log listener
    pub log_filter: LevelFilter,
}

/// Runs the connect flow, stopping at the first failing step.
pub fn run<S, L>(
    sdk: &S,
    phrase: &str,
    settings: FlowSettings,
    listener: L,
) -> Result<(Arc<S::Services>, NodeState)>
where
    S: Sdk,
    L: LogStream + EventListener + Clone + 'static,
{
    sdk.set_log_stream(Box::new(listener.clone()), settings.log_filter)
        .context("failed to set log stream")?;

    let seed = sdk.mnemonic_to_seed(phrase.to_string()).context("failed to derive seed")?;

    let mut config = sdk.default_config(settings.environment, settings.api_key, settings.node_config);
    config.working_dir = settings.working_dir.to_string_lossy().into_owned();

    let services =
        sdk.connect(ConnectRequest { config, seed }, Box::new(listener)).context("failed to connect")?;

    let node_info = services.node_info().context("failed to get node info")?;
    Ok((services, node_info))
}

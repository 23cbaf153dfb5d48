//! Blocking facade
//!
//! Synchronous entry points for callers without an async runtime. Calls run
//! on a process-wide multi-threaded tokio runtime, which also hosts the
//! background sync task of connected services.

use std::sync::{Arc, OnceLock};

use logging::LogStream;
use tokio::runtime::Runtime;
use types::{
    CheckMessageRequest, CheckMessageResponse, Config, ConnectRequest, EnvironmentType,
    LevelFilter, NodeConfig, NodeState, SignMessageRequest, SignMessageResponse,
};

use crate::error::{SdkError, SdkResult};
use crate::events::EventListener;
use crate::services::BreezServices;

static RT: OnceLock<Runtime> = OnceLock::new();

fn rt() -> SdkResult<&'static Runtime> {
    if let Some(rt) = RT.get() {
        return Ok(rt);
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("lnsdk-runtime")
        .build()
        .map_err(|e| SdkError::Generic(format!("failed to start runtime: {}", e)))?;
    Ok(RT.get_or_init(|| runtime))
}

/// Installs `listener` as the log stream. Can be called once per process.
pub fn set_log_stream(listener: Box<dyn LogStream>, filter: LevelFilter) -> SdkResult<()> {
    logging::init_log_stream(Arc::from(listener), filter)?;
    Ok(())
}

/// See [`crate::seed::mnemonic_to_seed`].
pub fn mnemonic_to_seed(phrase: String) -> SdkResult<Vec<u8>> { crate::seed::mnemonic_to_seed(&phrase) }

/// See [`crate::config::default_config`].
pub fn default_config(env: EnvironmentType, api_key: String, node_config: NodeConfig) -> Config {
    crate::config::default_config(env, api_key, node_config)
}

/// See [`BreezServices::connect`].
pub fn connect(
    req: ConnectRequest,
    listener: Box<dyn EventListener>,
) -> SdkResult<Arc<BlockingBreezServices>> {
    let breez_services = rt()?.block_on(BreezServices::connect(req, listener))?;
    Ok(Arc::new(BlockingBreezServices { breez_services }))
}

/// Blocking handle over [`BreezServices`].
pub struct BlockingBreezServices {
    breez_services: Arc<BreezServices>,
}

impl BlockingBreezServices {
    /// See [`BreezServices::node_info`].
    pub fn node_info(&self) -> SdkResult<NodeState> { self.breez_services.node_info() }

    /// See [`BreezServices::sync`].
    pub fn sync(&self) -> SdkResult<()> { rt()?.block_on(self.breez_services.sync()) }

    /// See [`BreezServices::sign_message`].
    pub fn sign_message(&self, req: SignMessageRequest) -> SdkResult<SignMessageResponse> {
        rt()?.block_on(self.breez_services.sign_message(req))
    }

    /// See [`BreezServices::check_message`].
    pub fn check_message(&self, req: CheckMessageRequest) -> SdkResult<CheckMessageResponse> {
        rt()?.block_on(self.breez_services.check_message(req))
    }

    /// See [`BreezServices::execute_dev_command`].
    pub fn execute_command(&self, command: String) -> SdkResult<String> {
        rt()?.block_on(self.breez_services.execute_dev_command(command))
    }

    /// See [`BreezServices::disconnect`].
    pub fn disconnect(&self) -> SdkResult<()> { self.breez_services.disconnect() }
}

//! Default SDK configuration per provider environment.

use types::{Config, EnvironmentType, Network, NodeConfig};

/// Scheduler of the production deployment.
pub const PRODUCTION_SCHEDULER_URL: &str = "https://scheduler.gl.blckstrm.com:2601";
/// Scheduler of the staging deployment.
pub const STAGING_SCHEDULER_URL: &str = "https://scheduler.staging.gl.blckstrm.com:2601";

const DEFAULT_WORKING_DIR: &str = ".";
const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;
const DEFAULT_SYNC_INTERVAL_SEC: u64 = 60;

/// Builds the default configuration for `env`.
///
/// An empty `api_key` means no key.
pub fn default_config(env: EnvironmentType, api_key: String, node_config: NodeConfig) -> Config {
    let scheduler_url = match env {
        EnvironmentType::Production => PRODUCTION_SCHEDULER_URL,
        EnvironmentType::Staging => STAGING_SCHEDULER_URL,
    };

    Config {
        environment: env,
        scheduler_url: scheduler_url.to_string(),
        working_dir: DEFAULT_WORKING_DIR.to_string(),
        network: Network::Bitcoin,
        api_key: Some(api_key).filter(|k| !k.is_empty()),
        request_timeout_sec: DEFAULT_REQUEST_TIMEOUT_SEC,
        sync_interval_sec: DEFAULT_SYNC_INTERVAL_SEC,
        node_config,
    }
}

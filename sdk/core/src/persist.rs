//! SDK storage
//!
//! A single JSON document in the working directory holding the node
//! credentials and the last synced node state. Every update rewrites the
//! document through a temporary file that is renamed into place.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use adapters::{CredentialStore, NodeError, NodeResult, StoredCredentials};
use serde::{Deserialize, Serialize};
use types::NodeState;

use crate::error::{SdkError, SdkResult};

/// File name of the storage document inside the working directory.
pub const STORAGE_FILE_NAME: &str = "storage.json";

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StorageData {
    #[serde(default)]
    gl_credentials: Option<StoredCredentials>,
    #[serde(default)]
    node_state: Option<NodeState>,
}

/// File-backed SDK storage.
pub struct SdkStorage {
    path: PathBuf,
    data: Mutex<StorageData>,
}

impl SdkStorage {
    /// Opens the storage in `working_dir`, creating an empty one if absent.
    pub fn open<P: AsRef<Path>>(working_dir: P) -> SdkResult<Self> {
        let path = working_dir.as_ref().join(STORAGE_FILE_NAME);
        let data = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StorageData::default(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!("opened storage at {}", path.display());
        Ok(Self { path, data: Mutex::new(data) })
    }

    /// Location of the storage document.
    pub fn path(&self) -> &Path { &self.path }

    fn lock(&self) -> SdkResult<MutexGuard<'_, StorageData>> {
        self.data.lock().map_err(|_| SdkError::Persistence("storage lock poisoned".to_string()))
    }

    fn update(&self, f: impl FnOnce(&mut StorageData)) -> SdkResult<()> {
        let mut data = self.lock()?;
        let mut next = data.clone();
        f(&mut next);

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&next)?)?;
        std::fs::rename(&tmp, &self.path)?;
        *data = next;
        Ok(())
    }

    /// The last synced node state.
    pub fn get_node_state(&self) -> SdkResult<Option<NodeState>> {
        Ok(self.lock()?.node_state.clone())
    }

    /// Replaces the cached node state.
    pub fn set_node_state(&self, state: &NodeState) -> SdkResult<()> {
        self.update(|data| data.node_state = Some(state.clone()))
    }
}

impl CredentialStore for SdkStorage {
    fn get_gl_credentials(&self) -> NodeResult<Option<StoredCredentials>> {
        let data = self.lock().map_err(|e| NodeError::Persistence(e.to_string()))?;
        Ok(data.gl_credentials.clone())
    }

    fn set_gl_credentials(&self, credentials: StoredCredentials) -> NodeResult<()> {
        self.update(|data| data.gl_credentials = Some(credentials))
            .map_err(|e| NodeError::Persistence(e.to_string()))
    }
}

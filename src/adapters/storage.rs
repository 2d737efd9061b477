use crate::domain::model::SessionToken;
use crate::domain::ports::SessionStore;
use crate::utils::error::{InventoryError, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

#[derive(Debug, Serialize, Deserialize)]
struct SessionDocument {
    token: Option<SessionToken>,
}

/// Keeps the token in a small JSON file so it survives restarts.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Creates the file readable by its owner only (0600 on unix).
async fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    // A leftover temp file would keep its old mode.
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != ErrorKind::NotFound => return Err(e),
        _ => {}
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}

impl SessionStore for FileSessionStore {
    async fn save(&self, token: &SessionToken) -> Result<()> {
        let _guard = self.lock.write().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InventoryError::storage(format!("{}: {}", parent.display(), e)))?;
        }

        let document = SessionDocument {
            token: Some(token.clone()),
        };
        let data = serde_json::to_vec(&document).map_err(InventoryError::storage)?;

        // Write-then-rename so readers never see a half-written file.
        let temp = self.temp_path();
        write_private(&temp, &data)
            .await
            .map_err(|e| InventoryError::storage(format!("{}: {}", temp.display(), e)))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| InventoryError::storage(format!("{}: {}", self.path.display(), e)))?;

        tracing::debug!("Session token saved to {}", self.path.display());
        Ok(())
    }

    async fn load(&self) -> Result<Option<SessionToken>> {
        let _guard = self.lock.read().await;

        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(InventoryError::storage(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let document: SessionDocument = serde_json::from_slice(&data).map_err(|e| {
            InventoryError::storage(format!("corrupt session file {}: {}", self.path.display(), e))
        })?;

        Ok(document.token)
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.lock.write().await;

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!("Session file {} removed", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(InventoryError::storage(format!(
                "{}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// Process-local store, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<SessionToken>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: SessionToken) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    async fn save(&self, token: &SessionToken) -> Result<()> {
        *self.token.write().await = Some(token.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<SessionToken>> {
        Ok(self.token.read().await.clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.token.write().await = None;
        Ok(())
    }
}

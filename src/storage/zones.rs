//! Zone document persistence.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{ZoneError, ZoneResult};

/// The document seeded on first start.
pub fn empty_collection() -> Value {
    serde_json::json!({ "type": "FeatureCollection", "features": [] })
}

/// Owner of the persisted zone document.
///
/// No other component reads or writes the file. Concurrent replaces race
/// and the last rename wins.
#[derive(Debug, Clone)]
pub struct ZoneStore {
    path: PathBuf,
}

impl ZoneStore {
    /// Create a store for the document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the data directory and seed an empty collection if the
    /// document does not exist yet. Returns whether the document was seeded.
    pub async fn ensure_initialized(&self) -> ZoneResult<bool> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                ZoneError::Startup(format!(
                    "cannot create data directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        if fs::try_exists(&self.path).await? {
            return Ok(false);
        }

        let bytes = serde_json::to_vec(&empty_collection())
            .map_err(|e| ZoneError::Internal(e.to_string()))?;
        write_atomically(&self.path, &bytes).await?;

        tracing::info!(path = %self.path.display(), "Seeded empty zone document");
        Ok(true)
    }

    /// Load and parse the current document.
    pub async fn read(&self) -> ZoneResult<Value> {
        let bytes = fs::read(&self.path).await?;

        serde_json::from_slice(&bytes).map_err(|source| ZoneError::CorruptState {
            path: self.path.clone(),
            source,
        })
    }

    /// Fully replace the document with `document`.
    ///
    /// The write runs on its own task so a dropped request cannot leave
    /// it half done.
    pub async fn replace(&self, document: &Value) -> ZoneResult<()> {
        let bytes = serde_json::to_vec(document).map_err(|e| ZoneError::Internal(e.to_string()))?;
        let features = document
            .get("features")
            .and_then(Value::as_array)
            .map(Vec::len);

        let path = self.path.clone();
        let len = bytes.len();
        tokio::spawn(async move { write_atomically(&path, &bytes).await })
            .await
            .map_err(|e| ZoneError::Internal(format!("zone write task failed: {e}")))??;

        tracing::info!(
            path = %self.path.display(),
            bytes = len,
            features = ?features,
            "Saved zone document"
        );
        Ok(())
    }
}

/// Write to a hidden sibling file, sync it, then rename it over `path`.
async fn write_atomically(path: &Path, bytes: &[u8]) -> ZoneResult<()> {
    let tmp = temp_path(path);

    let result = async {
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "zones".to_string());
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4()))
}

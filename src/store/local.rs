use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use futures_locks::Mutex;
use tokio::fs;

use super::{MenuRow, Snapshot};

/// Menus in a pretty-printed JSON file, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // serialises read-modify-write cycles
    lock: Mutex<()>,
}

impl FileStore {
    pub fn open(p: impl AsRef<Path>) -> Self {
        Self {
            path: p.as_ref().to_owned(),
            lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> crate::Result<Snapshot> {
        if fs::try_exists(&self.path).await? {
            let text = fs::read_to_string(&self.path).await?;
            serde_json::from_str(&text).map_err(From::from)
        } else {
            Ok(Snapshot::default())
        }
    }

    async fn write(&self, snapshot: &Snapshot) -> crate::Result<()> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }

    pub async fn load_all(&self) -> crate::Result<Vec<MenuRow>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.menus)
    }

    pub async fn save(&self, row: &MenuRow) -> crate::Result<bool> {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.read().await?;
        let inserted = snapshot.insert(row);
        if inserted {
            self.write(&snapshot).await?;
        }
        Ok(inserted)
    }

    pub async fn remove(&self, id: i64) -> crate::Result<bool> {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.read().await?;
        let removed = snapshot.remove(id);
        if removed {
            self.write(&snapshot).await?;
        }
        Ok(removed)
    }

    pub async fn last_update(&self) -> crate::Result<Option<DateTime<Utc>>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.last_update)
    }

    pub async fn set_last_update(&self, at: DateTime<Utc>) -> crate::Result<()> {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.read().await?;
        snapshot.last_update = Some(at);
        self.write(&snapshot).await
    }
}

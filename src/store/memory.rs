use chrono::{DateTime, Utc};
use futures_locks::RwLock;

use super::{MenuRow, Snapshot};

/// Keeps menus for the life of the process only.
#[derive(Debug)]
pub struct MemoryStore(RwLock<Snapshot>);

impl Default for MemoryStore {
    fn default() -> Self {
        Self(RwLock::new(Snapshot::default()))
    }
}

impl MemoryStore {
    pub async fn load_all(&self) -> Vec<MenuRow> {
        self.0.read().await.menus.clone()
    }

    pub async fn save(&self, row: &MenuRow) -> bool {
        self.0.write().await.insert(row)
    }

    pub async fn remove(&self, id: i64) -> bool {
        self.0.write().await.remove(id)
    }

    pub async fn last_update(&self) -> Option<DateTime<Utc>> {
        self.0.read().await.last_update
    }

    pub async fn set_last_update(&self, at: DateTime<Utc>) {
        self.0.write().await.last_update = Some(at);
    }
}

mod firestore;
mod local;
mod memory;

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    config::{Config, StoreKind},
    menu::{DailyMenu, Meal},
    parse,
};

pub use firestore::Firestore;
pub use local::FileStore;
pub use memory::MemoryStore;

pub const WRITE_COOLDOWN: Duration = Duration::minutes(20);

/// A menu as persisted: one flat row keyed by its `YYYYMMDD` id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuRow {
    pub id: i64,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub lunch1: Option<String>,
    pub lunch2: Option<String>,
    pub dinner1: Option<String>,
    pub dinner2: Option<String>,
    pub url: Option<String>,
}

impl From<&DailyMenu> for MenuRow {
    fn from(menu: &DailyMenu) -> Self {
        let owned = |plate: Option<&str>| plate.map(str::to_owned);
        Self {
            id: menu.id(),
            day: menu.day(),
            month: menu.month(),
            year: menu.year(),
            lunch1: owned(menu.lunch().p1()),
            lunch2: owned(menu.lunch().p2()),
            dinner1: owned(menu.dinner().p1()),
            dinner2: owned(menu.dinner().p2()),
            url: Some(menu.url().to_string()),
        }
    }
}

impl TryFrom<MenuRow> for DailyMenu {
    type Error = parse::Error;

    fn try_from(row: MenuRow) -> Result<Self, Self::Error> {
        let url = row.url.as_deref().and_then(|url| Url::parse(url).ok());
        Self::new(
            row.day,
            row.month,
            row.year,
            Meal::new(row.lunch1.as_deref(), row.lunch2.as_deref()),
            Meal::new(row.dinner1.as_deref(), row.dinner2.as_deref()),
            url,
        )
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub enum Store {
    Cloud(Firestore),
    Local(FileStore),
    AdHoc(MemoryStore),
}

impl Store {
    #[inline]
    pub async fn cloud(project: &str) -> crate::Result<Self> {
        Firestore::open(project).await.map(Self::Cloud)
    }

    #[inline]
    pub fn local(p: impl AsRef<Path>) -> Self {
        Self::Local(FileStore::open(p))
    }

    pub async fn open(config: &Config) -> crate::Result<Self> {
        match &config.store {
            StoreKind::Firestore => Self::cloud(&config.firestore_project).await,
            StoreKind::File(p) => Ok(Self::local(p)),
            StoreKind::Memory => Ok(Self::AdHoc(MemoryStore::default())),
        }
    }

    pub async fn load_all(&self) -> crate::Result<Vec<MenuRow>> {
        match self {
            Self::Cloud(fs) => fs.load_all().await,
            Self::Local(f) => f.load_all().await,
            Self::AdHoc(m) => Ok(m.load_all().await),
        }
    }

    /// Inserts `row`; `false` when a row with the same id already exists.
    pub async fn save(&self, row: &MenuRow) -> crate::Result<bool> {
        match self {
            Self::Cloud(fs) => fs.save(row).await,
            Self::Local(f) => f.save(row).await,
            Self::AdHoc(m) => Ok(m.save(row).await),
        }
    }

    pub async fn remove(&self, id: i64) -> crate::Result<bool> {
        match self {
            Self::Cloud(fs) => fs.remove(id).await,
            Self::Local(f) => f.remove(id).await,
            Self::AdHoc(m) => Ok(m.remove(id).await),
        }
    }

    pub async fn last_update(&self) -> crate::Result<Option<DateTime<Utc>>> {
        match self {
            Self::Cloud(fs) => fs.last_update().await,
            Self::Local(f) => f.last_update().await,
            Self::AdHoc(m) => Ok(m.last_update().await),
        }
    }

    pub async fn set_last_update(&self, at: DateTime<Utc>) -> crate::Result<()> {
        match self {
            Self::Cloud(fs) => fs.set_last_update(at).await,
            Self::Local(f) => f.set_last_update(at).await,
            Self::AdHoc(m) => {
                m.set_last_update(at).await;
                Ok(())
            }
        }
    }
}

/// Rows and write stamp kept by the memory and file stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Snapshot {
    last_update: Option<DateTime<Utc>>,
    menus: Vec<MenuRow>,
}

impl Snapshot {
    fn insert(&mut self, row: &MenuRow) -> bool {
        if self.menus.iter().any(|r| r.id == row.id) {
            return false;
        }
        self.menus.push(row.clone());
        true
    }

    fn remove(&mut self, id: i64) -> bool {
        let before = self.menus.len();
        self.menus.retain(|r| r.id != id);
        self.menus.len() != before
    }
}

/// Throttles writes so that repeated loads do not rewrite the store.
#[derive(Debug, Clone, Copy)]
pub struct UpdateControl {
    cooldown: Duration,
}

impl Default for UpdateControl {
    fn default() -> Self {
        Self::new(WRITE_COOLDOWN)
    }
}

impl UpdateControl {
    pub const fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    #[inline]
    #[must_use]
    pub fn time_since_write(last: DateTime<Utc>) -> Duration {
        Utc::now().signed_duration_since(last)
    }

    #[inline]
    #[must_use]
    pub fn time_until_write(&self, last: DateTime<Utc>) -> Duration {
        self.cooldown - Self::time_since_write(last)
    }

    /// `true` when nothing was ever written or the last write is at least
    /// one cooldown old.
    pub async fn should_write(&self, store: &Store) -> crate::Result<bool> {
        Ok(store
            .last_update()
            .await?
            .map_or(true, |last| Self::time_since_write(last) >= self.cooldown))
    }

    pub async fn mark_written(&self, store: &Store) -> crate::Result<()> {
        store.set_last_update(Utc::now()).await
    }
}

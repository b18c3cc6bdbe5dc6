use chrono::{DateTime, Utc};
use firestore::{errors::FirestoreError, FirestoreDb};
use log::info;
use serde::{Deserialize, Serialize};

use super::MenuRow;

const MENUS_COLLECTION: &str = "daily_menus";
const CONTROL_COLLECTION: &str = "update_control";
const CONTROL_DOCUMENT: &str = "menus";

#[derive(Debug)]
pub struct Firestore {
    db: FirestoreDb,
}

#[derive(Serialize, Deserialize, Default)]
struct UpdateStamp {
    last_update: Option<DateTime<Utc>>,
}

impl Firestore {
    pub async fn open(project: &str) -> crate::Result<Self> {
        let db = FirestoreDb::new(project).await?;
        info!("Connected to firestore project {project}");
        Ok(Self { db })
    }

    pub async fn load_all(&self) -> crate::Result<Vec<MenuRow>> {
        let rows: Vec<MenuRow> = self
            .db
            .fluent()
            .select()
            .from(MENUS_COLLECTION)
            .obj()
            .query()
            .await?;
        info!("Loaded {} menus from firestore", rows.len());
        Ok(rows)
    }

    pub async fn save(&self, row: &MenuRow) -> crate::Result<bool> {
        let inserted = self
            .db
            .fluent()
            .insert()
            .into(MENUS_COLLECTION)
            .document_id(row.id.to_string())
            .object(row)
            .execute::<MenuRow>()
            .await;
        match inserted {
            Ok(_) => Ok(true),
            Err(FirestoreError::DataConflictError(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove(&self, id: i64) -> crate::Result<bool> {
        let existing: Option<MenuRow> = self
            .db
            .fluent()
            .select()
            .by_id_in(MENUS_COLLECTION)
            .obj()
            .one(id.to_string())
            .await?;
        if existing.is_none() {
            return Ok(false);
        }
        self.db
            .fluent()
            .delete()
            .from(MENUS_COLLECTION)
            .document_id(id.to_string())
            .execute()
            .await?;
        Ok(true)
    }

    pub async fn last_update(&self) -> crate::Result<Option<DateTime<Utc>>> {
        let stamp: Option<UpdateStamp> = self
            .db
            .fluent()
            .select()
            .by_id_in(CONTROL_COLLECTION)
            .obj()
            .one(CONTROL_DOCUMENT)
            .await?;
        Ok(stamp.and_then(|stamp| stamp.last_update))
    }

    pub async fn set_last_update(&self, at: DateTime<Utc>) -> crate::Result<()> {
        self.db
            .fluent()
            .update()
            .in_col(CONTROL_COLLECTION)
            .document_id(CONTROL_DOCUMENT)
            .object(&UpdateStamp {
                last_update: Some(at),
            })
            // need to specify type because of dependency_on_unit_never_type_fallback
            .execute::<UpdateStamp>()
            .await?;
        Ok(())
    }
}

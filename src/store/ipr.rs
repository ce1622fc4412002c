//! IPR filing queries.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::Deserialize;

use super::{StoreError, StoreSession};
use crate::models::Ipr;

#[derive(Debug, Deserialize)]
pub struct NewIpr {
    pub ipr_type: String,
    pub title: String,
    pub ipr_number: Option<String>,
    pub filing_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub related_startup_id: Option<i64>,
}

/// Partial update; unknown fields are rejected at deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IprChanges {
    pub ipr_type: Option<String>,
    pub title: Option<String>,
    pub ipr_number: Option<String>,
    pub filing_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub related_startup_id: Option<i64>,
}

fn row_to_ipr(row: &Row<'_>) -> rusqlite::Result<Ipr> {
    Ok(Ipr {
        ipr_id: row.get(0)?,
        ipr_type: row.get(1)?,
        title: row.get(2)?,
        ipr_number: row.get(3)?,
        filing_date: row.get(4)?,
        status: row.get(5)?,
        related_startup_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        user_id: row.get(9)?,
    })
}

const IPR_COLUMNS: &str = "ipr_id, ipr_type, title, ipr_number, filing_date, status, \
                           related_startup_id, created_at, updated_at, user_id";

impl StoreSession<'_> {
    pub fn insert_ipr(&self, user_id: i64, new: &NewIpr) -> Result<i64, StoreError> {
        if new.title.trim().is_empty() {
            return Err(StoreError::InvalidInput("title must not be empty"));
        }
        self.execute(
            "INSERT INTO ipr (ipr_type, title, ipr_number, filing_date, status, \
                              related_startup_id, created_at, user_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new.ipr_type,
                new.title,
                new.ipr_number,
                new.filing_date,
                new.status,
                new.related_startup_id,
                Utc::now(),
                user_id
            ],
        )?;
        Ok(self.last_insert_rowid())
    }

    pub fn iprs_all(&self) -> Result<Vec<Ipr>, StoreError> {
        let mut stmt = self.prepare(&format!("SELECT {IPR_COLUMNS} FROM ipr ORDER BY ipr_id"))?;
        let rows = stmt
            .query_map([], row_to_ipr)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn iprs_by_user(&self, user_id: i64) -> Result<Vec<Ipr>, StoreError> {
        let mut stmt = self.prepare(&format!(
            "SELECT {IPR_COLUMNS} FROM ipr WHERE user_id = ?1 ORDER BY ipr_id"
        ))?;
        let rows = stmt
            .query_map(params![user_id], row_to_ipr)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn ipr_by_id(&self, ipr_id: i64) -> Result<Option<Ipr>, StoreError> {
        Ok(self
            .query_row(
                &format!("SELECT {IPR_COLUMNS} FROM ipr WHERE ipr_id = ?1"),
                params![ipr_id],
                row_to_ipr,
            )
            .optional()?)
    }

    pub fn update_ipr(&self, ipr_id: i64, changes: &IprChanges) -> Result<bool, StoreError> {
        let affected = self.execute(
            "UPDATE ipr SET \
               ipr_type           = COALESCE(?1, ipr_type), \
               title              = COALESCE(?2, title), \
               ipr_number         = COALESCE(?3, ipr_number), \
               filing_date        = COALESCE(?4, filing_date), \
               status             = COALESCE(?5, status), \
               related_startup_id = COALESCE(?6, related_startup_id), \
               updated_at         = ?7 \
             WHERE ipr_id = ?8",
            params![
                changes.ipr_type,
                changes.title,
                changes.ipr_number,
                changes.filing_date,
                changes.status,
                changes.related_startup_id,
                Utc::now(),
                ipr_id
            ],
        )?;
        Ok(affected > 0)
    }

    pub fn delete_ipr(&self, ipr_id: i64) -> Result<bool, StoreError> {
        let affected = self.execute("DELETE FROM ipr WHERE ipr_id = ?1", params![ipr_id])?;
        Ok(affected > 0)
    }

    pub fn count_iprs(&self) -> Result<i64, StoreError> {
        Ok(self.query_row("SELECT COUNT(*) FROM ipr", [], |row| row.get(0))?)
    }

    pub fn count_iprs_by_user(&self, user_id: i64) -> Result<i64, StoreError> {
        Ok(self.query_row(
            "SELECT COUNT(*) FROM ipr WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::store::RecordStore;

    fn seed_user(session: &StoreSession<'_>) -> i64 {
        session
            .insert_user("Asha Rao", "asha@riise.edu", Role::User)
            .unwrap()
    }

    #[test]
    fn test_ipr_crud_round_trip() {
        let store = RecordStore::open_in_memory().unwrap();
        let session = store.session();
        let user_id = seed_user(&session);

        let id = session
            .insert_ipr(
                user_id,
                &NewIpr {
                    ipr_type: "Patent".to_string(),
                    title: "Low-power irrigation valve".to_string(),
                    ipr_number: None,
                    filing_date: NaiveDate::from_ymd_opt(2022, 1, 1),
                    status: Some("Filed".to_string()),
                    related_startup_id: None,
                },
            )
            .unwrap();

        let fetched = session.ipr_by_id(id).unwrap().unwrap();
        assert_eq!(fetched.title, "Low-power irrigation valve");
        assert_eq!(fetched.filing_date, NaiveDate::from_ymd_opt(2022, 1, 1));
        assert!(fetched.created_at.is_some());

        let changes = IprChanges {
            status: Some("Granted".to_string()),
            ..Default::default()
        };
        assert!(session.update_ipr(id, &changes).unwrap());
        let fetched = session.ipr_by_id(id).unwrap().unwrap();
        assert_eq!(fetched.status.as_deref(), Some("Granted"));
        assert_eq!(fetched.ipr_type, "Patent");

        assert_eq!(session.count_iprs_by_user(user_id).unwrap(), 1);
        assert!(session.delete_ipr(id).unwrap());
        assert!(!session.delete_ipr(id).unwrap());
        assert_eq!(session.count_iprs().unwrap(), 0);
    }
}

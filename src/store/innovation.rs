//! Innovation entry queries.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::Deserialize;

use super::{StoreError, StoreSession};
use crate::models::Innovation;

#[derive(Debug, Deserialize)]
pub struct NewInnovation {
    pub title: String,
    pub description: Option<String>,
    pub domain: Option<String>,
    pub level: Option<String>,
    pub status: Option<String>,
    pub submitted_on: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InnovationChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub domain: Option<String>,
    pub level: Option<String>,
    pub status: Option<String>,
    pub submitted_on: Option<NaiveDate>,
}

fn row_to_innovation(row: &Row<'_>) -> rusqlite::Result<Innovation> {
    Ok(Innovation {
        innovation_id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        domain: row.get(3)?,
        level: row.get(4)?,
        status: row.get(5)?,
        submitted_on: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        user_id: row.get(9)?,
    })
}

const INNOVATION_COLUMNS: &str = "innovation_id, title, description, domain, level, status, \
                                  submitted_on, created_at, updated_at, user_id";

impl StoreSession<'_> {
    pub fn insert_innovation(
        &self,
        user_id: Option<i64>,
        new: &NewInnovation,
    ) -> Result<i64, StoreError> {
        if new.title.trim().is_empty() {
            return Err(StoreError::InvalidInput("title must not be empty"));
        }
        self.execute(
            "INSERT INTO innovation (title, description, domain, level, status, submitted_on, \
                                     created_at, user_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new.title,
                new.description,
                new.domain,
                new.level,
                new.status,
                new.submitted_on,
                Utc::now(),
                user_id
            ],
        )?;
        Ok(self.last_insert_rowid())
    }

    pub fn innovations_all(&self) -> Result<Vec<Innovation>, StoreError> {
        let mut stmt = self.prepare(&format!(
            "SELECT {INNOVATION_COLUMNS} FROM innovation ORDER BY innovation_id"
        ))?;
        let rows = stmt
            .query_map([], row_to_innovation)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn innovations_by_user(&self, user_id: i64) -> Result<Vec<Innovation>, StoreError> {
        let mut stmt = self.prepare(&format!(
            "SELECT {INNOVATION_COLUMNS} FROM innovation WHERE user_id = ?1 ORDER BY innovation_id"
        ))?;
        let rows = stmt
            .query_map(params![user_id], row_to_innovation)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn innovation_by_id(&self, innovation_id: i64) -> Result<Option<Innovation>, StoreError> {
        Ok(self
            .query_row(
                &format!("SELECT {INNOVATION_COLUMNS} FROM innovation WHERE innovation_id = ?1"),
                params![innovation_id],
                row_to_innovation,
            )
            .optional()?)
    }

    pub fn update_innovation(
        &self,
        innovation_id: i64,
        changes: &InnovationChanges,
    ) -> Result<bool, StoreError> {
        let affected = self.execute(
            "UPDATE innovation SET \
               title        = COALESCE(?1, title), \
               description  = COALESCE(?2, description), \
               domain       = COALESCE(?3, domain), \
               level        = COALESCE(?4, level), \
               status       = COALESCE(?5, status), \
               submitted_on = COALESCE(?6, submitted_on), \
               updated_at   = ?7 \
             WHERE innovation_id = ?8",
            params![
                changes.title,
                changes.description,
                changes.domain,
                changes.level,
                changes.status,
                changes.submitted_on,
                Utc::now(),
                innovation_id
            ],
        )?;
        Ok(affected > 0)
    }

    pub fn delete_innovation(&self, innovation_id: i64) -> Result<bool, StoreError> {
        let affected = self.execute(
            "DELETE FROM innovation WHERE innovation_id = ?1",
            params![innovation_id],
        )?;
        Ok(affected > 0)
    }

    pub fn count_innovations(&self) -> Result<i64, StoreError> {
        Ok(self.query_row("SELECT COUNT(*) FROM innovation", [], |row| row.get(0))?)
    }

    pub fn count_innovations_by_user(&self, user_id: i64) -> Result<i64, StoreError> {
        Ok(self.query_row(
            "SELECT COUNT(*) FROM innovation WHERE user_id = ?1",
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

    #[test]
    fn test_unowned_innovation_counts_globally_not_per_user() {
        let store = RecordStore::open_in_memory().unwrap();
        let session = store.session();
        let asha = session
            .insert_user("Asha Rao", "asha@riise.edu", Role::User)
            .unwrap();

        session
            .insert_innovation(
                None,
                &NewInnovation {
                    title: "Campus-wide sensor mesh".to_string(),
                    description: None,
                    domain: Some("IoT".to_string()),
                    level: Some("institute".to_string()),
                    status: Some("approved".to_string()),
                    submitted_on: None,
                },
            )
            .unwrap();

        assert_eq!(session.count_innovations().unwrap(), 1);
        assert_eq!(session.count_innovations_by_user(asha).unwrap(), 0);
        assert!(session.innovations_by_user(asha).unwrap().is_empty());
    }
}

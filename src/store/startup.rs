//! Startup venture queries.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::Deserialize;

use super::{StoreError, StoreSession};
use crate::models::Startup;

#[derive(Debug, Deserialize)]
pub struct NewStartup {
    pub name: String,
    pub description: Option<String>,
    pub founder: Option<String>,
    pub industry: Option<String>,
    pub founded_date: Option<NaiveDate>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartupChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub founder: Option<String>,
    pub industry: Option<String>,
    pub founded_date: Option<NaiveDate>,
    pub status: Option<String>,
}

fn row_to_startup(row: &Row<'_>) -> rusqlite::Result<Startup> {
    Ok(Startup {
        startup_id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        founder: row.get(3)?,
        industry: row.get(4)?,
        founded_date: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        user_id: row.get(9)?,
    })
}

const STARTUP_COLUMNS: &str = "startup_id, name, description, founder, industry, founded_date, \
                               status, created_at, updated_at, user_id";

impl StoreSession<'_> {
    pub fn insert_startup(
        &self,
        user_id: Option<i64>,
        new: &NewStartup,
    ) -> Result<i64, StoreError> {
        if new.name.trim().is_empty() {
            return Err(StoreError::InvalidInput("name must not be empty"));
        }
        self.execute(
            "INSERT INTO startup (name, description, founder, industry, founded_date, status, \
                                  created_at, user_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new.name,
                new.description,
                new.founder,
                new.industry,
                new.founded_date,
                new.status,
                Utc::now(),
                user_id
            ],
        )?;
        Ok(self.last_insert_rowid())
    }

    pub fn startups_all(&self) -> Result<Vec<Startup>, StoreError> {
        let mut stmt = self.prepare(&format!(
            "SELECT {STARTUP_COLUMNS} FROM startup ORDER BY startup_id"
        ))?;
        let rows = stmt
            .query_map([], row_to_startup)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn startups_by_user(&self, user_id: i64) -> Result<Vec<Startup>, StoreError> {
        let mut stmt = self.prepare(&format!(
            "SELECT {STARTUP_COLUMNS} FROM startup WHERE user_id = ?1 ORDER BY startup_id"
        ))?;
        let rows = stmt
            .query_map(params![user_id], row_to_startup)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn startup_by_id(&self, startup_id: i64) -> Result<Option<Startup>, StoreError> {
        Ok(self
            .query_row(
                &format!("SELECT {STARTUP_COLUMNS} FROM startup WHERE startup_id = ?1"),
                params![startup_id],
                row_to_startup,
            )
            .optional()?)
    }

    pub fn update_startup(
        &self,
        startup_id: i64,
        changes: &StartupChanges,
    ) -> Result<bool, StoreError> {
        let affected = self.execute(
            "UPDATE startup SET \
               name         = COALESCE(?1, name), \
               description  = COALESCE(?2, description), \
               founder      = COALESCE(?3, founder), \
               industry     = COALESCE(?4, industry), \
               founded_date = COALESCE(?5, founded_date), \
               status       = COALESCE(?6, status), \
               updated_at   = ?7 \
             WHERE startup_id = ?8",
            params![
                changes.name,
                changes.description,
                changes.founder,
                changes.industry,
                changes.founded_date,
                changes.status,
                Utc::now(),
                startup_id
            ],
        )?;
        Ok(affected > 0)
    }

    pub fn delete_startup(&self, startup_id: i64) -> Result<bool, StoreError> {
        let affected = self.execute(
            "DELETE FROM startup WHERE startup_id = ?1",
            params![startup_id],
        )?;
        Ok(affected > 0)
    }

    pub fn count_startups(&self) -> Result<i64, StoreError> {
        Ok(self.query_row("SELECT COUNT(*) FROM startup", [], |row| row.get(0))?)
    }

    pub fn count_startups_by_user(&self, user_id: i64) -> Result<i64, StoreError> {
        Ok(self.query_row(
            "SELECT COUNT(*) FROM startup WHERE user_id = ?1",
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
    fn test_startup_crud_round_trip() {
        let store = RecordStore::open_in_memory().unwrap();
        let session = store.session();
        let asha = session
            .insert_user("Asha Rao", "asha@riise.edu", Role::User)
            .unwrap();

        let id = session
            .insert_startup(
                Some(asha),
                &NewStartup {
                    name: "AgroPulse".to_string(),
                    description: None,
                    founder: Some("Asha Rao".to_string()),
                    industry: Some("AgriTech".to_string()),
                    founded_date: NaiveDate::from_ymd_opt(2021, 6, 15),
                    status: Some("Incubated".to_string()),
                },
            )
            .unwrap();

        let changes = StartupChanges {
            status: Some("Funded".to_string()),
            ..Default::default()
        };
        assert!(session.update_startup(id, &changes).unwrap());

        let fetched = session.startup_by_id(id).unwrap().unwrap();
        assert_eq!(fetched.status.as_deref(), Some("Funded"));
        assert_eq!(fetched.user_id, Some(asha));

        assert!(session.delete_startup(id).unwrap());
        assert_eq!(session.count_startups().unwrap(), 0);
    }
}

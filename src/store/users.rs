//! User row queries.

use rusqlite::{params, OptionalExtension, Row};
use serde::Deserialize;

use super::{StoreError, StoreSession};
use crate::auth::Role;
use crate::models::User;
use crate::scholar::ScholarMetrics;

/// Profile fields a user may change about themselves. Unknown fields are a
/// client bug and rejected at deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub scholar_id: Option<String>,
    pub id_card_url: Option<String>,
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let role_raw: String = row.get(3)?;
    Ok(User {
        user_id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        // Unknown role strings fall back to the least-privileged role.
        role: Role::parse(&role_raw).unwrap_or(Role::User),
        scholar_id: row.get(4)?,
        h_index: row.get(5)?,
        i10_index: row.get(6)?,
        total_citations: row.get(7)?,
        id_card_url: row.get(8)?,
        is_verified: row.get(9)?,
    })
}

const USER_COLUMNS: &str = "user_id, name, email, role, scholar_id, h_index, i10_index, \
                            total_citations, id_card_url, is_verified";

impl StoreSession<'_> {
    pub fn insert_user(&self, name: &str, email: &str, role: Role) -> Result<i64, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::InvalidInput("name must not be empty"));
        }
        self.execute(
            "INSERT INTO users (name, email, role) VALUES (?1, ?2, ?3)",
            params![name, email, role.as_str()],
        )?;
        Ok(self.last_insert_rowid())
    }

    pub fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                row_to_user,
            )
            .optional()?)
    }

    pub fn user_by_id(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(self
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
                params![user_id],
                row_to_user,
            )
            .optional()?)
    }

    pub fn users_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        let mut stmt = self.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = ?1 ORDER BY user_id"
        ))?;
        let users = stmt
            .query_map(params![role.as_str()], row_to_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    pub fn all_users(&self) -> Result<Vec<User>, StoreError> {
        let mut stmt =
            self.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY user_id"))?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    /// Apply the provided profile fields, leaving the rest untouched.
    pub fn update_profile(
        &self,
        user_id: i64,
        changes: &ProfileChanges,
    ) -> Result<bool, StoreError> {
        let affected = self.execute(
            "UPDATE users SET \
               name        = COALESCE(?1, name), \
               scholar_id  = COALESCE(?2, scholar_id), \
               id_card_url = COALESCE(?3, id_card_url) \
             WHERE user_id = ?4",
            params![changes.name, changes.scholar_id, changes.id_card_url, user_id],
        )?;
        Ok(affected > 0)
    }

    pub fn count_users(&self) -> Result<i64, StoreError> {
        Ok(self.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
    }

    pub fn set_scholar_metrics(
        &self,
        user_id: i64,
        metrics: &ScholarMetrics,
    ) -> Result<bool, StoreError> {
        let affected = self.execute(
            "UPDATE users SET h_index = ?1, i10_index = ?2, total_citations = ?3 \
             WHERE user_id = ?4",
            params![
                metrics.h_index,
                metrics.i10_index,
                metrics.total_citations,
                user_id
            ],
        )?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;

    #[test]
    fn test_insert_and_fetch_user() {
        let store = RecordStore::open_in_memory().unwrap();
        let session = store.session();

        let id = session
            .insert_user("Asha Rao", "asha@riise.edu", Role::User)
            .unwrap();
        let user = session.user_by_email("asha@riise.edu").unwrap().unwrap();

        assert_eq!(user.user_id, id);
        assert_eq!(user.role, Role::User);
        assert!(!user.is_verified);
        assert!(session.user_by_email("nobody@riise.edu").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = RecordStore::open_in_memory().unwrap();
        let session = store.session();

        session
            .insert_user("Asha Rao", "asha@riise.edu", Role::User)
            .unwrap();
        assert!(session
            .insert_user("Impostor", "asha@riise.edu", Role::User)
            .is_err());
    }

    #[test]
    fn test_users_by_role_excludes_admins() {
        let store = RecordStore::open_in_memory().unwrap();
        let session = store.session();

        session
            .insert_user("Asha Rao", "asha@riise.edu", Role::User)
            .unwrap();
        session
            .insert_user("Dean Verma", "dean@riise.edu", Role::Admin)
            .unwrap();

        let members = session.users_by_role(Role::User).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].email, "asha@riise.edu");
    }

    #[test]
    fn test_profile_update_is_partial() {
        let store = RecordStore::open_in_memory().unwrap();
        let session = store.session();

        let id = session
            .insert_user("Asha Rao", "asha@riise.edu", Role::User)
            .unwrap();
        let changes = ProfileChanges {
            scholar_id: Some("SCH123".to_string()),
            ..Default::default()
        };
        assert!(session.update_profile(id, &changes).unwrap());

        let user = session.user_by_id(id).unwrap().unwrap();
        assert_eq!(user.name, "Asha Rao");
        assert_eq!(user.scholar_id.as_deref(), Some("SCH123"));
    }
}

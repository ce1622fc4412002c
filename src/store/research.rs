//! Research paper queries.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::Deserialize;

use super::{StoreError, StoreSession};
use crate::models::ResearchPaper;

#[derive(Debug, Deserialize)]
pub struct NewPaper {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub authors: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub doi: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaperChanges {
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub authors: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub doi: Option<String>,
    pub status: Option<String>,
}

fn row_to_paper(row: &Row<'_>) -> rusqlite::Result<ResearchPaper> {
    Ok(ResearchPaper {
        paper_id: row.get(0)?,
        title: row.get(1)?,
        abstract_text: row.get(2)?,
        authors: row.get(3)?,
        publication_date: row.get(4)?,
        doi: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        user_id: row.get(9)?,
    })
}

const PAPER_COLUMNS: &str = "paper_id, title, abstract, authors, publication_date, doi, \
                             status, created_at, updated_at, user_id";

impl StoreSession<'_> {
    pub fn insert_paper(&self, user_id: i64, new: &NewPaper) -> Result<i64, StoreError> {
        if new.title.trim().is_empty() {
            return Err(StoreError::InvalidInput("title must not be empty"));
        }
        self.execute(
            "INSERT INTO research_paper (title, abstract, authors, publication_date, doi, \
                                         status, created_at, user_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new.title,
                new.abstract_text,
                new.authors,
                new.publication_date,
                new.doi,
                new.status,
                Utc::now(),
                user_id
            ],
        )?;
        Ok(self.last_insert_rowid())
    }

    pub fn papers_all(&self) -> Result<Vec<ResearchPaper>, StoreError> {
        let mut stmt = self.prepare(&format!(
            "SELECT {PAPER_COLUMNS} FROM research_paper ORDER BY paper_id"
        ))?;
        let rows = stmt
            .query_map([], row_to_paper)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn papers_by_user(&self, user_id: i64) -> Result<Vec<ResearchPaper>, StoreError> {
        let mut stmt = self.prepare(&format!(
            "SELECT {PAPER_COLUMNS} FROM research_paper WHERE user_id = ?1 ORDER BY paper_id"
        ))?;
        let rows = stmt
            .query_map(params![user_id], row_to_paper)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn paper_by_id(&self, paper_id: i64) -> Result<Option<ResearchPaper>, StoreError> {
        Ok(self
            .query_row(
                &format!("SELECT {PAPER_COLUMNS} FROM research_paper WHERE paper_id = ?1"),
                params![paper_id],
                row_to_paper,
            )
            .optional()?)
    }

    pub fn update_paper(&self, paper_id: i64, changes: &PaperChanges) -> Result<bool, StoreError> {
        let affected = self.execute(
            "UPDATE research_paper SET \
               title            = COALESCE(?1, title), \
               abstract         = COALESCE(?2, abstract), \
               authors          = COALESCE(?3, authors), \
               publication_date = COALESCE(?4, publication_date), \
               doi              = COALESCE(?5, doi), \
               status           = COALESCE(?6, status), \
               updated_at       = ?7 \
             WHERE paper_id = ?8",
            params![
                changes.title,
                changes.abstract_text,
                changes.authors,
                changes.publication_date,
                changes.doi,
                changes.status,
                Utc::now(),
                paper_id
            ],
        )?;
        Ok(affected > 0)
    }

    pub fn delete_paper(&self, paper_id: i64) -> Result<bool, StoreError> {
        let affected = self.execute(
            "DELETE FROM research_paper WHERE paper_id = ?1",
            params![paper_id],
        )?;
        Ok(affected > 0)
    }

    pub fn count_papers(&self) -> Result<i64, StoreError> {
        Ok(self.query_row("SELECT COUNT(*) FROM research_paper", [], |row| row.get(0))?)
    }

    pub fn count_papers_by_user(&self, user_id: i64) -> Result<i64, StoreError> {
        Ok(self.query_row(
            "SELECT COUNT(*) FROM research_paper WHERE user_id = ?1",
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
    fn test_paper_insert_and_filter_by_user() {
        let store = RecordStore::open_in_memory().unwrap();
        let session = store.session();
        let asha = session
            .insert_user("Asha Rao", "asha@riise.edu", Role::User)
            .unwrap();
        let ravi = session
            .insert_user("Ravi Iyer", "ravi@riise.edu", Role::User)
            .unwrap();

        session
            .insert_paper(
                asha,
                &NewPaper {
                    title: "Edge inference under 1W".to_string(),
                    abstract_text: None,
                    authors: Some("A. Rao, R. Iyer".to_string()),
                    publication_date: NaiveDate::from_ymd_opt(2023, 1, 1),
                    doi: None,
                    status: Some("Published".to_string()),
                },
            )
            .unwrap();

        assert_eq!(session.papers_by_user(asha).unwrap().len(), 1);
        assert!(session.papers_by_user(ravi).unwrap().is_empty());
        assert_eq!(session.count_papers().unwrap(), 1);
    }
}

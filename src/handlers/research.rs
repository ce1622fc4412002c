//! Research paper CRUD handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde::Serialize;
use tracing::info;

use super::router::AppState;
use crate::auth::{AuthUser, Role};
use crate::errors::AppError;
use crate::models::ResearchPaper;
use crate::store::research::{NewPaper, PaperChanges};
use crate::validation::{self, ValidationErrorExt};

#[derive(Debug, Serialize)]
pub struct PaperCreatedResponse {
    pub message: String,
    pub paper_id: i64,
}

#[derive(Debug, Serialize)]
pub struct PaperMessageResponse {
    pub message: String,
}

/// GET /api/v1/research/ - admin sees all papers, users their own.
pub async fn list_papers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ResearchPaper>>, AppError> {
    let session = state.store.session();
    let papers = if auth.role == Role::Admin {
        session.papers_all()?
    } else {
        session.papers_by_user(auth.user_id)?
    };
    Ok(Json(papers))
}

/// POST /api/v1/research/add-paper
pub async fn add_paper(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(new): Json<NewPaper>,
) -> Result<Json<PaperCreatedResponse>, AppError> {
    validation::validate_title(&new.title).map_validation_err("title")?;
    if let Some(abstract_text) = &new.abstract_text {
        validation::validate_text(abstract_text).map_validation_err("abstract")?;
    }

    let paper_id = state.store.session().insert_paper(auth.user_id, &new)?;
    info!(user_id = auth.user_id, paper_id, "research paper created");

    Ok(Json(PaperCreatedResponse {
        message: "Research paper created".to_string(),
        paper_id,
    }))
}

/// PUT /api/v1/research/update-paper/{id} - owner or admin.
pub async fn update_paper(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(paper_id): Path<i64>,
    Json(changes): Json<PaperChanges>,
) -> Result<Json<PaperMessageResponse>, AppError> {
    if let Some(title) = &changes.title {
        validation::validate_title(title).map_validation_err("title")?;
    }

    let session = state.store.session();
    let existing = session
        .paper_by_id(paper_id)?
        .ok_or(AppError::RecordNotFound {
            entity: "Research paper",
            id: paper_id,
        })?;

    if auth.role != Role::Admin && existing.user_id != auth.user_id {
        return Err(AppError::Forbidden("not the record owner".to_string()));
    }

    session.update_paper(paper_id, &changes)?;
    Ok(Json(PaperMessageResponse {
        message: "Research paper updated".to_string(),
    }))
}

/// DELETE /api/v1/research/delete-paper/{id} - admin only.
pub async fn delete_paper(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(paper_id): Path<i64>,
) -> Result<Json<PaperMessageResponse>, AppError> {
    auth.require_admin()?;

    if !state.store.session().delete_paper(paper_id)? {
        return Err(AppError::RecordNotFound {
            entity: "Research paper",
            id: paper_id,
        });
    }
    info!(paper_id, "research paper deleted");

    Ok(Json(PaperMessageResponse {
        message: "Research paper deleted".to_string(),
    }))
}

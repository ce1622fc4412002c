//! Innovation entry CRUD handlers.

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
use crate::models::Innovation;
use crate::store::innovation::{InnovationChanges, NewInnovation};
use crate::validation::{self, ValidationErrorExt};

#[derive(Debug, Serialize)]
pub struct InnovationCreatedResponse {
    pub message: String,
    pub innovation_id: i64,
}

#[derive(Debug, Serialize)]
pub struct InnovationMessageResponse {
    pub message: String,
}

/// GET /api/v1/innovation/ - admin sees all entries, users their own.
pub async fn list_innovations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Innovation>>, AppError> {
    let session = state.store.session();
    let innovations = if auth.role == Role::Admin {
        session.innovations_all()?
    } else {
        session.innovations_by_user(auth.user_id)?
    };
    Ok(Json(innovations))
}

/// POST /api/v1/innovation/add-innovation
pub async fn add_innovation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(new): Json<NewInnovation>,
) -> Result<Json<InnovationCreatedResponse>, AppError> {
    validation::validate_title(&new.title).map_validation_err("title")?;
    if let Some(description) = &new.description {
        validation::validate_text(description).map_validation_err("description")?;
    }

    let innovation_id = state
        .store
        .session()
        .insert_innovation(Some(auth.user_id), &new)?;
    info!(user_id = auth.user_id, innovation_id, "innovation created");

    Ok(Json(InnovationCreatedResponse {
        message: "Innovation record created".to_string(),
        innovation_id,
    }))
}

/// PUT /api/v1/innovation/update-innovation/{id} - owner or admin.
pub async fn update_innovation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(innovation_id): Path<i64>,
    Json(changes): Json<InnovationChanges>,
) -> Result<Json<InnovationMessageResponse>, AppError> {
    if let Some(title) = &changes.title {
        validation::validate_title(title).map_validation_err("title")?;
    }

    let session = state.store.session();
    let existing = session
        .innovation_by_id(innovation_id)?
        .ok_or(AppError::RecordNotFound {
            entity: "Innovation",
            id: innovation_id,
        })?;

    if auth.role != Role::Admin && existing.user_id != Some(auth.user_id) {
        return Err(AppError::Forbidden("not the record owner".to_string()));
    }

    session.update_innovation(innovation_id, &changes)?;
    Ok(Json(InnovationMessageResponse {
        message: "Innovation record updated".to_string(),
    }))
}

/// DELETE /api/v1/innovation/delete-innovation/{id} - admin only.
pub async fn delete_innovation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(innovation_id): Path<i64>,
) -> Result<Json<InnovationMessageResponse>, AppError> {
    auth.require_admin()?;

    if !state.store.session().delete_innovation(innovation_id)? {
        return Err(AppError::RecordNotFound {
            entity: "Innovation",
            id: innovation_id,
        });
    }
    info!(innovation_id, "innovation deleted");

    Ok(Json(InnovationMessageResponse {
        message: "Innovation record deleted".to_string(),
    }))
}

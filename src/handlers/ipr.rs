//! IPR filing CRUD handlers.
//!
//! Role rules: users see and edit their own filings, admins see and edit
//! everything, deletion is admin-only.

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
use crate::models::Ipr;
use crate::store::ipr::{IprChanges, NewIpr};
use crate::validation::{self, ValidationErrorExt};

#[derive(Debug, Serialize)]
pub struct IprCreatedResponse {
    pub message: String,
    pub ipr_id: i64,
}

#[derive(Debug, Serialize)]
pub struct IprMessageResponse {
    pub message: String,
}

/// GET /api/v1/ipr/ - admin sees all records, users their own.
pub async fn list_iprs(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Ipr>>, AppError> {
    let session = state.store.session();
    let iprs = if auth.role == Role::Admin {
        session.iprs_all()?
    } else {
        session.iprs_by_user(auth.user_id)?
    };
    Ok(Json(iprs))
}

/// POST /api/v1/ipr/add-ipr
pub async fn add_ipr(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(new): Json<NewIpr>,
) -> Result<Json<IprCreatedResponse>, AppError> {
    validation::validate_title(&new.title).map_validation_err("title")?;

    let ipr_id = state.store.session().insert_ipr(auth.user_id, &new)?;
    info!(user_id = auth.user_id, ipr_id, "IPR record created");

    Ok(Json(IprCreatedResponse {
        message: "IPR record created".to_string(),
        ipr_id,
    }))
}

/// PUT /api/v1/ipr/update-ipr/{id} - owner or admin.
pub async fn update_ipr(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(ipr_id): Path<i64>,
    Json(changes): Json<IprChanges>,
) -> Result<Json<IprMessageResponse>, AppError> {
    if let Some(title) = &changes.title {
        validation::validate_title(title).map_validation_err("title")?;
    }

    let session = state.store.session();
    let existing = session
        .ipr_by_id(ipr_id)?
        .ok_or(AppError::RecordNotFound {
            entity: "IPR",
            id: ipr_id,
        })?;

    if auth.role != Role::Admin && existing.user_id != auth.user_id {
        return Err(AppError::Forbidden("not the record owner".to_string()));
    }

    session.update_ipr(ipr_id, &changes)?;
    Ok(Json(IprMessageResponse {
        message: "IPR record updated".to_string(),
    }))
}

/// DELETE /api/v1/ipr/delete-ipr/{id} - admin only.
pub async fn delete_ipr(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(ipr_id): Path<i64>,
) -> Result<Json<IprMessageResponse>, AppError> {
    auth.require_admin()?;

    if !state.store.session().delete_ipr(ipr_id)? {
        return Err(AppError::RecordNotFound {
            entity: "IPR",
            id: ipr_id,
        });
    }
    info!(ipr_id, "IPR record deleted");

    Ok(Json(IprMessageResponse {
        message: "IPR record deleted".to_string(),
    }))
}

//! Startup venture CRUD handlers.

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
use crate::models::Startup;
use crate::store::startup::{NewStartup, StartupChanges};
use crate::validation::{self, ValidationErrorExt};

#[derive(Debug, Serialize)]
pub struct StartupCreatedResponse {
    pub message: String,
    pub startup_id: i64,
}

#[derive(Debug, Serialize)]
pub struct StartupMessageResponse {
    pub message: String,
}

/// GET /api/v1/startup/ - admin sees all ventures, users their own.
pub async fn list_startups(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Startup>>, AppError> {
    let session = state.store.session();
    let startups = if auth.role == Role::Admin {
        session.startups_all()?
    } else {
        session.startups_by_user(auth.user_id)?
    };
    Ok(Json(startups))
}

/// POST /api/v1/startup/add-startup
pub async fn add_startup(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(new): Json<NewStartup>,
) -> Result<Json<StartupCreatedResponse>, AppError> {
    validation::validate_title(&new.name).map_validation_err("name")?;
    if let Some(description) = &new.description {
        validation::validate_text(description).map_validation_err("description")?;
    }

    let startup_id = state
        .store
        .session()
        .insert_startup(Some(auth.user_id), &new)?;
    info!(user_id = auth.user_id, startup_id, "startup created");

    Ok(Json(StartupCreatedResponse {
        message: "Startup record created".to_string(),
        startup_id,
    }))
}

/// PUT /api/v1/startup/update-startup/{id} - owner or admin.
pub async fn update_startup(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(startup_id): Path<i64>,
    Json(changes): Json<StartupChanges>,
) -> Result<Json<StartupMessageResponse>, AppError> {
    if let Some(name) = &changes.name {
        validation::validate_title(name).map_validation_err("name")?;
    }

    let session = state.store.session();
    let existing = session
        .startup_by_id(startup_id)?
        .ok_or(AppError::RecordNotFound {
            entity: "Startup",
            id: startup_id,
        })?;

    if auth.role != Role::Admin && existing.user_id != Some(auth.user_id) {
        return Err(AppError::Forbidden("not the record owner".to_string()));
    }

    session.update_startup(startup_id, &changes)?;
    Ok(Json(StartupMessageResponse {
        message: "Startup record updated".to_string(),
    }))
}

/// DELETE /api/v1/startup/delete-startup/{id} - admin only.
pub async fn delete_startup(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(startup_id): Path<i64>,
) -> Result<Json<StartupMessageResponse>, AppError> {
    auth.require_admin()?;

    if !state.store.session().delete_startup(startup_id)? {
        return Err(AppError::RecordNotFound {
            entity: "Startup",
            id: startup_id,
        });
    }
    info!(startup_id, "startup deleted");

    Ok(Json(StartupMessageResponse {
        message: "Startup record deleted".to_string(),
    }))
}

//! User account handlers: signup, profile, scholar metrics, admin listing.

use axum::{extract::State, http::StatusCode, response::Json, Extension};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::router::AppState;
use crate::auth::{AuthUser, Role};
use crate::errors::AppError;
use crate::models::User;
use crate::scholar::ScholarMetrics;
use crate::store::users::ProfileChanges;
use crate::validation::{self, ValidationErrorExt};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    /// Defaults to `user`; the provider-side account is created separately.
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user_id: i64,
}

/// POST /api/v1/users/signup - create the local account row.
///
/// Credential creation and email verification stay with the external identity
/// provider; this only registers the portal-side profile.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    validation::validate_name(&request.name).map_validation_err("name")?;
    validation::validate_email(&request.email).map_validation_err("email")?;

    let session = state.store.session();
    if session.user_by_email(&request.email)?.is_some() {
        return Err(AppError::UserAlreadyExists(request.email));
    }

    let role = request.role.unwrap_or(Role::User);
    let user_id = session.insert_user(&request.name, &request.email, role)?;
    info!(user_id, email = %request.email, "user created");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully. Please check your email to verify.".to_string(),
            user_id,
        }),
    ))
}

/// GET /api/v1/users/me - the authenticated user's profile.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<User>, AppError> {
    let user = state
        .store
        .session()
        .user_by_id(auth.user_id)?
        .ok_or_else(|| AppError::UserNotFound(auth.email.clone()))?;
    Ok(Json(user))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// PUT /api/v1/users/update-profile - partial profile update.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(changes): Json<ProfileChanges>,
) -> Result<Json<MessageResponse>, AppError> {
    if let Some(name) = &changes.name {
        validation::validate_name(name).map_validation_err("name")?;
    }

    let updated = state.store.session().update_profile(auth.user_id, &changes)?;
    if !updated {
        return Err(AppError::UserNotFound(auth.email));
    }

    Ok(Json(MessageResponse {
        message: "Profile updated".to_string(),
    }))
}

/// POST /api/v1/users/refresh-scholar-metrics - pull h-index, i10-index and
/// citation count from the scholar service and persist them.
pub async fn refresh_scholar_metrics(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ScholarMetrics>, AppError> {
    // Session scoped tightly: never held across the outbound call.
    let scholar_id = {
        let session = state.store.session();
        session
            .user_by_id(auth.user_id)?
            .ok_or_else(|| AppError::UserNotFound(auth.email.clone()))?
            .scholar_id
            .ok_or_else(|| AppError::InvalidInput {
                field: "scholar_id".to_string(),
                reason: "no scholar id on profile".to_string(),
            })?
    };

    let metrics = state.scholar.fetch_metrics(&scholar_id).await?;

    state
        .store
        .session()
        .set_scholar_metrics(auth.user_id, &metrics)?;
    info!(user_id = auth.user_id, h_index = metrics.h_index, "scholar metrics refreshed");

    Ok(Json(metrics))
}

/// GET /api/v1/users - admin-only account listing.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<User>>, AppError> {
    auth.require_admin()?;
    let users = state.store.session().all_users()?;
    Ok(Json(users))
}

//! PDF export handlers.
//!
//! The export pipeline (store queries, chart rendering, PDF layout) is fully
//! blocking, so each request runs on the blocking thread pool. The response
//! is either a complete PDF buffer or an error - never a partial stream.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Extension,
};
use tracing::info;

use super::router::AppState;
use super::state::PortalState;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::metrics;
use crate::report::{self, ExportOutput};

async fn run_export<F>(state: AppState, kind: &'static str, job: F) -> Result<ExportOutput, AppError>
where
    F: FnOnce(&PortalState) -> Result<ExportOutput, AppError> + Send + 'static,
{
    let timer = metrics::EXPORT_DURATION.start_timer();
    let result = tokio::task::spawn_blocking(move || job(&state))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("export task failed: {e}")))?;
    timer.observe_duration();

    let outcome = if result.is_ok() { "ok" } else { "error" };
    metrics::EXPORT_TOTAL.with_label_values(&[kind, outcome]).inc();
    result
}

fn pdf_response(output: ExportOutput) -> impl IntoResponse {
    info!(filename = %output.filename, bytes = output.bytes.len(), "report exported");
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", output.filename),
            ),
        ],
        output.bytes,
    )
}

/// GET /api/v1/export/user - the authenticated user's own report.
pub async fn export_self_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = auth.user_id;
    let output = run_export(state, "self", move |portal| {
        let session = portal.store.session();
        report::export_self(&session, user_id)
    })
    .await?;
    Ok(pdf_response(output))
}

/// GET /api/v1/export/admin/user/{email} - admin export of one user.
pub async fn export_user_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let role = auth.role;
    let output = run_export(state, "user", move |portal| {
        let session = portal.store.session();
        report::export_user(&session, &email, role)
    })
    .await?;
    Ok(pdf_response(output))
}

/// GET /api/v1/export/admin/all - admin export of every regular user.
pub async fn export_all_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let role = auth.role;
    let output = run_export(state, "all", move |portal| {
        let session = portal.store.session();
        report::export_all(&session, role)
    })
    .await?;
    Ok(pdf_response(output))
}

//! Router configuration - centralized route definitions.
//!
//! Routes are split into public (no auth) and protected (auth required).
//! The auth middleware and any limiting layers are applied by the caller so
//! tests can mirror the production wiring exactly.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use super::state::PortalState;
use super::{export, health, innovation, ipr, research, startup, users};

/// Application state type alias
pub type AppState = Arc<PortalState>;

/// Build the public routes (no authentication required).
///
/// Health and metrics must stay reachable for probes and scraping; signup is
/// public because the account does not exist yet when it is called.
pub fn build_public_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics_endpoint))
        .route("/api/v1/users/signup", post(users::signup))
        .with_state(state)
}

/// Build the protected API routes (authentication required).
pub fn build_protected_routes(state: AppState) -> Router {
    Router::new()
        // =================================================================
        // USERS
        // =================================================================
        .route("/api/v1/users", get(users::list_users))
        .route("/api/v1/users/me", get(users::me))
        .route("/api/v1/users/update-profile", put(users::update_profile))
        .route(
            "/api/v1/users/refresh-scholar-metrics",
            post(users::refresh_scholar_metrics),
        )
        // =================================================================
        // IPR FILINGS
        // =================================================================
        .route("/api/v1/ipr/", get(ipr::list_iprs))
        .route("/api/v1/ipr/add-ipr", post(ipr::add_ipr))
        .route("/api/v1/ipr/update-ipr/{ipr_id}", put(ipr::update_ipr))
        .route("/api/v1/ipr/delete-ipr/{ipr_id}", delete(ipr::delete_ipr))
        // =================================================================
        // RESEARCH PAPERS
        // =================================================================
        .route("/api/v1/research/", get(research::list_papers))
        .route("/api/v1/research/add-paper", post(research::add_paper))
        .route(
            "/api/v1/research/update-paper/{paper_id}",
            put(research::update_paper),
        )
        .route(
            "/api/v1/research/delete-paper/{paper_id}",
            delete(research::delete_paper),
        )
        // =================================================================
        // INNOVATIONS
        // =================================================================
        .route("/api/v1/innovation/", get(innovation::list_innovations))
        .route(
            "/api/v1/innovation/add-innovation",
            post(innovation::add_innovation),
        )
        .route(
            "/api/v1/innovation/update-innovation/{innovation_id}",
            put(innovation::update_innovation),
        )
        .route(
            "/api/v1/innovation/delete-innovation/{innovation_id}",
            delete(innovation::delete_innovation),
        )
        // =================================================================
        // STARTUPS
        // =================================================================
        .route("/api/v1/startup/", get(startup::list_startups))
        .route("/api/v1/startup/add-startup", post(startup::add_startup))
        .route(
            "/api/v1/startup/update-startup/{startup_id}",
            put(startup::update_startup),
        )
        .route(
            "/api/v1/startup/delete-startup/{startup_id}",
            delete(startup::delete_startup),
        )
        // =================================================================
        // PDF EXPORTS
        // =================================================================
        .route("/api/v1/export/user", get(export::export_self_report))
        .route(
            "/api/v1/export/admin/user/{email}",
            get(export::export_user_report),
        )
        .route("/api/v1/export/admin/all", get(export::export_all_report))
        .with_state(state)
}

/// Build the complete router with both public and protected routes.
///
/// Note: this does NOT apply the auth middleware or limiting layers; the
/// caller (main.rs or a test harness) wires those.
pub fn build_router(state: AppState) -> Router {
    let public = build_public_routes(state.clone());
    let protected = build_protected_routes(state);

    Router::new().merge(public).merge(protected)
}

//! HTTP API handlers - modular organization of the REST API.
//!
//! Each submodule handles one domain of functionality.

// Core modules
pub mod router;
pub mod state;

// Health and infrastructure
pub mod health;

// Accounts
pub mod users;

// Contribution CRUD
pub mod innovation;
pub mod ipr;
pub mod research;
pub mod startup;

// PDF exports
pub mod export;

// Re-export commonly used items
pub use router::{build_protected_routes, build_public_routes, build_router, AppState};
pub use state::PortalState;

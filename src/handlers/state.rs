//! Shared application state handed to every handler.

use anyhow::Result;

use crate::auth::IdentityGate;
use crate::config::ServerConfig;
use crate::scholar::ScholarClient;
use crate::store::RecordStore;

/// Everything a request needs: the record store, the identity gate and the
/// scholar-metrics client, plus the effective configuration.
pub struct PortalState {
    pub store: RecordStore,
    pub gate: IdentityGate,
    pub scholar: ScholarClient,
    pub config: ServerConfig,
}

impl PortalState {
    /// Production wiring: store at the configured path, gate and scholar
    /// client from the environment.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let store = RecordStore::open(&config.database_path)?;
        Ok(Self {
            store,
            gate: IdentityGate::from_env(),
            scholar: ScholarClient::from_env(),
            config,
        })
    }

    /// Explicit wiring for tests: in-memory store, static token table.
    pub fn with_parts(store: RecordStore, gate: IdentityGate, config: ServerConfig) -> Self {
        Self {
            store,
            gate,
            scholar: ScholarClient::from_env(),
            config,
        }
    }
}

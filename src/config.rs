//! Configuration management for the portal backend.
//!
//! All configurable parameters in one place with environment variable
//! overrides. Sensible defaults for development, everything tunable in
//! production via `RIISE_*` variables.

use std::env;
use std::path::PathBuf;
use tracing::info;

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins (empty = allow all)
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
        }
    }
}

impl CorsConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(origins) = env::var("RIISE_CORS_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        let is_production = env::var("RIISE_ENV")
            .map(|v| {
                let v = v.to_lowercase();
                v == "production" || v == "prod"
            })
            .unwrap_or(false);

        if is_production && config.allowed_origins.is_empty() {
            tracing::warn!(
                "PRODUCTION WARNING: CORS allows all origins. Set RIISE_CORS_ORIGINS for security."
            );
        }

        config
    }

    /// Convert to a tower-http CorsLayer.
    pub fn to_layer(&self) -> tower_http::cors::CorsLayer {
        use tower_http::cors::{AllowOrigin, Any, CorsLayer};

        let layer = CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any);

        if self.allowed_origins.is_empty() {
            return layer.allow_origin(Any);
        }

        let mut valid_origins = Vec::new();
        for origin_str in &self.allowed_origins {
            match origin_str.parse::<axum::http::HeaderValue>() {
                Ok(origin) => valid_origins.push(origin),
                Err(_) => tracing::warn!("CORS: invalid origin '{}' - skipping", origin_str),
            }
        }

        // All configured origins unparseable is a config error; deny rather
        // than fall back to permissive.
        layer.allow_origin(AllowOrigin::list(valid_origins))
    }
}

/// Server configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Max in-flight requests before new ones queue
    pub max_concurrent_requests: usize,
    /// CORS settings
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
            database_path: PathBuf::from("./riise_data/riise.db"),
            max_concurrent_requests: 64,
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = env::var("RIISE_HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("RIISE_PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }
        if let Ok(path) = env::var("RIISE_DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }
        if let Ok(n) = env::var("RIISE_MAX_CONCURRENT_REQUESTS") {
            if let Ok(n) = n.parse() {
                config.max_concurrent_requests = n;
            }
        }
        config.cors = CorsConfig::from_env();

        config
    }

    /// Log the effective configuration at startup.
    pub fn log(&self) {
        info!("Configuration:");
        info!("  bind: {}:{}", self.host, self.port);
        info!("  database: {:?}", self.database_path);
        info!("  max concurrent requests: {}", self.max_concurrent_requests);
        if self.cors.allowed_origins.is_empty() {
            info!("  CORS: all origins");
        } else {
            info!("  CORS origins: {:?}", self.cors.allowed_origins);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8090);
        assert!(config.cors.allowed_origins.is_empty());
    }

    #[test]
    fn test_cors_layer_builds_with_origins() {
        let config = CorsConfig {
            allowed_origins: vec!["https://portal.riise.edu".to_string()],
        };
        // Should not panic on valid origins.
        let _layer = config.to_layer();
    }
}

//! Session authentication and role gating.
//!
//! Session issuance lives with the external identity provider; this module
//! only resolves a bearer credential to a provider identity, joins it against
//! the local users table and injects the resulting [`AuthUser`] into the
//! request extensions. Role checks are explicit capability calls on
//! [`AuthUser`], not string comparisons.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::errors::AppError;
use crate::handlers::AppState;

/// Closed role set. Anything else in the store is a data bug, surfaced as an
/// invalid credential rather than silently granted user rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated identity injected into request extensions by
/// [`auth_middleware`]. Handlers trust this tuple without re-validation.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,
}

impl AuthUser {
    /// Explicit capability check for admin-only operations.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("insufficient role".to_string()))
        }
    }
}

/// Identity returned by the external provider for a valid session token.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderIdentity {
    pub email: String,
}

/// Client for the external identity provider.
///
/// `Remote` asks the provider to resolve the token over HTTP. `Fixed` is a
/// static token table for development and tests, mirroring the dev-key
/// fallback used when no provider is configured.
pub enum IdentityGate {
    Remote(RemoteIdentity),
    Fixed(HashMap<String, ProviderIdentity>),
}

pub struct RemoteIdentity {
    client: reqwest::Client,
    auth_url: String,
}

impl IdentityGate {
    /// Build from environment. `RIISE_AUTH_URL` selects the remote provider;
    /// without it the gate falls back to `RIISE_DEV_TOKENS`
    /// (`token=email,token=email`), which is for development only.
    pub fn from_env() -> Self {
        match std::env::var("RIISE_AUTH_URL") {
            Ok(url) if !url.trim().is_empty() => IdentityGate::Remote(RemoteIdentity {
                client: reqwest::Client::new(),
                auth_url: url.trim().trim_end_matches('/').to_string(),
            }),
            _ => {
                tracing::warn!(
                    "RIISE_AUTH_URL not set - using static dev tokens (not for production!)"
                );
                let tokens = std::env::var("RIISE_DEV_TOKENS").unwrap_or_default();
                IdentityGate::fixed(tokens.split(',').filter_map(|pair| {
                    let (token, email) = pair.split_once('=')?;
                    Some((token.trim().to_string(), email.trim().to_string()))
                }))
            }
        }
    }

    /// Static token table, used by tests and the dev fallback.
    pub fn fixed<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        IdentityGate::Fixed(
            pairs
                .into_iter()
                .map(|(token, email)| (token, ProviderIdentity { email }))
                .collect(),
        )
    }

    /// Resolve a session token to the provider identity.
    pub async fn resolve(&self, token: &str) -> Result<ProviderIdentity, AppError> {
        match self {
            IdentityGate::Fixed(tokens) => tokens
                .get(token)
                .cloned()
                .ok_or_else(|| AppError::InvalidCredential("unknown token".to_string())),
            IdentityGate::Remote(remote) => remote.resolve(token).await,
        }
    }
}

impl RemoteIdentity {
    async fn resolve(&self, token: &str) -> Result<ProviderIdentity, AppError> {
        let response = self
            .client
            .get(format!("{}/user", self.auth_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::InvalidCredential(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::InvalidCredential(format!(
                "provider returned {}",
                response.status()
            )));
        }

        response
            .json::<ProviderIdentity>()
            .await
            .map_err(|e| AppError::InvalidCredential(e.to_string()))
    }
}

/// Pull the session token from `Authorization: Bearer ...` or the
/// `access_token` cookie, in that order.
fn extract_token(headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|cookie| {
        let (name, value) = cookie.trim().split_once('=')?;
        (name == "access_token").then(|| value.trim().to_string())
    })
}

/// Authentication middleware for protected routes.
///
/// Resolves the credential with the identity gate, then loads the matching
/// user row so downstream handlers get the local `user_id` and role.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_token(request.headers()) {
        Some(token) => token,
        None => return AppError::MissingCredential.into_response(),
    };

    let identity = match state.gate.resolve(&token).await {
        Ok(identity) => identity,
        Err(e) => return e.into_response(),
    };

    // Store session is scoped: released before the request runs.
    let auth_user = {
        let session = state.store.session();
        match session.user_by_email(&identity.email) {
            Ok(Some(user)) => AuthUser {
                user_id: user.user_id,
                email: user.email,
                role: user.role,
                is_verified: user.is_verified,
            },
            Ok(None) => {
                return AppError::UserNotFound(identity.email).into_response();
            }
            Err(e) => return AppError::from(e).into_response(),
        }
    };

    request.extensions_mut().insert(auth_user);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::Admin.as_str(), "admin");
    }

    #[test]
    fn test_require_admin() {
        let admin = AuthUser {
            user_id: 1,
            email: "head@riise.edu".to_string(),
            role: Role::Admin,
            is_verified: true,
        };
        let user = AuthUser {
            user_id: 2,
            email: "member@riise.edu".to_string(),
            role: Role::User,
            is_verified: true,
        };

        assert!(admin.require_admin().is_ok());
        assert!(user.require_admin().is_err());
    }

    #[tokio::test]
    async fn test_fixed_gate_resolution() {
        let gate = IdentityGate::fixed([(
            "tok-1".to_string(),
            "member@riise.edu".to_string(),
        )]);

        let identity = gate.resolve("tok-1").await.unwrap();
        assert_eq!(identity.email, "member@riise.edu");
        assert!(gate.resolve("tok-2").await.is_err());
    }

    #[test]
    fn test_extract_token_prefers_bearer() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        headers.insert(header::COOKIE, "access_token=xyz".parse().unwrap());
        assert_eq!(extract_token(&headers), Some("abc".to_string()));

        headers.remove(header::AUTHORIZATION);
        assert_eq!(extract_token(&headers), Some("xyz".to_string()));

        headers.remove(header::COOKIE);
        assert_eq!(extract_token(&headers), None);
    }
}

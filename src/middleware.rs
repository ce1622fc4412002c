//! HTTP request tracking middleware for observability.

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use std::time::Instant;

/// Middleware to track HTTP request latency and counts
pub async fn track_metrics(req: Request, next: Next) -> Result<Response, StatusCode> {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    // Normalize path to avoid high cardinality (group dynamic IDs)
    let normalized_path = normalize_path(&path);

    crate::metrics::HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &normalized_path, &status])
        .observe(duration);

    crate::metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &normalized_path, &status])
        .inc();

    Ok(response)
}

/// Normalize path to prevent metric cardinality explosion:
/// /api/v1/ipr/update-ipr/42 -> /api/v1/ipr/update-ipr/{id}
/// /api/v1/export/admin/user/a@b.edu -> /api/v1/export/admin/user/{email}
fn normalize_path(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').collect();
    let mut normalized = Vec::new();

    for part in parts {
        if part.is_empty() {
            continue;
        }

        if part.contains('@') {
            normalized.push("{email}");
        } else if !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()) {
            normalized.push("{id}");
        } else {
            normalized.push(part);
        }
    }

    format!("/{}", normalized.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("/api/v1/ipr/update-ipr/42"),
            "/api/v1/ipr/update-ipr/{id}"
        );
        assert_eq!(
            normalize_path("/api/v1/export/admin/user/asha@riise.edu"),
            "/api/v1/export/admin/user/{email}"
        );
        assert_eq!(normalize_path("/health"), "/health");
    }
}

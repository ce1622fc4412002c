//! Client for the external scholarly-metrics service.
//!
//! The portal only needs the three headline numbers for a profile; the
//! service is treated as a black box that maps a scholar id to them.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScholarMetrics {
    pub h_index: i64,
    pub i10_index: i64,
    pub total_citations: i64,
}

pub struct ScholarClient {
    client: reqwest::Client,
    api_url: String,
}

impl ScholarClient {
    const DEFAULT_API_URL: &'static str = "https://scholar-metrics.riise.edu/api/v1/author";

    pub fn from_env() -> Self {
        let api_url = std::env::var("RIISE_SCHOLAR_API_URL")
            .unwrap_or_else(|_| Self::DEFAULT_API_URL.to_string());
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Look up the metrics for one scholar id. Failures surface as 502 to the
    /// caller; nothing is cached or retried here.
    pub async fn fetch_metrics(&self, scholar_id: &str) -> Result<ScholarMetrics, AppError> {
        let response = self
            .client
            .get(format!("{}/{}", self.api_url, scholar_id))
            .send()
            .await
            .map_err(|e| AppError::ScholarUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::ScholarUnavailable(format!(
                "service returned {}",
                response.status()
            )));
        }

        response
            .json::<ScholarMetrics>()
            .await
            .map_err(|e| AppError::ScholarUnavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_deserialization() {
        let metrics: ScholarMetrics = serde_json::from_str(
            r#"{"h_index": 12, "i10_index": 18, "total_citations": 640}"#,
        )
        .unwrap();
        assert_eq!(metrics.h_index, 12);
        assert_eq!(metrics.total_citations, 640);
    }
}

//! Analysis engine client.

use async_trait::async_trait;

use marginwatch_core::config::AnalysisConfig;
use marginwatch_core::errors::AnalysisError;
use marginwatch_core::models::{AnalysisRequest, AnalysisResponse};
use marginwatch_core::traits::IAnalysisClient;

use crate::decode::decode_analysis_response;

/// Posts analysis requests as JSON.
///
/// Initial requests go to `{base}/analysis/initial`, rechecks to
/// `{base}/analysis/recheck`.
pub struct HttpAnalysisClient {
    http: reqwest::Client,
    config: AnalysisConfig,
}

impl HttpAnalysisClient {
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AnalysisError::Request {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { http, config })
    }

    pub fn endpoint(&self, request: &AnalysisRequest) -> String {
        let path = match request {
            AnalysisRequest::Initial { .. } => "initial",
            AnalysisRequest::Recheck { .. } => "recheck",
        };
        format!("{}/analysis/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn transport_error(&self, e: reqwest::Error) -> AnalysisError {
        if e.is_timeout() {
            AnalysisError::Timeout {
                after_secs: self.config.timeout_secs,
            }
        } else {
            AnalysisError::Request { reason: e.to_string() }
        }
    }
}

#[async_trait]
impl IAnalysisClient for HttpAnalysisClient {
    async fn submit(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, AnalysisError> {
        let resp = self
            .http
            .post(self.endpoint(request))
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        decode_analysis_response(&text)
    }

    fn name(&self) -> &str {
        "http-analysis"
    }
}

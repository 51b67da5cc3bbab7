//! Account feed client with lazy bearer-token authentication.

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Mutex;

use marginwatch_core::config::FeedConfig;
use marginwatch_core::errors::FeedError;
use marginwatch_core::models::AccountSnapshot;
use marginwatch_core::traits::IFeedClient;

use crate::decode::{decode_access_token, decode_accounts_body};

/// Fetches every LP account from the upstream data gateway.
///
/// The bearer token is obtained on first use and cached. A `401` drops it so
/// the next fetch logs in again.
pub struct HttpFeedClient {
    http: reqwest::Client,
    config: FeedConfig,
    token: Mutex<Option<String>>,
}

impl HttpFeedClient {
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| FeedError::Request {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    /// Log in and cache a fresh token.
    pub async fn authenticate(&self) -> Result<String, FeedError> {
        let credentials = self.config.credentials.as_ref().ok_or_else(|| FeedError::NotConfigured {
            what: "feed credentials (email, password, broker)".into(),
        })?;

        let body = serde_json::json!({
            "email": credentials.email,
            "password": credentials.password,
            "broker": credentials.broker,
        });
        let resp = self
            .http
            .post(self.config.auth_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.transport_error(e))?;
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(FeedError::Unauthorized),
            s if !s.is_success() => {
                return Err(FeedError::Status {
                    status: s.as_u16(),
                    body: text,
                })
            }
            _ => {}
        }

        let token = decode_access_token(&text)?;
        *self.token.lock().await = Some(token.clone());
        tracing::info!(url = %self.config.auth_url(), "authenticated with account feed");
        Ok(token)
    }

    async fn bearer(&self) -> Result<String, FeedError> {
        let cached = self.token.lock().await.clone();
        match cached {
            Some(token) => Ok(token),
            None => self.authenticate().await,
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> FeedError {
        if e.is_timeout() {
            FeedError::Timeout {
                after_secs: self.config.timeout_secs,
            }
        } else {
            FeedError::Request { reason: e.to_string() }
        }
    }
}

#[async_trait]
impl IFeedClient for HttpFeedClient {
    async fn fetch(&self) -> Result<Vec<AccountSnapshot>, FeedError> {
        let token = self.bearer().await?;
        let resp = self
            .http
            .get(self.config.accounts_url())
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            self.token.lock().await.take();
            tracing::warn!("feed token rejected; will re-authenticate on next fetch");
            return Err(FeedError::Unauthorized);
        }
        let text = resp.text().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let accounts = decode_accounts_body(&text)?;
        tracing::debug!(accounts = accounts.len(), "retrieved LP account data");
        Ok(accounts)
    }

    fn name(&self) -> &str {
        "http-feed"
    }
}

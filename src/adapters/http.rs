use crate::config::ServiceConfig;
use crate::domain::model::{RawStockResponse, SessionToken};
use crate::domain::ports::InventoryApi;
use crate::utils::error::{InventoryError, QueryErrorKind, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const FALLBACK_MESSAGE: &str = "Something went wrong";
pub const STOCK_FALLBACK_MESSAGE: &str = "Could not fetch stock data";

#[derive(Debug, Serialize)]
struct CredentialsRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct StockRequest<'a> {
    sku: &'a str,
    base: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP client for the inventory service's `/register`, `/login` and `/stock`.
#[derive(Debug, Clone)]
pub struct InventoryClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl InventoryClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("inventory-lookup/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InventoryError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            retry_attempts: config.retry_attempts,
            retry_delay: config.retry_delay(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn transport_message(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("request timed out after {}s", self.timeout.as_secs())
        } else if err.is_connect() {
            format!("could not connect to {}", self.base_url)
        } else {
            err.to_string()
        }
    }

    /// Err carries the server's message, or the fallback when it sent none.
    async fn post_credentials(
        &self,
        path: &str,
        username: &str,
        password: &str,
    ) -> std::result::Result<Response, String> {
        let url = self.endpoint(path);
        tracing::debug!("POST {} for user '{}'", url, username);

        let response = self
            .client
            .post(&url)
            .json(&CredentialsRequest { username, password })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("{} request failed: {}", path, self.transport_message(&e));
                FALLBACK_MESSAGE.to_string()
            })?;

        tracing::debug!("{} response status: {}", path, response.status());

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(server_message(response)
                .await
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_string()))
        }
    }

    async fn send_stock_request(
        &self,
        sku: &str,
        base: &str,
        token: Option<&SessionToken>,
    ) -> Result<RawStockResponse> {
        let url = self.endpoint("stock");
        tracing::debug!("POST {} sku='{}' base='{}'", url, sku, base);

        let mut request = self.client.post(&url).json(&StockRequest { sku, base });
        match token {
            Some(token) => request = request.bearer_auth(token.as_str()),
            None => tracing::debug!("No session token; sending stock query without credentials"),
        }

        let response = request
            .send()
            .await
            .map_err(|e| InventoryError::query(QueryErrorKind::Transport, self.transport_message(&e)))?;

        let status = response.status();
        tracing::debug!("/stock response status: {}", status);

        if !status.is_success() {
            let kind = classify_status(status);
            let message = server_message(response)
                .await
                .unwrap_or_else(|| STOCK_FALLBACK_MESSAGE.to_string());
            return Err(InventoryError::query(kind, message));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| InventoryError::query(QueryErrorKind::Transport, self.transport_message(&e)))?;

        serde_json::from_slice::<RawStockResponse>(&body).map_err(|e| InventoryError::DecodeError {
            endpoint: "/stock".to_string(),
            message: e.to_string(),
        })
    }
}

fn classify_status(status: StatusCode) -> QueryErrorKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => QueryErrorKind::Unauthorized,
        StatusCode::NOT_FOUND => QueryErrorKind::NotFound,
        _ => QueryErrorKind::Server,
    }
}

/// The `error` field of a failure body, if the server sent one.
async fn server_message(response: Response) -> Option<String> {
    let body = response.bytes().await.ok()?;
    serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
}

#[async_trait]
impl InventoryApi for InventoryClient {
    async fn register(&self, username: &str, password: &str) -> Result<()> {
        self.post_credentials("register", username, password)
            .await
            .map_err(|message| InventoryError::RegistrationError { message })?;

        tracing::info!("Registered user '{}'", username);
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<SessionToken> {
        let response = self
            .post_credentials("login", username, password)
            .await
            .map_err(|message| InventoryError::AuthenticationError { message })?;

        let body = response
            .bytes()
            .await
            .map_err(|e| InventoryError::AuthenticationError {
                message: self.transport_message(&e),
            })?;

        let login: LoginResponse =
            serde_json::from_slice(&body).map_err(|e| InventoryError::DecodeError {
                endpoint: "/login".to_string(),
                message: e.to_string(),
            })?;

        if login.token.is_empty() {
            return Err(InventoryError::DecodeError {
                endpoint: "/login".to_string(),
                message: "empty token".to_string(),
            });
        }

        tracing::info!("User '{}' logged in", username);
        Ok(SessionToken::new(login.token))
    }

    async fn query_stock(
        &self,
        sku: &str,
        base: &str,
        token: Option<&SessionToken>,
    ) -> Result<RawStockResponse> {
        let mut attempt = 0;
        loop {
            match self.send_stock_request(sku, base, token).await {
                Err(e)
                    if e.query_kind() == Some(QueryErrorKind::Transport)
                        && attempt < self.retry_attempts =>
                {
                    attempt += 1;
                    tracing::warn!(
                        "Stock query failed ({}), retry {}/{} in {:?}",
                        e,
                        attempt,
                        self.retry_attempts,
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                other => return other,
            }
        }
    }
}

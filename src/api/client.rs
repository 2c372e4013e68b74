//! Client for the provider REST API
//!
//! Handles the pre-browser half of the scenario: authenticating with the
//! client-credentials grant, creating the Smart Transaction, and reading the
//! final transaction status back.

use async_trait::async_trait;
use serde_json::Value;

use crate::common::config::{Credentials, TestConfig};
use crate::common::{Error, Result};

use super::types::{
    extract_checkout_url, extract_status, CreatedTransaction, SmartTransactionRequest,
    TokenResponse,
};
use super::Provision;

const USER_AGENT: &str = concat!("checkout-test-cli/", env!("CARGO_PKG_VERSION"));

/// Client for the provider REST API
pub struct ApiClient {
    http: reqwest::Client,
    auth_endpoint: String,
    transaction_endpoint: String,
    token: Option<String>,
}

impl ApiClient {
    /// Build a client from the resolved configuration
    pub fn new(config: &TestConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeouts.request_timeout())
            .build()?;

        Ok(Self {
            http,
            auth_endpoint: config.api.auth_endpoint(),
            transaction_endpoint: config.api.transaction_endpoint(),
            token: None,
        })
    }

    /// Read the body of a response, failing on a non-2xx status
    async fn ensure_2xx(method: &str, url: &str, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(Error::ApiRequest {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Config(format!("Invalid JSON from {method} {url}: {e}")))
    }
}

#[async_trait]
impl Provision for ApiClient {
    /// The bearer token is retained for subsequent requests.
    async fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        let payload = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];

        tracing::info!("API: authenticating");
        let response = self
            .http
            .post(&self.auth_endpoint)
            .form(&payload)
            .send()
            .await?;
        let body = Self::ensure_2xx("POST", &self.auth_endpoint, response).await?;

        let token_response: TokenResponse = serde_json::from_value(body.clone())?;
        let token = token_response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::TokenMissing(body.to_string()))?;

        tracing::info!("API: auth ok");
        self.token = Some(token);
        Ok(())
    }

    async fn create_transaction(
        &self,
        request: &SmartTransactionRequest,
    ) -> Result<CreatedTransaction> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| Error::Config("Not authenticated".to_string()))?;

        tracing::info!("API: creating transaction");
        let response = self
            .http
            .post(&self.transaction_endpoint)
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        let body = Self::ensure_2xx("POST", &self.transaction_endpoint, response).await?;

        let id = body
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::TransactionIdMissing(body.to_string()))?;

        let checkout_url =
            extract_checkout_url(&body).ok_or_else(|| Error::CheckoutUrlMissing(body.to_string()))?;

        tracing::info!(transaction = %id, url = %checkout_url, "API: transaction created");
        Ok(CreatedTransaction { id, checkout_url })
    }

    async fn transaction_status(&self, transaction_id: &str) -> Result<String> {
        let url = format!("{}{}", self.transaction_endpoint, transaction_id);

        let mut request = self.http.get(&url);
        if let Some(token) = self.token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let body = Self::ensure_2xx("GET", &url, response).await?;

        extract_status(&body).ok_or_else(|| {
            Error::Config(format!("Transaction status response has no status: {body}"))
        })
    }
}

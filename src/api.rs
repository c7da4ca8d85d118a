use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

const QUERY_PATH: &str = "/api/query";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Body returned by the query service for both successful and failed queries.
///
/// `response` is only meaningful when `success` is true and `error` only when
/// it is false; the service omits the other one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl QueryResponse {
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: Some(response.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error.into()),
        }
    }
}

/// Anything that can answer a query. The HTTP client is the real one; tests
/// plug in canned answers.
pub trait QueryBackend {
    fn query(
        &self,
        request: &QueryRequest,
    ) -> impl Future<Output = Result<QueryResponse, ApiError>> + Send;
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .context("building HTTP client for the query service")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn query_url(&self) -> String {
        format!("{}{}", self.base_url, QUERY_PATH)
    }

    pub async fn send(&self, request: QueryRequest) -> Result<QueryResponse, ApiError> {
        let url = self.query_url();

        tracing::debug!(%url, chars = request.query.chars().count(), "sending query");

        // `json` sets Content-Type: application/json
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        // The service reports failures as JSON bodies on 400/500, so the
        // status is only logged and the body is always parsed.
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "query service returned non-success status");
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            url,
            status: status.as_u16(),
            source,
        })
    }
}

impl QueryBackend for ApiClient {
    fn query(
        &self,
        request: &QueryRequest,
    ) -> impl Future<Output = Result<QueryResponse, ApiError>> + Send {
        self.send(request.clone())
    }
}

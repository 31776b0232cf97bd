//! HTTP GraphQL client for one upstream endpoint

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::core::{GraphQLExecutor, IndexerResult, UpstreamError};

/// Longest response body excerpt carried in a status error
const BODY_EXCERPT_LEN: usize = 512;

#[derive(Debug, Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    #[serde(default)]
    data: Value,
    #[serde(default)]
    errors: Option<Vec<GraphQLErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorEntry {
    #[serde(default)]
    message: String,
    #[serde(default)]
    path: Option<Vec<Value>>,
}

impl GraphQLErrorEntry {
    fn describe(&self) -> String {
        match &self.path {
            Some(path) if !path.is_empty() => {
                let path: Vec<String> = path
                    .iter()
                    .map(|segment| match segment {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                format!("{} (path: {})", self.message, path.join("."))
            }
            _ => self.message.clone(),
        }
    }
}

/// Build the HTTP client shared by every upstream endpoint
pub fn build_http_client(timeout: Duration) -> IndexerResult<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// One-shot executor bound to a single endpoint URL
#[derive(Debug, Clone)]
pub struct GraphQLClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl GraphQLClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            url: url.into(),
            api_key: api_key.filter(|key| !key.is_empty()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl GraphQLExecutor for GraphQLClient {
    async fn execute(&self, query: &str, variables: Value) -> IndexerResult<Value> {
        debug!(url = %self.url, "GraphQL request");

        let mut request = self
            .http
            .post(&self.url)
            .json(&GraphQLRequest { query, variables });
        if let Some(key) = &self.api_key {
            request = request.header("api-key", key);
        }

        let response = request.send().await.map_err(|e| UpstreamError::Transport {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| UpstreamError::Transport {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
                body: body.chars().take(BODY_EXCERPT_LEN).collect(),
            }
            .into());
        }

        let parsed: GraphQLResponse = serde_json::from_str(&body)?;
        if let Some(errors) = parsed.errors.filter(|errors| !errors.is_empty()) {
            let joined = errors
                .iter()
                .map(GraphQLErrorEntry::describe)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(UpstreamError::GraphQL(joined).into());
        }

        Ok(parsed.data)
    }
}

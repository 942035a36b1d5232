//! Mutation client
//!
//! [`MutationClient`] is what the HTTP layer depends on. [`ConvexHttpClient`]
//! implements it over the Convex HTTP API; one instance is built at startup
//! and shared by every request.

use crate::protocol::{FunctionArgs, MutationRequest, MutationResponse, decode_value};
use adrelay_core::{Error, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

/// Status used by the backend when the function itself failed
pub const STATUS_CODE_UDF_FAILED: u16 = 560;

/// A backend that can run named mutations
#[async_trait]
pub trait MutationClient: Send + Sync {
    /// Run the mutation at `path` with `args`, returning its result as
    /// plain JSON. Values with no JSON form (64-bit integers) are errors.
    async fn mutation(&self, path: &str, args: FunctionArgs) -> Result<Value>;
}

/// HTTP client for a Convex deployment
#[derive(Debug, Clone)]
pub struct ConvexHttpClient {
    url: String,
    client_id: String,
    http: reqwest::Client,
}

impl ConvexHttpClient {
    /// Create a client for the deployment at `url`
    pub fn new(url: &str) -> Result<Self> {
        Self::with_client_id(url, format!("adrelay-{}", adrelay_core::VERSION))
    }

    /// Create a client that identifies itself as `client_id`
    pub fn with_client_id(url: &str, client_id: impl Into<String>) -> Result<Self> {
        let url = validate_deployment_url(url)?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url,
            client_id: client_id.into(),
            http,
        })
    }

    /// Deployment URL, without trailing slash
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MutationClient for ConvexHttpClient {
    async fn mutation(&self, path: &str, args: FunctionArgs) -> Result<Value> {
        let endpoint = format!("{}/api/mutation", self.url);
        tracing::debug!("Calling mutation {} at {}", path, endpoint);

        let response = self
            .http
            .post(&endpoint)
            .header("Convex-Client", &self.client_id)
            .json(&MutationRequest::new(path, &args))
            .send()
            .await
            .map_err(|e| Error::Backend(format!("Request to {} failed: {}", endpoint, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Backend(format!("Failed to read response: {}", e)))?;

        if !status.is_success() && status.as_u16() != STATUS_CODE_UDF_FAILED {
            return Err(Error::Backend(format!("HTTP {}: {}", status, text)));
        }

        let parsed: MutationResponse = serde_json::from_str(&text)
            .map_err(|_| Error::Backend(format!("Invalid response: {}", text)))?;

        for line in parsed.log_lines() {
            tracing::debug!("[CONVEX M({})] {}", path, line);
        }

        match parsed {
            MutationResponse::Success { value, .. } => decode_value(value),
            MutationResponse::Error {
                error_message,
                error_data,
                ..
            } => Err(Error::Mutation {
                message: error_message,
                data: error_data,
            }),
        }
    }
}

/// Check that `url` points at a deployment's function API.
///
/// Returns the URL with any trailing slash removed.
fn validate_deployment_url(url: &str) -> Result<String> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(Error::Config(format!(
            "Invalid deployment address: Must start with \"https://\" or \"http://\". Found \"{}\".",
            url
        )));
    }

    let parsed = Url::parse(url)
        .map_err(|e| Error::Config(format!("Invalid deployment address: {} ({})", url, e)))?;

    if parsed
        .host_str()
        .is_some_and(|host| host.ends_with(".convex.site"))
    {
        return Err(Error::Config(format!(
            "Invalid deployment address: {} ends with .convex.site, which is used for HTTP Actions. \
             Deployment URLs typically end with .convex.cloud",
            url
        )));
    }

    Ok(url.trim_end_matches('/').to_string())
}

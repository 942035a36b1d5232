//! API route definitions

use crate::handlers::{self, HttpResponse};
use adrelay_convex::MutationClient;
use adrelay_core::{Error, Result};
use bytes::Bytes;
use http::header::{ALLOW, HeaderValue};
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, Limited};
use hyper::body::Body;
use std::sync::Arc;

/// Path of the extend-ad endpoint
pub const EXTEND_AD_PATH: &str = "/api/extendAd";

/// State shared by every request. Read-only once built.
#[derive(Clone)]
pub struct AppState {
    client: Arc<dyn MutationClient>,
    max_body_size: usize,
}

impl AppState {
    /// Create state around a backend client
    pub fn new(client: Arc<dyn MutationClient>, max_body_size: usize) -> Self {
        Self {
            client,
            max_body_size,
        }
    }

    /// Backend client
    pub fn client(&self) -> &dyn MutationClient {
        self.client.as_ref()
    }

    /// Largest request body accepted, in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }
}

/// Dispatch a request to its handler
pub async fn route<B>(req: Request<B>, state: &AppState) -> HttpResponse
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match (req.method(), req.uri().path()) {
        (&Method::POST, EXTEND_AD_PATH) => {
            match read_body(req.into_body(), state.max_body_size()).await {
                Ok(body) => handlers::extend_ad(state.client(), &body).await,
                Err(e) => handlers::into_response(Err(e)),
            }
        }
        (&Method::OPTIONS, EXTEND_AD_PATH) => {
            let mut response = handlers::response(StatusCode::NO_CONTENT, Bytes::new());
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("OPTIONS, POST"));
            response
        }
        (_, EXTEND_AD_PATH) => {
            let mut response =
                handlers::response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("OPTIONS, POST"));
            response
        }
        (&Method::GET, "/health") => handlers::health_check(),
        (&Method::GET, "/metrics") => handlers::export_metrics(),
        _ => handlers::response(StatusCode::NOT_FOUND, "Not Found"),
    }
}

/// Collect a request body, failing once it exceeds `limit` bytes
async fn read_body<B>(body: B, limit: usize) -> Result<Bytes>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    Limited::new(body, limit)
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| Error::Body(e.to_string()))
}

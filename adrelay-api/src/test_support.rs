//! Stub backends for handler and routing tests

use adrelay_convex::{FunctionArgs, MutationClient};
use adrelay_core::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http::Response;
use http_body_util::{BodyExt, Full};
use serde_json::Value;
use std::sync::Mutex;

type Responder = Box<dyn Fn(&FunctionArgs) -> Result<Value> + Send + Sync>;

/// Records every call and answers with a fixed closure
pub struct StubClient {
    responder: Responder,
    calls: Mutex<Vec<(String, FunctionArgs)>>,
}

impl StubClient {
    pub fn new(responder: impl Fn(&FunctionArgs) -> Result<Value> + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always returns `value`
    pub fn returning(value: Value) -> Self {
        Self::new(move |_| Ok(value.clone()))
    }

    /// Always fails with a mutation error carrying `message`
    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::new(move |_| {
            Err(Error::Mutation {
                message: message.clone(),
                data: None,
            })
        })
    }

    pub fn calls(&self) -> Vec<(String, FunctionArgs)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MutationClient for StubClient {
    async fn mutation(&self, path: &str, args: FunctionArgs) -> Result<Value> {
        self.calls.lock().unwrap().push((path.to_string(), args.clone()));
        (self.responder)(&args)
    }
}

/// Collect a response body as JSON
pub async fn body_json(response: Response<Full<Bytes>>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

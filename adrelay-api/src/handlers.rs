//! API request handlers

use crate::metrics;
use adrelay_convex::{FunctionArgs, MutationClient};
use adrelay_core::{Error, Result};
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Response, StatusCode};
use http_body_util::Full;
use serde_json::{Value, json};
use std::time::Instant;

/// Response type produced by every handler
pub type HttpResponse = Response<Full<Bytes>>;

/// Backend function that extends an ad
pub const EXTEND_AD_DURATION: &str = "ads:extendAdDuration";

/// Only message ever returned to callers when extending fails
pub const EXTEND_AD_ERROR: &str = "Failed to extend ad duration";

/// Fields forwarded from the request body to the mutation
const FORWARDED_FIELDS: [&str; 2] = ["id", "extensionDays"];

/// Handle POST /api/extendAd
///
/// Parses `body`, forwards `id` and `extensionDays` to the backend and
/// relays the result. Every failure becomes the same 500 response.
pub async fn extend_ad(client: &dyn MutationClient, body: &[u8]) -> HttpResponse {
    let result = match extract_args(body) {
        Ok(args) => {
            let start = Instant::now();
            let result = client.mutation(EXTEND_AD_DURATION, args).await;
            metrics::MUTATION_DURATION_SECONDS
                .with_label_values(&[metrics::outcome(&result)])
                .observe(start.elapsed().as_secs_f64());
            result
        }
        Err(e) => Err(e),
    };

    into_response(result)
}

/// Pull the forwarded fields out of a JSON body.
///
/// No validation happens here: fields missing from an object are omitted,
/// a non-object body yields empty args, and only `null` or invalid JSON
/// is an error.
pub fn extract_args(body: &[u8]) -> Result<FunctionArgs> {
    let value: Value = serde_json::from_slice(body)?;

    match value {
        Value::Null => Err(Error::Body(
            "Cannot read fields of a null body".to_string(),
        )),
        Value::Object(mut fields) => {
            let mut args = FunctionArgs::new();
            for name in FORWARDED_FIELDS {
                if let Some(field) = fields.remove(name) {
                    args.insert(name.to_string(), field);
                }
            }
            Ok(args)
        }
        _ => Ok(FunctionArgs::new()),
    }
}

/// Translate a mutation result into the HTTP response.
///
/// Success relays the value untouched with 200. Any error is logged and
/// replaced by the fixed error body with 500.
pub fn into_response(result: Result<Value>) -> HttpResponse {
    metrics::EXTEND_REQUESTS_TOTAL
        .with_label_values(&[metrics::outcome(&result)])
        .inc();

    match result {
        Ok(updated) => json_response(StatusCode::OK, &updated),
        Err(e) => {
            tracing::error!("Error extending ad: {}", e);
            extend_error_response()
        }
    }
}

fn extend_error_response() -> HttpResponse {
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &json!({ "error": EXTEND_AD_ERROR }),
    )
}

/// Handle GET /health
pub fn health_check() -> HttpResponse {
    json_response(StatusCode::OK, &json!({ "status": "healthy" }))
}

/// Handle GET /metrics
pub fn export_metrics() -> HttpResponse {
    let mut response = response(StatusCode::OK, metrics::gather());
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4"),
    );
    response
}

/// Build a JSON response
pub fn json_response(status: StatusCode, value: &Value) -> HttpResponse {
    let body = match serde_json::to_vec(value) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Failed to serialize response: {}", e);
            return response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(r#"{{"error":"{}"}}"#, EXTEND_AD_ERROR),
            );
        }
    };

    let mut response = response(status, body);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// Build a plain response
pub fn response(status: StatusCode, body: impl Into<Bytes>) -> HttpResponse {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubClient, body_json};

    #[tokio::test]
    async fn test_extend_success_relays_value() {
        let updated = json!({"id": "ad_123", "expiresAt": "2024-02-01"});
        let client = StubClient::returning(updated.clone());

        let resp = extend_ad(&client, br#"{"id": "ad_123", "extensionDays": 7}"#).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_json(resp).await, updated);

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "ads:extendAdDuration");
        assert_eq!(
            Value::Object(calls[0].1.clone()),
            json!({"id": "ad_123", "extensionDays": 7})
        );
    }

    #[tokio::test]
    async fn test_extend_failure_is_generic() {
        let client = StubClient::failing("not found");

        let resp = extend_ad(&client, br#"{"id": "missing", "extensionDays": 7}"#).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body, json!({"error": "Failed to extend ad duration"}));
        assert!(!body.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_extend_backend_error_is_generic() {
        let client =
            StubClient::new(|_| Err(Error::Backend("connection refused".to_string())));

        let resp = extend_ad(&client, br#"{"id": "ad_1", "extensionDays": 3}"#).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(resp).await,
            json!({"error": "Failed to extend ad duration"})
        );
    }

    #[tokio::test]
    async fn test_malformed_body_skips_backend() {
        let client = StubClient::returning(json!({}));

        let resp = extend_ad(&client, b"id=ad_123&extensionDays=7").await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(resp).await,
            json!({"error": "Failed to extend ad duration"})
        );
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_null_body_skips_backend() {
        let client = StubClient::returning(json!({}));

        let resp = extend_ad(&client, b"null").await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_null_result_is_relayed() {
        let client = StubClient::returning(Value::Null);

        let resp = extend_ad(&client, br#"{"id": "ad_123", "extensionDays": 7}"#).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, Value::Null);
    }

    #[test]
    fn test_extract_args_drops_unknown_fields() {
        let args =
            extract_args(br#"{"id": "ad_123", "extensionDays": -4, "owner": "eve"}"#).unwrap();
        assert_eq!(
            Value::Object(args),
            json!({"id": "ad_123", "extensionDays": -4})
        );
    }

    #[test]
    fn test_extract_args_omits_missing_fields() {
        let args = extract_args(br#"{"extensionDays": "seven"}"#).unwrap();
        assert_eq!(Value::Object(args), json!({"extensionDays": "seven"}));
    }

    #[test]
    fn test_extract_args_keeps_explicit_null() {
        let args = extract_args(br#"{"id": null}"#).unwrap();
        assert_eq!(Value::Object(args), json!({"id": null}));
    }

    #[test]
    fn test_extract_args_non_object_is_empty() {
        assert!(extract_args(b"[1, 2]").unwrap().is_empty());
        assert!(extract_args(b"42").unwrap().is_empty());
        assert!(extract_args(br#""ad_123""#).unwrap().is_empty());
    }

    #[test]
    fn test_extract_args_invalid_json() {
        assert!(matches!(extract_args(b"{"), Err(Error::Json(_))));
        assert!(matches!(extract_args(b""), Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn test_into_response_hides_error_detail() {
        let resp = into_response(Err(Error::Internal("stack trace at line 42".into())));

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body, json!({"error": "Failed to extend ad duration"}));
    }

    #[tokio::test]
    async fn test_health_check() {
        let resp = health_check();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"status": "healthy"}));
    }
}

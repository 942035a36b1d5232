//! Wire types for the Convex HTTP function API

use adrelay_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Arguments passed to a backend function. Always a JSON object.
pub type FunctionArgs = Map<String, Value>;

/// Argument encoding understood by `/api/mutation`
pub const FORMAT_CONVEX_ENCODED_JSON: &str = "convex_encoded_json";

/// Body of `POST /api/mutation`
#[derive(Debug, Serialize)]
pub struct MutationRequest<'a> {
    /// Function path, e.g. `ads:extendAdDuration`
    pub path: &'a str,
    pub format: &'static str,
    /// Positional arguments; functions take a single object
    pub args: [&'a FunctionArgs; 1],
}

impl<'a> MutationRequest<'a> {
    pub fn new(path: &'a str, args: &'a FunctionArgs) -> Self {
        Self {
            path,
            format: FORMAT_CONVEX_ENCODED_JSON,
            args: [args],
        }
    }
}

/// Body returned by `/api/mutation`
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MutationResponse {
    Success {
        /// Return value of the function; absent means `null`
        #[serde(default)]
        value: Value,
        #[serde(default, rename = "logLines")]
        log_lines: Vec<String>,
    },
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
        /// Structured payload of an application-level error
        #[serde(default, rename = "errorData")]
        error_data: Option<Value>,
        #[serde(default, rename = "logLines")]
        log_lines: Vec<String>,
    },
}

impl MutationResponse {
    /// Log lines emitted by the function while it ran
    pub fn log_lines(&self) -> &[String] {
        match self {
            MutationResponse::Success { log_lines, .. } => log_lines,
            MutationResponse::Error { log_lines, .. } => log_lines,
        }
    }
}

/// `$float` payload of negative zero (little-endian f64, base64)
const NEGATIVE_ZERO_FLOAT: &str = "AAAAAAAAAIA=";

/// Turn a `convex_encoded_json` value into the plain JSON the relay answers with.
///
/// `$integer` (a 64-bit integer) has no JSON form and is an error. `$float`
/// only carries non-finite numbers and `-0`, which become `null` and `0`.
/// `$bytes` becomes an empty object.
pub fn decode_value(value: Value) -> Result<Value> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(decode_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(fields) => {
            if fields.len() == 1 {
                if fields.contains_key("$integer") {
                    return Err(Error::Internal(
                        "Do not know how to serialize a 64-bit integer".to_string(),
                    ));
                }
                if let Some(encoded) = fields.get("$float") {
                    return Ok(if encoded.as_str() == Some(NEGATIVE_ZERO_FLOAT) {
                        json!(0)
                    } else {
                        Value::Null
                    });
                }
                if fields.contains_key("$bytes") {
                    return Ok(Value::Object(Map::new()));
                }
            }

            fields
                .into_iter()
                .map(|(key, field)| decode_value(field).map(|field| (key, field)))
                .collect::<Result<Map<_, _>>>()
                .map(Value::Object)
        }
        other => Ok(other),
    }
}

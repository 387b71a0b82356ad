//! StremThru SDK error types
//!
//! Transport failures (`Network`, `Timeout`) are kept apart from the
//! structured [`StremThruError`] built from every non-2xx response.

use reqwest::{header::HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::types::ResponseBody;

/// Maximum response body size accepted from the server (16 MB).
pub const MAX_RESPONSE_SIZE: usize = 16 * 1024 * 1024;

/// Error returned by every SDK call.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error(transparent)]
    Api(Box<StremThruError>),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Response too large ({size} bytes, max {MAX_RESPONSE_SIZE})")]
    ResponseTooLarge { size: u64 },
}

impl Error {
    /// The structured API error, if the server answered with a failure status.
    #[must_use]
    pub fn as_api_error(&self) -> Option<&StremThruError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the call failed before a response was received.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<StremThruError> for Error {
    fn from(err: StremThruError) -> Self {
        Self::Api(Box::new(err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for Error {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

/// Category of an API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "api_error")]
    Api,
    #[serde(rename = "store_error")]
    Store,
    #[serde(rename = "upstream_error")]
    Upstream,
    #[default]
    #[serde(rename = "unknown_error", other)]
    Unknown,
}

impl ErrorType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api_error",
            Self::Store => "store_error",
            Self::Unknown => "unknown_error",
            Self::Upstream => "upstream_error",
        }
    }
}

impl From<&str> for ErrorType {
    fn from(value: &str) -> Self {
        match value {
            "api_error" => Self::Api,
            "store_error" => Self::Store,
            "upstream_error" => Self::Upstream,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! error_codes {
    ($($variant:ident => $wire:literal, $status:expr;)+) => {
        /// Machine readable API error code.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum ErrorCode {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
            #[default]
            #[serde(rename = "UNKNOWN", other)]
            Unknown,
        }

        impl ErrorCode {
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    Self::Unknown => "UNKNOWN",
                    $(Self::$variant => $wire,)+
                }
            }

            /// HTTP status the server pairs with this code.
            #[must_use]
            pub const fn status_code(&self) -> Option<StatusCode> {
                match self {
                    Self::Unknown => None,
                    $(Self::$variant => $status,)+
                }
            }

            /// Code the server uses for a bare HTTP status, `UNKNOWN` if none.
            #[must_use]
            pub fn from_status(status: StatusCode) -> Self {
                $(
                    if $status == Some(status) {
                        return Self::$variant;
                    }
                )+
                Self::Unknown
            }
        }

        impl From<&str> for ErrorCode {
            fn from(value: &str) -> Self {
                match value {
                    $($wire => Self::$variant,)+
                    _ => Self::Unknown,
                }
            }
        }
    };
}

error_codes! {
    BadGateway => "BAD_GATEWAY", Some(StatusCode::BAD_GATEWAY);
    BadRequest => "BAD_REQUEST", Some(StatusCode::BAD_REQUEST);
    Conflict => "CONFLICT", Some(StatusCode::CONFLICT);
    Forbidden => "FORBIDDEN", Some(StatusCode::FORBIDDEN);
    Gone => "GONE", Some(StatusCode::GONE);
    InternalServerError => "INTERNAL_SERVER_ERROR", Some(StatusCode::INTERNAL_SERVER_ERROR);
    MethodNotAllowed => "METHOD_NOT_ALLOWED", Some(StatusCode::METHOD_NOT_ALLOWED);
    NotFound => "NOT_FOUND", Some(StatusCode::NOT_FOUND);
    NotImplemented => "NOT_IMPLEMENTED", Some(StatusCode::NOT_IMPLEMENTED);
    PaymentRequired => "PAYMENT_REQUIRED", Some(StatusCode::PAYMENT_REQUIRED);
    ProxyAuthenticationRequired => "PROXY_AUTHENTICATION_REQUIRED", Some(StatusCode::PROXY_AUTHENTICATION_REQUIRED);
    ServiceUnavailable => "SERVICE_UNAVAILABLE", Some(StatusCode::SERVICE_UNAVAILABLE);
    StoreLimitExceeded => "STORE_LIMIT_EXCEEDED", None;
    StoreMagnetInvalid => "STORE_MAGNET_INVALID", None;
    StoreNameInvalid => "STORE_NAME_INVALID", None;
    TooManyRequests => "TOO_MANY_REQUESTS", Some(StatusCode::TOO_MANY_REQUESTS);
    Unauthorized => "UNAUTHORIZED", Some(StatusCode::UNAUTHORIZED);
    UnavailableForLegalReasons => "UNAVAILABLE_FOR_LEGAL_REASONS", Some(StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS);
    UnprocessableEntity => "UNPROCESSABLE_ENTITY", Some(StatusCode::UNPROCESSABLE_ENTITY);
    UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE", Some(StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error built from a failed HTTP response.
///
/// The body is expected as `{"error": {"type", "code", "message"}}`. Any
/// other shape degrades to `UNKNOWN` / `unknown_error` with the raw body
/// as the message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct StremThruError {
    message: String,
    code: ErrorCode,
    error_type: ErrorType,
    status_code: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
    request_id: Option<String>,
    store_name: Option<String>,
}

impl StremThruError {
    #[must_use]
    pub fn new(body: ResponseBody, headers: HeaderMap, status_code: StatusCode) -> Self {
        let mut error_type = ErrorType::Unknown;
        let mut code = ErrorCode::Unknown;
        let mut request_id = None;
        let mut store_name = None;

        let message = match &body {
            ResponseBody::Text(text) => text.clone(),
            ResponseBody::Json(Value::Object(map)) if map.contains_key("error") => {
                let error = &map["error"];
                let raw_type = error.get("type").and_then(Value::as_str);
                if let Some(raw_type) = raw_type {
                    error_type = ErrorType::from(raw_type);
                }
                if let Some(raw_code) = error.get("code").and_then(Value::as_str) {
                    code = ErrorCode::from(raw_code);
                }
                request_id = string_field(error, "request_id");
                store_name = string_field(error, "store_name");

                match (error, error.get("message")) {
                    (_, Some(msg)) => format!(
                        "({}) {}",
                        raw_type.unwrap_or(ErrorType::Unknown.as_str()),
                        msg.as_str().map_or_else(|| msg.to_string(), str::to_string)
                    ),
                    (Value::String(text), None) => text.clone(),
                    (other, None) => other.to_string(),
                }
            }
            ResponseBody::Json(other) => other.to_string(),
        };

        Self {
            message,
            code,
            error_type,
            status_code,
            headers,
            body,
            request_id,
            store_name,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    #[must_use]
    pub const fn error_type(&self) -> ErrorType {
        self.error_type
    }

    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.status_code
    }

    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw parsed (JSON) or text response body.
    #[must_use]
    pub const fn body(&self) -> &ResponseBody {
        &self.body
    }

    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    #[must_use]
    pub fn store_name(&self) -> Option<&str> {
        self.store_name.as_deref()
    }
}

impl Default for StremThruError {
    fn default() -> Self {
        Self::new(
            ResponseBody::Text(String::new()),
            HeaderMap::new(),
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

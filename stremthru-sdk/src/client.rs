//! StremThru HTTP Client
//!
//! Owns the base URL, the default headers and the optional timeout.
//! Authentication is resolved into headers once, at construction.

use std::borrow::Cow;
use std::io::Read;
use std::sync::LazyLock;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::{GzDecoder, ZlibDecoder};
use reqwest::{
    header::{
        HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE,
        PROXY_AUTHORIZATION, USER_AGENT as USER_AGENT_HEADER,
    },
    Client, Method,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result, StremThruError, MAX_RESPONSE_SIZE};
use crate::store::Store;
use crate::types::{HealthData, Response, ResponseBody, ResponseMeta};

/// Base user agent, the configured suffix is appended after a space.
pub const USER_AGENT: &str = concat!("stremthru:sdk:rust/", env!("CARGO_PKG_VERSION"));

const X_STREMTHRU_STORE_NAME: &str = "x-stremthru-store-name";
const X_STREMTHRU_STORE_AUTHORIZATION: &str = "x-stremthru-store-authorization";

/// Shared HTTP client for all StremThru instances (connection pooling).
/// Timeouts are applied per request since they are per instance.
static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build StremThru shared HTTP client")
});

/// Credentials sent with every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Auth {
    /// Either an already encoded basic token, or `user:pass`.
    Token(String),
    UserPass { user: String, pass: String },
    /// Credentials for a named backing store.
    Store { store: String, token: String },
}

impl Auth {
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(token.into())
    }

    pub fn user_pass(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self::UserPass {
            user: user.into(),
            pass: pass.into(),
        }
    }

    pub fn store(store: impl Into<String>, token: impl Into<String>) -> Self {
        Self::Store {
            store: store.into(),
            token: token.into(),
        }
    }

    /// Resolve into the exact header set sent on each request.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        match self {
            Self::Token(token) if token.is_empty() => {}
            Self::Token(token) => {
                headers.insert(PROXY_AUTHORIZATION, sensitive(&basic_auth(token))?);
            }
            Self::UserPass { user, pass } => {
                headers.insert(
                    PROXY_AUTHORIZATION,
                    sensitive(&basic_auth(&format!("{user}:{pass}")))?,
                );
            }
            Self::Store { store, token } => {
                headers.insert(
                    HeaderName::from_static(X_STREMTHRU_STORE_NAME),
                    HeaderValue::from_str(store)?,
                );
                headers.insert(
                    HeaderName::from_static(X_STREMTHRU_STORE_AUTHORIZATION),
                    sensitive(&format!("Bearer {token}"))?,
                );
            }
        }
        Ok(headers)
    }
}

/// `user:pass` is base64 encoded, anything else is sent verbatim.
fn basic_auth(token: &str) -> String {
    if token.contains(':') {
        format!("Basic {}", STANDARD.encode(token.trim()))
    } else {
        format!("Basic {token}")
    }
}

fn sensitive(value: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(value)?;
    value.set_sensitive(true);
    Ok(value)
}

/// Client configuration, immutable once the client is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub auth: Option<Auth>,
    /// Appended to the SDK user agent.
    pub user_agent: Option<String>,
    /// Request timeout in seconds, `None` or `0` means no timeout.
    pub timeout: Option<u64>,
    /// Default `client_ip` for store calls.
    pub client_ip: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    #[must_use]
    pub fn with_client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.client_ip = Some(client_ip.into());
        self
    }
}

/// Request body, form encoded or JSON.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Form(Vec<(String, String)>),
    Json(Value),
}

/// Per-call options for [`StremThru::request`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    method: Method,
    headers: HeaderMap,
    params: Vec<(String, String)>,
    body: Option<RequestBody>,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Per-call header, overriding a default header of the same name.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Query parameter. Repeating a key sends it multiple times.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Form(fields));
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// StremThru HTTP Client
///
/// Every call performs exactly one HTTP round trip, there are no retries.
/// Cloning is cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct StremThru {
    base_url: String,
    headers: HeaderMap,
    timeout: Option<Duration>,
    client_ip: Option<String>,
    client: Client,
}

impl StremThru {
    /// Create an unauthenticated client (reuses shared connection pool)
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url))
    }

    /// Create a client from configuration (reuses shared connection pool)
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(Error::InvalidConfig("base_url must not be empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        let user_agent = match config.user_agent.as_deref() {
            Some(suffix) if !suffix.is_empty() => format!("{USER_AGENT} {suffix}"),
            _ => USER_AGENT.to_string(),
        };
        headers.insert(USER_AGENT_HEADER, HeaderValue::from_str(&user_agent)?);
        if let Some(auth) = &config.auth {
            headers.extend(auth.headers()?);
        }

        Ok(Self {
            base_url: config.base_url,
            headers,
            timeout: config.timeout.filter(|secs| *secs > 0).map(Duration::from_secs),
            client_ip: config.client_ip.filter(|ip| !ip.is_empty()),
            client: SHARED_CLIENT.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Default headers sent with every request, auth included.
    #[must_use]
    pub fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
        headers.extend(self.headers.clone());
        headers
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub fn client_ip(&self) -> Option<&str> {
        self.client_ip.as_deref()
    }

    /// Typed store operations.
    #[must_use]
    pub const fn store(&self) -> Store<'_> {
        Store::new(self)
    }

    pub async fn health(&self) -> Result<Response<HealthData>> {
        self.request("/v0/health", RequestOptions::new()).await
    }

    /// Perform one request against `base_url + endpoint`.
    ///
    /// Non-2xx responses become [`Error::Api`]; on success the `data`
    /// field of the JSON envelope is deserialized into `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Response<T>> {
        let url = format!("{}{}", self.base_url, endpoint);
        let RequestOptions {
            method,
            headers: call_headers,
            params,
            body,
        } = options;

        let mut headers = self.default_headers();
        headers.extend(call_headers);

        let mut req = self.client.request(method.clone(), &url).headers(headers);
        if !params.is_empty() {
            req = req.query(&params);
        }
        req = match body {
            Some(RequestBody::Form(fields)) => req.form(&fields),
            Some(RequestBody::Json(json)) => req.json(&json),
            None => req,
        };
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        debug!(%method, %url, "sending StremThru request");
        let response = req.send().await?;
        let status_code = response.status();
        debug!(%method, %url, status = %status_code, "received StremThru response");

        let headers = response.headers().clone();
        let raw = read_limited(response).await;

        if !status_code.is_success() {
            let body = match raw {
                Ok(bytes) => error_body(&headers, &bytes),
                Err(Error::ResponseTooLarge { size }) => {
                    ResponseBody::Text(format!("response body too large ({size} bytes)"))
                }
                Err(err) => return Err(err),
            };
            return Err(StremThruError::new(body, headers, status_code).into());
        }

        let body = parse_body(&headers, &decompress(&headers, &raw?)?)?;
        Ok(Response {
            data: unwrap_envelope(body)?,
            meta: ResponseMeta {
                headers,
                status_code,
            },
        })
    }
}

fn unwrap_envelope<T: DeserializeOwned>(body: ResponseBody) -> Result<Option<T>> {
    match body {
        ResponseBody::Json(Value::Object(mut map)) => match map.remove("data") {
            None | Some(Value::Null) => Ok(None),
            Some(data) => Ok(Some(serde_json::from_value(data)?)),
        },
        _ => Ok(None),
    }
}

/// Read the raw body, failing once it grows past [`MAX_RESPONSE_SIZE`].
async fn read_limited(mut response: reqwest::Response) -> Result<Vec<u8>> {
    if let Some(cl) = response.content_length() {
        if cl > MAX_RESPONSE_SIZE as u64 {
            return Err(Error::ResponseTooLarge { size: cl });
        }
    }

    let mut buf = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let size = buf.len() + chunk.len();
        if size > MAX_RESPONSE_SIZE {
            return Err(Error::ResponseTooLarge { size: size as u64 });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

/// Undo `Content-Encoding`. The header itself is left in the response
/// meta, so decoding happens here instead of inside reqwest.
fn decompress<'a>(headers: &HeaderMap, raw: &'a [u8]) -> Result<Cow<'a, [u8]>> {
    let encoding = headers
        .get(CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_ascii_lowercase());

    let mut decoded = Vec::new();
    let read = match encoding.as_deref() {
        Some("gzip" | "x-gzip") => GzDecoder::new(raw)
            .take(MAX_RESPONSE_SIZE as u64 + 1)
            .read_to_end(&mut decoded),
        Some("deflate") => ZlibDecoder::new(raw)
            .take(MAX_RESPONSE_SIZE as u64 + 1)
            .read_to_end(&mut decoded),
        _ => return Ok(Cow::Borrowed(raw)),
    };
    read.map_err(|e| Error::Parse(format!("failed to decode response body: {e}")))?;

    if decoded.len() > MAX_RESPONSE_SIZE {
        return Err(Error::ResponseTooLarge {
            size: decoded.len() as u64,
        });
    }
    Ok(Cow::Owned(decoded))
}

/// Interpret the body as JSON if the content type says so, text otherwise.
fn parse_body(headers: &HeaderMap, bytes: &[u8]) -> Result<ResponseBody> {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));

    if !is_json {
        return Ok(ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()));
    }
    if bytes.is_empty() {
        return Ok(ResponseBody::Json(Value::Null));
    }
    Ok(ResponseBody::Json(serde_json::from_slice(bytes)?))
}

/// Failure bodies never fail to parse: anything unreadable is kept as text.
fn error_body(headers: &HeaderMap, raw: &[u8]) -> ResponseBody {
    let bytes = decompress(headers, raw).unwrap_or(Cow::Borrowed(raw));
    parse_body(headers, &bytes)
        .unwrap_or_else(|_| ResponseBody::Text(String::from_utf8_lossy(&bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_user_pass_string_is_encoded() {
        let headers = Auth::token("root:root").headers().unwrap();
        assert_eq!(header(&headers, "proxy-authorization"), Some("Basic cm9vdDpyb290"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_encoded_token_is_verbatim() {
        let headers = Auth::token("cm9vdDpyb290").headers().unwrap();
        assert_eq!(header(&headers, "proxy-authorization"), Some("Basic cm9vdDpyb290"));
    }

    #[test]
    fn test_user_pass_object_matches_string() {
        let from_object = Auth::user_pass("root", "root").headers().unwrap();
        let from_string = Auth::token("root:root").headers().unwrap();
        assert_eq!(
            from_object.get(PROXY_AUTHORIZATION).map(HeaderValue::as_bytes),
            from_string.get(PROXY_AUTHORIZATION).map(HeaderValue::as_bytes),
        );
    }

    #[test]
    fn test_store_auth_headers() {
        let headers = Auth::store("realdebrid", "secret").headers().unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(header(&headers, X_STREMTHRU_STORE_NAME), Some("realdebrid"));
        assert_eq!(
            header(&headers, X_STREMTHRU_STORE_AUTHORIZATION),
            Some("Bearer secret")
        );
        assert!(headers.get(PROXY_AUTHORIZATION).is_none());
    }

    #[test]
    fn test_store_auth_accepts_store_name() {
        let auth = Auth::store(crate::types::StoreName::TorBox, "t");
        assert_eq!(auth, Auth::store("torbox", "t"));
    }

    #[test]
    fn test_empty_token_sends_nothing() {
        assert!(Auth::token("").headers().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_header_value() {
        let err = Auth::token("bad\ntoken").headers().unwrap_err();
        assert!(matches!(err, Error::InvalidHeader(_)));
    }

    #[test]
    fn test_auth_deserialize_shapes() {
        let auth: Auth = serde_json::from_value(json!("root:root")).unwrap();
        assert_eq!(auth, Auth::token("root:root"));
        let auth: Auth = serde_json::from_value(json!({"user": "u", "pass": "p"})).unwrap();
        assert_eq!(auth, Auth::user_pass("u", "p"));
        let auth: Auth = serde_json::from_value(json!({"store": "alldebrid", "token": "t"})).unwrap();
        assert_eq!(auth, Auth::store("alldebrid", "t"));
    }

    #[test]
    fn test_default_headers() {
        let client = StremThru::with_config(
            ClientConfig::new("http://localhost:8080")
                .with_auth(Auth::token("root:root"))
                .with_user_agent("my-app/1.0"),
        )
        .unwrap();
        let headers = client.default_headers();
        assert_eq!(header(&headers, "accept"), Some("*/*"));
        assert_eq!(header(&headers, "accept-encoding"), Some("gzip, deflate"));
        assert_eq!(
            header(&headers, "user-agent").map(str::to_string),
            Some(format!("{USER_AGENT} my-app/1.0"))
        );
        assert_eq!(header(&headers, "proxy-authorization"), Some("Basic cm9vdDpyb290"));
    }

    #[test]
    fn test_user_agent_without_suffix() {
        let client = StremThru::new("http://localhost:8080").unwrap();
        assert!(USER_AGENT.starts_with("stremthru:sdk:rust/"));
        assert_eq!(header(&client.default_headers(), "user-agent"), Some(USER_AGENT));
        assert!(client.default_headers().get(PROXY_AUTHORIZATION).is_none());
    }

    #[test]
    fn test_instances_do_not_share_headers() {
        let authed = StremThru::with_config(
            ClientConfig::new("http://a").with_auth(Auth::store("torbox", "t")),
        )
        .unwrap();
        let plain = StremThru::new("http://b").unwrap();
        assert!(authed.default_headers().contains_key(X_STREMTHRU_STORE_NAME));
        assert!(!plain.default_headers().contains_key(X_STREMTHRU_STORE_NAME));
    }

    #[test]
    fn test_timeout_and_client_ip_config() {
        let client = StremThru::with_config(
            ClientConfig::new("http://localhost").with_timeout(5).with_client_ip("1.2.3.4"),
        )
        .unwrap();
        assert_eq!(client.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(client.client_ip(), Some("1.2.3.4"));

        let client = StremThru::with_config(
            ClientConfig::new("http://localhost").with_timeout(0).with_client_ip(""),
        )
        .unwrap();
        assert_eq!(client.timeout(), None);
        assert_eq!(client.client_ip(), None);
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let err = StremThru::new("").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_unwrap_envelope() {
        let data: Option<HealthData> =
            unwrap_envelope(ResponseBody::Json(json!({"data": {"status": "ok"}}))).unwrap();
        assert_eq!(data.map(|d| d.status).as_deref(), Some("ok"));

        let data: Option<HealthData> = unwrap_envelope(ResponseBody::Json(json!({}))).unwrap();
        assert!(data.is_none());

        let data: Option<HealthData> =
            unwrap_envelope(ResponseBody::Text("ok".to_string())).unwrap();
        assert!(data.is_none());

        let err = unwrap_envelope::<HealthData>(ResponseBody::Json(json!({"data": 1}))).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_request_options_repeated_query() {
        let options = RequestOptions::new()
            .query("magnet", "a")
            .query("magnet", "b");
        assert_eq!(options.params().len(), 2);
        assert!(options.params().iter().all(|(k, _)| k == "magnet"));
    }

    fn encoded_headers(encoding: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_ENCODING, HeaderValue::from_str(encoding).unwrap());
        headers
    }

    #[test]
    fn test_decompress_deflate() {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"{"data":{"status":"ok"}}"#).unwrap();
        let raw = encoder.finish().unwrap();

        let headers = encoded_headers("deflate");
        let body = parse_body(&headers, &decompress(&headers, &raw).unwrap()).unwrap();
        assert_eq!(body, ResponseBody::Json(json!({"data": {"status": "ok"}})));
    }

    #[test]
    fn test_unknown_encoding_passes_through() {
        let headers = encoded_headers("br");
        let bytes = decompress(&headers, b"plain").unwrap();
        assert_eq!(&*bytes, b"plain");
    }

    #[test]
    fn test_corrupt_gzip_is_parse_error() {
        let headers = encoded_headers("gzip");
        assert!(matches!(decompress(&headers, b"not gzip"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_error_body_falls_back_to_text() {
        let headers = encoded_headers("gzip");
        assert_eq!(
            error_body(&headers, b"not gzip"),
            ResponseBody::Text("not gzip".to_string())
        );

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert_eq!(
            error_body(&headers, br#"{"error":"#),
            ResponseBody::Text(r#"{"error":"#.to_string())
        );
        assert_eq!(
            error_body(&headers, br#"{"error":"boom"}"#),
            ResponseBody::Json(json!({"error": "boom"}))
        );
    }
}

//! StremThru API Types
//!
//! Response envelope and the store records returned by the server.
//! All records are read-only snapshots of server state.

use std::fmt;
use std::str::FromStr;

use reqwest::{header::HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw response body, parsed as JSON when the server says so.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

/// Transport details of a successful call.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub headers: HeaderMap,
    pub status_code: StatusCode,
}

/// Unwrapped `{data: ...}` envelope.
///
/// `data` is `None` when the server sent no `data` field (or `null`).
#[derive(Debug, Clone)]
pub struct Response<T> {
    pub data: Option<T>,
    pub meta: ResponseMeta,
}

impl<T> Response<T> {
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            data: self.data.map(f),
            meta: self.meta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthData {
    pub status: String,
}

/// Backing stores the server can proxy to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreName {
    AllDebrid,
    DebridLink,
    EasyDebrid,
    Offcloud,
    PikPak,
    Premiumize,
    RealDebrid,
    TorBox,
}

impl StoreName {
    pub const ALL: [Self; 8] = [
        Self::AllDebrid,
        Self::DebridLink,
        Self::EasyDebrid,
        Self::Offcloud,
        Self::PikPak,
        Self::Premiumize,
        Self::RealDebrid,
        Self::TorBox,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AllDebrid => "alldebrid",
            Self::DebridLink => "debridlink",
            Self::EasyDebrid => "easydebrid",
            Self::Offcloud => "offcloud",
            Self::PikPak => "pikpak",
            Self::Premiumize => "premiumize",
            Self::RealDebrid => "realdebrid",
            Self::TorBox => "torbox",
        }
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("invalid store name: {s}"))
    }
}

impl From<StoreName> for String {
    fn from(name: StoreName) -> Self {
        name.as_str().to_string()
    }
}

/// Lifecycle status of a magnet in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MagnetStatus {
    Cached,
    Downloaded,
    Downloading,
    Failed,
    Invalid,
    Processing,
    Queued,
    Uploading,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Expired,
    Premium,
    Trial,
}

/// File inside a magnet. `link` and `path` are empty for cache checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagnetFile {
    pub index: i64,
    pub name: String,
    pub size: u64,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub link: String,
}

/// Magnet returned by `add_magnet` and `get_magnet`.
///
/// `magnet` is only present on `add_magnet` responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Magnet {
    pub id: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnet: Option<String>,
    pub name: String,
    pub status: MagnetStatus,
    #[serde(default)]
    pub added_at: String,
    #[serde(default)]
    pub files: Vec<MagnetFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckMagnetItem {
    pub hash: String,
    pub magnet: String,
    pub status: MagnetStatus,
    #[serde(default)]
    pub files: Vec<MagnetFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckMagnetData {
    pub items: Vec<CheckMagnetItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateLinkData {
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub subscription_status: SubscriptionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagnetListItem {
    pub id: String,
    #[serde(default)]
    pub hash: String,
    pub name: String,
    pub status: MagnetStatus,
    #[serde(default)]
    pub added_at: String,
}

/// One page of magnets. Callers drive `limit`/`offset` themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMagnetsData {
    pub items: Vec<MagnetListItem>,
    #[serde(default)]
    pub total_items: u64,
}

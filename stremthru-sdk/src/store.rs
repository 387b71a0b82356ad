//! StremThru Store
//!
//! One method per remote store capability. Each builds a single request
//! against [`StremThru::request`] and inherits its error contract.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use crate::client::{RequestOptions, StremThru};
use crate::error::Result;
use crate::types::{
    CheckMagnetData, GenerateLinkData, ListMagnetsData, Magnet, Response, User,
};

const MAGNETS_ENDPOINT: &str = "/v0/store/magnets";
const LINK_GENERATE_ENDPOINT: &str = "/v0/store/link/generate";
const USER_ENDPOINT: &str = "/v0/store/user";

/// Unified store interface
///
/// Lets callers depend on the operations rather than on the HTTP client.
#[async_trait]
pub trait StoreApi: Send + Sync {
    async fn add_magnet(&self, magnet: &str, client_ip: Option<&str>) -> Result<Response<Magnet>>;

    async fn check_magnet(&self, magnets: &[String], sid: Option<&str>) -> Result<Response<CheckMagnetData>>;

    async fn generate_link(&self, link: &str, client_ip: Option<&str>) -> Result<Response<GenerateLinkData>>;

    async fn get_magnet(&self, magnet_id: &str) -> Result<Response<Magnet>>;

    async fn get_user(&self) -> Result<Response<User>>;

    async fn list_magnets(&self, limit: Option<u32>, offset: Option<u32>) -> Result<Response<ListMagnetsData>>;

    async fn remove_magnet(&self, magnet_id: &str) -> Result<Response<()>>;
}

/// Store operations bound to a [`StremThru`] client.
#[derive(Debug, Clone, Copy)]
pub struct Store<'a> {
    client: &'a StremThru,
}

impl<'a> Store<'a> {
    pub(crate) const fn new(client: &'a StremThru) -> Self {
        Self { client }
    }

    /// Explicit argument first, then the client default, else omitted.
    fn client_ip<'b>(&'b self, client_ip: Option<&'b str>) -> Option<&'b str> {
        client_ip
            .filter(|ip| !ip.is_empty())
            .or_else(|| self.client.client_ip())
    }

    fn with_client_ip(&self, options: RequestOptions, client_ip: Option<&str>) -> RequestOptions {
        match self.client_ip(client_ip) {
            Some(ip) => options.query("client_ip", ip),
            None => options,
        }
    }

    /// Add a magnet to the store
    pub async fn add_magnet(&self, magnet: &str, client_ip: Option<&str>) -> Result<Response<Magnet>> {
        let options = RequestOptions::new()
            .method(Method::POST)
            .json(json!({ "magnet": magnet }));
        let options = self.with_client_ip(options, client_ip);

        self.client.request(MAGNETS_ENDPOINT, options).await
    }

    /// Check cache status of magnets (URIs or info hashes)
    ///
    /// # Arguments
    /// * `magnets` - Sent as repeated `magnet` query parameters
    /// * `sid` - Optional session id
    pub async fn check_magnet<S: AsRef<str>>(
        &self,
        magnets: &[S],
        sid: Option<&str>,
    ) -> Result<Response<CheckMagnetData>> {
        let mut options = magnets
            .iter()
            .fold(RequestOptions::new(), |options, magnet| {
                options.query("magnet", magnet.as_ref())
            });
        if let Some(sid) = sid.filter(|sid| !sid.is_empty()) {
            options = options.query("sid", sid);
        }

        self.client.request(MAGNETS_ENDPOINT, options).await
    }

    /// Generate a direct download link for a file link
    pub async fn generate_link(&self, link: &str, client_ip: Option<&str>) -> Result<Response<GenerateLinkData>> {
        let options = RequestOptions::new()
            .method(Method::POST)
            .json(json!({ "link": link }));
        let options = self.with_client_ip(options, client_ip);

        self.client.request(LINK_GENERATE_ENDPOINT, options).await
    }

    pub async fn get_magnet(&self, magnet_id: &str) -> Result<Response<Magnet>> {
        self.client
            .request(&format!("{MAGNETS_ENDPOINT}/{magnet_id}"), RequestOptions::new())
            .await
    }

    pub async fn get_user(&self) -> Result<Response<User>> {
        self.client.request(USER_ENDPOINT, RequestOptions::new()).await
    }

    /// List magnets in the store
    ///
    /// `limit` and `offset` are only sent when non-zero.
    pub async fn list_magnets(&self, limit: Option<u32>, offset: Option<u32>) -> Result<Response<ListMagnetsData>> {
        let mut options = RequestOptions::new();
        if let Some(limit) = limit.filter(|n| *n > 0) {
            options = options.query("limit", limit.to_string());
        }
        if let Some(offset) = offset.filter(|n| *n > 0) {
            options = options.query("offset", offset.to_string());
        }

        self.client.request(MAGNETS_ENDPOINT, options).await
    }

    /// Remove a magnet. Any payload in the response is discarded.
    pub async fn remove_magnet(&self, magnet_id: &str) -> Result<Response<()>> {
        let options = RequestOptions::new().method(Method::DELETE);
        let response = self
            .client
            .request::<serde_json::Value>(&format!("{MAGNETS_ENDPOINT}/{magnet_id}"), options)
            .await?;

        Ok(Response {
            data: None,
            meta: response.meta,
        })
    }
}

#[async_trait]
impl StoreApi for Store<'_> {
    async fn add_magnet(&self, magnet: &str, client_ip: Option<&str>) -> Result<Response<Magnet>> {
        Store::add_magnet(self, magnet, client_ip).await
    }

    async fn check_magnet(&self, magnets: &[String], sid: Option<&str>) -> Result<Response<CheckMagnetData>> {
        Store::check_magnet(self, magnets, sid).await
    }

    async fn generate_link(&self, link: &str, client_ip: Option<&str>) -> Result<Response<GenerateLinkData>> {
        Store::generate_link(self, link, client_ip).await
    }

    async fn get_magnet(&self, magnet_id: &str) -> Result<Response<Magnet>> {
        Store::get_magnet(self, magnet_id).await
    }

    async fn get_user(&self) -> Result<Response<User>> {
        Store::get_user(self).await
    }

    async fn list_magnets(&self, limit: Option<u32>, offset: Option<u32>) -> Result<Response<ListMagnetsData>> {
        Store::list_magnets(self, limit, offset).await
    }

    async fn remove_magnet(&self, magnet_id: &str) -> Result<Response<()>> {
        Store::remove_magnet(self, magnet_id).await
    }
}

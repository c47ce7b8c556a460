/// Scatter API client
///
/// Fetches collection metadata and eligible invite lists, and requests mint
/// transaction templates from the Scatter REST API.
use std::time::Duration;

use alloy_primitives::Address;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{Error, MintError};

use super::types::{Collection, InviteList, MintRequest, MintTransactionTemplate};

/// Default Scatter API base URL
pub const DEFAULT_SCATTER_API_URL: &str = "https://api.scatter.art/v1";

/// Operations the storefront needs from the minting API
#[async_trait]
pub trait ScatterApi: Send + Sync {
    /// `GET /collection/{slug}`
    async fn get_collection(&self, slug: &str) -> Result<Collection, Error>;

    /// `GET /collection/{slug}/eligible-invite-lists`
    ///
    /// Without a minter only public lists are returned.
    async fn get_eligible_invite_lists(
        &self,
        slug: &str,
        minter: Option<Address>,
    ) -> Result<Vec<InviteList>, Error>;

    /// `POST /mint`
    async fn request_mint_transaction(
        &self,
        request: &MintRequest,
    ) -> Result<MintTransactionTemplate, MintError>;
}

/// HTTP implementation of [`ScatterApi`]
#[derive(Debug, Clone)]
pub struct ScatterClient {
    /// HTTP client for Scatter API calls
    http_client: reqwest::Client,
    /// Base URL without trailing slash
    base_url: String,
}

impl ScatterClient {
    /// Create a client against the public Scatter API
    pub fn new() -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_SCATTER_API_URL, Duration::from_secs(30))
    }

    /// Create a client against a custom base URL
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        url::Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid Scatter API URL '{}': {}", base_url, e)))?;

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, slug: &str) -> String {
        format!("{}/collection/{}", self.base_url, slug)
    }

    fn eligible_lists_url(&self, slug: &str) -> String {
        format!("{}/collection/{}/eligible-invite-lists", self.base_url, slug)
    }

    fn mint_url(&self) -> String {
        format!("{}/mint", self.base_url)
    }
}

#[async_trait]
impl ScatterApi for ScatterClient {
    async fn get_collection(&self, slug: &str) -> Result<Collection, Error> {
        debug!(slug, "Fetching collection");

        let response = self
            .http_client
            .get(self.collection_url(slug))
            .send()
            .await
            .map_err(|e| Error::Api(format!("Failed to fetch collection: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!(
                "Collection request failed ({}): {}",
                status, error_text
            )));
        }

        response
            .json::<Collection>()
            .await
            .map_err(|e| Error::Api(format!("Failed to parse collection response: {}", e)))
    }

    async fn get_eligible_invite_lists(
        &self,
        slug: &str,
        minter: Option<Address>,
    ) -> Result<Vec<InviteList>, Error> {
        debug!(slug, minter = ?minter, "Fetching eligible invite lists");

        let mut request = self.http_client.get(self.eligible_lists_url(slug));
        if let Some(minter) = minter {
            request = request.query(&[("minterAddress", minter.to_string())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Api(format!("Failed to fetch invite lists: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!(
                "Invite list request failed ({}): {}",
                status, error_text
            )));
        }

        response
            .json::<Vec<InviteList>>()
            .await
            .map_err(|e| Error::Api(format!("Failed to parse invite lists: {}", e)))
    }

    async fn request_mint_transaction(
        &self,
        request: &MintRequest,
    ) -> Result<MintTransactionTemplate, MintError> {
        debug!(
            collection = %request.collection_address,
            minter = %request.minter_address,
            lists = request.lists.len(),
            "Requesting mint transaction"
        );

        let response = self
            .http_client
            .post(self.mint_url())
            .json(request)
            .send()
            .await
            .map_err(|e| MintError::TemplateRequestFailed {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Mint template request rejected by API");
            return Err(MintError::TemplateRequestFailed {
                status: Some(status.as_u16()),
                message: error_text,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| MintError::TemplateRequestFailed {
                status: Some(status.as_u16()),
                message: format!("Failed to read response body: {}", e),
            })?;

        parse_mint_template(&body)
    }
}

/// Decode a `POST /mint` response body
pub fn parse_mint_template(body: &str) -> Result<MintTransactionTemplate, MintError> {
    serde_json::from_str(body).map_err(|e| MintError::TemplateMalformed(e.to_string()))
}

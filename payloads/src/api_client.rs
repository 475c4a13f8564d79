use crate::{
    ApiBookingNft, Cursor,
    requests::{BookingNftListingParams, BookingNftListingQuery},
    responses::Page,
};
use reqwest::StatusCode;
use serde::Serialize;

type ReqwestResult = Result<reqwest::Response, reqwest::Error>;

/// An API client for the booking NFT indexer.
pub struct APIClient {
    /// Base endpoint, e.g. `https://api.example.com/v1/`. A trailing slash
    /// is optional.
    pub address: String,
    pub inner_client: reqwest::Client,
}

/// Helper methods for http actions
impl APIClient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            inner_client: reqwest::Client::new(),
        }
    }

    fn format_url(&self, path: &str) -> String {
        format!("{}/{path}", self.address.trim_end_matches('/'))
    }

    async fn get_with_query(
        &self,
        path: &str,
        query: &impl Serialize,
    ) -> ReqwestResult {
        let request = self.inner_client.get(self.format_url(path)).query(query);

        #[cfg(target_arch = "wasm32")]
        let request = request.fetch_credentials_include();

        request.send().await
    }
}

/// Methods on the indexer API
impl APIClient {
    /// Fetch one page of booking NFTs matching `query`, starting at
    /// `cursor` (or the first page when `None`).
    #[tracing::instrument(skip(self), fields(address = %self.address))]
    pub async fn list_booking_nfts(
        &self,
        query: &BookingNftListingQuery,
        cursor: Option<&Cursor>,
    ) -> Result<Page<ApiBookingNft>, ClientError> {
        let params = BookingNftListingParams::new(query, cursor);
        let response = self.get_with_query("bookingNFTs", &params).await?;
        ok_body(response).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An unhandled API error to display, containing response text.
    #[error("{1}")]
    APIError(StatusCode, String),
    #[error("Network error. Please check your connection.")]
    Network(#[from] reqwest::Error),
}

/// Deserialize a successful request into the desired type, or return an
/// appropriate error.
pub async fn ok_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(ClientError::APIError(
            response.status(),
            response.text().await?,
        ));
    }
    Ok(response.json::<T>().await?)
}

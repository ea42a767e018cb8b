//! Generic CRUD client for the external document store.
//!
//! The store exposes collections addressed by string identifier; there are
//! no filter, sort, or paging parameters. Callers fetch whole collections
//! and narrow them in memory.

use reqwest::StatusCode;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store returned status {0}")]
    Status(StatusCode),
}

#[derive(Debug, serde::Deserialize)]
struct ItemsEnvelope<T> {
    items: Vec<T>,
}

#[derive(Clone)]
pub struct CrudClient {
    http: reqwest::Client,
    base_url: String,
}

impl CrudClient {
    pub fn new(base_url: &str, timeout: std::time::Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build store HTTP client");
        CrudClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/collections/{}", self.base_url, collection)
    }

    /// Fetches the entire collection.
    pub async fn get_all<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Vec<T>, GatewayError> {
        let resp = self.http.get(self.collection_url(collection)).send().await?;
        if !resp.status().is_success() {
            return Err(GatewayError::Status(resp.status()));
        }
        let envelope: ItemsEnvelope<T> = resp.json().await?;
        Ok(envelope.items)
    }

    /// Fetches one record by id; a missing record is None, not an error.
    pub async fn get_by_id<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>, GatewayError> {
        let url = format!("{}/{}", self.collection_url(collection), id);
        let resp = self.http.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(GatewayError::Status(resp.status()));
        }
        Ok(Some(resp.json().await?))
    }

    /// Persists a new record and returns it as stored.
    pub async fn create<T: Serialize + DeserializeOwned>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<T, GatewayError> {
        let resp = self
            .http
            .post(self.collection_url(collection))
            .json(record)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(GatewayError::Status(resp.status()));
        }
        Ok(resp.json().await?)
    }

    /// Partial update: only the fields present in `patch` change.
    pub async fn update<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
        patch: &Value,
    ) -> Result<T, GatewayError> {
        let url = format!("{}/{}", self.collection_url(collection), id);
        let resp = self.http.patch(url).json(patch).send().await?;
        if !resp.status().is_success() {
            return Err(GatewayError::Status(resp.status()));
        }
        Ok(resp.json().await?)
    }
}

//! Content repository abstraction
//!
//! The scanner only needs two read operations from the content platform: a
//! paginated asset listing and an existence check for entries that link to an
//! asset. Both are behind [ContentRepository] so the scan can run against the
//! Management API or an in-memory fixture.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Field the asset listing is ordered by
pub const ORDER_BY_CREATED_AT: &str = "sys.createdAt";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} failed with status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to decode {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// One page request for the asset listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetQuery {
    pub skip: usize,
    pub limit: usize,
    pub order: &'static str,
}

impl AssetQuery {
    pub fn page(skip: usize, limit: usize) -> Self {
        Self {
            skip,
            limit,
            order: ORDER_BY_CREATED_AT,
        }
    }
}

/// A page of assets
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetPage {
    #[serde(default)]
    pub items: Vec<AssetRecord>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Entry listing response; only the match count is consumed
#[derive(Debug, Clone, Deserialize)]
pub struct EntryCount {
    pub total: u64,
}

/// System metadata attached to every asset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetSys {
    pub id: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
}

/// Asset as returned by the repository.
///
/// `fields.title` and `fields.file` are kept as raw JSON because the
/// Management API returns them as locale maps while other sources may
/// return them flat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetRecord {
    pub sys: AssetSys,
    #[serde(default)]
    pub fields: AssetFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<JsonValue>,
}

impl AssetRecord {
    pub fn id(&self) -> &str {
        &self.sys.id
    }
}

/// Read-only view of a content repository
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Fetch one page of assets
    async fn list_assets(&self, query: &AssetQuery) -> Result<AssetPage, RepositoryError>;

    /// Number of entries that link to `asset_id`, fetching at most `limit` of them
    async fn count_entries_linking_to(
        &self,
        asset_id: &str,
        limit: usize,
    ) -> Result<u64, RepositoryError>;
}

//! Contentful Content Management API client
//!
//! Base URL: https://api.contentful.com
//! Requests are scoped to `/spaces/{space}/environments/{environment}` and
//! authenticated with a bearer management token.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::repository::{AssetPage, AssetQuery, ContentRepository, EntryCount, RepositoryError};
use crate::config::Config;

/// Contentful Management API client
#[derive(Clone)]
pub struct ContentfulClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl ContentfulClient {
    pub fn new(config: &Config) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &Config) -> Self {
        let base_url = format!(
            "{}/spaces/{}/environments/{}",
            config.api_url.as_str().trim_end_matches('/'),
            config.space_id,
            config.environment_id
        );
        Self {
            client,
            base_url,
            access_token: config.access_token.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RepositoryError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, ?query, "Contentful request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|source| RepositoryError::Http {
                url: url.clone(),
                source,
            })?;

        let response = check_status(operation, response).await?;
        response
            .json::<T>()
            .await
            .map_err(|source| RepositoryError::Decode { operation, source })
    }
}

async fn check_status(
    operation: &'static str,
    response: Response,
) -> Result<Response, RepositoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RepositoryError::Status {
        operation,
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ContentRepository for ContentfulClient {
    async fn list_assets(&self, query: &AssetQuery) -> Result<AssetPage, RepositoryError> {
        self.get_json(
            "list assets",
            "assets",
            &[
                ("skip", query.skip.to_string()),
                ("limit", query.limit.to_string()),
                ("order", query.order.to_string()),
            ],
        )
        .await
    }

    async fn count_entries_linking_to(
        &self,
        asset_id: &str,
        limit: usize,
    ) -> Result<u64, RepositoryError> {
        let count: EntryCount = self
            .get_json(
                "list entries",
                "entries",
                &[
                    ("links_to_asset", asset_id.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(count.total)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use assert_matches::assert_matches;
    use axum::Router;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode, Uri, header};
    use tokio::net::TcpListener;

    use super::*;
    use crate::services::repository::AssetRecord;

    /// Request as seen by the mock Management API
    #[derive(Debug, Clone)]
    struct RecordedRequest {
        path: String,
        query: HashMap<String, String>,
        authorization: Option<String>,
    }

    type Recorded = Arc<Mutex<Vec<RecordedRequest>>>;

    /// Serve every request with `status` and `body`, returning the base URL
    async fn mock_api(status: StatusCode, body: &str) -> (String, Recorded) {
        let recorded: Recorded = Arc::default();
        let requests = recorded.clone();
        let body = body.to_string();

        let app = Router::new().fallback(
            move |uri: Uri, headers: HeaderMap, Query(query): Query<HashMap<String, String>>| {
                let requests = requests.clone();
                let body = body.clone();
                async move {
                    let authorization = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .map(String::from);
                    requests.lock().unwrap().push(RecordedRequest {
                        path: uri.path().to_string(),
                        query,
                        authorization,
                    });
                    (status, body)
                }
            },
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), recorded)
    }

    fn single_request(recorded: &Recorded) -> RecordedRequest {
        let requests = recorded.lock().unwrap();
        assert_eq!(requests.len(), 1);
        requests[0].clone()
    }

    fn config(api_url: &str) -> Config {
        let api_url = api_url.to_string();
        Config::from_lookup(move |key| match key {
            "CONTENTFUL_SPACE_ID" => Some("space1".into()),
            "CONTENTFUL_MANAGEMENT_TOKEN" => Some("token".into()),
            "CONTENTFUL_ENVIRONMENT" => Some("staging".into()),
            "CONTENTFUL_API_URL" => Some(api_url.clone()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_base_url() {
        let client = ContentfulClient::new(&config("https://api.contentful.com"));
        assert_eq!(
            client.base_url(),
            "https://api.contentful.com/spaces/space1/environments/staging"
        );
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let client = ContentfulClient::new(&config("http://localhost:8080/proxy/"));
        assert_eq!(
            client.base_url(),
            "http://localhost:8080/proxy/spaces/space1/environments/staging"
        );
    }

    #[tokio::test]
    async fn test_list_assets_request_and_decoding() {
        let body = r#"{
            "items": [
                { "sys": { "id": "a1", "createdAt": "2024-01-01T00:00:00Z" } },
                { "sys": { "id": "a2" }, "fields": { "title": { "en-US": "Banner" } } }
            ],
            "total": 2
        }"#;
        let (url, recorded) = mock_api(StatusCode::OK, body).await;
        let client = ContentfulClient::new(&config(&url));

        let page = client.list_assets(&AssetQuery::page(200, 100)).await.unwrap();

        let ids: Vec<&str> = page.items.iter().map(AssetRecord::id).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
        assert_eq!(page.total, Some(2));

        let request = single_request(&recorded);
        assert_eq!(request.path, "/spaces/space1/environments/staging/assets");
        assert_eq!(request.query.get("skip").map(String::as_str), Some("200"));
        assert_eq!(request.query.get("limit").map(String::as_str), Some("100"));
        assert_eq!(request.query.get("order").map(String::as_str), Some("sys.createdAt"));
        assert_eq!(request.authorization.as_deref(), Some("Bearer token"));
    }

    #[tokio::test]
    async fn test_count_entries_request_and_decoding() {
        let (url, recorded) = mock_api(StatusCode::OK, r#"{ "items": [{}], "total": 3 }"#).await;
        let client = ContentfulClient::new(&config(&url));

        let total = client.count_entries_linking_to("asset-9", 1).await.unwrap();
        assert_eq!(total, 3);

        let request = single_request(&recorded);
        assert_eq!(request.path, "/spaces/space1/environments/staging/entries");
        assert_eq!(request.query.get("links_to_asset").map(String::as_str), Some("asset-9"));
        assert_eq!(request.query.get("limit").map(String::as_str), Some("1"));
        assert_eq!(request.authorization.as_deref(), Some("Bearer token"));
    }

    #[tokio::test]
    async fn test_error_status_becomes_status_error() {
        let (url, _) = mock_api(StatusCode::NOT_FOUND, "space not found").await;
        let client = ContentfulClient::new(&config(&url));
        let err = client.list_assets(&AssetQuery::page(0, 100)).await.unwrap_err();
        assert_matches!(
            err,
            RepositoryError::Status { operation: "list assets", status: 404, body }
                if body == "space not found"
        );

        let (url, _) = mock_api(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
        let client = ContentfulClient::new(&config(&url));
        let err = client.count_entries_linking_to("a1", 1).await.unwrap_err();
        assert_matches!(
            err,
            RepositoryError::Status { operation: "list entries", status: 500, .. }
        );
    }

    #[tokio::test]
    async fn test_malformed_body_becomes_decode_error() {
        let (url, _) = mock_api(StatusCode::OK, "<html>not json</html>").await;
        let client = ContentfulClient::new(&config(&url));

        let err = client.list_assets(&AssetQuery::page(0, 100)).await.unwrap_err();
        assert_matches!(err, RepositoryError::Decode { operation: "list assets", .. });

        let err = client.count_entries_linking_to("a1", 1).await.unwrap_err();
        assert_matches!(err, RepositoryError::Decode { operation: "list entries", .. });
    }
}

//! Remote object-service backend.
//!
//! Blobs are `PUT` to `{base_url}/{key}` with a bearer token; the service
//! answers with the public URL the blob is served from, and that URL is what
//! `delete` sends back.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, error};

use super::{BlobStore, object_key};
use crate::APP_USER_AGENT;

pub struct RemoteBlobStore {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl RemoteBlobStore {
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(base_url: &str, token: SecretString) -> Result<Self> {
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }
}

#[async_trait]
impl BlobStore for RemoteBlobStore {
    async fn store(&self, bytes: Bytes, content_type: &str, key_hint: &str) -> Result<String> {
        let key = object_key(key_hint, content_type)?;
        let endpoint = format!("{}/{key}", self.base_url);

        debug!("storing {} bytes at {endpoint}", bytes.len());

        let response = self
            .client
            .put(&endpoint)
            .bearer_auth(self.token.expose_secret())
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            error!("failed to store blob at {endpoint}: {status}");

            return Err(anyhow!("{status}, {body}"));
        }

        let json_response: Value = response.json().await?;

        json_response["url"]
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| anyhow!("Error parsing JSON response: no url found"))
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .delete(url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            error!("failed to delete blob at {url}: {status}");

            return Err(anyhow!("{status}"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_bytes, header, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn remote(server: &MockServer) -> RemoteBlobStore {
        RemoteBlobStore::new(&server.uri(), SecretString::from("blob-secret")).unwrap()
    }

    #[tokio::test]
    async fn store_puts_bytes_and_returns_served_url() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/event-banners/[0-9a-f-]+\.png$"))
            .and(header("authorization", "Bearer blob-secret"))
            .and(header("content-type", "image/png"))
            .and(body_bytes(b"fake png".to_vec()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "url": "https://cdn.example.com/event-banners/a.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = remote(&server)
            .store(Bytes::from_static(b"fake png"), "image/png", "event-banners")
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.example.com/event-banners/a.png");
    }

    #[tokio::test]
    async fn store_surfaces_service_failures() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = remote(&server)
            .store(Bytes::from_static(b"jpg"), "image/jpeg", "event-banners")
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn store_rejects_response_without_url() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let result = remote(&server)
            .store(Bytes::from_static(b"png"), "image/png", "event-banners")
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn delete_tolerates_missing_blobs() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = format!("{}/event-banners/gone.png", server.uri());
        remote(&server).delete(&url).await.unwrap();
    }

    #[tokio::test]
    async fn delete_surfaces_service_failures() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let url = format!("{}/event-banners/a.png", server.uri());
        assert!(remote(&server).delete(&url).await.is_err());
    }
}

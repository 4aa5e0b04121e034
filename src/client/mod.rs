//! HTTP client for the hosted agents service.
//!
//! [`ProjectClient`] wraps a [`reqwest::Client`] with the project endpoint,
//! bearer credentials, and the api-version query parameter every route
//! requires. The typed managers ([`crate::agent`], [`crate::thread`],
//! [`crate::vector_store`]) and the streaming relay all go through the JSON
//! helpers here, so status-code mapping lives in exactly one place:
//!
//! - 401/403 → [`AgentError::AuthError`]
//! - 404 → [`AgentError::ResourceNotFound`]
//! - other non-2xx → [`AgentError::ServiceError`] with the response body
//! - transport failures → [`AgentError::NetworkError`]

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

use crate::config::AgentChatConfig;
use crate::error::AgentError;
use crate::types::{ConnectionRecord, FileRecord, ListResponse};
use crate::Result;

/// Authenticated handle to one agents project endpoint.
#[derive(Debug, Clone)]
pub struct ProjectClient {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
    api_key: String,
}

impl ProjectClient {
    /// Build a client from configuration. Fails when no API key is configured;
    /// everything else was validated at config load.
    pub fn from_config(config: &AgentChatConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            AgentError::configuration(format!(
                "no API key configured (set {})",
                crate::config::ENV_API_KEY
            ))
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AgentError::network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            api_key,
        })
    }

    /// The project endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_json_with_query(path, &[]).await
    }

    /// GET a JSON resource with extra query parameters (paging cursors).
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .query(&[("api-version", self.api_version.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| AgentError::network(format!("GET {} failed: {}", path, e)))?;

        let response = self.check_status(path, response).await?;
        Ok(response.json::<T>().await.map_err(|e| {
            AgentError::serialization(format!("failed to decode GET {} response: {}", path, e))
        })?)
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .query(&[("api-version", self.api_version.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| AgentError::network(format!("POST {} failed: {}", path, e)))?;

        let response = self.check_status(path, response).await?;
        Ok(response.json::<T>().await.map_err(|e| {
            AgentError::serialization(format!("failed to decode POST {} response: {}", path, e))
        })?)
    }

    /// POST a JSON body and hand back the raw response for SSE consumption.
    pub async fn post_stream(&self, path: &str, body: &Value) -> Result<reqwest::Response> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .query(&[("api-version", self.api_version.as_str())])
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(body)
            .send()
            .await
            .map_err(|e| AgentError::network(format!("POST {} failed: {}", path, e)))?;

        self.check_status(path, response).await
    }

    /// DELETE a resource. 404 is surfaced as [`AgentError::ResourceNotFound`].
    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(path))
            .bearer_auth(&self.api_key)
            .query(&[("api-version", self.api_version.as_str())])
            .send()
            .await
            .map_err(|e| AgentError::network(format!("DELETE {} failed: {}", path, e)))?;

        self.check_status(path, response).await?;
        Ok(())
    }

    /// Upload one local file as a document source for indexing.
    pub async fn upload_file(&self, path: &Path) -> Result<FileRecord> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| AgentError::io(format!("unusable file name: {}", path.display())))?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AgentError::io(format!("failed to read {}: {}", path.display(), e)))?;

        tracing::debug!(file = %filename, size = bytes.len(), "uploading document");

        let form = reqwest::multipart::Form::new()
            .text("purpose", "assistants")
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(filename.clone()),
            );

        let response = self
            .http
            .post(self.url("files"))
            .bearer_auth(&self.api_key)
            .query(&[("api-version", self.api_version.as_str())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| AgentError::network(format!("upload of {} failed: {}", filename, e)))?;

        let response = self.check_status("files", response).await?;
        Ok(response.json::<FileRecord>().await.map_err(|e| {
            AgentError::serialization(format!("failed to decode upload response: {}", e))
        })?)
    }

    /// Resolve a named project connection (web-search grounding) to its id.
    ///
    /// Callers treat a failure here as non-fatal: the chat degrades to
    /// operating without the web-search tool.
    pub async fn resolve_connection(&self, name: &str) -> Result<ConnectionRecord> {
        let mut after: Option<String> = None;
        loop {
            let query: Vec<(&str, &str)> = match &after {
                Some(cursor) => vec![("after", cursor.as_str())],
                None => vec![],
            };
            let page: ListResponse<ConnectionRecord> =
                self.get_json_with_query("connections", &query).await?;

            if let Some(connection) = page.data.into_iter().find(|c| c.name == name) {
                tracing::info!(connection = %name, id = %connection.id, "resolved web-search connection");
                return Ok(connection);
            }
            if !page.has_more {
                return Err(AgentError::not_found(format!(
                    "connection '{}' not found on project",
                    name
                )));
            }
            after = page.last_id;
            if after.is_none() {
                return Err(AgentError::not_found(format!(
                    "connection '{}' not found on project",
                    name
                )));
            }
        }
    }

    async fn check_status(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        tracing::warn!(%path, status = status.as_u16(), "service returned an error: {}", body);

        match status.as_u16() {
            401 | 403 => Err(AgentError::auth(format!(
                "service rejected credentials for {}: {}",
                path, body
            ))),
            404 => Err(AgentError::not_found(format!("{}: {}", path, body))),
            code => Err(AgentError::service(code, body)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AgentChatConfig {
        AgentChatConfig {
            endpoint: "https://example.test/api/projects/demo/".to_string(),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let config = AgentChatConfig {
            endpoint: "https://example.test/project".to_string(),
            ..Default::default()
        };
        let err = ProjectClient::from_config(&config).unwrap_err();
        assert!(err.is_user_error());
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ProjectClient::from_config(&test_config()).unwrap();
        assert_eq!(
            client.url("/threads"),
            "https://example.test/api/projects/demo/threads"
        );
        assert_eq!(
            client.url("assistants"),
            "https://example.test/api/projects/demo/assistants"
        );
    }
}

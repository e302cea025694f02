//! Crucible API client.

mod datasets;
mod files;
mod instruments;
mod projects;
mod requests;
mod samples;

pub use files::sha256_file;

use crate::errors::{check, CrucibleError};
use crate::types::ApiUrl;
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, ACCEPT, AUTHORIZATION};
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Authenticated Crucible API client.
///
/// Cheap to clone: clones share one connection pool.
#[derive(Debug, Clone)]
pub struct CrucibleClient {
    client: ClientWithMiddleware,
    url: ApiUrl,
}

pub struct CrucibleClientBuilder {
    url: ApiUrl,
    builder: reqwest_middleware::ClientBuilder,
}

/// Error creating a [CrucibleClientBuilder].
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("API key cannot be used in an HTTP header")]
    ApiKey(#[from] InvalidHeaderValue),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

impl CrucibleClientBuilder {
    fn new(url: ApiUrl, api_key: &str, timeout: Option<Duration>) -> Result<Self, BuildError> {
        let builder = reqwest::ClientBuilder::new().default_headers(key2header(api_key)?);
        let builder = if let Some(timeout) = timeout {
            builder.timeout(timeout)
        } else {
            builder
        };
        let builder = reqwest_middleware::ClientBuilder::new(builder.build()?);
        Ok(Self { url, builder })
    }

    /// Add middleware to the HTTP client.
    pub fn with<M: reqwest_middleware::Middleware>(self, middleware: M) -> Self {
        Self {
            url: self.url,
            builder: self.builder.with(middleware),
        }
    }

    /// Create the client. No request is made.
    pub fn connect(self) -> CrucibleClient {
        CrucibleClient {
            client: self.builder.build(),
            url: self.url,
        }
    }
}

fn key2header(api_key: &str) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    let mut value = HeaderValue::try_from(format!("Bearer {}", api_key))?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

impl CrucibleClient {
    /// Create a client builder.
    pub fn build(url: ApiUrl, api_key: impl AsRef<str>) -> Result<CrucibleClientBuilder, BuildError> {
        CrucibleClientBuilder::new(url, api_key.as_ref(), None)
    }

    /// Create a client builder whose requests time out after `timeout`.
    pub fn build_with_timeout(
        url: ApiUrl,
        api_key: impl AsRef<str>,
        timeout: Duration,
    ) -> Result<CrucibleClientBuilder, BuildError> {
        CrucibleClientBuilder::new(url, api_key.as_ref(), Some(timeout))
    }

    /// Get the Crucible API URL.
    pub fn url(&self) -> &ApiUrl {
        &self.url
    }

    // ==================================================
    //                 HELPER METHODS
    // ==================================================

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url.endpoint(path))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url.endpoint(path))
    }

    fn patch(&self, path: &str) -> RequestBuilder {
        self.client.patch(self.url.endpoint(path))
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url.endpoint(path))
    }

    /// Send a request, check its status, and decode its JSON body.
    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, CrucibleError> {
        let res = req.send().await?;
        let body = check(res).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Like [CrucibleClient::send], but an empty body or `null` is `None`.
    async fn send_optional<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<Option<T>, CrucibleError> {
        let res = req.send().await?;
        let body = check(res).await?.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_header_is_sensitive() {
        let headers = key2header("abc123").unwrap();
        let auth = headers.get(AUTHORIZATION).unwrap();
        assert!(auth.is_sensitive());
        assert_eq!(auth.to_str().unwrap(), "Bearer abc123");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    }

    #[test]
    fn test_bad_key() {
        assert!(matches!(
            CrucibleClient::build(ApiUrl::from_static("https://example.org"), "new\nline"),
            Err(BuildError::ApiKey(_))
        ))
    }
}

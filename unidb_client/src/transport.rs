use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use parking_lot::RwLock;
use reqwest::{IntoUrl, Method, Response, StatusCode, header::CONTENT_TYPE};
use secrecy::{ExposeSecret, Secret};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;
use url::Url;

use crate::{Error, Result};

/// Executes HTTP requests against one database namespace of the remote store
///
/// Every request path is prefixed with the database namespace, so a request to `users` is sent
/// to `<base_url>/<database>/users`. A `404 Not Found` response is never an error: it is
/// reported as an absent result, the same as an empty or `null` response body.
///
/// Clones share the `Bearer` token, so [`Transport::set_token`] affects every clone.
#[derive(Debug, Clone)]
pub struct Transport {
    /// The base URL of the remote store, always ending in `/`
    base_url: Url,
    /// The database namespace prefixed to every request path
    database: Arc<str>,
    /// The `Bearer` token sent with each request, if any
    auth_token: Arc<RwLock<Option<Secret<String>>>>,
    /// Timeout applied to each request by the HTTP client
    request_timeout: Option<Duration>,
    /// A [`reqwest::Client`] for handling HTTP requests
    http_client: reqwest::Client,
}

impl Transport {
    /// Create a new [`Transport`] bound to `base_url` and the `database` namespace
    pub fn new<U: IntoUrl>(base_url: U, database: impl Into<String>) -> Result<Self> {
        let mut base_url = base_url.into_url().map_err(Error::BaseUrl)?;
        // relative joins replace the last path segment unless the path ends in a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            database: Arc::from(database.into()),
            auth_token: Default::default(),
            request_timeout: None,
            http_client: reqwest::Client::new(),
        })
    }

    /// Set the timeout the HTTP client applies to each request
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Install, or with `None` remove, the `Bearer` token sent with each subsequent request
    ///
    /// Requests already in flight are unaffected.
    pub fn set_token(&self, token: Option<&str>) {
        *self.auth_token.write() = token.map(|t| Secret::new(t.to_owned()));
        debug!(token_set = token.is_some(), "updated bearer token");
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Read from `path`, optionally sending a JSON `body`
    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<Option<R>> {
        let content = self.request(Method::GET, path, body).await?;
        decode(Method::GET, &self.namespaced(path), content)
    }

    /// Create at `path`, optionally sending a JSON `body`
    pub async fn post<R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<Option<R>> {
        let content = self.request(Method::POST, path, body).await?;
        decode(Method::POST, &self.namespaced(path), content)
    }

    /// Update at `path`, optionally sending a JSON `body`
    pub async fn put<R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<Option<R>> {
        let content = self.request(Method::PUT, path, body).await?;
        decode(Method::PUT, &self.namespaced(path), content)
    }

    /// Delete at `path`; a `body` carries the selection criteria of filter-based deletes
    pub async fn delete<R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<Option<R>> {
        let content = self.request(Method::DELETE, path, body).await?;
        decode(Method::DELETE, &self.namespaced(path), content)
    }

    /// Send a request and return the raw response body
    ///
    /// Returns `None` for a `404 Not Found` response, and fails with [`Error::Request`] for any
    /// other status outside of `2xx`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<Option<Bytes>> {
        let resp = self.execute(method.clone(), path, body).await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            debug!(%method, path, "remote store reported not found, treating as absent");
            return Ok(None);
        }
        let content = resp.bytes().await.map_err(Error::Bytes)?;
        if status.is_success() {
            Ok(Some(content))
        } else {
            Err(Error::Request {
                method,
                path: self.namespaced(path),
                status,
                message: String::from_utf8_lossy(&content).into_owned(),
            })
        }
    }

    /// Send a request without interpreting the response status
    pub(crate) async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<Response> {
        // the namespace is encoded so that a `:` in it is never read as a URL scheme
        let relative = format!(
            "{}/{}",
            urlencoding::encode(&self.database),
            path.trim_start_matches('/')
        );
        let url = self.base_url.join(&relative)?;
        let mut req = self.http_client.request(method.clone(), url.clone());
        if let Some(token) = self.auth_token.read().as_ref() {
            req = req.bearer_auth(token.expose_secret());
        }
        if let Some(timeout) = self.request_timeout {
            req = req.timeout(timeout);
        }
        if let Some(body) = body {
            req = req.header(CONTENT_TYPE, "application/json").body(body);
        }
        debug!(%method, %url, "sending request to remote store");
        req.send()
            .await
            .map_err(|src| Error::request_send(method, url, src))
    }

    fn namespaced(&self, path: &str) -> String {
        format!("{}/{}", self.database, path.trim_start_matches('/'))
    }
}

/// Encode a request body as JSON
pub(crate) fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Bytes> {
    serde_json::to_vec(body)
        .map(Bytes::from)
        .map_err(Error::Encode)
}

/// Decode a response body, treating a missing, empty, or `null` body as absent
fn decode<R: DeserializeOwned>(
    method: Method,
    path: &str,
    content: Option<Bytes>,
) -> Result<Option<R>> {
    let Some(content) = content else {
        return Ok(None);
    };
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<Option<R>>(&content).map_err(|source| Error::Decode {
        method,
        path: path.to_owned(),
        source,
    })
}

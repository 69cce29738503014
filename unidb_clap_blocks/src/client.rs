//! Config for connecting to the remote store.
use std::time::Duration;

use secrecy::{ExposeSecret, Secret};
use unidb_client::Client;
use url::Url;

/// CLI config for the universal client
#[derive(Debug, Clone, clap::Parser)]
pub struct ClientConfig {
    /// The base URL of the remote store.
    #[clap(
        long = "host",
        env = "UNIDB_HOST_URL",
        default_value = "http://127.0.0.1:5000",
        action
    )]
    pub host_url: Url,

    /// The database namespace that every collection lives in.
    #[clap(long = "database", env = "UNIDB_DATABASE_NAME", action)]
    pub database_name: String,

    /// The token sent as `Authorization: Bearer <token>` with each request.
    ///
    /// Requests are sent without an `Authorization` header if this is not set.
    #[clap(long = "token", env = "UNIDB_AUTH_TOKEN", action)]
    pub auth_token: Option<Secret<String>>,

    /// Timeout for each request to the remote store, e.g., `500ms` or `30s`.
    ///
    /// Defaults to no timeout.
    #[clap(
        long = "request-timeout",
        env = "UNIDB_REQUEST_TIMEOUT",
        value_parser = humantime::parse_duration
    )]
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Build a [`Client`] from this config
    pub fn build_client(&self) -> Result<Client, unidb_client::Error> {
        let mut client = Client::new(self.host_url.clone(), self.database_name.clone())?;
        if let Some(token) = &self.auth_token {
            client = client.with_auth_token(token.expose_secret());
        }
        if let Some(timeout) = self.request_timeout {
            client = client.with_request_timeout(timeout);
        }
        Ok(client)
    }
}

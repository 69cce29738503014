//! # unidb_client
//!
//! A typed client for a remote document store that exposes its collections over HTTP.
//!
//! A [`Client`] is bound to a base URL and a database namespace. Collections are obtained with
//! [`Client::collection`], which registers the collection's field layout with the store the
//! first time a name is used, and hands back a [`Collection`] for reads, creates, updates and
//! deletes. A `404 Not Found` from the store is never an error: reads report it as `None`.
//!
//! ```no_run
//! # use unidb_client::{Attribute, Client, FieldType, Schema};
//! # use serde::{Deserialize, Serialize};
//! #[derive(Debug, Serialize, Deserialize)]
//! struct User {
//!     id: String,
//!     email: String,
//! }
//!
//! impl Schema for User {
//!     const ATTRIBUTES: &'static [Attribute] = &[
//!         Attribute::required("id", FieldType::String),
//!         Attribute::required("email", FieldType::String),
//!     ];
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let client = Client::new("http://127.0.0.1:5000", "test_db")?;
//! let users = client.collection_for::<User>("users").await?;
//! if let Some(user) = users.get_by_id("TEST_ID").await? {
//!     println!("found {}", user.email);
//! }
//! # Ok(())
//! # }
//! ```
mod client;
mod collection;
mod schema;
mod transport;

pub use client::Client;
pub use collection::Collection;
pub use schema::{
    Attribute, FieldDescriptor, FieldType, ID_FIELD, Schema, USER_ID_FIELD,
    derive_field_descriptors,
};
pub use transport::Transport;

use reqwest::{Method, StatusCode};

/// Primary error type for the [`Client`]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("base URL error: {0}")]
    BaseUrl(#[source] reqwest::Error),

    #[error("request URL error: {0}")]
    RequestUrl(#[from] url::ParseError),

    #[error("failed to encode the request body as JSON: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to send {method} {url} request: {source}")]
    RequestSend {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read the API response bytes: {0}")]
    Bytes(#[source] reqwest::Error),

    #[error("failed to parse JSON response to {method} {path}: {source}")]
    Decode {
        method: Method,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("remote store responded to {method} {path} with error [{status}]: {message}")]
    Request {
        method: Method,
        path: String,
        status: StatusCode,
        message: String,
    },

    #[error("failed to confirm collection '{name}', remote store responded with [{status}]")]
    SchemaConfirmation { name: String, status: StatusCode },
}

impl Error {
    fn request_send(method: Method, url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::RequestSend {
            method,
            url: url.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! # unidb_auth_adapter
//!
//! Persists the users, accounts, sessions, and verification tokens of an authentication
//! framework in a remote store, through [`unidb_client`].
//!
//! ## Example
//!
//! ```no_run
//! use unidb_auth_adapter::{AuthAdapter, UniversalAdapter, models::User};
//! use unidb_client::Client;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let client = Client::new("http://127.0.0.1:5000", "auth")?;
//! let adapter = UniversalAdapter::new(client);
//!
//! let user = adapter.create_user(User::new("u1", "a@b.com")).await?;
//! assert_eq!(adapter.get_user_by_email("a@b.com").await?, Some(user));
//! # Ok(())
//! # }
//! ```

mod adapter;
pub mod models;

pub use adapter::{AuthAdapter, UniversalAdapter};

/// Errors returned by the adapter
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying client failed
    #[error(transparent)]
    Client(#[from] unidb_client::Error),

    /// The store reported no record where the operation requires one
    #[error("{operation}: no matching record in collection '{collection}'")]
    MissingRecord {
        /// Name of the collection that was queried
        collection: String,
        /// The adapter operation that needed the record
        operation: &'static str,
    },
}

/// A specialized `Result` for adapter errors
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The collection each kind of record is stored in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionNames {
    /// Holds [`models::User`] records
    pub users: String,
    /// Holds [`models::Account`] records
    pub accounts: String,
    /// Holds [`models::Session`] records
    pub sessions: String,
    /// Holds [`models::VerificationToken`] records
    pub verification_tokens: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            users: "users".to_owned(),
            accounts: "accounts".to_owned(),
            sessions: "sessions".to_owned(),
            verification_tokens: "verification_tokens".to_owned(),
        }
    }
}

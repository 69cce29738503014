use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::Mutex;
use reqwest::{IntoUrl, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    Collection, Error, FieldDescriptor, Result, Schema, Transport, transport::encode,
};

/// Confirmation state per collection name
///
/// A name is confirmed once its cell is initialised. The cell serialises concurrent
/// confirmation attempts for one name, and stays uninitialised after a failed attempt so that a
/// later call retries.
type Registry = HashMap<String, Arc<OnceCell<()>>>;

/// The universal data-access client
///
/// For typed access to named collections on a remote store over its HTTP API. Each collection's
/// field layout is confirmed with the store the first time the collection is requested, and the
/// confirmation is remembered for the lifetime of the client.
///
/// Clones share the `Bearer` token and the set of confirmed collections.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) transport: Transport,
    confirmed: Arc<Mutex<Registry>>,
}

impl Client {
    /// Create a new [`Client`] for the `database` namespace of the store at `base_url`
    ///
    /// # Example
    /// ```
    /// # use unidb_client::Client;
    /// # fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    /// let client = Client::new("http://127.0.0.1:5000", "test_db")?
    ///     .with_auth_token("secret-token-string");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new<U: IntoUrl>(base_url: U, database: impl Into<String>) -> Result<Self> {
        Ok(Self::from_transport(Transport::new(base_url, database)?))
    }

    /// Create a new [`Client`] that sends its requests through `transport`
    pub fn from_transport(transport: Transport) -> Self {
        Self {
            transport,
            confirmed: Default::default(),
        }
    }

    /// Set the `Bearer` token that will be sent with each request to the store
    pub fn with_auth_token<S: AsRef<str>>(self, auth_token: S) -> Self {
        self.transport.set_token(Some(auth_token.as_ref()));
        self
    }

    /// Set the timeout the HTTP client applies to each request
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.transport = self.transport.with_request_timeout(timeout);
        self
    }

    /// Install, or with `None` remove, the `Bearer` token for all subsequent requests
    pub fn set_token(&self, token: Option<&str>) {
        self.transport.set_token(token);
    }

    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    pub fn database(&self) -> &str {
        self.transport.database()
    }

    /// Whether the collection `name` has been confirmed by this client
    pub fn is_confirmed(&self, name: &str) -> bool {
        self.confirmed
            .lock()
            .get(name)
            .is_some_and(|cell| cell.initialized())
    }

    /// Get a handle to the collection `name`, confirming its field layout first if this client
    /// has not already done so
    ///
    /// Confirmation sends `POST <database>/collection/<name>` with `fields` as the body, and
    /// succeeds only on a `200 OK` or `201 Created` response. Once confirmed, a name is never
    /// confirmed again, even if a later call passes different `fields`. Concurrent calls for the
    /// same unconfirmed name share a single confirmation request.
    ///
    /// # Example
    /// ```no_run
    /// # use unidb_client::{Client, FieldDescriptor, FieldType};
    /// # use serde_json::{json, Value};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    /// let client = Client::new("http://127.0.0.1:5000", "test_db")?;
    /// let users = client
    ///     .collection::<Value>(
    ///         "users",
    ///         &[
    ///             FieldDescriptor::new("id", FieldType::String).main_key(),
    ///             FieldDescriptor::new("email", FieldType::String),
    ///         ],
    ///     )
    ///     .await?;
    /// let user = users.find_one(&json!({"email": "a@b.com"})).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn collection<T>(
        &self,
        name: &str,
        fields: &[FieldDescriptor],
    ) -> Result<Collection<'_, T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let cell = Arc::clone(self.confirmed.lock().entry(name.to_owned()).or_default());
        if cell.initialized() {
            debug!(collection = name, "collection already confirmed");
        } else {
            cell.get_or_try_init(|| self.confirm(name, fields)).await?;
        }
        Ok(Collection::new(self, name))
    }

    /// Get a handle to the collection `name`, confirming it with `T`'s declared field layout
    pub async fn collection_for<T>(&self, name: &str) -> Result<Collection<'_, T>>
    where
        T: Schema + Serialize + DeserializeOwned + Send + Sync,
    {
        self.collection(name, &T::field_descriptors()).await
    }

    async fn confirm(&self, name: &str, fields: &[FieldDescriptor]) -> Result<()> {
        debug!(collection = name, n_fields = fields.len(), "confirming collection");
        let resp = self
            .transport
            .execute(
                Method::POST,
                &format!("collection/{}", urlencoding::encode(name)),
                Some(encode(fields)?),
            )
            .await?;
        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => {
                info!(collection = name, "confirmed collection");
                Ok(())
            }
            status => {
                warn!(collection = name, %status, "remote store refused collection");
                Err(Error::SchemaConfirmation {
                    name: name.to_owned(),
                    status,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use serde_json::{Value, json};

    use super::*;
    use crate::FieldType;

    fn user_fields() -> Vec<FieldDescriptor> {
        vec![FieldDescriptor::new("id", FieldType::String).main_key()]
    }

    #[test_log::test(tokio::test)]
    async fn collection_is_confirmed_once() {
        let mut mock_server = Server::new_async().await;
        let mock = mock_server
            .mock("POST", "/test_db/collection/users")
            .match_header("Content-Type", "application/json")
            .match_body(Matcher::Json(json!([
                {"name": "id", "typeName": "string", "mainKey": true}
            ])))
            .with_status(201)
            .expect(1)
            .create_async()
            .await;

        let client = Client::new(mock_server.url(), "test_db").expect("create client");
        assert!(!client.is_confirmed("users"));

        let users = client
            .collection::<Value>("users", &user_fields())
            .await
            .expect("confirm users collection");
        assert_eq!(users.name(), "users");
        assert!(client.is_confirmed("users"));

        // presence based: a different layout is not re-confirmed
        client
            .collection::<Value>("users", &[])
            .await
            .expect("cached users collection");

        mock.assert_async().await;
    }

    #[test_log::test(tokio::test)]
    async fn clones_share_confirmations() {
        let mut mock_server = Server::new_async().await;
        let mock = mock_server
            .mock("POST", "/test_db/collection/users")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let client = Client::new(mock_server.url(), "test_db").expect("create client");
        let other = client.clone();
        client
            .collection::<Value>("users", &user_fields())
            .await
            .unwrap();
        other
            .collection::<Value>("users", &user_fields())
            .await
            .unwrap();

        assert!(other.is_confirmed("users"));
        mock.assert_async().await;
    }

    #[test_log::test(tokio::test)]
    async fn concurrent_confirmation_is_single_flight() {
        let mut mock_server = Server::new_async().await;
        let mock = mock_server
            .mock("POST", "/test_db/collection/users")
            .with_status(201)
            .expect(1)
            .create_async()
            .await;

        let client = Client::new(mock_server.url(), "test_db").expect("create client");
        let fields = user_fields();
        let (a, b, c) = tokio::join!(
            client.collection::<Value>("users", &fields),
            client.collection::<Value>("users", &fields),
            client.collection::<Value>("users", &fields),
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        mock.assert_async().await;
    }

    #[test_log::test(tokio::test)]
    async fn refused_confirmation_is_retried() {
        let mut mock_server = Server::new_async().await;
        let mock = mock_server
            .mock("POST", "/test_db/collection/users")
            .with_status(500)
            .expect(2)
            .create_async()
            .await;

        let client = Client::new(mock_server.url(), "test_db").expect("create client");
        for _ in 0..2 {
            let err = client
                .collection::<Value>("users", &user_fields())
                .await
                .expect_err("confirmation refused");
            match err {
                Error::SchemaConfirmation { name, status } => {
                    assert_eq!(name, "users");
                    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
        assert!(!client.is_confirmed("users"));

        mock.assert_async().await;
    }

    #[test_log::test(tokio::test)]
    async fn other_success_codes_do_not_confirm() {
        let mut mock_server = Server::new_async().await;
        let mock = mock_server
            .mock("POST", "/test_db/collection/users")
            .with_status(202)
            .create_async()
            .await;

        let client = Client::new(mock_server.url(), "test_db").expect("create client");
        let err = client
            .collection::<Value>("users", &user_fields())
            .await
            .unwrap_err();

        assert!(
            matches!(err, Error::SchemaConfirmation { status, .. } if status == StatusCode::ACCEPTED),
            "got {err}"
        );
        assert!(!client.is_confirmed("users"));
        mock.assert_async().await;
    }

    #[test_log::test(tokio::test)]
    async fn not_found_does_not_confirm() {
        let mut mock_server = Server::new_async().await;
        let mock = mock_server
            .mock("POST", "/test_db/collection/users")
            .with_status(404)
            .create_async()
            .await;

        let client = Client::new(mock_server.url(), "test_db").expect("create client");
        let err = client
            .collection::<Value>("users", &user_fields())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::SchemaConfirmation { .. }), "got {err}");
        mock.assert_async().await;
    }

    #[test_log::test(tokio::test)]
    async fn collection_name_is_one_path_segment() {
        let mut mock_server = Server::new_async().await;
        let confirm = mock_server
            .mock("POST", "/test_db/collection/team%2Fusers%3F")
            .with_status(201)
            .create_async()
            .await;
        let read = mock_server
            .mock("GET", "/test_db/team%2Fusers%3F")
            .with_status(200)
            .with_body(r#"{"id": "u1"}"#)
            .create_async()
            .await;

        let client = Client::new(mock_server.url(), "test_db").expect("create client");
        let users = client
            .collection::<Value>("team/users?", &user_fields())
            .await
            .unwrap();
        assert_eq!(users.name(), "team/users?");
        assert_eq!(users.get_by_id("u1").await.unwrap(), Some(json!({"id": "u1"})));

        confirm.assert_async().await;
        read.assert_async().await;
    }

    #[test_log::test(tokio::test)]
    async fn auth_token_lifecycle() {
        let token = "super-secret-token";
        let mut mock_server = Server::new_async().await;
        let confirm = mock_server
            .mock("POST", "/test_db/collection/users")
            .match_header("Authorization", format!("Bearer {token}").as_str())
            .with_status(201)
            .create_async()
            .await;
        let read = mock_server
            .mock("GET", "/test_db/users")
            .match_header("Authorization", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"id": "u1"}"#)
            .create_async()
            .await;

        let client = Client::new(mock_server.url(), "test_db")
            .expect("create client")
            .with_auth_token(token);
        let users = client
            .collection::<Value>("users", &user_fields())
            .await
            .unwrap();

        client.set_token(Some("abc"));
        client.set_token(None);
        let user = users.get_by_id("u1").await.unwrap();

        assert_eq!(user, Some(json!({"id": "u1"})));
        confirm.assert_async().await;
        read.assert_async().await;
    }

    #[test_log::test(tokio::test)]
    async fn collection_for_uses_declared_schema() {
        #[derive(Debug, Serialize, serde::Deserialize)]
        struct Note {
            #[serde(rename = "userId")]
            user_id: String,
            body: String,
        }
        impl Schema for Note {
            const ATTRIBUTES: &'static [crate::Attribute] = &[
                crate::Attribute::required("userId", FieldType::String),
                crate::Attribute::optional("body", FieldType::String),
            ];
        }

        let mut mock_server = Server::new_async().await;
        let mock = mock_server
            .mock("POST", "/test_db/collection/notes")
            .match_body(Matcher::Json(json!([
                {"name": "id", "typeName": "string", "mainKey": true},
                {"name": "body", "typeName": "string", "optional": true},
            ])))
            .with_status(200)
            .create_async()
            .await;

        let client = Client::new(mock_server.url(), "test_db").expect("create client");
        client.collection_for::<Note>("notes").await.unwrap();

        mock.assert_async().await;
    }
}

use std::fmt::Debug;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use unidb_client::{Client, Collection};

use crate::{
    CollectionNames, Error, Result,
    models::{
        Account, ProviderAccount, Session, SessionAndUser, SessionUpdate, User, UserUpdate,
        VerificationToken,
    },
};

/// Storage operations required by an authentication framework
#[async_trait]
pub trait AuthAdapter: Debug + Send + Sync + 'static {
    /// Store a new user
    async fn create_user(&self, user: User) -> Result<User>;

    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Find the user that owns the account linked through `account`
    async fn get_user_by_account(&self, account: &ProviderAccount) -> Result<Option<User>>;

    /// Apply `update` to an existing user, failing with [`Error::MissingRecord`] if there is none
    async fn update_user(&self, update: UserUpdate) -> Result<User>;

    /// Delete a user together with all of its accounts and sessions
    async fn delete_user(&self, id: &str) -> Result<()>;

    async fn link_account(&self, account: Account) -> Result<Account>;

    /// Remove the account linked through `account`, returning it if it existed
    async fn unlink_account(&self, account: &ProviderAccount) -> Result<Option<Account>>;

    async fn create_session(&self, session: Session) -> Result<Session>;

    async fn get_session_and_user(&self, session_token: &str) -> Result<Option<SessionAndUser>>;

    async fn update_session(&self, update: SessionUpdate) -> Result<Option<Session>>;

    async fn delete_session(&self, session_token: &str) -> Result<Option<Session>>;

    async fn create_verification_token(
        &self,
        token: VerificationToken,
    ) -> Result<VerificationToken>;

    /// Consume a verification token: it is deleted and returned, if it existed
    async fn use_verification_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> Result<Option<VerificationToken>>;
}

#[derive(Debug, Serialize)]
struct IdFilter<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserIdFilter<'a> {
    user_id: &'a str,
}

#[derive(Debug, Serialize)]
struct EmailFilter<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionTokenFilter<'a> {
    session_token: &'a str,
}

#[derive(Debug, Serialize)]
struct VerificationTokenFilter<'a> {
    identifier: &'a str,
    token: &'a str,
}

/// Handles to all collections used by the adapter, each confirmed with its record layout
#[derive(Debug)]
struct Collections<'c> {
    users: Collection<'c, User>,
    accounts: Collection<'c, Account>,
    sessions: Collection<'c, Session>,
    verification_tokens: Collection<'c, VerificationToken>,
}

/// An [`AuthAdapter`] that keeps its records in a remote store reached through a [`Client`]
///
/// Every operation goes through typed collection handles, so each collection is confirmed with
/// the store the first time any operation runs.
#[derive(Debug, Clone)]
pub struct UniversalAdapter {
    client: Client,
    collections: CollectionNames,
}

impl UniversalAdapter {
    /// Create a new adapter using the default collection names
    pub fn new(client: Client) -> Self {
        Self {
            client,
            collections: CollectionNames::default(),
        }
    }

    /// Store records in the collections named by `collections`
    pub fn with_collection_names(mut self, collections: CollectionNames) -> Self {
        self.collections = collections;
        self
    }

    /// The client the adapter sends its requests through
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn collection_names(&self) -> &CollectionNames {
        &self.collections
    }

    async fn collections(&self) -> Result<Collections<'_>> {
        let names = &self.collections;
        Ok(Collections {
            users: self.client.collection_for(&names.users).await?,
            accounts: self.client.collection_for(&names.accounts).await?,
            sessions: self.client.collection_for(&names.sessions).await?,
            verification_tokens: self
                .client
                .collection_for(&names.verification_tokens)
                .await?,
        })
    }
}

#[async_trait]
impl AuthAdapter for UniversalAdapter {
    async fn create_user(&self, user: User) -> Result<User> {
        let db = self.collections().await?;
        // stores that do not echo the record back still accepted it
        Ok(db.users.create(&user).await?.unwrap_or(user))
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let db = self.collections().await?;
        Ok(db.users.get_by_id(id).await?)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let db = self.collections().await?;
        Ok(db.users.find_one(&EmailFilter { email }).await?)
    }

    async fn get_user_by_account(&self, account: &ProviderAccount) -> Result<Option<User>> {
        let db = self.collections().await?;
        let Some(linked) = db.accounts.find_one(account).await? else {
            debug!(
                provider = %account.provider,
                provider_account_id = %account.provider_account_id,
                "no account linked"
            );
            return Ok(None);
        };
        Ok(db.users.get_by_id(&linked.user_id).await?)
    }

    async fn update_user(&self, update: UserUpdate) -> Result<User> {
        let db = self.collections().await?;
        db.users
            .update_by_id(&update.id, &update)
            .await?
            .ok_or_else(|| Error::MissingRecord {
                collection: db.users.name().to_owned(),
                operation: "update_user",
            })
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        let db = self.collections().await?;
        let owned_by = UserIdFilter { user_id: id };
        let by_id = IdFilter { id };
        futures::try_join!(
            db.accounts.delete_many(&owned_by),
            db.sessions.delete_many(&owned_by),
            db.users.delete_one(&by_id),
        )?;
        debug!(user_id = id, "deleted user with accounts and sessions");
        Ok(())
    }

    async fn link_account(&self, account: Account) -> Result<Account> {
        let db = self.collections().await?;
        Ok(db.accounts.insert_one(&account).await?.unwrap_or(account))
    }

    async fn unlink_account(&self, account: &ProviderAccount) -> Result<Option<Account>> {
        let db = self.collections().await?;
        Ok(db.accounts.find_one_and_delete(account).await?)
    }

    async fn create_session(&self, session: Session) -> Result<Session> {
        let db = self.collections().await?;
        Ok(db.sessions.insert_one(&session).await?.unwrap_or(session))
    }

    async fn get_session_and_user(&self, session_token: &str) -> Result<Option<SessionAndUser>> {
        let db = self.collections().await?;
        let Some(session) = db
            .sessions
            .find_one(&SessionTokenFilter { session_token })
            .await?
        else {
            return Ok(None);
        };
        let user = db
            .users
            .find_one(&IdFilter {
                id: &session.user_id,
            })
            .await?;
        if user.is_none() {
            debug!(user_id = %session.user_id, "session refers to a missing user");
        }
        Ok(user.map(|user| SessionAndUser { session, user }))
    }

    async fn update_session(&self, update: SessionUpdate) -> Result<Option<Session>> {
        let db = self.collections().await?;
        let filter = SessionTokenFilter {
            session_token: &update.session_token,
        };
        Ok(db.sessions.find_one_and_update(&filter, &update).await?)
    }

    async fn delete_session(&self, session_token: &str) -> Result<Option<Session>> {
        let db = self.collections().await?;
        Ok(db
            .sessions
            .find_one_and_delete(&SessionTokenFilter { session_token })
            .await?)
    }

    async fn create_verification_token(
        &self,
        token: VerificationToken,
    ) -> Result<VerificationToken> {
        let db = self.collections().await?;
        db.verification_tokens.insert_one(&token).await?;
        Ok(token)
    }

    async fn use_verification_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> Result<Option<VerificationToken>> {
        let db = self.collections().await?;
        Ok(db
            .verification_tokens
            .find_one_and_delete(&VerificationTokenFilter { identifier, token })
            .await?)
    }
}

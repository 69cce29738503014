//! Accounts

use serde::{Deserialize, Serialize};
use unidb_client::{Attribute, FieldType, Schema};

/// The kind of provider an [`Account`] is linked through
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// OAuth 2 provider
    Oauth,
    /// OpenID Connect provider
    Oidc,
    /// Email (magic link) provider
    Email,
    /// WebAuthn provider
    Webauthn,
}

/// Account Schema
///
/// Links a [`User`][crate::models::User] to an account at an external provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// ID of the user that owns the account
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Provider ID, e.g., `github`
    pub provider: String,
    /// The account's ID at the provider
    #[serde(rename = "providerAccountId")]
    pub provider_account_id: String,
    #[serde(rename = "type")]
    pub kind: AccountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Expiry of `access_token`, in seconds since the UNIX epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl Account {
    /// Returns instance of Account
    pub fn new(
        user_id: impl Into<String>,
        provider: impl Into<String>,
        provider_account_id: impl Into<String>,
        kind: AccountType,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            provider: provider.into(),
            provider_account_id: provider_account_id.into(),
            kind,
            id: None,
            access_token: None,
            expires_at: None,
            refresh_token: None,
            scope: None,
            token_type: None,
        }
    }

    /// The provider-side identity of this account
    pub fn provider_account(&self) -> ProviderAccount {
        ProviderAccount::new(&self.provider, &self.provider_account_id)
    }
}

impl Schema for Account {
    const ATTRIBUTES: &'static [Attribute] = &[
        Attribute::required("userId", FieldType::String),
        Attribute::required("provider", FieldType::String),
        Attribute::required("providerAccountId", FieldType::String),
        Attribute::required("type", FieldType::String),
        Attribute::optional("id", FieldType::String),
        Attribute::optional("access_token", FieldType::String),
        Attribute::optional("expires_at", FieldType::Number),
        Attribute::optional("refresh_token", FieldType::String),
        Attribute::optional("scope", FieldType::String),
        Attribute::optional("token_type", FieldType::String),
    ];
}

/// Identifies an [`Account`] by its provider and the account's ID at that provider
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAccount {
    pub provider: String,
    pub provider_account_id: String,
}

impl ProviderAccount {
    pub fn new(provider: impl Into<String>, provider_account_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            provider_account_id: provider_account_id.into(),
        }
    }
}

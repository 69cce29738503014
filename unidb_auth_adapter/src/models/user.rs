//! Users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unidb_client::{Attribute, FieldType, Schema};

/// User Schema
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID
    pub id: String,
    /// User email address
    pub email: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// When the email address was verified, if it has been
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<DateTime<Utc>>,
    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl User {
    /// Returns instance of User
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: None,
            email_verified: None,
            image: None,
        }
    }
}

impl Schema for User {
    const ATTRIBUTES: &'static [Attribute] = &[
        Attribute::required("id", FieldType::String),
        Attribute::required("email", FieldType::String),
        Attribute::optional("name", FieldType::String),
        Attribute::optional("emailVerified", FieldType::Date),
        Attribute::optional("image", FieldType::String),
    ];
}

/// A partial update to the [`User`] with ID `id`
///
/// Only the fields that are set are sent to the store.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    /// ID of the user to update
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl UserUpdate {
    /// Returns an update to the user `id` that changes nothing
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

//! Sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unidb_client::{Attribute, FieldType, Schema};

use crate::models::User;

/// Session Schema
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque token identifying the session
    pub session_token: String,
    /// ID of the user the session belongs to
    pub user_id: String,
    pub expires: DateTime<Utc>,
}

impl Session {
    /// Returns instance of Session
    pub fn new(
        session_token: impl Into<String>,
        user_id: impl Into<String>,
        expires: DateTime<Utc>,
    ) -> Self {
        Self {
            session_token: session_token.into(),
            user_id: user_id.into(),
            expires,
        }
    }
}

impl Schema for Session {
    const ATTRIBUTES: &'static [Attribute] = &[
        Attribute::required("sessionToken", FieldType::String),
        Attribute::required("userId", FieldType::String),
        Attribute::required("expires", FieldType::Date),
    ];
}

/// A partial update to the [`Session`] identified by `session_token`
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    pub session_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

/// A [`Session`] together with the [`User`] it belongs to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAndUser {
    pub session: Session,
    pub user: User,
}

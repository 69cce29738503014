//! Verification tokens

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unidb_client::{Attribute, FieldType, Schema};

/// A single-use token, e.g., for passwordless sign in
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationToken {
    /// Who the token was issued to, usually an email address
    pub identifier: String,
    pub token: String,
    pub expires: DateTime<Utc>,
}

impl Schema for VerificationToken {
    const ATTRIBUTES: &'static [Attribute] = &[
        Attribute::required("identifier", FieldType::String),
        Attribute::required("token", FieldType::String),
        Attribute::required("expires", FieldType::Date),
    ];
}

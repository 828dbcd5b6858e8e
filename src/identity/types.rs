use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::AuthUser;
use crate::SecretString;

/// Identity as seen by the access layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Account {
    pub id: i64,
    pub email: String,
}

impl From<&AuthUser> for Account {
    fn from(user: &AuthUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub account: Account,
    pub token: SecretString,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Profile fields collected at signup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileAttributes {
    pub first_name: String,
    pub last_name: String,
}

impl ProfileAttributes {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Primary account record. `password_hash` is absent for accounts created
/// through an external identity provider and is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub admin: bool,
    pub permissions: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Secondary per-account record holding contact fields and mirrored flags.
/// Created lazily on the first profile update, keyed one-to-one by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub admin: bool,
    pub permissions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flattened view of a user and their profile record. When both records
/// exist, the profile record's flags win.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedProfile {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub admin: bool,
    pub permissions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MergedProfile {
    #[must_use]
    pub fn from_records(user: User, info: Option<UserInfo>) -> Self {
        match info {
            Some(info) => Self {
                id: user.id,
                email: user.email,
                name: user.name,
                image: info.image,
                admin: info.admin,
                permissions: info.permissions,
                phone: info.phone,
                street_address: info.street_address,
                created_at: user.created_at,
                updated_at: if info.updated_at > user.updated_at {
                    info.updated_at
                } else {
                    user.updated_at
                },
            },
            None => Self {
                id: user.id,
                email: user.email,
                name: user.name,
                image: None,
                admin: user.admin,
                permissions: user.permissions,
                phone: None,
                street_address: None,
                created_at: user.created_at,
                updated_at: user.updated_at,
            },
        }
    }
}

/// Request-scoped identity resolved from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

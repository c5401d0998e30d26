use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Operator,
    PurokLeader,
    #[default]
    Citizen,
    Admin,
}

impl Role {
    /// Roles allowed to manage other users' punishments
    pub fn can_moderate(&self) -> bool {
        matches!(self, Self::Operator | Self::Admin)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Operator => write!(f, "operator"),
            Self::PurokLeader => write!(f, "purok_leader"),
            Self::Citizen => write!(f, "citizen"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub email_verified: bool,
    pub token_version: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_time: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_ts: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_ts: Option<u64>,
}

/// Public view of an user, never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct UserProfile {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub email_verified: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_time: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_ts: Option<u64>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            email_verified: user.email_verified,
            last_login_time: user.last_login_time,
            created_ts: user.created_ts,
        }
    }
}

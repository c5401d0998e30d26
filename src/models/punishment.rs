use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

use crate::constants::*;

/// Punishment tiers in escalation order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, ToSchema)]
pub enum PunishmentType {
    #[serde(rename = "warning_1")]
    Warning1,
    #[serde(rename = "warning_2")]
    Warning2,
    #[serde(rename = "suspension")]
    Suspension,
}

impl PunishmentType {
    pub const ESCALATION: [PunishmentType; 3] = [Self::Warning1, Self::Warning2, Self::Suspension];

    /// How long the punishment lasts, `None` means permanent
    pub fn duration_secs(&self) -> Option<u64> {
        match self {
            Self::Warning1 => Some(WARNING_1_DAYS * 24 * 3600),
            Self::Warning2 => Some(WARNING_2_DAYS * 24 * 3600),
            Self::Suspension => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning1 => "warning_1",
            Self::Warning2 => "warning_2",
            Self::Suspension => "suspension",
        }
    }
}

impl Display for PunishmentType {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PunishmentStatus {
    Active,
    Expired,
    Revoked,
}

impl PunishmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PunishmentRecord {
    pub id: u32,
    pub user_id: u32,
    pub punishment_type: PunishmentType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    pub suspended_at: u64,
    pub expires_at: Option<u64>,
    pub status: PunishmentStatus,
    pub issued_by: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_by: Option<u32>,
}

impl PunishmentRecord {
    pub fn new(
        id: u32,
        user_id: u32,
        punishment_type: PunishmentType,
        reason: Option<String>,
        issued_by: u32,
        now: u64,
    ) -> Self {
        Self {
            id,
            user_id,
            punishment_type,
            reason,
            suspended_at: now,
            expires_at: punishment_type.duration_secs().map(|secs| now + secs),
            status: PunishmentStatus::Active,
            issued_by,
            revoked_at: None,
            revoked_by: None,
        }
    }

    /// Status as of `now`. A stored active record is expired once `now` passes `expires_at`.
    pub fn effective_status(&self, now: u64) -> PunishmentStatus {
        match (self.status, self.expires_at) {
            (PunishmentStatus::Active, Some(expires_at)) if now > expires_at => {
                PunishmentStatus::Expired
            }
            (status, _) => status,
        }
    }

    pub fn is_active(&self, now: u64) -> bool {
        self.effective_status(now) == PunishmentStatus::Active
    }

    /// Copy of the record with the lazily computed status written in
    pub fn resolved(mut self, now: u64) -> Self {
        self.status = self.effective_status(now);
        self
    }
}

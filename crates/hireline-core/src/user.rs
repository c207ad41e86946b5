//! User roles and identity verification state.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Employee,
    Employer,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Employee => "employee",
            UserRole::Employer => "employer",
            UserRole::Admin => "admin",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "employee" => Ok(UserRole::Employee),
            "employer" => Ok(UserRole::Employer),
            "admin" => Ok(UserRole::Admin),
            other => Err(Error::InvalidInput(format!("unknown user role: {}", other))),
        }
    }
}

/// Progress of the selfie-based identity check.
///
/// A user starts `Unverified`, moves to `Pending` once a selfie is uploaded,
/// and a reviewer settles a pending check as `Verified` or `Rejected`. A fresh
/// upload after rejection puts the user back into `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Unverified => "unverified",
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        }
    }

    /// Whether a reviewer may settle a pending check with this status.
    pub fn is_review_outcome(&self) -> bool {
        matches!(
            self,
            VerificationStatus::Verified | VerificationStatus::Rejected
        )
    }
}

impl std::str::FromStr for VerificationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unverified" => Ok(VerificationStatus::Unverified),
            "pending" => Ok(VerificationStatus::Pending),
            "verified" => Ok(VerificationStatus::Verified),
            "rejected" => Ok(VerificationStatus::Rejected),
            other => Err(Error::InvalidInput(format!(
                "unknown verification status: {}",
                other
            ))),
        }
    }
}

//! Status of a pending edit.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Accepted,
    Rejected,
    Pending,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Pending => "pending",
        }
    }

    /// Human-readable label, as shown in the changes log filter.
    pub fn label(&self) -> &'static str {
        self.as_str()
    }

    /// Display order used by the changes log.
    pub fn all() -> &'static [Self] {
        &[Self::Accepted, Self::Rejected, Self::Pending]
    }

    /// Only pending edits can still be moderated.
    pub fn can_moderate(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl FromStr for ChangeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "pending" => Ok(Self::Pending),
            other => Err(format!("unknown change status '{}'", other)),
        }
    }
}

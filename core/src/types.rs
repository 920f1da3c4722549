//! Shared primitive types used across the core.

use crate::error::DeskError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A stable, unique identifier for an investment record.
pub type InvestmentId = String;

/// The customer key shared by investment records and ledger entries.
pub type Username = String;

/// Where an investment sits in its lifecycle.
///
/// `pending` moves to exactly one terminal value, `active` or `rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentStatus {
    Pending,
    Active,
    Rejected,
}

impl InvestmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for InvestmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvestmentStatus {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "rejected" => Ok(Self::Rejected),
            other => Err(DeskError::InvalidInput {
                what: format!("unknown investment status '{other}'"),
            }),
        }
    }
}

/// A lifecycle decision on a pending investment.
///
/// Only the two terminal statuses are decisions; any other string fails
/// at the parse boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Active,
    Rejected,
}

impl Decision {
    /// The terminal status this decision moves the investment to.
    pub fn terminal_status(&self) -> InvestmentStatus {
        match self {
            Self::Active => InvestmentStatus::Active,
            Self::Rejected => InvestmentStatus::Rejected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.terminal_status().as_str()
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "rejected" => Ok(Self::Rejected),
            other => Err(DeskError::InvalidInput {
                what: format!("unknown decision '{other}' (expected 'active' or 'rejected')"),
            }),
        }
    }
}

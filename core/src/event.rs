//! Audit events — lifecycle decisions and accrual sweeps leave a trail.
//!
//! Variants are added as operations grow — never removed or reordered.

use crate::types::{InvestmentId, Username};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeskEvent {
    InvestmentActivated {
        investment_id: InvestmentId,
        username: Username,
        plan: String,
        amount: f64,
        ppd_increment: f64,
    },
    InvestmentRejected {
        investment_id: InvestmentId,
        username: Username,
        comment: String,
    },
    AccrualRunCompleted {
        run_date: String,
        credited: u64,
        skipped: u64,
        failed: u64,
    },
}

/// Extract a stable string name from a DeskEvent variant.
/// Used for the event_type column in audit_log.
pub fn event_type_name(event: &DeskEvent) -> &'static str {
    match event {
        DeskEvent::InvestmentActivated { .. } => "investment_activated",
        DeskEvent::InvestmentRejected { .. } => "investment_rejected",
        DeskEvent::AccrualRunCompleted { .. } => "accrual_run_completed",
    }
}

/// The audit entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Option<i64>,
    pub at: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized DeskEvent
}

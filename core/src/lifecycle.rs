//! Investment lifecycle controller — applies accept/reject decisions.
//!
//! Lifecycle: pending → active | rejected. A terminal record never moves
//! again; deciding it a second time is an `InvalidStateTransition`. The
//! legacy behavior (re-applying ledger increments on every call) survives
//! behind `permit_redecide()` for deployments that need exact parity with
//! the old panel — it double-credits the ledger and is not the default.

use crate::{
    config::PlanCatalog,
    error::{DeskError, DeskResult},
    event::{event_type_name, AuditEntry, DeskEvent},
    store::DeskStore,
    types::{Decision, InvestmentId, InvestmentStatus, Username},
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// An investment record as submitted by a customer and decided here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investment {
    pub investment_id: InvestmentId,
    pub username: Username,
    pub plan: String,
    pub amount: f64,
    pub status: String,
    pub comment: Option<String>,
    pub submitted_at: String,
    pub decided_at: Option<String>,
}

/// Confirmation returned to the caller after a decision lands.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionOutcome {
    pub investment_id: InvestmentId,
    pub status: InvestmentStatus,
}

pub struct LifecycleController<'a> {
    store: &'a DeskStore,
    catalog: &'a PlanCatalog,
    permit_redecide: bool,
}

impl<'a> LifecycleController<'a> {
    pub fn new(store: &'a DeskStore, catalog: &'a PlanCatalog) -> Self {
        Self {
            store,
            catalog,
            permit_redecide: false,
        }
    }

    /// Legacy-parity mode: skip the pending guard and re-apply ledger
    /// increments on every activation, exactly like the old panel did.
    pub fn permit_redecide(mut self) -> Self {
        self.permit_redecide = true;
        self
    }

    /// Apply a terminal decision to a pending investment.
    ///
    /// Rejection touches only the investment record. Activation also
    /// credits the owner's ledger — daily rate from the plan catalog
    /// (zero for an unrecognized plan) and principal by the full
    /// amount — in the same transaction as the status write, so a
    /// missing ledger entry leaves the investment untouched.
    pub fn decide(
        &self,
        investment_id: &str,
        decision: Decision,
        comment: &str,
        now: DateTime<FixedOffset>,
    ) -> DeskResult<DecisionOutcome> {
        let investment = self
            .store
            .get_investment(investment_id)?
            .ok_or_else(|| DeskError::InvestmentNotFound {
                id: investment_id.to_string(),
            })?;

        if !self.permit_redecide && investment.status != InvestmentStatus::Pending.as_str() {
            log::warn!(
                "lifecycle: refused to re-decide {investment_id} (status '{}')",
                investment.status
            );
            return Err(DeskError::InvalidStateTransition {
                id: investment_id.to_string(),
                status: investment.status,
            });
        }

        let decided_at = now.to_rfc3339();
        match decision {
            Decision::Rejected => {
                self.store.reject_investment(
                    investment_id,
                    comment,
                    &decided_at,
                    !self.permit_redecide,
                )?;

                self.append_audit(
                    &decided_at,
                    &DeskEvent::InvestmentRejected {
                        investment_id: investment_id.to_string(),
                        username: investment.username.clone(),
                        comment: comment.to_string(),
                    },
                );
                log::info!(
                    "lifecycle: rejected {investment_id} for {}",
                    investment.username
                );

                Ok(DecisionOutcome {
                    investment_id: investment_id.to_string(),
                    status: InvestmentStatus::Rejected,
                })
            }
            Decision::Active => {
                let ppd_increment = self.catalog.rate(&investment.plan);
                if ppd_increment == 0.0 {
                    log::warn!(
                        "lifecycle: plan '{}' has no configured rate; {investment_id} activates with zero accrual",
                        investment.plan
                    );
                }

                self.store.apply_activation(
                    investment_id,
                    comment,
                    &decided_at,
                    &investment.username,
                    &investment.plan,
                    investment.amount,
                    ppd_increment,
                    !self.permit_redecide,
                )?;

                self.append_audit(
                    &decided_at,
                    &DeskEvent::InvestmentActivated {
                        investment_id: investment_id.to_string(),
                        username: investment.username.clone(),
                        plan: investment.plan.clone(),
                        amount: investment.amount,
                        ppd_increment,
                    },
                );
                log::info!(
                    "lifecycle: activated {investment_id} for {} (plan {}, +{ppd_increment}/day, +{} principal)",
                    investment.username,
                    investment.plan,
                    investment.amount
                );

                Ok(DecisionOutcome {
                    investment_id: investment_id.to_string(),
                    status: InvestmentStatus::Active,
                })
            }
        }
    }

    /// Audit is best-effort: a failed append never unwinds a decision
    /// that already committed.
    fn append_audit(&self, at: &str, event: &DeskEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("lifecycle: audit payload serialization failed: {err}");
                return;
            }
        };
        let entry = AuditEntry {
            id: None,
            at: at.to_string(),
            event_type: event_type_name(event).to_string(),
            payload,
        };
        if let Err(err) = self.store.append_audit(&entry) {
            log::warn!("lifecycle: audit append failed: {err}");
        }
    }
}

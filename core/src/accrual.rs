//! Daily profit accrual engine.
//!
//! Once per local calendar day, every ledger entry with a configured
//! rate is credited by exactly that rate. The sweep is idempotent per
//! (customer, day): an entry already stamped for the run's date is
//! skipped, so a restart near the fire time cannot double-credit and a
//! re-run after partial failure retries only the entries that missed.

use crate::{
    error::DeskResult,
    event::{event_type_name, AuditEntry, DeskEvent},
    scheduler::DailySchedule,
    store::DeskStore,
    types::Username,
};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// A customer's financial ledger entry.
///
/// `ppd` is the cumulative daily rate across all activated plans;
/// `None` means no rate was ever configured and the accrual sweep
/// passes the entry over entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerLedger {
    pub username: Username,
    pub plan: Option<String>,
    pub ppd: Option<f64>,
    pub current_invest: f64,
    pub profit: f64,
    pub last_crawl: Option<String>,
}

/// Outcome of one daily sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccrualSummary {
    pub credited: u64,
    pub skipped: u64,
    pub failed: u64,
}

pub struct AccrualEngine<'a> {
    store: &'a DeskStore,
    schedule: DailySchedule,
}

impl<'a> AccrualEngine<'a> {
    pub fn new(store: &'a DeskStore, schedule: DailySchedule) -> Self {
        Self { store, schedule }
    }

    /// Run one sweep anchored to `now`.
    ///
    /// Per-entry failures are logged and counted, never fatal — one bad
    /// row must not starve the rest of the book.
    pub fn run_daily(&self, now: DateTime<FixedOffset>) -> DeskResult<AccrualSummary> {
        let run_date = self.schedule.local_date(now);
        let started_at = now.to_rfc3339();
        let entries = self.store.customers_with_rate()?;

        let mut summary = AccrualSummary::default();
        for entry in &entries {
            let Some(ppd) = entry.ppd else { continue };

            if self.credited_on_or_after(entry, run_date) {
                summary.skipped += 1;
                continue;
            }

            match self.store.credit_profit(&entry.username, ppd, &started_at) {
                Ok(()) => {
                    summary.credited += 1;
                    log::debug!("accrual: credited {} by {ppd}", entry.username);
                }
                Err(err) => {
                    summary.failed += 1;
                    log::warn!("accrual: crediting {} failed: {err}", entry.username);
                }
            }
        }

        if let Err(err) = self.store.record_accrual_run(
            &run_date.to_string(),
            &started_at,
            summary.credited,
            summary.skipped,
            summary.failed,
        ) {
            log::warn!("accrual: recording run marker for {run_date} failed: {err}");
        }
        self.append_audit(&started_at, run_date, summary);

        log::info!(
            "accrual: {run_date} swept {} entries ({} credited, {} skipped, {} failed)",
            entries.len(),
            summary.credited,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    /// True when the entry's last credit already falls on (or past) the
    /// run's local date. An unparseable stamp counts as stale: crediting
    /// again beats silently never crediting.
    fn credited_on_or_after(&self, entry: &CustomerLedger, run_date: NaiveDate) -> bool {
        let Some(last_crawl) = entry.last_crawl.as_deref() else {
            return false;
        };
        match DateTime::parse_from_rfc3339(last_crawl) {
            Ok(stamp) => self.schedule.local_date(stamp) >= run_date,
            Err(err) => {
                log::warn!(
                    "accrual: unparseable last_crawl for {}: {err}",
                    entry.username
                );
                false
            }
        }
    }

    fn append_audit(&self, at: &str, run_date: NaiveDate, summary: AccrualSummary) {
        let event = DeskEvent::AccrualRunCompleted {
            run_date: run_date.to_string(),
            credited: summary.credited,
            skipped: summary.skipped,
            failed: summary.failed,
        };
        let payload = match serde_json::to_string(&event) {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("accrual: audit payload serialization failed: {err}");
                return;
            }
        };
        let entry = AuditEntry {
            id: None,
            at: at.to_string(),
            event_type: event_type_name(&event).to_string(),
            payload,
        };
        if let Err(err) = self.store.append_audit(&entry) {
            log::warn!("accrual: audit append failed: {err}");
        }
    }
}

use chrono::{DateTime, FixedOffset};
use investdesk_core::{
    accrual::{AccrualEngine, CustomerLedger},
    scheduler::DailySchedule,
    store::DeskStore,
};

// ── Test helpers ────────────────────────────────────────────────────────────

fn make_store() -> DeskStore {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = DeskStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

fn midnight_pkt() -> DailySchedule {
    DailySchedule::new(0, 0, 5 * 60).unwrap()
}

fn at(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap()
}

fn ledger(username: &str, ppd: Option<f64>, profit: f64) -> CustomerLedger {
    CustomerLedger {
        username: username.to_string(),
        plan: None,
        ppd,
        current_invest: 0.0,
        profit,
        last_crawl: None,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// One sweep credits every entry with a configured rate by exactly that
/// rate and stamps the crawl time. Continues the lifecycle worked
/// example: alice at ppd=40 / profit=50 ends the day at profit=90.
#[test]
fn daily_run_credits_every_rated_entry() {
    let store = make_store();
    store.insert_customer(&ledger("alice", Some(40.0), 50.0)).unwrap();
    store.insert_customer(&ledger("bob", Some(4.0), 0.0)).unwrap();

    let now = at("2024-06-05T00:00:00+05:00");
    let summary = AccrualEngine::new(&store, midnight_pkt()).run_daily(now).unwrap();

    assert_eq!(summary.credited, 2);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed, 0);

    let alice = store.get_customer("alice").unwrap().unwrap();
    assert_eq!(alice.profit, 90.0);
    assert_eq!(alice.last_crawl.as_deref(), Some("2024-06-05T00:00:00+05:00"));

    let bob = store.get_customer("bob").unwrap().unwrap();
    assert_eq!(bob.profit, 4.0);
}

/// Entries with no configured rate never enter the sweep — not credited,
/// not stamped, and absent from the summary counts.
#[test]
fn unrated_entries_are_untouched() {
    let store = make_store();
    store.insert_customer(&ledger("alice", Some(20.0), 0.0)).unwrap();
    store.insert_customer(&ledger("norate", None, 7.0)).unwrap();

    let summary = AccrualEngine::new(&store, midnight_pkt())
        .run_daily(at("2024-06-05T00:00:00+05:00"))
        .unwrap();

    assert_eq!(summary.credited, 1);
    assert_eq!(summary.skipped, 0, "unrated entries are not 'skipped', they are unselected");

    let norate = store.get_customer("norate").unwrap().unwrap();
    assert_eq!(norate.profit, 7.0);
    assert_eq!(norate.last_crawl, None);
}

/// The sweep is idempotent per calendar day: a second invocation on the
/// same local date credits nothing.
#[test]
fn second_run_same_day_credits_nothing() {
    let store = make_store();
    store.insert_customer(&ledger("alice", Some(40.0), 50.0)).unwrap();

    let engine = AccrualEngine::new(&store, midnight_pkt());
    engine.run_daily(at("2024-06-05T00:00:00+05:00")).unwrap();

    // Same day, three hours later — a restart near the trigger time.
    let rerun = engine.run_daily(at("2024-06-05T03:00:00+05:00")).unwrap();
    assert_eq!(rerun.credited, 0);
    assert_eq!(rerun.skipped, 1);

    let alice = store.get_customer("alice").unwrap().unwrap();
    assert_eq!(alice.profit, 90.0, "same-day rerun must not double-credit");
}

/// The next local day credits again: 50 → 90 → 130 across two midnights.
#[test]
fn next_day_credits_again() {
    let store = make_store();
    store.insert_customer(&ledger("alice", Some(40.0), 50.0)).unwrap();

    let engine = AccrualEngine::new(&store, midnight_pkt());
    engine.run_daily(at("2024-06-05T00:00:00+05:00")).unwrap();
    let day_two = engine.run_daily(at("2024-06-06T00:00:00+05:00")).unwrap();

    assert_eq!(day_two.credited, 1);
    let alice = store.get_customer("alice").unwrap().unwrap();
    assert_eq!(alice.profit, 130.0);
}

/// Day boundaries follow the anchored timezone, not UTC: 20:00 UTC and
/// 01:00 UTC the next UTC day are the same +05:00 calendar date.
#[test]
fn idempotency_is_anchored_to_the_schedule_timezone() {
    let store = make_store();
    store.insert_customer(&ledger("alice", Some(10.0), 0.0)).unwrap();

    let engine = AccrualEngine::new(&store, midnight_pkt());
    // 19:01 UTC on the 4th = 00:01 on the 5th in +05:00.
    engine.run_daily(at("2024-06-04T19:01:00+00:00")).unwrap();
    // 10:00 UTC on the 5th = 15:00 on the 5th in +05:00 — same local day.
    let rerun = engine.run_daily(at("2024-06-05T10:00:00+00:00")).unwrap();

    assert_eq!(rerun.credited, 0);
    assert_eq!(rerun.skipped, 1);
    let alice = store.get_customer("alice").unwrap().unwrap();
    assert_eq!(alice.profit, 10.0);
}

/// One entry failing to update must not abort the sweep. The poisoned
/// row here carries a negative rate that would drive profit below the
/// schema's non-negative floor, so its update is refused by SQLite while
/// everyone else still gets credited — and a rerun retries only the
/// failed entry.
#[test]
fn partial_failure_is_isolated() {
    let store = make_store();
    store.insert_customer(&ledger("alice", Some(40.0), 50.0)).unwrap();
    store.insert_customer(&ledger("bob", Some(4.0), 0.0)).unwrap();
    store.insert_customer(&ledger("poisoned", Some(-10.0), 5.0)).unwrap();

    let engine = AccrualEngine::new(&store, midnight_pkt());
    let summary = engine.run_daily(at("2024-06-05T00:00:00+05:00")).unwrap();

    assert_eq!(summary.credited, 2);
    assert_eq!(summary.failed, 1);

    let alice = store.get_customer("alice").unwrap().unwrap();
    assert_eq!(alice.profit, 90.0, "healthy entries still credit");
    let poisoned = store.get_customer("poisoned").unwrap().unwrap();
    assert_eq!(poisoned.profit, 5.0, "failed entry is left as it was");
    assert_eq!(poisoned.last_crawl, None);

    // Rerun the same day: the credited pair is skipped, the poisoned
    // entry is retried (and fails again).
    let rerun = engine.run_daily(at("2024-06-05T06:00:00+05:00")).unwrap();
    assert_eq!(rerun.credited, 0);
    assert_eq!(rerun.skipped, 2);
    assert_eq!(rerun.failed, 1);
}

/// Every sweep records a run marker for its local date and an audit
/// entry with the final counts.
#[test]
fn sweep_records_marker_and_audit_entry() {
    let store = make_store();
    store.insert_customer(&ledger("alice", Some(40.0), 0.0)).unwrap();

    AccrualEngine::new(&store, midnight_pkt())
        .run_daily(at("2024-06-05T00:00:00+05:00"))
        .unwrap();

    assert!(store.accrual_run_exists("2024-06-05").unwrap());
    assert!(!store.accrual_run_exists("2024-06-04").unwrap());

    let audits = store.audit_entries("accrual_run_completed").unwrap();
    assert_eq!(audits.len(), 1);
    assert!(audits[0].payload.contains("2024-06-05"));
}

/// An empty book sweeps cleanly: zero counts, marker still recorded.
#[test]
fn empty_book_sweeps_cleanly() {
    let store = make_store();

    let summary = AccrualEngine::new(&store, midnight_pkt())
        .run_daily(at("2024-06-05T00:00:00+05:00"))
        .unwrap();

    assert_eq!(summary.credited, 0);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed, 0);
    assert!(store.accrual_run_exists("2024-06-05").unwrap());
}

//! admin-runner: headless operations console for the investment desk.
//!
//! Usage:
//!   admin-runner list --status pending [--db desk.db]
//!   admin-runner show --id <investment-id>
//!   admin-runner decide --id <investment-id> --status active --comment "docs verified"
//!   admin-runner accrue-now
//!   admin-runner daemon
//!   admin-runner seed-demo [--username demo] [--plan gold] [--amount 500]

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use investdesk_core::{
    accrual::{AccrualEngine, AccrualSummary, CustomerLedger},
    config::DeskConfig,
    lifecycle::{Investment, LifecycleController},
    query::InvestmentQueries,
    scheduler::DailySchedule,
    store::DeskStore,
    types::{Decision, InvestmentStatus},
};
use std::env;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("help");
    let db = flag_value(&args, "--db").unwrap_or("desk.db");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");

    if command == "help" {
        usage();
        return Ok(());
    }

    let config = DeskConfig::load(data_dir)?;
    let store = DeskStore::open(db)?;
    store.migrate()?;

    match command {
        "list" => {
            let status = InvestmentStatus::from_str(require(&args, "--status")?)?;
            let investments = InvestmentQueries::new(&store).find_by_status(status)?;
            for investment in &investments {
                println!("{}", serde_json::to_string(investment)?);
            }
            // An empty book is a normal answer, not an error: exit 0.
            log::info!("{} investment(s) with status {status}", investments.len());
        }
        "show" => {
            let id = require(&args, "--id")?;
            let investment = InvestmentQueries::new(&store).find_by_id(id)?;
            println!("{}", serde_json::to_string(&investment)?);
        }
        "decide" => {
            let id = require(&args, "--id")?;
            let decision = Decision::from_str(require(&args, "--status")?)?;
            let comment = flag_value(&args, "--comment").unwrap_or("");
            let controller = LifecycleController::new(&store, &config.plans);
            let outcome = controller.decide(id, decision, comment, now())?;
            println!("{} -> {}", outcome.investment_id, outcome.status);
        }
        "accrue-now" => {
            let schedule = DailySchedule::from_config(&config.accrual)?;
            let summary = AccrualEngine::new(&store, schedule).run_daily(now())?;
            print_accrual_summary(&summary);
        }
        "daemon" => run_daemon(&store, &config)?,
        "seed-demo" => seed_demo(&store, &args)?,
        other => {
            usage();
            anyhow::bail!("unknown command '{other}'");
        }
    }

    Ok(())
}

/// Sleep-and-fire loop: one accrual sweep per local fire time. A failed
/// sweep is logged and the loop re-arms — the next midnight retries
/// whatever was missed (the engine skips entries already credited).
fn run_daemon(store: &DeskStore, config: &DeskConfig) -> Result<()> {
    let schedule = DailySchedule::from_config(&config.accrual)?;
    let engine = AccrualEngine::new(store, schedule);

    loop {
        let next = schedule.next_fire_after(now());
        log::info!("daemon: next accrual sweep at {next}");
        wait_until(next);

        match engine.run_daily(now()) {
            Ok(summary) => print_accrual_summary(&summary),
            Err(err) => log::error!("daemon: accrual sweep failed: {err}"),
        }
    }
}

/// Sleep in bounded chunks so a suspended host wakes up close to the
/// fire time instead of oversleeping the whole gap.
fn wait_until(fire_at: DateTime<FixedOffset>) {
    loop {
        match (fire_at - now()).to_std() {
            Ok(remaining) if !remaining.is_zero() => {
                thread::sleep(remaining.min(Duration::from_secs(60)));
            }
            _ => return,
        }
    }
}

fn seed_demo(store: &DeskStore, args: &[String]) -> Result<()> {
    let username = flag_value(args, "--username").unwrap_or("demo");
    let plan = flag_value(args, "--plan").unwrap_or("gold");
    let amount = parse_arg(args, "--amount", 500.0);

    if store.get_customer(username)?.is_none() {
        store.insert_customer(&CustomerLedger {
            username: username.to_string(),
            plan: None,
            ppd: None,
            current_invest: 0.0,
            profit: 0.0,
            last_crawl: None,
        })?;
        println!("created customer {username}");
    }

    let investment = Investment {
        investment_id: uuid::Uuid::new_v4().to_string(),
        username: username.to_string(),
        plan: plan.to_string(),
        amount,
        status: InvestmentStatus::Pending.as_str().to_string(),
        comment: None,
        submitted_at: now().to_rfc3339(),
        decided_at: None,
    };
    store.insert_investment(&investment)?;
    println!(
        "created pending investment {} ({plan}, {amount})",
        investment.investment_id
    );
    Ok(())
}

fn print_accrual_summary(summary: &AccrualSummary) {
    println!("=== ACCRUAL SUMMARY ===");
    println!("  credited: {}", summary.credited);
    println!("  skipped:  {}", summary.skipped);
    println!("  failed:   {}", summary.failed);
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn require<'a>(args: &'a [String], flag: &str) -> Result<&'a str> {
    flag_value(args, flag).ok_or_else(|| anyhow::anyhow!("missing required {flag} <value>"))
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn usage() {
    println!("admin-runner — investment desk operations");
    println!();
    println!("  list       --status <pending|active|rejected>");
    println!("  show       --id <investment-id>");
    println!("  decide     --id <investment-id> --status <active|rejected> [--comment <text>]");
    println!("  accrue-now");
    println!("  daemon");
    println!("  seed-demo  [--username <name>] [--plan <plan>] [--amount <n>]");
    println!();
    println!("  common flags: --db <path> (default desk.db), --data-dir <dir> (default ./data)");
}

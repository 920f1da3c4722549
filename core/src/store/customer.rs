use super::DeskStore;
use crate::accrual::CustomerLedger;
use crate::error::{DeskError, DeskResult};
use rusqlite::{params, OptionalExtension};

fn ledger_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<CustomerLedger> {
    Ok(CustomerLedger {
        username: row.get(0)?,
        plan: row.get(1)?,
        ppd: row.get(2)?,
        current_invest: row.get(3)?,
        profit: row.get(4)?,
        last_crawl: row.get(5)?,
    })
}

const LEDGER_COLUMNS: &str = "username, plan, ppd, current_invest, profit, last_crawl";

impl DeskStore {
    /// Insert a ledger entry. The registration flow owns creation; the
    /// lifecycle controller and accrual engine only mutate.
    pub fn insert_customer(&self, entry: &CustomerLedger) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO customer (
                username, plan, ppd, current_invest, profit, last_crawl
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.username,
                entry.plan,
                entry.ppd,
                entry.current_invest,
                entry.profit,
                entry.last_crawl,
            ],
        )?;
        Ok(())
    }

    pub fn get_customer(&self, username: &str) -> DeskResult<Option<CustomerLedger>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LEDGER_COLUMNS} FROM customer WHERE username = ?1"
        ))?;
        let result = stmt
            .query_row(params![username], ledger_row_mapper)
            .optional()?;
        Ok(result)
    }

    /// Every ledger entry with a configured accrual rate. Entries whose
    /// ppd is NULL never enter the daily sweep — absence of a rate is
    /// not a rate of zero.
    pub fn customers_with_rate(&self) -> DeskResult<Vec<CustomerLedger>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LEDGER_COLUMNS} FROM customer
             WHERE ppd IS NOT NULL
             ORDER BY username ASC"
        ))?;
        let rows = stmt.query_map([], ledger_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Credit one day of profit and stamp the crawl time. Add-delta in
    /// SQL: concurrent activations cannot lose this update.
    pub fn credit_profit(&self, username: &str, ppd: f64, now: &str) -> DeskResult<()> {
        let updated = self.conn.execute(
            "UPDATE customer
             SET profit = profit + ?1, last_crawl = ?2
             WHERE username = ?3",
            params![ppd, now, username],
        )?;
        if updated == 0 {
            return Err(DeskError::CustomerNotFound {
                username: username.to_string(),
            });
        }
        Ok(())
    }
}

use super::DeskStore;
use crate::error::{DeskError, DeskResult};
use crate::lifecycle::Investment;
use crate::types::InvestmentStatus;
use rusqlite::{params, OptionalExtension};

fn investment_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<Investment> {
    Ok(Investment {
        investment_id: row.get(0)?,
        username: row.get(1)?,
        plan: row.get(2)?,
        amount: row.get(3)?,
        status: row.get(4)?,
        comment: row.get(5)?,
        submitted_at: row.get(6)?,
        decided_at: row.get(7)?,
    })
}

const INVESTMENT_COLUMNS: &str =
    "investment_id, username, plan, amount, status, comment, submitted_at, decided_at";

impl DeskStore {
    /// Insert a freshly submitted investment. The submission flow owns
    /// record creation; everything after that goes through the
    /// lifecycle controller.
    pub fn insert_investment(&self, inv: &Investment) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO investment (
                investment_id, username, plan, amount, status,
                comment, submitted_at, decided_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                inv.investment_id,
                inv.username,
                inv.plan,
                inv.amount,
                inv.status,
                inv.comment,
                inv.submitted_at,
                inv.decided_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_investment(&self, investment_id: &str) -> DeskResult<Option<Investment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {INVESTMENT_COLUMNS} FROM investment WHERE investment_id = ?1"
        ))?;
        let result = stmt
            .query_row(params![investment_id], investment_row_mapper)
            .optional()?;
        Ok(result)
    }

    pub fn investments_by_status(
        &self,
        status: InvestmentStatus,
    ) -> DeskResult<Vec<Investment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {INVESTMENT_COLUMNS} FROM investment
             WHERE status = ?1
             ORDER BY submitted_at ASC, investment_id ASC"
        ))?;
        let rows = stmt.query_map(params![status.as_str()], investment_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Move an investment to `rejected` with the deciding comment.
    /// With `require_pending` the update is guarded; zero rows means the
    /// record left `pending` between read and write.
    pub fn reject_investment(
        &self,
        investment_id: &str,
        comment: &str,
        decided_at: &str,
        require_pending: bool,
    ) -> DeskResult<()> {
        let sql = if require_pending {
            "UPDATE investment SET status = 'rejected', comment = ?1, decided_at = ?2
             WHERE investment_id = ?3 AND status = 'pending'"
        } else {
            "UPDATE investment SET status = 'rejected', comment = ?1, decided_at = ?2
             WHERE investment_id = ?3"
        };
        let updated = self
            .conn
            .execute(sql, params![comment, decided_at, investment_id])?;
        if updated == 0 {
            return Err(self.decision_conflict(investment_id)?);
        }
        Ok(())
    }

    /// Activate an investment and credit the owning ledger entry in one
    /// transaction. Either both writes land or neither does — a missing
    /// ledger entry rolls the status write back.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_activation(
        &self,
        investment_id: &str,
        comment: &str,
        decided_at: &str,
        username: &str,
        plan: &str,
        amount: f64,
        ppd_increment: f64,
        require_pending: bool,
    ) -> DeskResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        let sql = if require_pending {
            "UPDATE investment SET status = 'active', comment = ?1, decided_at = ?2
             WHERE investment_id = ?3 AND status = 'pending'"
        } else {
            "UPDATE investment SET status = 'active', comment = ?1, decided_at = ?2
             WHERE investment_id = ?3"
        };
        let updated = tx.execute(sql, params![comment, decided_at, investment_id])?;
        if updated == 0 {
            // Dropping the transaction rolls back.
            return Err(self.decision_conflict(investment_id)?);
        }

        // Ledger increments are add-delta in SQL so concurrent decisions
        // and the daily sweep never lose updates. An entry with no rate
        // configured yet starts accruing from zero here.
        let credited = tx.execute(
            "UPDATE customer
             SET ppd = COALESCE(ppd, 0.0) + ?1,
                 current_invest = current_invest + ?2,
                 plan = ?3
             WHERE username = ?4",
            params![ppd_increment, amount, plan, username],
        )?;
        if credited == 0 {
            return Err(DeskError::CustomerNotFound {
                username: username.to_string(),
            });
        }

        tx.commit()?;
        Ok(())
    }

    /// Classify a zero-row guarded update: the record either vanished or
    /// already holds a terminal status.
    fn decision_conflict(&self, investment_id: &str) -> DeskResult<DeskError> {
        let status: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM investment WHERE investment_id = ?1",
                params![investment_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(match status {
            Some(status) => DeskError::InvalidStateTransition {
                id: investment_id.to_string(),
                status,
            },
            None => DeskError::InvestmentNotFound {
                id: investment_id.to_string(),
            },
        })
    }
}

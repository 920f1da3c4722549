//! Read-only investment queries for the reporting layer.

use crate::{
    error::{DeskError, DeskResult},
    lifecycle::Investment,
    store::DeskStore,
    types::InvestmentStatus,
};

pub struct InvestmentQueries<'a> {
    store: &'a DeskStore,
}

impl<'a> InvestmentQueries<'a> {
    pub fn new(store: &'a DeskStore) -> Self {
        Self { store }
    }

    /// All investments with the given status, oldest first.
    ///
    /// An empty result is a valid answer, distinct from an unknown
    /// status string (which fails at the parse boundary). The old panel
    /// reported "no matches" as not-found; callers that still need that
    /// signal map the empty list at the transport edge.
    pub fn find_by_status(&self, status: InvestmentStatus) -> DeskResult<Vec<Investment>> {
        self.store.investments_by_status(status)
    }

    pub fn find_by_id(&self, investment_id: &str) -> DeskResult<Investment> {
        self.store
            .get_investment(investment_id)?
            .ok_or_else(|| DeskError::InvestmentNotFound {
                id: investment_id.to_string(),
            })
    }
}

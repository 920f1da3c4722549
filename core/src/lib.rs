//! investdesk-core — investment lifecycle control and daily profit accrual.
//!
//! The calling layer (transport, auth, sessions) lives elsewhere. This
//! crate owns the state machine a submitted investment moves through,
//! the customer ledger it credits, and the once-a-day sweep that turns
//! configured rates into profit.
//!
//! RULES:
//!   - Only the store talks to SQL; controllers go through store methods.
//!   - Stores and the plan catalog are injected — no process-wide globals.
//!   - Time enters through method parameters; nothing here reads a clock.

pub mod accrual;
pub mod config;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod query;
pub mod scheduler;
pub mod store;
pub mod types;

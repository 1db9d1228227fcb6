//! The ledger engine
//!
//! Date management, piecewise ledgers and the budget built on them

pub mod budget;
pub mod date;
pub mod ledger;

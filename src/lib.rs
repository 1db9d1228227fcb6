//! Day-precise income accounting
//!
//! Amounts earned or spent over ranges of days are recorded in piecewise
//! ledgers (`util`), driven by a text command stream (`load`, `cli`).

pub mod cli;
pub mod load;
pub mod util;

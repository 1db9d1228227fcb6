//! Command-line front-end: settings, logging, and the session
//! executing parsed commands

pub mod logging;
pub mod session;
pub mod settings;

//! jackal-rs library
//!
//! Command implementations behind the `jackal-rs` binary, exposed for reuse.

pub mod cli;
pub mod commands;
pub mod utils;

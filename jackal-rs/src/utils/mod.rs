//! Shared utilities for the jackal-rs CLI

pub mod format;
pub mod tree;

pub use format::*;
pub use tree::*;

//! Command implementations for the wingstrap CLI

pub mod check_updates;
pub mod install;

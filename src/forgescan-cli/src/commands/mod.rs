//! Command handlers for the forgescan CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod configure;
pub mod scan;

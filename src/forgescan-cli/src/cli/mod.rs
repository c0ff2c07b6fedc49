//! CLI argument definitions for forgescan

mod core;

pub use core::{Cli, Commands};

//! CLI module
//!
//! Command-line binding for the merge controller.
//!
//! # Commands
//!
//! - `list` - Load one or more pages and print them
//! - `browse` - Load more on demand from the terminal

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{listing_json, Runner};

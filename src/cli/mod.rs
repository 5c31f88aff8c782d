//! CLI module
//!
//! Command-line interface for running retrievals.
//!
//! # Commands
//!
//! - `retrieve` - Retrieve an object type into a JSON lines file
//! - `resume` - Continue a paused retrieval
//! - `objects` - List configured object types
//! - `validate` - Check the config file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;

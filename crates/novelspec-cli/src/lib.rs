//! NovelSpec CLI library
//!
//! Core library components for the `novelspec` binary.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod prompts;

pub use error::CliError;

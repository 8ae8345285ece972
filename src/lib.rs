//! `gtm_editor` - GTM container export editor
//!
//! This crate provides the `gtmx` CLI on top of [`gtm_lib`]: loading a
//! container export, browsing and editing its entities, and reconciling
//! it against a row of the tracker spreadsheet.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Layered YAML configuration
//! - [`format`] - Output formatting (text, JSON)
//! - [`logging`] - tracing subscriber setup
//! - [`sheets`] - Google Sheets values client
//! - [`storage`] - Local API key and template slots

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod format;
pub mod logging;
pub mod sheets;
pub mod storage;

/// Run the CLI application.
///
/// This is the main entry point called from `main()`.
///
/// # Errors
///
/// Returns an error if the command fails.
pub fn run() -> anyhow::Result<()> {
    cli::run()
}

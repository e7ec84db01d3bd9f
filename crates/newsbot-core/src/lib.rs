//! Core domain + application logic for the Telegram news bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the headline
//! service live behind ports (traits) implemented in adapter crates.

pub mod catalog;
pub mod config;
pub mod digest;
pub mod domain;
pub mod errors;
pub mod filter;
pub mod flow;
pub mod formatting;
pub mod logging;
pub mod matcher;
pub mod messaging;
pub mod news;
pub mod session;
pub mod store;
pub mod utils;

pub use errors::{Error, Result};

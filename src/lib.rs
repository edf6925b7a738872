//! Command-line podcast manager.
//!
//! Imports podcast subscriptions from OPML files into a local SQLite
//! database and lists them back.
//!
//! - [`feed`] - OPML parsing
//! - [`storage`] - SQLite schema and queries
//! - [`ui`] - Interactive menu
//! - [`config`] - Optional TOML configuration

pub mod config;
pub mod feed;
pub mod storage;
pub mod ui;
pub mod util;

//! Command-line interface: banner, numbered menu, and the actions behind it.
//!
//! - `menu` - Menu loop, selection parsing, banner
//! - `actions` - Import and listing, shared with the non-interactive flags

pub mod actions;
mod menu;

pub use menu::{print_banner, Action, Menu, MenuChoice};

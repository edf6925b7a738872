//! Text helpers for printing untrusted names to the terminal.
//!
//! # Examples
//!
//! ```
//! use podshelf::util::{strip_control_chars, truncate_to_width};
//!
//! let name = strip_control_chars("\x1b[31mMy Show\x1b[0m");
//! assert_eq!(truncate_to_width(&name, 5), "My...");
//! ```

mod text;

pub use text::{strip_control_chars, to_single_line, truncate_to_width};

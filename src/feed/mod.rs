//! OPML subscription import.
//!
//! [`parse`] reads an OPML file and returns one [`Podcast`](crate::storage::Podcast)
//! per second-level outline, numbered from zero in document order.
//!
//! # Example
//!
//! ```ignore
//! use podshelf::feed::parse;
//!
//! let podcasts = parse("/path/to/subscriptions.opml").await?;
//! let report = db.insert_podcasts(&podcasts).await?;
//! ```

mod opml;

pub use opml::{parse, parse_opml_content, ParseError, MAX_OPML_DEPTH};

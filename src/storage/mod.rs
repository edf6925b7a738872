mod podcasts;
mod schema;
mod settings;
mod types;

pub use schema::Database;
pub use types::{DatabaseError, Episode, FailedInsert, InsertReport, Podcast};

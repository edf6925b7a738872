use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Database-specific errors with user-friendly messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The database file could not be opened or created
    #[error("Unable to open podcast database at '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: sqlx::Error,
    },

    /// Schema setup failed
    #[error("Database schema setup failed: {0}")]
    Migration(String),
}

// ============================================================================
// Data Structures
// ============================================================================

/// A podcast episode.
///
/// The schema has a table for these, but no operation populates it yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub id: i64,
    pub name: String,
    pub url: String,
}

/// A podcast feed subscription.
///
/// `id` is a surrogate key assigned from the feed's position in the OPML
/// document it was imported from, so it is only unique within one import.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Podcast {
    pub id: i64,
    pub name: String,
    pub url: String,
    #[sqlx(skip)]
    pub episodes: Vec<Episode>,
}

impl Podcast {
    pub fn new(id: i64, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            url: url.into(),
            episodes: Vec::new(),
        }
    }
}

/// A row that could not be written during [`Database::insert_podcasts`].
///
/// [`Database::insert_podcasts`]: super::Database::insert_podcasts
#[derive(Debug)]
pub struct FailedInsert {
    pub id: i64,
    pub name: String,
    pub error: sqlx::Error,
}

/// Outcome of a batch insert.
///
/// Rows listed in `failed` were skipped; every other row was committed.
#[derive(Debug, Default)]
pub struct InsertReport {
    pub inserted: usize,
    pub failed: Vec<FailedInsert>,
}

impl InsertReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

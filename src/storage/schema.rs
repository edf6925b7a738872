use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;

use super::types::DatabaseError;

// ============================================================================
// Database
// ============================================================================

#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open (creating if absent) the podcast database and ensure the schema exists.
    ///
    /// `":memory:"` opens a private in-memory database, which is what the tests use.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Open` if the file cannot be opened or created.
    /// Returns `DatabaseError::Migration` if schema setup fails.
    pub async fn open(path: &str) -> Result<Self, DatabaseError> {
        let open_err = |source| DatabaseError::Open {
            path: path.to_string(),
            source,
        };

        // A file path is taken literally: going through a `sqlite:` URL would
        // percent-decode it and cut it at the first `?`.
        let options = if path == ":memory:" {
            SqliteConnectOptions::from_str("sqlite::memory:").map_err(open_err)?
        } else {
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
        };

        // Foreign keys are a per-connection setting, so configure them on the options
        // rather than with a one-off PRAGMA.
        let options = options
            .foreign_keys(true)
            .pragma("busy_timeout", "5000");

        // One user, one action at a time. A single connection also keeps an
        // in-memory database alive for the lifetime of the pool.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(open_err)?;

        let db = Self { pool };
        db.migrate()
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;

        tracing::debug!(path = %path, "Opened podcast database");
        Ok(db)
    }

    /// Close every connection held by this handle.
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Create every table and index that does not exist yet.
    ///
    /// All statements use `IF NOT EXISTS` and nothing is ever dropped or altered,
    /// so running this against an initialized database is a no-op. The whole
    /// setup runs in one transaction.
    pub async fn migrate(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS Settings (
                key TEXT NOT NULL COLLATE NOCASE,
                value TEXT NULL COLLATE NOCASE,
                PRIMARY KEY (key)
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS Podcast (
                id INTEGER NOT NULL,
                name TEXT NOT NULL COLLATE NOCASE,
                url TEXT NOT NULL COLLATE NOCASE,
                PRIMARY KEY (id)
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS NDX_Podcast_name ON Podcast (name)")
            .execute(&mut *tx)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS NDX_Podcast_url ON Podcast (url)")
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS Episode (
                id INTEGER NOT NULL,
                name TEXT NOT NULL COLLATE NOCASE,
                url TEXT NOT NULL COLLATE NOCASE,
                PRIMARY KEY (id)
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS NDX_Episode_name ON Episode (name)")
            .execute(&mut *tx)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS NDX_Episode_url ON Episode (url)")
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS Podcast_Episode (
                podcast_id INTEGER NOT NULL,
                episode_id INTEGER NOT NULL,
                PRIMARY KEY (podcast_id, episode_id),
                FOREIGN KEY (podcast_id) REFERENCES Podcast (id),
                FOREIGN KEY (episode_id) REFERENCES Episode (id)
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS Subscription (
                id INTEGER NOT NULL,
                PRIMARY KEY (id)
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS Subscription_Podcast (
                subscription_id INTEGER NOT NULL,
                podcast_id INTEGER NOT NULL,
                PRIMARY KEY (subscription_id, podcast_id),
                FOREIGN KEY (subscription_id) REFERENCES Subscription (id),
                FOREIGN KEY (podcast_id) REFERENCES Podcast (id)
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::Database;

    const TABLES: [&str; 6] = [
        "Episode",
        "Podcast",
        "Podcast_Episode",
        "Settings",
        "Subscription",
        "Subscription_Podcast",
    ];

    async fn table_names(db: &Database) -> Vec<String> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&db.pool)
        .await
        .unwrap();
        rows.into_iter().map(|(name,)| name).collect()
    }

    #[tokio::test]
    async fn test_open_creates_all_tables() {
        let db = Database::open(":memory:").await.unwrap();
        assert_eq!(table_names(&db).await, TABLES);
    }

    #[tokio::test]
    async fn test_open_creates_indexes() {
        let db = Database::open(":memory:").await.unwrap();
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND name LIKE 'NDX_%' ORDER BY name",
        )
        .fetch_all(&db.pool)
        .await
        .unwrap();
        let names: Vec<String> = rows.into_iter().map(|(name,)| name).collect();
        assert_eq!(
            names,
            [
                "NDX_Episode_name",
                "NDX_Episode_url",
                "NDX_Podcast_name",
                "NDX_Podcast_url"
            ]
        );
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let db = Database::open(":memory:").await.unwrap();
        sqlx::query("INSERT INTO Podcast (id, name, url) VALUES (0, 'Kept', 'http://kept')")
            .execute(&db.pool)
            .await
            .unwrap();

        db.migrate().await.unwrap();
        db.migrate().await.unwrap();

        assert_eq!(table_names(&db).await, TABLES);
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM Podcast")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let db = Database::open(":memory:").await.unwrap();
        let result =
            sqlx::query("INSERT INTO Podcast_Episode (podcast_id, episode_id) VALUES (1, 1)")
                .execute(&db.pool)
                .await;
        assert!(result.is_err(), "join row without parents should be rejected");
    }

    #[tokio::test]
    async fn test_file_path_is_taken_literally() {
        let dir = std::env::temp_dir().join("podshelf_schema_test_literal_path");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        for file_name in ["a%41b.db", "what?.db", "x#y.db"] {
            let path = dir.join(file_name);
            let db = Database::open(path.to_str().unwrap()).await.unwrap();
            assert_eq!(table_names(&db).await, TABLES);
            db.close().await;
            assert!(path.exists(), "{} should exist", file_name);
        }

        assert!(!dir.join("aAb.db").exists(), "percent escapes must not be decoded");
        assert!(!dir.join("what").exists());
        assert!(!dir.join("x").exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}

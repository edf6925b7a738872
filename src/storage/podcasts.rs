use anyhow::Result;

use super::schema::Database;
use super::types::{FailedInsert, InsertReport, Podcast};

impl Database {
    // ========================================================================
    // Podcast Operations
    // ========================================================================

    /// Insert a batch of podcasts inside a single transaction.
    ///
    /// Rows are inserted with the ids they carry; nothing is upserted. A row
    /// that fails (typically a primary-key collision when the same OPML file is
    /// imported twice) is logged and recorded in the returned report, and the
    /// remaining rows still go in. The transaction commits whatever succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error only if the transaction itself cannot be started or
    /// committed. Per-row failures are reported through [`InsertReport`].
    pub async fn insert_podcasts(&self, podcasts: &[Podcast]) -> Result<InsertReport> {
        let mut report = InsertReport::default();
        if podcasts.is_empty() {
            return Ok(report);
        }

        let mut tx = self.pool.begin().await?;

        for podcast in podcasts {
            let result = sqlx::query("INSERT INTO Podcast (id, name, url) VALUES (?, ?, ?)")
                .bind(podcast.id)
                .bind(&podcast.name)
                .bind(&podcast.url)
                .execute(&mut *tx)
                .await;

            match result {
                Ok(_) => report.inserted += 1,
                Err(e) => {
                    tracing::warn!(
                        id = podcast.id,
                        name = %podcast.name,
                        error = %e,
                        "Skipping podcast that could not be inserted"
                    );
                    report.failed.push(FailedInsert {
                        id: podcast.id,
                        name: podcast.name.clone(),
                        error: e,
                    });
                }
            }
        }

        tx.commit().await?;

        tracing::info!(
            inserted = report.inserted,
            failed = report.failed.len(),
            "Podcast import committed"
        );
        Ok(report)
    }

    /// All stored podcasts, ordered by name (case-insensitive) and then id.
    ///
    /// Episodes are not loaded; every returned podcast has an empty episode list.
    pub async fn list_podcasts(&self) -> Result<Vec<Podcast>> {
        let podcasts: Vec<Podcast> =
            sqlx::query_as("SELECT id, name, url FROM Podcast ORDER BY name, id")
                .fetch_all(&self.pool)
                .await?;

        Ok(podcasts)
    }

    /// Number of stored podcasts.
    pub async fn count_podcasts(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM Podcast")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}

use anyhow::Result;

use super::schema::Database;

impl Database {
    // ========================================================================
    // Settings Operations
    // ========================================================================

    /// Get a single setting by key.
    ///
    /// Keys are matched case-insensitively. A key stored with a `NULL` value
    /// reads back as `None`, the same as a missing key.
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT value FROM Settings WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.and_then(|(value,)| value))
    }

    /// Set a setting value (UPSERT).
    pub async fn set_setting(&self, key: &str, value: Option<&str>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO Settings (key, value)
            VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All settings, ordered by key.
    pub async fn list_settings(&self) -> Result<Vec<(String, Option<String>)>> {
        let rows: Vec<(String, Option<String>)> =
            sqlx::query_as("SELECT key, value FROM Settings ORDER BY key")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows)
    }
}

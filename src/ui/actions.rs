//! The two implemented menu actions, usable from the menu loop and from the
//! command-line shortcuts alike.
//!
//! Each action opens the database, does its work, and closes it again.
//! [`prepare_database`] and [`run_shortcuts`] hold the startup work `main`
//! does before handing over to the menu.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::feed;
use crate::storage::{Database, InsertReport};
use crate::util::{strip_control_chars, to_single_line, truncate_to_width};

async fn open_database(db_path: &Path) -> Result<Database> {
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    Database::open(db_path_str)
        .await
        .with_context(|| format!("Failed to open database: {}", db_path.display()))
}

/// Name as printed in listings: control characters removed, on one line.
fn display_name(name: &str) -> String {
    to_single_line(&strip_control_chars(name)).into_owned()
}

/// Delete the database file first when `reset` is set, then create the schema
/// if it does not exist yet. The connection is closed again straight away.
pub async fn prepare_database(db_path: &Path, reset: bool, out: &mut impl Write) -> Result<()> {
    if reset && db_path.exists() {
        std::fs::remove_file(db_path)
            .with_context(|| format!("Failed to delete database: {}", db_path.display()))?;
        tracing::info!(path = %db_path.display(), "Deleted database");
        writeln!(out, "Database reset.")?;
    }

    let db = open_database(db_path).await?;
    db.close().await;
    Ok(())
}

/// Run the non-interactive `--import` and `--list` actions, import first.
///
/// Returns `false` without touching the database when neither was asked for,
/// meaning the caller should start the menu instead.
pub async fn run_shortcuts(
    db_path: &Path,
    import: Option<&Path>,
    list: bool,
    name_width: usize,
    out: &mut impl Write,
) -> Result<bool> {
    if import.is_none() && !list {
        return Ok(false);
    }
    if let Some(opml_path) = import {
        import_opml(db_path, opml_path, out).await?;
    }
    if list {
        list_podcasts(db_path, out, name_width).await?;
    }
    Ok(true)
}

/// Print every stored podcast as `[id] \t name`, ordered by name then id.
///
/// Returns the number of podcasts printed.
pub async fn list_podcasts(
    db_path: &Path,
    out: &mut impl Write,
    name_width: usize,
) -> Result<usize> {
    let db = open_database(db_path).await?;
    let podcasts = db.list_podcasts().await;
    db.close().await;
    let podcasts = podcasts.context("Failed to load podcasts")?;

    for podcast in &podcasts {
        let name = display_name(&podcast.name);
        writeln!(out, "[{}] \t {}", podcast.id, truncate_to_width(&name, name_width))?;
    }
    writeln!(out)?;

    Ok(podcasts.len())
}

/// Parse an OPML file and store every podcast it lists.
///
/// Nothing is written when the file lists no podcasts. Rows that collide
/// with podcasts already in the database are skipped and reported.
pub async fn import_opml(
    db_path: &Path,
    opml_path: &Path,
    out: &mut impl Write,
) -> Result<InsertReport> {
    let podcasts = feed::parse(opml_path)
        .await
        .context("Failed to import OPML file")?;

    if podcasts.is_empty() {
        writeln!(out, "No subscriptions found.")?;
        writeln!(out)?;
        return Ok(InsertReport::default());
    }

    let db = open_database(db_path).await?;
    let report = db.insert_podcasts(&podcasts).await;
    db.close().await;
    let report = report.context("Failed to store podcasts")?;

    writeln!(
        out,
        "Imported {} of {} podcasts from {}",
        report.inserted,
        podcasts.len(),
        opml_path.display()
    )?;
    for failed in &report.failed {
        writeln!(
            out,
            "  skipped [{}] {}: {}",
            failed.id,
            display_name(&failed.name),
            failed.error
        )?;
    }
    writeln!(out)?;

    Ok(report)
}

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::{Path, PathBuf};

use podshelf::config::Config;
use podshelf::ui::{self, Menu};

/// Get the config directory path (~/.config/podshelf/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("podshelf"))
}

/// Create the config directory if needed, readable by the current user only.
fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
        tracing::info!(path = %config_dir.display(), "Created config directory");
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o700);
        if let Err(e) = std::fs::set_permissions(config_dir, perms) {
            tracing::warn!(
                path = %config_dir.display(),
                error = %e,
                "Failed to set config directory permissions to 0700"
            );
        }
    }

    Ok(())
}

/// The config directory, created on first use. Only needed when the config
/// file or the database path is left at its default.
fn default_config_dir() -> Result<PathBuf> {
    let config_dir = get_config_dir()?;
    ensure_config_dir(&config_dir)?;
    Ok(config_dir)
}

#[derive(Parser, Debug)]
#[command(name = "podshelf", about = "Command-line podcast manager")]
struct Args {
    /// Database file (overrides the config file)
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Config file (default: ~/.config/podshelf/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Import an OPML file and exit
    #[arg(long, value_name = "FILE")]
    import: Option<PathBuf>,

    /// List stored podcasts and exit
    #[arg(long)]
    list: bool,

    /// Delete the database before starting
    #[arg(long)]
    reset_db: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with the menu on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    let db_path = config.database_path(args.db.as_deref(), default_config_dir)?;

    let mut stdout = io::stdout().lock();

    ui::actions::prepare_database(&db_path, args.reset_db, &mut stdout).await?;

    let handled = ui::actions::run_shortcuts(
        &db_path,
        args.import.as_deref(),
        args.list,
        config.name_width,
        &mut stdout,
    )
    .await?;
    if handled {
        return Ok(());
    }

    ui::print_banner(&mut stdout, config.clear_screen)?;

    let mut menu = Menu::new(io::stdin().lock(), stdout, db_path, config.name_width);
    menu.run().await
}

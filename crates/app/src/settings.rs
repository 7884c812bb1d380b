//! Handles settings for the application.
//!
//! Sources, lowest priority first: built-in defaults, the TOML file
//! (`config/tickets.toml` or `--config`), `TICKETS_*` environment variables
//! (`TICKETS_APP__LEVEL=debug`), command-line flags.
use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/tickets.toml";
const DEFAULT_DATABASE_PATH: &str = "tickets_r_us.db";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where the catalog is stored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Database::Sqlite(DEFAULT_DATABASE_PATH.to_string())
    }
}

impl Database {
    /// `memory` selects a throwaway in-memory store, anything else is a path.
    fn from_flag(value: &str) -> Self {
        if value.eq_ignore_ascii_case("memory") {
            Database::Memory
        } else {
            Database::Sqlite(value.to_string())
        }
    }

    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
}

#[derive(Debug, Parser)]
#[command(name = "tickets", about = "Interactive theatre ticket booking")]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the SQLite database path (`memory` for an in-memory store).
    #[arg(long)]
    database: Option<String>,
    /// Override the log level (error, warn, info, debug, trace).
    #[arg(long)]
    level: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let args = Args::parse();

        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("TICKETS")
                    .prefix_separator("_")
                    .separator("__"),
            );
        let mut settings: Settings = builder.build()?.try_deserialize()?;

        if let Some(database) = args.database {
            settings.database = Database::from_flag(&database);
        }
        if let Some(level) = args.level {
            settings.app.level = level;
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_urls() {
        assert_eq!(Database::Memory.url(), "sqlite::memory:");
        assert_eq!(
            Database::default().url(),
            "sqlite:tickets_r_us.db?mode=rwc"
        );
        assert_eq!(Database::from_flag("MEMORY"), Database::Memory);
        assert_eq!(
            Database::from_flag("/tmp/t.db"),
            Database::Sqlite("/tmp/t.db".to_string())
        );
    }

    #[test]
    fn file_settings_override_defaults() {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from_str(
                "[app]\nlevel = \"debug\"\n[database]\nsqlite = \"cinema.db\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.database, Database::Sqlite("cinema.db".to_string()));

        let settings: Settings = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.database, Database::default());
    }
}

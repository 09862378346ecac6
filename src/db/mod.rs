//! SQLite-backed tracker state.
//!
//! [`Database`] is the single owner of tree, habit and garden records. Every
//! operation takes the connection lock and runs inside one transaction, so a
//! read-modify-write on a record can never interleave with another writer.
//!
//! The operations are grouped by concern:
//!
//! - `trees`: planting, watering and renaming trees
//! - `habits`: adding, editing and deleting habits
//! - `completion`: completing a habit and its watering side effect
//! - `day`: the day boundary reset of completion state
//! - `garden`: garden level and the dashboard snapshot

mod completion;
mod day;
mod garden;
mod habits;
mod schema;
mod trees;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};

pub struct Database {
    conn: Arc<Mutex<Connection>>,
    clock: Arc<dyn Clock>,
    config: Arc<TrackerConfig>,
}

impl Database {
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self::from_connection(conn))
    }

    /// Open the database named by the config, or the platform default.
    pub fn open_configured(config: TrackerConfig) -> anyhow::Result<Self> {
        let path = match &config.database_path {
            Some(path) => path.clone(),
            None => default_path()?,
        };
        tracing::debug!("Opening database at {}", path.display());
        Ok(Self::open(path)?.with_config(config)?)
    }

    pub fn open_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            clock: Arc::new(SystemClock),
            config: Arc::new(TrackerConfig::default()),
        }
    }

    pub fn with_config(mut self, config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        self.config = Arc::new(config);
        Ok(self)
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn migrate(&self) -> anyhow::Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))?;
        schema::run_migrations(&conn)
    }

    /// Create the garden and the first tree if they do not exist yet.
    pub fn seed_defaults(&self) -> Result<()> {
        let now = self.clock.now();
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        garden::ensure_garden(&tx, &self.config, now)?;

        let tree_count = trees::count_trees(&tx)?;
        if tree_count == 0 && !self.config.tree_slot_levels.is_empty() {
            let tree = trees::insert_tree(
                &tx,
                0,
                &self.config.default_tree_name,
                &self.config.thresholds()?,
                now,
            )?;
            tracing::info!("Planted starter tree '{}'", tree.name);
        }

        day::roll_over_if_needed(&tx, self.today_at(now)?)?;
        tx.commit()?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| TrackerError::LockPoisoned)
    }

    /// The tracker's current calendar day.
    pub fn today(&self) -> Result<NaiveDate> {
        self.today_at(self.clock.now())
    }

    fn today_at(&self, now: DateTime<Utc>) -> Result<NaiveDate> {
        Ok(now.with_timezone(&self.config.timezone()?).date_naive())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            clock: self.clock.clone(),
            config: self.config.clone(),
        }
    }
}

fn default_path() -> anyhow::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "habit-tree")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("habit_tree.db"))
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|_| TrackerError::Corrupt(format!("invalid id '{}'", s)))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| TrackerError::Corrupt(format!("invalid timestamp '{}'", s)))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    s.parse()
        .map_err(|_| TrackerError::Corrupt(format!("invalid date '{}'", s)))
}

/// Trim a user supplied name, rejecting blank ones.
fn clean_name<'a>(name: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::validation(format!(
            "{} name cannot be empty",
            what
        )));
    }
    Ok(trimmed)
}

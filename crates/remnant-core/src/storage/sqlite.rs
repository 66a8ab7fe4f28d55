//! SQLite archive store.
//!
//! Profiles and media live in two tables; media carries an index on its
//! owning profile. Encrypted columns are written and read back verbatim.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::{RemnantError, Result};
use crate::storage::traits::ArchiveStore;
use crate::storage::types::{MediaItem, MediaSummary, Profile, RelationshipType};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS profiles (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        relationship_type TEXT NOT NULL,
        start_date TEXT,
        end_date TEXT,
        reflections TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS media (
        id TEXT PRIMARY KEY,
        profile_id TEXT NOT NULL REFERENCES profiles(id),
        mime_type TEXT NOT NULL,
        blob BLOB NOT NULL,
        timestamp TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS media_profile_id ON media(profile_id);
"#;

const PROFILE_COLUMNS: &str =
    "id, name, relationship_type, start_date, end_date, reflections, created_at, updated_at";

const MEDIA_COLUMNS: &str = "id, profile_id, mime_type, blob, timestamp";

/// Raw profile row before parsing.
struct ProfileRow {
    id: String,
    name: String,
    relationship_type: String,
    start_date: Option<String>,
    end_date: Option<String>,
    reflections: String,
    created_at: String,
    updated_at: String,
}

impl ProfileRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            relationship_type: row.get(2)?,
            start_date: row.get(3)?,
            end_date: row.get(4)?,
            reflections: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn into_profile(self) -> Result<Profile> {
        Ok(Profile {
            id: parse_uuid(&self.id)?,
            name: self.name,
            relationship_type: self.relationship_type.parse::<RelationshipType>()?,
            start_date: self.start_date.as_deref().map(parse_date).transpose()?,
            end_date: self.end_date.as_deref().map(parse_date).transpose()?,
            reflections: serde_json::from_str(&self.reflections)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Raw media row before parsing.
struct MediaRow {
    id: String,
    profile_id: String,
    mime_type: String,
    blob: Vec<u8>,
    timestamp: String,
}

impl MediaRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            profile_id: row.get(1)?,
            mime_type: row.get(2)?,
            blob: row.get(3)?,
            timestamp: row.get(4)?,
        })
    }

    fn into_item(self) -> Result<MediaItem> {
        Ok(MediaItem {
            id: parse_uuid(&self.id)?,
            profile_id: parse_uuid(&self.profile_id)?,
            mime_type: self.mime_type,
            blob: self.blob,
            timestamp: parse_timestamp(&self.timestamp)?,
        })
    }
}

/// Raw media metadata row; the blob is reduced to its length in SQL.
struct MediaSummaryRow {
    id: String,
    profile_id: String,
    mime_type: String,
    sealed_len: i64,
    timestamp: String,
}

impl MediaSummaryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            profile_id: row.get(1)?,
            mime_type: row.get(2)?,
            sealed_len: row.get(3)?,
            timestamp: row.get(4)?,
        })
    }

    fn into_summary(self) -> Result<MediaSummary> {
        Ok(MediaSummary {
            id: parse_uuid(&self.id)?,
            profile_id: parse_uuid(&self.profile_id)?,
            mime_type: self.mime_type,
            sealed_len: usize::try_from(self.sealed_len).map_err(|_| {
                RemnantError::Storage(format!("Invalid blob length {}", self.sealed_len))
            })?,
            timestamp: parse_timestamp(&self.timestamp)?,
        })
    }
}

fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| RemnantError::Storage(format!("Invalid UUID '{}': {}", value, e)))
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| RemnantError::Storage(format!("Invalid date '{}': {}", value, e)))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RemnantError::Storage(format!("Invalid timestamp '{}': {}", value, e)))
}

/// SQLite-backed [`ArchiveStore`].
pub struct SqliteArchive {
    conn: Mutex<Connection>,
}

impl SqliteArchive {
    /// Open (or create) an archive database file.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    /// Open a throwaway in-memory archive.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RemnantError::Storage("SQLite connection poisoned".to_string()))
    }
}

impl ArchiveStore for SqliteArchive {
    fn put_profile(&mut self, profile: &Profile) -> Result<()> {
        let reflections = serde_json::to_string(&profile.reflections)?;
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO profiles (id, name, relationship_type, start_date, end_date, reflections, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                relationship_type = excluded.relationship_type,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                reflections = excluded.reflections,
                updated_at = excluded.updated_at",
            params![
                profile.id.to_string(),
                profile.name,
                profile.relationship_type.as_str(),
                profile.start_date.map(|d| d.format("%Y-%m-%d").to_string()),
                profile.end_date.map(|d| d.format("%Y-%m-%d").to_string()),
                reflections,
                profile.created_at.to_rfc3339(),
                profile.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn get_profile(&self, id: &Uuid) -> Result<Option<Profile>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM profiles WHERE id = ?1", PROFILE_COLUMNS),
                params![id.to_string()],
                ProfileRow::from_row,
            )
            .optional()?;
        row.map(ProfileRow::into_profile).transpose()
    }

    fn list_profiles(&self) -> Result<Vec<Profile>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM profiles ORDER BY updated_at DESC, name ASC",
            PROFILE_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], ProfileRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(ProfileRow::into_profile).collect()
    }

    fn delete_profile(&mut self, id: &Uuid) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let media_deleted = tx.execute(
            "DELETE FROM media WHERE profile_id = ?1",
            params![id.to_string()],
        )?;
        tx.execute("DELETE FROM profiles WHERE id = ?1", params![id.to_string()])?;
        tx.commit()?;
        tracing::debug!(profile_id = %id, media_deleted, "deleted profile");
        Ok(())
    }

    fn put_media(&mut self, item: &MediaItem) -> Result<()> {
        let conn = self.lock_conn()?;
        let owner_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM profiles WHERE id = ?1)",
            params![item.profile_id.to_string()],
            |row| row.get(0),
        )?;
        if !owner_exists {
            return Err(RemnantError::NotFound(format!(
                "Profile {}",
                item.profile_id
            )));
        }
        conn.execute(
            "INSERT OR REPLACE INTO media (id, profile_id, mime_type, blob, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                item.id.to_string(),
                item.profile_id.to_string(),
                item.mime_type,
                item.blob,
                item.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn get_media(&self, id: &Uuid) -> Result<Option<MediaItem>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM media WHERE id = ?1", MEDIA_COLUMNS),
                params![id.to_string()],
                MediaRow::from_row,
            )
            .optional()?;
        row.map(MediaRow::into_item).transpose()
    }

    fn list_media_for_profile(&self, profile_id: &Uuid) -> Result<Vec<MediaItem>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM media WHERE profile_id = ?1 ORDER BY timestamp ASC, id ASC",
            MEDIA_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![profile_id.to_string()], MediaRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(MediaRow::into_item).collect()
    }

    fn list_media_summaries(&self, profile_id: &Uuid) -> Result<Vec<MediaSummary>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, profile_id, mime_type, length(blob), timestamp FROM media \
             WHERE profile_id = ?1 ORDER BY timestamp ASC, id ASC",
        )?;
        let rows = stmt
            .query_map(params![profile_id.to_string()], MediaSummaryRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(MediaSummaryRow::into_summary).collect()
    }

    fn count_media_for_profile(&self, profile_id: &Uuid) -> Result<usize> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM media WHERE profile_id = ?1",
            params![profile_id.to_string()],
            |row| row.get(0),
        )?;
        usize::try_from(count)
            .map_err(|_| RemnantError::Storage(format!("Invalid media count {}", count)))
    }

    fn delete_media(&mut self, id: &Uuid) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM media WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }
}

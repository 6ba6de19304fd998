//! Artifact stores: persisted history and bulk batch collections.
//!
//! Both stores hold `{name, image}` rows in one table, discriminated by
//! store kind. Names are unique per store under case-insensitive
//! comparison; a duplicate insert is a silent no-op.

use chrono::Utc;

use crate::{Database, StoreError};

/// A finished rendered badge: display name plus PNG bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub image: Vec<u8>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, image: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }
}

/// Which persisted store a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Single-mode history: append-only, displayed newest-first.
    History,
    /// Bulk batch: replaced wholesale on every generation run.
    Batch,
}

impl StoreKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::History => "history",
            Self::Batch => "batch",
        }
    }
}

impl Database {
    /// Append an artifact to the history store.
    ///
    /// Returns `true` if it was inserted, `false` if an artifact with
    /// the same name (case-insensitively) already exists.
    pub fn append_history(&self, artifact: &Artifact) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "INSERT OR IGNORE INTO artifacts (store, name, image, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    StoreKind::History.as_str(),
                    artifact.name,
                    artifact.image,
                    Utc::now().timestamp(),
                ],
            )?;
            if changed == 0 {
                tracing::debug!(name = %artifact.name, "history already contains this name");
            }
            Ok(changed > 0)
        })
    }

    /// All history artifacts, newest first.
    pub fn history(&self) -> Result<Vec<Artifact>, StoreError> {
        self.load_store(StoreKind::History, "DESC")
    }

    /// Replace the batch store wholesale with the given artifacts.
    ///
    /// Case-insensitive duplicate names within the run keep the first
    /// occurrence. Returns the number of rows inserted.
    pub fn replace_batch(&self, artifacts: &[Artifact]) -> Result<usize, StoreError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut inserted = 0usize;
            {
                tx.execute(
                    "DELETE FROM artifacts WHERE store = ?1",
                    [StoreKind::Batch.as_str()],
                )?;
                let mut stmt = tx.prepare(
                    "INSERT OR IGNORE INTO artifacts (store, name, image, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                let now = Utc::now().timestamp();
                for artifact in artifacts {
                    inserted += stmt.execute(rusqlite::params![
                        StoreKind::Batch.as_str(),
                        artifact.name,
                        artifact.image,
                        now,
                    ])?;
                }
            }
            tx.commit()?;
            tracing::debug!(inserted, "batch store replaced");
            Ok(inserted)
        })
    }

    /// All batch artifacts in insertion order.
    pub fn batch(&self) -> Result<Vec<Artifact>, StoreError> {
        self.load_store(StoreKind::Batch, "ASC")
    }

    /// Delete every history artifact.
    pub fn clear_history(&self) -> Result<(), StoreError> {
        self.clear(StoreKind::History)
    }

    /// Delete every batch artifact.
    pub fn clear_batch(&self) -> Result<(), StoreError> {
        self.clear(StoreKind::Batch)
    }

    fn clear(&self, kind: StoreKind) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM artifacts WHERE store = ?1", [kind.as_str()])?;
            Ok(())
        })
    }

    fn load_store(&self, kind: StoreKind, order: &str) -> Result<Vec<Artifact>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT name, image FROM artifacts WHERE store = ?1 ORDER BY id {order}"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([kind.as_str()], |row| {
                Ok(Artifact {
                    name: row.get(0)?,
                    image: row.get(1)?,
                })
            })?;
            let mut artifacts = Vec::new();
            for row in rows {
                artifacts.push(row?);
            }
            Ok(artifacts)
        })
    }
}

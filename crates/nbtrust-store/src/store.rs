//! SQLite-backed signature store.

use chrono::NaiveDateTime;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::clock::{parse_timestamp, LastSeenClock};
use crate::error::StoreError;
use crate::options::StoreOptions;

const SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS nbsignatures (
        id integer PRIMARY KEY AUTOINCREMENT,
        algorithm text,
        signature text,
        path text,
        last_seen timestamp
    );
    CREATE INDEX IF NOT EXISTS algosig ON nbsignatures(algorithm, signature);
";

/// One approved signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRecord {
    /// Row identity, increasing with insertion order.
    pub id: i64,
    /// Hash algorithm identifier (e.g. `sha256`).
    pub algorithm: String,
    /// Lowercase hex digest.
    pub signature: String,
    /// Where the notebook was loaded from when it was signed, if known.
    pub path: Option<String>,
    /// Last time the signature was stored or successfully checked (UTC).
    pub last_seen: NaiveDateTime,
}

struct Inner {
    conn: Connection,
    clock: LastSeenClock,
}

/// Async handle over one signature database.
///
/// All SQLite work runs on the blocking pool; the connection is guarded by a
/// mutex so concurrent calls on one handle are serialized. Statements are
/// individually atomic and `store` runs inside a transaction, so a failed
/// write never leaves a partial change behind.
///
/// # Example
///
/// ```rust,no_run
/// use nbtrust_store::{SignatureStore, StoreOptions};
///
/// # async fn demo() -> Result<(), nbtrust_store::StoreError> {
/// let store = SignatureStore::open("nbsignatures.db", StoreOptions::create()).await?;
/// store.store("5bdcc146…", "sha256").await?;
/// assert!(store.check("5bdcc146…", "sha256").await?);
/// store.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct SignatureStore {
    inner: Arc<Mutex<Inner>>,
    options: StoreOptions,
    location: String,
}

impl SignatureStore {
    /// Opens the database at `path`.
    ///
    /// Without `options.create` (or in readonly mode) a missing file fails
    /// with [`StoreError::NotFound`]. With `create`, missing parent
    /// directories are created too. The table and index are created if
    /// absent unless the store is readonly.
    pub async fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self, StoreError> {
        options.validate()?;
        let path = path.as_ref().to_path_buf();
        tokio::task::spawn_blocking(move || Self::open_blocking(path, options))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// Opens a private in-memory database. Readonly is meaningless here and
    /// is rejected.
    pub async fn open_in_memory(options: StoreOptions) -> Result<Self, StoreError> {
        options.validate()?;
        if options.readonly {
            return Err(StoreError::InvalidOptions(
                "an in-memory store cannot be readonly".to_string(),
            ));
        }
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, options, ":memory:".to_string())
    }

    fn open_blocking(path: PathBuf, options: StoreOptions) -> Result<Self, StoreError> {
        if !path.exists() {
            if options.readonly || !options.create {
                return Err(StoreError::NotFound(path));
            }
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut flags = if options.readonly {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };
        if options.create {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }
        flags |= OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&path, flags)?;
        Self::from_connection(conn, options, path.display().to_string())
    }

    fn from_connection(
        conn: Connection,
        options: StoreOptions,
        location: String,
    ) -> Result<Self, StoreError> {
        if !options.readonly {
            conn.execute_batch(SCHEMA_SQL)?;
        }
        debug!(location = %location, readonly = options.readonly, "opened signature store");
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                conn,
                clock: LastSeenClock::new(),
            })),
            options,
            location,
        })
    }

    /// Options the store was opened with.
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Runs `op` against the connection on the blocking pool.
    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Inner) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut guard = inner.lock();
            op(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    fn ensure_writable(&self) -> Result<(), StoreError> {
        if self.options.readonly {
            return Err(StoreError::Readonly);
        }
        Ok(())
    }

    /// Whether `(algorithm, signature)` is approved.
    ///
    /// On a hit in a writable store, `last_seen` is refreshed so the record
    /// survives the next cull.
    pub async fn check(&self, signature: &str, algorithm: &str) -> Result<bool, StoreError> {
        let (signature, algorithm) = (signature.to_owned(), algorithm.to_owned());
        let readonly = self.options.readonly;
        self.run(move |inner| {
            if readonly {
                return Ok(exists(&inner.conn, &signature, &algorithm)?);
            }
            let stamp = inner.clock.next();
            Ok(touch(&inner.conn, &signature, &algorithm, &stamp)? > 0)
        })
        .await
    }

    /// Approves `(algorithm, signature)`.
    ///
    /// Returns `true` when a new record was inserted and `false` when it was
    /// already present (its `last_seen` is refreshed instead). When
    /// auto-culling is on and the table now exceeds the capacity, a cull
    /// runs in the same transaction.
    pub async fn store(&self, signature: &str, algorithm: &str) -> Result<bool, StoreError> {
        self.store_with_path(signature, algorithm, None).await
    }

    /// Like [`store`](Self::store), also recording where the notebook came
    /// from. The path is informational and never consulted by lookups.
    pub async fn store_with_path(
        &self,
        signature: &str,
        algorithm: &str,
        path: Option<&str>,
    ) -> Result<bool, StoreError> {
        self.ensure_writable()?;
        let (signature, algorithm) = (signature.to_owned(), algorithm.to_owned());
        let path = path.map(str::to_owned);
        let auto_cull = self.options.cull;
        let capacity = self.options.cache_size;
        let keep = self.options.retained_after_cull();

        self.run(move |inner| {
            let stamp = inner.clock.next();
            let tx = inner.conn.transaction()?;

            let inserted = if touch(&tx, &signature, &algorithm, &stamp)? > 0 {
                false
            } else {
                tx.execute(
                    "INSERT INTO nbsignatures (algorithm, signature, path, last_seen)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![algorithm, signature, path, stamp],
                )? > 0
            };

            let mut culled = 0;
            if auto_cull && count_rows(&tx)? > capacity {
                culled = delete_all_but(&tx, keep)?;
            }
            tx.commit()?;

            debug!(%algorithm, %signature, inserted, "stored signature");
            if culled > 0 {
                info!(culled, kept = keep, "culled signature store after insert");
            }
            Ok(inserted)
        })
        .await
    }

    /// Drops `(algorithm, signature)`. Returns whether a record was removed.
    pub async fn remove(&self, signature: &str, algorithm: &str) -> Result<bool, StoreError> {
        self.ensure_writable()?;
        let (signature, algorithm) = (signature.to_owned(), algorithm.to_owned());
        self.run(move |inner| {
            let removed = inner.conn.execute(
                "DELETE FROM nbsignatures WHERE algorithm = ?1 AND signature = ?2",
                params![algorithm, signature],
            )?;
            debug!(%algorithm, %signature, removed, "removed signature");
            Ok(removed > 0)
        })
        .await
    }

    /// Keeps only the `floor(cache_size * 0.75)` most recently seen records.
    /// Returns whether anything was deleted.
    pub async fn cull(&self) -> Result<bool, StoreError> {
        self.ensure_writable()?;
        let keep = self.options.retained_after_cull();
        let location = self.location.clone();
        self.run(move |inner| {
            let culled = delete_all_but(&inner.conn, keep)?;
            info!(location = %location, culled, kept = keep, "culled signature store");
            Ok(culled > 0)
        })
        .await
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<usize, StoreError> {
        self.run(|inner| count_rows(&inner.conn)).await
    }

    /// Looks up a record without refreshing it.
    pub async fn record(
        &self,
        signature: &str,
        algorithm: &str,
    ) -> Result<Option<SignatureRecord>, StoreError> {
        let (signature, algorithm) = (signature.to_owned(), algorithm.to_owned());
        self.run(move |inner| {
            let row = inner
                .conn
                .query_row(
                    "SELECT id, algorithm, signature, path, last_seen FROM nbsignatures
                     WHERE algorithm = ?1 AND signature = ?2",
                    params![algorithm, signature],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, Option<String>>(3)?,
                            row.get::<_, String>(4)?,
                        ))
                    },
                )
                .optional()?;

            row.map(|(id, algorithm, signature, path, last_seen)| {
                let last_seen = parse_timestamp(&last_seen)
                    .ok_or_else(|| StoreError::Corrupt(format!("last_seen '{last_seen}'")))?;
                Ok(SignatureRecord {
                    id,
                    algorithm,
                    signature,
                    path,
                    last_seen,
                })
            })
            .transpose()
        })
        .await
    }

    /// Closes the database.
    ///
    /// Every operation must have completed first; if one still holds the
    /// handle this fails with [`StoreError::Busy`].
    pub async fn close(self) -> Result<(), StoreError> {
        let inner = Arc::try_unwrap(self.inner)
            .map_err(|_| StoreError::Busy)?
            .into_inner();
        let location = self.location;
        tokio::task::spawn_blocking(move || {
            inner
                .conn
                .close()
                .map_err(|(_, e)| StoreError::Storage(e))?;
            debug!(location = %location, "closed signature store");
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn exists(conn: &Connection, signature: &str, algorithm: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT id FROM nbsignatures WHERE algorithm = ?1 AND signature = ?2",
        params![algorithm, signature],
        |_| Ok(()),
    )
    .optional()
    .map(|row| row.is_some())
}

fn touch(
    conn: &Connection,
    signature: &str,
    algorithm: &str,
    stamp: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE nbsignatures SET last_seen = ?1 WHERE algorithm = ?2 AND signature = ?3",
        params![stamp, algorithm, signature],
    )
}

fn count_rows(conn: &Connection) -> Result<usize, StoreError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM nbsignatures", [], |row| row.get(0))?;
    usize::try_from(count).map_err(|_| StoreError::Corrupt(format!("row count {count}")))
}

/// Deletes everything except the `keep` most recently seen rows. Ties on
/// `last_seen` go to the newer row.
fn delete_all_but(conn: &Connection, keep: usize) -> Result<usize, StoreError> {
    let keep = i64::try_from(keep).unwrap_or(i64::MAX);
    Ok(conn.execute(
        "DELETE FROM nbsignatures WHERE id IN (
            SELECT id FROM nbsignatures ORDER BY last_seen DESC, id DESC LIMIT -1 OFFSET ?1
        )",
        params![keep],
    )?)
}

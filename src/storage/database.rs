use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use super::schema;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open database: {0}")]
    Connect(#[source] rusqlite::Error),

    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("connection lock poisoned")]
    Poisoned,
}

/// SQLite database location. Cheap to clone; holds no open connection.
#[derive(Debug, Clone)]
pub struct Database {
    path: Arc<PathBuf>,
    busy_timeout: Duration,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            path: Arc::new(path.into()),
            busy_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create parent directories and bootstrap tables
    pub fn initialize(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = self.open()?;
        schema::create(&conn)?;
        info!(path = %self.path.display(), "Database schema ready");
        Ok(())
    }

    /// A per-request handle. The connection is opened on first use.
    pub fn session(&self) -> Session {
        Session {
            database: self.clone(),
            conn: Arc::new(Mutex::new(None)),
        }
    }

    fn open(&self) -> Result<Connection, StorageError> {
        let conn = Connection::open(self.path.as_path()).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "Database connection failed");
            StorageError::Connect(e)
        })?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(StorageError::Connect)?;
        debug!(path = %self.path.display(), "Opened database connection");
        Ok(conn)
    }
}

/// Request-scoped connection holder. Clones share the same connection.
#[derive(Clone)]
pub struct Session {
    database: Database,
    conn: Arc<Mutex<Option<Connection>>>,
}

impl Session {
    /// Run blocking SQLite work against this session's connection.
    pub async fn run<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Connection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StorageError> + Send + 'static,
    {
        let session = self.clone();
        tokio::task::spawn_blocking(move || -> Result<T, E> {
            let mut guard = session.conn.lock().map_err(|_| StorageError::Poisoned)?;
            if guard.is_none() {
                *guard = Some(session.database.open()?);
            }
            let Some(conn) = guard.as_mut() else {
                return Err(StorageError::Poisoned.into());
            };
            f(conn)
        })
        .await
        .map_err(|e| E::from(StorageError::Task(e)))?
    }

    #[cfg(test)]
    fn is_open(&self) -> bool {
        self.conn.lock().map(|g| g.is_some()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db(name: &str) -> Database {
        let path = std::env::temp_dir().join(format!("reviews-db-{}-{name}.sqlite", std::process::id()));
        let _ = std::fs::remove_file(&path);
        Database::new(path, Duration::from_millis(100))
    }

    #[tokio::test]
    async fn session_opens_lazily_and_reuses_connection() {
        let db = temp_db("lazy");
        db.initialize().unwrap();
        let session = db.session();
        assert!(!session.is_open());

        session
            .run(|conn| {
                conn.execute_batch("CREATE TEMP TABLE scratch (v INTEGER); INSERT INTO scratch VALUES (7);")?;
                Ok::<_, StorageError>(())
            })
            .await
            .unwrap();
        assert!(session.is_open());

        // temp tables are per-connection, so this only works on the same one
        let v: i64 = session
            .run(|conn| Ok::<_, StorageError>(conn.query_row("SELECT v FROM scratch", [], |r| r.get(0))?))
            .await
            .unwrap();
        assert_eq!(v, 7);

        let _ = std::fs::remove_file(db.path());
    }

    #[tokio::test]
    async fn unreachable_database_is_a_connect_error() {
        let db = Database::new("/nonexistent-dir/for/sure/reviews.db", Duration::from_millis(10));
        let err = db
            .session()
            .run(|_conn| Ok::<_, StorageError>(()))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Connect(_)));
    }
}

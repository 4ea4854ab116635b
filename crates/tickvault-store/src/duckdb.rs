//! `DuckDB` connection pooling for the store.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ::duckdb::Connection;

/// Access mode for pooled connections. Readers and the writer never share
/// a connection, so an in-flight upsert batch cannot leak uncommitted rows
/// into a concurrent query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

#[derive(Default)]
struct IdleConnections {
    read_only: Vec<Connection>,
    read_write: Vec<Connection>,
}

impl IdleConnections {
    fn stack(&mut self, mode: AccessMode) -> &mut Vec<Connection> {
        match mode {
            AccessMode::ReadOnly => &mut self.read_only,
            AccessMode::ReadWrite => &mut self.read_write,
        }
    }
}

struct PoolShared {
    db_path: PathBuf,
    capacity: usize,
    idle: Mutex<IdleConnections>,
}

/// Hands out connections against one database file, keeping up to
/// `capacity` idle connections per access mode for reuse.
#[derive(Clone)]
pub struct DuckDbConnectionManager {
    shared: Arc<PoolShared>,
}

impl DuckDbConnectionManager {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                db_path: path.into(),
                capacity: capacity.max(1),
                idle: Mutex::new(IdleConnections::default()),
            }),
        }
    }

    /// Reuses an idle connection for `mode`, or opens a fresh one.
    ///
    /// # Panics
    /// Panics if the pool mutex is poisoned.
    pub fn acquire(&self, mode: AccessMode) -> Result<PooledConnection, ::duckdb::Error> {
        let reusable = self
            .shared
            .idle
            .lock()
            .expect("duckdb connection pool mutex poisoned")
            .stack(mode)
            .pop();

        let connection = match reusable {
            Some(connection) => connection,
            None => open_connection(self.shared.db_path.as_path(), mode)?,
        };

        Ok(PooledConnection {
            mode,
            shared: Arc::clone(&self.shared),
            connection: Some(connection),
        })
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        self.shared.db_path.as_path()
    }
}

/// Live connection that rejoins the idle set when dropped, as long as the
/// pool is under capacity; otherwise the connection closes.
pub struct PooledConnection {
    mode: AccessMode,
    shared: Arc<PoolShared>,
    connection: Option<Connection>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("pooled connection unexpectedly missing")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("pooled connection unexpectedly missing")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        let mut idle = self
            .shared
            .idle
            .lock()
            .expect("duckdb connection pool mutex poisoned");
        let stack = idle.stack(self.mode);
        if stack.len() < self.shared.capacity {
            stack.push(connection);
        }
    }
}

fn open_connection(path: &Path, mode: AccessMode) -> Result<Connection, ::duckdb::Error> {
    let connection = Connection::open(path)?;
    connection.execute_batch("PRAGMA disable_progress_bar;")?;
    if mode == AccessMode::ReadOnly {
        // Can fail on older embedded engines; reads stay on read-only
        // statements regardless.
        let _ = connection.execute_batch("SET access_mode = 'READ_ONLY';");
    }
    Ok(connection)
}

//! Shared application state.
//!
//! # Responsibility
//! - Own the single store connection opened at startup.
//! - Serialize access to it and run store work off the async workers.
//!
//! # Invariants
//! - At most one repository call touches the connection at a time.
//! - The connection is closed exactly once, through `AppState::close`.

use crate::error::{ApiError, ApiResult};
use addressbook_core::db::{close_db, DbResult};
use addressbook_core::{ContactService, RepoResult, SqliteContactRepository};
use log::warn;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

/// Contact service bound to the locked store connection.
pub type StoreService<'conn> = ContactService<SqliteContactRepository<'conn>>;

/// Handler state cloned into every request.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Wraps a bootstrapped store connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            store: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `op` against the contact service on the blocking pool.
    ///
    /// The store lock is held for the duration of `op` only. Repository
    /// errors are mapped to API errors; a failed blocking task is internal.
    pub async fn with_service<T, F>(&self, op: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: for<'conn> FnOnce(&StoreService<'conn>) -> RepoResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let joined = tokio::task::spawn_blocking(move || {
            let conn = lock_store(&store);
            let service = ContactService::new(SqliteContactRepository::try_new(&conn)?);
            op(&service)
        })
        .await;

        match joined {
            Ok(result) => result.map_err(ApiError::from),
            Err(err) => Err(ApiError::Internal(format!("store task failed: {err}"))),
        }
    }

    /// Closes the store connection once every other handle is gone.
    ///
    /// When request tasks still hold the state, the connection is left to be
    /// released when the last clone drops.
    pub fn close(self) -> DbResult<()> {
        match Arc::try_unwrap(self.store) {
            Ok(store) => {
                let conn = store
                    .into_inner()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                close_db(conn)
            }
            Err(shared) => {
                warn!(
                    "event=db_close module=state status=skipped reason=shared_handles handles={}",
                    Arc::strong_count(&shared)
                );
                Ok(())
            }
        }
    }
}

fn lock_store(store: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    store.lock().unwrap_or_else(|poisoned| {
        // SQLite keeps no in-process invariants across a panicked call.
        warn!("event=store_lock module=state status=recovered reason=poisoned");
        poisoned.into_inner()
    })
}

//! Request-scoped transactional unit of work.
//!
//! A [`UnitOfWork`] owns one open transaction on one checked-out connection.
//! Every read and write of a request goes through [`UnitOfWork::conn`], so
//! reads observe the request's own writes and nothing becomes visible to
//! other connections before commit.
//!
//! [`run`] is the usual entry point: it checks out a connection, opens the
//! transaction, runs the closure, and commits on `Ok` or rolls back on `Err`.
//! The caller's error is returned unchanged.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::connection::ConnectionProvider;
use crate::errors::{Result, StoreError};

/// Transaction mode for a unit of work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitMode {
    /// `BEGIN DEFERRED`: takes no write lock until something writes.
    ReadOnly,
    /// `BEGIN IMMEDIATE`: takes the write lock up front.
    ReadWrite,
}

impl UnitMode {
    fn behavior(self) -> TransactionBehavior {
        match self {
            Self::ReadOnly => TransactionBehavior::Deferred,
            Self::ReadWrite => TransactionBehavior::Immediate,
        }
    }
}

/// How a unit of work ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The transaction was committed.
    Committed,
    /// The transaction was rolled back.
    RolledBack,
}

/// One open transaction plus the cancellation signal of the request that
/// owns it. Dropping an unfinished unit rolls it back.
pub struct UnitOfWork<'c> {
    tx: Transaction<'c>,
    cancel: CancellationToken,
}

impl<'c> UnitOfWork<'c> {
    /// Open a transaction on `conn`.
    pub fn begin(conn: &'c mut Connection, mode: UnitMode, cancel: CancellationToken) -> Result<Self> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let tx = conn.transaction_with_behavior(mode.behavior())?;
        Ok(Self { tx, cancel })
    }

    /// The transactional connection. Repositories take this directly.
    pub fn conn(&self) -> &Connection {
        &self.tx
    }

    /// The cancellation signal this unit observes.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fail with [`StoreError::Cancelled`] if the owning request went away.
    /// Long pipelines call this between stages.
    pub fn checkpoint(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        Ok(())
    }

    /// Commit. A unit whose request was cancelled is rolled back instead and
    /// reports [`StoreError::Cancelled`].
    pub fn commit(self) -> Result<Outcome> {
        if self.cancel.is_cancelled() {
            self.tx.rollback()?;
            warn!("unit of work cancelled before commit, rolled back");
            return Err(StoreError::Cancelled);
        }
        self.tx.commit()?;
        debug!("unit of work committed");
        Ok(Outcome::Committed)
    }

    /// Roll back explicitly.
    pub fn rollback(self) -> Result<Outcome> {
        self.tx.rollback()?;
        debug!("unit of work rolled back");
        Ok(Outcome::RolledBack)
    }
}

/// Run `f` inside a fresh unit of work.
///
/// Commits when `f` returns `Ok` and rolls back when it returns `Err`. A
/// rollback failure is logged; the error from `f` is what the caller sees.
pub fn run<P, T, E, F>(provider: &P, mode: UnitMode, cancel: &CancellationToken, f: F) -> std::result::Result<T, E>
where
    P: ConnectionProvider + ?Sized,
    E: From<StoreError>,
    F: FnOnce(&UnitOfWork<'_>) -> std::result::Result<T, E>,
{
    let mut conn = provider.acquire()?;
    let unit = UnitOfWork::begin(&mut conn, mode, cancel.clone())?;

    match f(&unit) {
        Ok(value) => {
            let _ = unit.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = unit.rollback() {
                warn!(error = %rollback_err, "rollback after failed unit of work also failed");
            }
            Err(err)
        }
    }
}

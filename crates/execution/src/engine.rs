//! The pull-based sync protocol shared by every execution handle.
//!
//! A handle holds the last closure the remote service reported plus zero or
//! more lazily fetched child collections. [`Execution::sync`] refreshes both,
//! unless the handle is already terminal and its children have been fetched,
//! in which case it issues no remote call at all. Phases only ever change to
//! what the remote reports; nothing is computed locally.
//!
//! Handles take `&mut self` to sync. Callers sharing a handle across tasks
//! must serialize access themselves.

use std::fmt;

use async_trait::async_trait;
use skiff_core::{ExecutionClosure, ExecutionFailure, Phase};

use crate::client::Client;
use crate::error::ExecutionError;

/// What a call to [`Execution::sync`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Terminal and fully populated: no remote call was made.
    Skipped,
    /// The closure and child collections were fetched again.
    Refreshed,
}

/// A pollable handle to a remote execution.
///
/// A sync fetches into fresh values and only then commits them, so a failed
/// sync leaves the handle exactly as it was.
#[async_trait]
pub trait Execution: Send + Sync {
    /// Identifier type.
    type Id: fmt::Display + Send + Sync;
    /// Phase enum for this kind of execution.
    type Phase: Phase;
    /// Remote record carrying the closure.
    type Record: Send + Sync;
    /// Every child collection, fetched together.
    type Children: Send;

    /// Execution identifier.
    fn id(&self) -> &Self::Id;

    /// Latest observed status.
    fn closure(&self) -> &ExecutionClosure<Self::Phase>;

    /// Returns `true` once every child collection has been fetched.
    fn children_fetched(&self) -> bool;

    /// Fetch the current record from the remote service.
    async fn fetch_record(&self, client: &Client) -> Result<Self::Record, ExecutionError>;

    /// List every child collection as of `record`.
    async fn fetch_children(
        &self,
        client: &Client,
        record: &Self::Record,
    ) -> Result<Self::Children, ExecutionError>;

    /// Replace the record and every child collection.
    fn commit(&mut self, record: Self::Record, children: Self::Children);

    /// Current phase.
    fn phase(&self) -> Self::Phase {
        self.closure().phase
    }

    /// Returns `true` if the current phase is terminal for this kind of
    /// execution.
    fn is_complete(&self) -> bool {
        self.phase().is_terminal()
    }

    /// The stored error; `None` means the execution did not fail.
    ///
    /// Only meaningful once complete: before that the remote may report a
    /// transient error mid-retry, so reading it is refused.
    fn error(&self) -> Result<Option<&ExecutionFailure>, ExecutionError> {
        if !self.is_complete() {
            return Err(ExecutionError::Incomplete(self.id().to_string()));
        }
        Ok(self.closure().error.as_ref())
    }

    /// Refresh from the remote service.
    ///
    /// Fetches the record, then every child collection as a full replace, and
    /// commits both together. A handle that is terminal with all children
    /// fetched is left untouched. The first error aborts the sync and nothing
    /// fetched before it is kept.
    async fn sync(&mut self, client: &Client) -> Result<SyncOutcome, ExecutionError> {
        if self.is_complete() && self.children_fetched() {
            tracing::trace!(
                execution = %self.id(),
                phase = %self.phase(),
                "terminal and populated, skipping sync"
            );
            return Ok(SyncOutcome::Skipped);
        }

        let before = self.phase();
        let record = self.fetch_record(client).await?;
        let children = self.fetch_children(client, &record).await?;
        self.commit(record, children);
        tracing::debug!(
            execution = %self.id(),
            from = %before,
            to = %self.phase(),
            "synced execution"
        );
        Ok(SyncOutcome::Refreshed)
    }
}

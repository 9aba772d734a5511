//! Deposit lifecycle tracking and bounded convergence waits.

use std::sync::Arc;

use rda_types::{
    ArchiveDepositInfo, BusinessObject, BusinessObjectId, DepositId, DepositObjectKind,
    DepositStatus,
};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ConvergenceConfig;
use crate::error::ArchiveResult;
use crate::traits::ArchiveBackend;

/// Outcome of a bounded convergence wait.
///
/// Timeout, archive failure, and interruption are deliberately distinct:
/// callers retry, abort, or skip-and-continue depending on which occurred,
/// and logs must keep them apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Convergence {
    /// The archive confirmed the deposit.
    Deposited,
    /// The archive reported the deposit failed.
    Failed,
    /// The wait exhausted its poll budget while the deposit stayed PENDING.
    TimedOut {
        /// How many polls were issued before giving up.
        polls: u32,
    },
    /// The wait was cancelled from outside before reaching a verdict.
    Interrupted,
}

impl Convergence {
    /// Returns `true` only for a confirmed deposit.
    pub fn is_deposited(&self) -> bool {
        matches!(self, Self::Deposited)
    }
}

/// Waiting discipline for resolving one object's usable deposit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvePolicy {
    /// Poll up to the configured attempt count with a fixed delay while the
    /// newest record stays PENDING.
    WaitForPending,
    /// A single immediate poll-and-check; anything other than DEPOSITED is
    /// "not currently available".
    IgnorePending,
}

/// Tracks deposit transactions against an [`ArchiveBackend`] and provides
/// the bounded waiting protocols for archive convergence.
pub struct DepositTracker {
    backend: Arc<dyn ArchiveBackend>,
    config: ConvergenceConfig,
}

impl DepositTracker {
    /// Create a tracker over the given backend.
    pub fn new(backend: Arc<dyn ArchiveBackend>, config: ConvergenceConfig) -> Self {
        Self { backend, config }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &Arc<dyn ArchiveBackend> {
        &self.backend
    }

    /// The active convergence configuration.
    pub fn config(&self) -> &ConvergenceConfig {
        &self.config
    }

    /// Submit an object for archival. Non-blocking: the returned id refers
    /// to a PENDING record that converges out of band.
    pub async fn deposit(
        &self,
        object: &BusinessObject,
        kind: DepositObjectKind,
        parent: Option<&DepositId>,
    ) -> ArchiveResult<DepositId> {
        let deposit_id = self.backend.deposit(object, kind, parent).await?;
        info!(object_id = %object.id(), deposit_id = %deposit_id, kind = ?kind, "deposit accepted");
        Ok(deposit_id)
    }

    /// Refresh known-PENDING records against the archive.
    pub async fn poll_archive(&self) -> ArchiveResult<()> {
        self.backend.poll_archive().await
    }

    /// Deposit history for an object, newest first.
    pub async fn list_deposit_info(
        &self,
        object_id: &BusinessObjectId,
        status: Option<DepositStatus>,
    ) -> ArchiveResult<Vec<ArchiveDepositInfo>> {
        self.backend.list_deposit_info(object_id, status).await
    }

    /// Current status of one deposit transaction.
    pub async fn get_deposit_status(&self, deposit_id: &DepositId) -> ArchiveResult<DepositStatus> {
        self.backend.get_deposit_status(deposit_id).await
    }

    /// Wait for a deposit to leave PENDING, polling with linear backoff.
    ///
    /// Poll `i` (zero-based) sleeps `i × poll_delay` before polling, so
    /// short waits come first and the worst case is bounded at
    /// `poll_delay × N×(N-1)/2`. Exhausting the budget while still PENDING
    /// is a timeout, reported distinctly from an archive FAILED verdict.
    pub async fn wait_for_convergence(&self, deposit_id: &DepositId) -> ArchiveResult<Convergence> {
        // The sender stays alive for the whole wait, so the receiver never
        // observes a close and the wait is effectively uncancellable.
        let (_tx, mut never) = watch::channel(false);
        self.wait_for_convergence_inner(deposit_id, &mut never).await
    }

    /// As [`Self::wait_for_convergence`], but cancellable: if `cancel` flips
    /// to `true` mid-wait, the result is [`Convergence::Interrupted`].
    pub async fn wait_for_convergence_with_cancel(
        &self,
        deposit_id: &DepositId,
        cancel: &mut watch::Receiver<bool>,
    ) -> ArchiveResult<Convergence> {
        self.wait_for_convergence_inner(deposit_id, cancel).await
    }

    async fn wait_for_convergence_inner(
        &self,
        deposit_id: &DepositId,
        cancel: &mut watch::Receiver<bool>,
    ) -> ArchiveResult<Convergence> {
        for i in 0..self.config.max_polls {
            if *cancel.borrow() {
                warn!(deposit_id = %deposit_id, "convergence wait interrupted");
                return Ok(Convergence::Interrupted);
            }
            let backoff = self.config.poll_delay * i;
            if !backoff.is_zero() {
                let backoff_done = sleep(backoff);
                tokio::pin!(backoff_done);
                loop {
                    tokio::select! {
                        () = &mut backoff_done => break,
                        changed = cancel.changed() => {
                            if changed.is_err() {
                                // Sender gone; nothing can cancel us now.
                                backoff_done.as_mut().await;
                                break;
                            }
                            if *cancel.borrow() {
                                warn!(deposit_id = %deposit_id, "convergence wait interrupted");
                                return Ok(Convergence::Interrupted);
                            }
                            // Spurious update: keep sleeping out the backoff.
                        }
                    }
                }
            }

            self.backend.poll_archive().await?;
            let status = self.backend.get_deposit_status(deposit_id).await?;
            debug!(deposit_id = %deposit_id, poll = i, status = ?status, "convergence poll");
            match status {
                DepositStatus::Deposited => return Ok(Convergence::Deposited),
                DepositStatus::Failed => {
                    warn!(deposit_id = %deposit_id, "archive reported deposit failed");
                    return Ok(Convergence::Failed);
                }
                DepositStatus::Pending => {}
            }
        }
        warn!(
            deposit_id = %deposit_id,
            polls = self.config.max_polls,
            "convergence wait timed out while still pending"
        );
        Ok(Convergence::TimedOut {
            polls: self.config.max_polls,
        })
    }

    /// Resolve the newest usable deposit record for an object under the
    /// given policy.
    ///
    /// Returns `Ok(None)` when no usable deposit id exists: the newest
    /// record is FAILED, stayed PENDING past the policy's patience, or the
    /// object was never deposited. The caller decides whether that becomes
    /// a failed branch or an abort.
    pub async fn resolve_deposit(
        &self,
        object_id: &BusinessObjectId,
        policy: ResolvePolicy,
    ) -> ArchiveResult<Option<ArchiveDepositInfo>> {
        let attempts = match policy {
            ResolvePolicy::WaitForPending => self.config.resolve_attempts,
            ResolvePolicy::IgnorePending => 1,
        };

        for attempt in 0..attempts {
            if attempt > 0 {
                sleep(self.config.resolve_delay).await;
            }
            self.backend.poll_archive().await?;
            let history = self.backend.list_deposit_info(object_id, None).await?;
            let Some(newest) = history.into_iter().next() else {
                debug!(object_id = %object_id, "no deposit history");
                return Ok(None);
            };
            match newest.status {
                DepositStatus::Deposited => return Ok(Some(newest)),
                DepositStatus::Failed => {
                    debug!(object_id = %object_id, deposit_id = %newest.deposit_id, "newest deposit failed");
                    return Ok(None);
                }
                DepositStatus::Pending => {}
            }
        }
        debug!(object_id = %object_id, policy = ?policy, "deposit still pending, giving up");
        Ok(None)
    }
}

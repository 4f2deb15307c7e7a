//! # Reconciliation Sync
//!
//! Sends optimistic moves to the server and rolls the store back when a
//! move is refused, fails, or times out.
//!
//! ## Ordering
//!
//! Each commit locks every scope it touched (`origin` and `final`), in
//! `ScopeKey` order, before sending. Scope locks are FIFO, so commits on a
//! scope are sent one at a time in the order they were submitted.
//!
//! ## Epochs
//!
//! A revert bumps the store epoch of every scope it restores. A commit
//! carries the epochs seen when its gesture started; if any has moved by
//! the time it gets its locks, the optimistic state it was built on is gone
//! and it is superseded instead of sent.

use crate::config::SyncConfig;
use crate::drag::CommitIntent;
use crate::error::CommitError;
use crate::ports::{CommitTransport, IntentSink};
use crate::store::SharedStore;
use board_telemetry::metric_inc;
use board_telemetry::metrics::{CLIENT_COMMITS, COMMIT_TIMEOUTS};
use board_types::{ErrorKind, ItemId, ScopeKey};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex as ScopeLock, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// How a commit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Confirmed,
    /// The store was restored to the pre-drag snapshot.
    Reverted(ErrorKind),
    /// Not sent; an earlier revert already wiped its optimistic state.
    Superseded,
}

/// Transient, non-fatal message for the user after a revert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncNotice {
    pub item_id: ItemId,
    pub kind: ErrorKind,
    pub message: String,
}

struct SyncInner {
    transport: Arc<dyn CommitTransport>,
    store: SharedStore,
    locks: Mutex<HashMap<ScopeKey, Arc<ScopeLock<()>>>>,
    notices: broadcast::Sender<SyncNotice>,
    config: SyncConfig,
}

#[derive(Clone)]
pub struct ReconciliationSync {
    inner: Arc<SyncInner>,
}

impl ReconciliationSync {
    pub fn new(transport: Arc<dyn CommitTransport>, store: SharedStore, config: SyncConfig) -> Self {
        let (notices, _) = broadcast::channel(config.notice_capacity.max(1));
        Self {
            inner: Arc::new(SyncInner {
                transport,
                store,
                locks: Mutex::new(HashMap::new()),
                notices,
                config,
            }),
        }
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<SyncNotice> {
        self.inner.notices.subscribe()
    }

    /// Commit one intent and reconcile the store with the result.
    pub async fn commit(&self, intent: CommitIntent) -> CommitOutcome {
        let scopes = intent.scopes();
        let mut guards: Vec<OwnedMutexGuard<()>> = Vec::with_capacity(scopes.len());
        for scope in &scopes {
            guards.push(self.scope_lock(scope).lock_owned().await);
        }

        let outcome = self.send_locked(&intent, &scopes).await;

        drop(guards);
        self.prune_locks();
        outcome
    }

    async fn send_locked(&self, intent: &CommitIntent, scopes: &[ScopeKey]) -> CommitOutcome {
        let stale = self.inner.store.lock().stale_scopes(&intent.epochs, scopes);
        if !stale.is_empty() {
            let fresh: Vec<ScopeKey> = scopes
                .iter()
                .filter(|scope| !stale.contains(scope))
                .copied()
                .collect();
            self.revert(intent, &fresh);
            metric_inc!(CLIENT_COMMITS, &["superseded"]);
            debug!(item_id = %intent.item_id, "Commit superseded by an earlier revert");
            return CommitOutcome::Superseded;
        }

        let request = intent.to_request();
        let correlation_id = request.correlation_id;
        let commit_timeout = self.inner.config.commit_timeout;
        let result = match timeout(commit_timeout, self.inner.transport.commit_move(request)).await
        {
            Ok(result) => result,
            Err(_) => {
                metric_inc!(COMMIT_TIMEOUTS);
                Err(CommitError::Timeout(commit_timeout))
            }
        };

        match result {
            Ok(()) => {
                metric_inc!(CLIENT_COMMITS, &["confirmed"]);
                debug!(%correlation_id, item_id = %intent.item_id, "Commit confirmed");
                CommitOutcome::Confirmed
            }
            Err(e) => {
                let kind = e.kind();
                self.revert(intent, scopes);
                metric_inc!(CLIENT_COMMITS, &["reverted"]);
                warn!(%correlation_id, item_id = %intent.item_id, error = %e, "Commit failed, reverted");

                // Nobody listening is fine.
                let _ = self.inner.notices.send(SyncNotice {
                    item_id: intent.item_id,
                    kind,
                    message: format!("Move could not be saved: {}", e),
                });
                CommitOutcome::Reverted(kind)
            }
        }
    }

    /// Restore `scopes` from the intent's snapshot and invalidate commits
    /// queued behind them.
    fn revert(&self, intent: &CommitIntent, scopes: &[ScopeKey]) {
        if scopes.is_empty() {
            return;
        }
        self.inner
            .store
            .lock()
            .revert_scopes(&intent.snapshot, scopes);
        info!(item_id = %intent.item_id, scopes = scopes.len(), "Scopes restored");
    }

    fn scope_lock(&self, scope: &ScopeKey) -> Arc<ScopeLock<()>> {
        self.inner
            .locks
            .lock()
            .entry(*scope)
            .or_insert_with(|| Arc::new(ScopeLock::new(())))
            .clone()
    }

    fn prune_locks(&self) {
        self.inner
            .locks
            .lock()
            .retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}

impl IntentSink for ReconciliationSync {
    type Ticket = JoinHandle<CommitOutcome>;

    /// Commit on a spawned task. Must be called inside a tokio runtime.
    fn submit(&self, intent: CommitIntent) -> Self::Ticket {
        let sync = self.clone();
        tokio::spawn(async move { sync.commit(intent).await })
    }
}

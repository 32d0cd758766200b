//! Optimistic operation store.
//!
//! The visible list is derived from the last state known to be in sync
//! with the remote service (the base) by replaying an ordered log of
//! operations. Confirmed operations at the head of the log are folded
//! into the base. Rolling back an operation removes it from the log and
//! replays the remainder, so independent operations survive the rollback
//! of an earlier one.
//!
//! Every pending operation arms a rollback timer that runs as a Tokio
//! task. The task only holds a weak reference to the store and is
//! aborted on confirmation, rollback and when the store is dropped.

use std::{
    sync::{Arc, Weak},
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use tokio::{runtime::Handle, sync::watch, task::AbortHandle};
use tsync_entities::{comment::Comment, id::Id};

use crate::tree::{build_tree, CommentTreeNode};

mod mutation;
mod operation;

pub use self::{mutation::*, operation::*};

pub const DEFAULT_ROLLBACK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationState {
    Pending,
    Confirmed,
}

#[derive(Debug)]
struct LogEntry {
    operation: PendingOperation,
    mutation: Mutation,
    state: OperationState,
    timer: Option<AbortHandle>,
}

impl LogEntry {
    fn is_pending(&self) -> bool {
        self.state == OperationState::Pending
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

#[derive(Debug, Default)]
struct State {
    base: Vec<Entry>,
    log: Vec<LogEntry>,
    visible: Vec<Entry>,
    next_operation_id: u64,
}

impl State {
    fn position(&self, id: OperationId) -> Option<usize> {
        self.log.iter().position(|e| e.operation.id == id)
    }

    fn pending_position(&self, id: OperationId) -> Option<usize> {
        self.position(id).filter(|&pos| self.log[pos].is_pending())
    }

    fn fold_confirmed(&mut self) {
        let folded = self
            .log
            .iter()
            .take_while(|e| e.state == OperationState::Confirmed)
            .count();
        for entry in self.log.drain(..folded) {
            let base = std::mem::take(&mut self.base);
            self.base = entry.mutation.apply(base, None);
        }
    }

    fn replay(&mut self) {
        let mut entries = self.base.clone();
        for log_entry in &mut self.log {
            log_entry.operation.original_snapshot = entries.clone();
            let pending = log_entry.is_pending().then_some(log_entry.operation.id);
            entries = log_entry.mutation.apply(entries, pending);
        }
        for entry in &mut entries {
            if let SyncStatus::Pending(id) = entry.status {
                let still_pending = self
                    .log
                    .iter()
                    .any(|e| e.operation.id == id && e.is_pending());
                if !still_pending {
                    entry.status = SyncStatus::Synced;
                }
            }
        }
        self.visible = entries;
    }
}

impl Drop for State {
    fn drop(&mut self) {
        for entry in &mut self.log {
            entry.cancel_timer();
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<State>,
    visible_tx: watch::Sender<Vec<Entry>>,
    rollback_timeout: Option<Duration>,
}

impl Shared {
    fn publish(&self, state: &State) {
        self.visible_tx.send_replace(state.visible.clone());
    }

    fn rollback(&self, id: OperationId) -> bool {
        let mut state = self.state.lock();
        let Some(pos) = state.pending_position(id) else {
            log::debug!("Ignoring rollback of {id}: not pending");
            return false;
        };
        let mut entry = state.log.remove(pos);
        entry.cancel_timer();
        state.fold_confirmed();
        state.replay();
        self.publish(&state);
        log::warn!("Rolled back {:?} operation {id}", entry.operation.kind);
        true
    }

    fn expire(&self, id: OperationId) {
        if self.rollback(id) {
            log::warn!("Operation {id} has not been confirmed in time");
        }
    }
}

/// In-memory list of comments with optimistic, revertible mutations.
#[derive(Debug)]
pub struct OptimisticStore {
    shared: Arc<Shared>,
}

impl Default for OptimisticStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimisticStore {
    pub fn new() -> Self {
        Self::with_rollback_timeout(Some(DEFAULT_ROLLBACK_TIMEOUT))
    }

    /// Pending operations are rolled back automatically after `timeout`,
    /// never if `None`.
    pub fn with_rollback_timeout(timeout: Option<Duration>) -> Self {
        let (visible_tx, _) = watch::channel(vec![]);
        let shared = Shared {
            state: Mutex::new(State::default()),
            visible_tx,
            rollback_timeout: timeout,
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    pub fn rollback_timeout(&self) -> Option<Duration> {
        self.shared.rollback_timeout
    }

    /// Observes every change of the visible list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Entry>> {
        self.shared.visible_tx.subscribe()
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.shared.state.lock().visible.clone()
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.shared
            .state
            .lock()
            .visible
            .iter()
            .map(|e| e.comment.clone())
            .collect()
    }

    pub fn get(&self, id: &Id) -> Option<Entry> {
        self.shared
            .state
            .lock()
            .visible
            .iter()
            .find(|e| e.comment.id == *id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.shared.state.lock().visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tree(&self, max_depth: usize) -> Vec<CommentTreeNode<Entry>> {
        build_tree(self.entries(), max_depth)
    }

    pub fn pending_operations(&self) -> Vec<PendingOperation> {
        self.shared
            .state
            .lock()
            .log
            .iter()
            .filter(|e| e.is_pending())
            .map(|e| e.operation.clone())
            .collect()
    }

    pub fn is_pending(&self, id: OperationId) -> bool {
        self.shared.state.lock().pending_position(id).is_some()
    }

    /// Replaces the synced comments, e.g. after (re)loading the first page.
    ///
    /// Operations that are still in flight are replayed on top.
    pub fn replace_all(&self, comments: Vec<Comment>) {
        let mut state = self.shared.state.lock();
        state.base = comments.into_iter().map(Entry::synced).collect();
        state.replay();
        self.shared.publish(&state);
    }

    /// Appends the synced comments of a subsequent page.
    ///
    /// Comments that are already known are skipped.
    pub fn append(&self, comments: Vec<Comment>) {
        let mut state = self.shared.state.lock();
        for comment in comments {
            if state.base.iter().any(|e| e.comment.id == comment.id) {
                log::debug!("Skipping duplicate comment {}", comment.id);
                continue;
            }
            state.base.push(Entry::synced(comment));
        }
        state.replay();
        self.shared.publish(&state);
    }

    /// Applies the mutation immediately and returns the id of
    /// the new pending operation.
    pub fn apply(&self, mutation: Mutation) -> OperationId {
        let mut state = self.shared.state.lock();
        state.next_operation_id += 1;
        let id = OperationId::new(state.next_operation_id);
        let kind = mutation.kind();
        let original_snapshot = state.visible.clone();
        let visible = std::mem::take(&mut state.visible);
        state.visible = mutation.apply(visible, Some(id));
        let timer = self.arm_timer(id);
        state.log.push(LogEntry {
            operation: PendingOperation {
                id,
                kind,
                original_snapshot,
                created_at: Instant::now(),
            },
            mutation,
            state: OperationState::Pending,
            timer,
        });
        self.shared.publish(&state);
        log::debug!("Applied {kind:?} operation {id}");
        id
    }

    /// Applies a caller-supplied transformation of the visible list.
    pub fn apply_with<F>(&self, kind: OperationKind, transform: F) -> OperationId
    where
        F: Fn(&[Entry]) -> Vec<Entry> + Send + Sync + 'static,
    {
        self.apply(Mutation::Custom {
            kind,
            transform: Arc::new(transform),
        })
    }

    fn arm_timer(&self, id: OperationId) -> Option<AbortHandle> {
        let timeout = self.shared.rollback_timeout?;
        let Ok(runtime) = Handle::try_current() else {
            log::warn!("No async runtime available: {id} will not be rolled back automatically");
            return None;
        };
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        let task = runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(shared) = shared.upgrade() {
                shared.expire(id);
            }
        });
        Some(task.abort_handle())
    }

    /// Marks the operation as accepted by the remote service.
    ///
    /// Returns `false` if the operation is not pending (anymore).
    pub fn confirm(&self, id: OperationId) -> bool {
        self.confirm_inner(id, None)
    }

    /// Confirms a create operation and substitutes the server's copy
    /// for the locally created comment.
    pub fn confirm_created(&self, id: OperationId, canonical: Comment) -> bool {
        self.confirm_inner(id, Some(Mutation::Create(canonical)))
    }

    /// Confirms an update operation with the server's copy of the comment.
    pub fn confirm_updated(&self, id: OperationId, canonical: Comment) -> bool {
        self.confirm_inner(id, Some(Mutation::Replace(canonical)))
    }

    /// Confirms a like operation and adopts the server's flag.
    pub fn confirm_like(&self, id: OperationId, liked: bool) -> bool {
        let state = self.shared.state.lock();
        let Some(pos) = state.pending_position(id) else {
            log::debug!("Ignoring confirmation of {id}: not pending");
            return false;
        };
        let mutation = match &state.log[pos].mutation {
            Mutation::Like { comment_id, .. } => Mutation::Like {
                comment_id: comment_id.clone(),
                liked,
            },
            other => other.clone(),
        };
        drop(state);
        self.confirm_inner(id, Some(mutation))
    }

    fn confirm_inner(&self, id: OperationId, replacement: Option<Mutation>) -> bool {
        let mut state = self.shared.state.lock();
        let Some(pos) = state.pending_position(id) else {
            log::debug!("Ignoring confirmation of {id}: not pending");
            return false;
        };
        let entry = &mut state.log[pos];
        entry.cancel_timer();
        entry.state = OperationState::Confirmed;
        if let Some(mutation) = replacement {
            entry.mutation = mutation;
        }
        state.fold_confirmed();
        state.replay();
        self.shared.publish(&state);
        log::debug!("Confirmed operation {id}");
        true
    }

    /// Reverts the operation.
    ///
    /// Returns `false` if the operation is not pending (anymore).
    pub fn rollback(&self, id: OperationId) -> bool {
        self.shared.rollback(id)
    }

    /// Reverts all pending operations and returns how many there were.
    ///
    /// Confirmed operations are kept, even if they were applied after
    /// the earliest pending one.
    pub fn rollback_all(&self) -> usize {
        let mut state = self.shared.state.lock();
        let mut count = 0;
        state.log.retain_mut(|entry| {
            if entry.is_pending() {
                entry.cancel_timer();
                count += 1;
                false
            } else {
                true
            }
        });
        if count == 0 {
            return 0;
        }
        state.fold_confirmed();
        state.replay();
        self.shared.publish(&state);
        log::warn!("Rolled back {count} pending operation(s)");
        count
    }
}

use std::{fmt, time::Instant};

use tsync_entities::{comment::Comment, id::Id};

use crate::tree::Threaded;

/// Identifies an optimistic operation within one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationId(u64);

impl OperationId {
    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    Update,
    Delete,
    Like,
}

/// Whether a visible comment reflects the remote state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Synced,
    /// Touched by an operation that is neither confirmed nor rolled back.
    Pending(OperationId),
}

/// A visible comment together with its synchronization state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub comment: Comment,
    pub status: SyncStatus,
}

impl Entry {
    pub const fn synced(comment: Comment) -> Self {
        Self {
            comment,
            status: SyncStatus::Synced,
        }
    }

    pub const fn is_pending(&self) -> bool {
        matches!(self.status, SyncStatus::Pending(_))
    }
}

impl Threaded for Entry {
    fn id(&self) -> &Id {
        &self.comment.id
    }
    fn parent_id(&self) -> Option<&Id> {
        self.comment.parent_id.as_ref()
    }
}

/// Bookkeeping of a mutation that has been applied locally but
/// not yet been confirmed by the remote service.
#[rustfmt::skip]
#[derive(Debug, Clone)]
pub struct PendingOperation {
    pub id                : OperationId,
    pub kind              : OperationKind,
    /// The visible list right before the mutation was applied.
    pub original_snapshot : Vec<Entry>,
    pub created_at        : Instant,
}

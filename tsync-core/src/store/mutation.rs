use std::{collections::HashMap, fmt, sync::Arc};

use tsync_entities::{comment::Comment, id::Id};

use super::{Entry, OperationId, OperationKind, SyncStatus};

/// A caller-supplied transformation of the visible list.
///
/// It is re-evaluated whenever the store replays its operation log
/// and must therefore be deterministic.
pub type Transform = Arc<dyn Fn(&[Entry]) -> Vec<Entry> + Send + Sync>;

/// A local change of the visible list.
#[derive(Clone)]
pub enum Mutation {
    /// Prepends a new comment and counts it as a reply of its parent.
    Create(Comment),
    /// Replaces the content of an existing comment.
    Edit { id: Id, content: String },
    /// Replaces an existing comment with an authoritative copy.
    Replace(Comment),
    /// Removes a comment and uncounts it as a reply of its parent.
    Delete(Id),
    /// Sets the like flag of the current user.
    Like { comment_id: Id, liked: bool },
    Custom {
        kind: OperationKind,
        transform: Transform,
    },
}

impl fmt::Debug for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Create(comment) => f.debug_tuple("Create").field(&comment.id).finish(),
            Self::Edit { id, .. } => f.debug_struct("Edit").field("id", id).finish(),
            Self::Replace(comment) => f.debug_tuple("Replace").field(&comment.id).finish(),
            Self::Delete(id) => f.debug_tuple("Delete").field(id).finish(),
            Self::Like { comment_id, liked } => f
                .debug_struct("Like")
                .field("comment_id", comment_id)
                .field("liked", liked)
                .finish(),
            Self::Custom { kind, .. } => f.debug_struct("Custom").field("kind", kind).finish(),
        }
    }
}

impl Mutation {
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Create(_) => OperationKind::Create,
            Self::Edit { .. } | Self::Replace(_) => OperationKind::Update,
            Self::Delete(_) => OperationKind::Delete,
            Self::Like { .. } => OperationKind::Like,
            Self::Custom { kind, .. } => *kind,
        }
    }

    /// Applies the mutation to `entries`.
    ///
    /// Touched entries are marked as pending if `pending` is given and
    /// keep their previous status otherwise.
    pub(super) fn apply(&self, mut entries: Vec<Entry>, pending: Option<OperationId>) -> Vec<Entry> {
        let mark = |entry: &mut Entry| {
            if let Some(op) = pending {
                entry.status = SyncStatus::Pending(op);
            }
        };
        match self {
            Self::Create(comment) => {
                if let Some(entry) = find_mut(&mut entries, &comment.id) {
                    entry.comment = comment.clone();
                    mark(entry);
                    return entries;
                }
                if let Some(parent_id) = &comment.parent_id {
                    if let Some(parent) = find_mut(&mut entries, parent_id) {
                        parent.comment.replies_count = parent.comment.replies_count.saturating_add(1);
                    }
                }
                let mut entry = Entry::synced(comment.clone());
                mark(&mut entry);
                entries.insert(0, entry);
            }
            Self::Edit { id, content } => {
                if let Some(entry) = find_mut(&mut entries, id) {
                    entry.comment.content = content.clone();
                    mark(entry);
                }
            }
            Self::Replace(comment) => {
                if let Some(entry) = find_mut(&mut entries, &comment.id) {
                    entry.comment = comment.clone();
                    mark(entry);
                }
            }
            Self::Delete(id) => {
                if let Some(pos) = entries.iter().position(|e| e.comment.id == *id) {
                    let removed = entries.remove(pos);
                    if let Some(parent_id) = &removed.comment.parent_id {
                        if let Some(parent) = find_mut(&mut entries, parent_id) {
                            parent.comment.replies_count = parent.comment.replies_count.saturating_sub(1);
                        }
                    }
                }
            }
            Self::Like { comment_id, liked } => {
                if let Some(entry) = find_mut(&mut entries, comment_id) {
                    let comment = &mut entry.comment;
                    if comment.liked_by_current_user != *liked {
                        comment.likes_count = if *liked {
                            comment.likes_count.saturating_add(1)
                        } else {
                            comment.likes_count.saturating_sub(1)
                        };
                        comment.liked_by_current_user = *liked;
                    }
                    mark(entry);
                }
            }
            Self::Custom { transform, .. } => {
                let mut changed = transform(&entries);
                if pending.is_some() {
                    let before: HashMap<&Id, &Comment> =
                        entries.iter().map(|e| (&e.comment.id, &e.comment)).collect();
                    for entry in &mut changed {
                        if before.get(&entry.comment.id) != Some(&&entry.comment) {
                            mark(entry);
                        }
                    }
                }
                return changed;
            }
        }
        entries
    }
}

fn find_mut<'a>(entries: &'a mut [Entry], id: &Id) -> Option<&'a mut Entry> {
    entries.iter_mut().find(|e| e.comment.id == *id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsync_entities::builders::*;

    fn entry(id: &str, parent_id: Option<&str>) -> Entry {
        Entry::synced(Comment::build().id(id).parent_id(parent_id).finish())
    }

    fn ids(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.comment.id.as_str()).collect()
    }

    #[test]
    fn create_prepends_and_counts_reply() {
        let op = OperationId::new(1);
        let entries = vec![entry("1", None)];
        let reply = Comment::build().id("2").parent_id(Some("1")).finish();
        let entries = Mutation::Create(reply).apply(entries, Some(op));
        assert_eq!(ids(&entries), vec!["2", "1"]);
        assert_eq!(entries[0].status, SyncStatus::Pending(op));
        assert_eq!(entries[1].comment.replies_count, 1);
        assert_eq!(entries[1].status, SyncStatus::Synced);
    }

    #[test]
    fn create_existing_comment_replaces_it() {
        let entries = vec![entry("1", None), entry("2", Some("1"))];
        let again = Comment::build().id("2").parent_id(Some("1")).content("x").finish();
        let entries = Mutation::Create(again).apply(entries, None);
        assert_eq!(ids(&entries), vec!["1", "2"]);
        assert_eq!(entries[1].comment.content, "x");
        assert_eq!(entries[0].comment.replies_count, 0);
    }

    #[test]
    fn delete_uncounts_reply_without_underflow() {
        let entries = vec![entry("1", None), entry("2", Some("1"))];
        let entries = Mutation::Delete("2".into()).apply(entries, None);
        assert_eq!(ids(&entries), vec!["1"]);
        assert_eq!(entries[0].comment.replies_count, 0);
        let entries = Mutation::Delete("unknown".into()).apply(entries, None);
        assert_eq!(ids(&entries), vec!["1"]);
    }

    #[test]
    fn like_has_set_semantics() {
        let op = OperationId::new(3);
        let entries = vec![Entry::synced(Comment::build().id("1").likes(0, false).finish())];
        let entries = Mutation::Like {
            comment_id: "1".into(),
            liked: true,
        }
        .apply(entries, Some(op));
        assert_eq!(entries[0].comment.likes_count, 1);
        assert!(entries[0].comment.liked_by_current_user);
        let entries = Mutation::Like {
            comment_id: "1".into(),
            liked: true,
        }
        .apply(entries, Some(op));
        assert_eq!(entries[0].comment.likes_count, 1);
        let entries = Mutation::Like {
            comment_id: "1".into(),
            liked: false,
        }
        .apply(entries, None);
        assert_eq!(entries[0].comment.likes_count, 0);
        let entries = Mutation::Like {
            comment_id: "1".into(),
            liked: false,
        }
        .apply(entries, None);
        assert_eq!(entries[0].comment.likes_count, 0);
    }

    #[test]
    fn custom_transform_marks_changed_entries() {
        let op = OperationId::new(7);
        let transform: Transform = Arc::new(|entries: &[Entry]| {
            let mut entries = entries.to_vec();
            entries[1].comment.content = "pinned".into();
            entries.swap(0, 1);
            entries
        });
        let mutation = Mutation::Custom {
            kind: OperationKind::Update,
            transform,
        };
        assert_eq!(mutation.kind(), OperationKind::Update);
        let entries = mutation.apply(vec![entry("1", None), entry("2", None)], Some(op));
        assert_eq!(ids(&entries), vec!["2", "1"]);
        assert_eq!(entries[0].status, SyncStatus::Pending(op));
        assert_eq!(entries[1].status, SyncStatus::Synced);
    }
}

use crate::{context::*, id::*, time::*};

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorSummary {
    pub id           : Id,
    pub display_name : String,
}

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id                    : Id,
    pub author                : AuthorSummary,
    pub content               : String,
    pub context               : DiscussionContext,
    pub parent_id             : Option<Id>,
    pub likes_count           : u32,
    pub replies_count         : u32,
    pub liked_by_current_user : bool,
    pub created_at            : Timestamp,
    pub deleted_at            : Option<Timestamp>,
    /// Replies that have been delivered inline with this comment.
    pub children              : Vec<Comment>,
}

impl Comment {
    pub const fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Moves all inline replies (recursively) out of this comment and
    /// returns them parent-first.
    pub fn take_children(&mut self) -> Vec<Comment> {
        let mut flat = Vec::new();
        let mut stack: Vec<Comment> = std::mem::take(&mut self.children)
            .into_iter()
            .rev()
            .collect();
        while let Some(mut child) = stack.pop() {
            stack.extend(std::mem::take(&mut child.children).into_iter().rev());
            flat.push(child);
        }
        flat
    }
}

/// Input for creating a comment.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub content   : String,
    pub context   : Option<DiscussionContext>,
    pub parent_id : Option<Id>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::*;

    #[test]
    fn take_inline_children_parent_first() {
        let grandchild = Comment::build().id("3").parent_id(Some("2")).finish();
        let mut child = Comment::build().id("2").parent_id(Some("1")).finish();
        child.children.push(grandchild);
        let sibling = Comment::build().id("4").parent_id(Some("1")).finish();
        let mut root = Comment::build().id("1").finish();
        root.children = vec![child, sibling];

        let flat = root.take_children();
        let ids: Vec<_> = flat.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "4"]);
        assert!(root.children.is_empty());
        assert!(flat.iter().all(|c| c.children.is_empty()));
    }
}

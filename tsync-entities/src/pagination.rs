use crate::comment::Comment;

#[rustfmt::skip]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationMeta {
    pub total    : u64,
    pub page     : u32,
    pub has_next : bool,
}

/// One page of comments as delivered by the remote service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub pagination: PaginationMeta,
}

impl CommentPage {
    /// Lifts all inline replies into the flat list, each directly
    /// behind its parent.
    pub fn flatten_inline_children(self) -> Self {
        let Self {
            comments,
            pagination,
        } = self;
        let mut flat = Vec::with_capacity(comments.len());
        for mut comment in comments {
            let children = comment.take_children();
            flat.push(comment);
            flat.extend(children);
        }
        Self {
            comments: flat,
            pagination,
        }
    }
}

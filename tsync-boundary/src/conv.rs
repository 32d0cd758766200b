use super::*;
use std::convert::TryFrom;
use thiserror::Error;
use tsync_entities as e;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Comment {0} has no discussion context")]
    MissingContext(String),
    #[error("Comment {0} belongs to a photo and a series")]
    AmbiguousContext(String),
}

fn context_ids(context: &e::context::DiscussionContext) -> (Option<String>, Option<String>) {
    (
        context.photo_id().map(|id| id.to_string()),
        context.series_id().map(|id| id.to_string()),
    )
}

impl From<e::comment::AuthorSummary> for Author {
    fn from(from: e::comment::AuthorSummary) -> Self {
        let e::comment::AuthorSummary { id, display_name } = from;
        Self {
            id: id.into(),
            display_name,
        }
    }
}

impl From<Author> for e::comment::AuthorSummary {
    fn from(from: Author) -> Self {
        let Author { id, display_name } = from;
        Self {
            id: id.into(),
            display_name,
        }
    }
}

impl From<e::comment::Comment> for Comment {
    fn from(from: e::comment::Comment) -> Self {
        let e::comment::Comment {
            id,
            author,
            content,
            context,
            parent_id,
            likes_count,
            replies_count,
            liked_by_current_user,
            created_at,
            deleted_at,
            children,
        } = from;
        let (photo_context_id, series_context_id) = context_ids(&context);
        Self {
            id: id.into(),
            author: author.into(),
            content,
            photo_context_id,
            series_context_id,
            parent_id: parent_id.map(Into::into),
            likes_count,
            replies_count,
            liked_by_current_user,
            created_at: created_at.into_inner(),
            deleted_at: deleted_at.map(e::time::Timestamp::into_inner),
            children: children.into_iter().map(Into::into).collect(),
        }
    }
}

impl TryFrom<Comment> for e::comment::Comment {
    type Error = ConversionError;

    fn try_from(from: Comment) -> Result<Self, Self::Error> {
        let Comment {
            id,
            author,
            content,
            photo_context_id,
            series_context_id,
            parent_id,
            likes_count,
            replies_count,
            liked_by_current_user,
            created_at,
            deleted_at,
            children,
        } = from;
        let context = match (photo_context_id, series_context_id) {
            (Some(photo_id), None) => e::context::DiscussionContext::Photo(photo_id.into()),
            (None, Some(series_id)) => e::context::DiscussionContext::Series(series_id.into()),
            (None, None) => return Err(ConversionError::MissingContext(id)),
            (Some(_), Some(_)) => return Err(ConversionError::AmbiguousContext(id)),
        };
        let children = children
            .into_iter()
            .map(Self::try_from)
            .collect::<Result<_, _>>()?;
        Ok(Self {
            id: id.into(),
            author: author.into(),
            content,
            context,
            parent_id: parent_id.map(Into::into),
            likes_count,
            replies_count,
            liked_by_current_user,
            created_at: created_at.into(),
            deleted_at: deleted_at.map(Into::into),
            children,
        })
    }
}

impl From<Pagination> for e::pagination::PaginationMeta {
    fn from(from: Pagination) -> Self {
        let Pagination {
            total,
            page,
            has_next,
        } = from;
        Self {
            total,
            page,
            has_next,
        }
    }
}

impl From<e::pagination::PaginationMeta> for Pagination {
    fn from(from: e::pagination::PaginationMeta) -> Self {
        let e::pagination::PaginationMeta {
            total,
            page,
            has_next,
        } = from;
        Self {
            total,
            page,
            has_next,
        }
    }
}

impl TryFrom<CommentPage> for e::pagination::CommentPage {
    type Error = ConversionError;

    fn try_from(from: CommentPage) -> Result<Self, Self::Error> {
        let CommentPage { data, pagination } = from;
        let comments = data
            .into_iter()
            .map(e::comment::Comment::try_from)
            .collect::<Result<_, _>>()?;
        Ok(Self {
            comments,
            pagination: pagination.into(),
        })
    }
}

impl LikeRequest {
    pub fn new(comment_id: &e::id::Id, context: &e::context::DiscussionContext) -> Self {
        let (photo_context_id, series_context_id) = context_ids(context);
        Self {
            comment_id: comment_id.to_string(),
            photo_context_id,
            series_context_id,
        }
    }
}

impl NewComment {
    pub fn new(content: &str, parent_id: Option<&e::id::Id>) -> Self {
        Self {
            content: content.to_owned(),
            parent_id: parent_id.map(ToString::to_string),
        }
    }
}

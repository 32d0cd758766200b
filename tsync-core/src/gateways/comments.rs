use async_trait::async_trait;
use thiserror::Error;
use tsync_entities::{comment::Comment, context::DiscussionContext, id::Id, pagination::CommentPage};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Network failure: {0}")]
    Network(String),
    #[error("Remote service responded with {status}: {message}")]
    Remote { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Transport to the remote comment service.
///
/// Implementations only move data; validation and local bookkeeping are
/// done by the callers.
#[async_trait]
pub trait CommentGateway: Send + Sync {
    async fn fetch_comments(&self, context_id: &Id, page: u32, limit: u32) -> Result<CommentPage>;

    async fn fetch_replies(&self, parent_id: &Id, page: u32, limit: u32) -> Result<CommentPage>;

    async fn create_comment(
        &self,
        context: &DiscussionContext,
        content: &str,
        parent_id: Option<&Id>,
    ) -> Result<Comment>;

    async fn update_comment(&self, id: &Id, content: &str) -> Result<Comment>;

    async fn delete_comment(&self, id: &Id) -> Result<()>;

    /// Returns whether the comment is liked by the current user afterwards.
    async fn toggle_like(&self, comment_id: &Id, context: &DiscussionContext) -> Result<bool>;
}

#[async_trait]
impl<G> CommentGateway for std::sync::Arc<G>
where
    G: CommentGateway + ?Sized,
{
    async fn fetch_comments(&self, context_id: &Id, page: u32, limit: u32) -> Result<CommentPage> {
        (**self).fetch_comments(context_id, page, limit).await
    }

    async fn fetch_replies(&self, parent_id: &Id, page: u32, limit: u32) -> Result<CommentPage> {
        (**self).fetch_replies(parent_id, page, limit).await
    }

    async fn create_comment(
        &self,
        context: &DiscussionContext,
        content: &str,
        parent_id: Option<&Id>,
    ) -> Result<Comment> {
        (**self).create_comment(context, content, parent_id).await
    }

    async fn update_comment(&self, id: &Id, content: &str) -> Result<Comment> {
        (**self).update_comment(id, content).await
    }

    async fn delete_comment(&self, id: &Id) -> Result<()> {
        (**self).delete_comment(id).await
    }

    async fn toggle_like(&self, comment_id: &Id, context: &DiscussionContext) -> Result<bool> {
        (**self).toggle_like(comment_id, context).await
    }
}

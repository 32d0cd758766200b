// The comment repository is the only component that talks to the
// remote authority. Comment text is validated and sanitized before
// anything is sent; invalid input never causes a network call.

use thiserror::Error;
use tsync_entities::{
    comment::{Comment, NewComment},
    context::DiscussionContext,
    id::Id,
    pagination::CommentPage,
};

use crate::{
    gateways::{self, CommentGateway},
    util::validate::{CommentInvalidation, ContentValidator},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Invalid(#[from] CommentInvalidation),
    #[error("Network failure: {0}")]
    Network(String),
    #[error("Remote service responded with {status}: {message}")]
    Remote { status: u16, message: String },
}

impl From<gateways::Error> for Error {
    fn from(from: gateways::Error) -> Self {
        match from {
            gateways::Error::Network(msg) => Self::Network(msg),
            gateways::Error::Remote { status, message } => Self::Remote { status, message },
        }
    }
}

type Result<T> = std::result::Result<T, Error>;

/// A new comment that passed validation; `content` is sanitized.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidComment {
    pub context   : DiscussionContext,
    pub content   : String,
    pub parent_id : Option<Id>,
}

#[derive(Debug)]
pub struct CommentRepository<G> {
    gateway: G,
    validator: ContentValidator,
}

impl<G> CommentRepository<G>
where
    G: CommentGateway,
{
    pub fn new(gateway: G) -> Self {
        Self::with_validator(gateway, ContentValidator::default())
    }

    pub const fn with_validator(gateway: G, validator: ContentValidator) -> Self {
        Self { gateway, validator }
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Fetches one page of the discussion.
    ///
    /// Inline replies are lifted into the flat list directly behind their
    /// parent. Replacing (page 1) or appending (page > 1) the result is up
    /// to the caller.
    pub async fn fetch_page(&self, context_id: &Id, page: u32, page_size: u32) -> Result<CommentPage> {
        let page = page.max(1);
        log::debug!("Fetching comments of {context_id} (page {page}, size {page_size})");
        let result = self
            .gateway
            .fetch_comments(context_id, page, page_size)
            .await?;
        Ok(result.flatten_inline_children())
    }

    pub async fn fetch_replies(&self, parent_id: &Id, page: u32, page_size: u32) -> Result<CommentPage> {
        let page = page.max(1);
        log::debug!("Fetching replies to {parent_id} (page {page}, size {page_size})");
        let result = self
            .gateway
            .fetch_replies(parent_id, page, page_size)
            .await?;
        Ok(result.flatten_inline_children())
    }

    pub fn validate_new_comment(&self, new_comment: &NewComment) -> Result<ValidComment> {
        let NewComment {
            content,
            context,
            parent_id,
        } = new_comment;
        let context = context
            .clone()
            .ok_or(CommentInvalidation::MissingContext)?;
        let content = self
            .validator
            .validate(content)
            .into_result()
            .map_err(CommentInvalidation::from)?;
        Ok(ValidComment {
            context,
            content,
            parent_id: parent_id.clone(),
        })
    }

    pub fn validate_content(&self, content: &str) -> Result<String> {
        Ok(self
            .validator
            .validate(content)
            .into_result()
            .map_err(CommentInvalidation::from)?)
    }

    /// Validates and creates a new comment.
    ///
    /// Returns the comment as assigned by the server.
    pub async fn create(&self, new_comment: &NewComment) -> Result<Comment> {
        let valid = self.validate_new_comment(new_comment)?;
        self.create_valid(&valid).await
    }

    pub async fn create_valid(&self, valid: &ValidComment) -> Result<Comment> {
        let ValidComment {
            context,
            content,
            parent_id,
        } = valid;
        let created = self
            .gateway
            .create_comment(context, content, parent_id.as_ref())
            .await?;
        log::debug!("Created comment {}", created.id);
        Ok(created)
    }

    /// Validates and replaces the content of an existing comment.
    pub async fn update(&self, id: &Id, content: &str) -> Result<Comment> {
        let content = self.validate_content(content)?;
        self.update_valid(id, &content).await
    }

    /// `content` must already be sanitized.
    pub async fn update_valid(&self, id: &Id, content: &str) -> Result<Comment> {
        Ok(self.gateway.update_comment(id, content).await?)
    }

    pub async fn delete(&self, id: &Id) -> Result<()> {
        self.gateway.delete_comment(id).await?;
        log::debug!("Deleted comment {id}");
        Ok(())
    }

    /// The service only reports the resulting flag, not the updated
    /// comment.
    pub async fn toggle_like(&self, comment_id: &Id, context: &DiscussionContext) -> Result<bool> {
        Ok(self.gateway.toggle_like(comment_id, context).await?)
    }
}

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};

use tsync_boundary::{
    Comment, CommentPage, LikeRequest, LikeResponse, NewComment, UpdateComment,
};
use tsync_core::gateways::{self, CommentGateway};
use tsync_entities as e;

use crate::{auth_header_value, ensure_success, into_json, util, Result};

/// Comment API of the remote service
#[derive(Debug, Clone)]
pub struct CommentApi {
    url: String,
    token: Option<String>,
    client: Client,
}

impl CommentApi {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let mut url = url.into();
        while url.ends_with('/') {
            url.pop();
        }
        Self {
            url,
            token: None,
            client: Client::new(),
        }
    }

    /// Every request is authorized with this bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        log::debug!("{method} {url}");
        let req = self.client.request(method, url);
        match &self.token {
            Some(token) => req.header("Authorization", auth_header_value(token)),
            None => req,
        }
    }

    pub async fn comments(&self, context_id: &str, page: u32, limit: u32) -> Result<CommentPage> {
        let url = util::comment_page_url(&self.url, context_id, page, limit);
        let response = self.request(Method::GET, &url).send().await?;
        into_json(response).await
    }

    pub async fn replies(&self, parent_id: &str, page: u32, limit: u32) -> Result<CommentPage> {
        let url = util::replies_page_url(&self.url, parent_id, page, limit);
        let response = self.request(Method::GET, &url).send().await?;
        into_json(response).await
    }

    pub async fn create(&self, context_id: &str, new_comment: &NewComment) -> Result<Comment> {
        let url = util::context_comments_url(&self.url, context_id);
        let response = self
            .request(Method::POST, &url)
            .json(new_comment)
            .send()
            .await?;
        into_json(response).await
    }

    pub async fn update(&self, id: &str, update: &UpdateComment) -> Result<Comment> {
        let url = util::comment_url(&self.url, id);
        let response = self
            .request(Method::PATCH, &url)
            .json(update)
            .send()
            .await?;
        into_json(response).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let url = util::comment_url(&self.url, id);
        let response = self.request(Method::DELETE, &url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    pub async fn like(&self, like: &LikeRequest) -> Result<LikeResponse> {
        let url = util::likes_url(&self.url);
        let response = self
            .request(Method::POST, &url)
            .json(like)
            .send()
            .await?;
        into_json(response).await
    }
}

#[async_trait]
impl CommentGateway for CommentApi {
    async fn fetch_comments(
        &self,
        context_id: &e::id::Id,
        page: u32,
        limit: u32,
    ) -> gateways::Result<e::pagination::CommentPage> {
        let page = self.comments(context_id.as_str(), page, limit).await?;
        Ok(e::pagination::CommentPage::try_from(page).map_err(crate::Error::from)?)
    }

    async fn fetch_replies(
        &self,
        parent_id: &e::id::Id,
        page: u32,
        limit: u32,
    ) -> gateways::Result<e::pagination::CommentPage> {
        let page = self.replies(parent_id.as_str(), page, limit).await?;
        Ok(e::pagination::CommentPage::try_from(page).map_err(crate::Error::from)?)
    }

    async fn create_comment(
        &self,
        context: &e::context::DiscussionContext,
        content: &str,
        parent_id: Option<&e::id::Id>,
    ) -> gateways::Result<e::comment::Comment> {
        let new_comment = NewComment::new(content, parent_id);
        let created = self.create(context.id().as_str(), &new_comment).await?;
        Ok(e::comment::Comment::try_from(created).map_err(crate::Error::from)?)
    }

    async fn update_comment(
        &self,
        id: &e::id::Id,
        content: &str,
    ) -> gateways::Result<e::comment::Comment> {
        let update = UpdateComment {
            content: content.to_owned(),
        };
        let updated = self.update(id.as_str(), &update).await?;
        Ok(e::comment::Comment::try_from(updated).map_err(crate::Error::from)?)
    }

    async fn delete_comment(&self, id: &e::id::Id) -> gateways::Result<()> {
        Ok(self.delete(id.as_str()).await?)
    }

    async fn toggle_like(
        &self,
        comment_id: &e::id::Id,
        context: &e::context::DiscussionContext,
    ) -> gateways::Result<bool> {
        let LikeResponse { liked } = self.like(&LikeRequest::new(comment_id, context)).await?;
        Ok(liked)
    }
}

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::sync::watch;

use super::{
    delete_comment, edit_comment, load_comments, load_replies, post_comment, prelude::*, toggle_like,
};
use crate::{
    store::DEFAULT_ROLLBACK_TIMEOUT,
    tree::{CommentTreeNode, DEFAULT_MAX_DEPTH},
};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscussionConfig {
    pub page_size: u32,
    pub max_depth: usize,
    pub rollback_timeout: Option<Duration>,
}

impl Default for DiscussionConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            rollback_timeout: Some(DEFAULT_ROLLBACK_TIMEOUT),
        }
    }
}

#[derive(Debug, Default)]
struct Paging {
    page: u32,
    total: u64,
    has_next: bool,
    loading: bool,
}

/// Resets the loading flag, even if the load is cancelled.
struct Loading<'a>(&'a Mutex<Paging>);

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.lock().loading = false;
    }
}

/// The discussion of a single photo or series as seen by one actor.
#[derive(Debug)]
pub struct Discussion<G> {
    repo: CommentRepository<G>,
    store: OptimisticStore,
    limits: Arc<RateLimits>,
    actor: Actor,
    context: DiscussionContext,
    config: DiscussionConfig,
    paging: Mutex<Paging>,
}

impl<G> Discussion<G>
where
    G: CommentGateway,
{
    /// Rate limits are keyed by actor and may be shared between discussions.
    pub fn new(
        repo: CommentRepository<G>,
        limits: Arc<RateLimits>,
        actor: Actor,
        context: DiscussionContext,
        config: DiscussionConfig,
    ) -> Self {
        Self {
            repo,
            store: OptimisticStore::with_rollback_timeout(config.rollback_timeout),
            limits,
            actor,
            context,
            config,
            paging: Mutex::new(Paging {
                has_next: true,
                ..Default::default()
            }),
        }
    }

    pub const fn context(&self) -> &DiscussionContext {
        &self.context
    }

    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    pub const fn store(&self) -> &OptimisticStore {
        &self.store
    }

    pub fn pagination(&self) -> PaginationMeta {
        let paging = self.paging.lock();
        PaginationMeta {
            total: paging.total,
            page: paging.page,
            has_next: paging.has_next,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.paging.lock().loading
    }

    pub fn has_next_page(&self) -> bool {
        self.paging.lock().has_next
    }

    /// (Re)loads the first page.
    ///
    /// Returns `None` without fetching if a page is currently loading.
    pub async fn load_first_page(&self) -> Result<Option<PaginationMeta>> {
        self.load_page(|_| Some(1)).await
    }

    /// Loads the page after the last loaded one.
    ///
    /// Returns `None` without fetching if a page is currently loading
    /// or if there are no more pages.
    pub async fn load_next_page(&self) -> Result<Option<PaginationMeta>> {
        self.load_page(|paging| paging.has_next.then_some(paging.page + 1))
            .await
    }

    async fn load_page(&self, next: impl FnOnce(&Paging) -> Option<u32>) -> Result<Option<PaginationMeta>> {
        let page = {
            let mut paging = self.paging.lock();
            if paging.loading {
                log::debug!("Already loading comments of {}", self.context.id());
                return Ok(None);
            }
            let Some(page) = next(&paging) else {
                return Ok(None);
            };
            paging.loading = true;
            page
        };
        let _loading = Loading(&self.paging);
        let meta = load_comments(
            &self.repo,
            &self.store,
            self.context.id(),
            page,
            self.config.page_size,
        )
        .await?;
        let mut paging = self.paging.lock();
        paging.page = page;
        paging.total = meta.total;
        paging.has_next = meta.has_next;
        Ok(Some(meta))
    }

    pub async fn load_replies(&self, parent_id: &Id) -> Result<PaginationMeta> {
        load_replies(&self.repo, &self.store, parent_id, 1, self.config.page_size).await
    }

    pub async fn post(&self, content: &str, parent_id: Option<Id>) -> Result<Comment> {
        let new_comment = NewComment {
            content: content.to_owned(),
            context: Some(self.context.clone()),
            parent_id,
        };
        post_comment(&self.repo, &self.store, &self.limits, &self.actor, new_comment).await
    }

    pub async fn edit(&self, id: &Id, content: &str) -> Result<Comment> {
        edit_comment(&self.repo, &self.store, &self.actor, id, content).await
    }

    pub async fn delete(&self, id: &Id) -> Result<()> {
        delete_comment(&self.repo, &self.store, &self.actor, id).await
    }

    pub async fn toggle_like(&self, id: &Id) -> Result<bool> {
        toggle_like(&self.repo, &self.store, &self.limits, &self.actor, id).await
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.store.entries()
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.store.comments()
    }

    pub fn tree(&self) -> Vec<CommentTreeNode<Entry>> {
        self.store.tree(self.config.max_depth)
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Entry>> {
        self.store.subscribe()
    }
}

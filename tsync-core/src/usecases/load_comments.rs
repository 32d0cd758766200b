use super::prelude::*;

/// Fetches a page of the discussion into the store.
///
/// The first page replaces all synced comments, subsequent pages are
/// appended. Pending operations stay in effect.
pub async fn load_comments<G>(
    repo: &CommentRepository<G>,
    store: &OptimisticStore,
    context_id: &Id,
    page: u32,
    page_size: u32,
) -> Result<PaginationMeta>
where
    G: CommentGateway,
{
    let CommentPage {
        comments,
        pagination,
    } = repo.fetch_page(context_id, page, page_size).await?;
    log::info!(
        "Loaded {} comment(s) of {context_id} (page {}, {} in total)",
        comments.len(),
        pagination.page,
        pagination.total
    );
    if page <= 1 {
        store.replace_all(comments);
    } else {
        store.append(comments);
    }
    Ok(pagination)
}

/// Fetches the replies to a comment and adds them to the store.
pub async fn load_replies<G>(
    repo: &CommentRepository<G>,
    store: &OptimisticStore,
    parent_id: &Id,
    page: u32,
    page_size: u32,
) -> Result<PaginationMeta>
where
    G: CommentGateway,
{
    let CommentPage {
        comments,
        pagination,
    } = repo.fetch_replies(parent_id, page, page_size).await?;
    log::info!("Loaded {} reply(s) to {parent_id}", comments.len());
    store.append(comments);
    Ok(pagination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::tests::mock::MockGateway;
    use tsync_entities::builders::*;

    fn photo_comment(id: &str) -> Comment {
        Comment::build()
            .id(id)
            .context(DiscussionContext::Photo("42".into()))
            .finish()
    }

    #[tokio::test]
    async fn first_page_replaces_and_next_page_appends() {
        let gw = MockGateway::new("alice");
        for id in ["1", "2", "3"] {
            gw.insert(photo_comment(id));
        }
        let repo = CommentRepository::new(gw);
        let store = OptimisticStore::with_rollback_timeout(None);
        store.replace_all(vec![photo_comment("stale")]);

        let meta = load_comments(&repo, &store, &"42".into(), 1, 2).await.unwrap();
        assert_eq!(meta.total, 3);
        assert!(meta.has_next);
        let ids: Vec<_> = store.comments().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![Id::from("1"), Id::from("2")]);

        let meta = load_comments(&repo, &store, &"42".into(), 2, 2).await.unwrap();
        assert!(!meta.has_next);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn load_replies_appends_to_store() {
        let gw = MockGateway::new("alice");
        gw.insert(photo_comment("1"));
        gw.insert(
            Comment::build()
                .id("2")
                .parent_id(Some("1"))
                .context(DiscussionContext::Photo("42".into()))
                .finish(),
        );
        let repo = CommentRepository::new(gw);
        let store = OptimisticStore::with_rollback_timeout(None);
        store.replace_all(vec![photo_comment("1")]);

        let meta = load_replies(&repo, &store, &"1".into(), 1, 10).await.unwrap();
        assert_eq!(meta.total, 1);
        assert_eq!(store.len(), 2);
    }
}

use super::prelude::*;
use crate::authorization::comment::authorize_edit;

/// Replaces the content of one of the actor's own comments.
pub async fn edit_comment<G>(
    repo: &CommentRepository<G>,
    store: &OptimisticStore,
    actor: &Actor,
    id: &Id,
    content: &str,
) -> Result<Comment>
where
    G: CommentGateway,
{
    let entry = saved_entry(store, id)?;
    authorize_edit(actor, &entry.comment)?;
    let content = repo.validate_content(content)?;

    let op = store.apply(Mutation::Edit {
        id: id.clone(),
        content: content.clone(),
    });
    match repo.update_valid(id, &content).await {
        Ok(updated) => {
            store.confirm_updated(op, updated.clone());
            log::info!("Edited comment {id}");
            Ok(updated)
        }
        Err(err) => {
            log::warn!("Failed to edit comment {id}: {err}");
            store.rollback(op);
            Err(err.into())
        }
    }
}

/// Looks up a comment that is known to the remote service.
pub(super) fn saved_entry(store: &OptimisticStore, id: &Id) -> Result<Entry> {
    if id.is_placeholder() {
        log::debug!("Comment {id} has not been saved yet");
        return Err(Error::NotFound);
    }
    store.get(id).ok_or(Error::NotFound)
}

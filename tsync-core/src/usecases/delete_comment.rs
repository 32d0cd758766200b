use super::{edit_comment::saved_entry, prelude::*};
use crate::authorization::comment::authorize_delete;

pub async fn delete_comment<G>(
    repo: &CommentRepository<G>,
    store: &OptimisticStore,
    actor: &Actor,
    id: &Id,
) -> Result<()>
where
    G: CommentGateway,
{
    let entry = saved_entry(store, id)?;
    authorize_delete(actor, &entry.comment)?;

    let op = store.apply(Mutation::Delete(id.clone()));
    match repo.delete(id).await {
        Ok(()) => {
            store.confirm(op);
            log::info!("Deleted comment {id}");
            Ok(())
        }
        Err(err) => {
            log::warn!("Failed to delete comment {id}: {err}");
            store.rollback(op);
            Err(err.into())
        }
    }
}

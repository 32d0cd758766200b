use super::{edit_comment::saved_entry, prelude::*};
use crate::authorization::comment::authorize_role;

/// Flips the like of the actor and returns the flag as reported
/// by the remote service.
pub async fn toggle_like<G>(
    repo: &CommentRepository<G>,
    store: &OptimisticStore,
    limits: &RateLimits,
    actor: &Actor,
    id: &Id,
) -> Result<bool>
where
    G: CommentGateway,
{
    authorize_role(actor, Role::Member)?;
    let entry = saved_entry(store, id)?;
    limits
        .check(&actor.id, Action::Like)
        .map_err(|reset_in| Error::RateLimited { reset_in })?;

    let Comment {
        context,
        liked_by_current_user,
        ..
    } = entry.comment;
    let op = store.apply(Mutation::Like {
        comment_id: id.clone(),
        liked: !liked_by_current_user,
    });
    match repo.toggle_like(id, &context).await {
        Ok(liked) => {
            store.confirm_like(op, liked);
            log::info!("Comment {id} is {}liked now", if liked { "" } else { "not " });
            Ok(liked)
        }
        Err(err) => {
            log::warn!("Failed to toggle like of comment {id}: {err}");
            store.rollback(op);
            Err(err.into())
        }
    }
}

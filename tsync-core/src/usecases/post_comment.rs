use super::prelude::*;
use crate::{authorization::comment::authorize_role, repositories::ValidComment};

/// Creates a comment or reply.
///
/// The comment becomes visible immediately under a placeholder id that is
/// replaced by the server-assigned id on success. Invalid or rate-limited
/// requests leave the store untouched.
pub async fn post_comment<G>(
    repo: &CommentRepository<G>,
    store: &OptimisticStore,
    limits: &RateLimits,
    actor: &Actor,
    new_comment: NewComment,
) -> Result<Comment>
where
    G: CommentGateway,
{
    authorize_role(actor, Role::Member)?;
    let valid = repo.validate_new_comment(&new_comment)?;
    let action = if valid.parent_id.is_some() {
        Action::Reply
    } else {
        Action::Comment
    };
    limits
        .check(&actor.id, action)
        .map_err(|reset_in| Error::RateLimited { reset_in })?;

    let op = store.apply(Mutation::Create(placeholder(actor, &valid)));
    match repo.create_valid(&valid).await {
        Ok(created) => {
            if !store.confirm_created(op, created.clone()) {
                log::warn!("Comment {} was created after {op} has been rolled back", created.id);
            }
            log::info!("Posted comment {}", created.id);
            Ok(created)
        }
        Err(err) => {
            log::warn!("Failed to post comment: {err}");
            store.rollback(op);
            Err(err.into())
        }
    }
}

fn placeholder(actor: &Actor, valid: &ValidComment) -> Comment {
    let ValidComment {
        context,
        content,
        parent_id,
    } = valid;
    Comment {
        id: Id::new_placeholder(),
        author: AuthorSummary {
            id: actor.id.clone(),
            display_name: actor.id.to_string(),
        },
        content: content.clone(),
        context: context.clone(),
        parent_id: parent_id.clone(),
        likes_count: 0,
        replies_count: 0,
        liked_by_current_user: false,
        created_at: Timestamp::now(),
        deleted_at: None,
        children: vec![],
    }
}

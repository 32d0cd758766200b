use std::result::Result as StdResult;
use thiserror::Error;
use tsync_entities::{actor::*, comment::Comment};

#[derive(Debug, Error)]
pub enum Error {
    #[error("unauthorized role")]
    UnauthorizedRole,
    #[error("not the author of the comment")]
    NotOwner,
}

pub type Result<T> = StdResult<T, Error>;

pub fn authorize_role(actor: &Actor, min_required_role: Role) -> Result<()> {
    if actor.role < min_required_role {
        return Err(Error::UnauthorizedRole);
    }
    Ok(())
}

pub fn is_owner(actor: &Actor, comment: &Comment) -> bool {
    actor.id == comment.author.id
}

/// Only the author may change the content of a comment.
pub fn authorize_edit(actor: &Actor, comment: &Comment) -> Result<()> {
    authorize_role(actor, Role::Member)?;
    if !is_owner(actor, comment) {
        return Err(Error::NotOwner);
    }
    Ok(())
}

/// Authors may delete their own comments, moderators any comment.
pub fn authorize_delete(actor: &Actor, comment: &Comment) -> Result<()> {
    authorize_role(actor, Role::Member)?;
    if is_owner(actor, comment) || authorize_role(actor, Role::Moderator).is_ok() {
        return Ok(());
    }
    Err(Error::NotOwner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsync_entities::builders::*;

    #[test]
    fn only_owner_may_edit() {
        let comment = Comment::build().author("alice").finish();
        assert!(authorize_edit(&Actor::member("alice"), &comment).is_ok());
        assert!(authorize_edit(&Actor::member("bob"), &comment).is_err());
        assert!(authorize_edit(&Actor::moderator("mod"), &comment).is_err());
    }

    #[test]
    fn owner_and_moderator_may_delete() {
        let comment = Comment::build().author("alice").finish();
        assert!(authorize_delete(&Actor::member("alice"), &comment).is_ok());
        assert!(authorize_delete(&Actor::moderator("mod"), &comment).is_ok());
        assert!(authorize_delete(&Actor::member("bob"), &comment).is_err());
    }

    #[test]
    fn guests_may_do_nothing() {
        let comment = Comment::build().author("alice").finish();
        let guest = Actor {
            id: "alice".into(),
            role: Role::Guest,
        };
        assert!(authorize_edit(&guest, &comment).is_err());
        assert!(authorize_delete(&guest, &comment).is_err());
    }
}

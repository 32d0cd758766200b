//! User actions on a discussion.
//!
//! Every mutating action is applied to the [`OptimisticStore`] before the
//! remote call is issued and confirmed or rolled back once it resolves.
//!
//! [`OptimisticStore`]: crate::store::OptimisticStore

mod delete_comment;
mod discussion;
mod edit_comment;
mod error;
mod load_comments;
mod post_comment;
mod toggle_like;

#[cfg(test)]
pub mod tests;

pub use self::{
    delete_comment::*, discussion::*, edit_comment::*, error::Error, load_comments::*,
    post_comment::*, toggle_like::*,
};

mod prelude {
    pub use super::error::Error;
    pub type Result<T> = std::result::Result<T, Error>;
    pub use crate::{
        gateways::CommentGateway,
        repositories::CommentRepository,
        store::{Entry, Mutation, OptimisticStore},
        util::rate_limit::{Action, RateLimits},
    };
    pub use tsync_entities::{
        actor::*, comment::*, context::*, id::*, pagination::*, time::*,
    };
}

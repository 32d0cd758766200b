use std::time::Duration;

use crate::{authorization, repositories, util::validate::CommentInvalidation};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] CommentInvalidation),
    #[error("Too many requests, try again in {} s", reset_in.as_secs())]
    RateLimited { reset_in: Duration },
    #[error("Network failure: {0}")]
    Network(String),
    #[error("Remote service responded with {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("This is not allowed")]
    Forbidden,
    #[error("The comment does not exist")]
    NotFound,
}

impl From<repositories::Error> for Error {
    fn from(err: repositories::Error) -> Self {
        match err {
            repositories::Error::Invalid(err) => Self::Validation(err),
            repositories::Error::Network(msg) => Self::Network(msg),
            repositories::Error::Remote { status, message } => Self::Remote { status, message },
        }
    }
}

impl From<authorization::comment::Error> for Error {
    fn from(_: authorization::comment::Error) -> Self {
        Self::Forbidden
    }
}

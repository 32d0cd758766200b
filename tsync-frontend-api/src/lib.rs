//! HTTP client of the remote comment service.

use thiserror::Error;

mod comments;
mod util;

pub use self::{comments::*, util::*};

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Fetch(String),

    #[error("{status}: {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Conversion(#[from] tsync_boundary::ConversionError),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Fetch(format!("{err}"))
    }
}

impl From<Error> for tsync_core::gateways::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Fetch(msg) => Self::Network(msg),
            Error::Api { status, message } => Self::Remote { status, message },
            // An unusable payload is treated like a broken transport.
            Error::Conversion(err) => Self::Network(err.to_string()),
        }
    }
}

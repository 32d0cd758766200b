mod comments;

pub use self::comments::*;

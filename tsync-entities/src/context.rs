use strum::{Display, EnumString};

use crate::id::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ContextKind {
    Photo,
    Series,
}

/// The scope a comment belongs to.
///
/// A comment is attached to exactly one photo or exactly one series,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiscussionContext {
    Photo(Id),
    Series(Id),
}

impl DiscussionContext {
    pub fn new(kind: ContextKind, id: impl Into<Id>) -> Self {
        match kind {
            ContextKind::Photo => Self::Photo(id.into()),
            ContextKind::Series => Self::Series(id.into()),
        }
    }

    pub const fn kind(&self) -> ContextKind {
        match self {
            Self::Photo(_) => ContextKind::Photo,
            Self::Series(_) => ContextKind::Series,
        }
    }

    pub const fn id(&self) -> &Id {
        match self {
            Self::Photo(id) | Self::Series(id) => id,
        }
    }

    pub const fn photo_id(&self) -> Option<&Id> {
        match self {
            Self::Photo(id) => Some(id),
            Self::Series(_) => None,
        }
    }

    pub const fn series_id(&self) -> Option<&Id> {
        match self {
            Self::Series(id) => Some(id),
            Self::Photo(_) => None,
        }
    }
}

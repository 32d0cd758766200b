use crate::id::Id;

#[rustfmt::skip]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    #[default]
    Guest     = 0,
    Member    = 1,
    Moderator = 2,
}

/// The currently signed-in participant as reported by the auth collaborator.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id   : Id,
    pub role : Role,
}

impl Actor {
    pub fn member(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            role: Role::Member,
        }
    }

    pub fn moderator(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            role: Role::Moderator,
        }
    }
}

pub trait Builder {
    type Build;
    fn build() -> Self::Build;
}

pub use self::comment_builder::*;

pub mod comment_builder {

    use super::*;
    use crate::{comment::*, context::*, id::*, time::*};

    #[derive(Debug)]
    pub struct CommentBuild {
        comment: Comment,
    }

    impl CommentBuild {
        pub fn id(mut self, id: &str) -> Self {
            self.comment.id = id.into();
            self
        }
        pub fn author(mut self, id: &str) -> Self {
            self.comment.author = AuthorSummary {
                id: id.into(),
                display_name: format!("user {id}"),
            };
            self
        }
        pub fn content(mut self, content: &str) -> Self {
            self.comment.content = content.into();
            self
        }
        pub fn context(mut self, context: DiscussionContext) -> Self {
            self.comment.context = context;
            self
        }
        pub fn parent_id(mut self, parent_id: Option<&str>) -> Self {
            self.comment.parent_id = parent_id.map(Id::from);
            self
        }
        pub fn likes(mut self, likes_count: u32, liked_by_current_user: bool) -> Self {
            self.comment.likes_count = likes_count;
            self.comment.liked_by_current_user = liked_by_current_user;
            self
        }
        pub fn replies_count(mut self, replies_count: u32) -> Self {
            self.comment.replies_count = replies_count;
            self
        }
        pub fn created_at(mut self, created_at: Timestamp) -> Self {
            self.comment.created_at = created_at;
            self
        }
        pub fn finish(self) -> Comment {
            self.comment
        }
    }

    impl Builder for Comment {
        type Build = CommentBuild;
        fn build() -> Self::Build {
            Self::Build {
                comment: Comment {
                    id: Id::new_placeholder(),
                    author: AuthorSummary {
                        id: "author".into(),
                        display_name: "Author".into(),
                    },
                    content: "".into(),
                    context: DiscussionContext::Photo("1".into()),
                    parent_id: None,
                    likes_count: 0,
                    replies_count: 0,
                    liked_by_current_user: false,
                    created_at: Timestamp::now(),
                    deleted_at: None,
                    children: vec![],
                },
            }
        }
    }
}

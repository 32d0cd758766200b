use std::{sync::Arc, time::Duration};

use tsync_entities::{actor::Actor, builders::*, comment::Comment, context::DiscussionContext, id::Id};

use super::*;
use crate::{
    gateways,
    repositories::CommentRepository,
    store::SyncStatus,
    util::{rate_limit::RateLimits, validate::CommentInvalidation},
};


use self::mock::MockGateway;

type TestDiscussion = Discussion<Arc<MockGateway>>;

fn photo() -> DiscussionContext {
    DiscussionContext::Photo("42".into())
}

fn new_discussion(gw: &Arc<MockGateway>, actor: Actor) -> TestDiscussion {
    Discussion::new(
        CommentRepository::new(Arc::clone(gw)),
        Arc::new(RateLimits::default()),
        actor,
        photo(),
        DiscussionConfig::default(),
    )
}

fn remote_comment(id: &str, author: &str) -> Comment {
    Comment::build()
        .id(id)
        .author(author)
        .content(&format!("comment {id}"))
        .context(photo())
        .finish()
}

async fn called(gw: &MockGateway, call: &'static str) {
    while !gw.calls().contains(&call) {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn post_is_visible_before_it_is_confirmed() {
    let gw = Arc::new(MockGateway::new("alice"));
    gw.set_next_id(101);
    let gate = gw.hold();
    let discussion = Arc::new(new_discussion(&gw, Actor::member("alice")));

    let task = {
        let discussion = Arc::clone(&discussion);
        tokio::spawn(async move { discussion.post("Hello", None).await })
    };
    called(&gw, "create_comment").await;

    let entries = discussion.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].comment.content, "Hello");
    assert!(entries[0].comment.id.is_placeholder());
    assert!(entries[0].is_pending());

    gate.notify_one();
    let created = task.await.unwrap().unwrap();
    assert_eq!(created.id, Id::from("101"));

    let entries = discussion.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].comment.id, Id::from("101"));
    assert_eq!(entries[0].comment.content, "Hello");
    assert_eq!(entries[0].status, SyncStatus::Synced);
    assert!(discussion.store().pending_operations().is_empty());
}

#[tokio::test]
async fn eleventh_comment_within_a_minute_is_rate_limited() {
    let gw = Arc::new(MockGateway::new("alice"));
    let discussion = new_discussion(&gw, Actor::member("alice"));
    for i in 0..10 {
        discussion
            .post(&format!("comment number {i}"), None)
            .await
            .unwrap();
    }
    let before = discussion.entries();

    let err = discussion.post("one more", None).await.unwrap_err();
    match err {
        Error::RateLimited { reset_in } => assert!(reset_in > Duration::ZERO),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(discussion.entries(), before);
    assert_eq!(gw.calls().len(), 10);
}

#[tokio::test]
async fn replies_have_their_own_quota() {
    let gw = Arc::new(MockGateway::new("alice"));
    gw.insert(remote_comment("5", "bob"));
    let discussion = new_discussion(&gw, Actor::member("alice"));
    discussion.load_first_page().await.unwrap();
    for i in 0..10 {
        discussion.post(&format!("comment {i}"), None).await.unwrap();
    }
    let reply = discussion
        .post("a reply", Some("5".into()))
        .await
        .unwrap();
    assert_eq!(reply.parent_id, Some(Id::from("5")));
    let parent = discussion.store().get(&"5".into()).unwrap();
    assert_eq!(parent.comment.replies_count, 1);
}

#[tokio::test]
async fn invalid_content_is_rejected_without_mutation() {
    let gw = Arc::new(MockGateway::new("alice"));
    let discussion = new_discussion(&gw, Actor::member("alice"));
    let err = discussion.post("  <p></p> ", None).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(CommentInvalidation::Content(_))
    ));
    let err = discussion
        .post(&"x".repeat(501), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(discussion.entries().is_empty());
    assert!(gw.calls().is_empty());
}

#[tokio::test]
async fn failed_post_is_rolled_back() {
    let gw = Arc::new(MockGateway::new("alice"));
    gw.fail_with(gateways::Error::Remote {
        status: 500,
        message: "Internal error".into(),
    });
    let discussion = new_discussion(&gw, Actor::member("alice"));
    let err = discussion.post("Hello", None).await.unwrap_err();
    assert_eq!(
        err,
        Error::Remote {
            status: 500,
            message: "Internal error".into()
        }
    );
    assert!(discussion.entries().is_empty());
    assert!(discussion.store().pending_operations().is_empty());
}

#[tokio::test]
async fn failed_delete_restores_comment() {
    let gw = Arc::new(MockGateway::new("alice"));
    for id in ["4", "5", "6"] {
        gw.insert(remote_comment(id, "alice"));
    }
    let discussion = Arc::new(new_discussion(&gw, Actor::member("alice")));
    discussion.load_first_page().await.unwrap();
    let before = discussion.entries();

    let gate = gw.hold();
    let task = {
        let discussion = Arc::clone(&discussion);
        tokio::spawn(async move { discussion.delete(&"5".into()).await })
    };
    called(&gw, "delete_comment").await;
    assert!(discussion.store().get(&"5".into()).is_none());
    assert_eq!(discussion.entries().len(), 2);

    gw.fail_with(gateways::Error::Network("connection reset".into()));
    gate.notify_one();
    let err = task.await.unwrap().unwrap_err();
    assert_eq!(err, Error::Network("connection reset".into()));
    assert_eq!(discussion.entries(), before);
}

#[tokio::test]
async fn only_owner_may_edit() {
    let gw = Arc::new(MockGateway::new("alice"));
    gw.insert(remote_comment("1", "alice"));
    let bob = new_discussion(&gw, Actor::member("bob"));
    bob.load_first_page().await.unwrap();
    assert_eq!(
        bob.edit(&"1".into(), "changed").await.unwrap_err(),
        Error::Forbidden
    );
    assert_eq!(bob.comments()[0].content, "comment 1");

    let alice = new_discussion(&gw, Actor::member("alice"));
    alice.load_first_page().await.unwrap();
    let edited = alice.edit(&"1".into(), "<em>changed</em>").await.unwrap();
    assert_eq!(edited.content, "changed");
    assert_eq!(alice.comments()[0].content, "changed");
    assert!(!alice.entries()[0].is_pending());
}

#[tokio::test]
async fn moderators_may_delete_any_comment() {
    let gw = Arc::new(MockGateway::new("alice"));
    gw.insert(remote_comment("1", "alice"));
    gw.insert(remote_comment("2", "alice"));

    let bob = new_discussion(&gw, Actor::member("bob"));
    bob.load_first_page().await.unwrap();
    assert_eq!(bob.delete(&"1".into()).await.unwrap_err(), Error::Forbidden);

    let moderator = new_discussion(&gw, Actor::moderator("mod"));
    moderator.load_first_page().await.unwrap();
    moderator.delete(&"1".into()).await.unwrap();
    assert_eq!(moderator.comments().len(), 1);
    assert_eq!(gw.comments().len(), 1);
}

#[tokio::test]
async fn unknown_or_unsaved_comments_are_not_found() {
    let gw = Arc::new(MockGateway::new("alice"));
    let discussion = new_discussion(&gw, Actor::member("alice"));
    assert_eq!(
        discussion.delete(&"404".into()).await.unwrap_err(),
        Error::NotFound
    );
    assert_eq!(
        discussion
            .edit(&Id::new_placeholder(), "text")
            .await
            .unwrap_err(),
        Error::NotFound
    );
    assert!(gw.calls().is_empty());
}

#[tokio::test]
async fn toggle_like_twice() {
    let gw = Arc::new(MockGateway::new("alice"));
    gw.insert(remote_comment("1", "bob"));
    let discussion = new_discussion(&gw, Actor::member("alice"));
    discussion.load_first_page().await.unwrap();

    assert!(discussion.toggle_like(&"1".into()).await.unwrap());
    let comment = &discussion.comments()[0];
    assert!(comment.liked_by_current_user);
    assert_eq!(comment.likes_count, 1);

    assert!(!discussion.toggle_like(&"1".into()).await.unwrap());
    let comment = &discussion.comments()[0];
    assert!(!comment.liked_by_current_user);
    assert_eq!(comment.likes_count, 0);
}

#[tokio::test]
async fn load_pages_until_exhausted() {
    let gw = Arc::new(MockGateway::new("alice"));
    for i in 0..25 {
        gw.insert(remote_comment(&i.to_string(), "bob"));
    }
    let discussion = new_discussion(&gw, Actor::member("alice"));

    let meta = discussion.load_first_page().await.unwrap().unwrap();
    assert_eq!(meta.total, 25);
    assert!(meta.has_next);
    assert_eq!(discussion.comments().len(), 20);

    let meta = discussion.load_next_page().await.unwrap().unwrap();
    assert!(!meta.has_next);
    assert_eq!(discussion.comments().len(), 25);
    assert_eq!(discussion.pagination().page, 2);

    assert!(discussion.load_next_page().await.unwrap().is_none());
    assert_eq!(gw.calls().len(), 2);
}

#[tokio::test]
async fn concurrent_loads_are_skipped() {
    let gw = Arc::new(MockGateway::new("alice"));
    gw.insert(remote_comment("1", "bob"));
    let gate = gw.hold();
    let discussion = Arc::new(new_discussion(&gw, Actor::member("alice")));

    let task = {
        let discussion = Arc::clone(&discussion);
        tokio::spawn(async move { discussion.load_first_page().await })
    };
    called(&gw, "fetch_comments").await;
    assert!(discussion.is_loading());
    assert!(discussion.load_first_page().await.unwrap().is_none());
    assert!(discussion.load_next_page().await.unwrap().is_none());

    gate.notify_one();
    assert!(task.await.unwrap().unwrap().is_some());
    assert!(!discussion.is_loading());
    assert_eq!(gw.calls().len(), 1);
}

#[tokio::test]
async fn failed_load_resets_loading_flag() {
    let gw = Arc::new(MockGateway::new("alice"));
    gw.fail_with(gateways::Error::Network("offline".into()));
    let discussion = new_discussion(&gw, Actor::member("alice"));
    assert!(discussion.load_first_page().await.is_err());
    assert!(!discussion.is_loading());
    gw.succeed();
    assert!(discussion.load_first_page().await.unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn unanswered_post_is_rolled_back_after_timeout() {
    let gw = Arc::new(MockGateway::new("alice"));
    let gate = gw.hold();
    let discussion = Arc::new(new_discussion(&gw, Actor::member("alice")));
    let mut visible = discussion.subscribe();

    let task = {
        let discussion = Arc::clone(&discussion);
        tokio::spawn(async move { discussion.post("Hello", None).await })
    };
    called(&gw, "create_comment").await;
    assert_eq!(discussion.entries().len(), 1);
    assert_eq!(visible.borrow_and_update().len(), 1);

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert!(discussion.entries().is_empty());
    assert!(visible.has_changed().unwrap());
    assert!(visible.borrow_and_update().is_empty());

    // The late response does not resurrect the comment.
    gate.notify_one();
    assert!(task.await.unwrap().is_ok());
    assert!(discussion.entries().is_empty());
}

#[tokio::test]
async fn tree_nests_replies() {
    let gw = Arc::new(MockGateway::new("alice"));
    gw.insert(remote_comment("1", "bob"));
    let discussion = new_discussion(&gw, Actor::member("alice"));
    discussion.load_first_page().await.unwrap();
    discussion.post("first!", Some("1".into())).await.unwrap();

    let tree = discussion.tree();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].comment.comment.id, Id::from("1"));
    assert_eq!(tree[0].children.len(), 1);
    assert_eq!(tree[0].children[0].depth, 1);
}

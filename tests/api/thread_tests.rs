//! Thread loading tests

use pretty_assertions::assert_eq;

use forum_server::application::services::{PostError, PostService};

use crate::common::TestForum;

#[tokio::test]
async fn test_depth_three_tree() {
    let forum = TestForum::new();
    let alice = forum.register("alice").await;
    let bob = forum.register("bob").await;
    let carol = forum.register("carol").await;

    let root = forum.post(&alice, "Root", "root body").await;
    let a = forum.reply(&bob, root.post_id, "a").await;
    let b = forum.reply(&carol, root.post_id, "b").await;
    let a1 = forum.reply(&alice, a.post_id, "a1").await;
    let a1x = forum.reply(&bob, a1.post_id, "a1x").await;
    let a2 = forum.reply(&carol, a.post_id, "a2").await;

    let thread = forum.posts.get_all_comments(root.post_id).await.unwrap();

    let order: Vec<(i64, usize, String)> = thread
        .descendants()
        .iter()
        .map(|n| {
            (
                n.post.post_id,
                n.depth,
                n.post.creator.as_ref().map(|c| c.username().to_string()).unwrap_or_default(),
            )
        })
        .collect();

    assert_eq!(
        order,
        vec![
            (a.post_id, 1, "bob".to_string()),
            (a1.post_id, 2, "alice".to_string()),
            (a1x.post_id, 3, "bob".to_string()),
            (a2.post_id, 2, "carol".to_string()),
            (b.post_id, 1, "carol".to_string()),
        ]
    );
    assert_eq!(thread.descendant_count(), 5);
    assert_eq!(thread.depth, 0);
}

#[tokio::test]
async fn test_thread_of_comment_starts_at_that_comment() {
    let forum = TestForum::new();
    let alice = forum.register("alice").await;
    let root = forum.post(&alice, "Root", "root body").await;
    let a = forum.reply(&alice, root.post_id, "a").await;
    let a1 = forum.reply(&alice, a.post_id, "a1").await;

    let thread = forum.posts.get_all_comments(a.post_id).await.unwrap();

    assert_eq!(thread.post.post_id, a.post_id);
    assert_eq!(thread.children.len(), 1);
    assert_eq!(thread.children[0].post.post_id, a1.post_id);
}

#[tokio::test]
async fn test_thread_stops_at_max_depth() {
    let forum = TestForum::with_max_depth(2);
    let alice = forum.register("alice").await;

    let root = forum.post(&alice, "Root", "root body").await;
    let d1 = forum.reply(&alice, root.post_id, "d1").await;
    let d2 = forum.reply(&alice, d1.post_id, "d2").await;
    forum.reply(&alice, d2.post_id, "d3").await;

    let thread = forum.posts.get_all_comments(root.post_id).await.unwrap();

    assert_eq!(thread.descendant_count(), 2);
    let deepest = &thread.children[0].children[0];
    assert_eq!(deepest.post.post_id, d2.post_id);
    assert!(deepest.children.is_empty());
}

#[tokio::test]
async fn test_corrupt_parent_chain_terminates() {
    let forum = TestForum::new();
    let alice = forum.register("alice").await;

    let root = forum.post(&alice, "Root", "root body").await;
    let c1 = forum.reply(&alice, root.post_id, "c1").await;
    let c2 = forum.reply(&alice, c1.post_id, "c2").await;
    // root now claims c2 as its parent: root -> c1 -> c2 -> root
    forum.store.reparent(root.post_id, c2.post_id);

    let thread = forum.posts.get_all_comments(root.post_id).await.unwrap();

    let ids: Vec<i64> = thread.descendants().iter().map(|n| n.post.post_id).collect();
    assert_eq!(ids, vec![c1.post_id, c2.post_id]);
}

#[tokio::test]
async fn test_thread_of_missing_post() {
    let forum = TestForum::new();

    assert!(matches!(
        forum.posts.get_all_comments(12).await,
        Err(PostError::NotFound)
    ));
}

#[tokio::test]
async fn test_thread_without_replies() {
    let forum = TestForum::new();
    let alice = forum.register("alice").await;
    let root = forum.post(&alice, "Lonely", "no replies").await;

    let thread = forum.posts.get_all_comments(root.post_id).await.unwrap();

    assert!(thread.children.is_empty());
    assert_eq!(thread.post.creator.as_ref().map(|c| c.id()), Some(alice.id));
}

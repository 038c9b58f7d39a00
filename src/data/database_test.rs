//! Database tests

use super::*;
use chrono::{Duration, Utc};
use tempfile::TempDir;

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

fn test_user(username: &str) -> User {
    let now = Utc::now();
    User {
        id: EntityId::new().0,
        username: username.to_string(),
        email: format!("{}@example.com", username),
        full_name: format!("{} Fullname", username),
        avatar_url: format!("https://media.example.com/avatars/{}.webp", username),
        cover_url: None,
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$hashhashhash".to_string(),
        refresh_token: None,
        created_at: now,
        updated_at: now,
    }
}

fn test_video(owner_id: &str, title: &str) -> Video {
    let now = Utc::now();
    Video {
        id: EntityId::new().0,
        owner_id: owner_id.to_string(),
        video_url: "https://media.example.com/videos/v.mp4".to_string(),
        thumbnail_url: "https://media.example.com/thumbnails/t.webp".to_string(),
        title: title.to_string(),
        description: format!("{} description", title),
        duration: 42.5,
        views: 0,
        is_published: true,
        tags: "[]".to_string(),
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_database_connection() {
    let (_db, _temp_dir) = create_test_db().await;
    // Connection successful if we get here without panicking
}

#[tokio::test]
async fn test_user_insert_and_get() {
    let (db, _temp_dir) = create_test_db().await;

    let user = test_user("alice");
    db.insert_user(&user).await.unwrap();

    let retrieved = db.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(retrieved.username, "alice");
    assert_eq!(retrieved.email, "alice@example.com");

    // Username lookup is case-insensitive
    let by_name = db.get_user_by_username("ALICE").await.unwrap();
    assert!(by_name.is_some());

    let by_identifier = db
        .get_user_by_username_or_email("alice@example.com")
        .await
        .unwrap();
    assert!(by_identifier.is_some());
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let (db, _temp_dir) = create_test_db().await;

    db.insert_user(&test_user("alice")).await.unwrap();

    let mut duplicate = test_user("alice");
    duplicate.email = "other@example.com".to_string();
    let error = db.insert_user(&duplicate).await.unwrap_err();
    assert!(matches!(error, crate::error::AppError::Conflict(_)));

    assert!(db
        .username_or_email_exists("alice", "nobody@example.com")
        .await
        .unwrap());
    assert!(!db
        .username_or_email_exists("bob", "bob@example.com")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_video_crud_and_tag_round_trip() {
    let (db, _temp_dir) = create_test_db().await;

    let owner = test_user("creator");
    db.insert_user(&owner).await.unwrap();

    let mut video = test_video(&owner.id, "My tagged video");
    video.tags = serde_json::to_string(&["Music", "Gaming"]).unwrap();
    db.insert_video(&video).await.unwrap();

    let retrieved = db.get_video(&video.id).await.unwrap().unwrap();
    assert_eq!(retrieved.tag_list(), vec!["Music", "Gaming"]);

    assert!(db
        .update_video_details(&video.id, Some("New title"), None, None)
        .await
        .unwrap());
    let updated = db.get_video(&video.id).await.unwrap().unwrap();
    assert_eq!(updated.title, "New title");
    // Untouched fields survive a partial update
    assert_eq!(updated.description, "My tagged video description");

    assert!(db.delete_video(&video.id).await.unwrap());
    assert!(db.get_video(&video.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_toggle_publish_and_views() {
    let (db, _temp_dir) = create_test_db().await;

    let owner = test_user("creator");
    db.insert_user(&owner).await.unwrap();
    let video = test_video(&owner.id, "Flip me");
    db.insert_video(&video).await.unwrap();

    assert_eq!(db.toggle_publish(&video.id).await.unwrap(), Some(false));
    assert_eq!(db.toggle_publish(&video.id).await.unwrap(), Some(true));
    assert_eq!(db.toggle_publish("missing").await.unwrap(), None);

    assert_eq!(db.increment_views(&video.id).await.unwrap(), Some(1));
    assert_eq!(db.increment_views(&video.id).await.unwrap(), Some(2));
    assert_eq!(db.increment_views("missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_like_toggle_round_trip() {
    let (db, _temp_dir) = create_test_db().await;

    let user = test_user("liker");
    db.insert_user(&user).await.unwrap();
    let video = test_video(&user.id, "Likeable");
    db.insert_video(&video).await.unwrap();

    let target = LikeTarget::Video(&video.id);

    assert!(db.toggle_like(&user.id, target).await.unwrap());
    assert!(db.like_exists(&user.id, target).await.unwrap());
    assert_eq!(db.like_count_for_pair(&user.id, target).await.unwrap(), 1);

    // Second toggle returns to the original state
    assert!(!db.toggle_like(&user.id, target).await.unwrap());
    assert!(!db.like_exists(&user.id, target).await.unwrap());
    assert_eq!(db.like_count_for_pair(&user.id, target).await.unwrap(), 0);
}

#[tokio::test]
async fn test_like_targets_are_independent() {
    let (db, _temp_dir) = create_test_db().await;

    let user = test_user("liker");
    db.insert_user(&user).await.unwrap();

    let tweet = Tweet {
        id: EntityId::new().0,
        owner_id: user.id.clone(),
        content: "hello".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    db.insert_tweet(&tweet).await.unwrap();

    assert!(db
        .toggle_like(&user.id, LikeTarget::Tweet(&tweet.id))
        .await
        .unwrap());
    // Liking a tweet does not affect video-like state for the same id
    assert!(!db
        .like_exists(&user.id, LikeTarget::Video(&tweet.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_subscription_toggle() {
    let (db, _temp_dir) = create_test_db().await;

    let subscriber = test_user("fan");
    let channel = test_user("channel");
    db.insert_user(&subscriber).await.unwrap();
    db.insert_user(&channel).await.unwrap();

    assert!(db
        .toggle_subscription(&subscriber.id, &channel.id)
        .await
        .unwrap());
    assert!(db
        .subscription_exists(&subscriber.id, &channel.id)
        .await
        .unwrap());

    let subscribers = db.channel_subscribers(&channel.id).await.unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].username, "fan");

    let channels = db.subscribed_channels(&subscriber.id).await.unwrap();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].username, "channel");

    assert!(!db
        .toggle_subscription(&subscriber.id, &channel.id)
        .await
        .unwrap());
    assert!(!db
        .subscription_exists(&subscriber.id, &channel.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_playlist_membership_is_unique_and_ordered() {
    let (db, _temp_dir) = create_test_db().await;

    let owner = test_user("curator");
    db.insert_user(&owner).await.unwrap();

    let playlist = Playlist {
        id: EntityId::new().0,
        owner_id: owner.id.clone(),
        name: "Favourites".to_string(),
        description: "Best of".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    db.insert_playlist(&playlist).await.unwrap();

    let first = test_video(&owner.id, "First");
    let second = test_video(&owner.id, "Second");
    db.insert_video(&first).await.unwrap();
    db.insert_video(&second).await.unwrap();

    assert!(db.add_video_to_playlist(&playlist.id, &first.id).await.unwrap());
    assert!(db.add_video_to_playlist(&playlist.id, &second.id).await.unwrap());
    // Duplicate insert is refused by the pair constraint
    assert!(!db.add_video_to_playlist(&playlist.id, &first.id).await.unwrap());

    let videos = db.get_playlist_videos(&playlist.id).await.unwrap();
    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0].title, "First");
    assert_eq!(videos[1].title, "Second");

    assert!(db
        .remove_video_from_playlist(&playlist.id, &first.id)
        .await
        .unwrap());
    let videos = db.get_playlist_videos(&playlist.id).await.unwrap();
    assert_eq!(videos.len(), 1);

    assert!(db.delete_playlist(&playlist.id).await.unwrap());
    assert!(db.get_playlist(&playlist.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_watch_history_rewatching_moves_entry_to_front() {
    let (db, _temp_dir) = create_test_db().await;

    let user = test_user("watcher");
    db.insert_user(&user).await.unwrap();
    let first = test_video(&user.id, "First watched");
    let second = test_video(&user.id, "Second watched");
    db.insert_video(&first).await.unwrap();
    db.insert_video(&second).await.unwrap();

    let t0 = Utc::now();
    db.record_watch(&user.id, &first.id, t0).await.unwrap();
    db.record_watch(&user.id, &second.id, t0 + Duration::seconds(1))
        .await
        .unwrap();
    // Re-watch the first video later
    let rewatch_at = t0 + Duration::seconds(2);
    db.record_watch(&user.id, &first.id, rewatch_at).await.unwrap();

    let entry = db.get_watch_entry(&user.id, &first.id).await.unwrap().unwrap();
    assert_eq!(entry.watched_at, rewatch_at);

    let page = db
        .history_feed(
            &user.id,
            None,
            None,
            HistorySortKey::WatchedAt,
            SortDirection::Desc,
            PageRequest::new(None, None),
        )
        .await
        .unwrap();

    // Exactly one entry per video, re-watched one first
    assert_eq!(page.total_results, 2);
    let titles: Vec<_> = page
        .items
        .iter()
        .map(|item| item.video.as_ref().unwrap().title.clone())
        .collect();
    assert_eq!(titles, vec!["First watched", "Second watched"]);
}

#[tokio::test]
async fn test_video_feed_search_and_pagination() {
    let (db, _temp_dir) = create_test_db().await;

    let owner = test_user("creator");
    db.insert_user(&owner).await.unwrap();

    for index in 0..25 {
        let mut video = test_video(&owner.id, &format!("Rust lesson {:02}", index));
        video.created_at = Utc::now() + Duration::seconds(index);
        video.updated_at = video.created_at;
        db.insert_video(&video).await.unwrap();
    }
    db.insert_video(&test_video(&owner.id, "Cooking show"))
        .await
        .unwrap();

    let filter = VideoFeedFilter {
        search: Some("rust".to_string()),
        ..Default::default()
    };

    // Walk every page; row counts must add up to the total
    let mut seen = 0;
    let mut page_number = 1;
    loop {
        let page = db
            .video_feed(
                &filter,
                VideoSortKey::CreatedAt,
                SortDirection::Desc,
                PageRequest::new(Some(page_number), Some(10)),
                None,
            )
            .await
            .unwrap();

        assert_eq!(page.total_results, 25);
        assert_eq!(page.paging_counter, (page_number as i64 - 1) * 10 + 1);
        seen += page.items.len() as i64;

        if !page.has_next_page {
            break;
        }
        page_number += 1;
    }
    assert_eq!(seen, 25);
    assert_eq!(page_number, 3);
}

#[tokio::test]
async fn test_video_feed_like_state_and_owner_join() {
    let (db, _temp_dir) = create_test_db().await;

    let owner = test_user("creator");
    let viewer = test_user("viewer");
    db.insert_user(&owner).await.unwrap();
    db.insert_user(&viewer).await.unwrap();

    let liked = test_video(&owner.id, "Liked one");
    let other = test_video(&owner.id, "Other one");
    db.insert_video(&liked).await.unwrap();
    db.insert_video(&other).await.unwrap();
    db.toggle_like(&viewer.id, LikeTarget::Video(&liked.id))
        .await
        .unwrap();

    // Dangling owner: the row survives with a null owner sub-object
    let orphan = test_video("01GONEGONEGONEGONEGONEGONE", "Orphaned");
    db.insert_video(&orphan).await.unwrap();

    let page = db
        .video_feed(
            &VideoFeedFilter::default(),
            VideoSortKey::Title,
            SortDirection::Asc,
            PageRequest::new(None, None),
            Some(&viewer.id),
        )
        .await
        .unwrap();

    assert_eq!(page.total_results, 3);
    let by_title = |title: &str| {
        page.items
            .iter()
            .find(|item| item.title == title)
            .unwrap()
            .clone()
    };

    assert!(by_title("Liked one").is_liked_by_viewer);
    assert!(!by_title("Other one").is_liked_by_viewer);
    assert_eq!(
        by_title("Liked one").owner.as_ref().unwrap().username,
        "creator"
    );
    assert!(by_title("Orphaned").owner.is_none());

    // Unauthenticated viewers read everything as not liked
    let anonymous = db
        .video_feed(
            &VideoFeedFilter::default(),
            VideoSortKey::Title,
            SortDirection::Asc,
            PageRequest::new(None, None),
            None,
        )
        .await
        .unwrap();
    assert!(anonymous.items.iter().all(|item| !item.is_liked_by_viewer));
}

#[tokio::test]
async fn test_video_feed_tag_filter() {
    let (db, _temp_dir) = create_test_db().await;

    let owner = test_user("creator");
    db.insert_user(&owner).await.unwrap();

    let mut tagged = test_video(&owner.id, "Tagged");
    tagged.tags = serde_json::to_string(&["Gaming", "Live"]).unwrap();
    db.insert_video(&tagged).await.unwrap();
    db.insert_video(&test_video(&owner.id, "Untagged"))
        .await
        .unwrap();

    let filter = VideoFeedFilter {
        tag: Some("Gaming".to_string()),
        ..Default::default()
    };
    let page = db
        .video_feed(
            &filter,
            VideoSortKey::CreatedAt,
            SortDirection::Desc,
            PageRequest::new(None, None),
            None,
        )
        .await
        .unwrap();

    assert_eq!(page.total_results, 1);
    assert_eq!(page.items[0].title, "Tagged");
}

#[tokio::test]
async fn test_video_feed_uploader_filter() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = test_user("alice");
    let bob = test_user("bob");
    db.insert_user(&alice).await.unwrap();
    db.insert_user(&bob).await.unwrap();
    db.insert_video(&test_video(&alice.id, "Alice video")).await.unwrap();
    db.insert_video(&test_video(&bob.id, "Bob video")).await.unwrap();

    let ids = db
        .find_user_ids_matching(Some("ali"), None)
        .await
        .unwrap();
    assert_eq!(ids, vec![alice.id.clone()]);

    let filter = VideoFeedFilter {
        owner_ids: Some(ids),
        ..Default::default()
    };
    let page = db
        .video_feed(
            &filter,
            VideoSortKey::CreatedAt,
            SortDirection::Desc,
            PageRequest::new(None, None),
            None,
        )
        .await
        .unwrap();
    assert_eq!(page.total_results, 1);
    assert_eq!(page.items[0].title, "Alice video");

    // A filter that resolves to no users matches nothing
    let filter = VideoFeedFilter {
        owner_ids: Some(vec![]),
        ..Default::default()
    };
    let page = db
        .video_feed(
            &filter,
            VideoSortKey::CreatedAt,
            SortDirection::Desc,
            PageRequest::new(None, None),
            None,
        )
        .await
        .unwrap();
    assert_eq!(page.total_results, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_comment_feed_pagination_and_owner() {
    let (db, _temp_dir) = create_test_db().await;

    let owner = test_user("creator");
    let commenter = test_user("commenter");
    db.insert_user(&owner).await.unwrap();
    db.insert_user(&commenter).await.unwrap();
    let video = test_video(&owner.id, "Commented");
    db.insert_video(&video).await.unwrap();

    let base = Utc::now();
    for index in 0..12 {
        let comment = Comment {
            id: EntityId::new().0,
            video_id: video.id.clone(),
            owner_id: commenter.id.clone(),
            content: format!("comment {}", index),
            created_at: base + Duration::seconds(index),
            updated_at: base + Duration::seconds(index),
        };
        db.insert_comment(&comment).await.unwrap();
    }

    let page = db
        .comment_feed(&video.id, PageRequest::new(Some(1), Some(10)))
        .await
        .unwrap();
    assert_eq!(page.total_results, 12);
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total_pages, 2);
    // Newest first
    assert_eq!(page.items[0].content, "comment 11");
    assert_eq!(page.items[0].owner.as_ref().unwrap().username, "commenter");

    let page_two = db
        .comment_feed(&video.id, PageRequest::new(Some(2), Some(10)))
        .await
        .unwrap();
    assert_eq!(page_two.items.len(), 2);
    assert_eq!(page_two.paging_counter, 11);
}

#[tokio::test]
async fn test_liked_videos_listing() {
    let (db, _temp_dir) = create_test_db().await;

    let owner = test_user("creator");
    let viewer = test_user("viewer");
    db.insert_user(&owner).await.unwrap();
    db.insert_user(&viewer).await.unwrap();

    let video = test_video(&owner.id, "Liked");
    db.insert_video(&video).await.unwrap();
    db.toggle_like(&viewer.id, LikeTarget::Video(&video.id))
        .await
        .unwrap();

    let liked = db.liked_videos(&viewer.id).await.unwrap();
    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0].title, "Liked");
    assert!(liked[0].is_liked_by_viewer);
    assert_eq!(liked[0].owner.as_ref().unwrap().username, "creator");

    // No liked videos is an empty list, not an error
    assert!(db.liked_videos(&owner.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_channel_stats() {
    let (db, _temp_dir) = create_test_db().await;

    let channel = test_user("channel");
    let fan = test_user("fan");
    db.insert_user(&channel).await.unwrap();
    db.insert_user(&fan).await.unwrap();

    let video = test_video(&channel.id, "Popular");
    db.insert_video(&video).await.unwrap();
    db.insert_video(&test_video(&channel.id, "Quiet")).await.unwrap();

    db.increment_views(&video.id).await.unwrap();
    db.increment_views(&video.id).await.unwrap();
    db.toggle_like(&fan.id, LikeTarget::Video(&video.id))
        .await
        .unwrap();
    db.toggle_subscription(&fan.id, &channel.id).await.unwrap();

    let stats = db.get_channel_stats(&channel.id).await.unwrap();
    assert_eq!(stats.total_videos, 2);
    assert_eq!(stats.total_subscribers, 1);
    assert_eq!(stats.total_likes, 1);
    assert_eq!(stats.total_views, 2);

    let (subscribers, subscribed_to) = db.get_channel_counts(&channel.id).await.unwrap();
    assert_eq!(subscribers, 1);
    assert_eq!(subscribed_to, 0);
}

//! E2E tests for comments, likes, subscriptions, tweets, and playlists

mod common;

use common::TestServer;

async fn publish_one(server: &TestServer, token: &str) -> String {
    let body = server.publish_video(token, "Shared video", "").await;
    body["data"]["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Comments
// =============================================================================

#[tokio::test]
async fn test_comment_lifecycle() {
    let server = TestServer::new().await;
    let creator = server.register_and_login("creator").await;
    let commenter = server.register_and_login("commenter").await;
    let video_id = publish_one(&server, &creator).await;

    // Blank content rejected
    let (status, _) = server
        .post_json(
            &format!("/api/v1/videos/{}/comments", video_id),
            Some(&commenter),
            serde_json::json!({ "content": "   " }),
        )
        .await;
    assert_eq!(status, 400);

    // Comment on a missing video
    let (status, _) = server
        .post_json(
            "/api/v1/videos/missing/comments",
            Some(&commenter),
            serde_json::json!({ "content": "hello" }),
        )
        .await;
    assert_eq!(status, 404);

    let (status, body) = server
        .post_json(
            &format!("/api/v1/videos/{}/comments", video_id),
            Some(&commenter),
            serde_json::json!({ "content": "first!" }),
        )
        .await;
    assert_eq!(status, 201);
    let comment_id = body["data"]["id"].as_str().unwrap().to_string();

    // Listing joins the author's public fields
    let (status, body) = server
        .get_json(&format!("/api/v1/videos/{}/comments", video_id), None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["totalResults"], 1);
    assert_eq!(body["data"]["items"][0]["content"], "first!");
    assert_eq!(body["data"]["items"][0]["owner"]["username"], "commenter");

    // Only the author can edit
    let response = server
        .client
        .patch(server.url(&format!("/api/v1/comments/{}", comment_id)))
        .bearer_auth(&creator)
        .json(&serde_json::json!({ "content": "hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = server
        .client
        .patch(server.url(&format!("/api/v1/comments/{}", comment_id)))
        .bearer_auth(&commenter)
        .json(&serde_json::json!({ "content": "edited" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Only the author can delete
    let response = server
        .client
        .delete(server.url(&format!("/api/v1/comments/{}", comment_id)))
        .bearer_auth(&creator)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = server
        .client
        .delete(server.url(&format!("/api/v1/comments/{}", comment_id)))
        .bearer_auth(&commenter)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let (_, body) = server
        .get_json(&format!("/api/v1/videos/{}/comments", video_id), None)
        .await;
    assert_eq!(body["data"]["totalResults"], 0);
}

#[tokio::test]
async fn test_comment_pagination() {
    let server = TestServer::new().await;
    let creator = server.register_and_login("creator").await;
    let video_id = publish_one(&server, &creator).await;

    for index in 0..15 {
        let (status, _) = server
            .post_json(
                &format!("/api/v1/videos/{}/comments", video_id),
                Some(&creator),
                serde_json::json!({ "content": format!("comment {}", index) }),
            )
            .await;
        assert_eq!(status, 201);
    }

    let (_, body) = server
        .get_json(
            &format!("/api/v1/videos/{}/comments?page=2&limit=10", video_id),
            None,
        )
        .await;
    assert_eq!(body["data"]["totalResults"], 15);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 5);
    assert_eq!(body["data"]["pagingCounter"], 11);
}

// =============================================================================
// Likes
// =============================================================================

#[tokio::test]
async fn test_like_toggle_returns_to_original_state() {
    let server = TestServer::new().await;
    let creator = server.register_and_login("creator").await;
    let liker = server.register_and_login("liker").await;
    let video_id = publish_one(&server, &creator).await;
    let path = format!("/api/v1/likes/video/{}", video_id);

    let (status, body) = server.post_json(&path, Some(&liker), serde_json::json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["liked"], true);

    let (_, body) = server.post_json(&path, Some(&liker), serde_json::json!({})).await;
    assert_eq!(body["data"]["liked"], false);

    // Liking a missing target is a 404
    let (status, _) = server
        .post_json("/api/v1/likes/video/missing", Some(&liker), serde_json::json!({}))
        .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_comment_and_tweet_likes() {
    let server = TestServer::new().await;
    let creator = server.register_and_login("creator").await;
    let video_id = publish_one(&server, &creator).await;

    let (_, comment) = server
        .post_json(
            &format!("/api/v1/videos/{}/comments", video_id),
            Some(&creator),
            serde_json::json!({ "content": "like me" }),
        )
        .await;
    let comment_id = comment["data"]["id"].as_str().unwrap();

    let (status, body) = server
        .post_json(
            &format!("/api/v1/likes/comment/{}", comment_id),
            Some(&creator),
            serde_json::json!({}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["liked"], true);

    let (_, tweet) = server
        .post_json(
            "/api/v1/tweets",
            Some(&creator),
            serde_json::json!({ "content": "tweet tweet" }),
        )
        .await;
    let tweet_id = tweet["data"]["id"].as_str().unwrap();

    let (status, body) = server
        .post_json(
            &format!("/api/v1/likes/tweet/{}", tweet_id),
            Some(&creator),
            serde_json::json!({}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["liked"], true);
}

#[tokio::test]
async fn test_liked_videos_listing() {
    let server = TestServer::new().await;
    let creator = server.register_and_login("creator").await;
    let liker = server.register_and_login("liker").await;
    let video_id = publish_one(&server, &creator).await;

    // Empty before any like
    let (status, body) = server.get_json("/api/v1/likes/videos", Some(&liker)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"], serde_json::json!([]));

    server
        .post_json(
            &format!("/api/v1/likes/video/{}", video_id),
            Some(&liker),
            serde_json::json!({}),
        )
        .await;

    let (_, body) = server.get_json("/api/v1/likes/videos", Some(&liker)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Shared video");
    assert_eq!(body["data"][0]["owner"]["username"], "creator");
}

// =============================================================================
// Subscriptions
// =============================================================================

#[tokio::test]
async fn test_subscription_toggle_and_rosters() {
    let server = TestServer::new().await;
    let _channel = server.register_and_login("channel").await;
    let fan = server.register_and_login("fan").await;

    let channel = server
        .state
        .db
        .get_user_by_username("channel")
        .await
        .unwrap()
        .unwrap();
    let fan_user = server
        .state
        .db
        .get_user_by_username("fan")
        .await
        .unwrap()
        .unwrap();
    let path = format!("/api/v1/subscriptions/channel/{}", channel.id);

    let (status, body) = server.post_json(&path, Some(&fan), serde_json::json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["subscribed"], true);

    let (_, body) = server
        .get_json(
            &format!("/api/v1/subscriptions/channel/{}/subscribers", channel.id),
            None,
        )
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["username"], "fan");

    let (_, body) = server
        .get_json(
            &format!("/api/v1/subscriptions/user/{}/channels", fan_user.id),
            None,
        )
        .await;
    assert_eq!(body["data"][0]["username"], "channel");

    // Toggle back; rosters empty but still 200
    let (_, body) = server.post_json(&path, Some(&fan), serde_json::json!({})).await;
    assert_eq!(body["data"]["subscribed"], false);

    let (status, body) = server
        .get_json(
            &format!("/api/v1/subscriptions/channel/{}/subscribers", channel.id),
            None,
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"], serde_json::json!([]));

    // Unknown channel
    let (status, _) = server
        .post_json(
            "/api/v1/subscriptions/channel/missing",
            Some(&fan),
            serde_json::json!({}),
        )
        .await;
    assert_eq!(status, 404);
}

// =============================================================================
// Tweets
// =============================================================================

#[tokio::test]
async fn test_tweet_lifecycle() {
    let server = TestServer::new().await;
    let author = server.register_and_login("author").await;
    let other = server.register_and_login("other").await;

    let (status, _) = server
        .post_json(
            "/api/v1/tweets",
            Some(&author),
            serde_json::json!({ "content": "  " }),
        )
        .await;
    assert_eq!(status, 400);

    let (status, body) = server
        .post_json(
            "/api/v1/tweets",
            Some(&author),
            serde_json::json!({ "content": "hello world" }),
        )
        .await;
    assert_eq!(status, 201);
    let tweet_id = body["data"]["id"].as_str().unwrap().to_string();

    let author_user = server
        .state
        .db
        .get_user_by_username("author")
        .await
        .unwrap()
        .unwrap();
    let (_, body) = server
        .get_json(&format!("/api/v1/tweets/user/{}", author_user.id), None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Owner-gated mutation
    let response = server
        .client
        .patch(server.url(&format!("/api/v1/tweets/{}", tweet_id)))
        .bearer_auth(&other)
        .json(&serde_json::json!({ "content": "hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = server
        .client
        .patch(server.url(&format!("/api/v1/tweets/{}", tweet_id)))
        .bearer_auth(&author)
        .json(&serde_json::json!({ "content": "edited" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = server
        .client
        .delete(server.url(&format!("/api/v1/tweets/{}", tweet_id)))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = server
        .client
        .delete(server.url(&format!("/api/v1/tweets/{}", tweet_id)))
        .bearer_auth(&author)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

// =============================================================================
// Playlists
// =============================================================================

#[tokio::test]
async fn test_playlist_lifecycle() {
    let server = TestServer::new().await;
    let owner = server.register_and_login("owner").await;
    let other = server.register_and_login("other").await;
    let video_id = publish_one(&server, &owner).await;

    // Missing fields
    let (status, _) = server
        .post_json(
            "/api/v1/playlists",
            Some(&owner),
            serde_json::json!({ "name": "Mix", "description": " " }),
        )
        .await;
    assert_eq!(status, 400);

    let (status, body) = server
        .post_json(
            "/api/v1/playlists",
            Some(&owner),
            serde_json::json!({ "name": "Mix", "description": "My mix" }),
        )
        .await;
    assert_eq!(status, 201);
    let playlist_id = body["data"]["id"].as_str().unwrap().to_string();

    // Add a video; duplicate add conflicts
    let add_path = format!("/api/v1/playlists/{}/videos/{}", playlist_id, video_id);
    let (status, _) = server.post_json(&add_path, Some(&owner), serde_json::json!({})).await;
    assert_eq!(status, 200);
    let (status, _) = server.post_json(&add_path, Some(&owner), serde_json::json!({})).await;
    assert_eq!(status, 409);

    // Non-owner cannot add
    let (status, _) = server.post_json(&add_path, Some(&other), serde_json::json!({})).await;
    assert_eq!(status, 403);

    // Detail includes the videos in insertion order
    let (status, body) = server
        .get_json(&format!("/api/v1/playlists/{}", playlist_id), None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["name"], "Mix");
    assert_eq!(body["data"]["videos"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["videos"][0]["title"], "Shared video");

    // Owner listing
    let owner_user = server
        .state
        .db
        .get_user_by_username("owner")
        .await
        .unwrap()
        .unwrap();
    let (_, body) = server
        .get_json(&format!("/api/v1/playlists/user/{}", owner_user.id), None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Update is owner-gated
    let response = server
        .client
        .patch(server.url(&format!("/api/v1/playlists/{}", playlist_id)))
        .bearer_auth(&other)
        .json(&serde_json::json!({ "name": "Stolen", "description": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = server
        .client
        .patch(server.url(&format!("/api/v1/playlists/{}", playlist_id)))
        .bearer_auth(&owner)
        .json(&serde_json::json!({ "name": "Renamed", "description": "still mine" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Remove the video, then delete the playlist
    let response = server
        .client
        .delete(server.url(&add_path))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Removing it again is a 404
    let response = server
        .client
        .delete(server.url(&add_path))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = server
        .client
        .delete(server.url(&format!("/api/v1/playlists/{}", playlist_id)))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let (status, _) = server
        .get_json(&format!("/api/v1/playlists/{}", playlist_id), None)
        .await;
    assert_eq!(status, 404);
}

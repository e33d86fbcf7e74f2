//! Like & Comment Tests
//!
//! Covers like/unlike symmetry between post.likers and user.likes, and the
//! comment lifecycle (append, positional edit, delete).

mod common;

use axum::http::StatusCode;
use common::app;
use serde_json::json;
use uuid::Uuid;

// ===========================================================================
// Likes
// ===========================================================================

#[tokio::test]
async fn like_mirrors_post_and_user() {
    let app = app().await;
    let owner = app.create_user("like_owner").await;
    let liker = app.create_user("like_liker").await;
    let post_id = app.create_post_for_user(owner.id).await;

    let resp = app
        .patch_json(
            &format!("/post/like/{}", post_id),
            json!({"idWhoLike": liker.id.to_string()}),
            Some(&liker.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let liker_body = resp.json();
    assert_eq!(
        liker_body["likes"].as_array().unwrap(),
        &vec![json!(post_id.to_string())]
    );

    let resp = app.get(&format!("/post/{}", post_id), None).await;
    assert_eq!(
        resp.json()["post"]["likers"].as_array().unwrap(),
        &vec![json!(liker.id.to_string())]
    );
}

#[tokio::test]
async fn like_is_idempotent() {
    let app = app().await;
    let owner = app.create_user("like_dup_owner").await;
    let liker = app.create_user("like_dup_liker").await;
    let post_id = app.create_post_for_user(owner.id).await;

    for _ in 0..2 {
        let resp = app
            .patch_json(
                &format!("/post/like/{}", post_id),
                json!({"idWhoLike": liker.id.to_string()}),
                Some(&liker.token),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
    }

    let resp = app.get(&format!("/post/{}", post_id), None).await;
    assert_eq!(resp.json()["post"]["likers"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unlike_removes_both_sides() {
    let app = app().await;
    let owner = app.create_user("unlike_owner").await;
    let liker = app.create_user("unlike_liker").await;
    let post_id = app.create_post_for_user(owner.id).await;

    app.patch_json(
        &format!("/post/like/{}", post_id),
        json!({"idWhoLike": liker.id.to_string()}),
        Some(&liker.token),
    )
    .await;

    let resp = app
        .patch_json(
            &format!("/post/unlike/{}", post_id),
            json!({"idWhoUnlike": liker.id.to_string()}),
            Some(&liker.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    assert!(resp.json()["likes"].as_array().unwrap().is_empty());

    let resp = app.get(&format!("/post/{}", post_id), None).await;
    assert!(resp.json()["post"]["likers"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unlike_without_like_is_a_noop() {
    let app = app().await;
    let owner = app.create_user("unlike_none_owner").await;
    let liker = app.create_user("unlike_none_liker").await;
    let post_id = app.create_post_for_user(owner.id).await;

    let resp = app
        .patch_json(
            &format!("/post/unlike/{}", post_id),
            json!({"idWhoUnlike": liker.id.to_string()}),
            Some(&liker.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    assert!(resp.json()["likes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn like_unknown_post_reports_in_band() {
    let app = app().await;
    let liker = app.create_user("like_ghost_post").await;

    let resp = app
        .patch_json(
            &format!("/post/like/{}", Uuid::new_v4()),
            json!({"idWhoLike": liker.id.to_string()}),
            Some(&liker.token),
        )
        .await;

    // Unknown ids answer 200 with a message, distinct from a missing
    // parameter which is a 400.
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.message(), "ID unknown");
}

#[tokio::test]
async fn like_missing_parameter() {
    let app = app().await;
    let owner = app.create_user("like_noparam_owner").await;
    let post_id = app.create_post_for_user(owner.id).await;

    let resp = app
        .patch_json(
            &format!("/post/like/{}", post_id),
            json!({}),
            Some(&owner.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "missing parameter");
}

#[tokio::test]
async fn like_on_behalf_of_another_user_is_forbidden() {
    let app = app().await;
    let owner = app.create_user("like_imp_owner").await;
    let liker = app.create_user("like_imp_liker").await;
    let post_id = app.create_post_for_user(owner.id).await;

    let resp = app
        .patch_json(
            &format!("/post/like/{}", post_id),
            json!({"idWhoLike": liker.id.to_string()}),
            Some(&owner.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

// ===========================================================================
// Comments
// ===========================================================================

#[tokio::test]
async fn comment_is_appended_with_identity_and_timestamp() {
    let app = app().await;
    let owner = app.create_user("cmt_append_owner").await;
    let commenter = app.create_user("cmt_append_commenter").await;
    let post_id = app.create_post_for_user(owner.id).await;

    let resp = app
        .patch_json(
            &format!("/post/comment/{}", post_id),
            json!({
                "commenterId": commenter.id.to_string(),
                "commenterPseudo": commenter.username,
                "text": "first comment"
            }),
            Some(&commenter.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let comments = resp.json()["comments"].as_array().unwrap().clone();
    assert_eq!(comments.len(), 1);
    assert!(comments[0]["id"].is_string());
    assert_eq!(
        comments[0]["commenterId"].as_str().unwrap(),
        commenter.id.to_string()
    );
    assert_eq!(comments[0]["text"].as_str().unwrap(), "first comment");
    assert!(comments[0]["timestamp"].is_string());

    // A second comment lands after the first.
    let resp = app
        .patch_json(
            &format!("/post/comment/{}", post_id),
            json!({
                "commenterId": commenter.id.to_string(),
                "commenterPseudo": commenter.username,
                "text": "second comment"
            }),
            Some(&commenter.token),
        )
        .await;

    let comments = resp.json()["comments"].as_array().unwrap().clone();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[1]["text"].as_str().unwrap(), "second comment");
}

#[tokio::test]
async fn edit_comment_changes_only_that_comment() {
    let app = app().await;
    let owner = app.create_user("cmt_edit_owner").await;
    let commenter = app.create_user("cmt_edit_commenter").await;
    let post_id = app.create_post_for_user(owner.id).await;

    for text in ["one", "two", "three"] {
        app.patch_json(
            &format!("/post/comment/{}", post_id),
            json!({
                "commenterId": commenter.id.to_string(),
                "commenterPseudo": commenter.username,
                "text": text
            }),
            Some(&commenter.token),
        )
        .await;
    }

    let resp = app.get(&format!("/post/{}", post_id), None).await;
    let comments = resp.json()["post"]["comments"].as_array().unwrap().clone();
    let second_id = comments[1]["id"].as_str().unwrap().to_string();

    let resp = app
        .patch_json(
            &format!("/post/edit-comment/{}", post_id),
            json!({"commentId": second_id, "text": "two, edited"}),
            Some(&commenter.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["matched"].as_bool().unwrap(), true);
    assert_eq!(resp.json()["modified"].as_bool().unwrap(), true);

    let resp = app.get(&format!("/post/{}", post_id), None).await;
    let comments = resp.json()["post"]["comments"].as_array().unwrap().clone();
    assert_eq!(comments[0]["text"].as_str().unwrap(), "one");
    assert_eq!(comments[1]["text"].as_str().unwrap(), "two, edited");
    assert_eq!(comments[2]["text"].as_str().unwrap(), "three");
}

#[tokio::test]
async fn edit_comment_with_unknown_id_still_succeeds() {
    let app = app().await;
    let owner = app.create_user("cmt_edit_ghost_owner").await;
    let post_id = app.create_post_for_user(owner.id).await;

    let resp = app
        .patch_json(
            &format!("/post/edit-comment/{}", post_id),
            json!({"commentId": Uuid::new_v4().to_string(), "text": "into the void"}),
            Some(&owner.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["matched"].as_bool().unwrap(), false);
    assert_eq!(resp.json()["modified"].as_bool().unwrap(), false);
}

#[tokio::test]
async fn delete_comment_removes_exactly_one() {
    let app = app().await;
    let owner = app.create_user("cmt_del_owner").await;
    let commenter = app.create_user("cmt_del_commenter").await;
    let post_id = app.create_post_for_user(owner.id).await;

    for text in ["keep me", "delete me", "keep me too"] {
        app.patch_json(
            &format!("/post/comment/{}", post_id),
            json!({
                "commenterId": commenter.id.to_string(),
                "commenterPseudo": commenter.username,
                "text": text
            }),
            Some(&commenter.token),
        )
        .await;
    }

    let resp = app.get(&format!("/post/{}", post_id), None).await;
    let comments = resp.json()["post"]["comments"].as_array().unwrap().clone();
    let victim_id = comments[1]["id"].as_str().unwrap().to_string();

    let resp = app
        .patch_json(
            &format!("/post/delete-comment/{}", post_id),
            json!({"commentId": victim_id}),
            Some(&commenter.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let comments = resp.json()["comments"].as_array().unwrap().clone();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["text"].as_str().unwrap(), "keep me");
    assert_eq!(comments[1]["text"].as_str().unwrap(), "keep me too");
}

#[tokio::test]
async fn delete_comment_missing_parameter() {
    let app = app().await;
    let owner = app.create_user("cmt_del_noparam").await;
    let post_id = app.create_post_for_user(owner.id).await;

    let resp = app
        .patch_json(
            &format!("/post/delete-comment/{}", post_id),
            json!({}),
            Some(&owner.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "missing parameter");
}

#[tokio::test]
async fn edit_someone_elses_comment_is_forbidden() {
    let app = app().await;
    let owner = app.create_user("cmt_edit_imp_owner").await;
    let commenter = app.create_user("cmt_edit_imp_commenter").await;
    let post_id = app.create_post_for_user(owner.id).await;

    let resp = app
        .patch_json(
            &format!("/post/comment/{}", post_id),
            json!({
                "commenterId": commenter.id.to_string(),
                "commenterPseudo": commenter.username,
                "text": "mine"
            }),
            Some(&commenter.token),
        )
        .await;
    let comment_id = resp.json()["comments"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let resp = app
        .patch_json(
            &format!("/post/edit-comment/{}", post_id),
            json!({"commentId": comment_id, "text": "not yours"}),
            Some(&owner.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn comment_on_unknown_post() {
    let app = app().await;
    let commenter = app.create_user("cmt_ghost_post").await;

    let resp = app
        .patch_json(
            &format!("/post/comment/{}", Uuid::new_v4()),
            json!({
                "commenterId": commenter.id.to_string(),
                "commenterPseudo": commenter.username,
                "text": "hello?"
            }),
            Some(&commenter.token),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "ID unknown");
}

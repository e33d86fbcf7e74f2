use axum::{routing::delete, routing::get, routing::patch, routing::post, routing::put, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn users() -> Router<AppState> {
    Router::new()
        .route("/user/signup", post(handlers::signup))
        .route("/user/login", post(handlers::login))
        .route("/api/user", get(handlers::list_users))
        .route("/api/user/:id", get(handlers::get_user))
        .route("/api/user/:id", put(handlers::update_user))
        .route("/api/user/:id", delete(handlers::delete_user))
        .route("/user/follow/:id", patch(handlers::follow_user))
        .route("/user/unfollow/:id", patch(handlers::unfollow_user))
}

pub fn posts() -> Router<AppState> {
    Router::new()
        .route("/post/publish", post(handlers::publish_post))
        .route("/post/:id", get(handlers::get_post))
        .route("/api/post/:id", put(handlers::update_post))
        .route("/api/delete-post/:id", delete(handlers::delete_post))
        .route("/post/like/:id", patch(handlers::like_post))
        .route("/post/unlike/:id", patch(handlers::unlike_post))
        .route("/post/comment/:id", patch(handlers::comment_post))
        .route("/post/edit-comment/:id", patch(handlers::edit_comment))
        .route("/post/delete-comment/:id", patch(handlers::delete_comment))
}

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::app::auth::{AuthService, SignupInput};
use crate::app::engagement::EngagementService;
use crate::app::media::MediaService;
use crate::app::posts::PostService;
use crate::app::social::SocialService;
use crate::app::users::{ProfileChanges, UserService};
use crate::domain::post::Post;
use crate::domain::user::{date_format, AuthProfile, User};
use crate::http::{AppError, AuthUser};
use crate::AppState;

const MAX_MESSAGE_CHARS: usize = 320;
const MAX_BIO_CHARS: usize = 1000;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserToUpdateEnvelope {
    pub user_to_update: User,
}

#[derive(Serialize)]
pub struct PostEnvelope {
    pub post: Post,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostToUpdateEnvelope {
    pub post_to_update: Post,
}

/// Outcome of a positional comment update. A commentId that matches no
/// stored comment still reports 200, with `matched: false`.
#[derive(Serialize)]
pub struct UpdateOutcome {
    pub matched: bool,
    pub modified: bool,
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::bad_request("ID unknown"))
}

fn required(value: Option<String>) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("missing parameter"))
}

fn store_error(err: anyhow::Error) -> AppError {
    tracing::error!(error = ?err, "store operation failed");
    AppError::bad_request(err.to_string())
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|err| err.as_database_error())
        .and_then(|db_err| db_err.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

fn id_unknown_ok() -> Response {
    (
        StatusCode::OK,
        Json(MessageResponse {
            message: "ID unknown".to_string(),
        }),
    )
        .into_response()
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.db.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse { status })
}

pub async fn not_found() -> AppError {
    AppError::not_found("This route does not exist")
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub newsletter: Option<bool>,
    #[serde(default, rename = "birthDate", with = "date_format")]
    pub birth_date: Option<Date>,
    pub team: Option<String>,
    pub bio: Option<String>,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<AuthProfile>, AppError> {
    let username = payload
        .username
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Username is required"))?;
    let email = payload
        .email
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Email is required"))?;
    let password = payload
        .password
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request("Password is required"))?;
    if let Some(bio) = &payload.bio {
        if bio.chars().count() > MAX_BIO_CHARS {
            return Err(AppError::bad_request("bio must be at most 1000 characters"));
        }
    }

    let service = AuthService::new(state.db.clone());
    let profile = service
        .signup(SignupInput {
            username,
            email,
            password,
            newsletter: payload.newsletter,
            birth_date: payload.birth_date,
            team: payload.team,
            bio: payload.bio,
        })
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                return AppError::conflict("Email already used");
            }
            store_error(err)
        })?;

    Ok(Json(profile))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, Json<AuthProfile>), AppError> {
    let email = required(payload.email)?;
    let password = payload
        .password
        .ok_or_else(|| AppError::bad_request("missing parameter"))?;

    let service = AuthService::new(state.db.clone());
    let profile = service.login(&email, &password).await.map_err(store_error)?;

    match profile {
        Some(profile) => Ok((StatusCode::CREATED, Json(profile))),
        None => Err(AppError::unauthorized("Unauthorized")),
    }
}

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<User>>), AppError> {
    let service = UserService::new(state.db.clone());
    let users = service.list_all().await.map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(users)))
}

pub async fn get_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<UserEnvelope>), AppError> {
    let user_id = parse_id(&id)?;
    let service = UserService::new(state.db.clone());
    let user = service.get(user_id).await.map_err(store_error)?;

    match user {
        Some(user) => Ok((StatusCode::CREATED, Json(UserEnvelope { user }))),
        None => Err(AppError::bad_request("ID unknown")),
    }
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub newsletter: Option<bool>,
    #[serde(default, rename = "birthDate", with = "date_format")]
    pub birth_date: Option<Date>,
    pub team: Option<String>,
    pub bio: Option<String>,
}

pub async fn update_user(
    auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserToUpdateEnvelope>, AppError> {
    let user_id = parse_id(&id)?;
    if auth.user_id != user_id {
        return Err(AppError::forbidden("cannot update another user's profile"));
    }

    // Only present-and-truthy values apply: an empty string or a false
    // newsletter flag leaves the stored value untouched.
    let changes = ProfileChanges {
        username: payload.username.filter(|v| !v.trim().is_empty()),
        newsletter: payload.newsletter.filter(|v| *v),
        birth_date: payload.birth_date,
        team: payload.team.filter(|v| !v.trim().is_empty()),
        bio: payload.bio.filter(|v| !v.is_empty()),
    };
    if let Some(bio) = &changes.bio {
        if bio.chars().count() > MAX_BIO_CHARS {
            return Err(AppError::bad_request("bio must be at most 1000 characters"));
        }
    }

    let service = UserService::new(state.db.clone());
    let user = service
        .update(user_id, changes)
        .await
        .map_err(store_error)?;

    match user {
        Some(user) => Ok(Json(UserToUpdateEnvelope {
            user_to_update: user,
        })),
        None => Err(AppError::bad_request("ID unknown")),
    }
}

pub async fn delete_user(
    auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    let user_id = match Uuid::parse_str(id.trim()) {
        Ok(user_id) => user_id,
        Err(_) => {
            return Ok(Json(MessageResponse {
                message: "ID unknown".to_string(),
            }))
        }
    };
    if auth.user_id != user_id {
        return Err(AppError::forbidden("cannot delete another user's account"));
    }

    let service = UserService::new(state.db.clone());
    let deleted = service.delete(user_id).await.map_err(store_error)?;

    let message = if deleted {
        "user successfully deleted"
    } else {
        "ID unknown"
    };
    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub id_to_follow: Option<String>,
}

pub async fn follow_user(
    auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<FollowRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let actor_id = parse_id(&id)?;
    let target_id = parse_id(&required(payload.id_to_follow)?)?;
    if auth.user_id != actor_id {
        return Err(AppError::forbidden("cannot follow on behalf of another user"));
    }

    let users = UserService::new(state.db.clone());
    if !users.exists(target_id).await.map_err(store_error)? {
        return Err(AppError::bad_request("ID unknown"));
    }

    SocialService::new(state.db.clone())
        .follow(actor_id, target_id)
        .await
        .map_err(store_error)?;

    let user = users
        .get(actor_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::bad_request("ID unknown"))?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnfollowRequest {
    pub id_to_unfollow: Option<String>,
}

pub async fn unfollow_user(
    auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UnfollowRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let actor_id = parse_id(&id)?;
    let target_id = parse_id(&required(payload.id_to_unfollow)?)?;
    if auth.user_id != actor_id {
        return Err(AppError::forbidden(
            "cannot unfollow on behalf of another user",
        ));
    }

    let users = UserService::new(state.db.clone());
    if !users.exists(target_id).await.map_err(store_error)? {
        return Err(AppError::bad_request("ID unknown"));
    }

    SocialService::new(state.db.clone())
        .unfollow(actor_id, target_id)
        .await
        .map_err(store_error)?;

    let user = users
        .get(actor_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::bad_request("ID unknown"))?;
    Ok((StatusCode::CREATED, Json(user)))
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

pub async fn publish_post(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let mut message: Option<String> = None;
    let mut video: Option<String> = None;
    let mut picture: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(err.to_string()))?
    {
        let name = field.name().map(|name| name.to_string());
        match name.as_deref() {
            Some("message") => {
                message = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| AppError::bad_request(err.to_string()))?,
                );
            }
            Some("video") => {
                video = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| AppError::bad_request(err.to_string()))?,
                );
            }
            Some("picture") => {
                picture = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|err| AppError::bad_request(err.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let message = message
        .ok_or_else(|| AppError::bad_request("message is required"))?
        .trim()
        .to_string();
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::bad_request(
            "message must be at most 320 characters",
        ));
    }
    let picture = picture.ok_or_else(|| AppError::bad_request("picture is required"))?;
    let video = video.filter(|v| !v.trim().is_empty());

    let media = MediaService::new(state.storage.clone());
    let asset = media
        .upload_picture(auth.user_id, picture)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "picture upload failed");
            AppError::bad_request(err.to_string())
        })?;

    let posts = PostService::new(state.db.clone());
    let post = posts
        .create(auth.user_id, message, asset, video)
        .await
        .map_err(store_error)?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PostEnvelope>, AppError> {
    let post_id = parse_id(&id)?;
    let service = PostService::new(state.db.clone());
    let post = service.get(post_id).await.map_err(store_error)?;

    match post {
        Some(post) => Ok(Json(PostEnvelope { post })),
        None => Err(AppError::bad_request("ID unknown")),
    }
}

#[derive(Deserialize)]
pub struct UpdatePostRequest {
    pub message: Option<String>,
}

pub async fn update_post(
    auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<PostToUpdateEnvelope>, AppError> {
    let post_id = parse_id(&id)?;
    let message = required(payload.message)?.trim().to_string();
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::bad_request(
            "message must be at most 320 characters",
        ));
    }

    let service = PostService::new(state.db.clone());
    let post = service
        .get(post_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::bad_request("ID unknown"))?;
    if post.owner != auth.user_id {
        return Err(AppError::forbidden("cannot edit another user's post"));
    }

    let updated = service
        .update_message(post_id, message)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::bad_request("ID unknown"))?;
    Ok(Json(PostToUpdateEnvelope {
        post_to_update: updated,
    }))
}

pub async fn delete_post(
    auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    let post_id = parse_id(&id)?;

    let service = PostService::new(state.db.clone());
    let post = service
        .get(post_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::bad_request("ID unknown"))?;
    if post.owner != auth.user_id {
        return Err(AppError::forbidden("cannot delete another user's post"));
    }

    service.delete(post_id).await.map_err(store_error)?;
    Ok(Json(MessageResponse {
        message: "post successfully deleted".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Engagement
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub id_who_like: Option<String>,
}

pub async fn like_post(
    auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<LikeRequest>,
) -> Result<Response, AppError> {
    let liker_raw = required(payload.id_who_like)?;

    let (post_id, liker_id) = match (Uuid::parse_str(id.trim()), Uuid::parse_str(liker_raw.trim()))
    {
        (Ok(post_id), Ok(liker_id)) => (post_id, liker_id),
        _ => return Ok(id_unknown_ok()),
    };
    if auth.user_id != liker_id {
        return Err(AppError::forbidden("cannot like on behalf of another user"));
    }

    let users = UserService::new(state.db.clone());
    let posts = PostService::new(state.db.clone());
    let both = posts.exists(post_id).await.map_err(store_error)?
        && users.exists(liker_id).await.map_err(store_error)?;
    if !both {
        return Ok(id_unknown_ok());
    }

    EngagementService::new(state.db.clone())
        .like(liker_id, post_id)
        .await
        .map_err(store_error)?;

    let user = users
        .get(liker_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::bad_request("ID unknown"))?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlikeRequest {
    pub id_who_unlike: Option<String>,
}

pub async fn unlike_post(
    auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UnlikeRequest>,
) -> Result<Response, AppError> {
    let unliker_raw = required(payload.id_who_unlike)?;

    let (post_id, unliker_id) =
        match (Uuid::parse_str(id.trim()), Uuid::parse_str(unliker_raw.trim())) {
            (Ok(post_id), Ok(unliker_id)) => (post_id, unliker_id),
            _ => return Ok(id_unknown_ok()),
        };
    if auth.user_id != unliker_id {
        return Err(AppError::forbidden(
            "cannot unlike on behalf of another user",
        ));
    }

    let users = UserService::new(state.db.clone());
    let posts = PostService::new(state.db.clone());
    let both = posts.exists(post_id).await.map_err(store_error)?
        && users.exists(unliker_id).await.map_err(store_error)?;
    if !both {
        return Ok(id_unknown_ok());
    }

    EngagementService::new(state.db.clone())
        .unlike(unliker_id, post_id)
        .await
        .map_err(store_error)?;

    let user = users
        .get(unliker_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::bad_request("ID unknown"))?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub commenter_id: Option<String>,
    pub commenter_pseudo: Option<String>,
    pub text: Option<String>,
}

pub async fn comment_post(
    auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<CommentRequest>,
) -> Result<Json<Post>, AppError> {
    let post_id = parse_id(&id)?;
    let commenter_id = parse_id(&required(payload.commenter_id)?)?;
    let commenter_pseudo = required(payload.commenter_pseudo)?;
    let text = required(payload.text)?;
    if auth.user_id != commenter_id {
        return Err(AppError::forbidden("cannot comment as another user"));
    }

    let posts = PostService::new(state.db.clone());
    if !posts.exists(post_id).await.map_err(store_error)? {
        return Err(AppError::bad_request("ID unknown"));
    }

    EngagementService::new(state.db.clone())
        .add_comment(post_id, commenter_id, commenter_pseudo, text)
        .await
        .map_err(store_error)?;

    let post = posts
        .get(post_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::bad_request("ID unknown"))?;
    Ok(Json(post))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCommentRequest {
    pub comment_id: Option<String>,
    pub text: Option<String>,
}

pub async fn edit_comment(
    auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<EditCommentRequest>,
) -> Result<Json<UpdateOutcome>, AppError> {
    let post_id = parse_id(&id)?;
    let comment_id = parse_id(&required(payload.comment_id)?)?;
    let text = required(payload.text)?;

    let posts = PostService::new(state.db.clone());
    if !posts.exists(post_id).await.map_err(store_error)? {
        return Err(AppError::bad_request("ID unknown"));
    }

    let engagement = EngagementService::new(state.db.clone());
    match engagement
        .comment_author(post_id, comment_id)
        .await
        .map_err(store_error)?
    {
        None => Ok(Json(UpdateOutcome {
            matched: false,
            modified: false,
        })),
        Some(author) if author != auth.user_id => {
            Err(AppError::forbidden("cannot edit another user's comment"))
        }
        Some(_) => {
            let updated = engagement
                .edit_comment(post_id, comment_id, text)
                .await
                .map_err(store_error)?;
            Ok(Json(UpdateOutcome {
                matched: updated,
                modified: updated,
            }))
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentRequest {
    pub comment_id: Option<String>,
}

pub async fn delete_comment(
    auth: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<DeleteCommentRequest>,
) -> Result<Json<Post>, AppError> {
    let post_id = parse_id(&id)?;
    let comment_id = parse_id(&required(payload.comment_id)?)?;

    let posts = PostService::new(state.db.clone());
    if !posts.exists(post_id).await.map_err(store_error)? {
        return Err(AppError::bad_request("ID unknown"));
    }

    let engagement = EngagementService::new(state.db.clone());
    match engagement
        .comment_author(post_id, comment_id)
        .await
        .map_err(store_error)?
    {
        None => {}
        Some(author) if author != auth.user_id => {
            return Err(AppError::forbidden("cannot delete another user's comment"));
        }
        Some(_) => {
            engagement
                .delete_comment(post_id, comment_id)
                .await
                .map_err(store_error)?;
        }
    }

    let post = posts
        .get(post_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::bad_request("ID unknown"))?;
    Ok(Json(post))
}

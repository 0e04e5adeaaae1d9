use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::authentication::{
    get_jwt_token, hash_password_argon2, verify_password_argon2, AuthUser, MaybeUser,
};
use crate::cache::ResponseCache;
use crate::db_helpers::{
    count_author_posts, follow_author_in_db, get_group_by_slug, get_post_by_id, get_user_by_id,
    get_user_by_username, insert_comment, insert_post, insert_user, is_following,
    list_all_posts, list_author_posts, list_followed_posts, list_group_posts, list_groups,
    list_recent_comments, unfollow_author_in_db, update_post,
};
use crate::errors::RequestError;
use crate::models::{Group, Post};
use crate::pagination::{paginate, POSTS_PER_PAGE_LIMIT};
use crate::{
    AuthResponse, CommentForm, FeedResponse, FieldError, GroupFeedResponse, GroupView,
    LoginRequest, PostDetailResponse, PostForm, PostFormResponse, PostView, ProfileResponse,
    SignupRequest,
};

/// Word-truncation hint for post previews; a value handed to the
/// rendering layer, not logic.
pub const POST_PREVIEW_LEN_WORDS: usize = 10;
const VISIBLE_COMMENTS_LIMIT: i64 = 10;

type HandlerResult = Result<Response, RequestError>;

fn page_param(params: &HashMap<String, String>) -> Option<&str> {
    params.get("page").map(String::as_str)
}

fn post_views(posts: Vec<Post>) -> Vec<PostView> {
    posts.into_iter().map(PostView::from).collect()
}

fn group_views(groups: Vec<Group>) -> Vec<GroupView> {
    groups.into_iter().map(GroupView::from).collect()
}

fn json_bytes(body: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}

// ----------------- Feed Handlers -----------------

/// The home feed. Responses are cached for a fixed window keyed by path
/// plus query string; within the window the cached bytes are returned
/// verbatim even if posts have changed underneath.
pub async fn index(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(cache): Extension<ResponseCache>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> HandlerResult {
    let key = ResponseCache::key(&uri);
    if let Some(body) = cache.get(&key).await {
        return Ok(json_bytes(body.as_ref().clone()));
    }

    let posts = list_all_posts(&pool).await?;
    let page = paginate(post_views(posts), POSTS_PER_PAGE_LIMIT, page_param(&params));
    let response = FeedResponse {
        page,
        post_trunc: POST_PREVIEW_LEN_WORDS,
    };
    let body = serde_json::to_vec(&response).map_err(|_| RequestError::ServerError)?;
    cache.insert(key, body.clone()).await;
    Ok(json_bytes(body))
}

pub async fn group_posts(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<GroupFeedResponse>, RequestError> {
    let group = get_group_by_slug(&pool, &slug)
        .await?
        .ok_or(RequestError::NotFound)?;
    let posts = list_group_posts(&pool, group.id).await?;
    let page = paginate(post_views(posts), POSTS_PER_PAGE_LIMIT, page_param(&params));
    Ok(Json(GroupFeedResponse {
        group: group.into(),
        page,
        post_trunc: POST_PREVIEW_LEN_WORDS,
    }))
}

pub async fn profile(
    Extension(pool): Extension<Arc<SqlitePool>>,
    MaybeUser(viewer): MaybeUser,
    Path(username): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ProfileResponse>, RequestError> {
    let author = get_user_by_username(&pool, &username)
        .await?
        .ok_or(RequestError::NotFound)?;
    let posts = list_author_posts(&pool, author.id).await?;
    let posts_count = posts.len() as i64;

    let following = match &viewer {
        Some(user) if user.id != author.id => {
            Some(is_following(&pool, user.id, author.id).await?)
        }
        _ => None,
    };

    let page = paginate(post_views(posts), POSTS_PER_PAGE_LIMIT, page_param(&params));
    Ok(Json(ProfileResponse {
        author: author.username,
        posts_count,
        following,
        page,
        post_trunc: POST_PREVIEW_LEN_WORDS,
    }))
}

pub async fn post_detail(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(post_id): Path<i64>,
) -> Result<Json<PostDetailResponse>, RequestError> {
    let post = get_post_by_id(&pool, post_id)
        .await?
        .ok_or(RequestError::NotFound)?;
    let posts_count = count_author_posts(&pool, post.author_id).await?;
    let comments = list_recent_comments(&pool, post_id, VISIBLE_COMMENTS_LIMIT).await?;
    Ok(Json(PostDetailResponse {
        post: post.into(),
        posts_count,
        comments: comments.into_iter().map(Into::into).collect(),
    }))
}

pub async fn follow_index(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<FeedResponse>, RequestError> {
    let posts = list_followed_posts(&pool, user.id).await?;
    let page = paginate(post_views(posts), POSTS_PER_PAGE_LIMIT, page_param(&params));
    Ok(Json(FeedResponse {
        page,
        post_trunc: POST_PREVIEW_LEN_WORDS,
    }))
}

// ----------------- Post Write Handlers -----------------

/// Validates the form and resolves the submitted group slug to an id.
async fn resolve_form(
    pool: &SqlitePool,
    form: &PostForm,
) -> Result<(Option<i64>, Vec<FieldError>), RequestError> {
    let mut errors = form.validate();
    let group_id = match &form.group {
        Some(slug) => match get_group_by_slug(pool, slug).await? {
            Some(group) => Some(group.id),
            None => {
                errors.push(FieldError::new("group", "Unknown group"));
                None
            }
        },
        None => None,
    };
    Ok((group_id, errors))
}

/// Redisplays the form with field errors, echoing the submitted input.
async fn redisplay_form(
    pool: &SqlitePool,
    form: PostForm,
    errors: Vec<FieldError>,
    is_edit: bool,
) -> HandlerResult {
    let groups = group_views(list_groups(pool).await?);
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(PostFormResponse {
            form,
            groups,
            is_edit,
            errors,
        }),
    )
        .into_response())
}

pub async fn post_create_form(
    Extension(pool): Extension<Arc<SqlitePool>>,
    _user: AuthUser,
) -> Result<Json<PostFormResponse>, RequestError> {
    let groups = group_views(list_groups(&pool).await?);
    Ok(Json(PostFormResponse {
        form: PostForm::default(),
        groups,
        is_edit: false,
        errors: Vec::new(),
    }))
}

pub async fn post_create(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Json(form): Json<PostForm>,
) -> HandlerResult {
    let (group_id, errors) = resolve_form(&pool, &form).await?;
    if !errors.is_empty() {
        return redisplay_form(&pool, form, errors, false).await;
    }

    insert_post(&pool, user.id, &form.text, group_id, form.image.as_deref()).await?;
    let author = get_user_by_id(&pool, user.id)
        .await?
        .ok_or(RequestError::ServerError)?;
    Ok(Redirect::to(&format!("/profile/{}", author.username)).into_response())
}

pub async fn post_edit_form(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(post_id): Path<i64>,
) -> HandlerResult {
    let post = get_post_by_id(&pool, post_id)
        .await?
        .ok_or(RequestError::NotFound)?;
    if post.author_id != user.id {
        return Ok(Redirect::to(&format!("/posts/{post_id}")).into_response());
    }

    let groups = group_views(list_groups(&pool).await?);
    let form = PostForm {
        text: post.text,
        group: post.group_slug,
        image: post.image,
    };
    Ok(Json(PostFormResponse {
        form,
        groups,
        is_edit: true,
        errors: Vec::new(),
    })
    .into_response())
}

pub async fn post_edit(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(post_id): Path<i64>,
    Json(form): Json<PostForm>,
) -> HandlerResult {
    let post = get_post_by_id(&pool, post_id)
        .await?
        .ok_or(RequestError::NotFound)?;
    // Non-authors are bounced to the detail page without an error.
    if post.author_id != user.id {
        return Ok(Redirect::to(&format!("/posts/{post_id}")).into_response());
    }

    let (group_id, errors) = resolve_form(&pool, &form).await?;
    if !errors.is_empty() {
        return redisplay_form(&pool, form, errors, true).await;
    }

    update_post(&pool, post_id, &form.text, group_id, form.image.as_deref()).await?;
    Ok(Redirect::to(&format!("/posts/{post_id}")).into_response())
}

pub async fn add_comment(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(post_id): Path<i64>,
    Json(form): Json<CommentForm>,
) -> HandlerResult {
    let post = get_post_by_id(&pool, post_id)
        .await?
        .ok_or(RequestError::NotFound)?;
    if form.text.trim().is_empty() {
        return Err(RequestError::ValidationFailed("This field is required"));
    }

    insert_comment(&pool, post.id, user.id, &form.text).await?;
    Ok(Redirect::to(&format!("/posts/{post_id}")).into_response())
}

// ----------------- Follow Handlers -----------------

pub async fn profile_follow(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(username): Path<String>,
) -> HandlerResult {
    let author = follow_author_in_db(&pool, user.id, &username).await?;
    Ok(Redirect::to(&format!("/profile/{}", author.username)).into_response())
}

pub async fn profile_unfollow(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(username): Path<String>,
) -> HandlerResult {
    let author = unfollow_author_in_db(&pool, user.id, &username).await?;
    Ok(Redirect::to(&format!("/profile/{}", author.username)).into_response())
}

// ----------------- Auth Handlers -----------------

pub async fn signup(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, RequestError> {
    let password = hash_password_argon2(request.password)
        .await
        .map_err(|_| RequestError::ServerError)?;

    let user_id = insert_user(&pool, &request.username, &request.email, &password)
        .await
        .map_err(|error| {
            if let RequestError::DatabaseError(sqlx::Error::Database(error)) = &error {
                if error.message().contains("UNIQUE constraint failed") {
                    return RequestError::ValidationFailed("Username or email already taken");
                }
            }
            error
        })?;

    let token = get_jwt_token(user_id).map_err(|_| RequestError::ServerError)?;
    Ok(Json(AuthResponse {
        username: request.username,
        token,
    }))
}

pub async fn login(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, RequestError> {
    let user = get_user_by_username(&pool, &request.username)
        .await?
        .ok_or(RequestError::ValidationFailed("Invalid username or password"))?;

    let is_password_correct = verify_password_argon2(request.password, user.password)
        .await
        .map_err(|_| RequestError::ServerError)?;
    if !is_password_correct {
        return Err(RequestError::ValidationFailed("Invalid username or password"));
    }

    let token = get_jwt_token(user.id).map_err(|_| RequestError::ServerError)?;
    Ok(Json(AuthResponse {
        username: user.username,
        token,
    }))
}

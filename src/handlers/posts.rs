//! # Post Handlers
//!
//! Reading posts is public; creating, editing and deleting requires a
//! bearer token. The authenticated user becomes the owner of a new post.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Extension, Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::{
    AppState, NewPost, Post, PostChanges, PostDetail, PostWithComments, PostWithTags,
};
use crate::services::posts::PostService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSearchParams {
    pub search_query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TagParams {
    /// Comma-separated tag names
    pub tag: Option<String>,
}

/// GET /posts
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn list_posts(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<PostWithTags>>> {
    Ok(Json(PostService::list(state.post_store.as_ref()).await?))
}

/// GET /posts/comments
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn list_posts_with_comments(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<PostWithComments>>> {
    Ok(Json(
        PostService::list_with_comments(state.post_store.as_ref()).await?,
    ))
}

/// GET /posts/search?searchQuery=
///
/// Returns `400 Bad Request` for a missing or blank query.
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn search_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PostSearchParams>,
) -> AppResult<Json<Vec<PostWithTags>>> {
    let posts =
        PostService::search(state.post_store.as_ref(), params.search_query.as_deref()).await?;
    Ok(Json(posts))
}

/// GET /posts/by-tags?tag=rust,backend
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn posts_by_tags(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TagParams>,
) -> AppResult<Json<Vec<PostWithTags>>> {
    let posts = PostService::by_tags(state.post_store.as_ref(), params.tag.as_deref()).await?;
    Ok(Json(posts))
}

/// GET /posts/{id}
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    post_id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<PostDetail>> {
    let Path(post_id) = post_id?;
    Ok(Json(PostService::get(state.post_store.as_ref(), post_id).await?))
}

/// POST /posts
#[instrument(
    skip_all,
    fields(
        user_id = %user.user_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewPost>, JsonRejection>,
) -> AppResult<(StatusCode, Json<PostWithTags>)> {
    let Json(new_post) = payload?;
    let created = PostService::create(state.post_store.as_ref(), user.user_id, new_post).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /posts/{id}
#[instrument(
    skip_all,
    fields(
        user_id = %user.user_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    post_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<PostChanges>, JsonRejection>,
) -> AppResult<Json<Post>> {
    let Path(post_id) = post_id?;
    let Json(changes) = payload?;
    Ok(Json(
        PostService::update(state.post_store.as_ref(), post_id, changes).await?,
    ))
}

/// DELETE /posts/{id}
#[instrument(
    skip_all,
    fields(
        user_id = %user.user_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    post_id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<Post>> {
    let Path(post_id) = post_id?;
    Ok(Json(
        PostService::delete(state.post_store.as_ref(), post_id).await?,
    ))
}

//! # Post Service
//!
//! Blog posts with comments and shared tags.

use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{NewPost, Post, PostChanges, PostDetail, PostWithComments, PostWithTags};
use crate::store::{PostStore, timed};

pub struct PostService;

impl PostService {
    #[instrument(skip(store))]
    pub async fn list(store: &dyn PostStore) -> AppResult<Vec<PostWithTags>> {
        Ok(timed(store.list_posts()).await?)
    }

    #[instrument(skip(store))]
    pub async fn list_with_comments(store: &dyn PostStore) -> AppResult<Vec<PostWithComments>> {
        Ok(timed(store.list_posts_with_comments()).await?)
    }

    #[instrument(skip(store))]
    pub async fn search(store: &dyn PostStore, query: Option<&str>) -> AppResult<Vec<PostWithTags>> {
        let query = query.map(str::trim).unwrap_or_default();
        if query.is_empty() {
            warn!("Empty post search query");
            return Err(AppError::BadRequest("searchQuery is required"));
        }

        Ok(timed(store.search_posts(query)).await?)
    }

    /// `tags` is a comma-separated list; a post matches if it has any of them.
    #[instrument(skip(store))]
    pub async fn by_tags(store: &dyn PostStore, tags: Option<&str>) -> AppResult<Vec<PostWithTags>> {
        let names = split_tag_names(tags.unwrap_or_default());
        if names.is_empty() {
            warn!("Empty tag filter");
            return Err(AppError::BadRequest("Invalid tag parameter"));
        }

        Ok(timed(store.posts_by_tags(&names)).await?)
    }

    #[instrument(skip(store))]
    pub async fn get(store: &dyn PostStore, post_id: i32) -> AppResult<PostDetail> {
        timed(store.get_post(post_id))
            .await?
            .ok_or(AppError::NotFound("Post not found"))
    }

    #[instrument(skip(store, new_post), fields(title = %new_post.title))]
    pub async fn create(
        store: &dyn PostStore,
        user_id: i32,
        new_post: NewPost,
    ) -> AppResult<PostWithTags> {
        new_post.validate()?;

        let tags = dedup_tag_names(&new_post.tags);
        debug!(tags = tags.len(), "Creating post");

        let created =
            timed(store.create_post(user_id, &new_post.title, &new_post.content, &tags)).await?;

        info!(post_id = created.post.id, "Post created");
        Ok(created)
    }

    #[instrument(skip(store, changes))]
    pub async fn update(
        store: &dyn PostStore,
        post_id: i32,
        changes: PostChanges,
    ) -> AppResult<Post> {
        changes.validate()?;

        timed(store.update_post(post_id, &changes))
            .await?
            .ok_or(AppError::NotFound("Post not found"))
    }

    #[instrument(skip(store))]
    pub async fn delete(store: &dyn PostStore, post_id: i32) -> AppResult<Post> {
        let deleted = timed(store.delete_post(post_id))
            .await?
            .ok_or(AppError::NotFound("Post not found"))?;

        info!("Post deleted");
        Ok(deleted)
    }
}

fn split_tag_names(raw: &str) -> Vec<String> {
    dedup_tag_names(&raw.split(',').collect::<Vec<_>>())
}

/// Trims names, drops blanks and keeps the first occurrence of each name.
fn dedup_tag_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(names.len());
    for name in names.iter().map(|name| name.as_ref().trim()) {
        if !name.is_empty() && !unique.iter().any(|seen| seen == name) {
            unique.push(name.to_string());
        }
    }
    unique
}

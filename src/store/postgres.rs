use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{debug, instrument};

use super::{CandidateStore, PostStore, StoreError};
use crate::models::{
    Applicant, Application, ApplicationRecord, ApplicationStatus, Comment, CommentAuthor,
    CommentWithAuthor, Post, PostChanges, PostDetail, PostWithComments, PostWithTags, Tag, User,
    UserType, UserWithApplicant,
};

const USER_WITH_APPLICANT_SELECT: &str = r#"
    SELECT
        u.id, u.email, u.first_name, u.last_name, u.patronymic, u.password,
        u.refresh_token, u.type, u.avatar, u.about, u.job_experience, u.created_at,
        a.id AS applicant_id, a.resume, a.git_hub_link, a.skills, a.projects_list
    FROM users u
    LEFT JOIN applicants a ON a.user_id = u.id
"#;

const POST_COLUMNS: &str = "p.id, p.title, p.content, p.user_id, p.created_at";

/// PostgreSQL implementation of the data access traits.
#[derive(Clone)]
pub struct PgStore {
    db_pool: PgPool,
}

impl PgStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    async fn fetch_users(
        &self,
        filter: &str,
        bind: Option<BindValue<'_>>,
    ) -> Result<Vec<UserWithApplicant>, StoreError> {
        let sql = format!("{USER_WITH_APPLICANT_SELECT} {filter} ORDER BY u.id");
        let query = sqlx::query_as::<_, UserApplicantRow>(&sql);
        let query = match bind {
            Some(BindValue::Int(value)) => query.bind(value),
            Some(BindValue::Text(value)) => query.bind(value),
            None => query,
        };

        let rows = query.fetch_all(&self.db_pool).await?;
        Ok(rows.into_iter().map(UserWithApplicant::from).collect())
    }

    /// Loads tags for the given posts, preserving the post order.
    async fn attach_tags(&self, posts: Vec<Post>) -> Result<Vec<PostWithTags>, StoreError> {
        let ids: Vec<i32> = posts.iter().map(|post| post.id).collect();

        let rows = sqlx::query_as::<_, PostTagRow>(
            r#"
            SELECT pt.post_id, t.id, t.name
            FROM post_tags pt
            JOIN tags t ON t.id = pt.tag_id
            WHERE pt.post_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db_pool)
        .await?;

        let mut tags_by_post: HashMap<i32, Vec<Tag>> = HashMap::new();
        for row in rows {
            tags_by_post.entry(row.post_id).or_default().push(Tag {
                id: row.id,
                name: row.name,
            });
        }

        Ok(posts
            .into_iter()
            .map(|post| PostWithTags {
                tags: tags_by_post.remove(&post.id).unwrap_or_default(),
                post,
            })
            .collect())
    }
}

enum BindValue<'a> {
    Int(i32),
    Text(&'a str),
}

#[derive(sqlx::FromRow)]
struct UserApplicantRow {
    #[sqlx(flatten)]
    user: User,
    applicant_id: Option<i32>,
    resume: Option<String>,
    git_hub_link: Option<String>,
    skills: Option<String>,
    projects_list: Option<Value>,
}

impl From<UserApplicantRow> for UserWithApplicant {
    fn from(row: UserApplicantRow) -> Self {
        let applicant = row.applicant_id.map(|id| Applicant {
            id,
            user_id: row.user.id,
            resume: row.resume,
            git_hub_link: row.git_hub_link,
            skills: row.skills.unwrap_or_default(),
            projects_list: row.projects_list.unwrap_or(Value::Array(Vec::new())),
        });

        UserWithApplicant {
            user: row.user,
            applicant,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ApplicationRow {
    application_id: i32,
    applicant_id: i32,
    vacancy_id: i32,
    status: ApplicationStatus,
    application_created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    user_id: i32,
    resume: Option<String>,
    git_hub_link: Option<String>,
    skills: String,
    projects_list: Value,
    email: String,
    first_name: String,
    last_name: String,
    patronymic: Option<String>,
    password: String,
    refresh_token: Option<String>,
    #[sqlx(rename = "type")]
    user_type: UserType,
    avatar: Option<String>,
    about: Option<String>,
    job_experience: Value,
    created_at: OffsetDateTime,
}

impl From<ApplicationRow> for ApplicationRecord {
    fn from(row: ApplicationRow) -> Self {
        ApplicationRecord {
            application: Application {
                id: row.application_id,
                applicant_id: row.applicant_id,
                vacancy_id: row.vacancy_id,
                status: row.status,
                created_at: row.application_created_at,
                updated_at: row.updated_at,
            },
            applicant: Applicant {
                id: row.applicant_id,
                user_id: row.user_id,
                resume: row.resume,
                git_hub_link: row.git_hub_link,
                skills: row.skills,
                projects_list: row.projects_list,
            },
            user: User {
                id: row.user_id,
                email: row.email,
                first_name: row.first_name,
                last_name: row.last_name,
                patronymic: row.patronymic,
                password: row.password,
                refresh_token: row.refresh_token,
                user_type: row.user_type,
                avatar: row.avatar,
                about: row.about,
                job_experience: row.job_experience,
                created_at: row.created_at,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostTagRow {
    post_id: i32,
    id: i32,
    name: String,
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    #[sqlx(flatten)]
    comment: Comment,
    first_name: String,
    last_name: String,
    avatar: Option<String>,
}

#[async_trait]
impl CandidateStore for PgStore {
    #[instrument(skip_all)]
    async fn list_applicants(&self) -> Result<Vec<UserWithApplicant>, StoreError> {
        self.fetch_users("WHERE u.type = 'APPLICANT'", None).await
    }

    #[instrument(skip(self))]
    async fn find_applicants_with_skill(
        &self,
        skill: &str,
    ) -> Result<Vec<UserWithApplicant>, StoreError> {
        // Same split rules as utils::skills::contains
        self.fetch_users(
            r#"
            WHERE u.type = 'APPLICANT'
              AND EXISTS (
                  SELECT 1 FROM unnest(string_to_array(a.skills, ',')) AS s(label)
                  WHERE btrim(s.label) = $1
              )
            "#,
            Some(BindValue::Text(skill)),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn find_applicant(&self, user_id: i32) -> Result<Option<UserWithApplicant>, StoreError> {
        let mut users = self
            .fetch_users(
                "WHERE u.id = $1 AND u.type = 'APPLICANT'",
                Some(BindValue::Int(user_id)),
            )
            .await?;
        Ok(users.pop())
    }

    #[instrument(skip(self))]
    async fn find_user(&self, user_id: i32) -> Result<Option<UserWithApplicant>, StoreError> {
        let mut users = self
            .fetch_users("WHERE u.id = $1", Some(BindValue::Int(user_id)))
            .await?;
        Ok(users.pop())
    }

    #[instrument(skip(self))]
    async fn list_applications(
        &self,
        vacancy_id: i32,
        status: Option<ApplicationStatus>,
    ) -> Result<Option<Vec<ApplicationRecord>>, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM vacancies WHERE id = $1)")
                .bind(vacancy_id)
                .fetch_one(&self.db_pool)
                .await?;

        if !exists {
            debug!("Vacancy not found");
            return Ok(None);
        }

        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT
                ap.id AS application_id, ap.applicant_id, ap.vacancy_id, ap.status,
                ap.created_at AS application_created_at, ap.updated_at,
                a.user_id, a.resume, a.git_hub_link, a.skills, a.projects_list,
                u.email, u.first_name, u.last_name, u.patronymic, u.password,
                u.refresh_token, u.type, u.avatar, u.about, u.job_experience, u.created_at
            FROM applications ap
            JOIN applicants a ON a.id = ap.applicant_id
            JOIN users u ON u.id = a.user_id
            WHERE ap.vacancy_id = $1
              AND ($2::application_status IS NULL OR ap.status = $2)
            ORDER BY ap.id
            "#,
        )
        .bind(vacancy_id)
        .bind(status)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(Some(rows.into_iter().map(ApplicationRecord::from).collect()))
    }

    #[instrument(skip(self))]
    async fn update_application_status(
        &self,
        applicant_id: i32,
        vacancy_id: i32,
        status: ApplicationStatus,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = $1, updated_at = NOW()
            WHERE applicant_id = $2 AND vacancy_id = $3
            "#,
        )
        .bind(status)
        .bind(applicant_id)
        .bind(vacancy_id)
        .execute(&self.db_pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl PostStore for PgStore {
    #[instrument(skip_all)]
    async fn list_posts(&self) -> Result<Vec<PostWithTags>, StoreError> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p ORDER BY p.created_at DESC, p.id DESC"
        ))
        .fetch_all(&self.db_pool)
        .await?;

        self.attach_tags(posts).await
    }

    #[instrument(skip_all)]
    async fn list_posts_with_comments(&self) -> Result<Vec<PostWithComments>, StoreError> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p ORDER BY p.id"
        ))
        .fetch_all(&self.db_pool)
        .await?;

        let ids: Vec<i32> = posts.iter().map(|post| post.id).collect();
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, content, user_id, post_id, created_at
            FROM comments
            WHERE post_id = ANY($1)
            ORDER BY created_at, id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db_pool)
        .await?;

        let mut comments_by_post: HashMap<i32, Vec<Comment>> = HashMap::new();
        for comment in comments {
            comments_by_post
                .entry(comment.post_id)
                .or_default()
                .push(comment);
        }

        Ok(posts
            .into_iter()
            .map(|post| PostWithComments {
                comments: comments_by_post.remove(&post.id).unwrap_or_default(),
                post,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn search_posts(&self, query: &str) -> Result<Vec<PostWithTags>, StoreError> {
        let escaped = query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{escaped}%");

        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts p
            WHERE p.title ILIKE $1 OR p.content ILIKE $1
            ORDER BY p.created_at DESC, p.id DESC
            "#
        ))
        .bind(pattern)
        .fetch_all(&self.db_pool)
        .await?;

        self.attach_tags(posts).await
    }

    #[instrument(skip(self))]
    async fn posts_by_tags(&self, tags: &[String]) -> Result<Vec<PostWithTags>, StoreError> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT DISTINCT {POST_COLUMNS} FROM posts p
            JOIN post_tags pt ON pt.post_id = p.id
            JOIN tags t ON t.id = pt.tag_id
            WHERE t.name = ANY($1)
            ORDER BY p.created_at DESC, p.id DESC
            "#
        ))
        .bind(tags)
        .fetch_all(&self.db_pool)
        .await?;

        self.attach_tags(posts).await
    }

    #[instrument(skip(self))]
    async fn get_post(&self, post_id: i32) -> Result<Option<PostDetail>, StoreError> {
        let Some(post) = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p WHERE p.id = $1"
        ))
        .bind(post_id)
        .fetch_optional(&self.db_pool)
        .await?
        else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.content, c.user_id, c.post_id, c.created_at,
                   u.first_name, u.last_name, u.avatar
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.post_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.db_pool)
        .await?;

        let comments = rows
            .into_iter()
            .map(|row| CommentWithAuthor {
                user: CommentAuthor {
                    id: row.comment.user_id,
                    first_name: row.first_name,
                    last_name: row.last_name,
                    avatar: row.avatar,
                },
                comment: row.comment,
            })
            .collect();

        Ok(Some(PostDetail { post, comments }))
    }

    #[instrument(skip(self, content))]
    async fn create_post(
        &self,
        user_id: i32,
        title: &str,
        content: &str,
        tags: &[String],
    ) -> Result<PostWithTags, StoreError> {
        let mut tx = self.db_pool.begin().await?;

        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, content, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, user_id, created_at
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut attached = Vec::with_capacity(tags.len());
        for name in tags {
            // No-op update so RETURNING yields the existing row on conflict
            let tag = sqlx::query_as::<_, Tag>(
                r#"
                INSERT INTO tags (name) VALUES ($1)
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                RETURNING id, name
                "#,
            )
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                "INSERT INTO post_tags (post_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(post.id)
            .bind(tag.id)
            .execute(&mut *tx)
            .await?;

            attached.push(tag);
        }

        tx.commit().await?;
        debug!(post_id = post.id, tags = attached.len(), "Post created");

        Ok(PostWithTags {
            post,
            tags: attached,
        })
    }

    #[instrument(skip(self, changes))]
    async fn update_post(
        &self,
        post_id: i32,
        changes: &PostChanges,
    ) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts SET title = $1, content = $2
            WHERE id = $3
            RETURNING id, title, content, user_id, created_at
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(post_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(post)
    }

    #[instrument(skip(self))]
    async fn delete_post(&self, post_id: i32) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(
            "DELETE FROM posts WHERE id = $1 RETURNING id, title, content, user_id, created_at",
        )
        .bind(post_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(post)
    }
}

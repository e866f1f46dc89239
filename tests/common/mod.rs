#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use serde_json::json;
use talentboard::models::{
    AppState, Applicant, Application, ApplicationRecord, ApplicationStatus, Comment,
    CommentAuthor, CommentWithAuthor, Post, PostChanges, PostDetail, PostWithComments,
    PostWithTags, Tag, User, UserType, UserWithApplicant,
};
use talentboard::services::email::{EmailError, EmailService};
use talentboard::services::jwt::JwtService;
use talentboard::store::{CandidateStore, PostStore, StoreError};
use talentboard::utils::skills;
use time::{Duration, OffsetDateTime};
use tokio::net::TcpListener;

pub const JWT_SECRET: &[u8] = b"test-secret";
pub const FRONTEND_URL: &str = "https://frontend.test";

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("talentboard=debug")
            .with_test_writer()
            .init();
    });
}

/// A mock email service that stores sent emails for testing purposes.
#[derive(Debug, Default)]
pub struct MockEmailer {
    sent_emails: Mutex<Vec<SentEmail>>,
    failing: AtomicBool,
    stalled: AtomicBool,
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub body_html: String,
}

impl MockEmailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following send fail like an unreachable provider
    pub fn fail_sends(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Makes every following send hang like a provider that never responds
    pub fn stall_sends(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }

    pub fn get_sent_emails(&self) -> Vec<SentEmail> {
        self.sent_emails.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent_emails.lock().unwrap().len()
    }

    pub fn last_sent_email(&self) -> Option<SentEmail> {
        self.sent_emails.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl EmailService for MockEmailer {
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), EmailError> {
        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmailError::SendFailed("provider unreachable".to_string()));
        }

        self.sent_emails.lock().unwrap().push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body_html: body_html.to_string(),
        });
        Ok(())
    }
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    applicants: Vec<Applicant>,
    vacancies: Vec<i32>,
    applications: Vec<Application>,
    posts: Vec<Post>,
    tags: Vec<Tag>,
    post_tags: Vec<(i32, i32)>,
    comments: Vec<Comment>,
}

impl Tables {
    fn with_applicant(&self, user: &User) -> UserWithApplicant {
        UserWithApplicant {
            user: user.clone(),
            applicant: self
                .applicants
                .iter()
                .find(|applicant| applicant.user_id == user.id)
                .cloned(),
        }
    }

    fn tags_of(&self, post_id: i32) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self
            .post_tags
            .iter()
            .filter(|(post, _)| *post == post_id)
            .filter_map(|(_, tag_id)| self.tags.iter().find(|tag| tag.id == *tag_id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }

    fn with_tags(&self, posts: Vec<Post>) -> Vec<PostWithTags> {
        posts
            .into_iter()
            .map(|post| PostWithTags {
                tags: self.tags_of(post.id),
                post,
            })
            .collect()
    }

    fn newest_first(&self) -> Vec<Post> {
        let mut posts = self.posts.clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
    }

    fn next_id<T>(rows: &[T], id: impl Fn(&T) -> i32) -> i32 {
        rows.iter().map(id).max().unwrap_or(0) + 1
    }
}

/// In-memory implementation of both store traits with the same semantics as `PgStore`.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, id: i32, email: &str, user_type: UserType) {
        self.tables.lock().unwrap().users.push(User {
            id,
            email: email.to_string(),
            first_name: format!("First{id}"),
            last_name: format!("Last{id}"),
            patronymic: None,
            password: format!("$argon2id$hash-of-user-{id}"),
            refresh_token: Some(format!("refresh-token-{id}")),
            user_type,
            avatar: None,
            about: Some("about me".to_string()),
            job_experience: json!([]),
            created_at: OffsetDateTime::now_utc(),
        });
    }

    /// Adds a user of type APPLICANT with an applicant profile whose id is `user_id + 100`.
    pub fn add_applicant(&self, user_id: i32, email: &str, skill_labels: &[&str]) -> i32 {
        self.add_user(user_id, email, UserType::Applicant);
        let applicant_id = user_id + 100;
        self.tables.lock().unwrap().applicants.push(Applicant {
            id: applicant_id,
            user_id,
            resume: Some(format!("Resume of {email}")),
            git_hub_link: Some(format!("https://github.com/user{user_id}")),
            skills: skills::encode(skill_labels).unwrap(),
            projects_list: json!([{ "name": "pet project" }]),
        });
        applicant_id
    }

    pub fn add_vacancy(&self, id: i32) {
        self.tables.lock().unwrap().vacancies.push(id);
    }

    pub fn add_application(&self, applicant_id: i32, vacancy_id: i32, status: ApplicationStatus) -> i32 {
        let mut tables = self.tables.lock().unwrap();
        let id = Tables::next_id(&tables.applications, |application| application.id);
        let now = OffsetDateTime::now_utc();
        tables.applications.push(Application {
            id,
            applicant_id,
            vacancy_id,
            status,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn application_statuses(&self, applicant_id: i32, vacancy_id: i32) -> Vec<ApplicationStatus> {
        self.tables
            .lock()
            .unwrap()
            .applications
            .iter()
            .filter(|a| a.applicant_id == applicant_id && a.vacancy_id == vacancy_id)
            .map(|a| a.status)
            .collect()
    }

    /// Adds a post created `age_minutes` ago.
    pub fn add_post(&self, user_id: i32, title: &str, content: &str, age_minutes: i64) -> i32 {
        let mut tables = self.tables.lock().unwrap();
        let id = Tables::next_id(&tables.posts, |post| post.id);
        tables.posts.push(Post {
            id,
            title: title.to_string(),
            content: content.to_string(),
            user_id,
            created_at: OffsetDateTime::now_utc() - Duration::minutes(age_minutes),
        });
        id
    }

    pub fn add_comment(&self, post_id: i32, user_id: i32, content: &str, age_minutes: i64) -> i32 {
        let mut tables = self.tables.lock().unwrap();
        let id = Tables::next_id(&tables.comments, |comment| comment.id);
        tables.comments.push(Comment {
            id,
            content: content.to_string(),
            user_id,
            post_id,
            created_at: OffsetDateTime::now_utc() - Duration::minutes(age_minutes),
        });
        id
    }

    pub fn tag_count(&self) -> usize {
        self.tables.lock().unwrap().tags.len()
    }

    fn attach_tag(tables: &mut Tables, post_id: i32, name: &str) -> Tag {
        let existing = tables.tags.iter().find(|tag| tag.name == name).cloned();
        let tag = match existing {
            Some(tag) => tag,
            None => {
                let tag = Tag {
                    id: Tables::next_id(&tables.tags, |tag| tag.id),
                    name: name.to_string(),
                };
                tables.tags.push(tag.clone());
                tag
            }
        };
        if !tables.post_tags.contains(&(post_id, tag.id)) {
            tables.post_tags.push((post_id, tag.id));
        }
        tag
    }

    pub fn tag_post(&self, post_id: i32, name: &str) {
        let mut tables = self.tables.lock().unwrap();
        Self::attach_tag(&mut tables, post_id, name);
    }
}

#[async_trait]
impl CandidateStore for MemoryStore {
    async fn list_applicants(&self) -> Result<Vec<UserWithApplicant>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut users: Vec<&User> = tables
            .users
            .iter()
            .filter(|user| user.user_type == UserType::Applicant)
            .collect();
        users.sort_by_key(|user| user.id);
        Ok(users.into_iter().map(|user| tables.with_applicant(user)).collect())
    }

    async fn find_applicants_with_skill(
        &self,
        skill: &str,
    ) -> Result<Vec<UserWithApplicant>, StoreError> {
        Ok(self
            .list_applicants()
            .await?
            .into_iter()
            .filter(|record| {
                record
                    .applicant
                    .as_ref()
                    .is_some_and(|applicant| skills::contains(&applicant.skills, skill))
            })
            .collect())
    }

    async fn find_applicant(&self, user_id: i32) -> Result<Option<UserWithApplicant>, StoreError> {
        Ok(self
            .find_user(user_id)
            .await?
            .filter(|record| record.user.user_type == UserType::Applicant))
    }

    async fn find_user(&self, user_id: i32) -> Result<Option<UserWithApplicant>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|user| user.id == user_id)
            .map(|user| tables.with_applicant(user)))
    }

    async fn list_applications(
        &self,
        vacancy_id: i32,
        status: Option<ApplicationStatus>,
    ) -> Result<Option<Vec<ApplicationRecord>>, StoreError> {
        let tables = self.tables.lock().unwrap();
        if !tables.vacancies.contains(&vacancy_id) {
            return Ok(None);
        }

        let mut applications: Vec<&Application> = tables
            .applications
            .iter()
            .filter(|a| a.vacancy_id == vacancy_id)
            .filter(|a| status.is_none_or(|status| a.status == status))
            .collect();
        applications.sort_by_key(|a| a.id);

        let records = applications
            .into_iter()
            .filter_map(|application| {
                let applicant = tables
                    .applicants
                    .iter()
                    .find(|applicant| applicant.id == application.applicant_id)?;
                let user = tables.users.iter().find(|user| user.id == applicant.user_id)?;
                Some(ApplicationRecord {
                    application: application.clone(),
                    applicant: applicant.clone(),
                    user: user.clone(),
                })
            })
            .collect();

        Ok(Some(records))
    }

    async fn update_application_status(
        &self,
        applicant_id: i32,
        vacancy_id: i32,
        status: ApplicationStatus,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let mut updated = 0;
        for application in tables
            .applications
            .iter_mut()
            .filter(|a| a.applicant_id == applicant_id && a.vacancy_id == vacancy_id)
        {
            application.status = status;
            application.updated_at = OffsetDateTime::now_utc();
            updated += 1;
        }
        Ok(updated)
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn list_posts(&self) -> Result<Vec<PostWithTags>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.with_tags(tables.newest_first()))
    }

    async fn list_posts_with_comments(&self) -> Result<Vec<PostWithComments>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut posts = tables.posts.clone();
        posts.sort_by_key(|post| post.id);

        Ok(posts
            .into_iter()
            .map(|post| {
                let mut comments: Vec<Comment> = tables
                    .comments
                    .iter()
                    .filter(|comment| comment.post_id == post.id)
                    .cloned()
                    .collect();
                comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
                PostWithComments { post, comments }
            })
            .collect())
    }

    async fn search_posts(&self, query: &str) -> Result<Vec<PostWithTags>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let needle = query.to_lowercase();
        let posts = tables
            .newest_first()
            .into_iter()
            .filter(|post| {
                post.title.to_lowercase().contains(&needle)
                    || post.content.to_lowercase().contains(&needle)
            })
            .collect();
        Ok(tables.with_tags(posts))
    }

    async fn posts_by_tags(&self, tags: &[String]) -> Result<Vec<PostWithTags>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let posts = tables
            .newest_first()
            .into_iter()
            .filter(|post| {
                tables
                    .tags_of(post.id)
                    .iter()
                    .any(|tag| tags.contains(&tag.name))
            })
            .collect();
        Ok(tables.with_tags(posts))
    }

    async fn get_post(&self, post_id: i32) -> Result<Option<PostDetail>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let Some(post) = tables.posts.iter().find(|post| post.id == post_id).cloned() else {
            return Ok(None);
        };

        let authors: HashMap<i32, &User> = tables.users.iter().map(|user| (user.id, user)).collect();
        let mut comments: Vec<CommentWithAuthor> = tables
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .filter_map(|comment| {
                let author = authors.get(&comment.user_id)?;
                Some(CommentWithAuthor {
                    comment: comment.clone(),
                    user: CommentAuthor {
                        id: author.id,
                        first_name: author.first_name.clone(),
                        last_name: author.last_name.clone(),
                        avatar: author.avatar.clone(),
                    },
                })
            })
            .collect();
        comments.sort_by(|a, b| {
            b.comment
                .created_at
                .cmp(&a.comment.created_at)
                .then(b.comment.id.cmp(&a.comment.id))
        });

        Ok(Some(PostDetail { post, comments }))
    }

    async fn create_post(
        &self,
        user_id: i32,
        title: &str,
        content: &str,
        tags: &[String],
    ) -> Result<PostWithTags, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let post = Post {
            id: Tables::next_id(&tables.posts, |post| post.id),
            title: title.to_string(),
            content: content.to_string(),
            user_id,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.posts.push(post.clone());

        let tags = tags
            .iter()
            .map(|name| Self::attach_tag(&mut tables, post.id, name))
            .collect();

        Ok(PostWithTags { post, tags })
    }

    async fn update_post(
        &self,
        post_id: i32,
        changes: &PostChanges,
    ) -> Result<Option<Post>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .posts
            .iter_mut()
            .find(|post| post.id == post_id)
            .map(|post| {
                post.title = changes.title.clone();
                post.content = changes.content.clone();
                post.clone()
            }))
    }

    async fn delete_post(&self, post_id: i32) -> Result<Option<Post>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(index) = tables.posts.iter().position(|post| post.id == post_id) else {
            return Ok(None);
        };
        tables.post_tags.retain(|(post, _)| *post != post_id);
        tables.comments.retain(|comment| comment.post_id != post_id);
        Ok(Some(tables.posts.remove(index)))
    }
}

/// A store whose every call fails as if the connection pool were exhausted.
pub struct UnavailableStore;

#[async_trait]
impl CandidateStore for UnavailableStore {
    async fn list_applicants(&self) -> Result<Vec<UserWithApplicant>, StoreError> {
        Err(StoreError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn find_applicants_with_skill(
        &self,
        _skill: &str,
    ) -> Result<Vec<UserWithApplicant>, StoreError> {
        Err(StoreError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn find_applicant(&self, _user_id: i32) -> Result<Option<UserWithApplicant>, StoreError> {
        Err(StoreError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn find_user(&self, _user_id: i32) -> Result<Option<UserWithApplicant>, StoreError> {
        Err(StoreError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn list_applications(
        &self,
        _vacancy_id: i32,
        _status: Option<ApplicationStatus>,
    ) -> Result<Option<Vec<ApplicationRecord>>, StoreError> {
        Err(StoreError::Db(sqlx::Error::PoolClosed))
    }

    async fn update_application_status(
        &self,
        _applicant_id: i32,
        _vacancy_id: i32,
        _status: ApplicationStatus,
    ) -> Result<u64, StoreError> {
        Err(StoreError::Db(sqlx::Error::PoolTimedOut))
    }
}

/// A store whose every call hangs, so only the call timeout can end it.
pub struct StalledStore;

#[async_trait]
impl CandidateStore for StalledStore {
    async fn list_applicants(&self) -> Result<Vec<UserWithApplicant>, StoreError> {
        std::future::pending().await
    }

    async fn find_applicants_with_skill(
        &self,
        _skill: &str,
    ) -> Result<Vec<UserWithApplicant>, StoreError> {
        std::future::pending().await
    }

    async fn find_applicant(&self, _user_id: i32) -> Result<Option<UserWithApplicant>, StoreError> {
        std::future::pending().await
    }

    async fn find_user(&self, _user_id: i32) -> Result<Option<UserWithApplicant>, StoreError> {
        std::future::pending().await
    }

    async fn list_applications(
        &self,
        _vacancy_id: i32,
        _status: Option<ApplicationStatus>,
    ) -> Result<Option<Vec<ApplicationRecord>>, StoreError> {
        std::future::pending().await
    }

    async fn update_application_status(
        &self,
        _applicant_id: i32,
        _vacancy_id: i32,
        _status: ApplicationStatus,
    ) -> Result<u64, StoreError> {
        std::future::pending().await
    }
}

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub emailer: Arc<MockEmailer>,
    pub client: reqwest::Client,
    jwt: JwtService,
}

impl TestApp {
    /// A valid bearer token for `user_id`
    pub fn token_for(&self, user_id: i32) -> String {
        self.jwt.issue_access_token(user_id).unwrap()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    pub async fn get_authed(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(self.token_for(1))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

async fn serve(state: AppState) -> String {
    init_tracing_once();

    // Randomly choose an available port
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, talentboard::router(state)).await.unwrap();
    });

    format!("http://127.0.0.1:{port}")
}

/// Spawns the application over an empty in-memory store.
///
/// Returned address format: `http://127.0.0.1:8492`
pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let emailer = Arc::new(MockEmailer::new());

    let state = AppState::new(
        store.clone(),
        store.clone(),
        emailer.clone(),
        JwtService::from_secret(JWT_SECRET),
        FRONTEND_URL.to_string(),
    );
    let address = serve(state).await;

    TestApp {
        address,
        store,
        emailer,
        client: reqwest::Client::new(),
        jwt: JwtService::from_secret(JWT_SECRET),
    }
}

/// Spawns the application with a candidate store that is always unavailable.
pub async fn spawn_unavailable_app() -> TestApp {
    spawn_app_with_candidate_store(Arc::new(UnavailableStore)).await
}

/// Spawns the application with a candidate store that never answers.
pub async fn spawn_stalled_app() -> TestApp {
    spawn_app_with_candidate_store(Arc::new(StalledStore)).await
}

async fn spawn_app_with_candidate_store(candidate_store: Arc<dyn CandidateStore>) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let emailer = Arc::new(MockEmailer::new());

    let state = AppState::new(
        candidate_store,
        store.clone(),
        emailer.clone(),
        JwtService::from_secret(JWT_SECRET),
        FRONTEND_URL.to_string(),
    );
    let address = serve(state).await;

    TestApp {
        address,
        store,
        emailer,
        client: reqwest::Client::new(),
        jwt: JwtService::from_secret(JWT_SECRET),
    }
}

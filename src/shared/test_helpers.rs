//! Shared fixtures for unit and HTTP-level tests.
//!
//! The in-memory repositories mirror the Postgres ones closely enough for
//! workflow tests: unique username/email, newest-first listings, feedback
//! only replaced when given.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use uuid::Uuid;

use crate::app::{create_app, AppServices};
use crate::core::config::{
    AppConfig, ArticleConfig, AuthConfig, Config, DatabaseConfig, StorageConfig, SwaggerConfig,
};
use crate::core::error::{AppError, Result};
use crate::features::articles::handlers::ArticleState;
use crate::features::articles::models::{
    Article, ArticleFilter, ArticleStatus, FileType, NewArticle,
};
use crate::features::articles::policy::StatusPolicy;
use crate::features::articles::repositories::ArticleRepository;
use crate::features::articles::services::{ArticleService, ArticleUpload};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::{AuthService, TokenService};
use crate::features::users::{NewUser, Role, User, UserRepository};
use crate::modules::storage::{
    FallbackStorage, LocalStore, StorageBackend, UploadPolicy,
};

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret-that-is-at-least-32-bytes-long".to_string(),
        jwt_expiry: Duration::from_secs(3600),
        jwt_leeway: Duration::from_secs(0),
    }
}

/// A request identity with a fresh id
pub fn authenticated_user(role: Role) -> AuthenticatedUser {
    let id = Uuid::new_v4();
    let short = id.simple().to_string()[..8].to_string();
    AuthenticatedUser {
        id,
        username: format!("{}-{}", role, short),
        email: format!("{}-{}@example.com", role, short),
        role,
        created_at: Utc::now(),
    }
}

pub fn sample_article(owner: Uuid) -> Article {
    let now = Utc::now();
    Article {
        id: Uuid::new_v4(),
        title: "Sample".to_string(),
        author: "A. Writer".to_string(),
        description: "A sample article".to_string(),
        status: ArticleStatus::Pending,
        file_url: "/uploads/1700000000000-1-sample.pdf".to_string(),
        file_type: FileType::Pdf,
        submitted_by: owner,
        submitter_username: "owner".to_string(),
        submitter_email: "owner@example.com".to_string(),
        feedback: String::new(),
        created_at: now,
        updated_at: now,
    }
}

/// A PDF-looking upload of `size` bytes
pub fn pdf_upload(size: usize) -> ArticleUpload {
    let mut data = b"%PDF-1.4\n".to_vec();
    data.resize(size.max(data.len()), b'0');
    ArticleUpload {
        data,
        file_name: "paper.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        file_type: FileType::Pdf,
    }
}

/// Remote store stand-in that is always unreachable
pub struct FailingBackend;

#[async_trait]
impl StorageBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn put(&self, _file_name: &str, _data: &[u8], _content_type: &str) -> Result<String> {
        Err(AppError::Storage("connection refused".to_string()))
    }

    async fn remove(&self, _url: &str) -> Result<bool> {
        Err(AppError::Storage("connection refused".to_string()))
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn remove(&self, id: Uuid) {
        self.users.lock().unwrap().retain(|u| u.id != id);
    }

    fn get(&self, id: Uuid) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(AppError::Validation(
                "Username or email is already registered".to_string(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryArticleRepository {
    /// Insertion order, oldest first
    articles: Mutex<Vec<Article>>,
    submitters: Mutex<HashMap<Uuid, (String, String)>>,
    users: Option<Arc<InMemoryUserRepository>>,
    fail_next_create: AtomicBool,
}

impl InMemoryArticleRepository {
    /// Resolve submitters from a user repository, like the SQL join does
    pub fn with_users(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            users: Some(users),
            ..Self::default()
        }
    }

    pub fn register_user(&self, user: &AuthenticatedUser) {
        self.submitters
            .lock()
            .unwrap()
            .insert(user.id, (user.username.clone(), user.email.clone()));
    }

    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.articles.lock().unwrap().len()
    }

    fn submitter(&self, id: Uuid) -> Option<(String, String)> {
        if let Some(user) = self.users.as_ref().and_then(|users| users.get(id)) {
            return Some((user.username, user.email));
        }
        self.submitters.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn list(
        &self,
        filter: ArticleFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Article>, i64)> {
        let articles = self.articles.lock().unwrap();
        let matching: Vec<&Article> = articles
            .iter()
            .rev()
            .filter(|a| filter.matches(a))
            .collect();

        let page = matching
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|a| (*a).clone())
            .collect();
        Ok((page, matching.len() as i64))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>> {
        Ok(self
            .articles
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn create(&self, article: NewArticle) -> Result<Article> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(AppError::Internal("simulated insert failure".to_string()));
        }

        let (username, email) = self.submitter(article.submitted_by).ok_or_else(|| {
            AppError::Internal("submitted_by references an unknown user".to_string())
        })?;

        let now = Utc::now();
        let article = Article {
            id: Uuid::new_v4(),
            title: article.title,
            author: article.author,
            description: article.description,
            status: ArticleStatus::Pending,
            file_url: article.file_url,
            file_type: article.file_type,
            submitted_by: article.submitted_by,
            submitter_username: username,
            submitter_email: email,
            feedback: String::new(),
            created_at: now,
            updated_at: now,
        };
        self.articles.lock().unwrap().push(article.clone());
        Ok(article)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ArticleStatus,
        feedback: Option<&str>,
    ) -> Result<Option<Article>> {
        let mut articles = self.articles.lock().unwrap();
        let Some(article) = articles.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };

        article.status = status;
        if let Some(feedback) = feedback {
            article.feedback = feedback.to_string();
        }
        article.updated_at = Utc::now();
        Ok(Some(article.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut articles = self.articles.lock().unwrap();
        let before = articles.len();
        articles.retain(|a| a.id != id);
        Ok(articles.len() < before)
    }
}

pub fn test_config(upload_dir: &Path) -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            cors_allowed_origins: vec!["*".to_string()],
            seed_default_users: false,
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout_secs: 1,
            idle_timeout_secs: 1,
            max_lifetime_secs: 1,
        },
        auth: test_auth_config(),
        swagger: SwaggerConfig {
            username: None,
            password: None,
            title: "Article Review API".to_string(),
            version: "0.1.0".to_string(),
            description: "test".to_string(),
        },
        storage: StorageConfig {
            max_file_size: 64 * 1024,
            upload_dir: upload_dir.to_path_buf(),
        },
        minio: None,
        articles: ArticleConfig {
            status_policy: StatusPolicy::Open,
        },
    }
}

/// Full router over in-memory repositories, with an unreachable remote store
/// in front of a local store rooted at `upload_dir`
pub struct TestApp {
    pub server: TestServer,
    pub users: Arc<InMemoryUserRepository>,
    pub articles: Arc<InMemoryArticleRepository>,
}

impl TestApp {
    pub async fn new(upload_dir: &Path) -> Self {
        Self::with_config(test_config(upload_dir)).await
    }

    pub async fn with_config(config: Config) -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let tokens = Arc::new(TokenService::new(&config.auth));
        let auth = Arc::new(AuthService::new(users.clone(), tokens));
        auth.seed_default_users().await.unwrap();

        let articles = Arc::new(InMemoryArticleRepository::with_users(users.clone()));
        let storage = Arc::new(FallbackStorage::new(vec![
            Arc::new(FailingBackend),
            Arc::new(LocalStore::new(config.storage.upload_dir.clone())),
        ]));
        let article_state = Arc::new(ArticleState {
            service: ArticleService::new(
                articles.clone(),
                storage,
                config.articles.status_policy,
            ),
            upload_policy: UploadPolicy::new(config.storage.max_file_size),
        });

        let router = create_app(
            &config,
            AppServices {
                auth,
                articles: article_state,
            },
        );

        Self {
            server: TestServer::new(router).unwrap(),
            users,
            articles,
        }
    }
}

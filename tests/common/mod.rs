//! Shared fixtures: an in-memory repository, a scripted enricher and request helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use user_enrichment_api::config::{Config, EnrichmentUrls};
use user_enrichment_api::enrichment::Enricher;
use user_enrichment_api::errors::AppError;
use user_enrichment_api::handlers::AppState;
use user_enrichment_api::models::{Enriched, NewUser, User, UserFilter};
use user_enrichment_api::repository::UserRepository;
use user_enrichment_api::routes::build_router;

pub fn create_test_config() -> Config {
    Config {
        database_url: "postgresql://test".to_string(),
        port: 8080,
        enrichment_urls: EnrichmentUrls::default(),
        enrichment_timeout_secs: 5,
        max_page_limit: 100,
    }
}

/// Vec-backed repository with the same visibility rules as the SQL one.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    next_id: AtomicUsize,
    pub fail: bool,
    /// Fails only `save`, so a lookup can succeed before the write breaks.
    pub fail_on_save: bool,
}

impl InMemoryUserRepository {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn failing_on_save() -> Self {
        Self {
            fail_on_save: true,
            ..Default::default()
        }
    }

    pub fn seed(&self, name: &str, age: i32, gender: &str, nationality: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            name: name.to_string(),
            surname: "Fixture".to_string(),
            age,
            gender: gender.to_string(),
            nationality: nationality.to_string(),
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn live(&self) -> Vec<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.deleted_at.is_none())
            .cloned()
            .collect()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        self.check()?;
        let now = Utc::now();
        let stored = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            name: user.name,
            surname: user.surname,
            age: user.age,
            gender: user.gender,
            nationality: user.nationality,
        };
        self.users.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> Result<User, AppError> {
        self.check()?;
        self.live()
            .into_iter()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    async fn save(&self, user: &User) -> Result<User, AppError> {
        self.check()?;
        if self.fail_on_save {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        let mut users = self.users.lock().unwrap();
        let stored = users
            .iter_mut()
            .find(|u| u.id == user.id && u.deleted_at.is_none())
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user.id)))?;
        stored.name = user.name.clone();
        stored.surname = user.surname.clone();
        stored.age = user.age;
        stored.gender = user.gender.clone();
        stored.nationality = user.nationality.clone();
        Ok(stored.clone())
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64, AppError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        match users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
        {
            Some(user) => {
                user.deleted_at = Some(Utc::now());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn list_by_filter(
        &self,
        filter: &UserFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, AppError> {
        self.check()?;
        Ok(self
            .live()
            .into_iter()
            .filter(|u| filter.matches(u))
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

/// Enricher returning a fixed answer (or failing), counting its calls.
pub struct StubEnricher {
    pub response: Option<Enriched>,
    pub calls: AtomicUsize,
    names: Mutex<Vec<String>>,
}

impl StubEnricher {
    pub fn returning(age: i32, gender: &str, nationality: &str) -> Self {
        Self {
            response: Some(Enriched {
                age,
                gender: gender.to_string(),
                nationality: nationality.to_string(),
            }),
            calls: AtomicUsize::new(0),
            names: Mutex::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            calls: AtomicUsize::new(0),
            names: Mutex::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Names passed to `enrich`, in call order.
    pub fn names(&self) -> Vec<String> {
        self.names.lock().unwrap().clone()
    }
}

#[async_trait]
impl Enricher for StubEnricher {
    async fn enrich(&self, name: &str) -> Result<Enriched, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.names.lock().unwrap().push(name.to_string());
        self.response
            .clone()
            .ok_or_else(|| AppError::ExternalApiError("stub lookup failed".to_string()))
    }
}

pub fn app(repo: Arc<InMemoryUserRepository>, enricher: Arc<StubEnricher>) -> Router {
    build_router(Arc::new(AppState {
        repo,
        enricher,
        config: create_test_config(),
    }))
}

/// Sends a request through the router and returns status plus parsed JSON body
/// (`Value::Null` when the body is empty or not JSON).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

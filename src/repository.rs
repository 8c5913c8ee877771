use crate::errors::{AppError, ResultExt};
use crate::models::{NewUser, User, UserFilter};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

const USER_COLUMNS: &str =
    "id, created_at, updated_at, deleted_at, name, surname, age, gender, nationality";

/// Persistence operations the handlers need.
///
/// Soft-deleted rows are invisible to every operation.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; storage assigns id and timestamps.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;
    /// Load a user by id. `AppError::NotFound` when absent.
    async fn get_by_id(&self, id: i64) -> Result<User, AppError>;
    /// Persist the business fields of an existing user. `AppError::NotFound` when absent.
    async fn save(&self, user: &User) -> Result<User, AppError>;
    /// Delete by id. Returns the number of rows affected; 0 means not found.
    async fn delete_by_id(&self, id: i64) -> Result<u64, AppError>;
    /// Users matching every constraint of `filter`, ordered by id.
    async fn list_by_filter(
        &self,
        filter: &UserFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, AppError>;
}

/// PostgreSQL-backed repository over the `users` table.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, surname, age, gender, nationality)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.name)
        .bind(&user.surname)
        .bind(user.age)
        .bind(&user.gender)
        .bind(&user.nationality)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert user")?;

        tracing::debug!("Inserted user {}", created.id);
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to load user {}", id))?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    async fn save(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET name = $1, surname = $2, age = $3, gender = $4, nationality = $5,
                 updated_at = now()
             WHERE id = $6 AND deleted_at IS NULL
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.name)
        .bind(&user.surname)
        .bind(user.age)
        .bind(&user.gender)
        .bind(&user.nationality)
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to update user {}", user.id))?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user.id)))
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to delete user {}", id))?;

        Ok(result.rows_affected())
    }

    async fn list_by_filter(
        &self,
        filter: &UserFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, AppError> {
        let mut query = list_query(filter, limit, offset);
        let users = query
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list users")?;

        Ok(users)
    }
}

/// Builds the list statement; one `AND` clause per present constraint.
pub fn list_query(filter: &UserFilter, limit: i64, offset: i64) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {} FROM users WHERE deleted_at IS NULL",
        USER_COLUMNS
    ));

    if let Some(gender) = &filter.gender {
        query.push(" AND gender = ").push_bind(gender.clone());
    }
    if let Some(nationality) = &filter.nationality {
        query.push(" AND nationality = ").push_bind(nationality.clone());
    }
    if let Some(age_min) = filter.age_min {
        query.push(" AND age >= ").push_bind(age_min);
    }
    if let Some(age_max) = filter.age_max {
        query.push(" AND age <= ").push_bind(age_max);
    }

    query
        .push(" ORDER BY id ASC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    query
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

// ============ Database Models ============

/// A stored person, enriched with inferred age, gender and nationality.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Identifier assigned by storage on creation.
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the user has been deleted; deleted users are never returned.
    pub deleted_at: Option<DateTime<Utc>>,
    pub name: String,
    pub surname: String,
    pub age: i32,
    pub gender: String,
    /// ISO country code of the most probable nationality, or empty.
    pub nationality: String,
}

/// A user ready to be inserted. Identity and timestamps are assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub age: i32,
    pub gender: String,
    pub nationality: String,
}

impl NewUser {
    pub fn from_enriched(name: String, surname: String, enriched: Enriched) -> Self {
        Self {
            name,
            surname,
            age: enriched.age,
            gender: enriched.gender,
            nationality: enriched.nationality,
        }
    }
}

// ============ Enrichment ============

/// Result of the three name-inference lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enriched {
    pub age: i32,
    pub gender: String,
    pub nationality: String,
}

/// `GET {age_url}` response, e.g. `{"count": 21, "name": "alice", "age": 34}`.
#[derive(Debug, Default, Deserialize)]
pub struct AgeResponse {
    #[serde(default)]
    pub age: Option<i32>,
}

/// `GET {gender_url}` response, e.g. `{"name": "alice", "gender": "female", "probability": 0.98}`.
#[derive(Debug, Default, Deserialize)]
pub struct GenderResponse {
    #[serde(default)]
    pub gender: Option<String>,
}

/// `GET {nationality_url}` response; candidates are ordered by probability.
#[derive(Debug, Default, Deserialize)]
pub struct NationalityResponse {
    #[serde(default)]
    pub country: Vec<CountryCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryCandidate {
    pub country_id: String,
    #[serde(default)]
    pub probability: f64,
}

// ============ Query / Filter ============

/// Conjunctive constraints applied to a list query. `None` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
}

impl UserFilter {
    /// True when `user` satisfies every present constraint.
    pub fn matches(&self, user: &User) -> bool {
        self.gender.as_deref().map_or(true, |g| user.gender == g)
            && self
                .nationality
                .as_deref()
                .map_or(true, |n| user.nationality == n)
            && self.age_min.map_or(true, |min| user.age >= min)
            && self.age_max.map_or(true, |max| user.age <= max)
    }

    pub fn is_empty(&self) -> bool {
        *self == UserFilter::default()
    }
}

/// Resolved page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
}

// ============ API Request Models ============

/// Raw list query. Every value stays a string so that malformed numbers can be
/// ignored instead of rejected. Built by `ListUsersQuery::from_raw`.
#[derive(Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Page number, 1-based (default 1)
    pub page: Option<String>,
    /// Page size (default 10)
    pub limit: Option<String>,
    /// Inclusive minimum age
    pub age_min: Option<String>,
    /// Inclusive maximum age
    pub age_max: Option<String>,
    /// Exact gender
    pub gender: Option<String>,
    /// Exact nationality code
    pub nationality: Option<String>,
}

/// `?id=` on update and delete.
#[derive(Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IdQuery {
    /// User id
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
}

/// Full user body for updates. `id` and timestamps, if sent, are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub age: i32,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub nationality: String,
}

impl UpdateUserRequest {
    /// Overwrites the business fields of `user`, leaving identity and timestamps alone.
    pub fn apply_to(self, user: &mut User) {
        user.name = self.name;
        user.surname = self.surname;
        user.age = self.age;
        user.gender = self.gender;
        user.nationality = self.nationality;
    }
}

// ============ API Response Models ============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteUserResponse {
    pub message: String,
    pub id: i64,
}

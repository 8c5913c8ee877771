//! Translation of raw list query parameters into a typed filter and page window.
//!
//! Parsing is permissive: a malformed number never fails the request, it is
//! treated as if the parameter had not been sent.

use crate::models::{IdQuery, ListUsersQuery, Paging, UserFilter};
use std::collections::HashMap;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Builds a filter from raw values. Empty strings mean "no constraint".
pub fn build_filter(
    gender: Option<&str>,
    nationality: Option<&str>,
    age_min: Option<&str>,
    age_max: Option<&str>,
) -> UserFilter {
    UserFilter {
        gender: non_empty(gender).map(str::to_string),
        nationality: non_empty(nationality).map(str::to_string),
        age_min: non_empty(age_min).and_then(|v| v.parse::<i32>().ok()),
        age_max: non_empty(age_max).and_then(|v| v.parse::<i32>().ok()),
    }
}

/// Resolves page and limit, falling back to defaults on absent, invalid or
/// non-positive values. `limit` is capped at `max_limit`.
pub fn resolve_paging(page: Option<&str>, limit: Option<&str>, max_limit: i64) -> Paging {
    let page = positive_or(page, DEFAULT_PAGE);
    let limit = positive_or(limit, DEFAULT_LIMIT).min(max_limit.max(1));

    Paging {
        page,
        limit,
        offset: (page - 1).saturating_mul(limit),
    }
}

/// Decodes a raw query string. A repeated key keeps its first value; no input
/// is ever rejected.
pub fn first_values(raw: Option<&str>) -> HashMap<String, String> {
    let mut values = HashMap::new();
    if let Some(raw) = raw {
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            values
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
    }
    values
}

impl ListUsersQuery {
    pub fn from_raw(raw: Option<&str>) -> Self {
        let mut values = first_values(raw);
        Self {
            page: values.remove("page"),
            limit: values.remove("limit"),
            age_min: values.remove("age_min"),
            age_max: values.remove("age_max"),
            gender: values.remove("gender"),
            nationality: values.remove("nationality"),
        }
    }

    pub fn filter(&self) -> UserFilter {
        build_filter(
            self.gender.as_deref(),
            self.nationality.as_deref(),
            self.age_min.as_deref(),
            self.age_max.as_deref(),
        )
    }

    pub fn paging(&self, max_limit: i64) -> Paging {
        resolve_paging(self.page.as_deref(), self.limit.as_deref(), max_limit)
    }
}

impl IdQuery {
    pub fn from_raw(raw: Option<&str>) -> Self {
        Self {
            id: first_values(raw).remove("id"),
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|v| !v.is_empty())
}

fn positive_or(raw: Option<&str>, default: i64) -> i64 {
    non_empty(raw)
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

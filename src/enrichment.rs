/// Name enrichment via external inference APIs
///
/// For a first name this module performs, in order:
/// 1. Age lookup (agify-style)
/// 2. Gender lookup (genderize-style)
/// 3. Nationality lookup (nationalize-style), reduced to the top candidate
///
/// The first failing lookup aborts the sequence. Nothing is cached or retried.
use crate::config::{Config, EnrichmentUrls, NAME_PLACEHOLDER};
use crate::errors::{AppError, ResultExt};
use crate::models::{AgeResponse, Enriched, GenderResponse, NationalityResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

/// Source of inferred demographics for a first name.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Enriches `name`. The caller guarantees `name` is non-empty.
    async fn enrich(&self, name: &str) -> Result<Enriched, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Age,
    Gender,
    Nationality,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKind::Age => write!(f, "age"),
            LookupKind::Gender => write!(f, "gender"),
            LookupKind::Nationality => write!(f, "nationality"),
        }
    }
}

/// Enricher backed by three HTTP JSON endpoints.
#[derive(Clone)]
pub struct HttpEnricher {
    client: Client,
    urls: EnrichmentUrls,
}

impl HttpEnricher {
    /// Creates a new `HttpEnricher` whose requests are bounded by `timeout`.
    pub fn new(urls: EnrichmentUrls, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AppError::InternalError(format!("Failed to create enrichment client: {}", e))
        })?;

        Ok(Self { client, urls })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.enrichment_urls.clone(),
            Duration::from_secs(config.enrichment_timeout_secs),
        )
    }

    fn template(&self, kind: LookupKind) -> &str {
        match kind {
            LookupKind::Age => &self.urls.age,
            LookupKind::Gender => &self.urls.gender,
            LookupKind::Nationality => &self.urls.nationality,
        }
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        kind: LookupKind,
        name: &str,
    ) -> Result<T, AppError> {
        let url = render_url(self.template(kind), name);
        tracing::debug!("Fetching {} lookup: {}", kind, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(AppError::from)
            .with_context(|| format!("{} lookup request failed", kind))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "{} lookup returned status {}: {}",
                kind, status, error_text
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(AppError::from)
            .with_context(|| format!("Failed to parse {} lookup response", kind))
    }
}

#[async_trait]
impl Enricher for HttpEnricher {
    async fn enrich(&self, name: &str) -> Result<Enriched, AppError> {
        let age: AgeResponse = self.fetch_json(LookupKind::Age, name).await?;
        let gender: GenderResponse = self.fetch_json(LookupKind::Gender, name).await?;
        let nationality: NationalityResponse =
            self.fetch_json(LookupKind::Nationality, name).await?;

        let enriched = Enriched {
            age: age.age.unwrap_or_default(),
            gender: gender.gender.unwrap_or_default(),
            nationality: top_nationality(&nationality),
        };

        tracing::info!(
            "Enriched '{}': age={}, gender='{}', nationality='{}'",
            name,
            enriched.age,
            enriched.gender,
            enriched.nationality
        );
        Ok(enriched)
    }
}

/// Substitutes the percent-encoded name into a URL template.
pub fn render_url(template: &str, name: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
    template.replace(NAME_PLACEHOLDER, &encoded)
}

/// First candidate wins; upstream lists candidates by descending probability.
pub fn top_nationality(response: &NationalityResponse) -> String {
    response
        .country
        .first()
        .map(|c| c.country_id.clone())
        .unwrap_or_default()
}

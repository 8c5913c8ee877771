use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_AGE_URL: &str = "https://api.agify.io/?name={name}";
pub const DEFAULT_GENDER_URL: &str = "https://api.genderize.io/?name={name}";
pub const DEFAULT_NATIONALITY_URL: &str = "https://api.nationalize.io/?name={name}";

/// Placeholder substituted with the (percent-encoded) first name.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// URL templates for the three name-inference lookups.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EnrichmentUrls {
    pub age: String,
    pub gender: String,
    pub nationality: String,
}

impl Default for EnrichmentUrls {
    fn default() -> Self {
        Self {
            age: DEFAULT_AGE_URL.to_string(),
            gender: DEFAULT_GENDER_URL.to_string(),
            nationality: DEFAULT_NATIONALITY_URL.to_string(),
        }
    }
}

/// Shape of the optional YAML file:
///
/// ```yaml
/// url:
///   age: "https://api.agify.io/?name={name}"
///   gender: "https://api.genderize.io/?name={name}"
///   nationality: "https://api.nationalize.io/?name={name}"
/// ```
#[derive(Debug, Default, Deserialize)]
struct EnrichmentFile {
    #[serde(default)]
    url: EnrichmentFileUrls,
}

#[derive(Debug, Default, Deserialize)]
struct EnrichmentFileUrls {
    age: Option<String>,
    gender: Option<String>,
    nationality: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub enrichment_urls: EnrichmentUrls,
    pub enrichment_timeout_secs: u64,
    pub max_page_limit: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Precedence for URL templates is: variable, then YAML file, then default.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_urls = match lookup("ENRICHMENT_CONFIG") {
            Some(path) => load_enrichment_file(Path::new(&path))?,
            None if Path::new("config.yaml").exists() => {
                load_enrichment_file(Path::new("config.yaml"))?
            }
            None => EnrichmentFileUrls::default(),
        };
        let defaults = EnrichmentUrls::default();

        let enrichment_urls = EnrichmentUrls {
            age: lookup("AGE_API_URL")
                .or(file_urls.age)
                .unwrap_or(defaults.age),
            gender: lookup("GENDER_API_URL")
                .or(file_urls.gender)
                .unwrap_or(defaults.gender),
            nationality: lookup("NATIONALITY_API_URL")
                .or(file_urls.nationality)
                .unwrap_or(defaults.nationality),
        };
        validate_url_template("AGE_API_URL", &enrichment_urls.age)?;
        validate_url_template("GENDER_API_URL", &enrichment_urls.gender)?;
        validate_url_template("NATIONALITY_API_URL", &enrichment_urls.nationality)?;

        let config = Self {
            database_url: lookup("DATABASE_URL")
                .or_else(|| lookup("DBurl"))
                .ok_or_else(|| {
                    anyhow::anyhow!("DATABASE_URL (or DBurl) environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DATABASE_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            enrichment_urls,
            enrichment_timeout_secs: lookup("ENRICHMENT_TIMEOUT_SECS")
                .unwrap_or_else(|| "10".to_string())
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    anyhow::anyhow!("ENRICHMENT_TIMEOUT_SECS must be a positive number of seconds")
                })?,
            max_page_limit: lookup("MAX_PAGE_LIMIT")
                .unwrap_or_else(|| "100".to_string())
                .parse::<i64>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or_else(|| anyhow::anyhow!("MAX_PAGE_LIMIT must be a positive integer"))?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Database URL: {}", redact_database_url(&config.database_url));
        tracing::debug!("Age lookup: {}", config.enrichment_urls.age);
        tracing::debug!("Gender lookup: {}", config.enrichment_urls.gender);
        tracing::debug!("Nationality lookup: {}", config.enrichment_urls.nationality);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn load_enrichment_file(path: &Path) -> anyhow::Result<EnrichmentFileUrls> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        anyhow::anyhow!("Could not read enrichment config {}: {}", path.display(), e)
    })?;
    let parsed: EnrichmentFile = serde_yaml::from_str(&raw).map_err(|e| {
        anyhow::anyhow!("Could not parse enrichment config {}: {}", path.display(), e)
    })?;
    tracing::info!("Loaded enrichment URL templates from {}", path.display());
    Ok(parsed.url)
}

/// A template must be an absolute http(s) URL carrying the `{name}` placeholder.
/// Strips credentials and query from a database URL so it can be logged.
pub fn redact_database_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default();
            match url.port() {
                Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
                None => format!("{}://{}{}", url.scheme(), host, url.path()),
            }
        }
        Err(_) => "<unparseable>".to_string(),
    }
}

pub fn validate_url_template(var: &str, template: &str) -> anyhow::Result<()> {
    if template.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", var);
    }
    if !template.starts_with("http://") && !template.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", var);
    }
    if !template.contains(NAME_PLACEHOLDER) {
        anyhow::bail!("{} must contain the {} placeholder", var, NAME_PLACEHOLDER);
    }
    url::Url::parse(&template.replace(NAME_PLACEHOLDER, "name"))
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", var, e))?;
    Ok(())
}

use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";
const DEFAULT_GENAI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub cors: CorsConfig,
    pub genai: GenaiConfig,
    pub image_cache: ImageCacheConfig,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins; a single `*` allows any origin.
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

#[derive(Debug, Clone)]
pub struct GenaiConfig {
    /// Missing keys are reported per request, not at startup.
    pub api_key: Option<Secret<String>>,
    pub image_model: String,
    pub api_base: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ImageCacheConfig {
    pub max_capacity: u64,
    /// Evict entries not read for this long. `None` keeps them until capacity eviction.
    pub time_to_idle: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<Secret<String>>,
    pub from_email: String,
    pub from_name: String,
    /// Fixed destination for contact-form mail.
    pub recipient: String,
}

impl StudioConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let from_email = get_env("SMTP_FROM_EMAIL", Some("noreply@example.com"), is_prod)?;

        Ok(StudioConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGO_URL", None, is_prod)?,
                database: get_env("DB_NAME", Some("studio_db"), is_prod)?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&get_env("CORS_ORIGINS", Some("*"), is_prod)?),
            },
            genai: GenaiConfig {
                api_key: get_optional_env("GOOGLE_API_KEY").map(Secret::new),
                image_model: get_env("GENAI_IMAGE_MODEL", Some(DEFAULT_IMAGE_MODEL), is_prod)?,
                api_base: get_env("GENAI_API_BASE", Some(DEFAULT_GENAI_API_BASE), is_prod)?,
                request_timeout: Duration::from_secs(
                    get_env("GENAI_REQUEST_TIMEOUT_SECS", Some("120"), is_prod)?
                        .parse()
                        .unwrap_or(120),
                ),
            },
            image_cache: ImageCacheConfig {
                max_capacity: parse_cache_capacity(&get_env(
                    "IMAGE_CACHE_CAPACITY",
                    Some("256"),
                    is_prod,
                )?)?,
                time_to_idle: match get_env("IMAGE_CACHE_TTI_SECS", Some("0"), is_prod)?
                    .parse::<u64>()
                    .unwrap_or(0)
                {
                    0 => None,
                    secs => Some(Duration::from_secs(secs)),
                },
            },
            smtp: SmtpConfig {
                host: get_env("SMTP_HOST", Some("smtp.gmail.com"), is_prod)?,
                port: get_env("SMTP_PORT", Some("587"), is_prod)?
                    .parse()
                    .unwrap_or(587),
                user: get_optional_env("SMTP_USER"),
                password: get_optional_env("SMTP_PASSWORD").map(Secret::new),
                from_name: get_env("SMTP_FROM_NAME", Some("Studio Website"), is_prod)?,
                recipient: get_env("CONTACT_RECIPIENT", Some(&from_email), is_prod)?,
                from_email,
            },
        })
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

/// Image cache capacity; zero would cache nothing and is refused.
pub fn parse_cache_capacity(raw: &str) -> Result<u64, AppError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(AppError::ConfigError(anyhow::anyhow!(
            "IMAGE_CACHE_CAPACITY must be at least 1"
        ))),
        Ok(capacity) => Ok(capacity),
        Err(e) => Err(AppError::ConfigError(anyhow::anyhow!(
            "IMAGE_CACHE_CAPACITY '{}' is not a valid count: {}",
            raw,
            e
        ))),
    }
}

fn get_optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::mail::RetryPolicy;

pub const DEFAULT_JWT_SECRET: &str = "weightlog-dev-secret-change-me";
pub const DEFAULT_BCRYPT_COST: u32 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is required when {reason}")]
    Missing { name: &'static str, reason: &'static str },
    #[error("{name} has invalid value `{value}`: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
    pub cors_allowed_origins: Vec<String>,
    pub enable_audit_log: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024,
            request_timeout: Duration::from_millis(5000),
            cors_allowed_origins: Vec::new(),
            enable_audit_log: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthConfig {
    #[serde(skip)]
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    /// Verification tokens never expire; only reset tokens do.
    pub reset_token_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl: Duration::from_secs(3600),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            reset_token_ttl: Duration::from_secs(24 * 3600),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MailTransport {
    Log,
    Http {
        endpoint: String,
        #[serde(skip)]
        bearer: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct MailConfig {
    pub sender: String,
    pub transport: MailTransport,
    pub retry: RetryPolicy,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: "Weight Tracker <noreply@weightlog.local>".to_string(),
            transport: MailTransport::Log,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_path: PathBuf,
    /// Base URL of the browser client, used to build email links.
    pub app_url: String,
    pub log_json: bool,
    pub shutdown_drain: Duration,
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            database_path: weightlog_core::default_database_path(),
            app_url: "http://localhost:3000".to_string(),
            log_json: true,
            shutdown_drain: Duration::from_millis(2000),
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn bool(&self, name: &str, default: bool) -> bool {
        self.string(name)
            .and_then(|v| match v.as_str() {
                "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
                "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
                _ => None,
            })
            .unwrap_or(default)
    }

    fn u64(&self, name: &'static str, default: u64) -> Result<u64, ConfigError> {
        match self.string(name) {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                name,
                value: raw,
                reason: "expected an unsigned integer",
            }),
        }
    }

    fn duration_ms(&self, name: &'static str, default_ms: u64) -> Result<Duration, ConfigError> {
        Ok(Duration::from_millis(self.u64(name, default_ms)?))
    }

    fn list(&self, name: &str) -> Vec<String> {
        self.string(name)
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads `WEIGHTLOG_*` settings through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);
        let defaults = Self::default();

        let bcrypt_cost = env.u64("WEIGHTLOG_BCRYPT_COST", u64::from(defaults.auth.bcrypt_cost))?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "WEIGHTLOG_BCRYPT_COST",
                value: bcrypt_cost.to_string(),
                reason: "must be between 4 and 31",
            });
        }

        let transport = match env.string("WEIGHTLOG_MAIL_TRANSPORT").as_deref() {
            None | Some("log") => MailTransport::Log,
            Some("http") => MailTransport::Http {
                endpoint: env.string("WEIGHTLOG_MAIL_HTTP_URL").ok_or(ConfigError::Missing {
                    name: "WEIGHTLOG_MAIL_HTTP_URL",
                    reason: "WEIGHTLOG_MAIL_TRANSPORT=http",
                })?,
                bearer: env.string("WEIGHTLOG_MAIL_HTTP_BEARER"),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "WEIGHTLOG_MAIL_TRANSPORT",
                    value: other.to_string(),
                    reason: "expected `log` or `http`",
                })
            }
        };

        Ok(Self {
            bind_addr: env.string("WEIGHTLOG_BIND").unwrap_or(defaults.bind_addr),
            database_path: env
                .string(weightlog_core::ENV_WEIGHTLOG_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            app_url: env
                .string("WEIGHTLOG_APP_URL")
                .unwrap_or(defaults.app_url)
                .trim_end_matches('/')
                .to_string(),
            log_json: env.bool("WEIGHTLOG_LOG_JSON", defaults.log_json),
            shutdown_drain: env.duration_ms("WEIGHTLOG_SHUTDOWN_DRAIN_MS", 2000)?,
            api: ApiConfig {
                max_body_bytes: env.u64("WEIGHTLOG_MAX_BODY_BYTES", 16 * 1024)? as usize,
                request_timeout: env.duration_ms("WEIGHTLOG_REQUEST_TIMEOUT_MS", 5000)?,
                cors_allowed_origins: env.list("WEIGHTLOG_CORS_ALLOWED_ORIGINS"),
                enable_audit_log: env.bool("WEIGHTLOG_ENABLE_AUDIT_LOG", true),
            },
            auth: AuthConfig {
                jwt_secret: env
                    .string("WEIGHTLOG_JWT_SECRET")
                    .unwrap_or(defaults.auth.jwt_secret),
                token_ttl: Duration::from_secs(env.u64("WEIGHTLOG_TOKEN_TTL_SECS", 3600)?),
                bcrypt_cost: bcrypt_cost as u32,
                reset_token_ttl: Duration::from_secs(
                    env.u64("WEIGHTLOG_RESET_TOKEN_TTL_SECS", 24 * 3600)?,
                ),
            },
            mail: MailConfig {
                sender: env
                    .string("WEIGHTLOG_MAIL_SENDER")
                    .unwrap_or(defaults.mail.sender),
                transport,
                retry: RetryPolicy {
                    max_attempts: env.u64("WEIGHTLOG_MAIL_RETRY_ATTEMPTS", 4)?.max(1) as usize,
                    base_backoff_ms: env.u64("WEIGHTLOG_MAIL_RETRY_BASE_MS", 120)?,
                },
            },
        })
    }

    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.auth.jwt_secret == DEFAULT_JWT_SECRET
    }
}

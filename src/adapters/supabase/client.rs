//! Shared Supabase HTTP client.
//!
//! Wraps a `reqwest::Client` with the project URL and keys, builds PostgREST
//! (`/rest/v1`) and GoTrue (`/auth/v1`) requests and maps failures into
//! `SupabaseError`.
//!
//! # Configuration
//!
//! ```ignore
//! let config = SupabaseConfig::new("https://xyz.supabase.co", anon_key)
//!     .with_timeout(Duration::from_secs(10));
//! let client = SupabaseClient::new(config)?;
//! ```

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;

use crate::domain::foundation::{AuthError, DomainError, ErrorCode};

/// Project URL and anon key shipped in unconfigured builds.
const PLACEHOLDER_URL: &str = "https://placeholder.supabase.co";
const PLACEHOLDER_ANON_KEY: &str = "public-anon-key";

/// PostgREST code for "no rows" on a single-object request.
pub(crate) const PGRST_NO_ROWS: &str = "PGRST116";

/// Postgres unique violation.
const PG_UNIQUE_VIOLATION: &str = "23505";

/// Connection settings for a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    anon_key: Secret<String>,
    /// Service role key. When set, data requests bypass row-level security.
    service_key: Option<Secret<String>>,
    pub timeout: Duration,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: Secret::new(anon_key.into()),
            service_key: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_service_key(mut self, key: impl Into<String>) -> Self {
        self.service_key = Some(Secret::new(key.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// False for empty or placeholder credentials.
    pub fn is_configured(&self) -> bool {
        let key = self.anon_key.expose_secret();
        !self.url.is_empty()
            && self.url != PLACEHOLDER_URL
            && !key.is_empty()
            && key != PLACEHOLDER_ANON_KEY
    }

    fn anon_key(&self) -> &str {
        self.anon_key.expose_secret()
    }
}

/// Errors from talking to Supabase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SupabaseError {
    #[error("Supabase is not configured")]
    NotConfigured,

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Supabase returned {status}: {message}")]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl SupabaseError {
    /// PostgREST reported that a single-object request matched no row.
    pub fn is_no_rows(&self) -> bool {
        matches!(self, SupabaseError::Status { code: Some(code), .. } if code == PGRST_NO_ROWS)
    }

    pub fn is_unique_violation(&self) -> bool {
        match self {
            SupabaseError::Status { status, code, .. } => {
                *status == StatusCode::CONFLICT.as_u16()
                    || code.as_deref() == Some(PG_UNIQUE_VIOLATION)
            }
            _ => false,
        }
    }
}

impl From<SupabaseError> for DomainError {
    fn from(err: SupabaseError) -> Self {
        let code = match &err {
            SupabaseError::NotConfigured => ErrorCode::NotConfigured,
            SupabaseError::Timeout(_) => ErrorCode::Timeout,
            SupabaseError::Connection(_) => ErrorCode::BackendUnavailable,
            SupabaseError::Decode(_) => ErrorCode::InternalError,
            SupabaseError::Status { .. } if err.is_unique_violation() => ErrorCode::Conflict,
            SupabaseError::Status { status, .. } => match *status {
                401 => ErrorCode::Unauthorized,
                403 => ErrorCode::Forbidden,
                500..=599 => ErrorCode::BackendUnavailable,
                _ => ErrorCode::DatabaseError,
            },
        };
        DomainError::new(code, err.to_string())
    }
}

impl From<SupabaseError> for AuthError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::NotConfigured => AuthError::NotConfigured,
            SupabaseError::Status { status: 401, .. } => AuthError::InvalidToken,
            SupabaseError::Status { status, message, .. } if (400..500).contains(&status) => {
                AuthError::SignUpRejected(message)
            }
            other => AuthError::service_unavailable(other.to_string()),
        }
    }
}

/// Error body shapes of PostgREST and GoTrue.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
}

impl ErrorBody {
    fn into_parts(self, raw: &str) -> (Option<String>, String) {
        let code = match self.code {
            Some(serde_json::Value::String(code)) => Some(code),
            Some(serde_json::Value::Number(code)) => Some(code.to_string()),
            _ => self.error_code,
        };
        let message = self
            .message
            .or(self.msg)
            .or(self.error_description)
            .unwrap_or_else(|| raw.to_string());
        (code, message)
    }
}

/// HTTP client for one Supabase project.
pub struct SupabaseClient {
    config: SupabaseConfig,
    http: Client,
    /// Access token of the signed-in user, sent on data requests when no
    /// service key is configured.
    session_token: RwLock<Option<Secret<String>>>,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Result<Self, SupabaseError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SupabaseError::Connection(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http,
            session_token: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    pub(crate) fn set_session_token(&self, token: Option<Secret<String>>) {
        *self
            .session_token
            .write()
            .unwrap_or_else(|e| e.into_inner()) = token;
    }

    pub(crate) fn session_token(&self) -> Option<Secret<String>> {
        self.session_token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url, table)
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.url, path.trim_start_matches('/'))
    }

    fn bearer(&self) -> String {
        if let Some(key) = &self.config.service_key {
            return key.expose_secret().clone();
        }
        self.session_token()
            .map(|token| token.expose_secret().clone())
            .unwrap_or_else(|| self.config.anon_key().to_string())
    }

    /// Request to a PostgREST table, authorized as the service role, the
    /// signed-in user, or anonymously, in that order.
    pub(crate) fn rest(&self, method: Method, table: &str) -> Result<RequestBuilder, SupabaseError> {
        self.ensure_configured()?;
        Ok(self
            .http
            .request(method, self.rest_url(table))
            .header("apikey", self.config.anon_key())
            .bearer_auth(self.bearer()))
    }

    /// Request to a GoTrue endpoint, authorized with `token` when given.
    pub(crate) fn auth(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<RequestBuilder, SupabaseError> {
        self.ensure_configured()?;
        let request = self
            .http
            .request(method, self.auth_url(path))
            .header("apikey", self.config.anon_key());
        Ok(match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    pub(crate) fn ensure_configured(&self) -> Result<(), SupabaseError> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(SupabaseError::NotConfigured)
        }
    }

    /// Sends a request and turns non-success statuses into errors.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, SupabaseError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SupabaseError::Timeout(self.config.timeout)
            } else if e.is_connect() {
                SupabaseError::Connection(format!("Connection failed: {}", e))
            } else {
                SupabaseError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        let (code, message) = serde_json::from_str::<ErrorBody>(&raw)
            .unwrap_or_default()
            .into_parts(&raw);
        tracing::debug!(status = status.as_u16(), code = ?code, "Supabase request failed");
        Err(SupabaseError::Status {
            status: status.as_u16(),
            code,
            message,
        })
    }

    /// Sends a request and decodes the JSON body.
    pub(crate) async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, SupabaseError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| SupabaseError::Decode(e.to_string()))
    }
}

/// Total from a PostgREST `Content-Range` header such as `0-9/42` or `*/0`.
pub(crate) fn content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

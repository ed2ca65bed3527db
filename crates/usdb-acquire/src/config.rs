use crate::error::UsdbError;
use reqwest::Url;
use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://usdb.eu";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; karAIoke-bot)";

pub const EMAIL_VAR: &str = "USDB_EMAIL";
pub const PASSWORD_VAR: &str = "USDB_PASS";
pub const BASE_URL_VAR: &str = "USDB_BASE_URL";

/// Login secrets. Either may be absent; an incomplete pair fails at login
/// time rather than at startup.
#[derive(Clone, Default)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    /// Both values present and non-empty.
    pub fn is_complete(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.email) && present(&self.password)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Everything a pipeline run needs to know about the upstream site.
#[derive(Debug, Clone)]
pub struct UsdbConfig {
    /// Site origin; `login`, `search` and download links resolve against it.
    pub base_url: Url,
    pub credentials: Credentials,
    pub user_agent: String,
    pub login_timeout: Duration,
    pub search_timeout: Duration,
    pub download_timeout: Duration,
}

impl UsdbConfig {
    pub fn new(base_url: Url, credentials: Credentials) -> Self {
        Self {
            base_url,
            credentials,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            login_timeout: Duration::from_secs(15),
            search_timeout: Duration::from_secs(15),
            download_timeout: Duration::from_secs(20),
        }
    }

    /// Build the configuration from process environment, loading a `.env`
    /// file first if one exists.
    pub fn from_env() -> Result<Self, UsdbError> {
        dotenvy::dotenv().ok();

        let base = env::var(BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base)?;

        let credentials = Credentials {
            email: env::var(EMAIL_VAR).ok(),
            password: env::var(PASSWORD_VAR).ok(),
        };
        if !credentials.is_complete() {
            tracing::warn!("{EMAIL_VAR} or {PASSWORD_VAR} is not set; logins will fail");
        }

        Ok(Self::new(base_url, credentials))
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, UsdbError> {
        Ok(self.base_url.join(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_completeness() {
        assert!(Credentials::new("singer@example.com", "hunter2").is_complete());
        assert!(!Credentials::default().is_complete());
        assert!(!Credentials::new("singer@example.com", "").is_complete());
        assert!(!Credentials {
            email: None,
            password: Some("hunter2".into()),
        }
        .is_complete());
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", Credentials::new("singer@example.com", "hunter2"));
        assert!(rendered.contains("singer@example.com"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_endpoints_resolve_against_origin() {
        let config = UsdbConfig::new(Url::parse(DEFAULT_BASE_URL).unwrap(), Credentials::default());
        assert_eq!(config.endpoint("login").unwrap().as_str(), "https://usdb.eu/login");
        assert_eq!(config.endpoint("/search").unwrap().as_str(), "https://usdb.eu/search");
        assert_eq!(config.download_timeout, Duration::from_secs(20));
    }
}

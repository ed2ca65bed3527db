use crate::archive;
use crate::config::UsdbConfig;
use crate::error::{SoftFailure, Stage, UsdbError};
use crate::search::{self, Candidate};
use reqwest::{Client, StatusCode};
use usdb_model::SearchQuery;

/// An authenticated connection to the site. Holds the cookie jar set up by
/// [`UsdbSession::login`]; every later request goes through it.
pub struct UsdbSession {
    client: Client,
    config: UsdbConfig,
}

impl UsdbSession {
    /// Log in with the configured credentials.
    ///
    /// Redirects are followed. The login counts as successful when the final
    /// URL contains `dashboard` or the returned page contains `logout`.
    pub async fn login(config: &UsdbConfig) -> Result<Self, UsdbError> {
        let credentials = &config.credentials;
        let (Some(email), Some(password)) = (&credentials.email, &credentials.password) else {
            tracing::warn!("Credentials not configured, skipping login request");
            return Err(UsdbError::AuthFailed);
        };
        if !credentials.is_complete() {
            tracing::warn!("Credentials are empty, skipping login request");
            return Err(UsdbError::AuthFailed);
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .build()
            .map_err(UsdbError::Client)?;

        let url = config.endpoint("login")?;
        tracing::info!(url = %url, "Logging in to USDB");

        let form = [
            ("email", email.as_str()),
            ("password", password.as_str()),
            ("remember", "1"),
        ];
        let response = client
            .post(url)
            .form(&form)
            .timeout(config.login_timeout)
            .send()
            .await
            .map_err(UsdbError::request(Stage::Login))?;

        let status = response.status();
        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(UsdbError::request(Stage::Login))?;
        tracing::info!(status = %status, final_url = %final_url, "Login response");

        if !is_logged_in(final_url.as_str(), &body) {
            tracing::warn!("Login failed (bad credentials or captcha)");
            return Err(UsdbError::AuthFailed);
        }

        tracing::info!("Login succeeded");
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Run a search and parse the candidate rows from the results page.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, UsdbError> {
        let url = self.config.endpoint("search")?;
        tracing::info!(url = %url, query = %query, "Searching USDB");

        let response = self
            .client
            .get(url)
            .query(&[("q", query.as_str())])
            .timeout(self.config.search_timeout)
            .send()
            .await
            .map_err(UsdbError::request(Stage::Search))?;

        let status = response.status();
        tracing::info!(status = %status, "Search response");
        if status != StatusCode::OK {
            return Err(UsdbError::UpstreamUnavailable(status));
        }

        let html = response
            .text()
            .await
            .map_err(UsdbError::request(Stage::Search))?;
        tracing::debug!(bytes = html.len(), "Received search page");

        Ok(search::parse_result_rows(&html, &self.config.base_url))
    }

    /// Download a candidate's archive. Anything but a 200 with a readable
    /// body is a soft failure.
    pub async fn fetch_archive(&self, candidate: &Candidate) -> Result<Vec<u8>, SoftFailure> {
        tracing::info!(url = %candidate.download_url, "Downloading archive");

        let response = self
            .client
            .get(candidate.download_url.clone())
            .timeout(self.config.download_timeout)
            .send()
            .await
            .map_err(SoftFailure::DownloadFailed)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SoftFailure::DownloadStatus(status));
        }

        let bytes = response.bytes().await.map_err(SoftFailure::DownloadFailed)?;
        tracing::debug!(bytes = bytes.len(), "Received archive");
        Ok(bytes.to_vec())
    }

    /// Download and extract in one step.
    pub async fn fetch_lyrics(&self, candidate: &Candidate) -> Result<String, SoftFailure> {
        let bytes = self.fetch_archive(candidate).await?;
        archive::extract_first_text(&bytes)
    }
}

fn is_logged_in(final_url: &str, body: &str) -> bool {
    final_url.contains("dashboard") || body.contains("logout")
}

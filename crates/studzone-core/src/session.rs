//! Authenticated HTTP session for the student portal
//!
//! The portal is a cookie-authenticated ASP.NET site. Logging in is a GET of
//! the login form (for the anti-forgery token) followed by a form POST. A
//! session that has silently expired is detected by the login form showing
//! up where a data page was expected.

use std::sync::Arc;

use reqwest::cookie::Jar;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::{ClientConfig, PortalConfig};
use crate::error::{PortalError, Result};
use crate::parser::{classify_login_outcome, extract_csrf_token, is_login_page, LoginOutcome, CSRF_FIELD};

/// Default Accept header sent with every request
const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Login state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No session cookies, or cookies known to be stale
    Anonymous,
    /// The last login succeeded and no expiry has been seen since
    Authenticated,
}

/// A logged-in (or loggable-in) portal session
///
/// Each session owns its own cookie jar. `reset` throws the jar away.
pub struct PortalSession {
    config: PortalConfig,
    client: reqwest::Client,
    state: SessionState,
}

impl PortalSession {
    /// Create a session. No request is made until the first login or fetch.
    ///
    /// # Errors
    /// `PortalError::Config` / `PortalError::InvalidUrl` if the configuration
    /// is incomplete, `PortalError::HttpError` if the HTTP client cannot be
    /// built.
    pub fn new(config: PortalConfig) -> Result<Self> {
        config.validate()?;
        let client = build_client(&config.client)?;
        Ok(Self {
            config,
            client,
            state: SessionState::Anonymous,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Log in with the configured credentials.
    ///
    /// # Errors
    /// - `PortalError::TokenNotFound` if the login form has no anti-forgery token
    /// - `PortalError::AuthenticationFailed` if the portal did not accept the login
    /// - `PortalError::HttpError` on transport failure
    pub async fn login(&mut self) -> Result<()> {
        let login_url = self.config.client.base_url.clone();
        let roll_number = self.config.credentials.roll_number.trim().to_uppercase();
        info!(roll_number = %roll_number, "Logging in to studzone");

        let login_page = self
            .client
            .get(&login_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let token = extract_csrf_token(&login_page)?;
        debug!(token_len = token.len(), "Extracted anti-forgery token");

        let form = [
            ("rollno", roll_number.as_str()),
            ("password", self.config.credentials.password.as_str()),
            (CSRF_FIELD, token.as_str()),
            ("chkterms", "on"),
        ];
        let response = self.client.post(&login_url).form(&form).send().await?;
        let status = response.status();
        let final_url = response.url().to_string();
        let body = response.text().await?;
        debug!(status = %status, url = %final_url, body_len = body.len(), "Login POST answered");

        match classify_login_outcome(&final_url, &body) {
            LoginOutcome::Success => {
                self.state = SessionState::Authenticated;
                info!(url = %final_url, "Login successful");
                Ok(())
            }
            outcome => {
                error!(?outcome, url = %final_url, "Login rejected");
                self.reset()?;
                Err(PortalError::AuthenticationFailed { url: final_url })
            }
        }
    }

    /// Fetch a page below the base URL, logging in first if needed.
    ///
    /// If the portal answers with its login form the session is reset, logged
    /// in again and the page fetched once more. A second login form is
    /// returned as-is.
    pub async fn fetch_page(&mut self, path: &str) -> Result<String> {
        if !self.is_authenticated() {
            self.login().await?;
        }

        let html = self.get(path).await?;
        if !is_login_page(&html) {
            return Ok(html);
        }

        info!(path, "Session expired, logging in again");
        self.reset()?;
        self.login().await?;

        let html = self.get(path).await?;
        if is_login_page(&html) {
            warn!(path, "Portal still serves the login form after re-login");
        }
        Ok(html)
    }

    /// Drop all cookies and return to the anonymous state.
    pub fn reset(&mut self) -> Result<()> {
        self.client = build_client(&self.config.client)?;
        self.state = SessionState::Anonymous;
        debug!("Session reset");
        Ok(())
    }

    /// End the session. The session can still log in again afterwards.
    pub fn close(&mut self) -> Result<()> {
        self.reset()?;
        info!("Session closed");
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<String> {
        let url = self.config.client.url_for(path);
        debug!(url = %url, "Fetching page");
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

fn build_client(config: &ClientConfig) -> Result<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static(DEFAULT_ACCEPT),
    );

    let client = reqwest::Client::builder()
        .cookie_provider(Arc::new(Jar::default()))
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .build()?;
    Ok(client)
}

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::{debug, info};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::ResolveError;

/// Tokens are re-fetched once they are this old, whatever the server says.
pub const MAX_TOKEN_AGE: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Grant used against the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStrategy {
    ClientCredentials,
    RefreshToken(String),
}

impl TokenStrategy {
    fn form(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::ClientCredentials => vec![("grant_type", "client_credentials")],
            Self::RefreshToken(token) => vec![
                ("grant_type", "refresh_token"),
                ("refresh_token", token.as_str()),
            ],
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::ClientCredentials => "client credentials",
            Self::RefreshToken(_) => "refresh token",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    value: String,
    fetched_at: Instant,
    lifetime: Duration,
}

impl AccessToken {
    pub fn new(value: String, fetched_at: Instant, expires_in: Duration) -> Self {
        Self {
            value,
            fetched_at,
            lifetime: expires_in.min(MAX_TOKEN_AGE),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_fresh_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < self.lifetime
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Hands out bearer tokens, keeping a single one cached in memory.
pub struct TokenProvider {
    http: Client,
    token_url: String,
    credentials: Credentials,
    strategy: TokenStrategy,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenProvider {
    pub fn new(
        http: Client,
        token_url: impl Into<String>,
        credentials: Credentials,
        strategy: TokenStrategy,
    ) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            credentials,
            strategy,
            cached: Mutex::new(None),
        }
    }

    /// Returns the cached token while it is fresh, fetching a new one otherwise.
    pub fn access_token(&self) -> Result<String, ResolveError> {
        if let Some(token) = self.cache().as_ref() {
            if token.is_fresh_at(Instant::now()) {
                return Ok(token.value().to_owned());
            }
            debug!("Cached access token expired; requesting a new one");
        }

        let token = self.fetch_token()?;
        let value = token.value().to_owned();
        *self.cache() = Some(token);
        Ok(value)
    }

    pub fn invalidate(&self) {
        self.cache().take();
    }

    pub fn fetch_token(&self) -> Result<AccessToken, ResolveError> {
        debug!(
            "Requesting access token from '{}' using the {} grant",
            self.token_url,
            self.strategy.label()
        );

        let fetched_at = Instant::now();
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&self.strategy.form())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ResolveError::TokenRejected {
                status: status.as_u16(),
                body: body.trim().to_owned(),
            });
        }

        let payload: TokenResponse = response.json()?;
        info!(
            "Obtained {} access token valid for {}s",
            payload.token_type.as_deref().unwrap_or("bearer"),
            payload.expires_in
        );

        Ok(AccessToken::new(
            payload.access_token,
            fetched_at,
            Duration::from_secs(payload.expires_in),
        ))
    }

    fn cache(&self) -> MutexGuard<'_, Option<AccessToken>> {
        self.cached.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn seed(&self, token: AccessToken) {
        *self.cache() = Some(token);
    }
}

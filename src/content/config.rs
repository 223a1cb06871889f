use std::env;

use log::debug;

pub const DEFAULT_BASE_URL: &str = "https://tutorly-backend.onrender.com/api";
pub const BASE_URL_VAR: &str = "STUDYTRACK_API_URL";
pub const TOKEN_VAR: &str = "STUDYTRACK_API_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,

    /// bearer token forwarded to the backend, which does all the access checks
    pub token: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Self {
        if let Err(e) = dotenv::dotenv() {
            debug!("no .env loaded: {e}");
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup(BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let token = lookup(TOKEN_VAR).filter(|v| !v.trim().is_empty());

        Self { base_url, token }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

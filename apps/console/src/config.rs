use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_ESCALATION_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STATUS_REFRESH_SECS: u64 = 30;
const DEFAULT_QUEUE_REFRESH_SECS: u64 = 60;
const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppProfile {
    Dev,
    Prod,
}

impl AppProfile {
    pub fn from_env(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("prod") | Some("production") => Self::Prod,
            _ => Self::Dev,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_base_url: String,
    pub escalation_base_url: Option<String>,
    pub auth_token: Option<String>,
    pub profile: AppProfile,
    pub request_timeout: Duration,
    pub escalation_timeout: Duration,
    pub status_refresh: Duration,
    pub queue_refresh: Duration,
    pub page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            escalation_base_url: None,
            auth_token: None,
            profile: AppProfile::Dev,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            escalation_timeout: Duration::from_secs(DEFAULT_ESCALATION_TIMEOUT_SECS),
            status_refresh: Duration::from_secs(DEFAULT_STATUS_REFRESH_SECS),
            queue_refresh: Duration::from_secs(DEFAULT_QUEUE_REFRESH_SECS),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        crate::config::load_dotenv();

        Self::from_lookup(read_env)
    }

    /// Builds a config from an arbitrary key lookup; `from_env` feeds it the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("LPO_API_BASE_URL") {
            config.api_base_url = url;
        }

        if let Some(url) = lookup("LPO_ESCALATION_BASE_URL") {
            config.escalation_base_url = Some(url);
        }

        if let Some(token) = lookup("LPO_AUTH_TOKEN") {
            config.auth_token = Some(token);
        }

        config.profile = AppProfile::from_env(lookup("LPO_PROFILE"));

        if let Some(secs) = parse_u64(&lookup, "LPO_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs.max(1));
        }

        if let Some(secs) = parse_u64(&lookup, "LPO_ESCALATION_TIMEOUT_SECS") {
            config.escalation_timeout = Duration::from_secs(secs.max(1));
        }

        if let Some(secs) = parse_u64(&lookup, "LPO_STATUS_REFRESH_SECS") {
            config.status_refresh = Duration::from_secs(secs.max(5));
        }

        if let Some(secs) = parse_u64(&lookup, "LPO_QUEUE_REFRESH_SECS") {
            config.queue_refresh = Duration::from_secs(secs.max(5));
        }

        if let Some(size) = parse_u64(&lookup, "LPO_PAGE_SIZE") {
            config.page_size = clamp_page_size(size);
        }

        config
    }

    pub fn bearer_token(&self) -> Option<String> {
        self.auth_token
            .as_ref()
            .map(|token| format!("Bearer {}", token.trim()))
    }

    pub fn escalation_endpoint(&self) -> String {
        self.escalation_base_url
            .clone()
            .unwrap_or_else(|| self.api_base_url.clone())
    }
}

/// Page sizes outside `5..=200` are pulled back into range.
pub fn clamp_page_size(size: u64) -> u32 {
    size.clamp(5, 200) as u32
}

fn parse_u64<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|value| value.trim().parse::<u64>().ok())
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .or_else(|| option_env_from_build(key).map(|s| s.to_string()))
}

fn option_env_from_build(key: &str) -> Option<&'static str> {
    match key {
        "LPO_API_BASE_URL" => option_env!("LPO_API_BASE_URL"),
        "LPO_ESCALATION_BASE_URL" => option_env!("LPO_ESCALATION_BASE_URL"),
        "LPO_AUTH_TOKEN" => option_env!("LPO_AUTH_TOKEN"),
        "LPO_PROFILE" => option_env!("LPO_PROFILE"),
        "LPO_REQUEST_TIMEOUT_SECS" => option_env!("LPO_REQUEST_TIMEOUT_SECS"),
        "LPO_ESCALATION_TIMEOUT_SECS" => option_env!("LPO_ESCALATION_TIMEOUT_SECS"),
        "LPO_STATUS_REFRESH_SECS" => option_env!("LPO_STATUS_REFRESH_SECS"),
        "LPO_QUEUE_REFRESH_SECS" => option_env!("LPO_QUEUE_REFRESH_SECS"),
        "LPO_PAGE_SIZE" => option_env!("LPO_PAGE_SIZE"),
        _ => None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_dotenv() {
    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            tracing::warn!("failed to load .env: {err}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[inline]
pub fn load_dotenv() {}

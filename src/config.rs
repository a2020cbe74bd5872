use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_STORAGE_DIR: &str = ".apx";
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Runtime settings for the landing page logic, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct LandingConfig {
    /// Remote form endpoint. `None` keeps submissions local only.
    pub form_endpoint: Option<String>,
    /// Directory holding the durable local storage files.
    pub storage_dir: PathBuf,
    /// Request timeout for the form endpoint. `None` leaves reqwest's default.
    pub request_timeout: Option<Duration>,
    pub frame_interval: Duration,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            form_endpoint: None,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            request_timeout: None,
            frame_interval: Duration::from_millis(DEFAULT_FRAME_INTERVAL_MS),
        }
    }
}

impl LandingConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // An empty endpoint counts as unset
        let endpoint_var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let form_endpoint = endpoint_var("FORM_ENDPOINT").or_else(|| endpoint_var("VITE_FORM_ENDPOINT"));

        let storage_dir = lookup("LANDING_STORAGE_DIR")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));

        let request_timeout = parse_number("FORM_ENDPOINT_TIMEOUT_SECS", lookup("FORM_ENDPOINT_TIMEOUT_SECS"))
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let frame_interval = parse_number("FRAME_INTERVAL_MS", lookup("FRAME_INTERVAL_MS"))
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_millis(DEFAULT_FRAME_INTERVAL_MS));

        if form_endpoint.is_none() {
            tracing::debug!("No form endpoint configured, waitlist entries stay local");
        }

        Self {
            form_endpoint,
            storage_dir,
            request_timeout,
            frame_interval,
        }
    }
}

fn parse_number(name: &str, raw: Option<String>) -> Option<u64> {
    let raw = raw?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring {}={:?}: {}", name, raw, e);
            None
        }
    }
}

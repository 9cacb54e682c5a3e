//! Runtime configuration and the fixed deployment defaults.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://map-api.ayna.gov.az/api/bus";
pub const DEFAULT_OUTPUT: &str = "data/bus_data.json";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_millis(500);

const DEFAULT_ACCEPT: &str = "application/json, text/plain, */*";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-GB,en-US;q=0.9,en;q=0.8";
const DEFAULT_ORIGIN: &str = "https://map.ayna.gov.az";
const DEFAULT_REFERER: &str = "https://map.ayna.gov.az/";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36";

/// Headers the bus API expects on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeaders {
    pub accept: String,
    pub accept_language: String,
    pub origin: String,
    pub referer: String,
    pub user_agent: String,
}

impl Default for RequestHeaders {
    fn default() -> Self {
        Self {
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Everything a scrape run needs to know up front.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub headers: RequestHeaders,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Wait between consecutive successful detail fetches.
    pub pacing_delay: Duration,
    pub output: PathBuf,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headers: RequestHeaders::default(),
            timeout: DEFAULT_TIMEOUT,
            pacing_delay: DEFAULT_PACING_DELAY,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

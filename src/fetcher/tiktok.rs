//! TikTok profile fetcher over plain HTTP.
//!
//! Fetches `https://www.tiktok.com/@{username}` with a browser-like blocking
//! client and pulls `/video/` and `/photo/` links out of the returned HTML.
//! The configured HTTP client is the "session": building it is `open`,
//! dropping it is `close`.

use regex::Regex;
use reqwest::blocking::Client;
use std::time::Duration;

use crate::fetcher::{ContentFetcher, FetchError};
use crate::models::Item;
use crate::session::{SessionError, SessionManager};

const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0";

/// Fetches the repost list from a TikTok profile page.
pub struct TikTokFetcher {
    username: String,
    client: Option<Client>,
    link_pattern: Regex,
}

impl TikTokFetcher {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            client: None,
            // Captures hrefs pointing at video or photo posts, absolute or relative.
            link_pattern: Regex::new(r#"href="([^"]*/(?:video|photo)/[^"]*)""#)
                .expect("Invalid link regex pattern"),
        }
    }

    pub fn profile_url(&self) -> String {
        format!("https://www.tiktok.com/@{}", self.username)
    }

    fn build_client() -> Result<Client, SessionError> {
        Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SessionError(format!("could not build HTTP client: {e}")))
    }

    /// Extract repost items from profile page HTML, de-duplicated within the
    /// page while preserving first-seen order.
    fn extract_items(&self, html: &str) -> Vec<Item> {
        let mut seen = std::collections::HashSet::new();
        let mut items = Vec::new();

        for caps in self.link_pattern.captures_iter(html) {
            let href = &caps[1];
            let url = if href.starts_with("http") {
                href.to_string()
            } else {
                format!("https://www.tiktok.com{href}")
            };

            let id = extract_content_id(&url);
            if seen.insert(id.clone()) {
                items.push(Item { id, url });
            }
        }

        items
    }
}

impl SessionManager for TikTokFetcher {
    fn open(&mut self) -> Result<(), SessionError> {
        if self.client.is_none() {
            self.client = Some(Self::build_client()?);
        }
        Ok(())
    }

    fn close(&mut self) {
        self.client = None;
    }

    fn is_open(&self) -> bool {
        self.client.is_some()
    }
}

impl ContentFetcher for TikTokFetcher {
    fn fetch(&mut self) -> Result<Vec<Item>, FetchError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| FetchError::ConnectionLost("session is not open".to_string()))?;

        let url = self.profile_url();
        let response = client.get(&url).send().map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Other(format!(
                "profile request returned HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let html = response.text().map_err(classify_reqwest_error)?;
        let items = self.extract_items(&html);

        if items.is_empty() {
            return Err(FetchError::MissingContent(format!(
                "no repost links found at {url}; profile may have no reposts or the page structure changed"
            )));
        }

        Ok(items)
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(e.to_string())
    } else if e.is_connect() {
        FetchError::ConnectionLost(e.to_string())
    } else {
        FetchError::Other(e.to_string())
    }
}

/// Extract the stable content id from a TikTok URL.
///
/// Handles `/video/{id}` and `/photo/{id}` forms, short links on
/// `vm.tiktok.com` / `vt.tiktok.com` (last path segment), and falls back to
/// the whole URL when nothing matches.
pub fn extract_content_id(url: &str) -> String {
    if let Some(rest) = url.split_once("/video/").map(|(_, rest)| rest) {
        return trim_id_segment(rest);
    }
    if let Some(rest) = url.split_once("/photo/").map(|(_, rest)| rest) {
        return trim_id_segment(rest);
    }
    if url.contains("vm.tiktok.com") || url.contains("vt.tiktok.com") {
        let last = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
        return last.split('?').next().unwrap_or(last).to_string();
    }
    url.to_string()
}

fn trim_id_segment(rest: &str) -> String {
    let no_query = rest.split('?').next().unwrap_or(rest);
    no_query.split('/').next().unwrap_or(no_query).to_string()
}

/// Format a canonical video URL from an id, optionally scoped to a profile.
pub fn format_video_url(video_id: &str, username: Option<&str>) -> String {
    if video_id.starts_with("http") {
        return video_id.to_string();
    }

    match username {
        Some(name) => format!("https://www.tiktok.com/@{name}/video/{video_id}"),
        None => format!("https://www.tiktok.com/video/{video_id}"),
    }
}

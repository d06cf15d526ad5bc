// This module contains the addresses of the upstream endpoints this client talks to.
use std::time::Duration;

/// The per call timeout applied by the production transport.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// The pause between two attempts of a call that failed at the transport level.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Configuration for the upstream endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base_url: String,
}

impl ApiEndpoints {
    /// The versioned API root used unless something else is configured.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.cloudbeds.com/api/v1.3";

    const ROOM_TYPES_PATH: &'static str = "getRoomTypes";
    const SOURCES_PATH: &'static str = "getSources";
    const POST_RESERVATION_PATH: &'static str = "postReservation";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn room_types_url(&self) -> String {
        self.url_for(Self::ROOM_TYPES_PATH)
    }

    pub fn sources_url(&self) -> String {
        self.url_for(Self::SOURCES_PATH)
    }

    pub fn post_reservation_url(&self) -> String {
        self.url_for(Self::POST_RESERVATION_PATH)
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_ignored() {
        let endpoints = ApiEndpoints::new("http://localhost:8080/api/");
        assert_eq!(
            "http://localhost:8080/api/postReservation",
            endpoints.post_reservation_url()
        );
    }

    #[test]
    fn default_points_at_the_versioned_root() {
        assert_eq!(
            "https://api.cloudbeds.com/api/v1.3/getSources",
            ApiEndpoints::default().sources_url()
        );
    }
}

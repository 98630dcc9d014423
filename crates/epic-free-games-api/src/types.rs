//! Response envelopes for the HTTP surface.

use chrono::{SecondsFormat, Utc};
use epic_free_games::GameRecord;
use serde::Serialize;

/// Short error code returned with every failed scrape.
pub const SCRAPE_ERROR_CODE: &str = "Failed to scrape Epic Games free games";

/// Successful scrape envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeSuccess {
    pub success: bool,
    pub count: usize,
    pub last_updated: String,
    pub data: Vec<GameRecord>,
}

impl ScrapeSuccess {
    pub fn new(data: Vec<GameRecord>) -> Self {
        Self {
            success: true,
            count: data.len(),
            last_updated: now_rfc3339(),
            data,
        }
    }
}

/// Failed scrape envelope; `message` carries the underlying cause.
#[derive(Debug, Serialize)]
pub struct ScrapeFailure {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl ScrapeFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: SCRAPE_ERROR_CODE.to_string(),
            message: message.into(),
        }
    }
}

/// Current time as RFC 3339 with millisecond precision and a `Z` suffix.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let envelope = ScrapeSuccess::new(Vec::new());
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 0);
        assert!(json["lastUpdated"].as_str().unwrap().ends_with('Z'));
        assert!(json["data"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_failure_envelope_shape() {
        let envelope = ScrapeFailure::new("navigation timed out");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], SCRAPE_ERROR_CODE);
        assert_eq!(json["message"], "navigation timed out");
    }
}

//! Core data types for scraped free-game promotions.

use serde::{Deserialize, Serialize};

/// Which promotional label produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    #[serde(rename = "weekly-free")]
    WeeklyFree,
    #[serde(rename = "coming-soon")]
    ComingSoon,
}

impl GameType {
    /// The availability string shown to consumers ("Free Now" / "Coming Soon").
    pub fn availability(&self) -> &'static str {
        match self {
            GameType::WeeklyFree => "Free Now",
            GameType::ComingSoon => "Coming Soon",
        }
    }

    /// Boilerplate description for records of this type.
    pub fn description(&self) -> &'static str {
        match self {
            GameType::WeeklyFree => "Currently free on Epic Games Store",
            GameType::ComingSoon => "Coming soon to Epic Games Store",
        }
    }
}

/// One free-game promotion extracted from the store page.
///
/// Every field is always populated: absent data degrades to synthesized
/// placeholder strings rather than being omitted, so JSON consumers can rely
/// on the full record shape. Exactly one of `is_currently_free` and
/// `is_upcoming_free` is true per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub title: String,
    pub availability: String,
    pub link: String,
    pub image: String,
    pub description: String,
    pub is_currently_free: bool,
    pub is_upcoming_free: bool,
    pub free_until: String,
    pub game_type: GameType,
}

impl GameRecord {
    /// Build a record skeleton for a label match; link/image/free_until are
    /// filled in by the resolution chain afterwards.
    pub fn for_label(title: impl Into<String>, game_type: GameType) -> Self {
        Self {
            title: title.into(),
            availability: game_type.availability().to_string(),
            link: String::new(),
            image: String::new(),
            description: game_type.description().to_string(),
            is_currently_free: game_type == GameType::WeeklyFree,
            is_upcoming_free: game_type == GameType::ComingSoon,
            free_until: game_type.availability().to_string(),
            game_type,
        }
    }
}

/// Errors that can occur while scraping the store page.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Page evaluation failed: {0}")]
    Evaluate(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type ScrapeResult<T> = Result<T, ScrapeError>;

//! Lookup tables used by the image-resolution fallback chain.
//!
//! The tables are data, not code: new titles are added by editing the builtin
//! maps below or by pointing the server at a JSON override file, without
//! touching the extraction logic.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::types::{ScrapeError, ScrapeResult};

/// Previously observed CDN key-art URLs for well-known titles. An exact title
/// match here short-circuits the rest of the image resolution chain.
static KNOWN_IMAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            "Fortnite",
            "https://cdn1.epicgames.com/offer/fn/FNBR_37-00_C6S4_EGS_Launcher_KeyArt_FNLogo_Blade_1200x1600_1200x1600-0924136c90b79f9006796f69f24a07f6?resize=1&w=360&h=480&quality=medium",
        ),
        (
            "Rocket League®",
            "https://cdn1.epicgames.com/offer/rocketleague/RL_EGS_Launcher_KeyArt_1200x1600_1200x1600-5c8d08c2b79d562c8a0b2a2a2a2a2a2a?resize=1&w=360&h=480&quality=medium",
        ),
        (
            "Genshin Impact",
            "https://cdn1.epicgames.com/offer/genshin-impact/EGS_GenshinImpact_miHoYoLimited_S1_2560x1440-91c6cd7312cc2647c3ebccca10f30399?resize=1&w=360&h=480&quality=medium",
        ),
        (
            "VALORANT",
            "https://cdn1.epicgames.com/offer/valorant/EGS_VALORANT_RiotGames_S1_2560x1440-5c8d08c2b79d562c8a0b2a2a2a2a2a2a?resize=1&w=360&h=480&quality=medium",
        ),
        (
            "Fall Guys",
            "https://cdn1.epicgames.com/offer/fallguys/EGS_FallGuys_Mediatonic_S1_2560x1440-5c8d08c2b79d562c8a0b2a2a2a2a2a2a?resize=1&w=360&h=480&quality=medium",
        ),
    ])
});

/// Per-title keyword patterns matched against CDN image URLs and alt text.
/// Titles absent from this table fall back to a single slug keyword.
static TITLE_KEYWORDS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        (
            "Monument Valley",
            &["monument-valley", "monumentvalley", "monument_valley"][..],
        ),
        (
            "Ghostrunner 2",
            &["ghostrunner", "ghostrunner-2", "ghostrunner2", "ghostrunner_2"][..],
        ),
        (
            "The Battle of Polytopia",
            &["polytopia", "battle-polytopia", "battle_of_polytopia"][..],
        ),
        (
            "Monument Valley 2",
            &["monument-valley-2", "monumentvalley2", "monument_valley_2"][..],
        ),
        (
            "Fortnite",
            &["fortnite", "fnbr", "fn_", "fortnite-battle-royale", "fnbr_", "fortnite-br"][..],
        ),
        (
            "Rocket League®",
            &["rocket-league", "rocketleague", "rl_", "rocket-league®"][..],
        ),
        (
            "Genshin Impact",
            &["genshin", "genshin-impact", "genshinimpact", "genshin_impact"][..],
        ),
        ("VALORANT", &["valorant", "val_", "valorant_"][..]),
        ("Fall Guys", &["fall-guys", "fallguys", "fg_", "fall_guys"][..]),
        ("The Sims™ 4", &["sims", "sims-4", "sims4", "sims™", "sims_4"][..]),
        (
            "PUBG: BATTLEGROUNDS",
            &["pubg", "pubg-battlegrounds", "pubg_", "battlegrounds"][..],
        ),
        ("Destiny 2", &["destiny", "destiny-2", "destiny2", "destiny_2"][..]),
        (
            "Wuthering Waves",
            &["wuthering-waves", "wutheringwaves", "wuthering_waves"][..],
        ),
        (
            "Zenless Zone Zero",
            &["zenless-zone-zero", "zenlesszonezero", "zenless_zone_zero"][..],
        ),
        (
            "Honkai: Star Rail",
            &["honkai", "star-rail", "honkai-star-rail", "honkai_star_rail"][..],
        ),
        (
            "Infinity Nikki",
            &["infinity-nikki", "infinitynikki", "infinity_nikki"][..],
        ),
        ("Crosshair V2", &["crosshair", "crosshair-v2", "crosshair_v2"][..]),
        (
            "Marvel Rivals",
            &["marvel-rivals", "marvelrivals", "marvel_rivals"][..],
        ),
        (
            "NARAKA: BLADEPOINT",
            &["naraka", "blade-point", "naraka-blade-point", "naraka_blade_point"][..],
        ),
        (
            "Magic: The Gathering Arena",
            &["magic", "gathering-arena", "magic-gathering-arena", "mtg"][..],
        ),
        (
            "Idle Champions of the Forgotten Realms",
            &["idle-champions", "idlechampions", "forgotten-realms"][..],
        ),
    ])
});

/// Flagship-title keyword overrides for the bucketed last-resort scan.
static FLAGSHIP_HINTS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        ("Fortnite", &["fn/", "FNBR_", "fortnite"][..]),
        ("Rocket League®", &["rocket", "league", "rl_"][..]),
        ("Genshin Impact", &["genshin", "impact"][..]),
        ("VALORANT", &["valorant", "val_"][..]),
    ])
});

/// The lookup tables consulted by the extractor's image resolution chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub known_images: HashMap<String, String>,
    pub title_keywords: HashMap<String, Vec<String>>,
    pub flagship_hints: HashMap<String, Vec<String>>,
}

/// Partial catalog read from a JSON override file; omitted sections keep the
/// builtin entries.
#[derive(Debug, Default, Deserialize)]
struct CatalogOverlay {
    #[serde(default)]
    known_images: HashMap<String, String>,
    #[serde(default)]
    title_keywords: HashMap<String, Vec<String>>,
    #[serde(default)]
    flagship_hints: HashMap<String, Vec<String>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The tables shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            known_images: KNOWN_IMAGES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            title_keywords: TITLE_KEYWORDS
                .iter()
                .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
                .collect(),
            flagship_hints: FLAGSHIP_HINTS
                .iter()
                .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
                .collect(),
        }
    }

    /// Builtin tables with a JSON override file merged on top. Override
    /// entries win on title collisions.
    pub fn load(path: &Path) -> ScrapeResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let overlay: CatalogOverlay = serde_json::from_str(&raw)
            .map_err(|e| ScrapeError::Catalog(format!("{}: {e}", path.display())))?;

        let mut catalog = Self::builtin();
        catalog.known_images.extend(overlay.known_images);
        catalog.title_keywords.extend(overlay.title_keywords);
        catalog.flagship_hints.extend(overlay.flagship_hints);
        Ok(catalog)
    }

    /// Keyword patterns for a title, if the table has an entry.
    pub fn keywords_for(&self, title: &str) -> Option<&[String]> {
        self.title_keywords.get(title).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_builtin_known_image_lookup() {
        let catalog = Catalog::builtin();
        let url = catalog.known_images.get("Fortnite").unwrap();
        assert!(url.starts_with("https://cdn1.epicgames.com/offer/fn/"));
    }

    #[test]
    fn test_builtin_keyword_tables() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.keywords_for("Monument Valley").unwrap(),
            &["monument-valley", "monumentvalley", "monument_valley"]
        );
        assert!(catalog.keywords_for("Some Unknown Indie Game").is_none());
        assert!(catalog.flagship_hints.contains_key("VALORANT"));
    }

    #[test]
    fn test_load_merges_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{
                "known_images": {{ "Hades": "https://cdn1.epicgames.com/offer/hades/key.jpg" }},
                "title_keywords": {{ "Fortnite": ["fortnite-only"] }}
            }}"#
        )
        .unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(
            catalog.known_images.get("Hades").unwrap(),
            "https://cdn1.epicgames.com/offer/hades/key.jpg"
        );
        // Override replaces the builtin entry for the same title.
        assert_eq!(catalog.keywords_for("Fortnite").unwrap(), &["fortnite-only"]);
        // Untouched sections keep the builtins.
        assert!(catalog.known_images.contains_key("Fall Guys"));
        assert!(catalog.flagship_hints.contains_key("Genshin Impact"));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Catalog::load(&path).is_err());
    }
}

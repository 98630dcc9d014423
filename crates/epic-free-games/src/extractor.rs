//! Heuristic extraction of free-game records from the rendered page text and
//! DOM.
//!
//! The store page has no stable structured markup for this content, so the
//! extractor scans visible text lines for promotional labels and resolves the
//! image and detail link for each hit through layered fallbacks, ordered from
//! most specific to least. The chain order is load-bearing: reordering changes
//! output on ambiguous pages. The extractor never fails — missing data
//! degrades to synthesized placeholder values.

use url::Url;

use crate::catalog::Catalog;
use crate::page::RenderedPage;
use crate::types::{GameRecord, GameType};

/// Label line opening a weekly-free record.
pub const FREE_NOW_LABEL: &str = "FREE NOW";
/// Label line opening an upcoming-free record.
pub const COMING_SOON_LABEL: &str = "COMING SOON";

/// Lines after the title scanned for an availability window.
const LOOKAHEAD_LINES: usize = 3;
/// Shortest line accepted as a game title.
const MIN_TITLE_LEN: usize = 3;

/// Origin used to resolve relative detail links and synthesize fallbacks.
pub const STORE_ORIGIN: &str = "https://store.epicgames.com";
/// Host of the store's promotional image CDN.
const CDN_HOST: &str = "cdn1.epicgames.com";

/// Scan the page and emit one record per label match, in document order.
pub fn extract_free_games(page: &RenderedPage, catalog: &Catalog) -> Vec<GameRecord> {
    let mut games = Vec::new();

    for (i, line) in page.lines.iter().enumerate() {
        let game_type = match line.as_str() {
            FREE_NOW_LABEL => GameType::WeeklyFree,
            COMING_SOON_LABEL => GameType::ComingSoon,
            _ => continue,
        };

        let Some(title) = title_after_label(&page.lines, i, game_type) else {
            continue;
        };

        let mut record = GameRecord::for_label(title, game_type);
        if let Some(window) = availability_window(&page.lines, i, game_type) {
            record.free_until = window;
        }
        record.link = resolve_link(&record.title, page);
        record.image = resolve_image(&record.title, page, catalog);

        tracing::debug!(title = %record.title, game_type = ?game_type, "extracted record");
        games.push(record);
    }

    games
}

/// The line after a label is the title, unless it is malformed: a repeat of
/// the label, an availability window that slid up, or too short to be a name.
fn title_after_label(lines: &[String], i: usize, game_type: GameType) -> Option<String> {
    let next = lines.get(i + 1)?;

    let label = match game_type {
        GameType::WeeklyFree => FREE_NOW_LABEL,
        GameType::ComingSoon => COMING_SOON_LABEL,
    };
    if next == label || next.chars().count() < MIN_TITLE_LEN {
        return None;
    }
    if game_type == GameType::WeeklyFree && next.contains("Free Now -") {
        return None;
    }

    Some(next.clone())
}

/// Scan the bounded window after the title for a date/availability line.
fn availability_window(lines: &[String], i: usize, game_type: GameType) -> Option<String> {
    let start = (i + 2).min(lines.len());
    let end = (i + 2 + LOOKAHEAD_LINES).min(lines.len());

    lines[start..end]
        .iter()
        .find(|line| match game_type {
            GameType::WeeklyFree => line.contains("Free Now -") || line.contains("Free until"),
            GameType::ComingSoon => line.contains("Free "),
        })
        .cloned()
}

/// Resolve the detail-page URL: first `/p/` anchor whose text contains the
/// title or whose href contains the slug, else a synthesized store URL.
fn resolve_link(title: &str, page: &RenderedPage) -> String {
    let title_lower = title.to_lowercase();
    let title_slug = slug(title);

    for anchor in &page.anchors {
        if !anchor.href.contains("/p/") {
            continue;
        }
        if anchor.text.to_lowercase().contains(&title_lower)
            || anchor.href.to_lowercase().contains(&title_slug)
        {
            return absolutize(&anchor.href);
        }
    }

    format!("{STORE_ORIGIN}/en-US/p/{title_slug}")
}

fn absolutize(href: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    match Url::parse(STORE_ORIGIN).and_then(|base| base.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{STORE_ORIGIN}{href}"),
    }
}

/// Resolve a promotional image URL for a title. Fallback chain, first match
/// wins, each step strictly worse-confidence than the last:
///
/// 1. exact-title entry in the known-images table
/// 2. CDN image whose src/alt contains a per-title keyword
/// 3. DOM-proximity: container mentioning the title with a CDN descendant
/// 4. bucketed CDN scan (offer/ before spt-assets/), flagship hints first
/// 5. synthesized URL from the slug
fn resolve_image(title: &str, page: &RenderedPage, catalog: &Catalog) -> String {
    if let Some(url) = catalog.known_images.get(title) {
        tracing::debug!(%title, "image resolved via known-title table");
        return url.clone();
    }

    let title_slug = slug(title);
    let slug_keyword = [title_slug.clone()];
    let keywords: &[String] = catalog.keywords_for(title).unwrap_or(&slug_keyword);

    for image in &page.images {
        if !image.src.contains(CDN_HOST) {
            continue;
        }
        let src = image.src.to_lowercase();
        let alt = image.alt.to_lowercase();
        if keywords
            .iter()
            .any(|kw| src.contains(&kw.to_lowercase()) || alt.contains(&kw.to_lowercase()))
        {
            tracing::debug!(%title, src = %image.src, "image resolved via keyword pattern");
            return image.src.clone();
        }
    }

    for container in &page.containers {
        if !container.text.contains(title) {
            continue;
        }
        if let Some(src) = container.image_srcs.iter().find(|s| s.contains(CDN_HOST)) {
            tracing::debug!(%title, %src, "image resolved via DOM proximity");
            return src.clone();
        }
    }

    let mut offer_images = Vec::new();
    let mut spt_images = Vec::new();
    for image in &page.images {
        if !image.src.contains(CDN_HOST) {
            continue;
        }
        if image.src.contains("offer/") {
            offer_images.push(image.src.as_str());
        } else if image.src.contains("spt-assets/") {
            spt_images.push(image.src.as_str());
        }
    }
    let cdn_images: Vec<&str> = offer_images.into_iter().chain(spt_images).collect();

    if !cdn_images.is_empty() {
        if let Some(hints) = catalog.flagship_hints.get(title) {
            for src in &cdn_images {
                if hints.iter().any(|hint| src.contains(hint.as_str())) {
                    tracing::debug!(%title, %src, "image resolved via flagship hint");
                    return (*src).to_string();
                }
            }
        }
        tracing::debug!(%title, src = %cdn_images[0], "image resolved via bucket scan");
        return cdn_images[0].to_string();
    }

    tracing::debug!(%title, "image synthesized from slug");
    format!("https://{CDN_HOST}/{title_slug}.jpg")
}

/// Lowercase the title and collapse runs of non-alphanumeric characters to a
/// single `-`, trimming dangling dashes.
pub fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut prev_dash = false;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            prev_dash = false;
        } else if !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::page::{AnchorNode, ContainerNode, ImageNode};

    fn page_with_lines(lines: &[&str]) -> RenderedPage {
        RenderedPage {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn empty_catalog_with_hints(title: &str, hints: &[&str]) -> Catalog {
        Catalog {
            known_images: HashMap::new(),
            title_keywords: HashMap::new(),
            flagship_hints: HashMap::from([(
                title.to_string(),
                hints.iter().map(|s| s.to_string()).collect(),
            )]),
        }
    }

    #[test]
    fn test_free_now_emits_weekly_record() {
        let page = page_with_lines(&["FREE NOW", "Starlight Drifter"]);
        let games = extract_free_games(&page, &Catalog::builtin());

        assert_eq!(games.len(), 1);
        let game = &games[0];
        assert_eq!(game.title, "Starlight Drifter");
        assert_eq!(game.game_type, GameType::WeeklyFree);
        assert!(game.is_currently_free);
        assert!(!game.is_upcoming_free);
        assert_eq!(game.availability, "Free Now");
        assert_eq!(game.description, "Currently free on Epic Games Store");
    }

    #[test]
    fn test_coming_soon_emits_upcoming_record() {
        let page = page_with_lines(&["COMING SOON", "Ghostrunner 2"]);
        let games = extract_free_games(&page, &Catalog::builtin());

        assert_eq!(games.len(), 1);
        let game = &games[0];
        assert_eq!(game.game_type, GameType::ComingSoon);
        assert!(game.is_upcoming_free);
        assert!(!game.is_currently_free);
        assert_eq!(game.availability, "Coming Soon");
        assert_eq!(game.description, "Coming soon to Epic Games Store");
    }

    #[test]
    fn test_duplicate_label_line_produces_no_record() {
        let weekly = page_with_lines(&["FREE NOW", "FREE NOW"]);
        assert!(extract_free_games(&weekly, &Catalog::builtin()).is_empty());

        let upcoming = page_with_lines(&["COMING SOON", "COMING SOON"]);
        assert!(extract_free_games(&upcoming, &Catalog::builtin()).is_empty());
    }

    #[test]
    fn test_short_title_produces_no_record() {
        let page = page_with_lines(&["FREE NOW", "ab", "COMING SOON", "xy"]);
        let games = extract_free_games(&page, &Catalog::builtin());
        assert!(games.is_empty());
    }

    #[test]
    fn test_weekly_title_slot_holding_window_text_is_rejected() {
        let page = page_with_lines(&["FREE NOW", "Free Now - Sep 12 at 01:00 AM"]);
        let games = extract_free_games(&page, &Catalog::builtin());
        assert!(games.is_empty());
    }

    #[test]
    fn test_monument_valley_end_to_end_with_bare_page() {
        let page = page_with_lines(&[
            "FREE NOW",
            "Monument Valley",
            "Free Now - Sep 12 at 01:00 AM",
        ]);
        let games = extract_free_games(&page, &Catalog::builtin());

        assert_eq!(games.len(), 1);
        let game = &games[0];
        assert_eq!(game.title, "Monument Valley");
        assert_eq!(game.availability, "Free Now");
        assert_eq!(game.free_until, "Free Now - Sep 12 at 01:00 AM");
        assert!(game.is_currently_free);
        assert!(!game.is_upcoming_free);
        assert_eq!(game.game_type, GameType::WeeklyFree);
        assert_eq!(game.image, "https://cdn1.epicgames.com/monument-valley.jpg");
        assert_eq!(game.link, "https://store.epicgames.com/en-US/p/monument-valley");
    }

    #[test]
    fn test_window_outside_lookahead_defaults_to_label() {
        let page = page_with_lines(&[
            "FREE NOW",
            "Starlight Drifter",
            "some blurb",
            "another blurb",
            "yet another",
            "Free Now - Oct 03 at 01:00 AM",
        ]);
        let games = extract_free_games(&page, &Catalog::builtin());
        // The date line sits past the 3-line window and is not picked up.
        assert_eq!(games[0].free_until, "Free Now");
    }

    #[test]
    fn test_window_found_within_lookahead() {
        let page = page_with_lines(&[
            "COMING SOON",
            "The Battle of Polytopia",
            "Mystery Game",
            "Free Sep 18 - Sep 25",
        ]);
        let games = extract_free_games(&page, &Catalog::builtin());
        assert_eq!(games[0].free_until, "Free Sep 18 - Sep 25");
    }

    #[test]
    fn test_known_title_short_circuits_dom_images() {
        let mut page = page_with_lines(&["FREE NOW", "Fortnite"]);
        page.images.push(ImageNode {
            src: "https://cdn1.epicgames.com/offer/unrelated/banner.jpg".to_string(),
            alt: "fortnite".to_string(),
        });
        let catalog = Catalog::builtin();
        let games = extract_free_games(&page, &catalog);
        assert_eq!(&games[0].image, catalog.known_images.get("Fortnite").unwrap());
    }

    #[test]
    fn test_keyword_pattern_matches_cdn_image() {
        let mut page = page_with_lines(&["FREE NOW", "Monument Valley"]);
        page.images.push(ImageNode {
            src: "https://cdn1.epicgames.com/spt-assets/x/monumentvalley-keyart.jpg".to_string(),
            alt: String::new(),
        });
        let games = extract_free_games(&page, &Catalog::builtin());
        assert_eq!(
            games[0].image,
            "https://cdn1.epicgames.com/spt-assets/x/monumentvalley-keyart.jpg"
        );
    }

    #[test]
    fn test_keyword_pattern_matches_alt_text() {
        let mut page = page_with_lines(&["FREE NOW", "Starlight Drifter"]);
        page.images.push(ImageNode {
            src: "https://cdn1.epicgames.com/offer/abc123/keyart.jpg".to_string(),
            alt: "Starlight-Drifter key art".to_string(),
        });
        // Unknown title: the slug keyword "starlight-drifter" matches the alt.
        let games = extract_free_games(&page, &Catalog::builtin());
        assert_eq!(games[0].image, "https://cdn1.epicgames.com/offer/abc123/keyart.jpg");
    }

    #[test]
    fn test_non_cdn_images_never_match() {
        let mut page = page_with_lines(&["FREE NOW", "Starlight Drifter"]);
        page.images.push(ImageNode {
            src: "https://elsewhere.example.com/starlight-drifter.jpg".to_string(),
            alt: "starlight-drifter".to_string(),
        });
        let games = extract_free_games(&page, &Catalog::builtin());
        assert_eq!(
            games[0].image,
            "https://cdn1.epicgames.com/starlight-drifter.jpg"
        );
    }

    #[test]
    fn test_proximity_container_supplies_image() {
        let mut page = page_with_lines(&["FREE NOW", "Starlight Drifter"]);
        page.containers.push(ContainerNode {
            text: "Starlight Drifter — out now".to_string(),
            image_srcs: vec![
                "https://elsewhere.example.com/banner.jpg".to_string(),
                "https://cdn1.epicgames.com/p/artwork-9f2.jpg".to_string(),
            ],
        });
        let games = extract_free_games(&page, &Catalog::builtin());
        assert_eq!(games[0].image, "https://cdn1.epicgames.com/p/artwork-9f2.jpg");
    }

    #[test]
    fn test_bucket_scan_prefers_offer_over_spt_assets() {
        let mut page = page_with_lines(&["FREE NOW", "Starlight Drifter"]);
        // spt-assets image comes first in document order, offer image must
        // still win the concatenation.
        page.images.push(ImageNode {
            src: "https://cdn1.epicgames.com/spt-assets/a/img.jpg".to_string(),
            alt: String::new(),
        });
        page.images.push(ImageNode {
            src: "https://cdn1.epicgames.com/offer/b/img.jpg".to_string(),
            alt: String::new(),
        });
        let games = extract_free_games(&page, &Catalog::builtin());
        assert_eq!(games[0].image, "https://cdn1.epicgames.com/offer/b/img.jpg");
    }

    #[test]
    fn test_flagship_hint_overrides_bucket_order() {
        let mut page = page_with_lines(&["FREE NOW", "Starlight Drifter"]);
        page.images.push(ImageNode {
            src: "https://cdn1.epicgames.com/offer/other/first.jpg".to_string(),
            alt: String::new(),
        });
        page.images.push(ImageNode {
            src: "https://cdn1.epicgames.com/offer/sld/drifter.jpg".to_string(),
            alt: String::new(),
        });
        let catalog = empty_catalog_with_hints("Starlight Drifter", &["drifter"]);
        let games = extract_free_games(&page, &catalog);
        assert_eq!(games[0].image, "https://cdn1.epicgames.com/offer/sld/drifter.jpg");
    }

    #[test]
    fn test_link_resolved_from_anchor_text() {
        let mut page = page_with_lines(&["FREE NOW", "Starlight Drifter"]);
        page.anchors.push(AnchorNode {
            href: "/en-US/p/starlight-drifter-abc".to_string(),
            text: "Starlight Drifter".to_string(),
        });
        let games = extract_free_games(&page, &Catalog::builtin());
        assert_eq!(
            games[0].link,
            "https://store.epicgames.com/en-US/p/starlight-drifter-abc"
        );
    }

    #[test]
    fn test_link_resolved_from_href_slug() {
        let mut page = page_with_lines(&["FREE NOW", "Starlight Drifter"]);
        page.anchors.push(AnchorNode {
            href: "https://store.epicgames.com/en-US/p/starlight-drifter".to_string(),
            text: "View game".to_string(),
        });
        let games = extract_free_games(&page, &Catalog::builtin());
        assert_eq!(
            games[0].link,
            "https://store.epicgames.com/en-US/p/starlight-drifter"
        );
    }

    #[test]
    fn test_anchors_without_product_path_are_skipped() {
        let mut page = page_with_lines(&["FREE NOW", "Starlight Drifter"]);
        page.anchors.push(AnchorNode {
            href: "/en-US/news/starlight-drifter".to_string(),
            text: "Starlight Drifter".to_string(),
        });
        let games = extract_free_games(&page, &Catalog::builtin());
        assert_eq!(
            games[0].link,
            "https://store.epicgames.com/en-US/p/starlight-drifter"
        );
    }

    #[test]
    fn test_every_record_has_nonempty_image_and_link() {
        let page = page_with_lines(&[
            "FREE NOW",
            "Starlight Drifter",
            "COMING SOON",
            "Hollow Crown",
        ]);
        let games = extract_free_games(&page, &Catalog::builtin());
        assert_eq!(games.len(), 2);
        for game in &games {
            assert!(!game.image.is_empty());
            assert!(!game.link.is_empty());
            assert!(!game.free_until.is_empty());
            assert!(game.is_currently_free ^ game.is_upcoming_free);
        }
    }

    #[test]
    fn test_page_without_labels_yields_empty_list() {
        let page = page_with_lines(&["Discover", "Browse", "Wishlist"]);
        let games = extract_free_games(&page, &Catalog::builtin());
        assert!(games.is_empty());
    }

    #[test]
    fn test_records_preserve_document_order() {
        let page = page_with_lines(&[
            "COMING SOON",
            "Hollow Crown",
            "FREE NOW",
            "Starlight Drifter",
        ]);
        let games = extract_free_games(&page, &Catalog::builtin());
        assert_eq!(games[0].title, "Hollow Crown");
        assert_eq!(games[1].title, "Starlight Drifter");
    }

    #[test]
    fn test_slug_collapses_nonalphanumeric_runs() {
        assert_eq!(slug("Monument Valley"), "monument-valley");
        assert_eq!(slug("The Sims™ 4"), "the-sims-4");
        assert_eq!(slug("NARAKA: BLADEPOINT"), "naraka-bladepoint");
        assert_eq!(slug("Rocket League®"), "rocket-league");
    }
}

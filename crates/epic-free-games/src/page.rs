//! Rendered-page model — the seam between the browser fetcher and the
//! extractor heuristics.
//!
//! The extractor only ever sees this flattened view, so it can be exercised
//! in tests without launching a browser.

use scraper::{ElementRef, Html};

/// An `<img>` element from the rendered DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageNode {
    pub src: String,
    pub alt: String,
}

/// An `<a>` element carrying an `href`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorNode {
    pub href: String,
    pub text: String,
}

/// A DOM element with at least one descendant image, kept in document order.
/// Backs the proximity fallback: title text nearby implies a related image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerNode {
    pub text: String,
    pub image_srcs: Vec<String>,
}

/// The fully rendered store page, reduced to what the heuristics consume.
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    /// Trimmed, non-empty visible text lines in document order.
    pub lines: Vec<String>,
    pub images: Vec<ImageNode>,
    pub anchors: Vec<AnchorNode>,
    pub containers: Vec<ContainerNode>,
}

impl RenderedPage {
    /// Build a page view from the browser's visible text and full HTML.
    pub fn from_parts(visible_text: &str, html: &str) -> Self {
        let mut page = Self::from_html(html);
        page.lines = split_lines(visible_text);
        page
    }

    /// Parse image, anchor, and container nodes out of raw HTML.
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);

        let mut images = Vec::new();
        let mut anchors = Vec::new();
        let mut containers = Vec::new();

        for node in document.tree.nodes() {
            let Some(element) = ElementRef::wrap(node) else {
                continue;
            };

            match element.value().name() {
                "img" => {
                    // Lazy-loading frameworks park the real URL in data-src.
                    let src = element
                        .value()
                        .attr("src")
                        .filter(|s| !s.is_empty())
                        .or_else(|| element.value().attr("data-src"))
                        .unwrap_or("");
                    if !src.is_empty() {
                        images.push(ImageNode {
                            src: src.to_string(),
                            alt: element.value().attr("alt").unwrap_or("").to_string(),
                        });
                    }
                }
                "a" => {
                    if let Some(href) = element.value().attr("href") {
                        anchors.push(AnchorNode {
                            href: href.to_string(),
                            text: element.text().collect::<String>(),
                        });
                    }
                }
                _ => {}
            }

            if element.value().name() == "img" {
                continue;
            }
            let image_srcs = descendant_image_srcs(&element);
            if !image_srcs.is_empty() {
                containers.push(ContainerNode {
                    text: element.text().collect::<String>(),
                    image_srcs,
                });
            }
        }

        Self {
            lines: Vec::new(),
            images,
            anchors,
            containers,
        }
    }
}

/// Split visible text into the trimmed, non-empty lines the line-scan expects.
pub fn split_lines(visible_text: &str) -> Vec<String> {
    visible_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn descendant_image_srcs(element: &ElementRef) -> Vec<String> {
    let mut srcs = Vec::new();
    for node in element.descendants() {
        let Some(child) = ElementRef::wrap(node) else {
            continue;
        };
        if child.value().name() != "img" {
            continue;
        }
        let src = child
            .value()
            .attr("src")
            .filter(|s| !s.is_empty())
            .or_else(|| child.value().attr("data-src"))
            .unwrap_or("");
        if !src.is_empty() {
            srcs.push(src.to_string());
        }
    }
    srcs
}

//! Content Matcher
//!
//! A share counts only when its text is *exactly* one of the sanctioned
//! strings for a catalog link: the default text or one of its
//! translations, compared after trimming. Merely containing the link is
//! not enough.
//!
//! Any referenced URL producing a match makes the share valid, even if the
//! post carries other links as well.

use serde::Serialize;
use tracing::debug;

use crate::catalog::{ContentCatalog, ContentItem};
use crate::events::SocialEvent;
use crate::normalizer::{expanded_urls, extract_shared_text};

/// How the shared text matched a catalog item
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Default,
    Translation,
}

/// A catalog item a share was matched against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMatch<'a> {
    pub item: &'a ContentItem,
    pub kind: MatchKind,
}

/// Whether `event` is a rewardable share of catalog content
pub fn is_valid_share(event: &SocialEvent, catalog: &ContentCatalog) -> bool {
    find_match(event, catalog).is_some()
}

/// Finds the catalog item a share event matches, if any
pub fn find_match<'a>(event: &SocialEvent, catalog: &'a ContentCatalog) -> Option<ContentMatch<'a>> {
    let shared = extract_shared_text(event)?;
    let shared = shared.trim();

    let links = expanded_urls(event);
    debug!(links = ?links, "Links in tweet");

    links
        .into_iter()
        .find_map(|link| match_link(link, shared, catalog))
}

fn match_link<'a>(link: &str, shared: &str, catalog: &'a ContentCatalog) -> Option<ContentMatch<'a>> {
    let mut candidates = catalog
        .items()
        .iter()
        .filter(|item| item.link.to_lowercase() == link.to_lowercase())
        .peekable();

    if candidates.peek().is_none() {
        debug!(link = %link, "No rewardable content has the link");
        return None;
    }

    let found = candidates.find_map(|item| match_text(item, shared));
    if found.is_none() {
        debug!(link = %link, "Just a random tweet with the link, dropping event");
    }
    found
}

fn match_text<'a>(item: &'a ContentItem, shared: &str) -> Option<ContentMatch<'a>> {
    if item.default_text.trim() == shared {
        return Some(ContentMatch { item, kind: MatchKind::Default });
    }

    item.translations
        .iter()
        .any(|translation| translation.trim() == shared)
        .then_some(ContentMatch { item, kind: MatchKind::Translation })
}

/// Maps translated content to its default-language text.
///
/// Text that already is some item's default text, or that matches nothing,
/// is returned unchanged. Fingerprints computed from the result are the
/// same for a translated share and a default-language share.
pub fn resolve_canonical_text(text: &str, catalog: &ContentCatalog) -> String {
    let trimmed = text.trim();

    if catalog
        .items()
        .iter()
        .any(|item| item.default_text.trim() == trimmed)
    {
        return text.to_string();
    }

    catalog
        .items()
        .iter()
        .find(|item| item.translations.iter().any(|t| t.trim() == trimmed))
        .map(|item| item.default_text.trim().to_string())
        .unwrap_or_else(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ActionType, EventEnvelope, SocialNetwork};
    use serde_json::json;

    const DEFAULT: &str = "Check this out http://example.com/promo";
    const FRENCH: &str = "Regarde ça http://example.com/promo";

    fn catalog() -> ContentCatalog {
        ContentCatalog::from_items(vec![
            ContentItem::new("http://example.com/promo", DEFAULT).with_translation(FRENCH),
            ContentItem::new("http://example.com/other", "Other content http://example.com/other"),
        ])
    }

    fn share(text: &str, urls: &[(&str, &str)]) -> SocialEvent {
        let urls: Vec<_> = urls
            .iter()
            .map(|(short, long)| json!({ "url": short, "expanded_url": long }))
            .collect();
        SocialEvent::from_envelope(EventEnvelope::new(
            SocialNetwork::Twitter,
            ActionType::Share,
            json!({ "text": text, "entities": { "urls": urls } }),
        ))
        .unwrap()
    }

    #[test]
    fn test_default_text_matches() {
        let event = share(
            "Check this out http://t.co/abc",
            &[("http://t.co/abc", "http://example.com/promo")],
        );
        let catalog = catalog();

        assert!(is_valid_share(&event, &catalog));
        let found = find_match(&event, &catalog).unwrap();
        assert_eq!(found.kind, MatchKind::Default);
        assert_eq!(found.item.link, "http://example.com/promo");
    }

    #[test]
    fn test_unknown_link_is_invalid() {
        let event = share(
            "Check this out http://t.co/abc",
            &[("http://t.co/abc", "http://example.com/promo")],
        );
        let catalog = ContentCatalog::from_items(vec![ContentItem::new(
            "http://example.com/other",
            "Other content http://example.com/other",
        )]);

        assert!(!is_valid_share(&event, &catalog));
    }

    #[test]
    fn test_translation_matches() {
        let event = share(
            "  Regarde ça http://t.co/fr  ",
            &[("http://t.co/fr", "http://example.com/promo")],
        );

        let catalog = catalog();
        let found = find_match(&event, &catalog).unwrap();
        assert_eq!(found.kind, MatchKind::Translation);
        assert_eq!(found.item.link, "http://example.com/promo");
    }

    #[test]
    fn test_link_with_commentary_is_invalid() {
        let event = share(
            "Free money!! Check this out http://t.co/abc",
            &[("http://t.co/abc", "http://example.com/promo")],
        );

        assert!(!is_valid_share(&event, &catalog()));
    }

    #[test]
    fn test_link_comparison_ignores_case() {
        let event = share(
            "Check this out http://t.co/abc",
            &[("http://t.co/abc", "HTTP://Example.com/promo")],
        );
        let catalog = ContentCatalog::from_items(vec![ContentItem::new(
            "http://example.com/promo",
            "Check this out HTTP://Example.com/promo",
        )]);

        assert!(is_valid_share(&event, &catalog));
    }

    #[test]
    fn test_any_link_may_match() {
        let event = share(
            "Check this out http://t.co/abc http://t.co/zzz",
            &[
                ("http://t.co/zzz", "http://unrelated.example"),
                ("http://t.co/abc", "http://example.com/promo"),
            ],
        );
        let catalog = ContentCatalog::from_items(vec![ContentItem::new(
            "http://example.com/promo",
            "Check this out http://example.com/promo http://unrelated.example",
        )]);

        assert!(is_valid_share(&event, &catalog));
    }

    #[test]
    fn test_duplicate_links_all_considered() {
        let catalog = ContentCatalog::from_items(vec![
            ContentItem::new("http://example.com/promo", "First wording http://example.com/promo"),
            ContentItem::new("http://example.com/promo", "Second wording http://example.com/promo"),
        ]);
        let event = share(
            "Second wording http://t.co/abc",
            &[("http://t.co/abc", "http://example.com/promo")],
        );

        assert!(is_valid_share(&event, &catalog));
    }

    #[test]
    fn test_no_links_is_invalid() {
        let event = share(DEFAULT, &[]);
        assert!(!is_valid_share(&event, &catalog()));
    }

    #[test]
    fn test_follow_is_invalid() {
        let event = SocialEvent::from_envelope(EventEnvelope::new(
            SocialNetwork::Twitter,
            ActionType::Follow,
            json!({ "target": { "id_str": "2", "screen_name": "follower" } }),
        ))
        .unwrap();

        assert!(!is_valid_share(&event, &catalog()));
    }

    #[test]
    fn test_empty_catalog_is_invalid() {
        let event = share(
            "Check this out http://t.co/abc",
            &[("http://t.co/abc", "http://example.com/promo")],
        );
        assert!(!is_valid_share(&event, &ContentCatalog::default()));
    }

    #[test]
    fn test_resolve_canonical_text() {
        let catalog = catalog();

        assert_eq!(resolve_canonical_text(DEFAULT, &catalog), DEFAULT);
        assert_eq!(resolve_canonical_text(FRENCH, &catalog), DEFAULT);
        assert_eq!(resolve_canonical_text(" Regarde ça http://example.com/promo\n", &catalog), DEFAULT);
        assert_eq!(resolve_canonical_text("unrelated", &catalog), "unrelated");
    }

    #[test]
    fn test_resolve_canonical_text_is_idempotent() {
        let catalog = catalog();
        for input in [DEFAULT, FRENCH, "  padded default  ", "unrelated", ""] {
            let once = resolve_canonical_text(input, &catalog);
            assert_eq!(resolve_canonical_text(&once, &catalog), once);
        }
    }
}

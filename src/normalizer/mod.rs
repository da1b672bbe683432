//! Event Normalizer
//!
//! Reconstructs the text the user actually posted. Twitter rewrites every
//! link to a `t.co` short URL and HTML-escapes the status, so both have to
//! be undone before the text can be compared with catalog content.
//!
//! Twitter also prepends `http://` to anything it recognises as a URL, so
//! catalog content should always spell links with an explicit scheme.

pub mod html;

use tracing::debug;

use crate::events::{SocialEvent, Tweet};

pub use html::decode_entities;

/// Returns the reconstructed text of a share event, `None` for any other
/// action.
pub fn extract_shared_text(event: &SocialEvent) -> Option<String> {
    event.as_share().map(expand_tweet_text)
}

/// Expands short URLs and decodes HTML references in the tweet's full text
pub fn expand_tweet_text(tweet: &Tweet) -> String {
    let mut content = tweet.full_text().to_string();
    debug!(content = %content, "Content from network");

    // Short URLs are unique within a tweet, so replacement order is irrelevant
    for entity in tweet.url_entities() {
        if entity.url.is_empty() {
            continue;
        }
        content = content.replace(&entity.url, &entity.expanded_url);
    }

    let decoded = decode_entities(&content);
    debug!(content = %decoded, "Resolved content");

    decoded
}

/// Expanded URLs referenced by a share event, in entity order
pub fn expanded_urls(event: &SocialEvent) -> Vec<&str> {
    event
        .as_share()
        .map(|tweet| {
            tweet
                .url_entities()
                .iter()
                .map(|entity| entity.expanded_url.as_str())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ActionType, EventEnvelope, SocialNetwork};
    use serde_json::json;

    fn share(payload: serde_json::Value) -> SocialEvent {
        SocialEvent::from_envelope(EventEnvelope::new(
            SocialNetwork::Twitter,
            ActionType::Share,
            payload,
        ))
        .unwrap()
    }

    #[test]
    fn test_expands_short_urls() {
        let event = share(json!({
            "text": "Check this out http://t.co/abc",
            "entities": { "urls": [
                { "url": "http://t.co/abc", "expanded_url": "http://example.com/promo" }
            ]}
        }));

        assert_eq!(
            extract_shared_text(&event).as_deref(),
            Some("Check this out http://example.com/promo")
        );
        assert_eq!(expanded_urls(&event), vec!["http://example.com/promo"]);
    }

    #[test]
    fn test_uses_extended_tweet() {
        let event = share(json!({
            "text": "Truncated http://t.co/…",
            "entities": { "urls": [] },
            "extended_tweet": {
                "full_text": "Full &amp; untruncated http://t.co/xyz",
                "entities": { "urls": [
                    { "url": "http://t.co/xyz", "expanded_url": "http://example.com/long" }
                ]}
            }
        }));

        assert_eq!(
            extract_shared_text(&event).as_deref(),
            Some("Full & untruncated http://example.com/long")
        );
        assert_eq!(expanded_urls(&event), vec!["http://example.com/long"]);
    }

    #[test]
    fn test_replaces_every_occurrence() {
        let event = share(json!({
            "text": "http://t.co/a and again http://t.co/a",
            "entities": { "urls": [
                { "url": "http://t.co/a", "expanded_url": "http://example.com/a" }
            ]}
        }));

        assert_eq!(
            extract_shared_text(&event).as_deref(),
            Some("http://example.com/a and again http://example.com/a")
        );
    }

    #[test]
    fn test_no_entities_still_decodes() {
        let event = share(json!({ "text": "Fish &amp; chips http://t.co/zzz" }));

        assert_eq!(
            extract_shared_text(&event).as_deref(),
            Some("Fish & chips http://t.co/zzz")
        );
        assert!(expanded_urls(&event).is_empty());
    }

    #[test]
    fn test_follow_has_no_shared_text() {
        let event = SocialEvent::from_envelope(EventEnvelope::new(
            SocialNetwork::Twitter,
            ActionType::Follow,
            json!({ "target": { "id_str": "2", "screen_name": "follower" } }),
        ))
        .unwrap();

        assert_eq!(extract_shared_text(&event), None);
        assert!(expanded_urls(&event).is_empty());
    }
}

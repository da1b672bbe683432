//! Twitter webhook payloads
//!
//! Only the fields the reward logic reads are modelled; everything else in
//! the account activity payload is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// A shortened URL annotation (`t.co` link and what it points to)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UrlEntity {
    pub url: String,
    pub expanded_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TweetEntities {
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
}

/// Untruncated variant of a tweet longer than 140 characters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtendedTweet {
    pub full_text: String,
    #[serde(default)]
    pub entities: Option<TweetEntities>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TwitterUser {
    pub id_str: String,
    pub screen_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub followers_count: Option<u64>,
    #[serde(default)]
    pub verified: bool,
}

/// A status (tweet or retweet) posted by the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tweet {
    #[serde(default)]
    pub id_str: Option<String>,
    /// Possibly truncated to 140 characters
    pub text: String,
    #[serde(default)]
    pub extended_tweet: Option<ExtendedTweet>,
    #[serde(default)]
    pub entities: Option<TweetEntities>,
    #[serde(default)]
    pub user: Option<TwitterUser>,
}

impl Tweet {
    /// The full text of the tweet: extended text when present, else `text`
    pub fn full_text(&self) -> &str {
        match self.extended_tweet {
            Some(ref extended) => &extended.full_text,
            None => &self.text,
        }
    }

    /// URL annotations matching [`Tweet::full_text`]
    ///
    /// Extended tweets carry their own entity list; the top-level one only
    /// covers the truncated text.
    pub fn url_entities(&self) -> &[UrlEntity] {
        let entities = match self.extended_tweet {
            Some(ref extended) => extended.entities.as_ref(),
            None => self.entities.as_ref(),
        };
        entities.map(|e| e.urls.as_slice()).unwrap_or(&[])
    }
}

/// A follow event: `source` followed `target`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FollowEvent {
    #[serde(default)]
    pub source: Option<TwitterUser>,
    pub target: TwitterUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_extended_text_and_entities() {
        let tweet: Tweet = serde_json::from_value(serde_json::json!({
            "text": "Short version https://t.co/a…",
            "entities": { "urls": [] },
            "extended_tweet": {
                "full_text": "Short version is longer https://t.co/abc",
                "entities": { "urls": [
                    { "url": "https://t.co/abc", "expanded_url": "https://example.com/promo" }
                ]}
            }
        }))
        .unwrap();

        assert_eq!(tweet.full_text(), "Short version is longer https://t.co/abc");
        assert_eq!(tweet.url_entities().len(), 1);
        assert_eq!(tweet.url_entities()[0].expanded_url, "https://example.com/promo");
    }

    #[test]
    fn test_missing_entities_is_empty() {
        let tweet: Tweet = serde_json::from_value(serde_json::json!({
            "text": "No links here"
        }))
        .unwrap();

        assert_eq!(tweet.full_text(), "No links here");
        assert!(tweet.url_entities().is_empty());
    }

    #[test]
    fn test_user_ignores_numeric_id() {
        let user: TwitterUser = serde_json::from_value(serde_json::json!({
            "id": 42,
            "id_str": "42",
            "screen_name": "origin",
            "followers_count": 1200
        }))
        .unwrap();

        assert_eq!(user.id_str, "42");
        assert_eq!(user.followers_count, Some(1200));
        assert!(!user.verified);
    }
}

//! Social network events
//!
//! Webhooks deliver loosely-typed JSON; this module turns an
//! [`EventEnvelope`] into a [`SocialEvent`], a closed set of the
//! (network, action) combinations the reward logic understands. Anything
//! else is routed to [`RewardsError::UnsupportedEvent`] and logged.

pub mod telegram;
pub mod twitter;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;
use tracing::warn;

use crate::error::{RewardsError, Result};

pub use telegram::TelegramUser;
pub use twitter::{ExtendedTweet, FollowEvent, Tweet, TweetEntities, TwitterUser, UrlEntity};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SocialNetwork {
    Twitter,
    Telegram,
}

impl SocialNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialNetwork::Twitter => "TWITTER",
            SocialNetwork::Telegram => "TELEGRAM",
        }
    }
}

impl fmt::Display for SocialNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SocialNetwork {
    type Err = RewardsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TWITTER" => Ok(SocialNetwork::Twitter),
            "TELEGRAM" => Ok(SocialNetwork::Telegram),
            _ => Err(RewardsError::ParseError(format!("unknown social network: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Share,
    Follow,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Share => "SHARE",
            ActionType::Follow => "FOLLOW",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = RewardsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "SHARE" => Ok(ActionType::Share),
            "FOLLOW" => Ok(ActionType::Follow),
            _ => Err(RewardsError::ParseError(format!("unknown action type: {}", s))),
        }
    }
}

/// Raw webhook delivery: which network, what kind of action, and the
/// network-specific payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub social_network: String,
    #[serde(rename = "type")]
    pub action: String,
    pub event: serde_json::Value,
}

impl EventEnvelope {
    pub fn new(network: SocialNetwork, action: ActionType, event: serde_json::Value) -> Self {
        Self {
            social_network: network.as_str().to_string(),
            action: action.as_str().to_string(),
            event,
        }
    }
}

/// A supported social action with its typed payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocialEvent {
    TwitterShare(Tweet),
    TwitterFollow(FollowEvent),
    TelegramFollow(TelegramUser),
}

impl SocialEvent {
    /// Routes an envelope to its typed variant.
    ///
    /// Unknown networks, unknown actions and unsupported combinations are
    /// logged and returned as [`RewardsError::UnsupportedEvent`].
    pub fn from_envelope(envelope: EventEnvelope) -> Result<Self> {
        let network = envelope.social_network.parse::<SocialNetwork>().ok();
        let action = envelope.action.parse::<ActionType>().ok();

        let parsed = match (network, action) {
            (Some(SocialNetwork::Twitter), Some(ActionType::Share)) => {
                serde_json::from_value(envelope.event).map(SocialEvent::TwitterShare)
            }
            (Some(SocialNetwork::Twitter), Some(ActionType::Follow)) => {
                serde_json::from_value(envelope.event).map(SocialEvent::TwitterFollow)
            }
            (Some(SocialNetwork::Telegram), Some(ActionType::Follow)) => {
                serde_json::from_value(envelope.event).map(SocialEvent::TelegramFollow)
            }
            _ => {
                warn!(
                    network = %envelope.social_network,
                    action = %envelope.action,
                    "Unsupported social event"
                );
                crate::metrics::record_unsupported_event(
                    &envelope.social_network,
                    &envelope.action,
                );
                return Err(RewardsError::UnsupportedEvent {
                    network: envelope.social_network,
                    action: envelope.action,
                });
            }
        };

        parsed.map_err(|e| {
            RewardsError::InvalidEvent(format!(
                "{} {} payload: {}",
                envelope.social_network, envelope.action, e
            ))
        })
    }

    pub fn network(&self) -> SocialNetwork {
        match self {
            SocialEvent::TwitterShare(_) | SocialEvent::TwitterFollow(_) => SocialNetwork::Twitter,
            SocialEvent::TelegramFollow(_) => SocialNetwork::Telegram,
        }
    }

    pub fn action(&self) -> ActionType {
        match self {
            SocialEvent::TwitterShare(_) => ActionType::Share,
            SocialEvent::TwitterFollow(_) | SocialEvent::TelegramFollow(_) => ActionType::Follow,
        }
    }

    /// The tweet, for share events
    pub fn as_share(&self) -> Option<&Tweet> {
        match self {
            SocialEvent::TwitterShare(tweet) => Some(tweet),
            _ => None,
        }
    }

    /// Profile of the account the reward is attributed to.
    ///
    /// Twitter follows are delivered from the followed account's point of
    /// view, so the user is `target`; shares carry the author in `user`.
    pub fn user_profile(&self) -> Option<UserProfile> {
        match self {
            SocialEvent::TwitterShare(tweet) => tweet.user.as_ref().map(UserProfile::from_twitter),
            SocialEvent::TwitterFollow(follow) => Some(UserProfile::from_twitter(&follow.target)),
            SocialEvent::TelegramFollow(user) => Some(UserProfile {
                network: SocialNetwork::Telegram,
                id: user.id.to_string(),
                username: user.username.clone(),
                display_name: user.display_name(),
                followers_count: None,
                verified: false,
            }),
        }
    }
}

/// Network-independent view of the acting account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub network: SocialNetwork,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers_count: Option<u64>,
    #[serde(default)]
    pub verified: bool,
}

impl UserProfile {
    fn from_twitter(user: &TwitterUser) -> Self {
        Self {
            network: SocialNetwork::Twitter,
            id: user.id_str.clone(),
            username: Some(user.screen_name.clone()),
            display_name: user.name.clone(),
            followers_count: user.followers_count,
            verified: user.verified,
        }
    }
}

/// Reads newline-delimited JSON envelopes, skipping blank lines
pub fn read_envelopes<R: BufRead>(reader: R) -> Result<Vec<EventEnvelope>> {
    let mut envelopes = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        envelopes.push(serde_json::from_str(&line)?);
    }
    Ok(envelopes)
}

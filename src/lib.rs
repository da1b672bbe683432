//! Social reward share validation
//!
//! Decides whether a social network event is a rewardable share of the
//! active growth campaign's content, and fingerprints the canonical text
//! so reward claims can be correlated with the post.
//!
//! Features:
//! - Campaign catalog fetched over GraphQL, swapped atomically on refresh
//! - Typed Twitter/Telegram events with unsupported combinations rejected
//! - Short URL expansion and HTML entity decoding of tweet text
//! - Translation-aware matching and canonicalization
//! - MD5 content fingerprints shared with the growth engine rules
//! - Prometheus metrics

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod fingerprint;
pub mod http_client;
pub mod matcher;
pub mod metrics;
pub mod normalizer;
pub mod validator;

pub use catalog::{CatalogStore, ContentCatalog, ContentItem, RefreshOutcome};
pub use error::{RewardsError, Result};
pub use events::{ActionType, EventEnvelope, SocialEvent, SocialNetwork, UserProfile};
pub use fingerprint::{fingerprint, FINGERPRINT_VERSION};
pub use validator::{ShareValidator, ShareVerdict, ValidationMode};

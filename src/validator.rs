//! Share Validator
//!
//! Ties the catalog, matcher and hasher together behind one injectable
//! value. The catalog snapshot is loaded on every call, so a refresh takes
//! effect for the very next validation.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::catalog::CatalogStore;
use crate::error::RewardsError;
use crate::events::{ActionType, SocialEvent, SocialNetwork, UserProfile};
use crate::fingerprint::{fingerprint, FINGERPRINT_VERSION};
use crate::matcher::{self, MatchKind};
use crate::metrics;
use crate::normalizer::extract_shared_text;

/// How strictly shares are checked against the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Shares must match catalog content
    #[default]
    Strict,
    /// TEST MODE: every share with text is valid and text is never
    /// canonicalized. Follows stay invalid as before.
    AlwaysValid,
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::Strict => f.write_str("strict"),
            ValidationMode::AlwaysValid => f.write_str("always_valid"),
        }
    }
}

impl FromStr for ValidationMode {
    type Err = RewardsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(ValidationMode::Strict),
            "always_valid" | "test" => Ok(ValidationMode::AlwaysValid),
            other => Err(RewardsError::ValidationError(format!(
                "unknown validation mode: {} (expected strict or always_valid)",
                other
            ))),
        }
    }
}

/// Outcome of validating one event
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShareVerdict {
    pub valid: bool,
    pub network: SocialNetwork,
    pub action: ActionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint_version: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_by: Option<MatchKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

/// Validates social events against the current catalog snapshot
#[derive(Clone)]
pub struct ShareValidator {
    catalog: Arc<CatalogStore>,
    mode: ValidationMode,
}

impl ShareValidator {
    pub fn new(catalog: Arc<CatalogStore>, mode: ValidationMode) -> Self {
        if mode == ValidationMode::AlwaysValid {
            warn!("Share validator running in ALWAYS_VALID test mode: catalog checks are bypassed");
        }
        Self { catalog, mode }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    /// Whether the event is a rewardable share
    pub fn is_valid_share(&self, event: &SocialEvent) -> bool {
        match self.mode {
            ValidationMode::Strict => matcher::is_valid_share(event, &self.catalog.get()),
            ValidationMode::AlwaysValid => extract_shared_text(event).is_some(),
        }
    }

    /// Default-language text for `text`, see [`matcher::resolve_canonical_text`]
    pub fn resolve_canonical_text(&self, text: &str) -> String {
        match self.mode {
            ValidationMode::Strict => matcher::resolve_canonical_text(text, &self.catalog.get()),
            ValidationMode::AlwaysValid => text.to_string(),
        }
    }

    /// Full verdict for an event, including the fingerprint of its
    /// canonical (trimmed, default-language) text when valid
    pub fn validate(&self, event: &SocialEvent) -> ShareVerdict {
        let started = Instant::now();
        let catalog = self.catalog.get();
        let shared_text = extract_shared_text(event);

        let mut verdict = ShareVerdict {
            valid: false,
            network: event.network(),
            action: event.action(),
            shared_text: shared_text.clone(),
            canonical_text: None,
            fingerprint: None,
            fingerprint_version: None,
            matched_link: None,
            matched_by: None,
            user: event.user_profile(),
        };

        if let Some(shared) = shared_text {
            let (valid, canonical) = match self.mode {
                ValidationMode::Strict => match matcher::find_match(event, &catalog) {
                    Some(found) => {
                        verdict.matched_link = Some(found.item.link.clone());
                        verdict.matched_by = Some(found.kind);
                        (true, matcher::resolve_canonical_text(shared.trim(), &catalog))
                    }
                    None => (false, shared),
                },
                ValidationMode::AlwaysValid => (true, shared.trim().to_string()),
            };

            if valid {
                verdict.valid = true;
                verdict.fingerprint = Some(fingerprint(&canonical));
                verdict.fingerprint_version = Some(FINGERPRINT_VERSION);
                verdict.canonical_text = Some(canonical);
            }
        }

        debug!(
            network = %verdict.network,
            action = %verdict.action,
            valid = verdict.valid,
            fingerprint = ?verdict.fingerprint,
            "Validated social event"
        );
        metrics::record_validation(verdict.network.as_str(), verdict.valid);
        metrics::record_validation_latency(started.elapsed().as_secs_f64());

        verdict
    }
}

//! Content Catalog Cache
//!
//! Holds the reward-eligible content of the active campaign. The catalog is
//! swapped wholesale through an `ArcSwap`, so validations always read a
//! complete snapshot and never wait on a refresh in flight. A failed
//! refresh keeps the previous catalog.

pub mod campaign;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::metrics;

pub use campaign::{Campaign, CampaignSource, GraphQlCampaignSource, MockCampaignSource};

/// One piece of sanctioned shareable text tied to a canonical link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub link: String,
    pub default_text: String,
    #[serde(default)]
    pub translations: Vec<String>,
}

impl ContentItem {
    pub fn new(link: impl Into<String>, default_text: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            default_text: default_text.into(),
            translations: vec![],
        }
    }

    pub fn with_translation(mut self, text: impl Into<String>) -> Self {
        self.translations.push(text.into());
        self
    }
}

/// Snapshot of the active campaign's content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCatalog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub items: Vec<ContentItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl ContentCatalog {
    pub fn from_items(items: Vec<ContentItem>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn from_campaign(campaign: &Campaign) -> Self {
        Self {
            campaign_id: Some(campaign.id.clone()),
            campaign_status: campaign.status.clone(),
            start_date: campaign.start_date.clone(),
            end_date: campaign.end_date.clone(),
            items: campaign.content_items(),
            refreshed_at: Some(Utc::now()),
        }
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Result of a refresh attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new catalog with this many items was installed
    Installed(usize),
    /// Fetch failed; previous catalog retained
    Failed,
    /// Another refresh was already running
    InProgress,
}

/// Owned, injectable catalog store with atomic swap on refresh
pub struct CatalogStore {
    inner: ArcSwap<ContentCatalog>,
    refreshing: AtomicBool,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::with_catalog(ContentCatalog::default())
    }

    pub fn with_catalog(catalog: ContentCatalog) -> Self {
        Self {
            inner: ArcSwap::new(Arc::new(catalog)),
            refreshing: AtomicBool::new(false),
        }
    }

    /// Current snapshot. The returned `Arc` stays consistent even if a
    /// refresh swaps in new data.
    pub fn get(&self) -> Arc<ContentCatalog> {
        self.inner.load_full()
    }

    /// Installs a catalog directly
    pub fn replace(&self, catalog: ContentCatalog) {
        metrics::set_catalog_items(catalog.len() as i64);
        self.inner.store(Arc::new(catalog));
    }

    /// Fetches the active campaign and replaces the catalog.
    ///
    /// Never fails: errors are logged and the previous catalog is kept.
    /// Only one refresh runs at a time.
    pub async fn refresh(&self, source: &dyn CampaignSource) -> RefreshOutcome {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Catalog refresh already in progress, skipping");
            return RefreshOutcome::InProgress;
        }
        // Cleared on every exit, including a dropped future or a panic
        let _guard = RefreshGuard(&self.refreshing);

        let outcome = match self.try_refresh(source).await {
            Ok(count) => {
                metrics::record_catalog_refresh("success");
                info!(items = count, source = source.name(), "Populated valid contents");
                RefreshOutcome::Installed(count)
            }
            Err(e) => {
                metrics::record_catalog_refresh("failure");
                error!(
                    error = %e,
                    source = source.name(),
                    retained_items = self.get().len(),
                    "Failed to populate valid contents, keeping previous catalog"
                );
                RefreshOutcome::Failed
            }
        };

        outcome
    }

    /// Whether a refresh is currently running
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst)
    }

    async fn try_refresh(&self, source: &dyn CampaignSource) -> Result<usize> {
        let campaign = source.fetch_active_campaign().await?;
        let catalog = ContentCatalog::from_campaign(&campaign);
        let count = catalog.len();

        debug!(campaign_id = %campaign.id, items = ?catalog.items, "Installing catalog");
        self.replace(catalog);
        Ok(count)
    }
}

struct RefreshGuard<'a>(&'a AtomicBool);

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Spawns a background loop that refreshes the catalog on a timer until
/// `shutdown` fires.
pub fn spawn_refresh_loop(
    store: Arc<CatalogStore>,
    source: Arc<dyn CampaignSource>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    info!(interval_secs = interval.as_secs(), "Catalog refresh loop started");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; callers refresh at startup
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Catalog refresh loop stopping");
                    break;
                }
                _ = ticker.tick() => {
                    store.refresh(source.as_ref()).await;
                }
            }
        }
    })
}

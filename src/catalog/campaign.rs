//! Campaign Source Adapter
//!
//! The growth service exposes the active campaign over GraphQL. The
//! `CampaignSource` trait keeps the catalog independent of that transport
//! so tests can swap in [`MockCampaignSource`].

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::ContentItem;
use crate::error::{RewardsError, Result};
use crate::http_client::ResilientHttpClient;

/// Query for the active campaign and the content of its share actions
pub const ACTIVE_CAMPAIGN_QUERY: &str = r#"{
  campaign(id:"active") {
    id
    startDate
    endDate
    status
    actions {
      type
      ... on SocialShareAction {
        content {
          post {
            tweet {
              default
              translations {
                text
              }
            }
          }
          link
        }
      }
    }
  }
}"#;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TweetContent {
    pub default: String,
    #[serde(default)]
    pub translations: Option<Vec<Translation>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostContent {
    pub tweet: TweetContent,
}

/// Shareable content attached to a `SocialShareAction`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionContent {
    pub post: PostContent,
    pub link: String,
}

impl From<ActionContent> for ContentItem {
    fn from(content: ActionContent) -> Self {
        let translations = content
            .post
            .tweet
            .translations
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.text)
            .collect();

        ContentItem {
            link: content.link,
            default_text: content.post.tweet.default,
            translations,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampaignAction {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub content: Option<ActionContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub actions: Vec<CampaignAction>,
}

impl Campaign {
    /// Content of every action that has one; the action envelope is dropped
    pub fn content_items(&self) -> Vec<ContentItem> {
        self.actions
            .iter()
            .filter_map(|action| action.content.clone())
            .map(ContentItem::from)
            .collect()
    }
}

/// GraphQL `ID` arrives as a string, but some schemas expose `Int` ids
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "campaign id must be a string or a number, got {}",
            other
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct CampaignData {
    campaign: Option<Campaign>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<CampaignData>,
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

/// Adapter trait for campaign service implementations
#[async_trait]
pub trait CampaignSource: Send + Sync {
    /// Gets the adapter name
    fn name(&self) -> &str;

    /// Fetches the currently active campaign
    async fn fetch_active_campaign(&self) -> Result<Campaign>;
}

/// Growth service GraphQL adapter
pub struct GraphQlCampaignSource {
    client: ResilientHttpClient,
    endpoint: Option<String>,
}

impl GraphQlCampaignSource {
    /// `endpoint` is `GROWTH_SERVER_URL`; an unset endpoint makes every
    /// fetch fail with [`RewardsError::SourceNotConfigured`].
    pub fn new(client: ResilientHttpClient, endpoint: Option<String>) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    fn parse_response(body: serde_json::Value) -> Result<Campaign> {
        let response: GraphQlResponse = serde_json::from_value(body.clone())?;

        let data = match response.data {
            Some(data) => data,
            None => {
                let detail = response
                    .errors
                    .map(|errors| errors.to_string())
                    .unwrap_or_else(|| body.to_string());
                return Err(RewardsError::UpstreamError(format!(
                    "response has no data payload: {}",
                    detail
                )));
            }
        };

        data.campaign.ok_or(RewardsError::NoActiveCampaign)
    }
}

#[async_trait]
impl CampaignSource for GraphQlCampaignSource {
    fn name(&self) -> &str {
        "growth-graphql"
    }

    async fn fetch_active_campaign(&self) -> Result<Campaign> {
        let endpoint = self.endpoint.as_deref().ok_or_else(|| {
            RewardsError::SourceNotConfigured(
                "GROWTH_SERVER_URL environment variable missing".to_string(),
            )
        })?;

        debug!(endpoint = %endpoint, "Querying active campaign");

        let response = self
            .client
            .post_json(endpoint, &serde_json::json!({ "query": ACTIVE_CAMPAIGN_QUERY }))
            .await?;
        let body: serde_json::Value = response.json().await?;

        Self::parse_response(body)
    }
}

/// Mock adapter for testing
///
/// Serves queued results in order and repeats the last one once the queue
/// is drained.
pub struct MockCampaignSource {
    results: Mutex<Vec<MockResult>>,
}

enum MockResult {
    Campaign(Campaign),
    NoData,
    NoActiveCampaign,
    NotConfigured,
}

impl MockResult {
    fn to_result(&self) -> Result<Campaign> {
        match self {
            MockResult::Campaign(campaign) => Ok(campaign.clone()),
            MockResult::NoData => Err(RewardsError::UpstreamError(
                "response has no data payload".to_string(),
            )),
            MockResult::NoActiveCampaign => Err(RewardsError::NoActiveCampaign),
            MockResult::NotConfigured => Err(RewardsError::SourceNotConfigured(
                "mock endpoint unset".to_string(),
            )),
        }
    }
}

impl MockCampaignSource {
    pub fn with_campaign(campaign: Campaign) -> Self {
        Self {
            results: Mutex::new(vec![MockResult::Campaign(campaign)]),
        }
    }

    pub fn without_data() -> Self {
        Self {
            results: Mutex::new(vec![MockResult::NoData]),
        }
    }

    pub fn without_active_campaign() -> Self {
        Self {
            results: Mutex::new(vec![MockResult::NoActiveCampaign]),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            results: Mutex::new(vec![MockResult::NotConfigured]),
        }
    }

    /// Queues a campaign to be served after the current results
    pub fn then_campaign(self, campaign: Campaign) -> Self {
        self.results.lock().push(MockResult::Campaign(campaign));
        self
    }

    /// Queues a response without a `data` payload
    pub fn then_without_data(self) -> Self {
        self.results.lock().push(MockResult::NoData);
        self
    }
}

#[async_trait]
impl CampaignSource for MockCampaignSource {
    fn name(&self) -> &str {
        "Mock campaign source"
    }

    async fn fetch_active_campaign(&self) -> Result<Campaign> {
        let mut results = self.results.lock();
        if results.len() > 1 {
            results.remove(0).to_result()
        } else {
            results
                .first()
                .map(MockResult::to_result)
                .unwrap_or(Err(RewardsError::NoActiveCampaign))
        }
    }
}

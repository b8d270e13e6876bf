use crate::{
    config::ProviderConfig, error::DataError, provider::send_json, source::FearGreedSource,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const CAPABILITY: &str = "fear-greed";

/// Current value of the crypto fear & greed index.
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct FearGreed {
    /// Index in `[0, 100]`, 0 is extreme fear.
    pub value: u8,
    pub classification: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Label for an index value, matching the bands alternative.me publishes.
pub fn classify(value: u8) -> &'static str {
    match value {
        0..25 => "Extreme Fear",
        25..45 => "Fear",
        45..55 => "Neutral",
        55..75 => "Greed",
        _ => "Extreme Greed",
    }
}

/// alternative.me `/fng/` response.
///
/// ### Raw Payload Examples
/// See docs: <https://alternative.me/crypto/fear-and-greed-index/#api>
/// ```json
/// {
///     "name": "Fear and Greed Index",
///     "data": [
///         {
///             "value": "40",
///             "value_classification": "Fear",
///             "timestamp": "1551157200",
///             "time_until_update": "68499"
///         }
///     ],
///     "metadata": { "error": null }
/// }
/// ```
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct AlternativeMeResponse {
    #[serde(default)]
    pub data: Vec<AlternativeMeEntry>,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct AlternativeMeEntry {
    pub value: String,
    pub value_classification: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl TryFrom<AlternativeMeResponse> for FearGreed {
    type Error = DataError;

    fn try_from(response: AlternativeMeResponse) -> Result<Self, Self::Error> {
        let entry = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| DataError::capability(CAPABILITY, "no data from API"))?;

        let value = entry.value.trim().parse::<u8>().map_err(|error| {
            DataError::capability(CAPABILITY, format!("invalid value {:?}: {error}", entry.value))
        })?;

        let timestamp = entry
            .timestamp
            .and_then(|secs| secs.trim().parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        Ok(Self {
            value,
            classification: entry.value_classification,
            timestamp,
        })
    }
}

/// Live index from alternative.me.
#[derive(Debug, Clone)]
pub struct AlternativeMe {
    client: reqwest::Client,
    base_url: String,
}

impl AlternativeMe {
    pub fn new(client: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            base_url: config.fear_greed_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl FearGreedSource for AlternativeMe {
    async fn current(&self) -> Result<FearGreed, DataError> {
        let url = format!("{}/fng/", self.base_url);
        debug!(%url, "fetching fear & greed index");

        let response = send_json::<AlternativeMeResponse>(self.client.get(url))
            .await
            .map_err(|reason| {
                warn!(%reason, "fear & greed request failed");
                DataError::capability(CAPABILITY, reason)
            })?;

        FearGreed::try_from(response)
    }
}

/// Random index value with the matching classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedFearGreed;

#[async_trait]
impl FearGreedSource for SimulatedFearGreed {
    async fn current(&self) -> Result<FearGreed, DataError> {
        Ok(simulate(&mut rand::rng()))
    }
}

pub fn simulate<R>(rng: &mut R) -> FearGreed
where
    R: Rng + ?Sized,
{
    let value = rng.random_range(0..100);
    FearGreed {
        value,
        classification: classify(value).to_string(),
        timestamp: Some(Utc::now()),
    }
}

use crate::{error::DataError, source::SentimentSource};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Words reported by [`SimulatedSentiment::trending_words`].
pub const TRENDING_WORDS: [&str; 3] = ["bullrun", "pump", "moon"];

/// Net social sentiment for an asset, positive is bullish.
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct SentimentBalance {
    pub asset: String,
    pub sentiment_balance: f64,
    pub days: u32,
}

#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct SocialVolume {
    pub asset: String,
    pub social_volume: u64,
    pub days: u32,
}

#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct TrendingWords {
    pub trending_words: Vec<String>,
    pub days: u32,
}

/// Random sentiment figures.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedSentiment;

#[async_trait]
impl SentimentSource for SimulatedSentiment {
    async fn sentiment_balance(
        &self,
        asset: &str,
        days: u32,
    ) -> Result<SentimentBalance, DataError> {
        Ok(SentimentBalance {
            asset: asset.to_string(),
            sentiment_balance: simulate_balance(&mut rand::rng()),
            days,
        })
    }

    async fn social_volume(&self, asset: &str, days: u32) -> Result<SocialVolume, DataError> {
        Ok(SocialVolume {
            asset: asset.to_string(),
            social_volume: simulate_social_volume(&mut rand::rng()),
            days,
        })
    }

    async fn trending_words(&self, days: u32) -> Result<TrendingWords, DataError> {
        Ok(TrendingWords {
            trending_words: TRENDING_WORDS.iter().map(|word| word.to_string()).collect(),
            days,
        })
    }
}

/// Balance in `[-25, 25)`.
pub fn simulate_balance<R>(rng: &mut R) -> f64
where
    R: Rng + ?Sized,
{
    (rng.random::<f64>() - 0.5) * 50.0
}

/// Mention count in `[10_000, 60_000)`.
pub fn simulate_social_volume<R>(rng: &mut R) -> u64
where
    R: Rng + ?Sized,
{
    rng.random_range(10_000..60_000)
}

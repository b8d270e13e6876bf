use crate::{
    candle::Timeframe,
    error::DataError,
    source::{
        fear_greed::FearGreed,
        funding::FundingRate,
        indicator::{IndicatorKind, IndicatorValues},
        sentiment::{SentimentBalance, SocialVolume, TrendingWords},
        whale::{Blockchain, WhaleReport},
    },
    symbol::MarketSymbol,
};
use async_trait::async_trait;

/// Fear & greed index from alternative.me, with a simulated fallback.
pub mod fear_greed;

/// Simulated perpetual funding rates.
pub mod funding;

/// Simulated technical indicators.
pub mod indicator;

/// Simulated social sentiment.
pub mod sentiment;

/// Large on-chain transactions from blockchain.info, with generated fallback data.
pub mod whale;

/// Default lookback, in days, for sentiment queries.
pub const DEFAULT_SENTIMENT_DAYS: u32 = 7;

/// Default asset for sentiment queries.
pub const DEFAULT_SENTIMENT_ASSET: &str = "bitcoin";

#[async_trait]
pub trait IndicatorSource: Send + Sync {
    async fn indicator(
        &self,
        kind: IndicatorKind,
        symbol: &MarketSymbol,
        timeframe: Timeframe,
    ) -> Result<IndicatorValues, DataError>;
}

#[async_trait]
pub trait SentimentSource: Send + Sync {
    async fn sentiment_balance(&self, asset: &str, days: u32)
    -> Result<SentimentBalance, DataError>;

    async fn social_volume(&self, asset: &str, days: u32) -> Result<SocialVolume, DataError>;

    async fn trending_words(&self, days: u32) -> Result<TrendingWords, DataError>;
}

#[async_trait]
pub trait FearGreedSource: Send + Sync {
    async fn current(&self) -> Result<FearGreed, DataError>;
}

#[async_trait]
pub trait WhaleSource: Send + Sync {
    /// Recent large transactions on `blockchain`, or on every supported chain when `None`.
    async fn recent_transactions(
        &self,
        blockchain: Option<Blockchain>,
        min_value_usd: f64,
    ) -> Result<WhaleReport, DataError>;
}

#[async_trait]
pub trait FundingSource: Send + Sync {
    /// One [`FundingRate`] per `exchange` x `symbol` pair, exchange-major.
    async fn funding_rates(
        &self,
        symbols: &[String],
        exchanges: &[String],
    ) -> Result<Vec<FundingRate>, DataError>;
}

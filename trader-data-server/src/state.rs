use std::sync::Arc;
use trader_data::{
    prediction::Predictor,
    resolver::CandleResolver,
    scanner::MarketScanner,
    source::{
        FearGreedSource, FundingSource, IndicatorSource, SentimentSource, WhaleSource,
        fear_greed::{AlternativeMe, SimulatedFearGreed},
        funding::SimulatedFunding,
        indicator::SimulatedIndicators,
        sentiment::SimulatedSentiment,
        whale::FreeWhaleTracker,
    },
};

use crate::config::ServerConfig;

/// Capability names reported by the health endpoint.
pub const CAPABILITIES: [&str; 5] = ["indicators", "feargreed", "sentiment", "whale", "funding"];

/// Shared application state, passed to all route handlers via `axum::extract::State`.
pub struct AppState {
    pub resolver: CandleResolver,
    pub indicators: Arc<dyn IndicatorSource>,
    pub sentiment: Arc<dyn SentimentSource>,
    pub fear_greed: Arc<dyn FearGreedSource>,
    pub whales: Arc<dyn WhaleSource>,
    pub funding: Arc<dyn FundingSource>,
    pub predictor: Predictor,
    pub scanner: MarketScanner,
}

impl AppState {
    /// Wire the live providers and capability sources from `config`.
    pub fn new(config: &ServerConfig) -> Result<Arc<Self>, reqwest::Error> {
        let client = config.providers.http_client()?;
        let resolver = CandleResolver::new(config.providers.clone())?;

        let indicators: Arc<dyn IndicatorSource> = Arc::new(SimulatedIndicators);
        let sentiment: Arc<dyn SentimentSource> = Arc::new(SimulatedSentiment);

        Ok(Arc::new(Self {
            resolver,
            predictor: Predictor::new(
                indicators.clone(),
                sentiment.clone(),
                Arc::new(SimulatedFearGreed),
            ),
            scanner: MarketScanner::new(indicators.clone()),
            indicators,
            sentiment,
            fear_greed: Arc::new(AlternativeMe::new(client.clone(), &config.providers)),
            whales: Arc::new(FreeWhaleTracker::new(client, &config.providers)),
            funding: Arc::new(SimulatedFunding),
        }))
    }
}

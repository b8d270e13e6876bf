use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trader_data::{
    candle::Timeframe,
    source::{
        DEFAULT_SENTIMENT_ASSET, DEFAULT_SENTIMENT_DAYS,
        fear_greed::FearGreed,
        funding::{DEFAULT_EXCHANGES, DEFAULT_SYMBOLS, FundingRate},
        indicator::{IndicatorKind, IndicatorValues},
        sentiment::{SentimentBalance, SocialVolume, TrendingWords},
        whale::{Blockchain, DEFAULT_MIN_VALUE_USD, WhaleReport},
    },
    symbol::MarketSymbol,
};

use crate::{
    error::ApiError,
    routes::Envelope,
    state::AppState,
};

const DEFAULT_INDICATOR_SYMBOL: &str = "BTC/USDT";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/indicators", post(indicators))
        .route("/api/fear-greed", get(fear_greed))
        .route("/api/sentiment", post(sentiment))
        .route("/api/social-volume", post(social_volume))
        .route("/api/trending-words", get(trending_words))
        .route("/api/whale-tracker", post(whale_tracker))
        .route("/api/funding-rates", post(funding_rates))
}

// Indicators

#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorRequest {
    pub indicator: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub timeframe: Option<Timeframe>,
}

pub async fn indicators(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IndicatorRequest>, JsonRejection>,
) -> Result<Json<Envelope<IndicatorValues>>, ApiError> {
    let Json(request) = payload?;

    let symbol = MarketSymbol::parse(
        request
            .symbol
            .as_deref()
            .unwrap_or(DEFAULT_INDICATOR_SYMBOL),
    );

    let values = state
        .indicators
        .indicator(
            IndicatorKind::from_token(&request.indicator),
            &symbol,
            request.timeframe.unwrap_or(Timeframe::H1),
        )
        .await?;

    Ok(Envelope::ok(values))
}

// Fear & Greed

pub async fn fear_greed(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<FearGreed>>, ApiError> {
    let mut index = state.fear_greed.current().await?;
    index.timestamp = None;
    Ok(Envelope::ok(index))
}

// Sentiment

/// Sentiment query selected by the `method` field of a sentiment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SentimentMethod {
    #[default]
    #[serde(rename = "get_sentiment_balance")]
    SentimentBalance,
    #[serde(rename = "get_social_volume")]
    SocialVolume,
    #[serde(rename = "get_trending_words")]
    TrendingWords,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentimentRequest {
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub method: SentimentMethod,
}

impl SentimentRequest {
    fn asset(&self) -> &str {
        self.asset.as_deref().unwrap_or(DEFAULT_SENTIMENT_ASSET)
    }

    fn days(&self) -> u32 {
        self.days.unwrap_or(DEFAULT_SENTIMENT_DAYS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SentimentData {
    Balance(SentimentBalance),
    Volume(SocialVolume),
    Words(TrendingWords),
}

pub async fn sentiment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SentimentRequest>, JsonRejection>,
) -> Result<Json<Envelope<SentimentData>>, ApiError> {
    let Json(request) = payload?;
    let source = &state.sentiment;

    let data = match request.method {
        SentimentMethod::SentimentBalance => SentimentData::Balance(
            source
                .sentiment_balance(request.asset(), request.days())
                .await?,
        ),
        SentimentMethod::SocialVolume => SentimentData::Volume(
            source.social_volume(request.asset(), request.days()).await?,
        ),
        SentimentMethod::TrendingWords => {
            SentimentData::Words(source.trending_words(request.days()).await?)
        }
    };

    Ok(Envelope::ok(data))
}

pub async fn social_volume(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SentimentRequest>, JsonRejection>,
) -> Result<Json<Envelope<SocialVolume>>, ApiError> {
    let Json(request) = payload?;
    let volume = state
        .sentiment
        .social_volume(request.asset(), request.days())
        .await?;
    Ok(Envelope::ok(volume))
}

#[derive(Debug, Clone, Deserialize)]
pub struct DaysQuery {
    #[serde(default)]
    pub days: Option<u32>,
}

pub async fn trending_words(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DaysQuery>, QueryRejection>,
) -> Result<Json<Envelope<TrendingWords>>, ApiError> {
    let Query(query) = query?;
    let words = state
        .sentiment
        .trending_words(query.days.unwrap_or(DEFAULT_SENTIMENT_DAYS))
        .await?;
    Ok(Envelope::ok(words))
}

// Whales

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhaleRequest {
    #[serde(default)]
    pub blockchain: Option<Blockchain>,
    #[serde(default)]
    pub min_value: Option<f64>,
}

pub async fn whale_tracker(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WhaleRequest>, JsonRejection>,
) -> Result<Json<Envelope<WhaleReport>>, ApiError> {
    let Json(request) = payload?;
    let report = state
        .whales
        .recent_transactions(
            request.blockchain,
            request.min_value.unwrap_or(DEFAULT_MIN_VALUE_USD),
        )
        .await?;
    Ok(Envelope::ok(report))
}

// Funding

#[derive(Debug, Clone, Deserialize)]
pub struct FundingRequest {
    #[serde(default)]
    pub symbols: Option<Vec<String>>,
    #[serde(default)]
    pub exchanges: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundingRates {
    pub funding_rates: Vec<FundingRate>,
}

pub async fn funding_rates(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FundingRequest>, JsonRejection>,
) -> Result<Json<Envelope<FundingRates>>, ApiError> {
    let Json(request) = payload?;

    let symbols = request
        .symbols
        .unwrap_or_else(|| DEFAULT_SYMBOLS.map(String::from).to_vec());
    let exchanges = request
        .exchanges
        .unwrap_or_else(|| DEFAULT_EXCHANGES.map(String::from).to_vec());

    let funding_rates = state.funding.funding_rates(&symbols, &exchanges).await?;
    Ok(Envelope::ok(FundingRates { funding_rates }))
}

//! Weighted-sum market direction score over indicator, sentiment and fear/greed inputs.
//!
//! The score is a heuristic for display only.

use crate::{
    candle::Timeframe,
    error::DataError,
    source::{
        DEFAULT_SENTIMENT_DAYS, FearGreedSource, IndicatorSource, SentimentSource,
        indicator::{IndicatorKind, IndicatorValues},
    },
    symbol::MarketSymbol,
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Starting confidence before signal strength is added.
pub const BASE_CONFIDENCE: i32 = 70;

pub const MIN_CONFIDENCE: i32 = 75;

pub const MAX_CONFIDENCE: i32 = 98;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[display("bullish")]
    Bullish,
    #[display("bearish")]
    Bearish,
}

/// Latest value of each Bollinger band.
#[derive(Copy, Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct Bands {
    pub lower: f64,
    pub middle: f64,
    pub upper: f64,
}

/// Latest capability readings a [`Prediction`] is scored from. Absent readings are skipped.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct Signals {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub histogram: Option<f64>,
    pub bands: Option<Bands>,
    pub atr: Option<f64>,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub sentiment: Option<f64>,
    pub fear_greed: Option<f64>,
}

impl Signals {
    /// Record the latest reading from an indicator, routing EMA values to the fast or slow
    /// slot.
    pub fn with_indicator(mut self, values: &IndicatorValues, slow: bool) -> Self {
        match values {
            IndicatorValues::Macd {
                macd, histogram, ..
            } => {
                self.macd = macd.last().copied();
                self.histogram = histogram.last().copied();
            }
            IndicatorValues::Bollinger {
                upper,
                middle,
                lower,
            } => {
                self.bands = match (lower.last(), middle.last(), upper.last()) {
                    (Some(&lower), Some(&middle), Some(&upper)) => Some(Bands {
                        lower,
                        middle,
                        upper,
                    }),
                    _ => None,
                };
            }
            IndicatorValues::Ema { .. } if slow => self.ema_slow = values.latest(),
            IndicatorValues::Ema { .. } => self.ema_fast = values.latest(),
            IndicatorValues::Atr { .. } => self.atr = values.latest(),
            IndicatorValues::Rsi { value } => self.rsi = Some(*value),
            IndicatorValues::Sma { .. } => {}
        }
        self
    }
}

/// Input readings echoed alongside a [`Prediction`], zero when absent.
#[derive(Copy, Clone, PartialEq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Factors {
    pub rsi: f64,
    pub macd: f64,
    pub bb: f64,
    pub atr: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub sentiment: f64,
    pub fear_greed: f64,
}

impl From<&Signals> for Factors {
    fn from(signals: &Signals) -> Self {
        Self {
            rsi: signals.rsi.unwrap_or_default(),
            macd: signals.macd.unwrap_or_default(),
            bb: signals.bands.map(|bands| bands.middle).unwrap_or_default(),
            atr: signals.atr.unwrap_or_default(),
            ema20: signals.ema_fast.unwrap_or_default(),
            ema50: signals.ema_slow.unwrap_or_default(),
            sentiment: signals.sentiment.unwrap_or_default(),
            fear_greed: signals.fear_greed.unwrap_or_default(),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct Prediction {
    pub direction: Direction,
    pub confidence: i32,
    pub score: i32,
    pub factors: Factors,
}

/// Score `signals`: positive is bullish.
pub fn score(signals: &Signals) -> i32 {
    let mut score = 0;

    if let Some(rsi) = signals.rsi {
        if rsi < 30.0 {
            score += 3;
        } else if rsi > 70.0 {
            score -= 3;
        } else if rsi > 50.0 {
            score += 1;
        }
    }

    if signals.macd.is_some_and(|macd| macd > 0.0) {
        score += 2;
    }
    if signals.histogram.is_some_and(|histogram| histogram > 0.0) {
        score += 1;
    }

    // Middle band stands in for the current price
    if let Some(bands) = signals.bands {
        let price = bands.middle;
        if price < bands.lower {
            score += 2;
        } else if price > bands.upper {
            score -= 2;
        } else if price > bands.middle {
            score += 1;
        }
    }

    if let (Some(fast), Some(slow)) = (signals.ema_fast, signals.ema_slow) {
        if fast > slow {
            score += 2;
        } else if fast < slow {
            score -= 2;
        }
    }

    if let Some(sentiment) = signals.sentiment {
        if sentiment > 10.0 {
            score += 2;
        } else if sentiment > 0.0 {
            score += 1;
        } else if sentiment < -10.0 {
            score -= 2;
        }
    }

    // Fear is read contrarian
    if let Some(fear_greed) = signals.fear_greed {
        if fear_greed > 70.0 {
            score += 1;
        } else if fear_greed < 30.0 {
            score += 2;
        }
    }

    score
}

pub fn predict(signals: &Signals) -> Prediction {
    let score = score(signals);

    let mut confidence = BASE_CONFIDENCE;
    if signals.atr.is_some_and(|atr| atr > 0.0) {
        confidence += 5;
    }
    confidence = (confidence + score.abs() * 4).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);

    Prediction {
        direction: if score > 0 {
            Direction::Bullish
        } else {
            Direction::Bearish
        },
        confidence,
        score,
        factors: Factors::from(signals),
    }
}

/// Query the RSI, MACD, Bollinger, ATR and fast/slow EMA readings for `symbol` concurrently.
pub async fn indicator_signals(
    indicators: &dyn IndicatorSource,
    symbol: &MarketSymbol,
    timeframe: Timeframe,
) -> Result<Signals, DataError> {
    let (rsi, macd, bands, atr, ema_fast, ema_slow) = futures::try_join!(
        indicators.indicator(IndicatorKind::Rsi, symbol, timeframe),
        indicators.indicator(IndicatorKind::Macd, symbol, timeframe),
        indicators.indicator(IndicatorKind::Bollinger, symbol, timeframe),
        indicators.indicator(IndicatorKind::Atr, symbol, timeframe),
        indicators.indicator(IndicatorKind::Ema, symbol, timeframe),
        indicators.indicator(IndicatorKind::Ema, symbol, timeframe),
    )?;

    Ok(Signals::default()
        .with_indicator(&rsi, false)
        .with_indicator(&macd, false)
        .with_indicator(&bands, false)
        .with_indicator(&atr, false)
        .with_indicator(&ema_fast, false)
        .with_indicator(&ema_slow, true))
}

/// Gathers [`Signals`] from the capability sources and scores them.
#[derive(Clone)]
pub struct Predictor {
    indicators: Arc<dyn IndicatorSource>,
    sentiment: Arc<dyn SentimentSource>,
    fear_greed: Arc<dyn FearGreedSource>,
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor").finish_non_exhaustive()
    }
}

impl Predictor {
    pub fn new(
        indicators: Arc<dyn IndicatorSource>,
        sentiment: Arc<dyn SentimentSource>,
        fear_greed: Arc<dyn FearGreedSource>,
    ) -> Self {
        Self {
            indicators,
            sentiment,
            fear_greed,
        }
    }

    /// Query every capability concurrently; any failure fails the whole prediction.
    pub async fn signals(
        &self,
        symbol: &MarketSymbol,
        timeframe: Timeframe,
    ) -> Result<Signals, DataError> {
        let asset = symbol.base.to_lowercase();

        let (indicators, sentiment, fear_greed) = futures::try_join!(
            indicator_signals(self.indicators.as_ref(), symbol, timeframe),
            self.sentiment.sentiment_balance(&asset, DEFAULT_SENTIMENT_DAYS),
            self.fear_greed.current(),
        )?;

        let signals = Signals {
            sentiment: Some(sentiment.sentiment_balance),
            fear_greed: Some(f64::from(fear_greed.value)),
            ..indicators
        };

        debug!(%symbol, %timeframe, ?signals, "gathered prediction signals");
        Ok(signals)
    }

    pub async fn predict(
        &self,
        symbol: &MarketSymbol,
        timeframe: Timeframe,
    ) -> Result<Prediction, DataError> {
        self.signals(symbol, timeframe).await.map(|signals| predict(&signals))
    }
}

//! Market scanner ranking a fixed symbol universe into trade recommendations.
//!
//! Each symbol is scored from its latest indicator readings alone. Only strong setups become a
//! [`Recommendation`], with entry, take-profit and stop-loss levels sized from ATR relative to
//! the fast EMA.

use crate::{
    candle::Timeframe,
    error::DataError,
    prediction::{Signals, indicator_signals},
    source::IndicatorSource,
    symbol::MarketSymbol,
};
use derive_more::Display;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Symbols evaluated by every scan, in tie-break order.
pub const SCAN_SYMBOLS: [&str; 20] = [
    "BTC/USDT", "ETH/USDT", "BNB/USDT", "SOL/USDT", "XRP/USDT", "ADA/USDT", "DOGE/USDT",
    "MATIC/USDT", "DOT/USDT", "AVAX/USDT", "LINK/USDT", "UNI/USDT", "ATOM/USDT", "LTC/USDT",
    "NEAR/USDT", "APT/USDT", "ARB/USDT", "OP/USDT", "SUI/USDT", "INJ/USDT",
];

pub const MAX_RECOMMENDATIONS: usize = 10;

pub const BASE_CONFIDENCE: i32 = 75;

pub const MAX_CONFIDENCE: i32 = 98;

/// Minimum confidence and absolute score for a setup to be recommended.
pub const MIN_RECOMMENDED_CONFIDENCE: i32 = 85;
pub const MIN_RECOMMENDED_SCORE: i32 = 4;

/// ATR to price ratio assumed when ATR is missing or zero.
pub const DEFAULT_ATR_MULTIPLIER: f64 = 0.02;

/// Reward leg as a multiple of the risk leg.
pub const TAKE_PROFIT_ATR_MULTIPLE: f64 = 3.0;

/// Price used for levels when the fast EMA is missing or zero.
pub const DEFAULT_BASE_PRICE: f64 = 100.0;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeDirection {
    #[display("LONG")]
    Long,
    #[display("SHORT")]
    Short,
}

/// Pattern a recommendation trades.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Display, Deserialize, Serialize)]
pub enum Setup {
    #[default]
    #[display("Unknown")]
    Unknown,
    #[display("Trend Following")]
    #[serde(rename = "Trend Following")]
    TrendFollowing,
    #[display("Counter Trend")]
    #[serde(rename = "Counter Trend")]
    CounterTrend,
    #[display("Breakout")]
    Breakout,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Display, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeStrength {
    #[display("low")]
    Low,
    #[default]
    #[display("medium")]
    Medium,
    #[display("high")]
    High,
}

/// Outcome of scoring one symbol's [`Signals`].
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Assessment {
    pub score: i32,
    pub reasons: Vec<&'static str>,
    pub setup: Setup,
    pub volume_strength: VolumeStrength,
}

impl Assessment {
    pub fn confidence(&self) -> i32 {
        (BASE_CONFIDENCE + self.score.abs() * 4).min(MAX_CONFIDENCE)
    }

    pub fn is_recommended(&self) -> bool {
        self.confidence() >= MIN_RECOMMENDED_CONFIDENCE
            && self.score.abs() >= MIN_RECOMMENDED_SCORE
    }
}

/// Score `signals`: positive favours a long. Missing RSI reads as 50, other missing readings
/// as zero.
pub fn assess(signals: &Signals) -> Assessment {
    let mut assessment = Assessment::default();
    let mut add = |points: i32, reason: Option<&'static str>| {
        assessment.score += points;
        assessment.reasons.extend(reason);
    };

    let rsi = signals.rsi.unwrap_or(50.0);
    if rsi < 30.0 {
        add(3, Some("RSI Oversold"));
    } else if rsi > 70.0 {
        add(-3, Some("RSI Overbought"));
    } else if rsi > 50.0 && rsi < 60.0 {
        add(1, None);
    }

    // MACD only counts when the histogram agrees
    let macd = signals.macd.unwrap_or_default();
    let histogram = signals.histogram.unwrap_or_default();
    if macd > 0.0 && histogram > 0.0 {
        add(2, Some("MACD Bullish"));
    } else if macd < 0.0 && histogram < 0.0 {
        add(-2, Some("MACD Bearish"));
    }

    let fast = signals.ema_fast.unwrap_or_default();
    let slow = signals.ema_slow.unwrap_or_default();
    let mut setup = Setup::Unknown;
    if fast > slow {
        add(2, Some("Golden Cross"));
        setup = Setup::TrendFollowing;
    } else if fast < slow {
        add(-2, Some("Death Cross"));
        setup = Setup::CounterTrend;
    }

    if let Some(bands) = signals.bands {
        if bands.middle < bands.lower * 1.01 {
            add(2, Some("BB Squeeze Breakout"));
            setup = Setup::Breakout;
        } else if bands.middle > bands.upper * 0.99 {
            add(-2, Some("BB Overbought"));
        }
    }

    assessment.setup = setup;
    assessment.volume_strength = match assessment.score.abs() {
        strength if strength >= 5 => VolumeStrength::High,
        strength if strength <= 2 => VolumeStrength::Low,
        _ => VolumeStrength::Medium,
    };

    assessment
}

/// Actionable trade derived from a strong [`Assessment`].
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub symbol: String,
    pub direction: TradeDirection,
    pub confidence: i32,
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    /// Formatted as `1:x`.
    pub risk_reward: String,
    pub reason: String,
    pub setup: Setup,
    pub volume_strength: VolumeStrength,
    pub score: i32,
}

/// Build a [`Recommendation`] for `symbol` if its signals pass the recommendation threshold.
pub fn recommend(symbol: &str, signals: &Signals) -> Option<Recommendation> {
    let assessment = assess(signals);
    if !assessment.is_recommended() {
        return None;
    }

    let direction = if assessment.score > 0 {
        TradeDirection::Long
    } else {
        TradeDirection::Short
    };

    let entry = signals
        .ema_fast
        .filter(|ema| *ema != 0.0)
        .unwrap_or(DEFAULT_BASE_PRICE);

    let multiplier = signals.atr.unwrap_or_default() / entry;
    let multiplier = if multiplier == 0.0 || multiplier.is_nan() {
        DEFAULT_ATR_MULTIPLIER
    } else {
        multiplier
    };

    let (take_profit, stop_loss) = match direction {
        TradeDirection::Long => (
            entry * (1.0 + multiplier * TAKE_PROFIT_ATR_MULTIPLE),
            entry * (1.0 - multiplier),
        ),
        TradeDirection::Short => (
            entry * (1.0 - multiplier * TAKE_PROFIT_ATR_MULTIPLE),
            entry * (1.0 + multiplier),
        ),
    };

    let risk_reward = (take_profit - entry).abs() / (entry - stop_loss).abs();

    Some(Recommendation {
        symbol: symbol.to_string(),
        direction,
        confidence: assessment.confidence(),
        entry: round_price(entry),
        take_profit: round_price(take_profit),
        stop_loss: round_price(stop_loss),
        risk_reward: format!("1:{risk_reward:.1}"),
        reason: assessment.reasons.join(", "),
        setup: assessment.setup,
        volume_strength: assessment.volume_strength,
        score: assessment.score,
    })
}

/// Order by descending confidence, keeping scan order between ties, and keep the best.
pub fn rank(mut recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
    recommendations.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}

fn round_price(price: f64) -> f64 {
    (price * 1e6).round() / 1e6
}

/// Scans [`SCAN_SYMBOLS`] through an [`IndicatorSource`].
#[derive(Clone)]
pub struct MarketScanner {
    indicators: Arc<dyn IndicatorSource>,
}

impl std::fmt::Debug for MarketScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketScanner").finish_non_exhaustive()
    }
}

impl MarketScanner {
    pub fn new(indicators: Arc<dyn IndicatorSource>) -> Self {
        Self { indicators }
    }

    /// Ranked recommendations across every scanned symbol.
    ///
    /// A symbol whose indicators fail is skipped rather than failing the scan.
    pub async fn scan(&self, timeframe: Timeframe) -> Result<Vec<Recommendation>, DataError> {
        let readings = join_all(SCAN_SYMBOLS.iter().map(|&symbol| async move {
            let signals =
                indicator_signals(self.indicators.as_ref(), &MarketSymbol::parse(symbol), timeframe)
                    .await;
            (symbol, signals)
        }))
        .await;

        let recommendations = readings
            .into_iter()
            .filter_map(|(symbol, signals)| match signals {
                Ok(signals) => recommend(symbol, &signals),
                Err(error) => {
                    warn!(symbol, %timeframe, %error, "skipping symbol in market scan");
                    None
                }
            })
            .collect();

        let ranked = rank(recommendations);
        debug!(%timeframe, recommended = ranked.len(), "market scan complete");
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        prediction::Bands,
        source::indicator::{IndicatorKind, IndicatorValues, SimulatedIndicators},
    };
    use async_trait::async_trait;

    fn bands(lower: f64, middle: f64, upper: f64) -> Option<Bands> {
        Some(Bands {
            lower,
            middle,
            upper,
        })
    }

    #[test]
    fn test_assess() {
        struct TestCase {
            input: Signals,
            expected_score: i32,
            expected_reasons: Vec<&'static str>,
            expected_setup: Setup,
            expected_volume: VolumeStrength,
        }

        let tests = vec![
            TestCase {
                // TC0: no readings, rsi defaults to neutral 50
                input: Signals::default(),
                expected_score: 0,
                expected_reasons: vec![],
                expected_setup: Setup::Unknown,
                expected_volume: VolumeStrength::Low,
            },
            TestCase {
                // TC1: mildly bullish rsi has no reason attached
                input: Signals {
                    rsi: Some(55.0),
                    ..Signals::default()
                },
                expected_score: 1,
                expected_reasons: vec![],
                expected_setup: Setup::Unknown,
                expected_volume: VolumeStrength::Low,
            },
            TestCase {
                // TC2: macd and histogram disagree
                input: Signals {
                    macd: Some(1.0),
                    histogram: Some(-0.5),
                    ..Signals::default()
                },
                expected_score: 0,
                expected_reasons: vec![],
                expected_setup: Setup::Unknown,
                expected_volume: VolumeStrength::Low,
            },
            TestCase {
                // TC3: oversold, bullish macd, golden cross
                input: Signals {
                    rsi: Some(25.0),
                    macd: Some(1.0),
                    histogram: Some(0.5),
                    ema_fast: Some(101.0),
                    ema_slow: Some(100.0),
                    ..Signals::default()
                },
                expected_score: 7,
                expected_reasons: vec!["RSI Oversold", "MACD Bullish", "Golden Cross"],
                expected_setup: Setup::TrendFollowing,
                expected_volume: VolumeStrength::High,
            },
            TestCase {
                // TC4: breakout overrides the trend setup
                input: Signals {
                    ema_fast: Some(101.0),
                    ema_slow: Some(100.0),
                    bands: bands(100.0, 100.5, 110.0),
                    ..Signals::default()
                },
                expected_score: 4,
                expected_reasons: vec!["Golden Cross", "BB Squeeze Breakout"],
                expected_setup: Setup::Breakout,
                expected_volume: VolumeStrength::Medium,
            },
            TestCase {
                // TC5: overbought across the board
                input: Signals {
                    rsi: Some(80.0),
                    macd: Some(-1.0),
                    histogram: Some(-0.2),
                    ema_fast: Some(99.0),
                    ema_slow: Some(100.0),
                    bands: bands(90.0, 109.5, 110.0),
                    ..Signals::default()
                },
                expected_score: -9,
                expected_reasons: vec![
                    "RSI Overbought",
                    "MACD Bearish",
                    "Death Cross",
                    "BB Overbought",
                ],
                expected_setup: Setup::CounterTrend,
                expected_volume: VolumeStrength::High,
            },
            TestCase {
                // TC6: middle band comfortably inside scores nothing
                input: Signals {
                    bands: bands(98.0, 100.0, 102.0),
                    ..Signals::default()
                },
                expected_score: 0,
                expected_reasons: vec![],
                expected_setup: Setup::Unknown,
                expected_volume: VolumeStrength::Low,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = assess(&test.input);
            assert_eq!(actual.score, test.expected_score, "TC{} failed", index);
            assert_eq!(actual.reasons, test.expected_reasons, "TC{} failed", index);
            assert_eq!(actual.setup, test.expected_setup, "TC{} failed", index);
            assert_eq!(actual.volume_strength, test.expected_volume, "TC{} failed", index);
        }
    }

    #[test]
    fn test_confidence_and_threshold() {
        struct TestCase {
            score: i32,
            expected_confidence: i32,
            expected_recommended: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: neutral
                score: 0,
                expected_confidence: 75,
                expected_recommended: false,
            },
            TestCase {
                // TC1: confident enough but score too weak
                score: 3,
                expected_confidence: 87,
                expected_recommended: false,
            },
            TestCase {
                // TC2: weakest recommended short
                score: -4,
                expected_confidence: 91,
                expected_recommended: true,
            },
            TestCase {
                // TC3: capped
                score: 7,
                expected_confidence: 98,
                expected_recommended: true,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let assessment = Assessment {
                score: test.score,
                ..Assessment::default()
            };
            assert_eq!(
                assessment.confidence(),
                test.expected_confidence,
                "TC{} failed",
                index
            );
            assert_eq!(
                assessment.is_recommended(),
                test.expected_recommended,
                "TC{} failed",
                index
            );
        }
    }

    #[test]
    fn test_recommend_levels() {
        struct TestCase {
            input: Signals,
            expected: Option<(TradeDirection, f64, f64, f64)>,
        }

        let tests = vec![
            TestCase {
                // TC0: weak signals are not recommended
                input: Signals {
                    rsi: Some(25.0),
                    ..Signals::default()
                },
                expected: None,
            },
            TestCase {
                // TC1: long sized from atr / ema20
                input: Signals {
                    rsi: Some(25.0),
                    ema_fast: Some(200.0),
                    ema_slow: Some(150.0),
                    atr: Some(4.0),
                    ..Signals::default()
                },
                expected: Some((TradeDirection::Long, 200.0, 212.0, 196.0)),
            },
            TestCase {
                // TC2: short without atr falls back to the default multiplier
                input: Signals {
                    rsi: Some(75.0),
                    ema_fast: Some(50.0),
                    ema_slow: Some(60.0),
                    ..Signals::default()
                },
                expected: Some((TradeDirection::Short, 50.0, 47.0, 51.0)),
            },
            TestCase {
                // TC3: missing ema20 prices off the default base
                input: Signals {
                    rsi: Some(75.0),
                    macd: Some(-1.0),
                    histogram: Some(-1.0),
                    ..Signals::default()
                },
                expected: Some((TradeDirection::Short, 100.0, 94.0, 102.0)),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = recommend("SOL/USDT", &test.input).map(|recommendation| {
                assert_eq!(recommendation.risk_reward, "1:3.0", "TC{} failed", index);
                (
                    recommendation.direction,
                    recommendation.entry,
                    recommendation.take_profit,
                    recommendation.stop_loss,
                )
            });
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_recommendation_serialises_dashboard_fields() {
        let recommendation = recommend(
            "ETH/USDT",
            &Signals {
                rsi: Some(25.0),
                macd: Some(1.0),
                histogram: Some(1.0),
                ema_fast: Some(2_650.0),
                ema_slow: Some(2_600.0),
                ..Signals::default()
            },
        )
        .unwrap();

        let value = serde_json::to_value(&recommendation).unwrap();
        assert_eq!(value["direction"], "LONG");
        assert_eq!(value["confidence"], 98);
        assert_eq!(value["setup"], "Trend Following");
        assert_eq!(value["volumeStrength"], "high");
        assert_eq!(value["reason"], "RSI Oversold, MACD Bullish, Golden Cross");
        assert!(value["takeProfit"].is_number());
        assert!(value["stopLoss"].is_number());
    }

    #[test]
    fn test_rank_orders_by_confidence_and_truncates() {
        let recommendation = |symbol: &str, confidence: i32| Recommendation {
            symbol: symbol.to_string(),
            direction: TradeDirection::Long,
            confidence,
            entry: 1.0,
            take_profit: 1.06,
            stop_loss: 0.98,
            risk_reward: "1:3.0".to_string(),
            reason: String::new(),
            setup: Setup::Unknown,
            volume_strength: VolumeStrength::Medium,
            score: 4,
        };

        let input = (0..12)
            .map(|index| recommendation(SCAN_SYMBOLS[index], if index % 2 == 0 { 91 } else { 98 }))
            .collect();

        let symbols: Vec<String> = rank(input)
            .into_iter()
            .map(|recommendation| recommendation.symbol)
            .collect();

        assert_eq!(
            symbols,
            vec![
                "ETH/USDT", "SOL/USDT", "ADA/USDT", "MATIC/USDT", "AVAX/USDT", "UNI/USDT",
                "BTC/USDT", "BNB/USDT", "XRP/USDT", "DOGE/USDT",
            ]
        );
    }

    /// Strongly bullish readings for BTC only; every other symbol fails.
    struct BullishBitcoin;

    #[async_trait]
    impl IndicatorSource for BullishBitcoin {
        async fn indicator(
            &self,
            kind: IndicatorKind,
            symbol: &MarketSymbol,
            _: Timeframe,
        ) -> Result<IndicatorValues, DataError> {
            if symbol.base != "BTC" {
                return Err(DataError::capability("indicators", "unavailable"));
            }

            Ok(match kind {
                IndicatorKind::Rsi => IndicatorValues::Rsi { value: 20.0 },
                IndicatorKind::Macd => IndicatorValues::Macd {
                    macd: vec![1.0],
                    signal: vec![0.5],
                    histogram: vec![0.5],
                },
                IndicatorKind::Bollinger => IndicatorValues::Bollinger {
                    upper: vec![45_000.0],
                    middle: vec![43_000.0],
                    lower: vec![41_000.0],
                },
                IndicatorKind::Atr => IndicatorValues::Atr { value: vec![430.0] },
                IndicatorKind::Ema | IndicatorKind::Sma => IndicatorValues::Ema {
                    ema: vec![43_000.0],
                },
            })
        }
    }

    #[tokio::test]
    async fn test_scan_skips_failing_symbols() {
        let scanner = MarketScanner::new(Arc::new(BullishBitcoin));

        let actual = scanner.scan(Timeframe::H1).await.unwrap();

        // Identical fast and slow EMA readings score no cross
        assert_eq!(actual.len(), 1);
        assert_eq!(actual[0].symbol, "BTC/USDT");
        assert_eq!(actual[0].score, 5);
        assert_eq!(actual[0].entry, 43_000.0);
        assert_eq!(actual[0].stop_loss, 42_570.0);
    }

    #[tokio::test]
    async fn test_scan_with_simulated_indicators_is_bounded() {
        let scanner = MarketScanner::new(Arc::new(SimulatedIndicators));

        let actual = scanner.scan(Timeframe::H4).await.unwrap();

        assert!(actual.len() <= MAX_RECOMMENDATIONS);
        assert!(actual.windows(2).all(|pair| pair[0].confidence >= pair[1].confidence));
        assert!(actual.iter().all(|recommendation| {
            recommendation.confidence >= MIN_RECOMMENDED_CONFIDENCE
                && recommendation.score.abs() >= MIN_RECOMMENDED_SCORE
        }));
    }
}

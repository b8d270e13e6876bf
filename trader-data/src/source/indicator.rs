use crate::{
    candle::Timeframe, error::DataError, source::IndicatorSource, symbol::MarketSymbol,
};
use async_trait::async_trait;
use derive_more::Display;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// Number of points in every simulated indicator series.
pub const SERIES_LEN: usize = 20;

/// Technical indicator requested from an [`IndicatorSource`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum IndicatorKind {
    #[display("sma")]
    Sma,
    #[display("ema")]
    Ema,
    #[display("macd")]
    Macd,
    #[display("bollinger")]
    Bollinger,
    #[display("atr")]
    Atr,
    #[display("rsi")]
    Rsi,
}

impl IndicatorKind {
    /// Parse a short name (`"ema"`) or a long method name
    /// (`"calculate_exponential_moving_average"`). Anything unrecognised is [`IndicatorKind::Rsi`].
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "sma" | "calculate_simple_moving_average" => Self::Sma,
            "ema" | "calculate_exponential_moving_average" => Self::Ema,
            "macd" | "calculate_moving_average_convergence_divergence" => Self::Macd,
            "bollinger" | "bb" | "calculate_bollinger_bands" => Self::Bollinger,
            "atr" | "calculate_average_true_range" => Self::Atr,
            _ => Self::Rsi,
        }
    }
}

/// Indicator output, serialised in the field layout the dashboard reads.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(untagged)]
pub enum IndicatorValues {
    Sma {
        sma: Vec<f64>,
    },
    Ema {
        ema: Vec<f64>,
    },
    Macd {
        macd: Vec<f64>,
        signal: Vec<f64>,
        histogram: Vec<f64>,
    },
    Bollinger {
        upper: Vec<f64>,
        middle: Vec<f64>,
        lower: Vec<f64>,
    },
    Atr {
        value: Vec<f64>,
    },
    Rsi {
        value: f64,
    },
}

impl IndicatorValues {
    pub fn kind(&self) -> IndicatorKind {
        match self {
            Self::Sma { .. } => IndicatorKind::Sma,
            Self::Ema { .. } => IndicatorKind::Ema,
            Self::Macd { .. } => IndicatorKind::Macd,
            Self::Bollinger { .. } => IndicatorKind::Bollinger,
            Self::Atr { .. } => IndicatorKind::Atr,
            Self::Rsi { .. } => IndicatorKind::Rsi,
        }
    }

    /// Most recent headline value: the last point of the primary series, or the scalar.
    pub fn latest(&self) -> Option<f64> {
        match self {
            Self::Sma { sma: series }
            | Self::Ema { ema: series }
            | Self::Macd { macd: series, .. }
            | Self::Bollinger { middle: series, .. }
            | Self::Atr { value: series } => series.last().copied(),
            Self::Rsi { value } => Some(*value),
        }
    }
}

/// Price level simulated indicators are centred on.
pub fn reference_price(symbol: &MarketSymbol) -> f64 {
    let base = symbol.base.as_str();
    if base.contains("BTC") {
        43_000.0
    } else if base.contains("ETH") {
        2_650.0
    } else if base.contains("DOGE") {
        0.20
    } else {
        100.0
    }
}

/// Random indicator values around a reference price.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedIndicators;

#[async_trait]
impl IndicatorSource for SimulatedIndicators {
    async fn indicator(
        &self,
        kind: IndicatorKind,
        symbol: &MarketSymbol,
        timeframe: Timeframe,
    ) -> Result<IndicatorValues, DataError> {
        debug!(%kind, %symbol, %timeframe, "simulating indicator");
        Ok(simulate(&mut rand::rng(), kind, reference_price(symbol)))
    }
}

/// Generate `kind` values around `price`.
pub fn simulate<R>(rng: &mut R, kind: IndicatorKind, price: f64) -> IndicatorValues
where
    R: Rng + ?Sized,
{
    match kind {
        IndicatorKind::Sma => IndicatorValues::Sma {
            sma: jitter(rng, price * 0.02).into_iter().map(|delta| price + delta).collect(),
        },
        IndicatorKind::Ema => IndicatorValues::Ema {
            ema: jitter(rng, price * 0.015).into_iter().map(|delta| price + delta).collect(),
        },
        IndicatorKind::Macd => IndicatorValues::Macd {
            macd: jitter(rng, 100.0),
            signal: jitter(rng, 80.0),
            histogram: jitter(rng, 50.0),
        },
        IndicatorKind::Bollinger => IndicatorValues::Bollinger {
            upper: vec![price * 1.02; SERIES_LEN],
            middle: vec![price; SERIES_LEN],
            lower: vec![price * 0.98; SERIES_LEN],
        },
        IndicatorKind::Atr => IndicatorValues::Atr {
            value: vec![price * 0.015; SERIES_LEN],
        },
        IndicatorKind::Rsi => IndicatorValues::Rsi {
            value: rng.random::<f64>() * 100.0,
        },
    }
}

/// [`SERIES_LEN`] offsets uniformly distributed in `[-width / 2, width / 2)`.
fn jitter<R>(rng: &mut R, width: f64) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    (0..SERIES_LEN)
        .map(|_| (rng.random::<f64>() - 0.5) * width)
        .collect()
}

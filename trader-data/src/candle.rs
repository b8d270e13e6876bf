use crate::error::DataError;
use derive_more::Display;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Volume substituted into a [`VolumeBar`] when the provider supplied none.
pub const DEFAULT_VOLUME: f64 = 1_000_000.0;

/// [`VolumeBar`] colour for a candle that closed above its open.
pub const UP_COLOUR: &str = "#00ff88";

/// [`VolumeBar`] colour for a candle that closed at or below its open.
pub const DOWN_COLOUR: &str = "#ff4757";

/// Candle bucket width.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Deserialize, Serialize,
)]
pub enum Timeframe {
    #[display("1m")]
    #[serde(rename = "1m")]
    M1,
    #[display("5m")]
    #[serde(rename = "5m")]
    M5,
    #[display("15m")]
    #[serde(rename = "15m")]
    M15,
    #[display("1h")]
    #[serde(rename = "1h")]
    H1,
    #[display("4h")]
    #[serde(rename = "4h")]
    H4,
    #[display("1d")]
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 6] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }

    /// Timeframes at or below one hour.
    pub fn is_short(&self) -> bool {
        matches!(
            self,
            Timeframe::M1 | Timeframe::M5 | Timeframe::M15 | Timeframe::H1
        )
    }
}

impl FromStr for Timeframe {
    type Err = DataError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|timeframe| timeframe.as_str() == token.trim())
            .ok_or_else(|| DataError::InvalidTimeframe(token.to_string()))
    }
}

/// Normalised OHLC observation for a single time bucket.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Deserialize, Serialize)]
pub struct Candle {
    /// Bucket open time in seconds since the Unix epoch.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Base volume, when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Candle {
    /// No price variation at all within the bucket.
    pub fn is_flat(&self) -> bool {
        self.open == self.close && self.high == self.low
    }

    pub fn is_up(&self) -> bool {
        self.close > self.open
    }
}

/// Presentation hint accompanying each [`Candle`] in a dashboard response.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct VolumeBar {
    pub time: i64,
    pub value: f64,
    pub color: &'static str,
}

impl From<&Candle> for VolumeBar {
    fn from(candle: &Candle) -> Self {
        Self {
            time: candle.time,
            value: candle
                .volume
                .filter(|volume| *volume > 0.0)
                .unwrap_or(DEFAULT_VOLUME),
            color: if candle.is_up() { UP_COLOUR } else { DOWN_COLOUR },
        }
    }
}

/// Sequence of [`Candle`]s, strictly ascending by time with no duplicate timestamps.
#[derive(Clone, PartialEq, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct CandleSeries(Vec<Candle>);

impl CandleSeries {
    /// Sort ascending by time, keeping the first candle seen for each timestamp.
    pub fn new(candles: impl IntoIterator<Item = Candle>) -> Self {
        Self(
            candles
                .into_iter()
                .enumerate()
                .sorted_by_key(|(index, candle)| (candle.time, *index))
                .map(|(_, candle)| candle)
                .dedup_by(|a, b| a.time == b.time)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Candle] {
        &self.0
    }

    pub fn last(&self) -> Option<&Candle> {
        self.0.last()
    }

    pub fn volume_bars(&self) -> Vec<VolumeBar> {
        self.0.iter().map(VolumeBar::from).collect()
    }

    pub fn into_inner(self) -> Vec<Candle> {
        self.0
    }
}

impl FromIterator<Candle> for CandleSeries {
    fn from_iter<T: IntoIterator<Item = Candle>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a CandleSeries {
    type Item = &'a Candle;
    type IntoIter = std::slice::Iter<'a, Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
pub(crate) fn candle(time: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle {
        time,
        open,
        high,
        low,
        close,
        volume: None,
    }
}

use crate::candle::Timeframe;

/// CryptoCompare historical endpoint and aggregation multiplier for a timeframe token.
///
/// See docs: <https://developers.cryptocompare.com/documentation/legacy/Historical/dataHistohour>
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CryptoCompareHistory {
    pub endpoint: &'static str,
    pub aggregate: u32,
}

impl CryptoCompareHistory {
    pub const MINUTE: &'static str = "histominute";
    pub const HOUR: &'static str = "histohour";
    pub const DAY: &'static str = "histoday";

    /// Used for any timeframe token missing from [`HISTORY_TABLE`].
    pub const DEFAULT: Self = Self {
        endpoint: Self::HOUR,
        aggregate: 1,
    };

    /// Resolve a timeframe token via [`HISTORY_TABLE`].
    pub fn from_token(token: &str) -> Self {
        HISTORY_TABLE
            .iter()
            .find(|(key, _)| *key == token)
            .map(|(_, history)| *history)
            .unwrap_or(Self::DEFAULT)
    }
}

impl From<Timeframe> for CryptoCompareHistory {
    fn from(timeframe: Timeframe) -> Self {
        Self::from_token(timeframe.as_str())
    }
}

/// Timeframe token to [`CryptoCompareHistory`] mapping.
pub const HISTORY_TABLE: &[(&str, CryptoCompareHistory)] = &[
    ("1m", CryptoCompareHistory { endpoint: CryptoCompareHistory::MINUTE, aggregate: 1 }),
    ("5m", CryptoCompareHistory { endpoint: CryptoCompareHistory::MINUTE, aggregate: 5 }),
    ("15m", CryptoCompareHistory { endpoint: CryptoCompareHistory::MINUTE, aggregate: 15 }),
    ("1h", CryptoCompareHistory { endpoint: CryptoCompareHistory::HOUR, aggregate: 1 }),
    ("4h", CryptoCompareHistory { endpoint: CryptoCompareHistory::HOUR, aggregate: 4 }),
    ("1d", CryptoCompareHistory { endpoint: CryptoCompareHistory::DAY, aggregate: 1 }),
];

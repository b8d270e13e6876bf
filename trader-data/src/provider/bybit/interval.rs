use crate::candle::Timeframe;
use serde::Serialize;

/// Type that defines how to translate a [`Timeframe`] into a [`Bybit`](super::Bybit) kline
/// interval query parameter.
///
/// See docs: <https://bybit-exchange.github.io/docs/v5/market/kline>
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct BybitInterval(pub &'static str);

impl BybitInterval {
    /// [`Bybit`](super::Bybit) one minute kline interval.
    pub const MINUTE_1: Self = Self("1");

    /// [`Bybit`](super::Bybit) five minute kline interval.
    pub const MINUTE_5: Self = Self("5");

    /// [`Bybit`](super::Bybit) fifteen minute kline interval.
    pub const MINUTE_15: Self = Self("15");

    /// [`Bybit`](super::Bybit) one hour kline interval, expressed in minutes.
    pub const HOUR_1: Self = Self("60");

    /// [`Bybit`](super::Bybit) four hour kline interval, expressed in minutes.
    pub const HOUR_4: Self = Self("240");

    /// [`Bybit`](super::Bybit) daily kline interval.
    pub const DAY_1: Self = Self("D");
}

impl From<Timeframe> for BybitInterval {
    fn from(timeframe: Timeframe) -> Self {
        match timeframe {
            Timeframe::M1 => BybitInterval::MINUTE_1,
            Timeframe::M5 => BybitInterval::MINUTE_5,
            Timeframe::M15 => BybitInterval::MINUTE_15,
            Timeframe::H1 => BybitInterval::HOUR_1,
            Timeframe::H4 => BybitInterval::HOUR_4,
            Timeframe::D1 => BybitInterval::DAY_1,
        }
    }
}

impl AsRef<str> for BybitInterval {
    fn as_ref(&self) -> &str {
        self.0
    }
}

use crate::{
    error::DataError,
    normalise::{RawCandles, TupleRow},
    provider::ProviderId,
};
use serde::{Deserialize, Serialize};

/// [`Bybit`](super::Bybit) kline REST response.
///
/// ### Raw Payload Examples
/// See docs: <https://bybit-exchange.github.io/docs/v5/market/kline>
/// ```json
/// {
///     "retCode": 0,
///     "retMsg": "OK",
///     "result": {
///         "symbol": "BTCUSDT",
///         "category": "spot",
///         "list": [
///             ["1670608800000", "17071", "17073", "17027", "17055.5", "268611", "4587363.5"]
///         ]
///     },
///     "time": 1672025956592
/// }
/// ```
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct BybitKlineResponse {
    #[serde(rename = "retCode")]
    pub ret_code: i64,
    #[serde(rename = "retMsg", default)]
    pub ret_msg: String,
    #[serde(default)]
    pub result: Option<BybitKlineResult>,
}

/// Kline rows, newest first.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct BybitKlineResult {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub list: Vec<TupleRow>,
}

/// Outgoing kline query, serialised in this field order for request signing.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct BybitKlineQuery<'a> {
    pub category: &'a str,
    pub symbol: &'a str,
    pub interval: &'a str,
    pub limit: usize,
}

impl TryFrom<BybitKlineResponse> for RawCandles {
    type Error = DataError;

    fn try_from(response: BybitKlineResponse) -> Result<Self, Self::Error> {
        if response.ret_code != 0 {
            return Err(DataError::unavailable(
                ProviderId::Bybit,
                format!("retCode {}: {}", response.ret_code, response.ret_msg),
            ));
        }

        Ok(RawCandles::Tuples(
            response.result.map(|result| result.list).unwrap_or_default(),
        ))
    }
}

//! Conversion of provider-native candle rows into a canonical [`CandleSeries`].
//!
//! Two wire shapes are understood:
//! - Tuple rows `[timestamp_ms, open, high, low, close, volume?]` (Bybit, CoinGecko), where
//!   values may be JSON numbers or numeric strings.
//! - Object rows nested under a `Data.Data` wrapper (CryptoCompare), with `time` in seconds.

use crate::candle::{Candle, CandleSeries};
use serde::{Deserialize, Deserializer, Serialize};

/// Provider-native rows prior to normalisation.
#[derive(Clone, PartialEq, Debug)]
pub enum RawCandles {
    Tuples(Vec<TupleRow>),
    Wrapped(WrappedRows),
}

impl From<RawCandles> for CandleSeries {
    fn from(raw: RawCandles) -> Self {
        match raw {
            RawCandles::Tuples(rows) => CandleSeries::from(rows),
            RawCandles::Wrapped(wrapped) => CandleSeries::from(wrapped),
        }
    }
}

/// JSON number that some providers encode as a string.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum FlexNumber {
    Number(f64),
    Str(String),
}

impl TryFrom<FlexNumber> for f64 {
    type Error = String;

    fn try_from(value: FlexNumber) -> Result<Self, Self::Error> {
        match value {
            FlexNumber::Number(number) => Ok(number),
            FlexNumber::Str(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|error| format!("invalid numeric string {raw:?}: {error}")),
        }
    }
}

/// Tuple row `[timestamp_ms, open, high, low, close, volume?, ..]`.
///
/// Trailing fields beyond volume (e.g. Bybit turnover) are ignored.
#[derive(Clone, Copy, PartialEq, Debug, Deserialize)]
#[serde(try_from = "Vec<FlexNumber>")]
pub struct TupleRow {
    pub time_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl TryFrom<Vec<FlexNumber>> for TupleRow {
    type Error = String;

    // Millisecond open times are integral
    #[allow(clippy::cast_possible_truncation)]
    fn try_from(fields: Vec<FlexNumber>) -> Result<Self, Self::Error> {
        if fields.len() < 5 {
            return Err(format!(
                "expected at least 5 tuple fields, received {}",
                fields.len()
            ));
        }

        let mut numbers = fields
            .into_iter()
            .map(f64::try_from)
            .collect::<Result<Vec<f64>, _>>()?
            .into_iter();

        let mut next = || numbers.next();
        let time_ms = next().unwrap_or_default() as i64;
        let open = next().unwrap_or_default();
        let high = next().unwrap_or_default();
        let low = next().unwrap_or_default();
        let close = next().unwrap_or_default();
        let volume = next();

        Ok(Self {
            time_ms,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

impl From<TupleRow> for Candle {
    fn from(row: TupleRow) -> Self {
        Self {
            time: row.time_ms.div_euclid(1000),
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

impl From<Vec<TupleRow>> for CandleSeries {
    fn from(rows: Vec<TupleRow>) -> Self {
        rows.into_iter().map(Candle::from).collect()
    }
}

/// Object-row response wrapper, e.g. `{ "Data": { "Data": [ {..}, .. ] } }`.
///
/// Any level of the wrapper may be absent or malformed, in which case it normalises to an
/// empty [`CandleSeries`].
#[derive(Clone, PartialEq, Debug, Default, Deserialize, Serialize)]
pub struct WrappedRows {
    #[serde(rename = "Data", default, deserialize_with = "de_lenient")]
    pub result: Option<RowsEnvelope>,
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize, Serialize)]
pub struct RowsEnvelope {
    #[serde(rename = "Data", default, deserialize_with = "de_lenient")]
    pub rows: Option<Vec<ObjectRow>>,
}

/// Object row with `time` already in seconds.
#[derive(Clone, Copy, PartialEq, Debug, Deserialize, Serialize)]
pub struct ObjectRow {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volumefrom: Option<f64>,
}

impl From<ObjectRow> for Candle {
    fn from(row: ObjectRow) -> Self {
        Self {
            time: row.time,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: Some(row.volumefrom.unwrap_or(0.0)),
        }
    }
}

impl From<WrappedRows> for CandleSeries {
    fn from(wrapped: WrappedRows) -> Self {
        wrapped
            .result
            .and_then(|envelope| envelope.rows)
            .unwrap_or_default()
            .into_iter()
            .map(Candle::from)
            .collect()
    }
}

/// Deserialize a field as `None` when it is null or does not match the expected shape.
///
/// Upstream error payloads often reuse the data key with a different type (e.g. `"Data": {}`
/// or `"Data": []`), which must not fail the whole response.
fn de_lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: for<'a> Deserialize<'a>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

use crate::{error::DataError, source::FundingSource};
use async_trait::async_trait;
use chrono::Utc;
use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Symbols compared when a request names none.
pub const DEFAULT_SYMBOLS: [&str; 1] = ["BTC/USDT:USDT"];

/// Exchanges compared when a request names none.
pub const DEFAULT_EXCHANGES: [&str; 3] = ["binance", "bybit", "okx"];

/// Largest absolute simulated rate, 1%.
pub const MAX_ABS_RATE: f64 = 0.01;

/// Perpetual funding rate for one symbol on one exchange.
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct FundingRate {
    pub exchange: String,
    pub symbol: String,
    pub rate: f64,
    /// Unix milliseconds.
    pub timestamp: i64,
}

/// Random rates in `[-1%, 1%)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedFunding;

#[async_trait]
impl FundingSource for SimulatedFunding {
    async fn funding_rates(
        &self,
        symbols: &[String],
        exchanges: &[String],
    ) -> Result<Vec<FundingRate>, DataError> {
        Ok(simulate(&mut rand::rng(), symbols, exchanges))
    }
}

pub fn simulate<R>(rng: &mut R, symbols: &[String], exchanges: &[String]) -> Vec<FundingRate>
where
    R: Rng + ?Sized,
{
    let timestamp = Utc::now().timestamp_millis();

    exchanges
        .iter()
        .cartesian_product(symbols)
        .map(|(exchange, symbol)| FundingRate {
            exchange: exchange.clone(),
            symbol: symbol.clone(),
            rate: (rng.random::<f64>() - 0.5) * 2.0 * MAX_ABS_RATE,
            timestamp,
        })
        .collect()
}

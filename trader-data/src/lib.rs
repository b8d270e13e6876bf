#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cast_possible_truncation,
    clippy::unused_self,
    clippy::cast_precision_loss,
    rust_2018_idioms,
    missing_debug_implementations
)]
#![allow(clippy::type_complexity)]

//! # Trader-Data
//! Multi-source market data for a crypto trading dashboard.
//!
//! The core is a candle resolution pipeline: a [`CandleResolver`](resolver::CandleResolver)
//! walks a fixed chain of upstream [`CandleProvider`](provider::CandleProvider)s
//! (Bybit, CryptoCompare, CoinGecko), normalises each provider's native rows into a
//! [`CandleSeries`](candle::CandleSeries), validates the result and falls back to the next
//! provider when a source fails or serves degenerate data.
//!
//! Around the core sit pluggable [`source`] capabilities (indicators, sentiment, fear/greed,
//! whale transactions, funding rates), the [`prediction`] score computed from them and the
//! [`scanner`] ranking trade setups across a fixed symbol universe.
//!
//! ## Example
//! ```rust,no_run
//! use trader_data::{
//!     candle::Timeframe, config::ProviderConfig, resolver::CandleResolver,
//!     symbol::MarketSymbol,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let resolver = CandleResolver::new(ProviderConfig::from_env()).unwrap();
//!
//!     let resolved = resolver
//!         .resolve(&MarketSymbol::parse("BTC/USDT"), Timeframe::H1, 100)
//!         .await
//!         .unwrap();
//!
//!     println!("{} candles from {}", resolved.series.len(), resolved.provider);
//! }
//! ```

/// Canonical [`Candle`](candle::Candle), [`CandleSeries`](candle::CandleSeries) and
/// [`Timeframe`](candle::Timeframe) models.
pub mod candle;

/// Provider credentials, base URLs and HTTP timeout.
pub mod config;

/// All [`Error`](std::error::Error)s generated in Trader-Data.
pub mod error;

/// Conversion of provider-native row shapes into a [`CandleSeries`](candle::CandleSeries).
pub mod normalise;

/// Weighted-sum prediction score over the [`source`] capability outputs.
pub mod prediction;

/// Upstream candle providers and the [`CandleProvider`](provider::CandleProvider) interface.
pub mod provider;

/// Fallback orchestration across the candle providers.
pub mod resolver;

/// Indicator-driven market scanner producing ranked trade recommendations.
pub mod scanner;

/// Collaborating data capabilities: indicators, sentiment, fear/greed, whales and funding.
pub mod source;

/// Static mapping from canonical tickers to each provider's native identifier.
pub mod symbol;

/// Data quality checks for a normalised [`CandleSeries`](candle::CandleSeries).
pub mod validation;

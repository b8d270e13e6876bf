//! Fallback orchestration across the candle providers.
//!
//! Each resolution walks a fixed chain `TryPrimary -> TrySecondary -> TryTertiary -> Exhausted`,
//! stopping at the first provider whose normalised data is accepted. Attempts are strictly
//! sequential and nothing is remembered between resolutions, so a provider that is down
//! costs every request a failed attempt.

use crate::{
    candle::{CandleSeries, Timeframe},
    config::ProviderConfig,
    error::DataError,
    provider::{
        CandleProvider, ProviderId, bybit::Bybit, coingecko::CoinGecko,
        cryptocompare::CryptoCompare,
    },
    symbol::{MarketSymbol, SymbolMap},
    validation::{self, Rejection},
};
use derive_more::Display;
use tracing::{debug, error, info, warn};

/// Stage of a single resolution.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
pub enum ResolveStage {
    TryPrimary,
    TrySecondary,
    TryTertiary,
    Exhausted,
}

/// Criteria a provider's normalised series must meet to be returned.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Acceptance {
    NonEmpty,
    Validated,
}

/// A [`CandleSeries`] together with the single provider that produced it.
#[derive(Clone, PartialEq, Debug)]
pub struct Resolved {
    pub provider: ProviderId,
    pub series: CandleSeries,
}

/// Resolves candles for a symbol and timeframe through the provider fallback chain.
pub struct CandleResolver {
    config: ProviderConfig,
    symbols: &'static SymbolMap,
    primary: Box<dyn CandleProvider>,
    secondary: Box<dyn CandleProvider>,
    tertiary: Box<dyn CandleProvider>,
}

impl std::fmt::Debug for CandleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandleResolver")
            .field("config", &self.config)
            .field("primary", &self.primary.id())
            .field("secondary", &self.secondary.id())
            .field("tertiary", &self.tertiary.id())
            .finish()
    }
}

impl CandleResolver {
    /// Construct the standard Bybit -> CryptoCompare -> CoinGecko chain sharing one client.
    pub fn new(config: ProviderConfig) -> Result<Self, reqwest::Error> {
        let client = config.http_client()?;

        Ok(Self::with_providers(
            Box::new(Bybit::new(client.clone(), &config)),
            Box::new(CryptoCompare::new(client.clone(), &config)),
            Box::new(CoinGecko::new(client, &config)),
            config,
        ))
    }

    pub fn with_providers(
        primary: Box<dyn CandleProvider>,
        secondary: Box<dyn CandleProvider>,
        tertiary: Box<dyn CandleProvider>,
        config: ProviderConfig,
    ) -> Self {
        Self {
            config,
            symbols: SymbolMap::global(),
            primary,
            secondary,
            tertiary,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Resolve a non-empty, ascending [`CandleSeries`] backed by exactly one provider.
    ///
    /// Every provider failure and rejected series is absorbed; only exhaustion of every
    /// provider is returned as [`DataError::DataUnavailable`].
    pub async fn resolve(
        &self,
        symbol: &MarketSymbol,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Resolved, DataError> {
        let mut stage = ResolveStage::TryPrimary;

        loop {
            debug!(%symbol, %timeframe, %stage, "resolving candles");

            stage = match stage {
                ResolveStage::TryPrimary => {
                    let descriptor = self.primary.descriptor();
                    if !descriptor.is_available(&self.config) || !descriptor.supports(timeframe) {
                        ResolveStage::TrySecondary
                    } else {
                        match self
                            .attempt(self.primary.as_ref(), symbol, timeframe, limit, Acceptance::NonEmpty)
                            .await
                        {
                            Ok(resolved) => return Ok(resolved),
                            Err(error) => self.advance(error, ResolveStage::TrySecondary),
                        }
                    }
                }
                ResolveStage::TrySecondary => {
                    if self.symbols.prefers_coingecko(symbol, timeframe) {
                        info!(%symbol, %timeframe, "skipping {} for preferred tertiary", self.secondary.id());
                        ResolveStage::TryTertiary
                    } else {
                        match self
                            .attempt(self.secondary.as_ref(), symbol, timeframe, limit, Acceptance::Validated)
                            .await
                        {
                            Ok(resolved) => return Ok(resolved),
                            Err(error) => self.advance(error, ResolveStage::TryTertiary),
                        }
                    }
                }
                ResolveStage::TryTertiary => {
                    match self
                        .attempt(self.tertiary.as_ref(), symbol, timeframe, limit, Acceptance::NonEmpty)
                        .await
                    {
                        Ok(resolved) => return Ok(resolved),
                        Err(error) => self.advance(error, ResolveStage::Exhausted),
                    }
                }
                ResolveStage::Exhausted => {
                    warn!(%symbol, %timeframe, "no candle data available from any provider");
                    return Err(DataError::DataUnavailable {
                        symbol: symbol.to_string(),
                        timeframe,
                    });
                }
            };
        }
    }

    async fn attempt(
        &self,
        provider: &dyn CandleProvider,
        symbol: &MarketSymbol,
        timeframe: Timeframe,
        limit: usize,
        acceptance: Acceptance,
    ) -> Result<Resolved, DataError> {
        let id = provider.id();
        let native_symbol = provider.native_symbol(symbol);

        let series = CandleSeries::from(provider.fetch(&native_symbol, timeframe, limit).await?);

        match acceptance {
            Acceptance::Validated => validation::validate(id, &series)?,
            Acceptance::NonEmpty if series.is_empty() => {
                return Err(DataError::InvalidData {
                    provider: id,
                    reason: Rejection::Empty.to_string(),
                });
            }
            Acceptance::NonEmpty => {}
        }

        info!(provider = %id, %symbol, %timeframe, candles = series.len(), "resolved candles");

        Ok(Resolved {
            provider: id,
            series,
        })
    }

    /// Absorb an attempt failure by moving to `next`. Errors outside the provider contract are
    /// logged louder but never escape the chain.
    fn advance(&self, error: DataError, next: ResolveStage) -> ResolveStage {
        if error.is_recoverable() {
            warn!(%error, %next, "candle provider attempt failed");
        } else {
            error!(%error, %next, "candle provider failed with an unexpected error");
        }
        next
    }
}

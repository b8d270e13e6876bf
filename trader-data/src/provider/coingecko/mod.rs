use crate::{
    candle::Timeframe,
    config::ProviderConfig,
    error::DataError,
    normalise::{RawCandles, TupleRow},
    provider::{CandleProvider, ProviderDescriptor, ProviderId, get_json},
    symbol::{MarketSymbol, SymbolMap},
};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

/// [`CoinGecko`] quote currency.
pub const VS_CURRENCY: &str = "usd";

/// [`CoinGecko`] fixed history window in days, independent of the requested limit.
pub const LOOKBACK_DAYS: u32 = 7;

/// [`CoinGecko`] position in the fallback chain.
pub const DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    id: ProviderId::CoinGecko,
    priority: 2,
    requires_credentials: false,
    timeframes: &Timeframe::ALL,
};

/// [`CoinGecko`] free OHLC adapter, keyed by coin id rather than ticker.
///
/// The candle granularity is chosen by CoinGecko from the lookback window, so the
/// requested timeframe and limit do not shape the request.
///
/// See docs: <https://docs.coingecko.com/reference/coins-id-ohlc>
#[derive(Debug, Clone)]
pub struct CoinGecko {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGecko {
    pub fn new(client: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            base_url: config.coingecko_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, coin_id: &str) -> Result<Url, DataError> {
        let mut url = Url::parse(&format!("{}/api/v3/coins", self.base_url))
            .map_err(|error| DataError::unavailable(ProviderId::CoinGecko, error))?;

        url.path_segments_mut()
            .map_err(|_| DataError::unavailable(ProviderId::CoinGecko, "base url cannot be a base"))?
            .push(coin_id)
            .push("ohlc");

        url.query_pairs_mut()
            .append_pair("vs_currency", VS_CURRENCY)
            .append_pair("days", &LOOKBACK_DAYS.to_string());

        Ok(url)
    }
}

#[async_trait]
impl CandleProvider for CoinGecko {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn native_symbol(&self, symbol: &MarketSymbol) -> String {
        SymbolMap::global().coingecko_id(symbol)
    }

    async fn fetch(
        &self,
        native_symbol: &str,
        timeframe: Timeframe,
        _: usize,
    ) -> Result<RawCandles, DataError> {
        let url = self.url(native_symbol)?;

        debug!(coin_id = native_symbol, %timeframe, days = LOOKBACK_DAYS, "fetching CoinGecko OHLC");

        get_json::<Vec<TupleRow>>(ProviderId::CoinGecko, self.client.get(url))
            .await
            .map(RawCandles::Tuples)
    }
}

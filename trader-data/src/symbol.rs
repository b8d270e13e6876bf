//! Static symbol tables translating canonical tickers into each provider's native identifier.
//!
//! Built once on first use and read-only thereafter, so they are safe to share across
//! concurrently resolving requests.

use crate::candle::Timeframe;
use derive_more::Display;
use fnv::{FnvHashMap, FnvHashSet};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Quote asset assumed when a request names only a base ticker.
pub const DEFAULT_QUOTE: &str = "USDT";

/// CoinGecko coin identifiers keyed by canonical ticker.
const COINGECKO_IDS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("BNB", "binancecoin"),
    ("SOL", "solana"),
    ("XRP", "ripple"),
    ("ADA", "cardano"),
    ("DOGE", "dogecoin"),
    ("MATIC", "matic-network"),
    ("DOT", "polkadot"),
    ("AVAX", "avalanche-2"),
    ("LINK", "chainlink"),
    ("UNI", "uniswap"),
    ("ATOM", "cosmos"),
    ("LTC", "litecoin"),
    ("NEAR", "near"),
    ("APT", "aptos"),
    ("ARB", "arbitrum"),
    ("OP", "optimism"),
    ("SUI", "sui"),
    ("PEPE", "pepe"),
    ("SHIB", "shiba-inu"),
    ("FTM", "fantom"),
    ("AAVE", "aave"),
    ("INJ", "injective-protocol"),
];

/// CryptoCompare ticker aliases (ticker migrations and wrapped assets).
const CRYPTOCOMPARE_ALIASES: &[(&str, &str)] = &[
    ("POL", "MATIC"),
    ("1000SATS", "SATS"),
    ("WBTC", "BTC"),
    ("WETH", "ETH"),
];

/// Tickers whose short timeframe history is better served by CoinGecko than CryptoCompare.
const COINGECKO_PREFERRED: &[&str] = &["MATIC", "POL", "NEAR", "FTM", "ALGO", "VET"];

/// Canonical market symbol, e.g. `BTC/USDT`.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Deserialize, Serialize)]
#[display("{base}/{quote}")]
pub struct MarketSymbol {
    pub base: String,
    pub quote: String,
}

impl MarketSymbol {
    /// Parse either a bare ticker (`"btc"`) or a pair (`"BTC/USDT"`), upper-casing both legs.
    pub fn parse(raw: &str) -> Self {
        let mut legs = raw.trim().splitn(2, '/');
        let base = legs.next().unwrap_or_default().trim().to_uppercase();
        let quote = legs
            .next()
            .map(|quote| quote.split(':').next().unwrap_or(quote).trim().to_uppercase())
            .filter(|quote| !quote.is_empty())
            .unwrap_or_else(|| DEFAULT_QUOTE.to_string());

        Self { base, quote }
    }
}

/// Immutable lookup tables consulted by the provider adapters and the resolver.
#[derive(Debug)]
pub struct SymbolMap {
    coingecko_ids: FnvHashMap<&'static str, &'static str>,
    cryptocompare_aliases: FnvHashMap<&'static str, &'static str>,
    coingecko_preferred: FnvHashSet<&'static str>,
}

impl SymbolMap {
    /// Process-wide instance.
    pub fn global() -> &'static SymbolMap {
        static SYMBOL_MAP: OnceLock<SymbolMap> = OnceLock::new();
        SYMBOL_MAP.get_or_init(SymbolMap::default)
    }

    /// CoinGecko coin id, falling back to the lowercased ticker.
    pub fn coingecko_id(&self, symbol: &MarketSymbol) -> String {
        self.coingecko_ids
            .get(symbol.base.as_str())
            .map(|id| id.to_string())
            .unwrap_or_else(|| symbol.base.to_lowercase())
    }

    /// CryptoCompare `fsym`, falling back to the ticker unchanged.
    pub fn cryptocompare_symbol(&self, symbol: &MarketSymbol) -> String {
        self.cryptocompare_aliases
            .get(symbol.base.as_str())
            .copied()
            .unwrap_or(symbol.base.as_str())
            .to_string()
    }

    /// Bybit spot market, e.g. `BTCUSDT`. Any settle leg (`BTC/USDT:USDT`) is ignored.
    pub fn bybit_symbol(&self, symbol: &MarketSymbol) -> String {
        format!("{}{}", symbol.base, symbol.quote)
    }

    /// Whether the secondary provider should be skipped in favour of CoinGecko.
    pub fn prefers_coingecko(&self, symbol: &MarketSymbol, timeframe: Timeframe) -> bool {
        timeframe.is_short() && self.coingecko_preferred.contains(symbol.base.as_str())
    }
}

impl Default for SymbolMap {
    fn default() -> Self {
        Self {
            coingecko_ids: COINGECKO_IDS.iter().copied().collect(),
            cryptocompare_aliases: CRYPTOCOMPARE_ALIASES.iter().copied().collect(),
            coingecko_preferred: COINGECKO_PREFERRED.iter().copied().collect(),
        }
    }
}

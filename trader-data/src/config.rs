use std::time::Duration;

/// Default per-call upstream timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub const BASE_URL_BYBIT: &str = "https://api.bybit.com";
pub const BASE_URL_CRYPTOCOMPARE: &str = "https://min-api.cryptocompare.com";
pub const BASE_URL_COINGECKO: &str = "https://api.coingecko.com";
pub const BASE_URL_FEAR_GREED: &str = "https://api.alternative.me";
pub const BASE_URL_BLOCKCHAIN: &str = "https://blockchain.info";

/// Bybit API key pair gating the credentialed primary provider.
#[derive(Clone, PartialEq, Eq)]
pub struct BybitCredentials {
    pub api_key: String,
    pub secret: String,
}

impl std::fmt::Debug for BybitCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BybitCredentials")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Upstream configuration passed into the [`CandleResolver`](crate::resolver::CandleResolver)
/// at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Primary provider is only eligible when present.
    pub bybit: Option<BybitCredentials>,
    pub http_timeout: Duration,
    pub bybit_base_url: String,
    pub cryptocompare_base_url: String,
    pub coingecko_base_url: String,
    pub fear_greed_base_url: String,
    pub blockchain_base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            bybit: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            bybit_base_url: BASE_URL_BYBIT.to_string(),
            cryptocompare_base_url: BASE_URL_CRYPTOCOMPARE.to_string(),
            coingecko_base_url: BASE_URL_COINGECKO.to_string(),
            fear_greed_base_url: BASE_URL_FEAR_GREED.to_string(),
            blockchain_base_url: BASE_URL_BLOCKCHAIN.to_string(),
        }
    }
}

impl ProviderConfig {
    /// Read provider configuration from the process environment.
    ///
    /// `BYBIT_API_KEY` enables the primary provider; `BYBIT_SECRET` may be empty.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bybit = env_non_empty("BYBIT_API_KEY").map(|api_key| BybitCredentials {
            api_key,
            secret: env_non_empty("BYBIT_SECRET").unwrap_or_default(),
        });

        let http_timeout = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.trim().parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        Self {
            bybit,
            http_timeout,
            bybit_base_url: env_non_empty("BYBIT_BASE_URL").unwrap_or(defaults.bybit_base_url),
            cryptocompare_base_url: env_non_empty("CRYPTOCOMPARE_BASE_URL")
                .unwrap_or(defaults.cryptocompare_base_url),
            coingecko_base_url: env_non_empty("COINGECKO_BASE_URL")
                .unwrap_or(defaults.coingecko_base_url),
            fear_greed_base_url: env_non_empty("FEAR_GREED_BASE_URL")
                .unwrap_or(defaults.fear_greed_base_url),
            blockchain_base_url: env_non_empty("BLOCKCHAIN_BASE_URL")
                .unwrap_or(defaults.blockchain_base_url),
        }
    }

    pub fn with_bybit_credentials(
        mut self,
        api_key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        self.bybit = Some(BybitCredentials {
            api_key: api_key.into(),
            secret: secret.into(),
        });
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn has_bybit_credentials(&self) -> bool {
        self.bybit.is_some()
    }

    /// Shared HTTP client honouring the configured per-call timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .user_agent(concat!("trader-data/", env!("CARGO_PKG_VERSION")))
            .build()
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

use crate::{
    candle::Timeframe, config::ProviderConfig, error::DataError, normalise::RawCandles,
    symbol::MarketSymbol,
};
use async_trait::async_trait;
use derive_more::Display;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

/// Credentialed exchange provider, highest priority.
pub mod bybit;

/// CoinGecko id-keyed aggregator, last resort with a fixed lookback window.
pub mod coingecko;

/// CryptoCompare ticker-keyed aggregator.
pub mod cryptocompare;

/// Unique identifier for an upstream candle provider.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Deserialize, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    #[display("bybit")]
    Bybit,
    #[display("cryptocompare")]
    CryptoCompare,
    #[display("coingecko")]
    CoinGecko,
}

/// Static description of a provider's place in the fallback chain.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    /// Lower ranks are attempted first.
    pub priority: u8,
    /// Provider is only eligible when credentials are configured.
    pub requires_credentials: bool,
    pub timeframes: &'static [Timeframe],
}

impl ProviderDescriptor {
    pub fn supports(&self, timeframe: Timeframe) -> bool {
        self.timeframes.contains(&timeframe)
    }

    pub fn is_available(&self, config: &ProviderConfig) -> bool {
        !self.requires_credentials || config.has_bybit_credentials()
    }
}

/// One upstream candle data source.
///
/// Implementations issue a single HTTP request per [`CandleProvider::fetch`] and never retry;
/// every failure is reported as a [`DataError::ProviderUnavailable`].
#[async_trait]
pub trait CandleProvider: Send + Sync {
    fn descriptor(&self) -> &ProviderDescriptor;

    fn id(&self) -> ProviderId {
        self.descriptor().id
    }

    /// Translate a canonical symbol into this provider's native identifier.
    fn native_symbol(&self, symbol: &MarketSymbol) -> String;

    /// Fetch raw rows for an already mapped native identifier.
    async fn fetch(
        &self,
        native_symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<RawCandles, DataError>;
}

/// Send a request and deserialise a successful JSON body, mapping every failure to
/// [`DataError::ProviderUnavailable`].
pub(crate) async fn get_json<T>(
    provider: ProviderId,
    request: reqwest::RequestBuilder,
) -> Result<T, DataError>
where
    T: DeserializeOwned,
{
    send_json(request).await.map_err(|reason| {
        debug!(%provider, %reason, "provider request failed");
        DataError::unavailable(provider, reason)
    })
}

/// Send a request and deserialise a successful JSON body, describing any failure.
pub(crate) async fn send_json<T>(request: reqwest::RequestBuilder) -> Result<T, String>
where
    T: DeserializeOwned,
{
    let response = request
        .send()
        .await
        .map_err(|error| format!("HTTP request failed: {error}"))?;

    if let Err(status_err) = response.error_for_status_ref() {
        return Err(format!("HTTP error: {status_err}"));
    }

    let body = response
        .bytes()
        .await
        .map_err(|error| format!("HTTP body failed: {error}"))?;

    if body.is_empty() {
        return Err("empty response body".to_string());
    }

    serde_json::from_slice(&body).map_err(|error| format!("JSON parse failed: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_availability() {
        struct TestCase {
            descriptor: ProviderDescriptor,
            config: ProviderConfig,
            expected: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: credentialed provider without credentials
                descriptor: bybit::DESCRIPTOR,
                config: ProviderConfig::default(),
                expected: false,
            },
            TestCase {
                // TC1: credentialed provider with credentials
                descriptor: bybit::DESCRIPTOR,
                config: ProviderConfig::default().with_bybit_credentials("key", "secret"),
                expected: true,
            },
            TestCase {
                // TC2: free provider is always available
                descriptor: cryptocompare::DESCRIPTOR,
                config: ProviderConfig::default(),
                expected: true,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.descriptor.is_available(&test.config);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_descriptor_priority_order() {
        let mut descriptors = [
            coingecko::DESCRIPTOR,
            bybit::DESCRIPTOR,
            cryptocompare::DESCRIPTOR,
        ];
        descriptors.sort_by_key(|descriptor| descriptor.priority);

        let ids: Vec<ProviderId> = descriptors.iter().map(|descriptor| descriptor.id).collect();
        assert_eq!(
            ids,
            vec![ProviderId::Bybit, ProviderId::CryptoCompare, ProviderId::CoinGecko]
        );
    }

    mod http {
        use crate::{
            candle::{CandleSeries, Timeframe},
            config::ProviderConfig,
            error::DataError,
            provider::{CandleProvider, ProviderId, cryptocompare::CryptoCompare},
        };
        use std::time::Duration;
        use tokio::{
            io::{AsyncReadExt, AsyncWriteExt},
            net::TcpListener,
        };

        fn response(status: &str, body: &str) -> String {
            format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
        }

        /// Serve `response` to every connection after `delay`, returning the base url.
        async fn serve(response: String, delay: Duration) -> String {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();

            tokio::spawn(async move {
                while let Ok((mut stream, _)) = listener.accept().await {
                    let response = response.clone();
                    tokio::spawn(async move {
                        let mut request = [0u8; 4096];
                        let _ = stream.read(&mut request).await;
                        tokio::time::sleep(delay).await;
                        let _ = stream.write_all(response.as_bytes()).await;
                        let _ = stream.shutdown().await;
                    });
                }
            });

            format!("http://{addr}")
        }

        /// Base url of a port nothing is listening on.
        async fn refused() -> String {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);
            format!("http://{addr}")
        }

        fn cryptocompare(base_url: String, timeout: Duration) -> CryptoCompare {
            let config = ProviderConfig {
                cryptocompare_base_url: base_url,
                ..ProviderConfig::default()
            }
            .with_http_timeout(timeout);

            CryptoCompare::new(config.http_client().unwrap(), &config)
        }

        #[tokio::test]
        async fn test_fetch_failures_are_provider_unavailable() {
            struct TestCase {
                base_url: String,
                timeout: Duration,
                expected_reason: &'static str,
            }

            let quick = Duration::from_secs(5);

            let tests = vec![
                TestCase {
                    // TC0: non-2xx status
                    base_url: serve(response("500 Internal Server Error", "{}"), Duration::ZERO)
                        .await,
                    timeout: quick,
                    expected_reason: "HTTP error",
                },
                TestCase {
                    // TC1: malformed JSON
                    base_url: serve(response("200 OK", "{nope"), Duration::ZERO).await,
                    timeout: quick,
                    expected_reason: "JSON parse failed",
                },
                TestCase {
                    // TC2: empty body
                    base_url: serve(response("200 OK", ""), Duration::ZERO).await,
                    timeout: quick,
                    expected_reason: "empty response body",
                },
                TestCase {
                    // TC3: upstream slower than the configured timeout
                    base_url: serve(response("200 OK", "{}"), Duration::from_secs(3)).await,
                    timeout: Duration::from_millis(200),
                    expected_reason: "HTTP request failed",
                },
                TestCase {
                    // TC4: connection refused
                    base_url: refused().await,
                    timeout: quick,
                    expected_reason: "HTTP request failed",
                },
            ];

            for (index, test) in tests.into_iter().enumerate() {
                let actual = cryptocompare(test.base_url, test.timeout)
                    .fetch("BTC", Timeframe::H1, 10)
                    .await
                    .unwrap_err();

                match actual {
                    DataError::ProviderUnavailable { provider, reason } => {
                        assert_eq!(provider, ProviderId::CryptoCompare, "TC{} failed", index);
                        assert!(
                            reason.contains(test.expected_reason),
                            "TC{} failed: {reason}",
                            index
                        );
                    }
                    other => panic!("TC{} failed: {other:?}", index),
                }
            }
        }

        #[tokio::test]
        async fn test_fetch_malformed_wrapper_is_empty_series() {
            let base_url = serve(
                response("200 OK", r#"{"Response":"Success","Data":{"Data":7}}"#),
                Duration::ZERO,
            )
            .await;

            let raw = cryptocompare(base_url, Duration::from_secs(5))
                .fetch("BTC", Timeframe::H1, 10)
                .await
                .unwrap();

            assert!(CandleSeries::from(raw).is_empty());
        }
    }

    #[test]
    fn test_provider_id_serde() {
        assert_eq!(
            serde_json::to_string(&ProviderId::CryptoCompare).unwrap(),
            "\"cryptocompare\""
        );
        assert_eq!(ProviderId::CoinGecko.to_string(), "coingecko");
    }
}

use crate::{candle::Timeframe, provider::ProviderId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors generated in `trader-data`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize, Error)]
pub enum DataError {
    #[error("provider {provider} unavailable: {reason}")]
    ProviderUnavailable { provider: ProviderId, reason: String },

    #[error("provider {provider} returned invalid data: {reason}")]
    InvalidData { provider: ProviderId, reason: String },

    #[error("no data available from any source for {symbol} {timeframe}")]
    DataUnavailable { symbol: String, timeframe: Timeframe },

    #[error("unsupported timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("{capability} source failed: {reason}")]
    Source { capability: String, reason: String },
}

impl DataError {
    /// Determine if an error is absorbed by the
    /// [`CandleResolver`](crate::resolver::CandleResolver) by advancing to the next provider.
    #[allow(clippy::match_like_matches_macro)]
    pub fn is_recoverable(&self) -> bool {
        match self {
            DataError::ProviderUnavailable { .. } | DataError::InvalidData { .. } => true,
            _ => false,
        }
    }

    /// Construct a [`DataError::ProviderUnavailable`] from any displayable failure.
    pub fn unavailable(provider: ProviderId, reason: impl std::fmt::Display) -> Self {
        Self::ProviderUnavailable {
            provider,
            reason: reason.to_string(),
        }
    }

    /// Construct a [`DataError::Source`] for a failed collaborating capability.
    pub fn capability(capability: &str, reason: impl std::fmt::Display) -> Self {
        Self::Source {
            capability: capability.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_is_recoverable() {
        struct TestCase {
            input: DataError,
            expected: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: ProviderUnavailable advances the fallback chain
                input: DataError::unavailable(ProviderId::Bybit, "HTTP error: 503"),
                expected: true,
            },
            TestCase {
                // TC1: InvalidData advances the fallback chain
                input: DataError::InvalidData {
                    provider: ProviderId::CryptoCompare,
                    reason: "flat candles".to_string(),
                },
                expected: true,
            },
            TestCase {
                // TC2: DataUnavailable escapes to the caller
                input: DataError::DataUnavailable {
                    symbol: "BTC".to_string(),
                    timeframe: Timeframe::H1,
                },
                expected: false,
            },
            TestCase {
                // TC3: InvalidTimeframe escapes to the caller
                input: DataError::InvalidTimeframe("2w".to_string()),
                expected: false,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.input.is_recoverable();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_data_unavailable_display() {
        let error = DataError::DataUnavailable {
            symbol: "BTC".to_string(),
            timeframe: Timeframe::M5,
        };
        assert_eq!(
            error.to_string(),
            "no data available from any source for BTC 5m"
        );
    }
}

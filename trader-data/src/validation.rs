//! Data quality checks applied to a normalised [`CandleSeries`] before it is accepted.
//!
//! A rejected series is a signal to try the next provider, never an error on its own.

use crate::{candle::CandleSeries, error::DataError, provider::ProviderId};

/// Reason a [`CandleSeries`] was rejected.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Rejection {
    Empty,
    /// Every candle has `open == close` and `high == low`: typical of placeholder data
    /// served for an unsupported symbol. A genuinely motionless market is also rejected.
    NoVariation,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::Empty => "empty candle series",
            Rejection::NoVariation => "no price variation across candles",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Check a series is usable. Inverted candles (`high < low`) are tolerated.
pub fn check(series: &CandleSeries) -> Result<(), Rejection> {
    if series.is_empty() {
        return Err(Rejection::Empty);
    }

    if series.iter().all(|candle| candle.is_flat()) {
        return Err(Rejection::NoVariation);
    }

    Ok(())
}

/// [`check`] a series produced by `provider`, mapping a rejection to [`DataError::InvalidData`].
pub fn validate(provider: ProviderId, series: &CandleSeries) -> Result<(), DataError> {
    check(series).map_err(|rejection| DataError::InvalidData {
        provider,
        reason: rejection.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candle::candle;

    #[test]
    fn test_check() {
        struct TestCase {
            input: CandleSeries,
            expected: Result<(), Rejection>,
        }

        let tests = vec![
            TestCase {
                // TC0: empty series
                input: CandleSeries::default(),
                expected: Err(Rejection::Empty),
            },
            TestCase {
                // TC1: every candle flat
                input: CandleSeries::new([
                    candle(1, 5.0, 5.0, 5.0, 5.0),
                    candle(2, 6.0, 6.0, 6.0, 6.0),
                ]),
                expected: Err(Rejection::NoVariation),
            },
            TestCase {
                // TC2: single varying candle among flat ones
                input: CandleSeries::new([
                    candle(1, 5.0, 5.0, 5.0, 5.0),
                    candle(2, 5.0, 6.0, 4.0, 5.5),
                    candle(3, 6.0, 6.0, 6.0, 6.0),
                ]),
                expected: Ok(()),
            },
            TestCase {
                // TC3: open == close but high != low counts as variation
                input: CandleSeries::new([candle(1, 5.0, 6.0, 4.0, 5.0)]),
                expected: Ok(()),
            },
            TestCase {
                // TC4: inverted high/low is tolerated
                input: CandleSeries::new([candle(1, 100.0, 90.0, 110.0, 105.0)]),
                expected: Ok(()),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = check(&test.input);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_validate_maps_to_invalid_data() {
        let error = validate(ProviderId::CryptoCompare, &CandleSeries::default()).unwrap_err();
        assert_eq!(
            error,
            DataError::InvalidData {
                provider: ProviderId::CryptoCompare,
                reason: "empty candle series".to_string(),
            }
        );
        assert!(error.is_recoverable());
    }
}

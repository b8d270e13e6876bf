use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use trader_data::error::DataError;

/// Failure rendered to dashboard clients as `{ "success": false, "error": ... }`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Data(DataError),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "{msg}"),
            Self::Data(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Data(DataError::InvalidTimeframe(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Data(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }

        let body = json!({ "success": false, "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

impl From<DataError> for ApiError {
    fn from(error: DataError) -> Self {
        Self::Data(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trader_data::candle::Timeframe;

    #[test]
    fn test_api_error_status() {
        struct TestCase {
            input: ApiError,
            expected: StatusCode,
        }

        let tests = vec![
            TestCase {
                // TC0: every provider exhausted
                input: ApiError::from(DataError::DataUnavailable {
                    symbol: "BTC/USDT".to_string(),
                    timeframe: Timeframe::H1,
                }),
                expected: StatusCode::INTERNAL_SERVER_ERROR,
            },
            TestCase {
                // TC1: unknown timeframe token
                input: ApiError::from(DataError::InvalidTimeframe("2w".to_string())),
                expected: StatusCode::BAD_REQUEST,
            },
            TestCase {
                // TC2: capability upstream down
                input: ApiError::from(DataError::capability("fear-greed", "HTTP error: 503")),
                expected: StatusCode::INTERNAL_SERVER_ERROR,
            },
            TestCase {
                // TC3: malformed body
                input: ApiError::BadRequest("missing field `symbol`".to_string()),
                expected: StatusCode::BAD_REQUEST,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            assert_eq!(test.input.status(), test.expected, "TC{} failed", index);
            assert_eq!(
                test.input.into_response().status(),
                test.expected,
                "TC{} failed",
                index
            );
        }
    }
}

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::Deserialize;
use std::sync::Arc;
use trader_data::{candle::Timeframe, scanner::Recommendation};

use crate::{error::ApiError, routes::Envelope, state::AppState};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub timeframe: Option<Timeframe>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/scan-markets", post(scan_markets))
}

pub async fn scan_markets(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<Envelope<Vec<Recommendation>>>, ApiError> {
    let Json(request) = payload?;
    let timeframe = request.timeframe.unwrap_or(Timeframe::H1);

    let recommendations = state.scanner.scan(timeframe).await?;
    tracing::debug!(%timeframe, count = recommendations.len(), "scanned markets");

    Ok(Envelope::ok(recommendations))
}

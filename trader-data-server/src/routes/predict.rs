use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::Deserialize;
use std::sync::Arc;
use trader_data::{candle::Timeframe, prediction::Prediction, symbol::MarketSymbol};

use crate::{error::ApiError, routes::Envelope, state::AppState};

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub symbol: String,
    #[serde(default)]
    pub timeframe: Option<Timeframe>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/predict", post(predict))
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<Envelope<Prediction>>, ApiError> {
    let Json(request) = payload?;

    let symbol = MarketSymbol::parse(&request.symbol);
    let timeframe = request.timeframe.unwrap_or(Timeframe::H1);

    let prediction = state.predictor.predict(&symbol, timeframe).await?;
    tracing::debug!(%symbol, %timeframe, score = prediction.score, "scored prediction");

    Ok(Envelope::ok(prediction))
}

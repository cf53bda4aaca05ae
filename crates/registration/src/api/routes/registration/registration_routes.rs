use axum::{
    extract::{Query, State},
    response::ErrorResponse,
    Json,
};
use log::error;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    domain::{DynamicConfig, PricingPeriodsReport, Quote},
    startup::AppState,
};

pub async fn get_dynamic_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DynamicConfig>, ErrorResponse> {
    state
        .pricing
        .dynamic_config()
        .await
        .map(Json)
        .map_err(|e| {
            error!("error building registration configuration: {:?}", e);
            e.into()
        })
}

pub async fn get_pricing_periods(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PricingPeriodsReport>, ErrorResponse> {
    state
        .pricing
        .pricing_periods()
        .await
        .map(Json)
        .map_err(|e| {
            error!("error resolving pricing periods: {:?}", e);
            e.into()
        })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteQuery {
    pub registration_type_id: String,
    pub currency: String,
}

pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<Quote>, ErrorResponse> {
    state
        .pricing
        .quote(&query.registration_type_id, &query.currency)
        .await
        .map(Json)
        .map_err(|e| {
            error!(
                "error quoting {} in {}: {:?}",
                query.registration_type_id, query.currency, e
            );
            e.into()
        })
}

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use mockall::mock;
use registration::{
    app,
    domain::{
        AccommodationOptionDocument, RegistrationSettingsDocument, RegistrationTypeDocument,
        SponsorshipTierDocument,
    },
    AppState, ConfigStore, PricingService, StoreError,
};
use registration_core::{CurrencySet, PricingDates};
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::{Arc, Once};
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;

mock! {
    #[derive(Send, Sync)]
    pub Store { }

    #[async_trait]
    impl ConfigStore for Store {
        async fn registration_settings(&self) -> Result<Option<RegistrationSettingsDocument>, StoreError>;
        async fn registration_types(&self) -> Result<Vec<RegistrationTypeDocument>, StoreError>;
        async fn sponsorship_tiers(&self) -> Result<Vec<SponsorshipTierDocument>, StoreError>;
        async fn accommodation_options(&self) -> Result<Vec<AccommodationOptionDocument>, StoreError>;
        async fn ping(&self) -> Result<(), StoreError>;
    }
}

static INIT_LOGGER: Once = Once::new();

pub fn setup_static_logger() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Boundaries used by most tests: early bird until March 1st, next round
/// until June 1st, on-spot until August 3rd 2025
pub fn conference_dates() -> PricingDates {
    PricingDates {
        early_bird_start: None,
        early_bird_end: Some(String::from("2025-03-01")),
        next_round_start: Some(String::from("2025-03-02")),
        next_round_end: Some(String::from("2025-06-01")),
        spot_registration_start: Some(String::from("2025-06-02")),
        registration_close_date: Some(String::from("2025-08-03")),
    }
}

pub fn registration_type(id: &str, name: &str, display_order: i64) -> RegistrationTypeDocument {
    RegistrationTypeDocument {
        id: id.to_string(),
        name: name.to_string(),
        category: Some(id.to_string()),
        early_bird_price: Some(Decimal::from(299)),
        early_bird_price_eur: Some(Decimal::from(279)),
        early_bird_price_gbp: Some(Decimal::from(239)),
        next_round_price: Some(Decimal::from(349)),
        next_round_price_eur: Some(Decimal::from(329)),
        next_round_price_gbp: Some(Decimal::from(289)),
        on_spot_price: Some(Decimal::from(399)),
        on_spot_price_eur: Some(Decimal::from(379)),
        on_spot_price_gbp: Some(Decimal::from(339)),
        is_active: Some(true),
        display_order: Some(Decimal::from(display_order)),
        ..RegistrationTypeDocument::default()
    }
}

pub fn test_app(store: impl ConfigStore + 'static, now: OffsetDateTime) -> Router {
    setup_static_logger();
    let pricing = PricingService::new(Arc::new(store), CurrencySet::default(), Duration::hours(24))
        .with_clock(Arc::new(move || now));
    app(
        AppState::new(pricing),
        vec![String::from("http://localhost:3000")],
    )
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

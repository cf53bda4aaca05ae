use axum::http::StatusCode;
use registration::{InMemoryStore, StoreError};
use registration_core::PricingDates;
use rust_decimal::Decimal;
use serde_json::json;
use time::macros::datetime;

use crate::helpers::{conference_dates, get_json, registration_type, test_app, MockStore};

const DYNAMIC_CONFIG: &str = "/api/registration/dynamic-config";

#[tokio::test]
async fn test_next_round_active_mid_april() {
    let store = InMemoryStore::new()
        .with_pricing_dates(conference_dates())
        .with_registration_types(vec![registration_type("speaker-inperson", "Speaker", 1)]);

    let (status, body) = get_json(test_app(store, datetime!(2025-04-15 0:00 UTC)), DYNAMIC_CONFIG).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["activePeriod"]["periodId"], "nextRound");
    assert_eq!(body["activePeriod"]["title"], "Mid Term Registration");
    assert_eq!(body["pricingPeriods"].as_array().unwrap().len(), 3);
    assert_eq!(
        body["pricingTable"],
        json!([
            { "registrationTypeId": "speaker-inperson", "currency": "USD", "periodId": "nextRound", "amount": 349.0, "defaulted": false },
            { "registrationTypeId": "speaker-inperson", "currency": "EUR", "periodId": "nextRound", "amount": 329.0, "defaulted": false },
            { "registrationTypeId": "speaker-inperson", "currency": "GBP", "periodId": "nextRound", "amount": 289.0, "defaulted": false },
        ])
    );
    let codes: Vec<&str> = body["currencies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|currency| currency["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["USD", "EUR", "GBP"]);
    assert_eq!(body["currentDate"], "2025-04-15T00:00:00Z");
}

#[tokio::test]
async fn test_closed_registration_has_no_active_period() {
    let store = InMemoryStore::new()
        .with_pricing_dates(conference_dates())
        .with_registration_types(vec![registration_type("speaker-inperson", "Speaker", 1)]);

    let (status, body) = get_json(test_app(store, datetime!(2025-09-01 0:00 UTC)), DYNAMIC_CONFIG).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["activePeriod"].is_null());
    assert_eq!(body["pricingTable"], json!([]));
    // Types and periods are still listed so the page can explain why
    assert_eq!(body["registrationTypes"].as_array().unwrap().len(), 1);
    assert_eq!(body["pricingPeriods"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_missing_currency_priced_at_zero() {
    let mut student = registration_type("student-virtual", "Student (Virtual)", 4);
    student.next_round_price = Some(Decimal::from(149));
    student.next_round_price_eur = None;
    let store = InMemoryStore::new()
        .with_pricing_dates(conference_dates())
        .with_registration_types(vec![student]);

    let (status, body) = get_json(test_app(store, datetime!(2025-04-15 0:00 UTC)), DYNAMIC_CONFIG).await;

    assert_eq!(status, StatusCode::OK);
    let eur = body["pricingTable"]
        .as_array()
        .unwrap()
        .iter()
        .find(|price| price["currency"] == "EUR")
        .unwrap();
    assert_eq!(eur["amount"], 0.0);
    assert_eq!(eur["defaulted"], true);

    let next_round = &body["registrationTypes"][0]["pricingByPeriod"]["nextRound"];
    assert_eq!(next_round["prices"]["USD"], 149.0);
    assert_eq!(next_round["defaulted"], json!(["EUR"]));
    assert_eq!(next_round["period"]["periodId"], "nextRound");
}

#[tokio::test]
async fn test_registration_types_follow_display_order() {
    let store = InMemoryStore::new()
        .with_pricing_dates(conference_dates())
        .with_registration_types(vec![
            registration_type("listener-inperson", "Listener", 5),
            registration_type("speaker-inperson", "Speaker", 2),
        ]);

    let (_, body) = get_json(test_app(store, datetime!(2025-04-15 0:00 UTC)), DYNAMIC_CONFIG).await;

    let ids: Vec<&str> = body["registrationTypes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|registration_type| registration_type["_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["speaker-inperson", "listener-inperson"]);
    assert_eq!(body["pricingTable"][0]["registrationTypeId"], "speaker-inperson");
}

#[tokio::test]
async fn test_missing_field_reported_by_name() {
    let mut dates = conference_dates();
    dates.next_round_end = None;
    let store = InMemoryStore::new().with_pricing_dates(dates);

    let (status, body) = get_json(test_app(store, datetime!(2025-04-15 0:00 UTC)), DYNAMIC_CONFIG).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("nextRoundEnd"));
}

#[tokio::test]
async fn test_settings_without_pricing_dates() {
    let store = InMemoryStore::new();
    store.set_pricing_dates(None);

    let (status, body) = get_json(test_app(store, datetime!(2025-04-15 0:00 UTC)), DYNAMIC_CONFIG).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("pricingDates"));
}

#[tokio::test]
async fn test_unparseable_date_is_rejected() {
    let store = InMemoryStore::new().with_pricing_dates(PricingDates {
        spot_registration_start: Some(String::from("June 2nd")),
        ..conference_dates()
    });

    let (status, body) = get_json(test_app(store, datetime!(2025-04-15 0:00 UTC)), DYNAMIC_CONFIG).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("spotRegistrationStart"));
}

#[tokio::test]
async fn test_store_failure_returns_no_partial_document() {
    let mut store = MockStore::new();
    store
        .expect_registration_settings()
        .returning(|| Ok(None));
    store
        .expect_registration_types()
        .returning(|| Err(StoreError::Transient(String::from("503 from upstream"))));
    store.expect_sponsorship_tiers().returning(|| Ok(vec![]));
    store.expect_accommodation_options().returning(|| Ok(vec![]));

    let (status, body) = get_json(test_app(store, datetime!(2025-04-15 0:00 UTC)), DYNAMIC_CONFIG).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "failed to fetch registration configuration" })
    );
}

#[tokio::test]
async fn test_sponsorship_and_accommodation_prices() {
    let store = InMemoryStore::demo(datetime!(2025-04-15 0:00 UTC));

    let (status, body) = get_json(test_app(store, datetime!(2025-04-15 0:00 UTC)), DYNAMIC_CONFIG).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["activePeriod"]["periodId"], "earlyBird");
    assert_eq!(
        body["sponsorshipTiers"][0]["prices"],
        json!({ "USD": 5000.0, "EUR": 4600.0, "GBP": 3900.0 })
    );
    let room = &body["accommodationOptions"][0]["roomOptions"][0];
    assert_eq!(room["roomType"], "Single");
    assert_eq!(room["prices"]["GBP"], 95.0);
    assert_eq!(body["accommodationOptions"][0]["hotelName"], "Conference Hotel");
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let store = InMemoryStore::new()
        .with_pricing_dates(conference_dates())
        .with_registration_types(vec![
            registration_type("listener-inperson", "Listener", 5),
            registration_type("speaker-inperson", "Speaker", 2),
        ]);
    let app = test_app(store, datetime!(2025-04-15 0:00 UTC));

    let (_, first) = get_json(app.clone(), DYNAMIC_CONFIG).await;
    let (_, second) = get_json(app, DYNAMIC_CONFIG).await;

    assert_eq!(first["pricingTable"], second["pricingTable"]);
    assert_eq!(first["registrationTypes"], second["registrationTypes"]);
    assert_eq!(first["activePeriod"], second["activePeriod"]);
}

#[tokio::test]
async fn test_health_check_pings_store() {
    let mut store = MockStore::new();
    store
        .expect_ping()
        .returning(|| Err(StoreError::Request(String::from("401 unauthorized"))));
    let (status, _) = get_json(
        test_app(store, datetime!(2025-04-15 0:00 UTC)),
        "/api/v1/health_check",
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = get_json(
        test_app(InMemoryStore::new(), datetime!(2025-04-15 0:00 UTC)),
        "/api/v1/health_check",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

use axum::http::StatusCode;
use registration::InMemoryStore;
use time::macros::datetime;

use crate::helpers::{conference_dates, get_json, registration_type, test_app};

fn store() -> InMemoryStore {
    let mut exhibitor = registration_type("exhibitor", "Exhibitor", 3);
    exhibitor.next_round_price_gbp = None;
    let mut retired = registration_type("poster-inperson", "Poster (In-Person)", 9);
    retired.is_active = Some(false);

    InMemoryStore::new()
        .with_pricing_dates(conference_dates())
        .with_registration_types(vec![
            registration_type("speaker-inperson", "Speaker", 1),
            exhibitor,
            retired,
        ])
}

#[tokio::test]
async fn test_quote_uses_active_period_price() {
    let app = test_app(store(), datetime!(2025-03-02 0:00 UTC));

    let (status, body) = get_json(
        app,
        "/api/registration/quote?registrationTypeId=speaker-inperson&currency=eur",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["periodId"], "nextRound");
    assert_eq!(body["currency"], "EUR");
    assert_eq!(body["amount"], 329.0);
    assert_eq!(body["formatted"], "€329");
    assert_eq!(body["period"]["title"], "Mid Term Registration");
}

#[tokio::test]
async fn test_quote_on_last_day_of_early_bird() {
    let app = test_app(store(), datetime!(2025-03-01 23:30 UTC));

    let (status, body) = get_json(
        app,
        "/api/registration/quote?registrationTypeId=speaker-inperson&currency=USD",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["periodId"], "earlyBird");
    assert_eq!(body["amount"], 299.0);
}

#[tokio::test]
async fn test_quote_refuses_defaulted_price() {
    let app = test_app(store(), datetime!(2025-04-15 0:00 UTC));

    let (status, body) = get_json(
        app,
        "/api/registration/quote?registrationTypeId=exhibitor&currency=GBP",
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("exhibitor"));
}

#[tokio::test]
async fn test_quote_when_registration_closed() {
    let app = test_app(store(), datetime!(2025-08-04 0:00 UTC));

    let (status, body) = get_json(
        app,
        "/api/registration/quote?registrationTypeId=speaker-inperson&currency=USD",
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "registration currently unavailable");
}

#[tokio::test]
async fn test_quote_unknown_or_inactive_type() {
    for id in ["keynote", "poster-inperson"] {
        let app = test_app(store(), datetime!(2025-04-15 0:00 UTC));
        let (status, _) = get_json(
            app,
            &format!("/api/registration/quote?registrationTypeId={}&currency=USD", id),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_quote_rejects_unsupported_currency() {
    for currency in ["INR", "JPY"] {
        let app = test_app(store(), datetime!(2025-04-15 0:00 UTC));
        let (status, body) = get_json(
            app,
            &format!(
                "/api/registration/quote?registrationTypeId=speaker-inperson&currency={}",
                currency
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains(currency));
    }
}

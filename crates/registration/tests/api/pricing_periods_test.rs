use axum::http::StatusCode;
use registration::InMemoryStore;
use registration_core::PricingDates;
use time::macros::datetime;

use crate::helpers::{conference_dates, get_json, test_app};

const PRICING_PERIODS: &str = "/api/registration/pricing-periods";

#[tokio::test]
async fn test_report_marks_current_period() {
    let store = InMemoryStore::new().with_pricing_dates(conference_dates());

    let (status, body) = get_json(test_app(store, datetime!(2025-04-15 0:00 UTC)), PRICING_PERIODS).await;

    assert_eq!(status, StatusCode::OK);
    let current: Vec<(&str, bool)> = body["periods"]
        .as_array()
        .unwrap()
        .iter()
        .map(|period| {
            (
                period["periodId"].as_str().unwrap(),
                period["isCurrentPeriod"].as_bool().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        current,
        vec![
            ("earlyBird", false),
            ("nextRound", true),
            ("spotRegistration", false)
        ]
    );
    assert_eq!(body["detection"]["nextPeriod"]["periodId"], "spotRegistration");
    assert_eq!(body["detection"]["previousPeriod"]["periodId"], "earlyBird");
    assert_eq!(body["detection"]["isInTransitionPeriod"], false);
    assert_eq!(body["statusMessage"], "Mid Term Registration is currently active");
    assert_eq!(body["issues"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_report_after_close() {
    let store = InMemoryStore::new().with_pricing_dates(conference_dates());

    let (status, body) = get_json(test_app(store, datetime!(2025-09-01 0:00 UTC)), PRICING_PERIODS).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["activePeriod"].is_null());
    assert_eq!(
        body["statusMessage"],
        "Registration period has ended (last period: Onspot Registration)"
    );
}

#[tokio::test]
async fn test_report_lists_overlap_and_gap() {
    let store = InMemoryStore::new().with_pricing_dates(PricingDates {
        next_round_start: Some(String::from("2025-02-20")),
        spot_registration_start: Some(String::from("2025-06-10")),
        ..conference_dates()
    });

    let (status, body) = get_json(test_app(store, datetime!(2025-02-25 0:00 UTC)), PRICING_PERIODS).await;

    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<&str> = body["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|issue| issue["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["overlap", "gap"]);
    // Overlaps resolve to the earlier period
    assert_eq!(body["activePeriod"]["periodId"], "earlyBird");
}

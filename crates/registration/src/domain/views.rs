use registration_core::{
    format_amount, lookup_price, Currency, CurrencyInfo, CurrencySet, EffectivePrice, PeriodDetection,
    PeriodId, PeriodIssue, PricingPeriod, RegistrationType,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use time::OffsetDateTime;

use super::{AccommodationOptionDocument, Hotel, RoomOption, SponsorshipTierDocument};

/// Body of `GET /api/registration/dynamic-config`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicConfig {
    pub registration_types: Vec<RegistrationTypeView>,
    pub pricing_periods: Vec<PricingPeriod>,
    pub active_period: Option<PricingPeriod>,
    pub pricing_table: Vec<EffectivePrice>,
    pub currencies: Vec<CurrencyInfo>,
    pub sponsorship_tiers: Vec<Priced<SponsorshipTierDocument>>,
    pub accommodation_options: Vec<AccommodationView>,
    #[serde(with = "time::serde::rfc3339")]
    pub current_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_fetched: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationTypeView {
    #[serde(flatten)]
    pub registration_type: RegistrationType,
    pub pricing_by_period: BTreeMap<PeriodId, PeriodPricing>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodPricing {
    pub prices: BTreeMap<Currency, Decimal>,
    /// Currencies whose price is a zero fallback rather than configured
    pub defaulted: Vec<Currency>,
    pub period: PricingPeriod,
}

impl RegistrationTypeView {
    pub fn new(
        registration_type: RegistrationType,
        periods: &[PricingPeriod],
        currencies: &CurrencySet,
    ) -> Self {
        let pricing_by_period = periods
            .iter()
            .map(|period| {
                let mut prices = BTreeMap::new();
                let mut defaulted = vec![];
                for currency in currencies.iter() {
                    let price = lookup_price(&registration_type, currency, period);
                    if price.defaulted {
                        defaulted.push(currency);
                    }
                    prices.insert(currency, price.amount);
                }
                (
                    period.period_id,
                    PeriodPricing {
                        prices,
                        defaulted,
                        period: period.clone(),
                    },
                )
            })
            .collect();

        Self {
            registration_type,
            pricing_by_period,
        }
    }
}

/// A document with its prices regrouped for the configured currencies
#[derive(Debug, Clone, Serialize)]
pub struct Priced<T> {
    #[serde(flatten)]
    pub document: T,
    pub prices: BTreeMap<Currency, Decimal>,
}

impl Priced<SponsorshipTierDocument> {
    pub fn sponsorship(document: SponsorshipTierDocument, currencies: &CurrencySet) -> Self {
        let prices = document.prices(currencies);
        Self { document, prices }
    }
}

impl Priced<RoomOption> {
    pub fn room(document: RoomOption, currencies: &CurrencySet) -> Self {
        let prices = document.prices(currencies);
        Self { document, prices }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccommodationView {
    #[serde(flatten)]
    pub hotel: Hotel,
    pub room_options: Vec<Priced<RoomOption>>,
}

impl AccommodationView {
    pub fn new(document: AccommodationOptionDocument, currencies: &CurrencySet) -> Self {
        Self {
            hotel: document.hotel,
            room_options: document
                .room_options
                .unwrap_or_default()
                .into_iter()
                .map(|room| Priced::room(room, currencies))
                .collect(),
        }
    }
}

/// Body of `GET /api/registration/pricing-periods`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPeriodsReport {
    pub periods: Vec<PeriodStatus>,
    pub active_period: Option<PricingPeriod>,
    pub detection: PeriodDetection,
    pub status_message: String,
    pub issues: Vec<PeriodIssue>,
    #[serde(with = "time::serde::rfc3339")]
    pub current_date: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStatus {
    #[serde(flatten)]
    pub period: PricingPeriod,
    pub is_current_period: bool,
}

/// Body of `GET /api/registration/quote`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(flatten)]
    pub price: EffectivePrice,
    pub formatted: String,
    pub period: PricingPeriod,
}

impl Quote {
    pub fn new(price: EffectivePrice, period: PricingPeriod) -> Self {
        Self {
            formatted: format_amount(price.amount, price.currency),
            price,
            period,
        }
    }
}

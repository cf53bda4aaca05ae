//! Shapes of the configuration documents as the store returns them.
//!
//! Every field the CMS lets an administrator leave empty is optional here; the
//! conversions below apply the defaulting rules once, at this boundary.

use log::warn;
use registration_core::{Currency, CurrencySet, PeriodId, PeriodPrices, PricingDates, RegistrationType};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationSettingsDocument {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub pricing_dates: Option<PricingDates>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationTypeDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub early_bird_price: Option<Decimal>,
    #[serde(default, rename = "earlyBirdPriceEUR")]
    pub early_bird_price_eur: Option<Decimal>,
    #[serde(default, rename = "earlyBirdPriceGBP")]
    pub early_bird_price_gbp: Option<Decimal>,
    #[serde(default, rename = "earlyBirdPriceINR")]
    pub early_bird_price_inr: Option<Decimal>,

    #[serde(default)]
    pub next_round_price: Option<Decimal>,
    #[serde(default, rename = "nextRoundPriceEUR")]
    pub next_round_price_eur: Option<Decimal>,
    #[serde(default, rename = "nextRoundPriceGBP")]
    pub next_round_price_gbp: Option<Decimal>,
    #[serde(default, rename = "nextRoundPriceINR")]
    pub next_round_price_inr: Option<Decimal>,

    #[serde(default)]
    pub on_spot_price: Option<Decimal>,
    #[serde(default, rename = "onSpotPriceEUR")]
    pub on_spot_price_eur: Option<Decimal>,
    #[serde(default, rename = "onSpotPriceGBP")]
    pub on_spot_price_gbp: Option<Decimal>,
    #[serde(default, rename = "onSpotPriceINR")]
    pub on_spot_price_inr: Option<Decimal>,

    #[serde(default)]
    pub benefits: Option<Vec<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Numeric in the CMS, so editors can store `2.0` as readily as `2`
    #[serde(default)]
    pub display_order: Option<Decimal>,
    #[serde(default)]
    pub max_participants: Option<Decimal>,
}

impl RegistrationTypeDocument {
    fn display_order(&self) -> i64 {
        match self.display_order.map(|order| order.trunc().to_i64()) {
            Some(Some(order)) => order,
            Some(None) => {
                warn!(
                    "registration type {} has an out of range displayOrder, sorting it last",
                    self.id
                );
                i64::MAX
            }
            None => i64::MAX,
        }
    }

    fn max_participants(&self) -> Option<u32> {
        let limit = self.max_participants?;
        let participants = limit.trunc().to_u32();
        if participants.is_none() {
            warn!(
                "registration type {} has an invalid maxParticipants of {}, ignoring it",
                self.id, limit
            );
        }
        participants
    }

    fn price_cell(&self, period: PeriodId, currency: Currency) -> Option<Decimal> {
        match (period, currency) {
            (PeriodId::EarlyBird, Currency::Usd) => self.early_bird_price,
            (PeriodId::EarlyBird, Currency::Eur) => self.early_bird_price_eur,
            (PeriodId::EarlyBird, Currency::Gbp) => self.early_bird_price_gbp,
            (PeriodId::EarlyBird, Currency::Inr) => self.early_bird_price_inr,
            (PeriodId::NextRound, Currency::Usd) => self.next_round_price,
            (PeriodId::NextRound, Currency::Eur) => self.next_round_price_eur,
            (PeriodId::NextRound, Currency::Gbp) => self.next_round_price_gbp,
            (PeriodId::NextRound, Currency::Inr) => self.next_round_price_inr,
            (PeriodId::SpotRegistration, Currency::Usd) => self.on_spot_price,
            (PeriodId::SpotRegistration, Currency::Eur) => self.on_spot_price_eur,
            (PeriodId::SpotRegistration, Currency::Gbp) => self.on_spot_price_gbp,
            (PeriodId::SpotRegistration, Currency::Inr) => self.on_spot_price_inr,
        }
    }

    /// Regroups the flat price fields by period and currency.
    ///
    /// Negative prices are dropped so they fall back to zero like missing ones.
    pub fn into_registration_type(self) -> RegistrationType {
        let mut per_period_price = PeriodPrices::new();
        for period in PeriodId::ALL {
            let mut prices = BTreeMap::new();
            for currency in Currency::ALL {
                match self.price_cell(period, currency) {
                    Some(amount) if amount.is_sign_negative() => warn!(
                        "registration type {} has a negative {}{} of {}, ignoring it",
                        self.id,
                        period.price_field(),
                        currency.field_suffix(),
                        amount
                    ),
                    Some(amount) => {
                        prices.insert(currency, amount);
                    }
                    None => {}
                }
            }
            if !prices.is_empty() {
                per_period_price.insert(period, prices);
            }
        }

        let display_order = self.display_order();
        let max_participants = self.max_participants();
        RegistrationType {
            id: self.id,
            name: self.name,
            category: self.category.unwrap_or_default(),
            description: self.description,
            per_period_price,
            benefits: self.benefits.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(false),
            display_order,
            max_participants,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorshipBenefit {
    pub benefit: String,
    #[serde(default)]
    pub highlighted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorshipTierDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default, rename = "priceEUR")]
    pub price_eur: Option<Decimal>,
    #[serde(default, rename = "priceGBP")]
    pub price_gbp: Option<Decimal>,
    #[serde(default, rename = "priceINR")]
    pub price_inr: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub benefits: Option<Vec<SponsorshipBenefit>>,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl SponsorshipTierDocument {
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(false)
    }

    pub fn prices(&self, currencies: &CurrencySet) -> BTreeMap<Currency, Decimal> {
        priced(currencies, |currency| match currency {
            Currency::Usd => self.price,
            Currency::Eur => self.price_eur,
            Currency::Gbp => self.price_gbp,
            Currency::Inr => self.price_inr,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOption {
    pub room_type: String,
    #[serde(default)]
    pub price_per_night: Option<Decimal>,
    #[serde(default, rename = "pricePerNightEUR")]
    pub price_per_night_eur: Option<Decimal>,
    #[serde(default, rename = "pricePerNightGBP")]
    pub price_per_night_gbp: Option<Decimal>,
    #[serde(default, rename = "pricePerNightINR")]
    pub price_per_night_inr: Option<Decimal>,
    #[serde(default)]
    pub room_description: Option<String>,
    #[serde(default)]
    pub max_guests: Option<u32>,
    #[serde(default)]
    pub is_available: Option<bool>,
}

impl RoomOption {
    pub fn prices(&self, currencies: &CurrencySet) -> BTreeMap<Currency, Decimal> {
        priced(currencies, |currency| match currency {
            Currency::Usd => self.price_per_night,
            Currency::Eur => self.price_per_night_eur,
            Currency::Gbp => self.price_per_night_gbp,
            Currency::Inr => self.price_per_night_inr,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageOption {
    pub package_name: String,
    #[serde(default)]
    pub nights: Option<u32>,
    #[serde(default)]
    pub check_in_date: Option<String>,
    #[serde(default)]
    pub check_out_date: Option<String>,
    #[serde(default)]
    pub inclusions: Option<Vec<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Everything about a hotel except its rooms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    #[serde(rename = "_id")]
    pub id: String,
    pub hotel_name: String,
    #[serde(default)]
    pub hotel_category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub package_options: Option<Vec<PackageOption>>,
    #[serde(default)]
    pub location: Option<serde_json::Value>,
    #[serde(default)]
    pub amenities: Option<Vec<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub display_order: Option<i64>,
    #[serde(default)]
    pub max_rooms: Option<u32>,
    #[serde(default)]
    pub current_bookings: Option<u32>,
    #[serde(default)]
    pub available_from: Option<String>,
    #[serde(default)]
    pub available_until: Option<String>,
    #[serde(default)]
    pub images: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccommodationOptionDocument {
    #[serde(flatten)]
    pub hotel: Hotel,
    #[serde(default)]
    pub room_options: Option<Vec<RoomOption>>,
}

impl AccommodationOptionDocument {
    pub fn is_active(&self) -> bool {
        self.hotel.is_active.unwrap_or(false)
    }
}

/// Prices present for the configured currencies; absent ones are left out
/// rather than shown as zero.
fn priced(
    currencies: &CurrencySet,
    price: impl Fn(Currency) -> Option<Decimal>,
) -> BTreeMap<Currency, Decimal> {
    currencies
        .iter()
        .filter_map(|currency| price(currency).map(|amount| (currency, amount)))
        .collect()
}

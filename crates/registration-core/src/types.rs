//! Pricing types shared between the resolver and the registration service

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use time::OffsetDateTime;

use crate::Currency;

/// The three pricing windows, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PeriodId {
    EarlyBird,
    NextRound,
    SpotRegistration,
}

impl PeriodId {
    pub const ALL: [PeriodId; 3] = [
        PeriodId::EarlyBird,
        PeriodId::NextRound,
        PeriodId::SpotRegistration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EarlyBird => "earlyBird",
            Self::NextRound => "nextRound",
            Self::SpotRegistration => "spotRegistration",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::EarlyBird => "Early Bird Registration",
            Self::NextRound => "Mid Term Registration",
            Self::SpotRegistration => "Onspot Registration",
        }
    }

    pub fn display_order(&self) -> u32 {
        match self {
            Self::EarlyBird => 1,
            Self::NextRound => 2,
            Self::SpotRegistration => 3,
        }
    }

    /// Prefix of the flat price fields on registration type documents
    pub fn price_field(&self) -> &'static str {
        match self {
            Self::EarlyBird => "earlyBirdPrice",
            Self::NextRound => "nextRoundPrice",
            Self::SpotRegistration => "onSpotPrice",
        }
    }
}

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boundary dates exactly as an administrator stores them.
///
/// Each value is either a calendar date (`2025-03-01`) or an RFC 3339 timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingDates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_bird_start: Option<String>,
    #[serde(default)]
    pub early_bird_end: Option<String>,
    #[serde(default)]
    pub next_round_start: Option<String>,
    #[serde(default)]
    pub next_round_end: Option<String>,
    #[serde(default)]
    pub spot_registration_start: Option<String>,
    #[serde(default)]
    pub registration_close_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPeriod {
    pub period_id: PeriodId,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    /// Inclusive
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    pub is_active: bool,
    pub display_order: u32,
}

impl PricingPeriod {
    pub fn new(period_id: PeriodId, start_date: OffsetDateTime, end_date: OffsetDateTime) -> Self {
        Self {
            period_id,
            title: period_id.title().to_string(),
            start_date,
            end_date,
            is_active: true,
            display_order: period_id.display_order(),
        }
    }

    pub fn contains(&self, now: OffsetDateTime) -> bool {
        self.is_active && self.start_date <= now && now <= self.end_date
    }
}

/// Per period, per currency price grid of one registration type
pub type PeriodPrices = BTreeMap<PeriodId, BTreeMap<Currency, Decimal>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationType {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub per_period_price: PeriodPrices,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub is_active: bool,
    pub display_order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
}

impl RegistrationType {
    pub fn price(&self, period: PeriodId, currency: Currency) -> Option<Decimal> {
        self.per_period_price
            .get(&period)
            .and_then(|prices| prices.get(&currency))
            .copied()
    }
}

/// Price of one (registration type, currency) pair under the active period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectivePrice {
    pub registration_type_id: String,
    pub currency: Currency,
    pub period_id: PeriodId,
    pub amount: Decimal,
    /// Set when no price was configured and the amount fell back to zero
    pub defaulted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTable {
    pub active_period: Option<PricingPeriod>,
    pub table: Vec<EffectivePrice>,
}

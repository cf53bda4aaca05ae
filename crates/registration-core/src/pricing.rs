//! Projecting registration type prices onto the active pricing period

use itertools::Itertools;
use log::warn;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    resolve_active_period, Currency, CurrencySet, EffectivePrice, PricingPeriod, PricingTable,
    RegistrationType,
};

/// Looks up the price of `registration_type` in `currency` for `active_period`.
///
/// A missing cell is a data-quality problem, not a failure: the amount falls back
/// to zero, `defaulted` is set and a warning is logged.
pub fn price_for(
    registration_type: &RegistrationType,
    currency: Currency,
    active_period: &PricingPeriod,
) -> EffectivePrice {
    let price = lookup_price(registration_type, currency, active_period);
    if price.defaulted {
        warn!(
            "registration type {} ({}) has no {} price for {}, defaulting to 0",
            registration_type.id, registration_type.name, currency, price.period_id
        );
    }
    price
}

/// Same projection as [`price_for`] without the data-quality warning
pub fn lookup_price(
    registration_type: &RegistrationType,
    currency: Currency,
    period: &PricingPeriod,
) -> EffectivePrice {
    let period_id = period.period_id;
    let (amount, defaulted) = match registration_type.price(period_id, currency) {
        Some(amount) => (amount, false),
        None => (Decimal::ZERO, true),
    };

    EffectivePrice {
        registration_type_id: registration_type.id.clone(),
        currency,
        period_id,
        amount,
        defaulted,
    }
}

/// Active registration types by display order, ties broken by id
pub fn active_registration_types(registration_types: &[RegistrationType]) -> Vec<&RegistrationType> {
    registration_types
        .iter()
        .filter(|registration_type| registration_type.is_active)
        .sorted_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.id.cmp(&b.id))
        })
        .collect()
}

pub fn build_pricing_table(
    registration_types: &[RegistrationType],
    periods: &[PricingPeriod],
    now: OffsetDateTime,
    currencies: &CurrencySet,
) -> PricingTable {
    let Some(active_period) = resolve_active_period(periods, now) else {
        return PricingTable {
            active_period: None,
            table: vec![],
        };
    };

    let table = active_registration_types(registration_types)
        .into_iter()
        .flat_map(|registration_type| {
            currencies
                .iter()
                .map(move |currency| price_for(registration_type, currency, active_period))
        })
        .collect();

    PricingTable {
        active_period: Some(active_period.clone()),
        table,
    }
}

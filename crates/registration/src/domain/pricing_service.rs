use futures::try_join;
use log::{debug, error, info, warn};
use registration_core::{
    active_registration_types, build_pricing_table, derive_periods, detect_period, price_for,
    resolve_active_period, validate_periods, ConfigurationError, Currency, CurrencySet,
    PricingDates, PricingPeriod, RegistrationType,
};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};

use super::{
    AccommodationView, DynamicConfig, Error, PeriodStatus, Priced, PricingPeriodsReport, Quote,
    RegistrationTypeView,
};
use crate::infra::store::ConfigStore;

pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

/// Assembles registration pricing from the documents in the store.
///
/// Nothing is cached: every call reads the store and evaluates the periods
/// against the clock, so edits in the CMS take effect on the next request.
#[derive(Clone)]
pub struct PricingService {
    store: Arc<dyn ConfigStore>,
    currencies: CurrencySet,
    transition_threshold: Duration,
    clock: Clock,
}

impl PricingService {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        currencies: CurrencySet,
        transition_threshold: Duration,
    ) -> Self {
        Self {
            store,
            currencies,
            transition_threshold,
            clock: Arc::new(OffsetDateTime::now_utc),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub async fn ping(&self) -> Result<(), Error> {
        self.store.ping().await.map_err(Error::from)
    }

    pub async fn dynamic_config(&self) -> Result<DynamicConfig, Error> {
        let now = (self.clock)();
        let (settings, registration_types, sponsorship_tiers, accommodation_options) = try_join!(
            self.store.registration_settings(),
            self.store.registration_types(),
            self.store.sponsorship_tiers(),
            self.store.accommodation_options(),
        )?;

        let periods = self.periods(settings.and_then(|settings| settings.pricing_dates))?;
        let registration_types: Vec<RegistrationType> = registration_types
            .into_iter()
            .map(|document| document.into_registration_type())
            .collect();

        let table = build_pricing_table(&registration_types, &periods, now, &self.currencies);
        match &table.active_period {
            Some(period) => debug!("active pricing period at {}: {}", now, period.period_id),
            None => info!("no active pricing period at {}, registration closed", now),
        }

        let registration_types = active_registration_types(&registration_types)
            .into_iter()
            .cloned()
            .map(|registration_type| {
                RegistrationTypeView::new(registration_type, &periods, &self.currencies)
            })
            .collect();

        let sponsorship_tiers = sponsorship_tiers
            .into_iter()
            .filter(|tier| tier.is_active())
            .map(|tier| Priced::sponsorship(tier, &self.currencies))
            .collect();

        let accommodation_options = accommodation_options
            .into_iter()
            .filter(|option| option.is_active())
            .map(|option| AccommodationView::new(option, &self.currencies))
            .collect();

        Ok(DynamicConfig {
            registration_types,
            pricing_periods: periods.to_vec(),
            active_period: table.active_period,
            pricing_table: table.table,
            currencies: self.currencies.infos(),
            sponsorship_tiers,
            accommodation_options,
            current_date: now,
            last_fetched: OffsetDateTime::now_utc(),
        })
    }

    pub async fn pricing_periods(&self) -> Result<PricingPeriodsReport, Error> {
        let now = (self.clock)();
        let settings = self.store.registration_settings().await?;
        let periods = self.periods(settings.and_then(|settings| settings.pricing_dates))?;

        let detection = detect_period(&periods, now, self.transition_threshold);
        let active_id = detection
            .active_period
            .as_ref()
            .map(|period| period.period_id);

        Ok(PricingPeriodsReport {
            periods: periods
                .iter()
                .map(|period| PeriodStatus {
                    period: period.clone(),
                    is_current_period: Some(period.period_id) == active_id,
                })
                .collect(),
            active_period: detection.active_period.clone(),
            status_message: detection.status_message(),
            issues: validate_periods(&periods),
            detection,
            current_date: now,
        })
    }

    /// The price to charge for `registration_type_id` in `currency` right now.
    ///
    /// Unlike the pricing table, a missing price is an error here so a zero
    /// fallback never reaches an order.
    pub async fn quote(&self, registration_type_id: &str, currency: &str) -> Result<Quote, Error> {
        let currency = Currency::try_from(currency).map_err(Error::BadRequest)?;
        if !self.currencies.contains(currency) {
            return Err(Error::BadRequest(format!(
                "currency {} is not accepted for registration",
                currency
            )));
        }

        let now = (self.clock)();
        let (settings, registration_types) = try_join!(
            self.store.registration_settings(),
            self.store.registration_types(),
        )?;
        let periods = self.periods(settings.and_then(|settings| settings.pricing_dates))?;

        let active_period = resolve_active_period(&periods, now).ok_or(Error::RegistrationClosed)?;

        let registration_type = registration_types
            .into_iter()
            .map(|document| document.into_registration_type())
            .find(|registration_type| {
                registration_type.is_active && registration_type.id == registration_type_id
            })
            .ok_or_else(|| {
                Error::NotFound(format!("registration type {}", registration_type_id))
            })?;

        let price = price_for(&registration_type, currency, active_period);
        if price.defaulted {
            return Err(Error::PriceUnavailable {
                registration_type_id: price.registration_type_id,
                currency,
                period: price.period_id,
            });
        }

        Ok(Quote::new(price, active_period.clone()))
    }

    fn periods(&self, dates: Option<PricingDates>) -> Result<[PricingPeriod; 3], Error> {
        let dates = dates.ok_or(ConfigurationError::MissingField("pricingDates"))?;
        let periods = derive_periods(&dates).map_err(|e| {
            error!("failed to derive pricing periods: {}", e);
            e
        })?;

        for issue in validate_periods(&periods) {
            if issue.is_error() {
                error!("pricing configuration: {}", issue);
            } else {
                warn!("pricing configuration: {}", issue);
            }
        }

        Ok(periods)
    }
}

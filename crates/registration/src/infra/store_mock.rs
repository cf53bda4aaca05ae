use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use log::info;
use registration_core::PricingDates;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use super::store::{ConfigStore, Error};
use crate::domain::{
    AccommodationOptionDocument, Hotel, RegistrationSettingsDocument, RegistrationTypeDocument,
    RoomOption, SponsorshipTierDocument,
};

#[derive(Debug, Clone, Default)]
struct Documents {
    settings: Option<RegistrationSettingsDocument>,
    registration_types: Vec<RegistrationTypeDocument>,
    sponsorship_tiers: Vec<SponsorshipTierDocument>,
    accommodation_options: Vec<AccommodationOptionDocument>,
}

/// Document store held in process memory
#[derive(Clone, Default)]
pub struct InMemoryStore {
    documents: Arc<RwLock<Documents>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pricing_dates(self, dates: PricingDates) -> Self {
        self.set_pricing_dates(Some(dates));
        self
    }

    pub fn with_registration_types(self, types: Vec<RegistrationTypeDocument>) -> Self {
        self.write(|documents| documents.registration_types = types);
        self
    }

    pub fn with_sponsorship_tiers(self, tiers: Vec<SponsorshipTierDocument>) -> Self {
        self.write(|documents| documents.sponsorship_tiers = tiers);
        self
    }

    pub fn with_accommodation_options(self, options: Vec<AccommodationOptionDocument>) -> Self {
        self.write(|documents| documents.accommodation_options = options);
        self
    }

    /// `None` leaves the settings document in place without any pricing dates
    pub fn set_pricing_dates(&self, dates: Option<PricingDates>) {
        self.write(|documents| {
            documents.settings = Some(RegistrationSettingsDocument {
                id: Some(String::from("registrationSettings")),
                pricing_dates: dates,
            })
        });
    }

    pub fn upsert_registration_type(&self, registration_type: RegistrationTypeDocument) {
        self.write(|documents| {
            documents
                .registration_types
                .retain(|existing| existing.id != registration_type.id);
            documents.registration_types.push(registration_type);
        });
    }

    /// A small conference whose early bird period runs for the next month,
    /// so a local instance always has something to price.
    pub fn demo(now: OffsetDateTime) -> Self {
        let today = now.date();
        let day = |offset: i64| (today + Duration::days(offset)).to_string();
        info!("seeding in-memory store with demo documents around {}", today);

        Self::new()
            .with_pricing_dates(PricingDates {
                early_bird_start: Some(day(-30)),
                early_bird_end: Some(day(30)),
                next_round_start: Some(day(31)),
                next_round_end: Some(day(90)),
                spot_registration_start: Some(day(91)),
                registration_close_date: Some(day(120)),
            })
            .with_registration_types(vec![
                demo_type("speaker-inperson", "Speaker (In-Person)", 1, [299, 349, 399]),
                demo_type("listener-inperson", "Listener (In-Person)", 2, [249, 299, 349]),
                demo_type("student-virtual", "Student (Virtual)", 3, [99, 149, 199]),
            ])
            .with_sponsorship_tiers(vec![SponsorshipTierDocument {
                id: String::from("gold"),
                name: String::from("Gold"),
                price: Some(Decimal::from(5000)),
                price_eur: Some(Decimal::from(4600)),
                price_gbp: Some(Decimal::from(3900)),
                active: Some(true),
                order: Some(1),
                ..SponsorshipTierDocument::default()
            }])
            .with_accommodation_options(vec![AccommodationOptionDocument {
                hotel: Hotel {
                    id: String::from("conference-hotel"),
                    hotel_name: String::from("Conference Hotel"),
                    is_active: Some(true),
                    display_order: Some(1),
                    ..Hotel::default()
                },
                room_options: Some(vec![RoomOption {
                    room_type: String::from("Single"),
                    price_per_night: Some(Decimal::from(120)),
                    price_per_night_eur: Some(Decimal::from(110)),
                    price_per_night_gbp: Some(Decimal::from(95)),
                    max_guests: Some(1),
                    is_available: Some(true),
                    ..RoomOption::default()
                }]),
            }])
    }

    fn write(&self, update: impl FnOnce(&mut Documents)) {
        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        update(&mut documents);
    }

    fn read<T>(&self, view: impl FnOnce(&Documents) -> T) -> T {
        let documents = self
            .documents
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        view(&documents)
    }
}

fn demo_type(id: &str, name: &str, order: i64, [early, next, spot]: [i64; 3]) -> RegistrationTypeDocument {
    let usd = |amount: i64| Some(Decimal::from(amount));
    // EUR and GBP track USD at a fixed discount, good enough for demo data
    let eur = |amount: i64| Some(Decimal::from(amount - 20));
    let gbp = |amount: i64| Some(Decimal::from(amount - 60));

    RegistrationTypeDocument {
        id: id.to_string(),
        name: name.to_string(),
        category: Some(id.to_string()),
        early_bird_price: usd(early),
        early_bird_price_eur: eur(early),
        early_bird_price_gbp: gbp(early),
        next_round_price: usd(next),
        next_round_price_eur: eur(next),
        next_round_price_gbp: gbp(next),
        on_spot_price: usd(spot),
        on_spot_price_eur: eur(spot),
        on_spot_price_gbp: gbp(spot),
        is_active: Some(true),
        display_order: Some(Decimal::from(order)),
        ..RegistrationTypeDocument::default()
    }
}

#[async_trait]
impl ConfigStore for InMemoryStore {
    async fn registration_settings(&self) -> Result<Option<RegistrationSettingsDocument>, Error> {
        Ok(self.read(|documents| documents.settings.clone()))
    }

    async fn registration_types(&self) -> Result<Vec<RegistrationTypeDocument>, Error> {
        Ok(self.read(|documents| documents.registration_types.clone()))
    }

    async fn sponsorship_tiers(&self) -> Result<Vec<SponsorshipTierDocument>, Error> {
        Ok(self.read(|documents| documents.sponsorship_tiers.clone()))
    }

    async fn accommodation_options(&self) -> Result<Vec<AccommodationOptionDocument>, Error> {
        Ok(self.read(|documents| documents.accommodation_options.clone()))
    }

    async fn ping(&self) -> Result<(), Error> {
        Ok(())
    }
}

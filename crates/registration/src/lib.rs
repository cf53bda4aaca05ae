pub mod api;
pub mod config;
pub mod domain;
pub mod infra;
pub mod startup;

pub use api::routes::*;
pub use config::*;
pub use domain::{
    Clock, DynamicConfig, Error as RegistrationError, PricingPeriodsReport, PricingService, Quote,
};
pub use infra::secrets::read_token;
pub use infra::store::{ConfigStore, Error as StoreError, SanityClient};
#[cfg(any(feature = "e2e-testing", debug_assertions))]
pub use infra::store_mock::InMemoryStore;
pub use startup::*;

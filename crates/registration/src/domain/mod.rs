mod documents;
mod pricing_service;
mod views;

pub use documents::*;
pub use pricing_service::*;
pub use views::*;

use registration_core::{ConfigurationError, Currency, PeriodId};
use thiserror::Error;

use crate::infra::store::Error as StoreError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("item not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid registration configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("registration currently unavailable")]
    RegistrationClosed,
    #[error("no {currency} price configured for {registration_type_id} during {period}")]
    PriceUnavailable {
        registration_type_id: String,
        currency: Currency,
        period: PeriodId,
    },
}

//! Configuration errors raised while deriving pricing periods

use thiserror::Error;

use crate::PeriodId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("missing pricing configuration field: {0}")]
    MissingField(&'static str),

    #[error("invalid date in {field}: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("pricing period {0} ends before it starts")]
    InvertedWindow(PeriodId),
}

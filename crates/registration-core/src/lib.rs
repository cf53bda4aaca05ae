//! registration-core: pricing period resolution for conference registration
//!
//! Everything in this crate is a pure function of already-fetched configuration
//! and the current time. The service crate owns all I/O.

pub mod currency;
pub mod errors;
pub mod periods;
pub mod pricing;
pub mod types;
pub mod validation;

pub use currency::*;
pub use errors::*;
pub use periods::*;
pub use pricing::*;
pub use types::*;
pub use validation::*;

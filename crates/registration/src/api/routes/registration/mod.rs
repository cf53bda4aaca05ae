mod registration_routes;

pub use registration_routes::*;

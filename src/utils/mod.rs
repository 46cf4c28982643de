pub mod error;
pub mod logger;
pub mod maps_url;
pub mod monitor;
pub mod validation;

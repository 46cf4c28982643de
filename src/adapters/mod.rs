// Adapters layer: concrete implementations for external systems.

pub mod google_places;
pub mod storage;

pub use google_places::GooglePlacesClient;
pub use storage::LocalStorage;

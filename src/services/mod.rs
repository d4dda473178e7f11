// Service exports
pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::InMemoryTripStore;
pub use postgres::PostgresTripStore;
pub use store::{StoreError, TripStore};

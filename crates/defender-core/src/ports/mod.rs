//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod clock;
mod counter_store;
mod listing;
mod repository;

pub use auth::{ApiTokenResolver, AuthError};
pub use clock::Clock;
pub use counter_store::{CounterStore, CounterStoreError};
pub use listing::{FetchError, ListingFetcher, ListingFilter, ListingPage};
pub use repository::OrganizationRepository;

//! Destination actions: adapters that turn platform events into vendor API
//! calls (Algolia Insights, Iterable commerce).

pub mod algolia_insights;
pub mod iterable;
pub mod mapping;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use iterable::track_purchase;

//! Iterable destination.

pub mod shared_fields;
pub mod track_purchase;
pub mod utils;

pub use shared_fields::{Categories, CommerceItem};
pub use track_purchase::{
    PurchaseUser, TrackPurchasePayload, TrackPurchaseRequest, TRACK_PURCHASE_URL,
};
pub use utils::DateValue;

/// Header carrying the project API key on every Iterable request.
pub const API_KEY_HEADER: &str = "Api-Key";

mod currency;
mod listing;

pub use currency::Currency;
pub use listing::{AssetRecord, Listing};

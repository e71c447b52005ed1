pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod models;
pub mod paths;
pub mod presenter;
mod serde_utils;

pub mod prelude {
    pub use crate::api::ListingsRequest;
    pub use crate::client::CoinMarketCap;
    pub use crate::error::ClientError;
    pub use crate::models::{AssetRecord, Currency, Listing};
    pub use crate::presenter::{render, render_table};
}

pub mod listings;

pub use listings::{ListingsRequest, DEFAULT_LIMIT, MAX_LIMIT};

pub const BASE_URL: &str = "https://pro-api.coinmarketcap.com";
pub const LISTINGS_LATEST: &str = "/v1/cryptocurrency/listings/latest";
pub const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";
pub const API_KEY_ENV: &str = "COINMARKETCAP_API_KEY";

use std::collections::HashMap;

use bon::Builder;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::{
    client::CoinMarketCap,
    error::{ApiStatus, ClientError, DataError},
    http::{HttpClient, HttpRequest},
    models::{AssetRecord, Currency, Listing},
    paths,
    serde_utils::{decimal_from_string_or_number, opt_decimal_from_string_or_number},
};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 5000;

/// Parameters of a latest-listings call.
#[derive(Debug, Clone, Builder)]
pub struct ListingsRequest {
    #[builder(default = DEFAULT_LIMIT)]
    pub limit: i64,
    #[builder(into, default = "USD".to_string())]
    pub convert: String,
    #[builder(default = 1)]
    pub start: i64,
}

impl Default for ListingsRequest {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ListingsRequest {
    fn validate(&self) -> Result<(u32, u32, Currency), ClientError> {
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(ClientError::invalid_request(format!(
                "limit must be between 1 and {MAX_LIMIT}, got {}",
                self.limit
            )));
        }
        let start = u32::try_from(self.start)
            .ok()
            .filter(|s| *s >= 1)
            .ok_or_else(|| {
                ClientError::invalid_request(format!("start must be at least 1, got {}", self.start))
            })?;
        let currency = Currency::new(&self.convert)?;
        Ok((self.limit as u32, start, currency))
    }
}

#[derive(Debug, Deserialize)]
struct ListingsEnvelope {
    #[serde(default)]
    status: ApiStatus,
    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct RawAsset {
    id: u64,
    name: String,
    symbol: String,
    cmc_rank: u32,
    #[serde(deserialize_with = "opt_decimal_from_string_or_number")]
    circulating_supply: Option<Decimal>,
    quote: HashMap<String, RawQuote>,
}

#[derive(Debug, Deserialize)]
struct RawQuote {
    #[serde(deserialize_with = "decimal_from_string_or_number")]
    price: Decimal,
    #[serde(deserialize_with = "opt_decimal_from_string_or_number")]
    market_cap: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal_from_string_or_number")]
    volume_24h: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal_from_string_or_number")]
    percent_change_1h: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal_from_string_or_number")]
    percent_change_24h: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal_from_string_or_number")]
    percent_change_7d: Option<Decimal>,
}

/// Flatten the raw `data` array into records sharing one timestamp.
///
/// Any record that does not parse fails the whole listing.
fn assets_to_listing(
    data: Vec<serde_json::Value>,
    currency: Currency,
    limit: u32,
    fetched_at: DateTime<Utc>,
) -> Result<Listing, DataError> {
    if data.len() > limit as usize {
        return Err(DataError::invalid_value(
            "data",
            format!("{} records returned for limit {limit}", data.len()),
        ));
    }

    let records = data
        .into_iter()
        .enumerate()
        .map(|(i, value)| -> Result<AssetRecord, DataError> {
            let asset = serde_json::from_value::<RawAsset>(value)
                .map_err(|e| DataError::parse_error("asset", format!("data[{i}]: {e}")))?;
            let RawAsset {
                id,
                name,
                symbol,
                cmc_rank,
                circulating_supply,
                mut quote,
            } = asset;
            let q = quote
                .remove(currency.code())
                .ok_or_else(|| DataError::missing_field(format!("data[{i}].quote.{currency}")))?;

            Ok(AssetRecord {
                id,
                rank: cmc_rank,
                name,
                symbol,
                price: q.price,
                market_cap: q.market_cap,
                volume_24h: q.volume_24h,
                percent_change_1h: q.percent_change_1h,
                percent_change_24h: q.percent_change_24h,
                percent_change_7d: q.percent_change_7d,
                circulating_supply,
                fetched_at,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Listing::new(currency, fetched_at, records))
}

impl CoinMarketCap {
    /// Fetch the latest listings ranked by market cap.
    ///
    /// Validates the request before touching the network, then performs
    /// exactly one GET. The call counts as successful only once the listing
    /// has been built.
    #[instrument(skip(self), fields(limit = request.limit, convert = %request.convert))]
    pub async fn latest_listings(&self, request: &ListingsRequest) -> Result<Listing, ClientError> {
        let (limit, start, currency) = request.validate()?;

        let outcome = self.fetch_listing(limit, start, currency).await;
        self.record_outcome(&outcome);
        outcome
    }

    async fn fetch_listing(
        &self,
        limit: u32,
        start: u32,
        currency: Currency,
    ) -> Result<Listing, ClientError> {
        let envelope = self
            .request::<ListingsEnvelope>(
                HttpRequest::get(paths::LISTINGS_LATEST)
                    .query("start", start)
                    .query("limit", limit)
                    .query("convert", currency.code()),
            )
            .await?;
        let fetched_at = Utc::now();

        if !envelope.status.is_ok() {
            return Err(ClientError::from_api_status(&envelope.status));
        }

        let credits = envelope.status.credit_count;
        let data = envelope
            .data
            .ok_or_else(|| DataError::missing_field("data"))?;
        let listing = assets_to_listing(data, currency, limit, fetched_at)?;
        if listing.len() < limit as usize {
            debug!(
                "API returned {} records, fewer than the requested {}",
                listing.len(),
                limit
            );
        }
        info!(
            records = listing.len(),
            credits = ?credits,
            "Fetched latest listings"
        );
        Ok(listing)
    }
}

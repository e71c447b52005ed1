use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Currency;

/// One asset snapshot, flattened from the upstream record and its quote.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AssetRecord {
    pub id: u64,
    pub rank: u32,
    pub name: String,
    pub symbol: String,
    pub price: Decimal,
    pub market_cap: Option<Decimal>,
    pub volume_24h: Option<Decimal>,
    pub percent_change_1h: Option<Decimal>,
    pub percent_change_24h: Option<Decimal>,
    pub percent_change_7d: Option<Decimal>,
    pub circulating_supply: Option<Decimal>,
    pub fetched_at: DateTime<Utc>,
}

/// Assets returned by a single fetch, in the order the API ranked them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    currency: Currency,
    fetched_at: DateTime<Utc>,
    records: Vec<AssetRecord>,
}

impl Listing {
    pub fn new(currency: Currency, fetched_at: DateTime<Utc>, records: Vec<AssetRecord>) -> Self {
        Self {
            currency,
            fetched_at,
            records,
        }
    }

    /// Currency every price in this listing is quoted in
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Time the response was received, shared by every record
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn records(&self) -> &[AssetRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssetRecord> {
        self.records.iter()
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&AssetRecord> {
        self.records
            .iter()
            .find(|r| r.symbol.eq_ignore_ascii_case(symbol))
    }
}

impl<'a> IntoIterator for &'a Listing {
    type Item = &'a AssetRecord;
    type IntoIter = std::slice::Iter<'a, AssetRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

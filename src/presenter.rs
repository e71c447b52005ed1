//! Console rendering of a [`Listing`].
//!
//! Everything here is a pure function of its input, so rendering the same
//! listing twice yields identical text. Missing (`null`) values render as `N/A`.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use strum::{Display, EnumIter, IntoEnumIterator};
use tabled::{
    builder::Builder,
    settings::{object::Segment, Alignment, Modify, Style},
};

use crate::models::{AssetRecord, Currency, Listing};

const RULE_WIDTH: usize = 100;
const TITLE: &str = "CRYPTOCURRENCY DATA - POWERED BY COINMARKETCAP";
pub const NOT_AVAILABLE: &str = "N/A";

const THOUSAND: Decimal = dec!(1_000);
const MILLION: Decimal = dec!(1_000_000);
const BILLION: Decimal = dec!(1_000_000_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Column {
    Rank,
    Name,
    Symbol,
    Price,
    #[strum(serialize = "Market Cap")]
    MarketCap,
    #[strum(serialize = "Volume (24h)")]
    Volume24h,
    #[strum(serialize = "Change (1h)")]
    Change1h,
    #[strum(serialize = "Change (24h)")]
    Change24h,
    #[strum(serialize = "Change (7d)")]
    Change7d,
    #[strum(serialize = "Circulating Supply")]
    CirculatingSupply,
}

impl Column {
    pub fn cell(self, record: &AssetRecord, currency: &Currency) -> String {
        match self {
            Self::Rank => record.rank.to_string(),
            Self::Name => record.name.clone(),
            Self::Symbol => record.symbol.clone(),
            Self::Price => format_price(record.price, currency),
            Self::MarketCap => format_large_amount(record.market_cap, currency),
            Self::Volume24h => format_large_amount(record.volume_24h, currency),
            Self::Change1h => format_percent(record.percent_change_1h),
            Self::Change24h => format_percent(record.percent_change_24h),
            Self::Change7d => format_percent(record.percent_change_7d),
            Self::CirculatingSupply => format_supply(record.circulating_supply),
        }
    }
}

/// Full report: banner, table, and a short summary.
pub fn render(listing: &Listing) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!(
        "\n{rule}\n{TITLE}\n{rule}\n\n{table}\n\n{rule}\n\nSummary Statistics:\nTotal cryptocurrencies fetched: {count}\nFetched at: {at}\n",
        table = render_table(listing),
        count = listing.len(),
        at = listing.fetched_at().format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

/// Header line plus one right-aligned line per record.
pub fn render_table(listing: &Listing) -> String {
    let mut builder = Builder::default();
    builder.push_record(Column::iter().map(|c| c.to_string()));
    for record in listing {
        builder.push_record(Column::iter().map(|c| c.cell(record, listing.currency())));
    }

    builder
        .build()
        .with(Style::blank())
        .with(Modify::new(Segment::all()).with(Alignment::right()))
        .to_string()
}

/// Two decimals from 1 upwards, six below so small prices stay readable.
pub fn format_price(price: Decimal, currency: &Currency) -> String {
    let dp = if price.abs() >= Decimal::ONE { 2 } else { 6 };
    format_amount(price, dp, &currency.prefix(), "")
}

/// Scales to `B`, `M` or `K` with two decimals.
pub fn format_large_amount(value: Option<Decimal>, currency: &Currency) -> String {
    let Some(value) = value else {
        return NOT_AVAILABLE.to_string();
    };
    let magnitude = value.abs();
    let (scaled, suffix) = if magnitude >= BILLION {
        (value / BILLION, "B")
    } else if magnitude >= MILLION {
        (value / MILLION, "M")
    } else if magnitude >= THOUSAND {
        (value / THOUSAND, "K")
    } else {
        (value, "")
    };
    format_amount(scaled, 2, &currency.prefix(), suffix)
}

/// Always signed, so `0` renders as `+0.00%`.
pub fn format_percent(value: Option<Decimal>) -> String {
    let Some(value) = value else {
        return NOT_AVAILABLE.to_string();
    };
    let rounded = round(value, 2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        '-'
    } else {
        '+'
    };
    format!("{sign}{}%", group_digits(rounded.abs(), 2))
}

pub fn format_supply(value: Option<Decimal>) -> String {
    match value {
        Some(value) => format_amount(value, 0, "", ""),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn format_amount(value: Decimal, dp: u32, prefix: &str, suffix: &str) -> String {
    let rounded = round(value, dp);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{prefix}{}{suffix}", group_digits(rounded.abs(), dp))
}

fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// `1234567.8` with `dp = 2` becomes `1,234,567.80`. Expects a non-negative value.
fn group_digits(value: Decimal, dp: u32) -> String {
    let mut fixed = round(value, dp);
    fixed.rescale(dp);
    let text = fixed.to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let len = int_part.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{grouped}.{frac}"),
        None => grouped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(rank: u32, name: &str, symbol: &str, price: Decimal) -> AssetRecord {
        AssetRecord {
            id: u64::from(rank),
            rank,
            name: name.to_string(),
            symbol: symbol.to_string(),
            price,
            market_cap: Some(dec!(880123456789.12)),
            volume_24h: Some(dec!(28512345678)),
            percent_change_1h: Some(dec!(0.254)),
            percent_change_24h: Some(dec!(-1.5)),
            percent_change_7d: None,
            circulating_supply: Some(dec!(19500000.6)),
            fetched_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    fn sample_listing() -> Listing {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        Listing::new(
            Currency::usd(),
            at,
            vec![
                record(1, "Bitcoin", "BTC", dec!(45123.45)),
                record(2, "Ethereum", "ETH", dec!(3456.78)),
            ],
        )
    }

    #[test]
    fn first_row_shows_bitcoin() {
        let table = render_table(&sample_listing());
        let mut lines = table.lines();
        let header = lines.next().expect("header line");
        let first = lines.next().expect("first data row");

        for column in Column::iter() {
            assert!(header.contains(&column.to_string()), "{header}");
        }
        for needle in ["1", "Bitcoin", "BTC", "$45,123.45"] {
            assert!(first.contains(needle), "{needle} missing from {first}");
        }
        assert!(lines.next().expect("second row").contains("$3,456.78"));
    }

    #[test]
    fn header_order_is_fixed() {
        let headers = Column::iter().map(|c| c.to_string()).collect::<Vec<_>>();
        assert_eq!(
            headers,
            [
                "Rank",
                "Name",
                "Symbol",
                "Price",
                "Market Cap",
                "Volume (24h)",
                "Change (1h)",
                "Change (24h)",
                "Change (7d)",
                "Circulating Supply",
            ]
        );
    }

    #[test]
    fn columns_are_aligned() {
        let table = render_table(&sample_listing());
        let widths: Vec<usize> = table.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{table}");
    }

    #[test]
    fn render_is_idempotent() {
        let listing = sample_listing();
        let first = render(&listing);
        assert_eq!(first, render(&listing));
        assert!(first.contains(TITLE));
        assert!(first.contains("Summary Statistics:\nTotal cryptocurrencies fetched: 2"));
        assert!(first.contains("Fetched at: 2024-01-01 12:00:00 UTC"));
    }

    #[test]
    fn empty_listing_renders_header_only() {
        let listing = Listing::new(Currency::usd(), Utc::now(), Vec::new());
        assert_eq!(render_table(&listing).lines().count(), 1);
    }

    #[test]
    fn price_precision_depends_on_magnitude() {
        let usd = Currency::usd();
        assert_eq!(format_price(dec!(45123.45), &usd), "$45,123.45");
        assert_eq!(format_price(dec!(1), &usd), "$1.00");
        assert_eq!(format_price(dec!(0.00001234), &usd), "$0.000012");
        assert_eq!(format_price(dec!(0.9999996), &usd), "$1.000000");
    }

    #[test]
    fn large_amounts_use_suffixes() {
        let usd = Currency::usd();
        assert_eq!(format_large_amount(Some(dec!(880123456789.12)), &usd), "$880.12B");
        assert_eq!(format_large_amount(Some(dec!(1234567890123)), &usd), "$1,234.57B");
        assert_eq!(format_large_amount(Some(dec!(28512345)), &usd), "$28.51M");
        assert_eq!(format_large_amount(Some(dec!(1500)), &usd), "$1.50K");
        assert_eq!(format_large_amount(Some(dec!(999.994)), &usd), "$999.99");
        assert_eq!(format_large_amount(None, &usd), "N/A");
    }

    #[test]
    fn amounts_in_other_currencies_use_their_prefix() {
        let eur = Currency::new("EUR").unwrap();
        let chf = Currency::new("CHF").unwrap();
        assert_eq!(format_price(dec!(1234.5), &eur), "€1,234.50");
        assert_eq!(format_large_amount(Some(dec!(2500000)), &chf), "CHF 2.50M");
    }

    #[test]
    fn percentages_are_signed() {
        assert_eq!(format_percent(Some(dec!(0.254))), "+0.25%");
        assert_eq!(format_percent(Some(dec!(-1.5))), "-1.50%");
        assert_eq!(format_percent(Some(dec!(0.005))), "+0.01%");
        assert_eq!(format_percent(Some(dec!(-0.001))), "+0.00%");
        assert_eq!(format_percent(Some(dec!(1234.5))), "+1,234.50%");
        assert_eq!(format_percent(None), "N/A");
    }

    #[test]
    fn supply_is_a_grouped_integer() {
        assert_eq!(format_supply(Some(dec!(19500000.6))), "19,500,001");
        assert_eq!(format_supply(Some(dec!(999))), "999");
        assert_eq!(format_supply(Some(dec!(0))), "0");
        assert_eq!(format_supply(None), "N/A");
    }

    #[test]
    fn negative_amounts_put_the_sign_first() {
        assert_eq!(format_price(dec!(-2.5), &Currency::usd()), "-$2.50");
    }
}

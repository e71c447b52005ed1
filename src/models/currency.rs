use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Conversion currency for quotes, e.g. `USD` or `BTC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl AsRef<str>) -> Result<Self, ClientError> {
        let code = code.as_ref().trim();
        let valid_len = (2..=10).contains(&code.len());
        if !valid_len || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ClientError::invalid_request(format!(
                "currency code '{code}' must be 2-10 ASCII letters or digits"
            )));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Display symbol for the common fiat currencies.
    pub fn symbol(&self) -> Option<&'static str> {
        match self.0.as_str() {
            "USD" => Some("$"),
            "EUR" => Some("€"),
            "GBP" => Some("£"),
            "JPY" | "CNY" => Some("¥"),
            "KRW" => Some("₩"),
            "INR" => Some("₹"),
            "BTC" => Some("₿"),
            _ => None,
        }
    }

    /// Prefix placed before formatted amounts: the symbol, or the code and a space.
    pub fn prefix(&self) -> String {
        match self.symbol() {
            Some(symbol) => symbol.to_string(),
            None => format!("{} ", self.0),
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

impl FromStr for Currency {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = ClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

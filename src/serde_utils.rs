use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Accepts either JSON numbers or stringified numbers and converts to Decimal.
///
/// Numbers go through their shortest textual form so `45123.45` stays exactly
/// `45123.45` instead of picking up binary noise.
pub(crate) fn decimal_from_string_or_number<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as DeError;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => parse_decimal(&n.to_string())
            .ok_or_else(|| DeError::custom(format!("Failed to convert number {n} to Decimal"))),
        Value::String(s) => {
            parse_decimal(s.trim()).ok_or_else(|| DeError::custom("Invalid decimal string"))
        }
        other => Err(DeError::custom(format!(
            "Expected number or string for decimal field, received {other:?}"
        ))),
    }
}

/// Like [`decimal_from_string_or_number`] but maps `null` to `None`.
///
/// The key itself stays required: serde only treats an absent key as `None`
/// when the field has no `deserialize_with`.
pub(crate) fn opt_decimal_from_string_or_number<'de, D>(
    deserializer: D,
) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as DeError;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => parse_decimal(&n.to_string())
            .map(Some)
            .ok_or_else(|| DeError::custom(format!("Failed to convert number {n} to Decimal"))),
        Value::String(s) => parse_decimal(s.trim())
            .map(Some)
            .ok_or_else(|| DeError::custom("Invalid decimal string")),
        other => Err(DeError::custom(format!(
            "Expected number, string or null for decimal field, received {other:?}"
        ))),
    }
}

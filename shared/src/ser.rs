use std::str::FromStr;

use num_bigint::BigInt;
use serde_json::Value;

/// Mirror node amounts arrive either as JSON strings (`total_supply`) or as
/// JSON integers (token balances). Numbers are read from their exact text
/// (serde_json's `arbitrary_precision`), never through `f64`.
pub fn parse_amount(value: &Value) -> Result<BigInt, String> {
    match value {
        Value::String(text) => parse_integer(text.trim())
            .ok_or_else(|| format!("{text:?} is not an integer")),
        Value::Number(number) => parse_integer(&number.to_string())
            .ok_or_else(|| format!("{number} is not an integer")),
        other => Err(format!("{other} is not an amount")),
    }
}

/// An optional sign followed by ASCII digits, nothing else.
fn parse_integer(text: &str) -> Option<BigInt> {
    let digits = text
        .strip_prefix(|c: char| c == '+' || c == '-')
        .unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    BigInt::from_str(text).ok()
}

pub fn parse_decimals(value: &Value) -> Result<u32, String> {
    match value {
        Value::String(text) => text
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("{text:?} is not a decimal count ({e})")),
        Value::Number(number) => number
            .as_u64()
            .and_then(|decimals| u32::try_from(decimals).ok())
            .ok_or_else(|| format!("{number} is not a decimal count")),
        other => Err(format!("{other} is not a decimal count")),
    }
}

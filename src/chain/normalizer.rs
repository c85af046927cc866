// =============================================================================
// Contract Normalizer — heterogeneous provider records => OptionContract
// =============================================================================
//
// Providers disagree on shape and encoding:
//
//   nested  { "strikePrice": "605", "call": {...}, "put": {...} }
//   flat    { "type": "Call", "strike": 605.0, "lastPrice": 1.2, ... }
//
// and send numbers either as JSON numbers or as numeric strings.  Coercion
// policy:
//
//   strike / last price / volume / open interest  missing or bad => 0
//   implied volatility                             missing, bad or <= 0 => None
//
// IV is never coerced to 0 because the scorer divides by it.
//
// Entries that are not JSON objects, or flat entries with an unknown type,
// are malformed: skipped and counted.  Output order is traversal order.
// =============================================================================

use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::chain::contract::OptionContract;
use crate::error::CoreError;
use crate::types::OptionType;

const STRIKE_KEYS: &[&str] = &["strike", "strikePrice", "strike_price"];
const LAST_PRICE_KEYS: &[&str] = &["lastPrice", "last_price", "last"];
const VOLUME_KEYS: &[&str] = &["volume"];
const OPEN_INTEREST_KEYS: &[&str] = &["openInterest", "open_interest"];
const IV_KEYS: &[&str] = &["impliedVolatility", "implied_volatility"];
const EXPIRATION_KEYS: &[&str] = &["expirationDate", "expireDate", "expiration", "expiry"];
const TYPE_KEYS: &[&str] = &["type", "optionType", "option_type", "direction"];

/// Result of normalizing one raw chain.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizedChain {
    pub contracts: Vec<OptionContract>,
    /// Raw entries seen.
    pub raw_records: usize,
    /// Raw entries skipped as malformed.
    pub malformed: usize,
}

/// Normalize every entry of `raw`, skipping (and counting) malformed ones.
pub fn normalize_chain(raw: &[Value]) -> NormalizedChain {
    let mut out = NormalizedChain {
        contracts: Vec::with_capacity(raw.len() * 2),
        raw_records: raw.len(),
        malformed: 0,
    };

    for (idx, entry) in raw.iter().enumerate() {
        match normalize_entry(entry) {
            Ok(mut contracts) => out.contracts.append(&mut contracts),
            Err(e) => {
                out.malformed += 1;
                debug!(index = idx, error = %e, "skipping malformed chain entry");
            }
        }
    }

    out
}

/// Normalize one raw entry into zero, one or two contracts.
pub fn normalize_entry(entry: &Value) -> Result<Vec<OptionContract>, CoreError> {
    let obj = entry
        .as_object()
        .ok_or_else(|| CoreError::MalformedContract(format!("expected object, got {}", kind(entry))))?;

    // --- Nested call / put payloads -------------------------------------------
    if obj.contains_key("call") || obj.contains_key("put") {
        let mut contracts = Vec::with_capacity(2);
        for (key, option_type) in [("call", OptionType::Call), ("put", OptionType::Put)] {
            if let Some(Value::Object(payload)) = obj.get(key) {
                contracts.push(contract_from(payload, option_type, Some(obj)));
            }
        }
        return Ok(contracts);
    }

    // --- Flat record with an explicit type ------------------------------------
    match lookup(obj, TYPE_KEYS) {
        None => Ok(Vec::new()),
        Some(Value::String(s)) => match OptionType::parse(s) {
            Some(option_type) => Ok(vec![contract_from(obj, option_type, None)]),
            None => Err(CoreError::MalformedContract(format!("unknown option type {s:?}"))),
        },
        Some(other) => Err(CoreError::MalformedContract(format!(
            "option type must be a string, got {}",
            kind(other)
        ))),
    }
}

/// Build a contract from `payload`, falling back to `parent` for fields the
/// nested payload omits (some providers only put the strike on the parent).
fn contract_from(
    payload: &Map<String, Value>,
    option_type: OptionType,
    parent: Option<&Map<String, Value>>,
) -> OptionContract {
    let get = |keys: &[&str]| lookup(payload, keys).or_else(|| parent.and_then(|p| lookup(p, keys)));

    let strike = get(STRIKE_KEYS).and_then(number).unwrap_or(0.0).max(0.0);
    let last_price = get(LAST_PRICE_KEYS)
        .and_then(number)
        .or_else(|| first_ask(payload))
        .unwrap_or(0.0)
        .max(0.0);
    let volume = get(VOLUME_KEYS).and_then(number).map(to_count).unwrap_or(0);
    let open_interest = get(OPEN_INTEREST_KEYS).and_then(number).map(to_count).unwrap_or(0);
    let implied_volatility = get(IV_KEYS).and_then(number).filter(|iv| *iv > 0.0);
    let expiration_date = get(EXPIRATION_KEYS).and_then(date);

    OptionContract {
        option_type,
        strike,
        last_price,
        volume,
        open_interest,
        implied_volatility,
        expiration_date,
    }
}

// =============================================================================
// Lenient field helpers
// =============================================================================

/// First non-null value among `keys`.
fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Finite number from a JSON number or numeric string.
fn number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn to_count(n: f64) -> u64 {
    // Saturating float => int cast; negatives become 0.
    n.max(0.0).floor() as u64
}

/// Best ask from `askList[0].price`, falling back to a flat `ask`.
fn first_ask(payload: &Map<String, Value>) -> Option<f64> {
    payload
        .get("askList")
        .and_then(Value::as_array)
        .and_then(|asks| asks.first())
        .and_then(|ask| ask.get("price"))
        .and_then(number)
        .or_else(|| payload.get("ask").and_then(number))
}

/// `YYYY-MM-DD` string, or unix seconds / milliseconds.
fn date(v: &Value) -> Option<NaiveDate> {
    if let Value::String(s) = v {
        if let Ok(d) = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
            return Some(d);
        }
    }
    let ts = number(v)?;
    let secs = if ts > 1e11 { ts / 1000.0 } else { ts };
    DateTime::from_timestamp(secs as i64, 0).map(|dt| dt.date_naive())
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! Prediction payload normalization
//!
//! The backend answers with metrics either nested under `metrics` or flat at
//! the top level. Each field is resolved through an ordered list of lookup
//! strategies; supporting another shape means appending a strategy.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::api::stockcast::ApiError;
use crate::models::{Metrics, PredictionHistoryEntry, PredictionResult};

pub const UNKNOWN_TICKER: &str = "Unknown";

/// Finds a raw field value in a payload
type Lookup = for<'a> fn(&'a Value, &str) -> Option<&'a Value>;

/// Nested first, flat second
const METRIC_LOOKUPS: &[Lookup] = &[nested_metric, flat_metric];

/// Where a history response keeps its list: bare array, then paginated
const LIST_LOOKUPS: &[ListLookup] = &[bare_list, paginated_list];

type ListLookup = for<'a> fn(&'a Value) -> Option<&'a Vec<Value>>;

const CREATED_KEYS: [&str; 2] = ["created", "created_at"];

fn nested_metric<'a>(raw: &'a Value, field: &str) -> Option<&'a Value> {
    raw.get("metrics")?.get(field)
}

fn flat_metric<'a>(raw: &'a Value, field: &str) -> Option<&'a Value> {
    raw.get(field)
}

fn bare_list(raw: &Value) -> Option<&Vec<Value>> {
    raw.as_array()
}

fn paginated_list(raw: &Value) -> Option<&Vec<Value>> {
    raw.get("results")?.as_array()
}

/// Coerce a JSON value to a finite float. Zero is a real value.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// First strategy yielding a usable number wins
fn resolve_number(raw: &Value, field: &str) -> Option<f64> {
    METRIC_LOOKUPS
        .iter()
        .find_map(|lookup| lookup(raw, field).and_then(coerce_number))
}

fn resolve_ticker(raw: &Value) -> String {
    raw.get("ticker")
        .and_then(Value::as_str)
        .map(|ticker| ticker.trim().to_uppercase())
        .unwrap_or_else(|| UNKNOWN_TICKER.to_string())
}

fn resolve_metrics(raw: &Value) -> Metrics {
    Metrics {
        mse: resolve_number(raw, "mse"),
        rmse: resolve_number(raw, "rmse"),
        r2: resolve_number(raw, "r2"),
    }
}

/// Both chart URLs or nothing
fn resolve_plot_urls(raw: &Value) -> Option<[String; 2]> {
    let urls = raw.get("plot_urls")?.as_array()?;
    match urls.as_slice() {
        [history, prediction, ..] => Some([
            history.as_str()?.to_string(),
            prediction.as_str()?.to_string(),
        ]),
        _ => None,
    }
}

/// Normalize a predict payload into the canonical result
pub fn normalize(raw: &Value) -> PredictionResult {
    PredictionResult {
        ticker: resolve_ticker(raw),
        next_day_price: resolve_number(raw, "next_day_price"),
        metrics: resolve_metrics(raw),
        plot_urls: resolve_plot_urls(raw),
    }
}

/// Parse a history payload, preserving server order
pub fn parse_history(raw: &Value) -> Result<Vec<PredictionHistoryEntry>, ApiError> {
    let items = LIST_LOOKUPS
        .iter()
        .find_map(|lookup| lookup(raw))
        .ok_or_else(|| ApiError::MalformedResponse("Expected a list of predictions".to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let created_at = resolve_created(item).ok_or_else(|| {
                ApiError::MalformedResponse(format!(
                    "Prediction #{} has no readable creation time",
                    index + 1
                ))
            })?;
            let metrics = resolve_metrics(item);

            Ok(PredictionHistoryEntry {
                ticker: resolve_ticker(item),
                created_at,
                next_day_price: resolve_number(item, "next_day_price"),
                mse: metrics.mse,
                rmse: metrics.rmse,
                r2: metrics.r2,
            })
        })
        .collect()
}

fn resolve_created(item: &Value) -> Option<DateTime<Utc>> {
    CREATED_KEYS.iter().find_map(|key| {
        let text = item.get(*key)?.as_str()?;
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|created| created.with_timezone(&Utc))
    })
}

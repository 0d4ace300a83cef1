//! Response normalizer - generator text to [`ControlDirective`].
//!
//! Handles the usual generator output variations:
//! - JSON wrapped in ```` ```json ```` fences
//! - JSON preceded or followed by prose
//! - missing or `null` fields
//! - lower-case enum values, numeric strings, out-of-range temperatures
//!
//! Anything that is not a JSON object between the first `{` and the last `}`
//! is [`DirectiveError::Unparseable`].

use crate::directive::{
    clamp_temperature, Action, ControlDirective, FanSpeed, Mode, DEFAULT_REASON,
    DEFAULT_TEMPERATURE,
};
use crate::error::DirectiveError;
use serde_json::{Map, Value};
use tracing::debug;

/// Remove a surrounding markdown code fence, if any
fn strip_code_fence(text: &str) -> &str {
    let mut t = text.trim();
    if let Some(rest) = t.strip_prefix("```") {
        // Info string (```json) is one bare word; the object may share its line
        t = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    }
    if let Some(rest) = t.trim_end().strip_suffix("```") {
        t = rest;
    }
    t.trim()
}

/// Slice from the first `{` to the last `}` inclusive
pub fn extract_json_object(text: &str) -> Option<&str> {
    let t = strip_code_fence(text);
    let start = t.find('{')?;
    let end = t.rfind('}')?;
    if start < end {
        Some(&t[start..=end])
    } else {
        None
    }
}

/// Normalize raw generator text into a range-valid directive
pub fn normalize(raw_text: &str) -> Result<ControlDirective, DirectiveError> {
    let json_str = extract_json_object(raw_text)
        .ok_or_else(|| DirectiveError::Unparseable("no JSON object found".to_string()))?;

    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| DirectiveError::Unparseable(e.to_string()))?;

    match value {
        Value::Object(fields) => Ok(directive_from_fields(&fields)),
        _ => Err(DirectiveError::Unparseable(
            "JSON value is not an object".to_string(),
        )),
    }
}

fn directive_from_fields(fields: &Map<String, Value>) -> ControlDirective {
    let action = fields
        .get("action")
        .and_then(Value::as_str)
        .and_then(Action::parse)
        .unwrap_or_else(|| {
            debug!("action missing or invalid, using {}", Action::default());
            Action::default()
        });

    let temperature = coerce_temperature(fields.get("temperature")).unwrap_or_else(|| {
        debug!("temperature missing or non-numeric, using {}", DEFAULT_TEMPERATURE);
        DEFAULT_TEMPERATURE as i64
    });

    let fan_speed = fields
        .get("fan_speed")
        .and_then(Value::as_str)
        .and_then(FanSpeed::parse)
        .unwrap_or_default();

    let mode = fields
        .get("mode")
        .and_then(Value::as_str)
        .and_then(Mode::parse)
        .unwrap_or_default();

    let reason = fields
        .get("reason")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_REASON);

    ControlDirective {
        action,
        temperature: clamp_temperature(temperature),
        fan_speed,
        mode,
        reason: reason.to_string(),
        audio_url: None,
    }
}

/// Integer, float (truncated) or numeric string; anything else is None
fn coerce_temperature(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| float_to_int(n.as_f64()?)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| float_to_int(s.parse::<f64>().ok()?))
        }
        _ => None,
    }
}

fn float_to_int(f: f64) -> Option<i64> {
    f.is_finite().then(|| f.trunc() as i64)
}

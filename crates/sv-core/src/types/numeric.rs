//! Lenient numeric fields.
//!
//! Marker records come from hand-edited JSON as often as from the editor, so a
//! bad number must never make a record unreadable. Every numeric field goes
//! through these helpers: malformed input degrades to the field default
//! instead of failing deserialization.

use std::fmt;

use serde::Deserializer;
use serde::de::{IgnoredAny, MapAccess, SeqAccess, Visitor};

/// Default for position and rotation components.
pub const DEFAULT_COMPONENT: f64 = 0.0;

/// Default for the fire scale multiplier.
pub const DEFAULT_SCALE: f64 = 1.0;

/// Round to 3 decimal places.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Coerce a position/rotation component, replacing non-finite values with 0.
pub fn coerce_component(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        DEFAULT_COMPONENT
    }
}

/// Coerce a scale multiplier, replacing non-finite or non-positive values with 1.
pub fn coerce_scale(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        DEFAULT_SCALE
    }
}

/// Serde default for scale fields.
pub fn default_scale() -> f64 {
    DEFAULT_SCALE
}

/// Accepts anything and yields a number when one can be read from it.
struct LenientNumber;

impl<'de> Visitor<'de> for LenientNumber {
    type Value = Option<f64>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v as f64))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v as f64))
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(if v { 1.0 } else { 0.0 }))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
        Ok(v.trim().parse::<f64>().ok())
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LenientNumber)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(None)
    }
}

/// Deserialize a position/rotation component, defaulting to 0.
pub fn lenient_component<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserializer.deserialize_any(LenientNumber)?;
    Ok(value.map(coerce_component).unwrap_or(DEFAULT_COMPONENT))
}

/// Deserialize a scale multiplier, defaulting to 1.
pub fn lenient_scale<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserializer.deserialize_any(LenientNumber)?;
    Ok(value.map(coerce_scale).unwrap_or(DEFAULT_SCALE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "lenient_component")]
        x: f64,
        #[serde(default = "default_scale", deserialize_with = "lenient_scale")]
        scale: f64,
    }

    fn parse(json: &str) -> Sample {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(1.23449), 1.234);
        assert_eq!(round3(-5.6789), -5.679);
        assert_eq!(round3(2.0), 2.0);
    }

    #[test]
    fn test_numbers_pass_through() {
        let s = parse(r#"{"x": 1.5, "scale": 2}"#);
        assert_eq!(s.x, 1.5);
        assert_eq!(s.scale, 2.0);
    }

    #[test]
    fn test_numeric_strings_are_parsed() {
        let s = parse(r#"{"x": " 3.25 ", "scale": "0.5"}"#);
        assert_eq!(s.x, 3.25);
        assert_eq!(s.scale, 0.5);
    }

    #[test]
    fn test_malformed_values_use_defaults() {
        let s = parse(r#"{"x": "abc", "scale": null}"#);
        assert_eq!(s.x, 0.0);
        assert_eq!(s.scale, 1.0);

        let s = parse(r#"{"x": [1, 2], "scale": {"a": 1}}"#);
        assert_eq!(s.x, 0.0);
        assert_eq!(s.scale, 1.0);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let s = parse("{}");
        assert_eq!(s.x, 0.0);
        assert_eq!(s.scale, 1.0);
    }

    #[test]
    fn test_zero_and_negative_scale_fall_back() {
        assert_eq!(parse(r#"{"scale": 0}"#).scale, 1.0);
        assert_eq!(parse(r#"{"scale": -2}"#).scale, 1.0);
    }

    #[test]
    fn test_coerce_non_finite() {
        assert_eq!(coerce_component(f64::NAN), 0.0);
        assert_eq!(coerce_component(f64::INFINITY), 0.0);
        assert_eq!(coerce_scale(f64::NAN), 1.0);
        assert_eq!(coerce_scale(0.25), 0.25);
    }
}

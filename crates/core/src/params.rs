//! Typed parameter extraction from a sketch's JSON parameter object.
//!
//! Sketch parameters arrive as loosely-typed JSON (CLI `--params`, seed files).
//! The helpers here never fail: a missing or mistyped key yields the default,
//! so a sketch can always be constructed.

use serde_json::Value;

/// Extracts an `f64`, accepting integers too.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a non-negative integer as `usize`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Extracts a `[min, max]` pair, e.g. `"speed": [2.0, 5.0]`.
///
/// A pair given in descending order is swapped. Anything other than a
/// two-element numeric array yields `default`.
pub fn param_range(params: &Value, name: &str, default: (f64, f64)) -> (f64, f64) {
    let pair = params.get(name).and_then(Value::as_array).and_then(|arr| {
        match arr.as_slice() {
            [a, b] => Some((a.as_f64()?, b.as_f64()?)),
            _ => None,
        }
    });
    match pair {
        Some((a, b)) if a <= b => (a, b),
        Some((a, b)) => (b, a),
        None => default,
    }
}

/// [`param_f64`] clamped to `[min, max]`.
pub fn param_f64_in(params: &Value, name: &str, default: f64, min: f64, max: f64) -> f64 {
    param_f64(params, name, default).clamp(min, max)
}

/// [`param_usize`] clamped to `[min, max]`.
pub fn param_usize_in(params: &Value, name: &str, default: usize, min: usize, max: usize) -> usize {
    param_usize(params, name, default).clamp(min, max)
}

/// [`param_range`] with both ends clamped to `[min, max]`.
pub fn param_range_in(
    params: &Value,
    name: &str,
    default: (f64, f64),
    min: f64,
    max: f64,
) -> (f64, f64) {
    let (lo, hi) = param_range(params, name, default);
    (lo.clamp(min, max), hi.clamp(min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn param_f64_reads_floats_and_integers() {
        let params = json!({"amp": 2.5, "rings": 10});
        assert_eq!(param_f64(&params, "amp", 1.0), 2.5);
        assert_eq!(param_f64(&params, "rings", 0.0), 10.0);
    }

    #[test]
    fn param_f64_falls_back_on_wrong_type() {
        let params = json!({"amp": "loud"});
        assert_eq!(param_f64(&params, "amp", 1.0), 1.0);
    }

    #[test]
    fn param_f64_falls_back_for_non_object() {
        assert_eq!(param_f64(&json!([1, 2]), "amp", 7.0), 7.0);
    }

    #[test]
    fn param_usize_rejects_negative_and_fractional() {
        let params = json!({"a": -1, "b": 2.5, "c": 12});
        assert_eq!(param_usize(&params, "a", 5), 5);
        assert_eq!(param_usize(&params, "b", 5), 5);
        assert_eq!(param_usize(&params, "c", 5), 12);
    }

    #[test]
    fn param_bool_and_string() {
        let params = json!({"relax": true, "glyphs": " .:-=+*#%@"});
        assert!(param_bool(&params, "relax", false));
        assert!(!param_bool(&params, "missing", false));
        assert_eq!(param_string(&params, "glyphs", ""), " .:-=+*#%@");
        assert_eq!(param_string(&params, "missing", "abc"), "abc");
    }

    #[test]
    fn param_range_reads_pairs() {
        let params = json!({"speed": [2.0, 5]});
        assert_eq!(param_range(&params, "speed", (0.0, 1.0)), (2.0, 5.0));
    }

    #[test]
    fn param_range_swaps_descending_pairs() {
        let params = json!({"life": [90, 30]});
        assert_eq!(param_range(&params, "life", (0.0, 1.0)), (30.0, 90.0));
    }

    #[test]
    fn param_range_rejects_malformed_values() {
        let params = json!({"a": [1.0], "b": [1.0, "x"], "c": 3.0, "d": [1, 2, 3]});
        for key in ["a", "b", "c", "d", "missing"] {
            assert_eq!(param_range(&params, key, (0.5, 1.5)), (0.5, 1.5), "key {key}");
        }
    }

    #[test]
    fn bounded_helpers_clamp_extremes() {
        let params = json!({
            "f": 1e300,
            "g": -1e300,
            "n": 1_000_000_000_000_000u64,
            "r": [-1e9, 1e9],
        });
        assert_eq!(param_f64_in(&params, "f", 0.5, 0.0, 1.0), 1.0);
        assert_eq!(param_f64_in(&params, "g", 0.5, 0.0, 1.0), 0.0);
        assert_eq!(param_f64_in(&params, "missing", 0.5, 0.0, 1.0), 0.5);
        assert_eq!(param_usize_in(&params, "n", 8, 3, 2000), 2000);
        assert_eq!(param_usize_in(&json!({"n": 0}), "n", 8, 3, 2000), 3);
        assert_eq!(param_range_in(&params, "r", (1.0, 2.0), 0.0, 10.0), (0.0, 10.0));
    }
}

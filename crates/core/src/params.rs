//! Lenient typed lookups into a JSON parameter object.
//!
//! Every helper takes the object, a key and a fallback. A missing key, a
//! value of the wrong type, or a non-object `params` all yield the fallback,
//! so callers always get something usable.

use glam::DVec2;
use serde_json::Value;

/// Any JSON number as `f64`.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// A non-negative JSON integer as `usize`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    param_opt_usize(params, name).unwrap_or(default)
}

/// A non-negative JSON integer as `usize`, or `None` if absent or mistyped.
pub fn param_opt_usize(params: &Value, name: &str) -> Option<usize> {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
}

/// A JSON integer in `u32` range, used for noise seeds.
pub fn param_u32(params: &Value, name: &str, default: u32) -> u32 {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

/// A boolean parameter.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// A point written as a two-element array `[x, y]`.
pub fn param_point(params: &Value, name: &str, default: DVec2) -> DVec2 {
    match params.get(name).and_then(Value::as_array).map(Vec::as_slice) {
        Some([x, y]) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => DVec2::new(x, y),
            _ => default,
        },
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- param_f64 --

    #[test]
    fn f64_reads_floats_and_integers() {
        let params = json!({"a": 2.5, "b": 10});
        assert_eq!(param_f64(&params, "a", 0.0), 2.5);
        assert_eq!(param_f64(&params, "b", 0.0), 10.0);
    }

    #[test]
    fn f64_falls_back_on_missing_null_or_string() {
        let params = json!({"n": null, "s": "fast"});
        assert_eq!(param_f64(&params, "missing", 3.0), 3.0);
        assert_eq!(param_f64(&params, "n", 4.0), 4.0);
        assert_eq!(param_f64(&params, "s", 5.0), 5.0);
    }

    #[test]
    fn non_object_params_fall_back() {
        let params = json!("not an object");
        assert_eq!(param_f64(&params, "x", 7.0), 7.0);
        assert_eq!(param_usize(&params, "x", 7), 7);
        assert!(param_bool(&params, "x", true));
    }

    // -- integer helpers --

    #[test]
    fn usize_reads_non_negative_integers_only() {
        let params = json!({"n": 42, "f": 2.5, "neg": -1, "s": "many"});
        assert_eq!(param_usize(&params, "n", 0), 42);
        assert_eq!(param_usize(&params, "f", 9), 9);
        assert_eq!(param_usize(&params, "neg", 5), 5);
        assert_eq!(param_usize(&params, "s", 8), 8);
    }

    #[test]
    fn opt_usize_distinguishes_absent() {
        let params = json!({"n": 3});
        assert_eq!(param_opt_usize(&params, "n"), Some(3));
        assert_eq!(param_opt_usize(&params, "m"), None);
    }

    #[test]
    fn u32_rejects_out_of_range() {
        let params = json!({"seed": 7, "big": 5_000_000_000u64});
        assert_eq!(param_u32(&params, "seed", 0), 7);
        assert_eq!(param_u32(&params, "big", 1), 1);
    }

    // -- bool --

    #[test]
    fn bool_reads_only_booleans() {
        let params = json!({"on": true, "num": 1});
        assert!(param_bool(&params, "on", false));
        assert!(!param_bool(&params, "num", false));
    }

    // -- param_point --

    #[test]
    fn point_reads_two_element_array() {
        let params = json!({"c": [1.5, -2]});
        assert_eq!(param_point(&params, "c", DVec2::ZERO), DVec2::new(1.5, -2.0));
    }

    #[test]
    fn point_falls_back_on_wrong_shape() {
        let params = json!({"short": [1.0], "long": [1, 2, 3], "text": ["a", 1], "obj": {"x": 1}});
        for key in ["short", "long", "text", "obj", "missing"] {
            assert_eq!(param_point(&params, key, DVec2::ONE), DVec2::ONE, "key {key}");
        }
    }
}

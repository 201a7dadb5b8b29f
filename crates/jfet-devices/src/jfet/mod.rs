//! JFET Static Model Implementation
//!
//! This module implements the static (DC) drain-current model of an
//! N-channel junction FET with temperature-dependent threshold and
//! transconductance.
//!
//! ## Module Structure
//!
//! - `params`: Model parameters (JfetParams) and the 2N3819 reference device
//! - `types`: Enums and output structures (JfetRegion, CutoffMode, JfetOutput)
//! - `temperature`: Threshold and beta temperature correction
//! - `evaluate`: Two-region drain current equation
//! - `model_card`: SPICE `.MODEL ... NJF(...)` parsing and embedded models
//!
//! ## Usage
//!
//! ```ignore
//! use jfet_devices::jfet::{correct_for_temperature, drain_current, JfetParams};
//!
//! let params = JfetParams::n2n3819();
//! let c = correct_for_temperature(&params, 26.85, 26.85);
//! let ids = drain_current(0.0, 10.0, params.lambda, c.beta, c.vto);
//! println!("Ids = {:.3e} A", ids);
//! ```
//!
//! Parasitic resistances are not part of the device equation; the self-bias
//! solver in `jfet-core` feeds them back into the drain voltage.

pub mod params;
pub mod types;
pub mod temperature;
pub mod evaluate;
pub mod model_card;

// Re-export commonly used items
pub use params::{JfetParams, ParamError, REFERENCE_TEMP_C};
pub use types::{CutoffMode, JfetOutput, JfetRegion, TempCorrected};
pub use temperature::correct_for_temperature;
pub use evaluate::{drain_current, evaluate_jfet_dc};
pub use model_card::{
    jfet_by_name, jfet_model_names, parse_model_card, parse_model_library, ModelError,
    ModelLibrary, NamedJfetModel,
};

use std::collections::HashMap;

/// Parameter names understood by `build_jfet_params`.
pub const KNOWN_KEYS: &[&str] = &["beta", "vto", "lambda", "rd", "rs", "vtotc", "betatce"];

/// Build JfetParams from a parameter HashMap
///
/// Keys are lowercase SPICE names. Missing or unparsable parameters keep
/// the 2N3819 defaults. `betatce` is read in %/C as in SPICE model cards.
pub fn build_jfet_params(params: &HashMap<String, String>) -> JfetParams {
    apply_jfet_params(JfetParams::default(), params)
}

/// Overlay parsable entries of `params` on `base`, same key rules as
/// `build_jfet_params`.
pub fn apply_jfet_params(base: JfetParams, params: &HashMap<String, String>) -> JfetParams {
    let mut p = base;

    let get_param = |key: &str| -> Option<f64> { params.get(key).and_then(|v| parse_number(v)) };

    if let Some(v) = get_param("beta") {
        p.beta = v;
    }
    if let Some(v) = get_param("vto") {
        p.vto = v;
    }
    if let Some(v) = get_param("lambda") {
        p.lambda = v;
    }
    if let Some(v) = get_param("rd") {
        p.rd = v;
    }
    if let Some(v) = get_param("rs") {
        p.rs = v;
    }
    if let Some(v) = get_param("vtotc") {
        p.vto_tc = v;
    }
    if let Some(v) = get_param("betatce") {
        p.beta_tce = v / 100.0;
    }

    p
}

/// Parse a number with optional SI suffix (f p n u m k meg g t mil).
///
/// Trailing unit letters after the suffix are ignored, so `10kohm` and
/// `2.5mV` parse.
pub fn parse_number(s: &str) -> Option<f64> {
    let lower = s.trim().to_ascii_lowercase();
    if lower.is_empty() {
        return None;
    }

    // Split at the first letter that is not part of an exponent
    let bytes = lower.as_bytes();
    let mut split = bytes.len();
    for i in 0..bytes.len() {
        let c = bytes[i];
        if c.is_ascii_alphabetic() {
            if c == b'e' && i > 0 {
                if let Some(&next) = bytes.get(i + 1) {
                    if next.is_ascii_digit() || next == b'+' || next == b'-' {
                        continue;
                    }
                }
            }
            split = i;
            break;
        }
    }

    let (num, suffix) = lower.split_at(split);
    let exponent = if suffix.starts_with("meg") {
        Some(6)
    } else if suffix.starts_with("mil") {
        return num.parse::<f64>().ok().map(|n| n * 25.4e-6);
    } else {
        match suffix.chars().next() {
            None => Some(0),
            Some('f') => Some(-15),
            Some('p') => Some(-12),
            Some('n') => Some(-9),
            Some('u') => Some(-6),
            Some('m') => Some(-3),
            Some('k') => Some(3),
            Some('g') => Some(9),
            Some('t') => Some(12),
            Some(_) => None,
        }
    };
    let exponent = exponent?;

    if exponent == 0 {
        return num.parse::<f64>().ok();
    }
    // Shift via the exponent so "1.304m" parses to exactly 1.304e-3
    if num.contains('e') {
        num.parse::<f64>().ok().map(|n| n * 10f64.powi(exponent))
    } else {
        format!("{}e{}", num, exponent).parse::<f64>().ok()
    }
}

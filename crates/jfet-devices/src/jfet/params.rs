//! JFET model parameters
//!
//! Contains the JfetParams structure with the SPICE NJF parameters used by
//! the static I-V model, and the default reference device.

use thiserror::Error;

/// Reference temperature of the parameter set [C] (300 K)
pub const REFERENCE_TEMP_C: f64 = 26.85;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("parameter {name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("beta must be > 0, got {0}")]
    NonPositiveBeta(f64),

    #[error("resistance {name} must be >= 0, got {value}")]
    NegativeResistance { name: &'static str, value: f64 },
}

/// JFET Model Parameters
///
/// Parameters follow the SPICE NJF naming:
///
/// - Square law: beta, vto, lambda
/// - Parasitic: rd, rs
/// - Temperature: vto_tc, beta_tce
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JfetParams {
    /// Transconductance coefficient [A/V^2]
    pub beta: f64,
    /// Threshold (pinch-off) voltage [V], negative for depletion devices
    pub vto: f64,
    /// Channel-length modulation [1/V]
    pub lambda: f64,
    /// Drain ohmic resistance [ohm]
    pub rd: f64,
    /// Source ohmic resistance [ohm]
    pub rs: f64,
    /// Threshold temperature coefficient [V/C]
    pub vto_tc: f64,
    /// Beta exponential temperature coefficient, applied linearly [1/C]
    pub beta_tce: f64,
}

impl Default for JfetParams {
    fn default() -> Self {
        Self::n2n3819()
    }
}

impl JfetParams {
    /// 2N3819 N-channel JFET.
    pub fn n2n3819() -> Self {
        Self {
            beta: 1.304e-3,
            vto: -3.0,
            lambda: 2.25e-3,
            rd: 1.0,
            rs: 1.0,
            vto_tc: -2.5e-3,
            beta_tce: -0.5e-2,
        }
    }

    /// Total resistance in series with the channel: Rs + Rd
    pub fn series_resistance(&self) -> f64 {
        self.rs + self.rd
    }

    /// Same device with the parasitic resistances replaced.
    pub fn with_resistances(self, rs: f64, rd: f64) -> Self {
        Self { rs, rd, ..self }
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        let fields = [
            ("beta", self.beta),
            ("vto", self.vto),
            ("lambda", self.lambda),
            ("rd", self.rd),
            ("rs", self.rs),
            ("vtotc", self.vto_tc),
            ("betatce", self.beta_tce),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(ParamError::NotFinite { name, value });
            }
        }
        if self.beta <= 0.0 {
            return Err(ParamError::NonPositiveBeta(self.beta));
        }
        if self.rd < 0.0 {
            return Err(ParamError::NegativeResistance {
                name: "rd",
                value: self.rd,
            });
        }
        if self.rs < 0.0 {
            return Err(ParamError::NegativeResistance {
                name: "rs",
                value: self.rs,
            });
        }
        Ok(())
    }

    /// Zero-gate-voltage drain saturation current: Idss = BETA * VTO^2
    pub fn idss(&self) -> f64 {
        self.beta * self.vto * self.vto
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_2n3819() {
        let p = JfetParams::default();
        assert_eq!(p, JfetParams::n2n3819());
        assert!((p.series_resistance() - 2.0).abs() < 1e-12);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_beta() {
        let p = JfetParams {
            beta: 0.0,
            ..JfetParams::default()
        };
        assert_eq!(p.validate(), Err(ParamError::NonPositiveBeta(0.0)));
    }

    #[test]
    fn test_validate_rejects_negative_resistance() {
        let p = JfetParams::default().with_resistances(-1.0, 0.0);
        assert!(matches!(
            p.validate(),
            Err(ParamError::NegativeResistance { name: "rs", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let p = JfetParams {
            lambda: f64::NAN,
            ..JfetParams::default()
        };
        assert!(matches!(
            p.validate(),
            Err(ParamError::NotFinite { name: "lambda", .. })
        ));
    }

    #[test]
    fn test_idss() {
        let p = JfetParams::default();
        assert!((p.idss() - 1.304e-3 * 9.0).abs() < 1e-12);
    }
}

//! JFET type definitions
//!
//! Contains enums and output structures for JFET model evaluation.

/// Operating region of the JFET
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JfetRegion {
    /// Cutoff: Vgs < Vto (only reported, see `CutoffMode`)
    Cutoff,
    /// Triode/linear: Vds < Vgs - Vto
    Triode,
    /// Saturation: Vds >= Vgs - Vto
    Saturation,
}

impl Default for JfetRegion {
    fn default() -> Self {
        JfetRegion::Cutoff
    }
}

/// How the device equation treats gate voltages below threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoffMode {
    /// No cutoff branch: below threshold the saturation formula still applies,
    /// so the squared overdrive yields a positive current.
    SquareLaw,
    /// Floor the current to zero when Vgs < Vto.
    Clamp,
}

impl Default for CutoffMode {
    fn default() -> Self {
        CutoffMode::SquareLaw
    }
}

impl CutoffMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "square" | "squarelaw" | "square-law" => Some(CutoffMode::SquareLaw),
            "clamp" | "floor" => Some(CutoffMode::Clamp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CutoffMode::SquareLaw => "square",
            CutoffMode::Clamp => "clamp",
        }
    }
}

/// Temperature-corrected model parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempCorrected {
    /// Corrected threshold voltage [V]
    pub vto: f64,
    /// Corrected transconductance coefficient [A/V^2]
    pub beta: f64,
}

/// Output from JFET DC evaluation
#[derive(Debug, Clone, Default)]
pub struct JfetOutput {
    /// Drain current [A]
    pub ids: f64,
    /// Operating region
    pub region: JfetRegion,
    /// Pinch-off voltage Vgs - Vto [V]
    pub vpinch: f64,
}

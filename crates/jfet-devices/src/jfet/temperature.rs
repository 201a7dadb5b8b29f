//! Temperature correction of the threshold voltage and transconductance.
//!
//! ```text
//! VTO(T)  = VTO + VTOTC * (T - Tref)
//! BETA(T) = BETA * (1 + BETATCE * (T - Tref))
//! ```

use super::params::JfetParams;
use super::types::TempCorrected;

/// Corrected threshold and beta at ambient `temp` for a parameter set
/// characterised at `tref`. Both temperatures in C.
pub fn correct_for_temperature(params: &JfetParams, temp: f64, tref: f64) -> TempCorrected {
    let dt = temp - tref;
    TempCorrected {
        vto: params.vto + params.vto_tc * dt,
        beta: params.beta * (1.0 + params.beta_tce * dt),
    }
}

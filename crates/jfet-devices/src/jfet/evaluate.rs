//! JFET DC Evaluation
//!
//! Two-region square-law model with channel-length modulation on both
//! branches:
//!
//! **Triode (Vds < Vgs - Vto)**:
//! - Ids = BETA * Vds * (2*(Vgs - Vto) - Vds) * (1 + LAMBDA*Vds)
//!
//! **Saturation (Vds >= Vgs - Vto)**:
//! - Ids = BETA * (Vgs - Vto)^2 * (1 + LAMBDA*Vds)
//!
//! There is no cutoff branch in the equation itself. With Vgs < Vto the
//! overdrive is negative, Vds sits above it, and the saturation branch
//! squares it into a positive current. `CutoffMode::Clamp` selects the
//! variant that returns zero there instead.

use super::types::{CutoffMode, JfetOutput, JfetRegion, TempCorrected};

/// Instantaneous drain current for already-corrected `beta` and `vto`.
///
/// Total over all real inputs; no clamping.
pub fn drain_current(vgs: f64, vds: f64, lambda: f64, beta: f64, vto: f64) -> f64 {
    let vpinch = vgs - vto;
    if vds < vpinch {
        beta * vds * (2.0 * vpinch - vds) * (1.0 + lambda * vds)
    } else {
        beta * vpinch * vpinch * (1.0 + lambda * vds)
    }
}

/// Evaluate the device at one bias point and report the operating region.
pub fn evaluate_jfet_dc(
    vgs: f64,
    vds: f64,
    lambda: f64,
    corrected: &TempCorrected,
    mode: CutoffMode,
) -> JfetOutput {
    let vpinch = vgs - corrected.vto;

    if vgs < corrected.vto {
        let ids = match mode {
            CutoffMode::Clamp => 0.0,
            CutoffMode::SquareLaw => {
                drain_current(vgs, vds, lambda, corrected.beta, corrected.vto)
            }
        };
        return JfetOutput {
            ids,
            region: JfetRegion::Cutoff,
            vpinch,
        };
    }

    let region = if vds < vpinch {
        JfetRegion::Triode
    } else {
        JfetRegion::Saturation
    };

    JfetOutput {
        ids: drain_current(vgs, vds, lambda, corrected.beta, corrected.vto),
        region,
        vpinch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BETA: f64 = 1.304e-3;
    const VTO: f64 = -3.0;
    const LAMBDA: f64 = 2.25e-3;

    fn corrected() -> TempCorrected {
        TempCorrected {
            vto: VTO,
            beta: BETA,
        }
    }

    #[test]
    fn test_saturation_value() {
        // Vgs = 0: Idss * (1 + lambda*Vds)
        let ids = drain_current(0.0, 10.0, LAMBDA, BETA, VTO);
        let expected = BETA * 9.0 * (1.0 + LAMBDA * 10.0);
        assert!((ids - expected).abs() < 1e-15);
    }

    #[test]
    fn test_triode_value() {
        let ids = drain_current(0.0, 1.0, LAMBDA, BETA, VTO);
        let expected = BETA * 1.0 * (6.0 - 1.0) * (1.0 + LAMBDA);
        assert!((ids - expected).abs() < 1e-15);
    }

    #[test]
    fn test_continuous_at_pinch_off() {
        let vp = 0.0 - VTO;
        let below = drain_current(0.0, vp - 1e-9, LAMBDA, BETA, VTO);
        let at = drain_current(0.0, vp, LAMBDA, BETA, VTO);
        assert!((below - at).abs() < 1e-9);
    }

    #[test]
    fn test_zero_vds_gives_zero_current() {
        assert_eq!(drain_current(-1.0, 0.0, LAMBDA, BETA, VTO), 0.0);
    }

    #[test]
    fn test_below_threshold_squares_overdrive() {
        // Vgs - Vto = -1; falls through to saturation
        let ids = drain_current(-4.0, 5.0, LAMBDA, BETA, VTO);
        assert!(ids > 0.0);
        assert!((ids - BETA * (1.0 + LAMBDA * 5.0)).abs() < 1e-15);
    }

    #[test]
    fn test_regions() {
        let c = corrected();
        let out = evaluate_jfet_dc(0.0, 1.0, LAMBDA, &c, CutoffMode::SquareLaw);
        assert_eq!(out.region, JfetRegion::Triode);
        let out = evaluate_jfet_dc(0.0, 5.0, LAMBDA, &c, CutoffMode::SquareLaw);
        assert_eq!(out.region, JfetRegion::Saturation);
        assert!((out.vpinch - 3.0).abs() < 1e-12);
        let out = evaluate_jfet_dc(-4.0, 5.0, LAMBDA, &c, CutoffMode::SquareLaw);
        assert_eq!(out.region, JfetRegion::Cutoff);
        assert!(out.ids > 0.0);
    }

    #[test]
    fn test_clamp_floors_cutoff() {
        let c = corrected();
        let out = evaluate_jfet_dc(-4.0, 5.0, LAMBDA, &c, CutoffMode::Clamp);
        assert_eq!(out.region, JfetRegion::Cutoff);
        assert_eq!(out.ids, 0.0);
        // Above threshold both modes agree
        let a = evaluate_jfet_dc(-1.0, 5.0, LAMBDA, &c, CutoffMode::Clamp);
        let b = evaluate_jfet_dc(-1.0, 5.0, LAMBDA, &c, CutoffMode::SquareLaw);
        assert_eq!(a.ids, b.ids);
    }

    #[test]
    fn test_ids_increases_with_vgs() {
        let i1 = drain_current(-2.0, 10.0, LAMBDA, BETA, VTO);
        let i2 = drain_current(-1.0, 10.0, LAMBDA, BETA, VTO);
        let i3 = drain_current(0.0, 10.0, LAMBDA, BETA, VTO);
        assert!(i2 > i1);
        assert!(i3 > i2);
    }
}

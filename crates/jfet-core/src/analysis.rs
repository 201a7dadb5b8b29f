use crate::error::{Result, SweepError};
use crate::sweep::SweepBounds;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceConfig {
    /// Absolute current tolerance between successive iterates [A]
    pub tolerance: f64,
    pub max_iters: usize,
}

impl ConvergenceConfig {
    /// Reject settings the self-bias loop cannot honor: a zero iteration
    /// cap or a negative (or NaN) tolerance.
    pub fn validate(&self) -> Result<()> {
        if self.max_iters == 0 {
            return Err(SweepError::InvalidConfig(
                "max iterations must be > 0".to_string(),
            ));
        }
        if !(self.tolerance >= 0.0) {
            return Err(SweepError::InvalidConfig(format!(
                "tolerance must be >= 0, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iters: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceState {
    pub iter: usize,
    pub last_delta: f64,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisCmd {
    Point { vgs: f64, vds: f64 },
    Sweep(SweepBounds),
}

#[derive(Debug, Clone)]
pub struct AnalysisPlan {
    pub cmd: AnalysisCmd,
}

pub fn debug_dump_analysis(plan: &AnalysisPlan) {
    println!("analysis: {:?}", plan.cmd);
}

/// Successive iterates are settled once they differ by at most `tol`.
/// A NaN difference never counts as settled.
pub fn is_settled(prev: f64, next: f64, tol: f64) -> bool {
    (next - prev).abs() <= tol
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settled_within_tolerance() {
        assert!(is_settled(1.0, 1.0 + 1e-7, 1e-6));
        assert!(!is_settled(1.0, 1.1, 1e-6));
        assert!(!is_settled(f64::NAN, 1.0, 1e-6));
    }

    #[test]
    fn convergence_config_rejects_unusable_settings() {
        assert!(ConvergenceConfig::default().validate().is_ok());
        let zero_cap = ConvergenceConfig {
            tolerance: 1e-6,
            max_iters: 0,
        };
        assert!(matches!(zero_cap.validate(), Err(SweepError::InvalidConfig(_))));
        let negative = ConvergenceConfig {
            tolerance: -1.0,
            max_iters: 5,
        };
        assert!(matches!(negative.validate(), Err(SweepError::InvalidConfig(_))));
        let nan = ConvergenceConfig {
            tolerance: f64::NAN,
            max_iters: 5,
        };
        assert!(nan.validate().is_err());
    }
}

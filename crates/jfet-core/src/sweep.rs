//! Output characteristic sweep.
//!
//! Builds the V_GS and V_DS axes and resolves the self-bias current at every
//! grid point. Rows follow V_DS, columns follow V_GS. Axis samples are
//! computed as `start + i * step` so long sweeps do not drift, and the last
//! sample is clipped to the upper bound.

use jfet_devices::jfet::{correct_for_temperature, CutoffMode, JfetParams, TempCorrected, REFERENCE_TEMP_C};

use crate::analysis::ConvergenceConfig;
use crate::error::{Axis, Result, SweepError};
use crate::solver::solve_corrected;

/// Relative slack on span/step so 10.0/0.1 counts 101 samples.
const COUNT_GUARD: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepAxis {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl SweepAxis {
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    pub fn validate(&self, axis: Axis) -> Result<()> {
        let invalid = |reason: String| SweepError::InvalidRange { axis, reason };
        if !self.start.is_finite() || !self.stop.is_finite() {
            return Err(invalid(format!(
                "bounds must be finite ({} .. {})",
                self.start, self.stop
            )));
        }
        if !(self.step > 0.0) || !self.step.is_finite() {
            return Err(invalid(format!("step must be > 0, got {}", self.step)));
        }
        if self.stop < self.start {
            return Err(invalid(format!(
                "upper bound {} is below lower bound {}",
                self.stop, self.start
            )));
        }
        Ok(())
    }

    /// Number of samples, `floor(|stop - start| / step) + 1`.
    ///
    /// Returns `None` when the count does not fit in memory-addressable
    /// sizes. Only meaningful for an axis that passed `validate`.
    pub fn count(&self) -> Option<usize> {
        let span = (self.stop - self.start).abs();
        let steps = (span / self.step * (1.0 + COUNT_GUARD)).floor();
        if !steps.is_finite() || steps >= isize::MAX as f64 {
            return None;
        }
        (steps as usize).checked_add(1)
    }

    pub fn value(&self, index: usize) -> f64 {
        (self.start + index as f64 * self.step).min(self.stop)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepBounds {
    pub vgs_low: f64,
    pub vgs_high: f64,
    pub vds_low: f64,
    pub vds_high: f64,
}

impl Default for SweepBounds {
    /// V_GS from -3 V to 0 V, V_DS from 0 V to V_DD = 10 V.
    fn default() -> Self {
        Self {
            vgs_low: -3.0,
            vgs_high: 0.0,
            vds_low: 0.0,
            vds_high: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepConfig {
    /// Ambient temperature [C]
    pub temperature: f64,
    /// Parameter reference temperature [C]
    pub reference_temperature: f64,
    pub vgs_step: f64,
    pub vds_step: f64,
    pub convergence: ConvergenceConfig,
    pub cutoff: CutoffMode,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            temperature: REFERENCE_TEMP_C,
            reference_temperature: REFERENCE_TEMP_C,
            vgs_step: 1.0,
            vds_step: 0.1,
            convergence: ConvergenceConfig::default(),
            cutoff: CutoffMode::SquareLaw,
        }
    }
}

/// Drain current surface over the V_GS x V_DS grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacteristicGrid {
    /// V_GS samples, ascending (columns)
    pub vgs: Vec<f64>,
    /// V_DS samples, ascending (rows)
    pub vds: Vec<f64>,
    /// Drain current [mA], row-major, `vds.len() * vgs.len()` entries
    pub current_ma: Vec<f64>,
    /// Grid points where the solver hit the iteration cap
    pub unconverged: usize,
}

impl CharacteristicGrid {
    pub fn rows(&self) -> usize {
        self.vds.len()
    }

    pub fn cols(&self) -> usize {
        self.vgs.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        self.current_ma.get(row * self.cols() + col).copied()
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        let cols = self.cols();
        self.current_ma.get(row * cols..(row + 1) * cols)
    }

    /// Current along V_DS for one V_GS sample.
    pub fn column(&self, col: usize) -> Option<Vec<f64>> {
        if col >= self.cols() {
            return None;
        }
        Some(
            self.current_ma
                .chunks(self.cols())
                .map(|row| row[col])
                .collect(),
        )
    }

    pub fn is_fully_converged(&self) -> bool {
        self.unconverged == 0
    }
}

/// Validated sweep ready for allocation and evaluation.
struct SweepPlan<'a> {
    params: &'a JfetParams,
    corrected: TempCorrected,
    config: &'a SweepConfig,
    vgs_axis: SweepAxis,
    vds_axis: SweepAxis,
    cols: usize,
    rows: usize,
}

impl<'a> SweepPlan<'a> {
    fn new(params: &'a JfetParams, config: &'a SweepConfig, bounds: &SweepBounds) -> Result<Self> {
        let vgs_axis = SweepAxis::new(bounds.vgs_low, bounds.vgs_high, config.vgs_step);
        let vds_axis = SweepAxis::new(bounds.vds_low, bounds.vds_high, config.vds_step);
        vgs_axis.validate(Axis::Vgs)?;
        vds_axis.validate(Axis::Vds)?;

        config.convergence.validate()?;
        params.validate()?;

        let cols = vgs_axis.count().ok_or(SweepError::Allocation {
            what: "V_GS axis",
            len: usize::MAX,
        })?;
        let rows = vds_axis.count().ok_or(SweepError::Allocation {
            what: "V_DS axis",
            len: usize::MAX,
        })?;

        Ok(Self {
            params,
            corrected: correct_for_temperature(
                params,
                config.temperature,
                config.reference_temperature,
            ),
            config,
            vgs_axis,
            vds_axis,
            cols,
            rows,
        })
    }

    fn allocate(&self) -> Result<CharacteristicGrid> {
        let cells = self.rows.checked_mul(self.cols).ok_or(SweepError::Allocation {
            what: "current matrix",
            len: usize::MAX,
        })?;
        let mut vgs = try_alloc("V_GS axis", self.cols)?;
        let mut vds = try_alloc("V_DS axis", self.rows)?;
        let mut current_ma = try_alloc("current matrix", cells)?;

        vgs.extend((0..self.cols).map(|i| self.vgs_axis.value(i)));
        vds.extend((0..self.rows).map(|i| self.vds_axis.value(i)));
        current_ma.resize(cells, 0.0);

        Ok(CharacteristicGrid {
            vgs,
            vds,
            current_ma,
            unconverged: 0,
        })
    }

    /// Fill one V_DS row; returns the number of unconverged points.
    fn solve_row(&self, vds: f64, vgs_samples: &[f64], out: &mut [f64]) -> usize {
        let mut unconverged = 0;
        for (cell, &vgs) in out.iter_mut().zip(vgs_samples) {
            let solution = solve_corrected(
                self.params,
                &self.corrected,
                vgs,
                vds,
                &self.config.convergence,
                self.config.cutoff,
            );
            *cell = solution.ids_ma();
            if !solution.converged() {
                unconverged += 1;
            }
        }
        unconverged
    }
}

fn try_alloc(what: &'static str, len: usize) -> Result<Vec<f64>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| SweepError::Allocation { what, len })?;
    Ok(v)
}

fn finish(grid: &CharacteristicGrid) {
    log::debug!(
        "sweep: {} x {} points, unconverged={}",
        grid.rows(),
        grid.cols(),
        grid.unconverged
    );
    if grid.unconverged > 0 {
        log::warn!(
            "sweep: {} of {} points hit the iteration cap",
            grid.unconverged,
            grid.current_ma.len()
        );
    }
}

pub fn debug_dump_grid(grid: &CharacteristicGrid) {
    println!(
        "grid: vgs={}..{} ({} pts) vds={}..{} ({} pts) unconverged={}",
        grid.vgs.first().copied().unwrap_or(0.0),
        grid.vgs.last().copied().unwrap_or(0.0),
        grid.cols(),
        grid.vds.first().copied().unwrap_or(0.0),
        grid.vds.last().copied().unwrap_or(0.0),
        grid.rows(),
        grid.unconverged
    );
}

/// Evaluate the drain current over the full grid.
///
/// Fails before allocating anything if either axis is degenerate.
pub fn sweep(
    params: &JfetParams,
    config: &SweepConfig,
    bounds: &SweepBounds,
) -> Result<CharacteristicGrid> {
    let plan = SweepPlan::new(params, config, bounds)?;
    let mut grid = plan.allocate()?;

    let cols = plan.cols;
    let mut unconverged = 0;
    for (row, out) in grid.current_ma.chunks_mut(cols).enumerate() {
        unconverged += plan.solve_row(grid.vds[row], &grid.vgs, out);
    }
    grid.unconverged = unconverged;

    finish(&grid);
    Ok(grid)
}

/// Same grid as `sweep`, with rows evaluated on the rayon thread pool.
#[cfg(feature = "parallel")]
pub fn sweep_parallel(
    params: &JfetParams,
    config: &SweepConfig,
    bounds: &SweepBounds,
) -> Result<CharacteristicGrid> {
    use rayon::prelude::*;

    let plan = SweepPlan::new(params, config, bounds)?;
    let mut grid = plan.allocate()?;

    let cols = plan.cols;
    let vgs = &grid.vgs;
    let vds = &grid.vds;
    grid.unconverged = grid
        .current_ma
        .par_chunks_mut(cols)
        .enumerate()
        .map(|(row, out)| plan.solve_row(vds[row], vgs, out))
        .sum();

    finish(&grid);
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_count_handles_decimal_step() {
        assert_eq!(SweepAxis::new(0.0, 10.0, 0.1).count(), Some(101));
        assert_eq!(SweepAxis::new(-3.0, 0.0, 1.0).count(), Some(4));
        assert_eq!(SweepAxis::new(0.0, 0.0, 0.5).count(), Some(1));
        assert_eq!(SweepAxis::new(0.0, 1.0, 0.3).count(), Some(4));
    }

    #[test]
    fn axis_values_are_index_based_and_clipped() {
        let axis = SweepAxis::new(0.0, 10.0, 0.1);
        assert_eq!(axis.value(0), 0.0);
        assert_eq!(axis.value(100), 10.0);
        assert!((axis.value(37) - 3.7).abs() < 1e-12);
        let axis = SweepAxis::new(0.0, 1.0, 0.3);
        assert!(axis.value(3) <= 1.0);
    }

    #[test]
    fn axis_rejects_bad_ranges() {
        assert!(SweepAxis::new(1.0, 0.0, 0.1).validate(Axis::Vds).is_err());
        assert!(SweepAxis::new(0.0, 1.0, 0.0).validate(Axis::Vds).is_err());
        assert!(SweepAxis::new(0.0, 1.0, -0.1).validate(Axis::Vds).is_err());
        assert!(SweepAxis::new(0.0, 1.0, f64::NAN).validate(Axis::Vds).is_err());
        assert!(SweepAxis::new(f64::NEG_INFINITY, 1.0, 0.1).validate(Axis::Vds).is_err());
        assert!(SweepAxis::new(0.0, 1.0, 0.1).validate(Axis::Vds).is_ok());
    }

    #[test]
    fn axis_count_overflow_is_none() {
        assert_eq!(SweepAxis::new(0.0, 1e300, 1e-300).count(), None);
    }

    #[test]
    fn grid_accessors() {
        let grid = CharacteristicGrid {
            vgs: vec![-1.0, 0.0],
            vds: vec![0.0, 1.0, 2.0],
            current_ma: vec![0.0, 0.0, 1.0, 2.0, 3.0, 4.0],
            unconverged: 0,
        };
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 2);
        assert_eq!(grid.get(2, 1), Some(4.0));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 2), None);
        assert_eq!(grid.row(1), Some(&[1.0, 2.0][..]));
        assert_eq!(grid.row(3), None);
        assert_eq!(grid.column(0), Some(vec![0.0, 1.0, 3.0]));
        assert_eq!(grid.column(2), None);
    }
}

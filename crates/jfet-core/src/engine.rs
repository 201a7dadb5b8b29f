use jfet_devices::jfet::JfetParams;

use crate::analysis::{AnalysisCmd, AnalysisPlan};
use crate::error::SweepError;
use crate::result_store::{AnalysisType, ResultStore, RunId, RunPayload, RunResult, RunStatus};
use crate::solver::{solve_self_bias, OperatingPoint, SelfBiasSolution};
use crate::sweep::{sweep, CharacteristicGrid, SweepBounds, SweepConfig};

/// Device and run settings shared by every analysis it runs.
#[derive(Debug, Clone)]
pub struct Engine {
    pub params: JfetParams,
    pub config: SweepConfig,
}

impl Engine {
    pub fn new(params: JfetParams, config: SweepConfig) -> Self {
        Self { params, config }
    }

    pub fn new_default() -> Self {
        Self::new(JfetParams::default(), SweepConfig::default())
    }

    pub fn run_point(&self, vgs: f64, vds: f64) -> SelfBiasSolution {
        let op = OperatingPoint::new(vgs, vds)
            .with_temperature(self.config.temperature, self.config.reference_temperature);
        solve_self_bias(&self.params, &op, &self.config.convergence, self.config.cutoff)
    }

    pub fn run_sweep(&self, bounds: &SweepBounds) -> Result<CharacteristicGrid, SweepError> {
        sweep(&self.params, &self.config, bounds)
    }

    /// Run a plan; setup errors are returned instead of recorded.
    pub fn try_run(&self, plan: &AnalysisPlan) -> Result<RunResult, SweepError> {
        log::debug!("engine: run {:?}", plan.cmd);
        match &plan.cmd {
            AnalysisCmd::Point { vgs, vds } => {
                self.config.convergence.validate()?;
                self.params.validate()?;
                Ok(self.run_point_result(*vgs, *vds))
            }
            AnalysisCmd::Sweep(bounds) => self.run_sweep(bounds).map(sweep_result),
        }
    }

    /// Run a plan; failures become a `Failed` run carrying the message.
    pub fn run(&self, plan: &AnalysisPlan) -> RunResult {
        let analysis = match plan.cmd {
            AnalysisCmd::Point { .. } => AnalysisType::Point,
            AnalysisCmd::Sweep(_) => AnalysisType::Sweep,
        };
        self.try_run(plan).unwrap_or_else(|err| RunResult {
            id: RunId(0),
            analysis,
            status: RunStatus::Failed,
            iterations: 0,
            payload: RunPayload::Empty,
            message: Some(err.to_string()),
        })
    }

    pub fn run_with_store(&self, plan: &AnalysisPlan, store: &mut ResultStore) -> RunId {
        store.add_run(self.run(plan))
    }

    fn run_point_result(&self, vgs: f64, vds: f64) -> RunResult {
        let solution = self.run_point(vgs, vds);
        let (status, message) = if solution.converged() {
            (RunStatus::Converged, None)
        } else {
            (
                RunStatus::MaxIters,
                Some(format!(
                    "no convergence after {} iterations, last delta {:e} A",
                    solution.state.iter, solution.state.last_delta
                )),
            )
        };
        RunResult {
            id: RunId(0),
            analysis: AnalysisType::Point,
            status,
            iterations: solution.state.iter,
            payload: RunPayload::Point(solution),
            message,
        }
    }
}

fn sweep_result(grid: CharacteristicGrid) -> RunResult {
    let (status, message) = if grid.is_fully_converged() {
        (RunStatus::Converged, None)
    } else {
        (
            RunStatus::MaxIters,
            Some(format!("{} grid points hit the iteration cap", grid.unconverged)),
        )
    };
    RunResult {
        id: RunId(0),
        analysis: AnalysisType::Sweep,
        status,
        iterations: grid.current_ma.len(),
        payload: RunPayload::Sweep(grid),
        message,
    }
}

pub fn debug_dump_engine(engine: &Engine) {
    println!(
        "engine: beta={:e} vto={} idss={:e} lambda={:e} rs={} rd={} T={} Tref={} cutoff={}",
        engine.params.beta,
        engine.params.vto,
        engine.params.idss(),
        engine.params.lambda,
        engine.params.rs,
        engine.params.rd,
        engine.config.temperature,
        engine.config.reference_temperature,
        engine.config.cutoff.as_str()
    );
}

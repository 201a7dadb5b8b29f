use crate::solver::SelfBiasSolution;
use crate::sweep::CharacteristicGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisType {
    Point,
    Sweep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Converged,
    MaxIters,
    Failed,
}

#[derive(Debug, Clone)]
pub enum RunPayload {
    Point(SelfBiasSolution),
    Sweep(CharacteristicGrid),
    Empty,
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub id: RunId,
    pub analysis: AnalysisType,
    pub status: RunStatus,
    /// Solver iterations for a point, grid points for a sweep
    pub iterations: usize,
    pub payload: RunPayload,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    pub runs: Vec<RunResult>,
    /// Keep at most this many runs, dropping the oldest
    limit: Option<usize>,
    /// Runs dropped so far; `runs[0]` has id `evicted`
    evicted: usize,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that holds at most `max_runs` results (at least one).
    /// Ids keep increasing; evicted ids are no longer found.
    pub fn with_limit(max_runs: usize) -> Self {
        Self {
            limit: Some(max_runs.max(1)),
            ..Self::default()
        }
    }

    pub fn add_run(&mut self, mut run: RunResult) -> RunId {
        if let Some(limit) = self.limit {
            if self.runs.len() >= limit {
                let drop = self.runs.len() + 1 - limit;
                self.runs.drain(..drop);
                self.evicted += drop;
            }
        }
        let id = RunId(self.evicted + self.runs.len());
        run.id = id;
        self.runs.push(run);
        id
    }

    pub fn get(&self, id: RunId) -> Option<&RunResult> {
        self.runs.get(id.0.checked_sub(self.evicted)?)
    }

    pub fn write_psf_text(
        &self,
        id: RunId,
        path: &std::path::Path,
        precision: usize,
    ) -> std::io::Result<()> {
        let run = self
            .get(id)
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "run not found"))?;
        crate::psf::write_psf_text(run, path, precision)
    }
}

pub fn debug_dump_result_store(store: &ResultStore) {
    println!(
        "result_store: runs={} evicted={}",
        store.runs.len(),
        store.evicted
    );
}

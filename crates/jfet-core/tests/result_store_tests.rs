use jfet_core::result_store::{AnalysisType, ResultStore, RunId, RunPayload, RunResult, RunStatus};

fn empty_run() -> RunResult {
    RunResult {
        id: RunId(7),
        analysis: AnalysisType::Point,
        status: RunStatus::Converged,
        iterations: 3,
        payload: RunPayload::Empty,
        message: None,
    }
}

#[test]
fn result_store_adds_run() {
    let mut store = ResultStore::new();
    let run = empty_run();
    let id = store.add_run(run.clone());
    assert_eq!(id.0, 0);
    assert_eq!(store.runs.len(), 1);
    assert_eq!(store.get(id).unwrap().id, RunId(0));

    let id = store.add_run(run);
    assert_eq!(id, RunId(1));
    assert!(store.get(RunId(2)).is_none());
}

#[test]
fn limited_store_drops_oldest_runs() {
    let mut store = ResultStore::with_limit(2);
    let first = store.add_run(empty_run());
    let second = store.add_run(empty_run());
    let third = store.add_run(empty_run());

    assert_eq!(third, RunId(2));
    assert_eq!(store.runs.len(), 2);
    assert!(store.get(first).is_none());
    assert_eq!(store.get(second).unwrap().id, second);
    assert_eq!(store.get(third).unwrap().id, third);
    assert!(store.get(RunId(3)).is_none());
}

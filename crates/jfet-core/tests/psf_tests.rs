use jfet_core::analysis::{AnalysisCmd, AnalysisPlan};
use jfet_core::engine::Engine;
use jfet_core::result_store::ResultStore;
use jfet_core::psf::write_psf_sweep;
use jfet_core::sweep::{CharacteristicGrid, SweepBounds};

#[test]
fn psf_text_writer_outputs_sweep() {
    let engine = Engine::new_default();
    let mut store = ResultStore::new();
    let plan = AnalysisPlan {
        cmd: AnalysisCmd::Sweep(SweepBounds::default()),
    };
    let run_id = engine.run_with_store(&plan, &mut store);

    let mut path = std::env::temp_dir();
    path.push("jfetsim_psf_sweep_test.txt");
    store.write_psf_text(run_id, &path, 4).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("PSF_TEXT"));
    assert!(content.contains("analysis=Sweep"));
    assert!(content.contains("status=Converged"));
    assert!(content.contains("points=101"));
    assert!(content.contains("- I_D(V_GS=-3)"));
    assert!(content.contains("- I_D(V_GS=0)"));
    let values = content.split("values:\n").nth(1).unwrap();
    assert_eq!(values.lines().count(), 101);
}

#[test]
fn psf_text_writer_outputs_point() {
    let engine = Engine::new_default();
    let mut store = ResultStore::new();
    let plan = AnalysisPlan {
        cmd: AnalysisCmd::Point { vgs: 0.0, vds: 10.0 },
    };
    let run_id = engine.run_with_store(&plan, &mut store);

    let mut path = std::env::temp_dir();
    path.push("jfetsim_psf_point_test.txt");
    store.write_psf_text(run_id, &path, 6).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("analysis=Point"));
    assert!(content.contains("I_D 1.199943e-2"));
}

#[test]
fn missing_run_is_not_found() {
    let store = ResultStore::new();
    let path = std::env::temp_dir().join("jfetsim_psf_missing.txt");
    let err = store
        .write_psf_text(jfet_core::result_store::RunId(3), &path, 4)
        .unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}

#[test]
fn psf_sweep_writer_outputs_grid() {
    let grid = CharacteristicGrid {
        vgs: vec![-1.0, 0.0],
        vds: vec![0.0, 5.0, 10.0],
        current_ma: vec![0.0, 0.0, 3.5, 11.8, 3.6, 12.0],
        unconverged: 0,
    };
    let path = std::env::temp_dir().join("jfetsim_psf_grid_test.txt");
    write_psf_sweep(&grid, &path, 2).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "PSF_TEXT",
            "analysis=Sweep",
            "sweep=V_DS",
            "points=3",
            "signals:",
            "- I_D(V_GS=-1)",
            "- I_D(V_GS=0)",
            "values:",
            "0.00e0 0.00e0 0.00e0",
            "5.00e0 3.50e0 1.18e1",
            "1.00e1 3.60e0 1.20e1",
        ]
    );
}

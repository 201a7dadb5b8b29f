use crate::result_store::{RunPayload, RunResult};
use crate::sweep::CharacteristicGrid;
use std::fs;
use std::path::Path;

pub fn write_psf_text(run: &RunResult, path: &Path, precision: usize) -> std::io::Result<()> {
    let mut out = String::new();
    out.push_str("PSF_TEXT\n");
    out.push_str(&format!("analysis={:?}\n", run.analysis));
    out.push_str(&format!("status={:?}\n", run.status));
    out.push_str(&format!("iterations={}\n", run.iterations));
    match &run.payload {
        RunPayload::Point(sol) => {
            out.push_str("signals:\n");
            out.push_str("- I_D\n- V_DS_int\n");
            out.push_str("values:\n");
            out.push_str(&format!("I_D {:.*e}\n", precision, sol.ids));
            out.push_str(&format!("V_DS_int {:.*e}\n", precision, sol.vds_internal));
        }
        RunPayload::Sweep(grid) => push_sweep(&mut out, grid, precision),
        RunPayload::Empty => {}
    }
    fs::write(path, out)
}

/// Write a characteristic grid as PSF text: one signal per V_GS sample,
/// one value line per V_DS sample. Currents in mA.
pub fn write_psf_sweep(grid: &CharacteristicGrid, path: &Path, precision: usize) -> std::io::Result<()> {
    let mut out = String::new();
    out.push_str("PSF_TEXT\n");
    out.push_str("analysis=Sweep\n");
    push_sweep(&mut out, grid, precision);
    fs::write(path, out)
}

fn push_sweep(out: &mut String, grid: &CharacteristicGrid, precision: usize) {
    out.push_str("sweep=V_DS\n");
    out.push_str(&format!("points={}\n", grid.rows()));
    out.push_str("signals:\n");
    for vgs in &grid.vgs {
        out.push_str(&format!("- I_D(V_GS={})\n", vgs));
    }
    out.push_str("values:\n");
    for (row, vds) in grid.vds.iter().enumerate() {
        out.push_str(&format!("{:.*e}", precision, vds));
        for value in grid.row(row).unwrap_or(&[]) {
            out.push_str(&format!(" {:.*e}", precision, value));
        }
        out.push('\n');
    }
}

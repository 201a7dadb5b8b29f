//! Tab-separated current table, one row per V_DS sample.
//!
//! ```text
//! V_DS	I_D(U_GS=-3.0V)	I_D(U_GS=-2.0V)	...
//! 0.00	0.0000		0.0000		...
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::sweep::CharacteristicGrid;

pub const DEFAULT_PRECISION: usize = 4;

pub fn write_table<W: Write>(grid: &CharacteristicGrid, precision: usize, out: &mut W) -> io::Result<()> {
    write!(out, "V_DS\t")?;
    for vgs in &grid.vgs {
        write!(out, "I_D(U_GS={:.1}V)\t", vgs)?;
    }
    writeln!(out)?;

    for (row, vds) in grid.vds.iter().enumerate() {
        write!(out, "{:.2}\t", vds)?;
        for value in grid.row(row).unwrap_or(&[]) {
            write!(out, "{:.*}\t\t", precision, value)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn format_table(grid: &CharacteristicGrid, precision: usize) -> String {
    let mut buf = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_table(grid, precision, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn write_csv(grid: &CharacteristicGrid, path: &Path) -> io::Result<()> {
    let mut out = String::from("vds");
    for vgs in &grid.vgs {
        out.push_str(&format!(",id_ma_vgs_{}", vgs));
    }
    out.push('\n');
    for (row, vds) in grid.vds.iter().enumerate() {
        out.push_str(&vds.to_string());
        for value in grid.row(row).unwrap_or(&[]) {
            out.push(',');
            out.push_str(&value.to_string());
        }
        out.push('\n');
    }
    fs::write(path, out)
}

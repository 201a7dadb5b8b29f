use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use jfet_api::http::{self, HttpServerConfig};
use jfet_core::analysis::{debug_dump_analysis, AnalysisCmd, AnalysisPlan};
use jfet_core::engine::{debug_dump_engine, Engine};
use jfet_core::result_store::{debug_dump_result_store, ResultStore, RunId, RunPayload, RunStatus};
use jfet_core::sweep::{debug_dump_grid, SweepBounds, SweepConfig};
use jfet_core::table::{write_csv, write_table, DEFAULT_PRECISION};
use jfet_devices::jfet::{
    apply_jfet_params, jfet_by_name, jfet_model_names, parse_model_library, parse_number,
    CutoffMode, JfetParams, KNOWN_KEYS,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_MODEL: &str = "2N3819";

fn print_help() {
    println!(
        r#"JFET static I-V characteristic solver

USAGE:
    jfet-cli [OPTIONS]

OPTIONS:
    -h, --help              Print help information
    -V, --version           Print version information
    -m, --model <NAME>      Embedded model (default: 2N3819)
    --model-file <PATH>     Load NJF .model cards from a file
    --model-name <NAME>     Card to use from --model-file (default: first)
    -p, --param <KEY=VALUE> Override a model parameter (beta vto lambda rd rs
                            vtotc betatce); repeatable
    --vgs-start <V>         Gate-source sweep start (default: -3)
    --vgs-stop <V>          Gate-source sweep stop (default: 0)
    --vgs-step <V>          Gate-source sweep step (default: 1)
    --vds-start <V>         Drain-source sweep start (default: 0)
    --vds-stop <V>          Drain-source sweep stop (default: 10)
    --vds-step <V>          Drain-source sweep step (default: 0.1)
    -t, --temp <C>          Device temperature in C (default: 26.85)
    --tref <C>              Reference temperature in C (default: 26.85)
    --tol <A>               Self-bias tolerance in A (default: 1e-6)
    --max-iter <N>          Self-bias iteration cap (default: 100)
    --cutoff <MODE>         Below-threshold behavior: square, clamp (default: square)
    --precision <N>         Decimals in the current table (0-15, default: 4)
    --point <VGS,VDS>       Solve a single bias point instead of sweeping
    -o, --psf <PATH>        Write results to PSF text file
    --csv <PATH>            Write the sweep grid as CSV
    --serve <ADDR>          Run the HTTP API on ADDR (e.g. 127.0.0.1:8080)
    -v, --verbose           Print engine and run summaries
    --list-models           List embedded models

EXAMPLES:
    jfet-cli                                     # 2N3819 output characteristics
    jfet-cli --temp 85 --psf hot.psf             # Heated device, PSF export
    jfet-cli --model 2N5457 --vds-step 0.5       # Coarser sweep of another part
    jfet-cli --point -1,5 --param rs=100         # Single self-bias solve
    jfet-cli --serve 127.0.0.1:8080              # HTTP API"#
    );
}

fn print_version() {
    println!("jfet-cli {}", VERSION);
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> String {
    let Some(value) = args.next() else {
        eprintln!("missing value for {}", flag);
        std::process::exit(2);
    };
    value
}

fn parse_value(flag: &str, value: &str) -> f64 {
    match parse_number(value) {
        Some(v) if v.is_finite() => v,
        _ => {
            eprintln!("invalid value for {}: {}", flag, value);
            std::process::exit(2);
        }
    }
}

fn main() {
    let mut args = env::args().skip(1);
    let mut model: Option<String> = None;
    let mut model_file: Option<PathBuf> = None;
    let mut model_name: Option<String> = None;
    let mut overrides: HashMap<String, String> = HashMap::new();
    let mut bounds = SweepBounds::default();
    let mut config = SweepConfig::default();
    let mut precision = DEFAULT_PRECISION;
    let mut point: Option<(f64, f64)> = None;
    let mut psf_path: Option<PathBuf> = None;
    let mut csv_path: Option<PathBuf> = None;
    let mut serve: Option<String> = None;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                print_version();
                std::process::exit(0);
            }
            "--list-models" => {
                for name in jfet_model_names() {
                    println!("{}", name);
                }
                std::process::exit(0);
            }
            "--model" | "-m" => model = Some(next_value(&mut args, &arg)),
            "--model-file" => model_file = Some(PathBuf::from(next_value(&mut args, &arg))),
            "--model-name" => model_name = Some(next_value(&mut args, &arg)),
            "--param" | "-p" => {
                let value = next_value(&mut args, &arg);
                let Some((key, val)) = value.split_once('=') else {
                    eprintln!("expected KEY=VALUE for {}: {}", arg, value);
                    std::process::exit(2);
                };
                let key = key.trim().to_ascii_lowercase();
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    eprintln!("unknown parameter: {}", key);
                    std::process::exit(2);
                }
                parse_value(&arg, val);
                overrides.insert(key, val.trim().to_string());
            }
            "--vgs-start" => bounds.vgs_low = parse_value(&arg, &next_value(&mut args, &arg)),
            "--vgs-stop" => bounds.vgs_high = parse_value(&arg, &next_value(&mut args, &arg)),
            "--vgs-step" => config.vgs_step = parse_value(&arg, &next_value(&mut args, &arg)),
            "--vds-start" => bounds.vds_low = parse_value(&arg, &next_value(&mut args, &arg)),
            "--vds-stop" => bounds.vds_high = parse_value(&arg, &next_value(&mut args, &arg)),
            "--vds-step" => config.vds_step = parse_value(&arg, &next_value(&mut args, &arg)),
            "--temp" | "-t" => config.temperature = parse_value(&arg, &next_value(&mut args, &arg)),
            "--tref" => {
                config.reference_temperature = parse_value(&arg, &next_value(&mut args, &arg))
            }
            "--tol" => config.convergence.tolerance = parse_value(&arg, &next_value(&mut args, &arg)),
            "--max-iter" => {
                let value = next_value(&mut args, &arg);
                config.convergence.max_iters = match value.parse::<usize>() {
                    Ok(n) => n,
                    Err(_) => {
                        eprintln!("invalid value for {}: {}", arg, value);
                        std::process::exit(2);
                    }
                };
            }
            "--cutoff" => {
                let value = next_value(&mut args, &arg);
                config.cutoff = match CutoffMode::parse(&value) {
                    Some(mode) => mode,
                    None => {
                        eprintln!("cutoff must be 'square' or 'clamp'");
                        std::process::exit(2);
                    }
                };
            }
            "--precision" => {
                let value = next_value(&mut args, &arg);
                precision = match value.parse::<usize>() {
                    Ok(p) if p <= 15 => p,
                    _ => {
                        eprintln!("precision must be between 0 and 15");
                        std::process::exit(2);
                    }
                };
            }
            "--point" => {
                let value = next_value(&mut args, &arg);
                let Some((vgs, vds)) = value.split_once(',') else {
                    eprintln!("expected VGS,VDS for {}: {}", arg, value);
                    std::process::exit(2);
                };
                point = Some((parse_value(&arg, vgs.trim()), parse_value(&arg, vds.trim())));
            }
            "--psf" | "-o" => psf_path = Some(PathBuf::from(next_value(&mut args, &arg))),
            "--csv" => csv_path = Some(PathBuf::from(next_value(&mut args, &arg))),
            "--serve" => serve = Some(next_value(&mut args, &arg)),
            "--verbose" | "-v" => verbose = true,
            _ => {
                eprintln!("unexpected argument: {}", arg);
                eprintln!("usage: jfet-cli [OPTIONS], see --help");
                std::process::exit(2);
            }
        }
    }

    if let Some(bind_addr) = serve {
        run_server(bind_addr);
        return;
    }
    if let Err(msg) = check_output_options(point.is_some(), csv_path.is_some()) {
        eprintln!("{}", msg);
        std::process::exit(2);
    }

    let base = resolve_model(model.as_deref(), model_file.as_deref(), model_name.as_deref());
    let params = apply_jfet_params(base, &overrides);
    if let Err(err) = params.validate() {
        eprintln!("invalid device parameters: {}", err);
        std::process::exit(2);
    }

    let engine = Engine::new(params, config);
    let mut store = ResultStore::new();
    if verbose {
        debug_dump_engine(&engine);
    }

    match point {
        Some((vgs, vds)) => run_point(
            &engine,
            &mut store,
            vgs,
            vds,
            psf_path.as_deref(),
            precision,
            verbose,
        ),
        None => run_sweep(
            &engine,
            &mut store,
            bounds,
            psf_path.as_deref(),
            csv_path.as_deref(),
            precision,
            verbose,
        ),
    }
}

/// CSV holds a sweep grid, so it has nothing to write for a single point.
fn check_output_options(point: bool, csv: bool) -> Result<(), &'static str> {
    if point && csv {
        return Err("--csv writes a sweep grid and cannot be combined with --point");
    }
    Ok(())
}

fn run_server(bind_addr: String) {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to start runtime: {}", err);
            std::process::exit(1);
        }
    };
    println!("serving on {}", bind_addr);
    if let Err(err) = runtime.block_on(http::run(HttpServerConfig {
        bind_addr,
        ..HttpServerConfig::default()
    })) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn resolve_model(model: Option<&str>, model_file: Option<&Path>, model_name: Option<&str>) -> JfetParams {
    if let Some(path) = model_file {
        let src = match fs::read_to_string(path) {
            Ok(src) => src,
            Err(err) => {
                eprintln!("failed to read model file {}: {}", path.display(), err);
                std::process::exit(2);
            }
        };
        let library = parse_model_library(&src);
        if !library.errors.is_empty() {
            eprintln!("model file errors:");
            for err in &library.errors {
                eprintln!("  line {}: {}", err.line, err.error);
            }
            std::process::exit(2);
        }
        let found = match model_name.or(model) {
            Some(name) => library.get(name),
            None => library.models.first(),
        };
        return match found {
            Some(m) => m.params,
            None => {
                eprintln!("no matching NJF model in {}", path.display());
                std::process::exit(2);
            }
        };
    }

    let name = model.unwrap_or(DEFAULT_MODEL);
    match jfet_by_name(name) {
        Some(m) => m.params,
        None => {
            eprintln!(
                "unknown model: {} (available: {})",
                name,
                jfet_model_names().join(", ")
            );
            std::process::exit(2);
        }
    }
}

fn run_point(
    engine: &Engine,
    store: &mut ResultStore,
    vgs: f64,
    vds: f64,
    psf_path: Option<&Path>,
    precision: usize,
    verbose: bool,
) {
    let plan = AnalysisPlan {
        cmd: AnalysisCmd::Point { vgs, vds },
    };
    if verbose {
        debug_dump_analysis(&plan);
    }
    let run_id = engine.run_with_store(&plan, store);
    let Some(run) = store.get(run_id) else {
        eprintln!("run result not found");
        std::process::exit(1);
    };

    if let RunPayload::Point(sol) = &run.payload {
        println!("run status: {:?} iterations={}", run.status, run.iterations);
        println!("V_GS = {} V", vgs);
        println!("V_DS = {} V", vds);
        println!("V_DS_int = {:.*} V", precision, sol.vds_internal);
        println!("I_D = {:.*} mA ({:?})", precision, sol.ids_ma(), sol.region);
    }
    if let Some(message) = &run.message {
        eprintln!("warning: {}", message);
    }

    if let Some(path) = psf_path {
        write_psf(store, run_id, path, precision);
    }
    if verbose {
        debug_dump_result_store(store);
    }
    if run.status != RunStatus::Converged {
        std::process::exit(1);
    }
}

fn run_sweep(
    engine: &Engine,
    store: &mut ResultStore,
    bounds: SweepBounds,
    psf_path: Option<&Path>,
    csv_path: Option<&Path>,
    precision: usize,
    verbose: bool,
) {
    let plan = AnalysisPlan {
        cmd: AnalysisCmd::Sweep(bounds),
    };
    if verbose {
        debug_dump_analysis(&plan);
    }
    let run_id = engine.run_with_store(&plan, store);
    let Some(run) = store.get(run_id) else {
        eprintln!("run result not found");
        std::process::exit(1);
    };

    let grid = match (&run.status, &run.payload) {
        (RunStatus::Failed, _) | (_, RunPayload::Empty) | (_, RunPayload::Point(_)) => {
            eprintln!(
                "sweep failed: status={:?} message={}",
                run.status,
                run.message.as_deref().unwrap_or("unknown error")
            );
            std::process::exit(1);
        }
        (_, RunPayload::Sweep(grid)) => grid,
    };

    println!("Values are in V and mA.");
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = write_table(grid, precision, &mut out).and_then(|_| out.flush()) {
        eprintln!("failed to write table: {}", err);
        std::process::exit(1);
    }
    drop(out);

    if let Some(message) = &run.message {
        eprintln!("warning: {}", message);
    }
    if verbose {
        debug_dump_grid(grid);
    }

    if let Some(path) = psf_path {
        write_psf(store, run_id, path, precision);
    }
    if let Some(path) = csv_path {
        if let Err(err) = write_csv(grid, path) {
            eprintln!("failed to write csv: {}", err);
            std::process::exit(1);
        }
        println!("csv written: {}", path.display());
    }
    if verbose {
        debug_dump_result_store(store);
    }
}

fn write_psf(store: &ResultStore, run_id: RunId, path: &Path, precision: usize) {
    if let Err(err) = store.write_psf_text(run_id, path, precision) {
        eprintln!("failed to write psf: {}", err);
        std::process::exit(1);
    }
    println!("psf written: {}", path.display());
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_requires_sweep_mode() {
        assert!(check_output_options(true, true).is_err());
        assert!(check_output_options(true, false).is_ok());
        assert!(check_output_options(false, true).is_ok());
        assert!(check_output_options(false, false).is_ok());
    }
}

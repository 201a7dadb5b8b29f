use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::{Arc, Mutex};

use jfet_core::analysis::{AnalysisCmd, AnalysisPlan, ConvergenceConfig};
use jfet_core::engine::Engine;
use jfet_core::error::{Axis, SweepError};
use jfet_core::result_store::{ResultStore, RunId, RunPayload, RunResult};
use jfet_core::sweep::{CharacteristicGrid, SweepAxis, SweepBounds, SweepConfig};
use jfet_devices::jfet::{jfet_by_name, jfet_model_names, CutoffMode, JfetParams, JfetRegion};

use crate::schema::{
    DeviceSelection, ErrorBody, ErrorResponse, GridBody, ModelsResponse, ParamsBody, PointBody,
    RunResponse, SolveRequest, SweepRequest,
};

pub struct HttpServerConfig {
    pub bind_addr: String,
    pub limits: RequestLimits,
    /// Oldest runs are dropped once the store holds this many
    pub max_stored_runs: usize,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            limits: RequestLimits::default(),
            max_stored_runs: 256,
        }
    }
}

/// Per-request bounds on the work a client may ask for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestLimits {
    pub max_sweep_cells: usize,
    pub max_iters: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_sweep_cells: 1_000_000,
            max_iters: 10_000,
        }
    }
}

#[derive(Clone)]
struct ApiState {
    store: Arc<Mutex<ResultStore>>,
    limits: RequestLimits,
}

/// A request that could not be served, with the HTTP status to report.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiFailure {
    fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            message: message.into(),
        }
    }

    fn into_response(self) -> axum::response::Response {
        api_error(self.status, self.code, &self.message, None)
    }
}

impl From<SweepError> for ApiFailure {
    fn from(err: SweepError) -> Self {
        let (status, code) = match &err {
            SweepError::InvalidRange { .. } => (StatusCode::BAD_REQUEST, "INVALID_RANGE"),
            SweepError::InvalidConfig(_) => (StatusCode::BAD_REQUEST, "INVALID_CONFIG"),
            SweepError::InvalidParams(_) => (StatusCode::BAD_REQUEST, "INVALID_PARAMS"),
            SweepError::Allocation { .. } => (StatusCode::INSUFFICIENT_STORAGE, "ALLOCATION_FAILED"),
        };
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

pub async fn run(config: HttpServerConfig) -> Result<(), String> {
    let state = ApiState {
        store: Arc::new(Mutex::new(ResultStore::with_limit(config.max_stored_runs))),
        limits: config.limits,
    };
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|err| format!("bind {} failed: {}", config.bind_addr, err))?;
    log::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app)
        .await
        .map_err(|err| format!("server error: {}", err))
}

fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/v1/solve", post(run_solve))
        .route("/v1/sweep", post(run_sweep))
        .route("/v1/runs/{id}", get(get_run))
        .route("/v1/models", get(list_models))
        .with_state(state)
}

async fn run_solve(
    State(state): State<ApiState>,
    Json(payload): Json<SolveRequest>,
) -> impl IntoResponse {
    let limits = state.limits;
    let result = tokio::task::spawn_blocking(move || execute_solve(&payload, &limits)).await;
    match result {
        Ok(result) => store_and_respond(&state, result),
        Err(err) => task_failed(err),
    }
}

async fn run_sweep(
    State(state): State<ApiState>,
    Json(payload): Json<SweepRequest>,
) -> impl IntoResponse {
    let limits = state.limits;
    let result = tokio::task::spawn_blocking(move || execute_sweep(&payload, &limits)).await;
    match result {
        Ok(result) => store_and_respond(&state, result),
        Err(err) => task_failed(err),
    }
}

fn task_failed(err: tokio::task::JoinError) -> axum::response::Response {
    log::warn!("analysis task failed: {}", err);
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "TASK_FAILED",
        "analysis task failed",
        None,
    )
}

async fn get_run(State(state): State<ApiState>, Path(id): Path<usize>) -> impl IntoResponse {
    let store = match state.store.lock() {
        Ok(guard) => guard,
        Err(_) => {
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                "result store is unavailable",
                None,
            );
        }
    };
    let run = match store.get(RunId(id)) {
        Some(run) => run,
        None => {
            return api_error(
                StatusCode::NOT_FOUND,
                "RUN_NOT_FOUND",
                "run_id not found",
                None,
            );
        }
    };
    Json(run_to_response(run)).into_response()
}

async fn list_models() -> impl IntoResponse {
    let mut models: Vec<String> = jfet_model_names().into_iter().map(String::from).collect();
    models.sort();
    Json(ModelsResponse { models })
}

fn store_and_respond(
    state: &ApiState,
    result: Result<RunResult, ApiFailure>,
) -> axum::response::Response {
    let run = match result {
        Ok(run) => run,
        Err(failure) => return failure.into_response(),
    };
    let mut store = match state.store.lock() {
        Ok(guard) => guard,
        Err(_) => {
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                "result store is unavailable",
                None,
            );
        }
    };
    let run_id = store.add_run(run);
    match store.get(run_id) {
        Some(run) => Json(run_to_response(run)).into_response(),
        None => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "RUN_NOT_FOUND",
            "run result not found",
            None,
        ),
    }
}

/// Validate a point request and solve it.
pub fn execute_solve(payload: &SolveRequest, limits: &RequestLimits) -> Result<RunResult, ApiFailure> {
    let engine = build_engine(&payload.device, None, None, limits)?;
    let plan = AnalysisPlan {
        cmd: AnalysisCmd::Point {
            vgs: payload.vgs,
            vds: payload.vds,
        },
    };
    Ok(engine.try_run(&plan)?)
}

/// Validate a sweep request and evaluate it.
pub fn execute_sweep(payload: &SweepRequest, limits: &RequestLimits) -> Result<RunResult, ApiFailure> {
    let engine = build_engine(&payload.device, payload.vgs_step, payload.vds_step, limits)?;
    let bounds = SweepBounds {
        vgs_low: payload.vgs_low,
        vgs_high: payload.vgs_high,
        vds_low: payload.vds_low,
        vds_high: payload.vds_high,
    };
    check_grid_size(&bounds, &engine.config, limits)?;
    Ok(engine.try_run(&AnalysisPlan {
        cmd: AnalysisCmd::Sweep(bounds),
    })?)
}

// Counts that overflow are left to the engine, which reports an allocation failure.
fn check_grid_size(
    bounds: &SweepBounds,
    config: &SweepConfig,
    limits: &RequestLimits,
) -> Result<(), ApiFailure> {
    let vgs = SweepAxis::new(bounds.vgs_low, bounds.vgs_high, config.vgs_step);
    let vds = SweepAxis::new(bounds.vds_low, bounds.vds_high, config.vds_step);
    vgs.validate(Axis::Vgs)?;
    vds.validate(Axis::Vds)?;
    let (Some(cols), Some(rows)) = (vgs.count(), vds.count()) else {
        return Ok(());
    };
    match rows.checked_mul(cols) {
        Some(cells) if cells <= limits.max_sweep_cells => Ok(()),
        Some(cells) => Err(ApiFailure {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            code: "GRID_TOO_LARGE",
            message: format!(
                "sweep has {} points, limit is {}",
                cells, limits.max_sweep_cells
            ),
        }),
        None => Ok(()),
    }
}

/// Resolve model, parameter overrides and solver settings into an engine.
pub fn build_engine(
    device: &DeviceSelection,
    vgs_step: Option<f64>,
    vds_step: Option<f64>,
    limits: &RequestLimits,
) -> Result<Engine, ApiFailure> {
    let base = match device.model.as_deref() {
        Some(name) => jfet_by_name(name)
            .map(|m| m.params)
            .ok_or_else(|| ApiFailure::bad_request("UNKNOWN_MODEL", format!("unknown model: {}", name)))?,
        None => JfetParams::default(),
    };
    let params = match &device.params {
        Some(overrides) => apply_overrides(base, overrides),
        None => base,
    };
    params
        .validate()
        .map_err(|err| ApiFailure::bad_request("INVALID_PARAMS", err.to_string()))?;

    let cutoff = match device.cutoff.as_deref() {
        Some(value) => CutoffMode::parse(value).ok_or_else(|| {
            ApiFailure::bad_request("INVALID_REQUEST", format!("unknown cutoff mode: {}", value))
        })?,
        None => CutoffMode::default(),
    };

    let defaults = SweepConfig::default();
    let config = SweepConfig {
        temperature: device.temperature.unwrap_or(defaults.temperature),
        reference_temperature: device
            .reference_temperature
            .unwrap_or(defaults.reference_temperature),
        vgs_step: vgs_step.unwrap_or(defaults.vgs_step),
        vds_step: vds_step.unwrap_or(defaults.vds_step),
        convergence: ConvergenceConfig {
            tolerance: device.tolerance.unwrap_or(defaults.convergence.tolerance),
            max_iters: device.max_iters.unwrap_or(defaults.convergence.max_iters),
        },
        cutoff,
    };
    config.convergence.validate()?;
    if config.convergence.max_iters > limits.max_iters {
        return Err(ApiFailure::bad_request(
            "INVALID_CONFIG",
            format!(
                "max_iters {} exceeds limit {}",
                config.convergence.max_iters, limits.max_iters
            ),
        ));
    }
    Ok(Engine::new(params, config))
}

fn apply_overrides(base: JfetParams, o: &ParamsBody) -> JfetParams {
    JfetParams {
        beta: o.beta.unwrap_or(base.beta),
        vto: o.vto.unwrap_or(base.vto),
        lambda: o.lambda.unwrap_or(base.lambda),
        rd: o.rd.unwrap_or(base.rd),
        rs: o.rs.unwrap_or(base.rs),
        vto_tc: o.vto_tc.unwrap_or(base.vto_tc),
        beta_tce: o.betatce.map(|v| v / 100.0).unwrap_or(base.beta_tce),
    }
}

pub fn run_to_response(run: &RunResult) -> RunResponse {
    let (point, grid) = match &run.payload {
        RunPayload::Point(sol) => (
            Some(PointBody {
                ids: sol.ids,
                ids_ma: sol.ids_ma(),
                vds_internal: sol.vds_internal,
                region: region_name(sol.region).to_string(),
                iterations: sol.state.iter,
                converged: sol.state.converged,
                last_delta: sol.state.last_delta,
            }),
            None,
        ),
        RunPayload::Sweep(grid) => (None, Some(grid_body(grid))),
        RunPayload::Empty => (None, None),
    };
    RunResponse {
        run_id: run.id.0,
        analysis: format!("{:?}", run.analysis),
        status: format!("{:?}", run.status),
        iterations: run.iterations,
        message: run.message.clone(),
        point,
        grid,
    }
}

fn grid_body(grid: &CharacteristicGrid) -> GridBody {
    GridBody {
        vgs: grid.vgs.clone(),
        vds: grid.vds.clone(),
        current_ma: grid
            .current_ma
            .chunks(grid.cols())
            .map(|row| row.to_vec())
            .collect(),
        unconverged: grid.unconverged,
    }
}

fn region_name(region: JfetRegion) -> &'static str {
    match region {
        JfetRegion::Cutoff => "cutoff",
        JfetRegion::Triode => "triode",
        JfetRegion::Saturation => "saturation",
    }
}

fn api_error(
    status: StatusCode,
    code: &str,
    message: &str,
    details: Option<Vec<String>>,
) -> axum::response::Response {
    let body = ErrorResponse {
        error: ErrorBody {
            code: code.to_string(),
            message: message.to_string(),
            details,
        },
    };
    (status, Json(body)).into_response()
}

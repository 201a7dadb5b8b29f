use serde::{Deserialize, Serialize};

/// Device parameter overrides; unset fields keep the base model's values.
/// Units follow SPICE model cards, so `betatce` is in %/C.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParamsBody {
    pub beta: Option<f64>,
    pub vto: Option<f64>,
    pub lambda: Option<f64>,
    pub rd: Option<f64>,
    pub rs: Option<f64>,
    pub vto_tc: Option<f64>,
    pub betatce: Option<f64>,
}

/// Settings shared by solve and sweep requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceSelection {
    /// Embedded model name, e.g. "2N3819"
    pub model: Option<String>,
    pub params: Option<ParamsBody>,
    pub temperature: Option<f64>,
    pub reference_temperature: Option<f64>,
    pub tolerance: Option<f64>,
    pub max_iters: Option<usize>,
    /// "square" or "clamp"
    pub cutoff: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolveRequest {
    #[serde(flatten)]
    pub device: DeviceSelection,
    pub vgs: f64,
    pub vds: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweepRequest {
    #[serde(flatten)]
    pub device: DeviceSelection,
    pub vgs_low: f64,
    pub vgs_high: f64,
    pub vds_low: f64,
    pub vds_high: f64,
    pub vgs_step: Option<f64>,
    pub vds_step: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointBody {
    pub ids: f64,
    pub ids_ma: f64,
    pub vds_internal: f64,
    pub region: String,
    pub iterations: usize,
    pub converged: bool,
    pub last_delta: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridBody {
    pub vgs: Vec<f64>,
    pub vds: Vec<f64>,
    /// Rows follow `vds`, columns follow `vgs` [mA]
    pub current_ma: Vec<Vec<f64>>,
    pub unconverged: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub run_id: usize,
    pub analysis: String,
    pub status: String,
    pub iterations: usize,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<PointBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridBody>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

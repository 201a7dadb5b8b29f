//! Error types for jfet-core.

use std::fmt;

use jfet_devices::jfet::ParamError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Vgs,
    Vds,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Vgs => write!(f, "V_GS"),
            Axis::Vds => write!(f, "V_DS"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SweepError {
    #[error("invalid {axis} range: {reason}")]
    InvalidRange { axis: Axis, reason: String },

    #[error("cannot allocate {what} with {len} entries")]
    Allocation { what: &'static str, len: usize },

    #[error("invalid solver settings: {0}")]
    InvalidConfig(String),

    #[error("invalid device parameters: {0}")]
    InvalidParams(#[from] ParamError),
}

pub type Result<T> = std::result::Result<T, SweepError>;

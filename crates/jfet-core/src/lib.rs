pub mod analysis;
pub mod engine;
pub mod error;
pub mod psf;
pub mod result_store;
pub mod solver;
pub mod sweep;
pub mod table;

//! Output helpers for ranking and unified tables.
//!
//! - [`export`]: CSV writers built on `csv` + `serde`
//! - [`frame`]: conversion into Polars [`polars::prelude::DataFrame`]s

pub mod export;
pub mod frame;

pub use export::{write_csv, write_csv_to_path};
pub use frame::{ranking_frame, reduction_frame, unified_frame};

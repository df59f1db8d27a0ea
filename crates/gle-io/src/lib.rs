//! File formats around the gle-solver core.
//!
//! This crate provides:
//! - **CSV time-series tables** with `t`, `F{i}` and `A{i}` columns
//! - **JSON configuration** for identification requests and simulation runs
//! - **JSON result reports** for modal models, FRFs and identified modes

pub mod config;
pub mod csv;
pub mod error;
pub mod report;

use std::fs;
use std::path::Path;

pub use config::{
    LoadSpec, SimulationSpec, Supports, load_identification_config, load_simulation_spec,
};
pub use csv::{format_time_series, parse_time_series, read_time_series, write_time_series};
pub use error::{IoError, Result};
pub use report::{
    ChannelBode, FrfReport, IdentificationReport, ModeReport, ModesReport, read_report,
    write_report,
};

/// Create the parent directory of `path` if it has one
pub(crate) fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

//! CSV time-series tables.
//!
//! The first line is a header naming the columns: `t` for the time axis and
//! `F{i}` / `A{i}` for the force and acceleration channels at location `i`.
//! Every following non-empty line holds one sample per column. Written
//! tables order the channels by location with the force first:
//!
//! ```text
//! t,F0,A0,F1,A1
//! 0,2000,0,0,0
//! 0.0001,2000,0.0132,0,-0.0004
//! ```
//!
//! Columns with other names are skipped with a warning.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use gle_solver::{ChannelId, TimeSeries};
use tracing::{debug, warn};

use crate::error::{IoError, Result};
use crate::ensure_parent_dir;

/// Name of the time column
pub const TIME_COLUMN: &str = "t";

/// Read a time-series table from `path`
pub fn read_time_series(path: impl AsRef<Path>) -> Result<TimeSeries> {
    let path = path.as_ref();
    let series = parse_time_series(BufReader::new(File::open(path)?))?;
    debug!(
        path = %path.display(),
        samples = series.len(),
        channels = series.channel_ids().count(),
        "read time series"
    );
    Ok(series)
}

/// Parse a time-series table from any buffered reader
pub fn parse_time_series<R: BufRead>(reader: R) -> Result<TimeSeries> {
    let mut lines = reader.lines().enumerate();
    let header = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Err(IoError::InvalidData("CSV table is empty".to_string())),
        }
    };

    let mut time_col = None;
    let mut channel_cols: Vec<(usize, ChannelId)> = Vec::new();
    for (col, name) in header.split(',').enumerate() {
        let name = name.trim().trim_matches('"');
        if name == TIME_COLUMN {
            time_col = Some(col);
        } else if let Ok(id) = name.parse::<ChannelId>() {
            if channel_cols.iter().any(|(_, existing)| *existing == id) {
                return Err(IoError::parse(1, format!("duplicate column '{}'", name)));
            }
            channel_cols.push((col, id));
        } else {
            warn!(column = name, "skipping unrecognised CSV column");
        }
    }
    let time_col =
        time_col.ok_or_else(|| IoError::parse(1, format!("missing '{}' column", TIME_COLUMN)))?;
    let num_cols = header.split(',').count();

    let mut time = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); channel_cols.len()];
    for (index, line) in lines {
        let line = line?;
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != num_cols {
            return Err(IoError::parse(
                line_no,
                format!("expected {} fields, found {}", num_cols, fields.len()),
            ));
        }
        let value = |col: usize| -> Result<f64> {
            let field = fields[col].trim();
            field
                .parse::<f64>()
                .map_err(|_| IoError::parse(line_no, format!("invalid number '{}'", field)))
        };
        time.push(value(time_col)?);
        for (values, (col, _)) in columns.iter_mut().zip(&channel_cols) {
            values.push(value(*col)?);
        }
    }

    let mut series = TimeSeries::new(time)?;
    for (values, (_, id)) in columns.into_iter().zip(channel_cols) {
        series.insert_channel(id, values)?;
    }
    Ok(series)
}

/// Write `series` as a CSV table, creating parent directories as needed
pub fn write_time_series(path: impl AsRef<Path>, series: &TimeSeries) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let mut writer = BufWriter::new(fs::File::create(path)?);
    format_time_series(&mut writer, series)?;
    writer.flush()?;
    debug!(path = %path.display(), samples = series.len(), "wrote time series");
    Ok(())
}

/// Write `series` in CSV form to any writer
pub fn format_time_series<W: Write>(writer: &mut W, series: &TimeSeries) -> Result<()> {
    let mut ids: Vec<ChannelId> = series.channel_ids().collect();
    ids.sort_by_key(|id| (id.location(), matches!(id, ChannelId::Response(_))));

    let mut header = vec![TIME_COLUMN.to_string()];
    header.extend(ids.iter().map(ChannelId::to_string));
    writeln!(writer, "{}", header.join(","))?;

    let channels: Vec<&[f64]> = ids.iter().filter_map(|id| series.channel(*id)).collect();
    for (k, t) in series.time().iter().enumerate() {
        write!(writer, "{}", t)?;
        for values in &channels {
            write!(writer, ",{}", values[k])?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

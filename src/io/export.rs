//! CSV and JSON export of dispatch results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::SecondsFormat;

use crate::dispatch::kpi::DispatchSummary;
use crate::dispatch::power_balance::ResultTable;

/// Column header of the result CSV.
pub const HEADER: &str = "time,pv,wind_on,wind_off,biomass,hydro,batteries,load,\
                          curtailed_re,residual_load,backup,battery_soc";

/// Exports the result table to a CSV file at the given path.
///
/// Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(table: &ResultTable, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_csv(table, io::BufWriter::new(file))
}

/// Writes the result table as CSV to any writer.
///
/// Times are RFC 3339 in UTC; values carry four decimals.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(table: &ResultTable, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in &table.rows {
        wtr.write_record(&[
            r.time.to_rfc3339_opts(SecondsFormat::Secs, true),
            format!("{:.4}", r.pv),
            format!("{:.4}", r.wind_on),
            format!("{:.4}", r.wind_off),
            format!("{:.4}", r.biomass),
            format!("{:.4}", r.hydro),
            format!("{:.4}", r.batteries),
            format!("{:.4}", r.load),
            format!("{:.4}", r.curtailed_re),
            format!("{:.4}", r.residual_load),
            format!("{:.4}", r.backup),
            format!("{:.4}", r.battery_soc),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the dispatch summary as pretty-printed JSON.
///
/// # Errors
///
/// Returns an `io::Error` if file creation, serialization, or writing fails.
pub fn write_summary_json(summary: &DispatchSummary, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut buf = io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut buf, summary)?;
    writeln!(buf)?;
    buf.flush()
}

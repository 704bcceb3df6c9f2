//! CSV export of the per-timestamp series of a loss run.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::pipeline::LossRun;

/// Column header for the series export.
const HEADER: &str = "timestamp,apparent_zenith,azimuth,dni,ghi,dhi,\
                      reference_poa_global,candidate_poa_global";

/// Exports the series of `run` to a CSV file at the given path.
///
/// Writes a header row followed by one data row per timestamp. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(run: &LossRun, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(run, buf)
}

/// Writes the series of `run` as CSV to any writer.
///
/// Timestamps are RFC 3339 in the run's timezone; angles carry 4 decimals
/// and irradiance 3.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(run: &LossRun, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    let rows = run
        .timestamps
        .iter()
        .zip(&run.positions)
        .zip(&run.irradiance)
        .zip(run.reference_poa.iter().zip(&run.candidate_poa));
    for (((t, pos), irr), (reference, candidate)) in rows {
        wtr.write_record(&[
            t.to_rfc3339(),
            format!("{:.4}", pos.apparent_zenith),
            format!("{:.4}", pos.azimuth),
            format!("{:.3}", irr.dni),
            format!("{:.3}", irr.ghi),
            format!("{:.3}", irr.dhi),
            format!("{:.3}", reference.poa_global),
            format!("{:.3}", candidate.poa_global),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

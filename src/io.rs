//! Persistence and report dumps.
//!
//! Results round-trip through JSON, and every report table (time course,
//! quantile band, sensitivity indices) can be dumped as delimited text for
//! human-readable reports. There is no binary format.

use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::result::TimeCourse;
use crate::uncertainty::sensitivity::SobolIndices;
use crate::uncertainty::summary::QuantileBand;

/// Errors raised while reading or writing result files.
#[derive(Error, Debug)]
pub enum IoError {
    /// The file could not be opened or written.
    #[error("file error: {0}")]
    File(#[from] std::io::Error),

    /// The file contents could not be parsed as valid JSON.
    #[error("failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Load a saved time course from a JSON file.
pub fn load_time_course(path: impl Into<PathBuf>) -> Result<TimeCourse, IoError> {
    let file = std::fs::File::open(path.into())?;
    Ok(serde_json::from_reader(file)?)
}

/// Save a time course to a JSON file.
pub fn save_time_course(path: impl Into<PathBuf>, course: &TimeCourse) -> Result<(), IoError> {
    let file = std::fs::File::create(path.into())?;
    Ok(serde_json::to_writer_pretty(file, course)?)
}

/// Dump a time course as delimited text: a `Time` column followed by one
/// column per species, in the model's positional order.
pub fn write_time_course<W: Write>(
    writer: &mut W,
    course: &TimeCourse,
    separator: &str,
) -> Result<(), IoError> {
    write!(writer, "Time")?;
    for name in &course.names {
        write!(writer, "{separator}{name}")?;
    }
    writeln!(writer)?;

    for (step, t) in course.time.iter().enumerate() {
        write!(writer, "{t}")?;
        for name in &course.names {
            write!(writer, "{separator}{}", course.species[name][step])?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Dump a quantile band as delimited text with `Time, High, Low, Mean`
/// columns.
pub fn write_quantile_band<W: Write>(
    writer: &mut W,
    band: &QuantileBand,
    separator: &str,
) -> Result<(), IoError> {
    writeln!(
        writer,
        "Time{separator}High{separator}Low{separator}Mean"
    )?;
    for (((t, high), low), mean) in band
        .time
        .iter()
        .zip(&band.high)
        .zip(&band.low)
        .zip(&band.mean)
    {
        writeln!(writer, "{t}{separator}{high}{separator}{low}{separator}{mean}")?;
    }
    Ok(())
}

/// Dump a sensitivity table as delimited text with
/// `Factor, S1, S1_conf, ST, ST_conf` columns.
pub fn write_sobol_indices<W: Write>(
    writer: &mut W,
    indices: &SobolIndices,
    separator: &str,
) -> Result<(), IoError> {
    writeln!(
        writer,
        "Factor{separator}S1{separator}S1_conf{separator}ST{separator}ST_conf"
    )?;
    for factor in &indices.factors {
        writeln!(
            writer,
            "{}{separator}{}{separator}{}{separator}{}{separator}{}",
            factor.name, factor.s1, factor.s1_conf, factor.st, factor.st_conf
        )?;
    }
    Ok(())
}

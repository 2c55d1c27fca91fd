//! CSV output for simulation traces

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::SimError;
use crate::runner::Sample;

/// Header row with the step index followed by each channel name
pub fn csv_header() -> String {
    let mut header = String::from("step");
    for name in Sample::CHANNEL_NAMES {
        header.push(',');
        header.push_str(name);
    }
    header.push('\n');
    header
}

/// Format one sample into `stringbuf`, replacing its contents
pub fn csv_row(stringbuf: &mut String, sample: &Sample) {
    stringbuf.clear();
    stringbuf.push_str(&sample.step.to_string());
    for v in sample.channel_values() {
        stringbuf.push(',');
        stringbuf.push_str(&fmt_f64(v));
    }
    stringbuf.push('\n');
}

/// Signed scientific notation with a fixed mantissa precision and
/// zero-padded exponent, right-aligned so that every finite value has the same width
pub fn fmt_f64(num: f64) -> String {
    let precision = 12;
    let width = precision + 8;

    if !num.is_finite() {
        return format!("{num:>width$}");
    }

    let formatted = format!("{num:+.precision$e}");
    let out = match formatted.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>3}")
        }
        None => formatted,
    };
    format!("{out:>width$}")
}

/// Write a full trace to `path`, truncating any existing file
pub fn write_csv(path: &Path, samples: &[Sample]) -> Result<(), SimError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(csv_header().as_bytes())?;

    let mut row = String::new();
    for sample in samples {
        csv_row(&mut row, sample);
        writer.write_all(row.as_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

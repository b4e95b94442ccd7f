use crate::dimension::{Dimension, Levels, MAX_LEVEL, MIN_LEVEL, normalize_level};
use crate::error::{Error, Result};
use crate::storage::{Sample, SampleStore};
use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Fields per row: the timestamp plus one value per dimension
const FIELD_COUNT: usize = Dimension::COUNT + 1;

/// Rows read from an interchange file
#[derive(Debug, Default)]
pub struct ImportBatch {
    pub samples: Vec<Sample>,
    pub skipped: usize,
}

/// Replace every stored sample with the rows of `file`
pub fn run(store: &mut SampleStore, file: &Path) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let batch = read_csv(reader)?;

    let imported = store.replace_all(&batch.samples)?;

    info!(
        "Imported {} samples from {} ({} skipped)",
        imported,
        file.display(),
        batch.skipped
    );
    println!(
        "Imported {} rows from {} ({} skipped)",
        imported,
        file.display(),
        batch.skipped
    );
    Ok(())
}

/// Parse CSV rows after the header. Malformed rows are logged and skipped.
pub fn read_csv<R: BufRead>(input: R) -> Result<ImportBatch> {
    let mut batch = ImportBatch::default();

    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        if idx == 0 {
            continue;
        }

        match parse_row(idx + 1, &line) {
            Ok(sample) => batch.samples.push(sample),
            Err(e) => {
                warn!("Skipping row: {}", e);
                batch.skipped += 1;
            }
        }
    }

    Ok(batch)
}

fn parse_row(line: usize, text: &str) -> Result<Sample> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(Error::Validation {
            line,
            reason: format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
        });
    }

    let timestamp = fields[0];
    if timestamp.is_empty() {
        return Err(Error::Validation {
            line,
            reason: "empty timestamp".to_string(),
        });
    }

    let mut levels = Levels::neutral();
    for (dim, field) in Dimension::ALL.iter().zip(&fields[1..]) {
        let value: f64 = field.parse().map_err(|_| Error::Validation {
            line,
            reason: format!("invalid {} value '{}'", dim.name(), field),
        })?;
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&value) {
            return Err(Error::Validation {
                line,
                reason: format!("{} value {} outside 0-100", dim.name(), value),
            });
        }
        levels[*dim] = normalize_level(value);
    }

    Ok(Sample::new(timestamp, levels))
}

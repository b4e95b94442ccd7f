use crate::error::Result;
use crate::storage::{Sample, SampleStore, columns};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Export every stored sample to `file` as CSV
pub fn run(store: &SampleStore, file: &Path) -> Result<()> {
    let samples = store.all()?;

    if let Some(parent) = file.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(file)?);
    write_csv(&mut writer, &samples)?;
    writer.flush()?;

    info!("Exported {} samples to {}", samples.len(), file.display());
    println!("Exported {} rows to {}", samples.len(), file.display());
    Ok(())
}

/// Header line followed by one line per sample, in store column order
pub fn write_csv<W: Write>(out: &mut W, samples: &[Sample]) -> Result<()> {
    writeln!(out, "{}", columns().join(","))?;
    for sample in samples {
        write!(out, "{}", sample.timestamp)?;
        for value in sample.levels.as_slice() {
            write!(out, ",{}", value)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::{Dimension, Levels};

    #[test]
    fn test_header_and_rows() {
        let mut levels = Levels::neutral();
        levels[Dimension::Happy] = 72.5;
        levels[Dimension::Hunger] = 0.0;
        let samples = vec![Sample::new("2024-05-01T10:00:00.000000", levels)];

        let mut out = Vec::new();
        write_csv(&mut out, &samples).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "timestamp,happy,sad,mad,silly,devious,sanity,energy,hunger"
        );
        assert_eq!(lines[1], "2024-05-01T10:00:00.000000,72.5,50,50,50,50,50,50,0");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_export_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("out").join("emotions_export.csv");
        let store = SampleStore::open_in_memory().unwrap();
        store
            .append(&Sample::new("2024-05-01T10:00:00.000000", Levels::splat(10.0)))
            .unwrap();

        run(&store, &file).unwrap();

        let text = std::fs::read_to_string(&file).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}

use crate::dimension::Dimension;
use crate::error::Result;
use crate::storage::{Sample, SampleStore};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

/// Print the most recent `count` samples, oldest first
pub fn run(store: &SampleStore, count: usize) -> Result<()> {
    let samples = store.recent(count)?;
    if samples.is_empty() {
        println!("No samples recorded yet");
        return Ok(());
    }

    let mut table = build_table(&samples);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    println!("{table}");
    println!("{} of {} samples", samples.len(), store.count()?);
    Ok(())
}

fn build_table(samples: &[Sample]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    let mut header = vec![Cell::new("Time")];
    header.extend(Dimension::ALL.iter().map(|d| Cell::new(d.label())));
    table.set_header(header);

    for sample in samples {
        let mut row = vec![Cell::new(&sample.timestamp)];
        for (_, value) in sample.levels.iter() {
            let cell = Cell::new(format!("{:.1}", value));
            row.push(if value < 20.0 {
                cell.fg(Color::Red)
            } else {
                cell
            });
        }
        table.add_row(row);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::Levels;

    #[test]
    fn test_table_lists_every_dimension() {
        let mut levels = Levels::neutral();
        levels[Dimension::Devious] = 87.5;
        let samples = vec![Sample::new("2024-05-01T10:00:00.000000", levels)];

        let text = build_table(&samples).to_string();
        for dim in Dimension::ALL {
            assert!(text.contains(dim.label()), "missing {}", dim.label());
        }
        assert!(text.contains("87.5"));
        assert!(text.contains("2024-05-01T10:00:00.000000"));
    }
}

use crate::dimension::{Dimension, Levels};
use std::fmt;

/// A change below this percentage raises the crash alert
pub const DEFAULT_CRASH_THRESHOLD: f64 = -20.0;

/// Signed percent change per dimension
pub type Changes = Levels;

/// Percent change from `previous` to `current`. A zero baseline yields 0.
pub fn compute(previous: &Levels, current: &Levels) -> Changes {
    Levels::from_fn(|dim| {
        let base = previous[dim];
        if base == 0.0 {
            0.0
        } else {
            (current[dim] - base) / base * 100.0
        }
    })
}

/// True iff any change is strictly below `threshold`
pub fn is_crash(changes: &Changes, threshold: f64) -> bool {
    changes.iter().any(|(_, change)| change < threshold)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// `Up` only for strictly positive changes
    pub fn of(change: f64) -> Self {
        if change > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Up => "↑",
            Direction::Down => "↓",
        }
    }
}

/// Human-readable outcome of one resolved cycle
#[derive(Debug, Clone, PartialEq)]
pub struct TrendReport {
    pub changes: Changes,
    pub crash: bool,
}

impl TrendReport {
    pub fn new(previous: &Levels, current: &Levels, threshold: f64) -> Self {
        let changes = compute(previous, current);
        TrendReport {
            crash: is_crash(&changes, threshold),
            changes,
        }
    }

    pub fn change(&self, dim: Dimension) -> f64 {
        self.changes[dim]
    }

    /// One `↑ Happy: 60.0%` entry per dimension
    pub fn lines(&self) -> Vec<String> {
        self.changes
            .iter()
            .map(|(dim, change)| {
                format!(
                    "{} {}: {:.1}%",
                    Direction::of(change).arrow(),
                    dim.label(),
                    change.abs()
                )
            })
            .collect()
    }
}

impl fmt::Display for TrendReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 Emotional Market Update 📊")?;
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        if self.crash {
            writeln!(f, "⚠️ EMOTIONAL CRASH IMMINENT ⚠️")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(pairs: &[(Dimension, f64)]) -> Changes {
        let mut changes = Levels::splat(0.0);
        for &(dim, value) in pairs {
            changes[dim] = value;
        }
        changes
    }

    #[test]
    fn test_compute_percent_change() {
        let previous = Levels::neutral();
        let mut current = Levels::neutral();
        current[Dimension::Happy] = 80.0;
        current[Dimension::Sad] = 20.0;

        let result = compute(&previous, &current);
        assert!((result[Dimension::Happy] - 60.0).abs() < 1e-9);
        assert!((result[Dimension::Sad] + 60.0).abs() < 1e-9);
        assert_eq!(result[Dimension::Mad], 0.0);
    }

    #[test]
    fn test_compute_zero_baseline_is_zero() {
        let previous = Levels::splat(0.0);
        for value in [0.0, 0.1, 55.5, 100.0] {
            let result = compute(&previous, &Levels::splat(value));
            assert!(result.iter().all(|(_, c)| c == 0.0));
        }
    }

    #[test]
    fn test_is_crash_threshold_is_strict() {
        let threshold = DEFAULT_CRASH_THRESHOLD;
        assert!(is_crash(
            &changes(&[(Dimension::Happy, -25.0), (Dimension::Sad, 3.0)]),
            threshold
        ));
        assert!(!is_crash(&changes(&[(Dimension::Happy, -19.9)]), threshold));
        assert!(!is_crash(&changes(&[(Dimension::Happy, -20.0)]), threshold));
    }

    #[test]
    fn test_direction_zero_is_down() {
        assert_eq!(Direction::of(0.0), Direction::Down);
        assert_eq!(Direction::of(-1.0), Direction::Down);
        assert_eq!(Direction::of(0.1), Direction::Up);
    }

    #[test]
    fn test_report_lines() {
        let mut current = Levels::neutral();
        current[Dimension::Happy] = 80.0;
        current[Dimension::Sad] = 20.0;
        let report = TrendReport::new(&Levels::neutral(), &current, DEFAULT_CRASH_THRESHOLD);

        let lines = report.lines();
        assert_eq!(lines.len(), Dimension::COUNT);
        assert_eq!(lines[0], "↑ Happy: 60.0%");
        assert_eq!(lines[1], "↓ Sad: 60.0%");
        assert_eq!(lines[2], "↓ Mad: 0.0%");
        assert!(report.crash);
        assert!(report.to_string().contains("CRASH"));
    }
}

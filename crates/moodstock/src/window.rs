use crate::dimension::{Dimension, Levels};
use crate::storage::Sample;
use std::collections::VecDeque;

/// Number of samples kept per dimension for the overlay
pub const WINDOW_CAPACITY: usize = 25;

/// Fixed-capacity history per dimension, oldest first.
///
/// Mutation goes through `&mut self` on the event-loop thread, so a renderer
/// holding a [`WindowSnapshot`] can never see some dimensions pushed and others not.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    series: [VecDeque<f64>; Dimension::COUNT],
}

impl RollingWindow {
    pub fn new() -> Self {
        Self::with_capacity(WINDOW_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        RollingWindow {
            capacity,
            series: std::array::from_fn(|_| VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Replace every series with values from `samples` (oldest first), keeping the newest `capacity`
    pub fn seed(&mut self, samples: &[Sample]) {
        for series in &mut self.series {
            series.clear();
        }
        let skip = samples.len().saturating_sub(self.capacity);
        for sample in &samples[skip..] {
            self.push(&sample.levels);
        }
    }

    /// Append one value per dimension, evicting the oldest where full
    pub fn push(&mut self, levels: &Levels) {
        if self.capacity == 0 {
            return;
        }
        for (dim, value) in levels.iter() {
            let series = &mut self.series[dim.index()];
            while series.len() >= self.capacity {
                series.pop_front();
            }
            series.push_back(value);
        }
    }

    pub fn len(&self) -> usize {
        self.series[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> WindowSnapshot<'_> {
        WindowSnapshot { window: self }
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view handed to the renderer
#[derive(Clone, Copy)]
pub struct WindowSnapshot<'a> {
    window: &'a RollingWindow,
}

impl<'a> WindowSnapshot<'a> {
    /// Values for `dim`, oldest first
    pub fn series(&self, dim: Dimension) -> Vec<f64> {
        self.window.series[dim.index()].iter().copied().collect()
    }

    /// Most recent value for `dim`
    pub fn latest(&self, dim: Dimension) -> Option<f64> {
        self.window.series[dim.index()].back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &'a VecDeque<f64>)> + 'a {
        let window = self.window;
        Dimension::ALL
            .iter()
            .map(move |&d| (d, &window.series[d.index()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(v: f64) -> Levels {
        Levels::splat(v)
    }

    #[test]
    fn test_push_evicts_oldest_past_capacity() {
        let mut window = RollingWindow::new();
        for i in 0..=WINDOW_CAPACITY {
            window.push(&levels(i as f64));
        }

        let snapshot = window.snapshot();
        for dim in Dimension::ALL {
            let series = snapshot.series(dim);
            assert_eq!(series.len(), WINDOW_CAPACITY);
            assert_eq!(series[0], 1.0);
            assert_eq!(series[WINDOW_CAPACITY - 1], WINDOW_CAPACITY as f64);
        }
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut window = RollingWindow::with_capacity(3);
        for i in 0..50 {
            window.push(&levels(i as f64));
            assert!(window.len() <= 3);
        }
        assert_eq!(window.snapshot().series(Dimension::Mad), vec![47.0, 48.0, 49.0]);
    }

    #[test]
    fn test_seed_keeps_newest_samples() {
        let samples: Vec<Sample> = (0..30)
            .map(|i| Sample::new(format!("t{i:02}"), levels(i as f64)))
            .collect();

        let mut window = RollingWindow::new();
        window.push(&levels(99.0));
        window.seed(&samples);

        let series = window.snapshot().series(Dimension::Energy);
        assert_eq!(series.len(), WINDOW_CAPACITY);
        assert_eq!(series.first(), Some(&5.0));
        assert_eq!(series.last(), Some(&29.0));
    }

    #[test]
    fn test_seed_with_fewer_samples() {
        let samples = vec![
            Sample::new("a", levels(10.0)),
            Sample::new("b", levels(20.0)),
        ];
        let mut window = RollingWindow::new();
        window.seed(&samples);
        assert_eq!(window.snapshot().series(Dimension::Sad), vec![10.0, 20.0]);
        assert_eq!(window.snapshot().latest(Dimension::Sad), Some(20.0));
    }

    #[test]
    fn test_push_updates_every_dimension() {
        let mut window = RollingWindow::new();
        let mut values = Levels::neutral();
        values[Dimension::Happy] = 80.0;
        values[Dimension::Sad] = 20.0;
        window.push(&values);

        let snapshot = window.snapshot();
        assert!(snapshot.iter().all(|(_, series)| series.len() == 1));
        assert_eq!(snapshot.latest(Dimension::Happy), Some(80.0));
        assert_eq!(snapshot.latest(Dimension::Sad), Some(20.0));
    }
}

//! Maps a rolling-window snapshot onto a fixed-size canvas.
//!
//! The output is a plain [`Scene`] in canvas units (origin top-left, y down);
//! the terminal front end decides how to paint it.

use crate::dimension::{Dimension, MAX_LEVEL};
use crate::window::WindowSnapshot;
use ratatui::style::Color;

pub const TITLE: &str = "The Stock Market";

/// Vertical distance between gridlines, in canvas units
pub const GRID_SPACING: f64 = 20.0;

pub const BACKGROUND: Color = Color::Rgb(255, 255, 255);
pub const BACKGROUND_ALPHA: u8 = 200;
pub const GRID_COLOR: Color = Color::Rgb(220, 220, 220);
pub const TITLE_COLOR: Color = Color::Rgb(0, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    /// Band reserved at the top for the title
    pub title_height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64, title_height: f64) -> Self {
        Canvas {
            width,
            height,
            title_height,
        }
    }

    /// Height left for gridlines and paths
    pub fn plot_height(&self) -> f64 {
        (self.height - self.title_height).max(0.0)
    }

    /// Sample `index` of `len` at `value` -> plot-area coordinates.
    /// `None` when fewer than two samples leave no horizontal span.
    pub fn point(&self, index: usize, len: usize, value: f64) -> Option<(f64, f64)> {
        if len < 2 || index >= len {
            return None;
        }
        let step = self.width / (len - 1) as f64;
        let x = index as f64 * step;
        let y = (MAX_LEVEL - value) / MAX_LEVEL * self.plot_height();
        Some((x, y))
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Canvas::new(200.0, 220.0, 20.0)
    }
}

/// Line colors, fixed once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct Palette([Color; Dimension::COUNT]);

impl Palette {
    pub fn new() -> Self {
        Palette(Dimension::ALL.map(Dimension::color))
    }

    pub fn color(&self, dim: Dimension) -> Color {
        self.0[dim.index()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub dimension: Dimension,
    pub color: Color,
    /// Plot-area coordinates in index order
    pub points: Vec<(f64, f64)>,
}

impl Polyline {
    /// Consecutive point pairs
    pub fn segments(&self) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub canvas: Canvas,
    pub background: Color,
    pub background_alpha: u8,
    pub title: &'static str,
    pub title_color: Color,
    /// Gridline y positions within the plot area
    pub gridlines: Vec<f64>,
    pub grid_color: Color,
    pub paths: Vec<Polyline>,
}

pub struct OverlayRenderer {
    canvas: Canvas,
    palette: Palette,
}

impl OverlayRenderer {
    pub fn new(canvas: Canvas) -> Self {
        OverlayRenderer {
            canvas,
            palette: Palette::new(),
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn render(&self, snapshot: &WindowSnapshot<'_>) -> Scene {
        Scene {
            canvas: self.canvas,
            background: BACKGROUND,
            background_alpha: BACKGROUND_ALPHA,
            title: TITLE,
            title_color: TITLE_COLOR,
            gridlines: gridlines(self.canvas.plot_height()),
            grid_color: GRID_COLOR,
            paths: self.paths(snapshot),
        }
    }

    fn paths(&self, snapshot: &WindowSnapshot<'_>) -> Vec<Polyline> {
        snapshot
            .iter()
            .filter(|(_, values)| values.len() >= 2)
            .map(|(dim, values)| {
                let len = values.len();
                Polyline {
                    dimension: dim,
                    color: self.palette.color(dim),
                    points: values
                        .iter()
                        .enumerate()
                        .filter_map(|(i, &v)| self.canvas.point(i, len, v))
                        .collect(),
                }
            })
            .collect()
    }
}

fn gridlines(plot_height: f64) -> Vec<f64> {
    let mut lines = Vec::new();
    let mut y = 0.0;
    while y <= plot_height {
        lines.push(y);
        y += GRID_SPACING;
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::Levels;
    use crate::window::RollingWindow;

    #[test]
    fn test_single_point_draws_no_paths() {
        let mut window = RollingWindow::new();
        window.push(&Levels::splat(40.0));

        let scene = OverlayRenderer::new(Canvas::default()).render(&window.snapshot());
        assert!(scene.paths.is_empty());
        assert_eq!(scene.title, TITLE);
    }

    #[test]
    fn test_two_points_map_to_canvas_edges() {
        let canvas = Canvas::new(200.0, 220.0, 20.0);
        let mut window = RollingWindow::new();
        window.push(&Levels::splat(100.0));
        window.push(&Levels::splat(0.0));

        let scene = OverlayRenderer::new(canvas).render(&window.snapshot());
        assert_eq!(scene.paths.len(), Dimension::COUNT);
        for path in &scene.paths {
            assert_eq!(path.points, vec![(0.0, 0.0), (200.0, 200.0)]);
            assert_eq!(path.segments().count(), 1);
        }
    }

    #[test]
    fn test_point_mapping() {
        let canvas = Canvas::new(100.0, 60.0, 10.0);
        assert_eq!(canvas.plot_height(), 50.0);
        assert_eq!(canvas.point(0, 5, 50.0), Some((0.0, 25.0)));
        assert_eq!(canvas.point(4, 5, 100.0), Some((100.0, 0.0)));
        assert_eq!(canvas.point(2, 5, 0.0), Some((50.0, 50.0)));
    }

    #[test]
    fn test_point_needs_two_samples() {
        let canvas = Canvas::default();
        assert_eq!(canvas.point(0, 0, 50.0), None);
        assert_eq!(canvas.point(0, 1, 50.0), None);
        assert_eq!(canvas.point(2, 2, 50.0), None);
        assert_eq!(canvas.point(1, 2, 50.0), Some((200.0, 100.0)));
    }

    #[test]
    fn test_gridlines_every_twenty_units() {
        let scene = OverlayRenderer::new(Canvas::new(200.0, 220.0, 20.0))
            .render(&RollingWindow::new().snapshot());
        assert_eq!(scene.gridlines.len(), 11);
        assert_eq!(scene.gridlines.first(), Some(&0.0));
        assert_eq!(scene.gridlines.last(), Some(&200.0));

        let short = OverlayRenderer::new(Canvas::new(200.0, 65.0, 20.0))
            .render(&RollingWindow::new().snapshot());
        assert_eq!(short.gridlines, vec![0.0, 20.0, 40.0]);
    }

    #[test]
    fn test_colors_are_stable_per_dimension() {
        let renderer = OverlayRenderer::new(Canvas::default());
        let mut window = RollingWindow::new();
        window.push(&Levels::splat(10.0));
        window.push(&Levels::splat(20.0));

        let first = renderer.render(&window.snapshot());
        window.push(&Levels::splat(90.0));
        let second = renderer.render(&window.snapshot());

        for (a, b) in first.paths.iter().zip(&second.paths) {
            assert_eq!(a.dimension, b.dimension);
            assert_eq!(a.color, b.color);
            assert_eq!(a.color, a.dimension.color());
        }
    }

    #[test]
    fn test_empty_window_draws_no_paths() {
        let renderer = OverlayRenderer::new(Canvas::default());
        let window = RollingWindow::new();
        let scene = renderer.render(&window.snapshot());
        assert!(scene.paths.is_empty());
        assert_eq!(renderer.palette().color(Dimension::Sad), Color::Rgb(30, 144, 255));
    }
}

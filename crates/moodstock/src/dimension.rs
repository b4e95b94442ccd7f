use ratatui::style::Color;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Neutral level used before any real sample exists
pub const NEUTRAL_LEVEL: f64 = 50.0;

pub const MIN_LEVEL: f64 = 0.0;
pub const MAX_LEVEL: f64 = 100.0;

/// The tracked emotions, in prompt / column / color order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    Happy,
    Sad,
    Mad,
    Silly,
    Devious,
    Sanity,
    Energy,
    Hunger,
}

impl Dimension {
    pub const COUNT: usize = 8;

    pub const ALL: [Dimension; Dimension::COUNT] = [
        Dimension::Happy,
        Dimension::Sad,
        Dimension::Mad,
        Dimension::Silly,
        Dimension::Devious,
        Dimension::Sanity,
        Dimension::Energy,
        Dimension::Hunger,
    ];

    /// Column name in the `emotions` table and the interchange header
    pub fn name(self) -> &'static str {
        match self {
            Dimension::Happy => "happy",
            Dimension::Sad => "sad",
            Dimension::Mad => "mad",
            Dimension::Silly => "silly",
            Dimension::Devious => "devious",
            Dimension::Sanity => "sanity",
            Dimension::Energy => "energy",
            Dimension::Hunger => "hunger",
        }
    }

    /// Capitalized name for prompts and reports
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Happy => "Happy",
            Dimension::Sad => "Sad",
            Dimension::Mad => "Mad",
            Dimension::Silly => "Silly",
            Dimension::Devious => "Devious",
            Dimension::Sanity => "Sanity",
            Dimension::Energy => "Energy",
            Dimension::Hunger => "Hunger",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Dimension::Happy => Color::Rgb(255, 215, 0),
            Dimension::Sad => Color::Rgb(30, 144, 255),
            Dimension::Mad => Color::Rgb(255, 69, 0),
            Dimension::Silly => Color::Rgb(255, 105, 180),
            Dimension::Devious => Color::Rgb(148, 0, 211),
            Dimension::Sanity => Color::Rgb(128, 128, 128),
            Dimension::Energy => Color::Rgb(255, 206, 92),
            Dimension::Hunger => Color::Rgb(82, 32, 13),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Clamp to [0, 100] and round to one decimal place
pub fn normalize_level(value: f64) -> f64 {
    let clamped = if value.is_nan() {
        MIN_LEVEL
    } else {
        value.clamp(MIN_LEVEL, MAX_LEVEL)
    };
    (clamped * 10.0).round() / 10.0
}

/// One value per dimension. Array-backed so a partial set cannot exist.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Levels([f64; Dimension::COUNT]);

impl Levels {
    pub fn splat(value: f64) -> Self {
        Levels([value; Dimension::COUNT])
    }

    pub fn neutral() -> Self {
        Self::splat(NEUTRAL_LEVEL)
    }

    pub fn from_fn(mut f: impl FnMut(Dimension) -> f64) -> Self {
        let mut values = [0.0; Dimension::COUNT];
        for dim in Dimension::ALL {
            values[dim.index()] = f(dim);
        }
        Levels(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.iter().map(move |&d| (d, self.0[d.index()]))
    }
}

impl Default for Levels {
    fn default() -> Self {
        Self::neutral()
    }
}

impl Index<Dimension> for Levels {
    type Output = f64;

    fn index(&self, dim: Dimension) -> &f64 {
        &self.0[dim.index()]
    }
}

impl IndexMut<Dimension> for Levels {
    fn index_mut(&mut self, dim: Dimension) -> &mut f64 {
        &mut self.0[dim.index()]
    }
}

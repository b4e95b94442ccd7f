use crate::dimension::{Dimension, MAX_LEVEL, MIN_LEVEL, normalize_level};
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// What the cycle asks the operator for one dimension
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub dimension: Dimension,
    /// Pre-filled value (previous sample, or the neutral level)
    pub default: f64,
    pub min: f64,
    pub max: f64,
}

impl PromptRequest {
    pub fn new(dimension: Dimension, default: f64) -> Self {
        PromptRequest {
            dimension,
            default: normalize_level(default),
            min: MIN_LEVEL,
            max: MAX_LEVEL,
        }
    }

    /// Window title, e.g. `Happy (0–100%)`
    pub fn title(&self) -> String {
        format!("{} (0–100%)", self.dimension.label())
    }

    pub fn question(&self) -> String {
        format!("How much {}?", self.dimension.name())
    }

    /// Clamp to bounds and round to one decimal
    pub fn normalize(&self, value: f64) -> f64 {
        normalize_level(value).clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PromptAnswer {
    Accepted(f64),
    Cancelled,
}

/// Modal numeric input. Blocks until the operator answers or cancels.
pub trait Prompter {
    fn ask(&mut self, request: &PromptRequest) -> PromptAnswer;
}

/// Line-based prompter for headless mode.
///
/// Blank input keeps the default, `c` cancels, end of input cancels.
/// Unparsable or out-of-range input is rejected and asked again.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
    /// Cleared on shutdown; no prompt is shown once it is false
    running: Option<Arc<AtomicBool>>,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        LinePrompter {
            input,
            output,
            running: None,
        }
    }

    /// Cancel instead of prompting once `running` is cleared
    pub fn with_running(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = Some(running);
        self
    }

    fn stopped(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|r| !r.load(Ordering::SeqCst))
    }
}

impl LinePrompter<std::io::StdinLock<'static>, std::io::Stderr> {
    pub fn stdio() -> Self {
        LinePrompter::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, request: &PromptRequest) -> PromptAnswer {
        loop {
            if self.stopped() {
                return PromptAnswer::Cancelled;
            }

            let _ = write!(
                self.output,
                "{} {} [{:.1}] ",
                request.title(),
                request.question(),
                request.default
            );
            let _ = self.output.flush();

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return PromptAnswer::Cancelled,
                Ok(_) => {}
            }

            let answer = line.trim();
            if answer.is_empty() {
                return PromptAnswer::Accepted(request.default);
            }
            if answer.eq_ignore_ascii_case("c") || answer.eq_ignore_ascii_case("cancel") {
                return PromptAnswer::Cancelled;
            }

            match answer.parse::<f64>() {
                Ok(value) if request.contains(value) => {
                    return PromptAnswer::Accepted(request.normalize(value));
                }
                _ => {
                    let _ = writeln!(
                        self.output,
                        "Enter a number between {:.0} and {:.0}",
                        request.min, request.max
                    );
                }
            }
        }
    }
}

//! The sampling state machine: wait, prompt, persist, update the window, report.

use crate::audio::Chime;
use crate::dimension::{Dimension, Levels};
use crate::error::Error;
use crate::prompt::{PromptAnswer, PromptRequest, Prompter};
use crate::storage::{Sample, SampleStore};
use crate::trend::{DEFAULT_CRASH_THRESHOLD, TrendReport};
use crate::window::RollingWindow;
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_FIRST_DELAY: Duration = Duration::from_secs(1);

/// One-shot deadline, re-armed explicitly after every cycle.
///
/// Never recurring: a long prompt cannot cause a second cycle to queue up behind it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Schedule {
    deadline: Option<Instant>,
}

impl Schedule {
    pub fn arm(&mut self, at: Instant) {
        self.deadline = Some(at);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Time left until the deadline (zero when due, `None` when disarmed)
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Prompting,
    Resolved,
    Cancelled,
}

#[derive(Debug)]
pub enum CycleOutcome {
    /// Every dimension answered and the sample was persisted
    Resolved { sample: Sample, report: TrendReport },
    /// Operator aborted at `at`; nothing changed
    Cancelled { at: Dimension },
    /// All answers collected but the store rejected the row; nothing changed
    Failed(Error),
}

impl CycleOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, CycleOutcome::Resolved { .. })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CycleConfig {
    pub interval: Duration,
    pub first_delay: Duration,
    pub crash_threshold: f64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        CycleConfig {
            interval: DEFAULT_INTERVAL,
            first_delay: DEFAULT_FIRST_DELAY,
            crash_threshold: DEFAULT_CRASH_THRESHOLD,
        }
    }
}

pub struct SamplingCycle {
    config: CycleConfig,
    state: CycleState,
    schedule: Schedule,
    /// Baseline for the next trend; only updated by resolved cycles
    previous: Levels,
    completed: u64,
}

impl SamplingCycle {
    /// Start idle with the first tick `first_delay` after `now`
    pub fn new(config: CycleConfig, now: Instant) -> Self {
        let mut schedule = Schedule::default();
        schedule.arm(now + config.first_delay);
        SamplingCycle {
            config,
            state: CycleState::Idle,
            schedule,
            previous: Levels::neutral(),
            completed: 0,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn previous(&self) -> &Levels {
        &self.previous
    }

    /// Number of resolved cycles since startup
    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.state == CycleState::Idle && self.schedule.is_due(now)
    }

    /// Pull the next tick forward to `now`
    pub fn trigger_now(&mut self, now: Instant) {
        if self.state == CycleState::Idle {
            self.schedule.arm(now);
        }
    }

    /// Run a cycle if the tick is due
    pub fn poll(
        &mut self,
        now: Instant,
        prompter: &mut dyn Prompter,
        chime: &dyn Chime,
        store: &SampleStore,
        window: &mut RollingWindow,
    ) -> Option<CycleOutcome> {
        if !self.is_due(now) {
            return None;
        }
        Some(self.run(prompter, chime, store, window))
    }

    /// Run one full cycle and re-arm the schedule, whatever the outcome
    pub fn run(
        &mut self,
        prompter: &mut dyn Prompter,
        chime: &dyn Chime,
        store: &SampleStore,
        window: &mut RollingWindow,
    ) -> CycleOutcome {
        self.schedule.disarm();
        self.transition(CycleState::Prompting);
        chime.play();

        let outcome = match self.collect(prompter) {
            Err(at) => {
                info!("Prompt cancelled at {}; skipping update", at);
                self.transition(CycleState::Cancelled);
                CycleOutcome::Cancelled { at }
            }
            Ok(current) => {
                self.transition(CycleState::Resolved);
                self.resolve(current, store, window)
            }
        };

        self.schedule.arm(Instant::now() + self.config.interval);
        self.transition(CycleState::Idle);
        outcome
    }

    /// Ask every dimension in order. `Err` carries the dimension that was cancelled.
    fn collect(&self, prompter: &mut dyn Prompter) -> Result<Levels, Dimension> {
        let mut current = self.previous;
        for dim in Dimension::ALL {
            let request = PromptRequest::new(dim, self.previous[dim]);
            match prompter.ask(&request) {
                PromptAnswer::Accepted(value) => current[dim] = request.normalize(value),
                PromptAnswer::Cancelled => return Err(dim),
            }
        }
        Ok(current)
    }

    fn resolve(
        &mut self,
        current: Levels,
        store: &SampleStore,
        window: &mut RollingWindow,
    ) -> CycleOutcome {
        let sample = Sample::now(current);
        if let Err(e) = store.append(&sample) {
            error!("Failed to persist sample {}: {}", sample.timestamp, e);
            return CycleOutcome::Failed(e);
        }

        window.push(&current);
        let report = TrendReport::new(&self.previous, &current, self.config.crash_threshold);
        self.previous = current;
        self.completed += 1;

        if report.crash {
            warn!("Crash alert: a dimension fell more than {:.0}%", -self.config.crash_threshold);
        }
        info!("Sample recorded at {}", sample.timestamp);

        CycleOutcome::Resolved { sample, report }
    }

    fn transition(&mut self, next: CycleState) {
        debug!("Cycle {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

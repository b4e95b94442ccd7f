use super::prompt::TerminalPrompter;
use super::ui::{self, OverlayView};
use crate::audio::Chime;
use crate::cycle::{CycleConfig, CycleOutcome, SamplingCycle};
use crate::error::Result;
use crate::render::{Canvas, OverlayRenderer, Scene};
use crate::storage::SampleStore;
use crate::trend::TrendReport;
use crate::window::RollingWindow;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{info, warn};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::io::stdout;
use std::time::{Duration, Instant};

/// Longest we sit in `event::poll` before re-checking the schedule
const MAX_POLL: Duration = Duration::from_millis(250);

/// The overlay: owns the store, the window and the cycle for the process lifetime
pub struct App {
    store: SampleStore,
    window: RollingWindow,
    cycle: SamplingCycle,
    renderer: OverlayRenderer,
    chime: Box<dyn Chime>,
    /// Overlay size in terminal cells
    size: (u16, u16),
    scene: Scene,
    last_report: Option<TrendReport>,
    status: String,
    samples: u64,
    /// Countdown text currently on screen
    shown_countdown: Option<String>,
    running: bool,
}

impl App {
    pub fn new(
        store: SampleStore,
        chime: Box<dyn Chime>,
        config: CycleConfig,
        canvas: Canvas,
        size: (u16, u16),
    ) -> Result<Self> {
        let mut window = RollingWindow::new();
        let history = store.recent(window.capacity())?;
        window.seed(&history);
        let samples = store.count()?;
        info!(
            "Overlay seeded with {} of {} stored samples",
            window.len(),
            samples
        );

        let renderer = OverlayRenderer::new(canvas);
        let scene = renderer.render(&window.snapshot());

        Ok(App {
            store,
            window,
            cycle: SamplingCycle::new(config, Instant::now()),
            renderer,
            chime,
            size,
            scene,
            last_report: None,
            status: String::new(),
            samples,
            shown_countdown: None,
            running: true,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        // Historical data is on screen before the first prompt
        self.draw(terminal)?;

        while self.running {
            let now = Instant::now();
            let poll_duration = self
                .cycle
                .schedule()
                .remaining(now)
                .unwrap_or(MAX_POLL)
                .min(MAX_POLL);

            let mut needs_redraw = false;

            if event::poll(poll_duration)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key.code, key.modifiers);
                        needs_redraw = true;
                    }
                    Event::Resize(_, _) | Event::FocusGained => needs_redraw = true,
                    _ => {}
                }
            }

            if self.running && self.cycle.is_due(Instant::now()) {
                self.run_cycle(terminal);
                needs_redraw = true;
            }

            // Between cycles only the footer countdown text can change
            let countdown = self
                .cycle
                .schedule()
                .remaining(Instant::now())
                .map(ui::format_countdown);
            if needs_redraw || countdown != self.shown_countdown {
                self.draw(terminal)?;
            }
        }

        Ok(())
    }

    fn run_cycle<B: Backend>(&mut self, terminal: &mut Terminal<B>) {
        let view = OverlayView {
            scene: &self.scene,
            size: self.size,
            report: self.last_report.as_ref(),
            status: &self.status,
            next_tick: None,
            samples: self.samples,
        };
        let mut prompter = TerminalPrompter::new(terminal, view);

        let outcome = self.cycle.run(
            &mut prompter,
            self.chime.as_ref(),
            &self.store,
            &mut self.window,
        );
        let quit = prompter.quit_requested();

        match outcome {
            CycleOutcome::Resolved { sample, report } => {
                self.samples += 1;
                self.scene = self.renderer.render(&self.window.snapshot());
                self.status = if report.crash {
                    "⚠️ EMOTIONAL CRASH IMMINENT ⚠️".to_string()
                } else {
                    format!("saved {}", short_time(&sample.timestamp))
                };
                info!("{}", report.to_string().trim_end());
                self.last_report = Some(report);
            }
            CycleOutcome::Cancelled { at } => {
                self.status = format!("skipped at {}", at);
            }
            CycleOutcome::Failed(e) => {
                warn!("Sample discarded: {}", e);
                self.status = format!("could not save sample: {}", e);
            }
        }

        if quit {
            self.running = false;
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        match key {
            KeyCode::Char('c') if ctrl => self.running = false,
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('s') => self.cycle.trigger_now(Instant::now()),
            _ => {}
        }
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let next_tick = self.cycle.schedule().remaining(Instant::now());
        self.shown_countdown = next_tick.map(ui::format_countdown);

        let view = OverlayView {
            scene: &self.scene,
            size: self.size,
            report: self.last_report.as_ref(),
            status: &self.status,
            next_tick,
            samples: self.samples,
        };
        terminal.draw(|frame| ui::render(frame, &view))?;
        Ok(())
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn window(&self) -> &RollingWindow {
        &self.window
    }
}

/// `HH:MM` from a stored timestamp
fn short_time(timestamp: &str) -> &str {
    timestamp.get(11..16).unwrap_or(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Silent;
    use crate::dimension::{Dimension, Levels};
    use crate::storage::Sample;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_app_seeds_window_from_store() {
        let store = SampleStore::open_in_memory().unwrap();
        for i in 0..30 {
            store
                .append(&Sample::new(
                    format!("2024-05-01T10:{i:02}:00.000000"),
                    Levels::splat(i as f64),
                ))
                .unwrap();
        }

        let app = App::new(
            store,
            Box::new(Silent),
            CycleConfig::default(),
            Canvas::default(),
            (40, 12),
        )
        .unwrap();

        assert_eq!(app.window().len(), 25);
        assert_eq!(app.window().snapshot().latest(Dimension::Happy), Some(29.0));
        assert_eq!(app.scene().paths.len(), Dimension::COUNT);
        assert_eq!(app.samples, 30);
    }

    #[test]
    fn test_keys() {
        let store = SampleStore::open_in_memory().unwrap();
        let mut app = App::new(
            store,
            Box::new(Silent),
            CycleConfig::default(),
            Canvas::default(),
            (40, 12),
        )
        .unwrap();

        assert!(app.scene().paths.is_empty());
        app.handle_key(KeyCode::Char('s'), KeyModifiers::NONE);
        assert!(app.cycle.is_due(Instant::now()));
        app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(!app.running);
    }

    #[test]
    fn test_idle_countdown_changes_once_a_minute() {
        let store = SampleStore::open_in_memory().unwrap();
        let config = CycleConfig {
            first_delay: Duration::from_secs(600),
            ..CycleConfig::default()
        };
        let mut app = App::new(store, Box::new(Silent), config, Canvas::default(), (40, 12)).unwrap();
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();

        app.draw(&mut terminal).unwrap();
        assert_eq!(app.shown_countdown.as_deref(), Some("10m"));

        // A few seconds later the footer text is unchanged, so the loop skips the redraw
        let later = app
            .cycle
            .schedule()
            .remaining(Instant::now() + Duration::from_secs(5))
            .map(ui::format_countdown);
        assert_eq!(later, app.shown_countdown);
    }

    #[test]
    fn test_short_time() {
        assert_eq!(short_time("2024-05-01T10:42:07.000000"), "10:42");
        assert_eq!(short_time("odd"), "odd");
    }
}

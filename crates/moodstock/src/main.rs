use anyhow::Context;
use clap::Parser;
use moodstock::audio::{self, Chime};
use moodstock::cli::{Cli, Command};
use moodstock::cycle::{CycleConfig, CycleOutcome, SamplingCycle};
use moodstock::error::exit_code;
use moodstock::prompt::LinePrompter;
use moodstock::storage::SampleStore;
use moodstock::window::RollingWindow;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS as u8),
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(moodstock_err) = e.downcast_ref::<moodstock::Error>() {
                ExitCode::from(moodstock_err.exit_code() as u8)
            } else {
                ExitCode::from(exit_code::GENERAL_ERROR as u8)
            }
        }
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Validate CLI arguments
    cli.validate()
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Invalid arguments")?;

    if let Some(Command::Completions { shell }) = cli.command {
        use clap::CommandFactory;
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "moodstock", &mut std::io::stdout());
        return Ok(());
    }

    let overlay = cli.command.is_none() && !cli.headless;
    init_logging(overlay.then(|| log_path(&cli.db)))?;

    let mut store = SampleStore::open(&cli.db)
        .with_context(|| format!("Failed to open sample store {}", cli.db.display()))?;

    match &cli.command {
        Some(Command::Export { file }) => {
            moodstock::commands::export::run(&store, file)?;
        }
        Some(Command::Import { file }) => {
            moodstock::commands::import::run(&mut store, file)?;
        }
        Some(Command::History { count }) => {
            moodstock::commands::history::run(&store, *count)?;
        }
        Some(Command::Completions { .. }) => unreachable!("handled above"),
        None => {
            let config = CycleConfig {
                interval: cli.interval,
                first_delay: cli.first_delay,
                crash_threshold: cli.threshold,
            };
            let chime = audio::chime_for(&cli.sound, cli.mute);

            if cli.headless {
                run_headless(store, chime, config)?;
            } else {
                log::info!("Overlay started, database {}", cli.db.display());
                moodstock::tui::run(store, chime, config, cli.overlay_size())?;
            }
        }
    }

    Ok(())
}

/// Log next to the database so the overlay's alternate screen stays clean
fn log_path(db: &Path) -> PathBuf {
    match db.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join("moodstock.log"),
        _ => PathBuf::from("moodstock.log"),
    }
}

fn init_logging(file: Option<PathBuf>) -> anyhow::Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Some(path) = file {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        }
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }

    builder.init();
    Ok(())
}

fn run_headless(
    store: SampleStore,
    chime: Box<dyn Chime>,
    config: CycleConfig,
) -> anyhow::Result<()> {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    let running = Arc::new(AtomicBool::new(true));
    let prompting = Arc::new(AtomicBool::new(false));
    let r = running.clone();
    let p = prompting.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
        // read_line never returns on its own; an interrupted append is rolled back by SQLite
        if p.load(Ordering::SeqCst) {
            eprintln!();
            std::process::exit(exit_code::SUCCESS);
        }
    })
    .context("Failed to set Ctrl-C handler")?;

    let mut window = RollingWindow::new();
    let history = store.recent(window.capacity())?;
    window.seed(&history);

    let mut cycle = SamplingCycle::new(config, Instant::now());
    let mut prompter = LinePrompter::stdio().with_running(running.clone());

    eprintln!(
        "Sampling every {} (Ctrl-C to stop)...",
        humantime::format_duration(config.interval)
    );

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        prompting.store(cycle.is_due(now), Ordering::SeqCst);
        let outcome = cycle.poll(now, &mut prompter, chime.as_ref(), &store, &mut window);
        prompting.store(false, Ordering::SeqCst);

        match outcome {
            Some(CycleOutcome::Resolved { report, .. }) => print!("{report}"),
            Some(CycleOutcome::Cancelled { at }) => {
                eprintln!("Skipped: cancelled at {}", at.label())
            }
            Some(CycleOutcome::Failed(e)) => eprintln!("Sample discarded: {}", e),
            None => std::thread::sleep(Duration::from_millis(100)),
        }
    }

    eprintln!("Stopped after {} samples", cycle.completed());
    Ok(())
}

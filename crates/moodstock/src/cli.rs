use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Default interchange file for `export` and `import`
pub const DEFAULT_EXPORT_FILE: &str = "data/emotions_export.csv";

#[derive(Parser, Debug)]
#[command(name = "moodstock")]
#[command(about = "Emotion sampling overlay charted like a stock ticker")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Sample database path
    #[arg(long, global = true, default_value = "data/emotions.db")]
    pub db: PathBuf,

    /// Time between prompts
    #[arg(long, short = 'i', default_value = "10m", value_parser = parse_duration)]
    pub interval: Duration,

    /// Delay before the first prompt
    #[arg(long, default_value = "1s", value_parser = parse_duration)]
    pub first_delay: Duration,

    /// Percentage drop in any dimension that raises the crash alert
    #[arg(long, short = 't', default_value = "-20", allow_hyphen_values = true)]
    pub threshold: f64,

    /// Sound played when a prompt opens
    #[arg(long, default_value = "data/sqek.mp3")]
    pub sound: PathBuf,

    /// Never play the prompt sound
    #[arg(long)]
    pub mute: bool,

    /// Overlay width in terminal cells
    #[arg(long, default_value = "40")]
    pub width: u16,

    /// Overlay height in terminal cells, title row included
    #[arg(long, default_value = "12")]
    pub height: u16,

    /// Disable the overlay, prompt on stdin and report on stdout
    #[arg(long, short = 'q')]
    pub headless: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write every stored sample to a CSV file
    Export {
        /// Destination file
        #[arg(long, short = 'f', default_value = DEFAULT_EXPORT_FILE)]
        file: PathBuf,
    },

    /// Replace all stored samples with the rows of a CSV file
    Import {
        /// Source file
        #[arg(long, short = 'f', default_value = DEFAULT_EXPORT_FILE)]
        file: PathBuf,
    },

    /// Show the most recent samples
    History {
        /// Number of samples to display
        #[arg(long, short = 'n', default_value = "10")]
        count: usize,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    // Try humantime first
    if let Ok(d) = humantime::parse_duration(s) {
        return Ok(d);
    }

    // Try bare number as seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    Err(format!(
        "Invalid duration '{}'. Examples: 30s, 10m, 1h, 90",
        s
    ))
}

impl Cli {
    pub fn validate(&self) -> Result<(), String> {
        if self.interval.is_zero() {
            return Err("Interval must be greater than zero".to_string());
        }

        if !self.threshold.is_finite() || self.threshold >= 0.0 {
            return Err(format!(
                "Crash threshold must be a negative percentage, got {}",
                self.threshold
            ));
        }

        if self.width < 10 || self.height < 3 {
            return Err(format!(
                "Overlay must be at least 10x3 cells, got {}x{}",
                self.width, self.height
            ));
        }

        Ok(())
    }

    /// Terminal cells reserved for the overlay
    pub fn overlay_size(&self) -> (u16, u16) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["moodstock"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.db, PathBuf::from("data/emotions.db"));
        assert_eq!(cli.interval, Duration::from_secs(600));
        assert_eq!(cli.first_delay, Duration::from_secs(1));
        assert_eq!(cli.threshold, -20.0);
        assert_eq!(cli.overlay_size(), (40, 12));
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("90"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_duration("5m"), Ok(Duration::from_secs(300)));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn test_negative_threshold_and_validation() {
        let cli = Cli::try_parse_from(["moodstock", "--threshold", "-35.5"]).unwrap();
        assert_eq!(cli.threshold, -35.5);
        assert!(cli.validate().is_ok());

        let cli = Cli::try_parse_from(["moodstock", "--threshold", "5"]).unwrap();
        assert!(cli.validate().is_err());

        let cli = Cli::try_parse_from(["moodstock", "--interval", "0"]).unwrap();
        assert!(cli.validate().is_err());

        let cli = Cli::try_parse_from(["moodstock", "--height", "2"]).unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::try_parse_from(["moodstock", "export", "--db", "x.db"]).unwrap();
        assert_eq!(cli.db, PathBuf::from("x.db"));
        match cli.command {
            Some(Command::Export { file }) => {
                assert_eq!(file, PathBuf::from(DEFAULT_EXPORT_FILE))
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["moodstock", "history", "-n", "3"]).unwrap();
        assert!(matches!(cli.command, Some(Command::History { count: 3 })));
    }
}

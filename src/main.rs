use clap::{error::ErrorKind, CommandFactory, Parser};
use colorlock::{
    app::App,
    app_dirs::AppDirs,
    board::Board,
    config::{Config, ConfigStore, FileConfigStore},
    game::{GameConfig, Preset, RoundSchedule},
    logging,
    palette::Color,
    runtime::{CrosstermEventSource, GameEvent, Runner},
};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};
use tracing::info;

const TICK_RATE_MS: u64 = 20;

/// color sequence memory game that unlocks a code
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Watch the pads flash, then repeat the sequence before time runs out. Win enough rounds and the success code is revealed; otherwise you get the failure code. Flags override the saved config file."
)]
pub struct Cli {
    /// round policy to start from
    #[clap(long, value_enum)]
    preset: Option<Preset>,

    /// number of rounds in a session
    #[clap(short = 'r', long)]
    rounds: Option<usize>,

    /// pattern length: one value for every round, or a comma separated list per round
    #[clap(short = 'l', long, value_delimiter = ',')]
    lengths: Vec<usize>,

    /// time to repeat a pattern in milliseconds: one value or a comma separated list per round
    #[clap(short = 't', long, value_delimiter = ',')]
    time_limits_ms: Vec<u64>,

    /// wins needed to reveal the success code
    #[clap(short = 'w', long)]
    min_wins: Option<usize>,

    /// code revealed after enough wins
    #[clap(long)]
    success_code: Option<String>,

    /// code revealed otherwise
    #[clap(long)]
    failure_code: Option<String>,

    /// pads in play, comma separated
    #[clap(short = 'p', long, value_enum, value_delimiter = ',')]
    palette: Vec<Color>,

    /// seed for reproducible patterns
    #[clap(long)]
    seed: Option<u64>,

    /// write the resulting settings to the config file
    #[clap(long)]
    save_config: bool,

    /// do not ring the terminal bell on results
    #[clap(long)]
    quiet: bool,
}

impl Cli {
    /// Layer the flags over settings loaded from disk
    fn apply(&self, base: Config) -> Config {
        let mut cfg = match self.preset {
            Some(preset) => base.with_preset(preset),
            None => base,
        };
        if let Some(rounds) = self.rounds {
            cfg.total_rounds = rounds;
        }
        if let Some(lengths) = RoundSchedule::from_values(self.lengths.clone()) {
            cfg.pattern_lengths = lengths;
        }
        if let Some(limits) = RoundSchedule::from_values(self.time_limits_ms.clone()) {
            cfg.time_limits_ms = limits;
        }
        if let Some(min_wins) = self.min_wins {
            cfg.min_wins = min_wins;
        }
        if let Some(code) = &self.success_code {
            cfg.success_code = code.clone();
        }
        if let Some(code) = &self.failure_code {
            cfg.failure_code = code.clone();
        }
        if !self.palette.is_empty() {
            cfg.palette = self.palette.clone();
        }
        cfg
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = AppDirs::log_path() {
        logging::init(&path);
    }

    let store = FileConfigStore::new();
    let settings = cli.apply(store.load());
    let config = match GameConfig::try_from(&settings) {
        Ok(config) => config,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, e).exit();
        }
    };
    if cli.save_config {
        store.save(&settings)?;
        info!(path = %store.path().display(), "config saved");
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, Board::new().with_bell(!cli.quiet), cli.seed);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );
    info!("session started");

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            GameEvent::Tick => app.on_tick(),
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if !app.on_key(key) {
                    break;
                }
            }
        }
    }

    info!(
        completed = app.engine.state().rounds_completed(),
        wins = app.engine.state().success_count(),
        "quit"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorlock::error::ConfigError;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["colorlock"]);
        assert_eq!(cli.preset, None);
        assert_eq!(cli.rounds, None);
        assert!(cli.lengths.is_empty());
        assert!(cli.palette.is_empty());
        assert!(!cli.save_config);
        assert_eq!(cli.apply(Config::default()), Config::default());
    }

    #[test]
    fn test_cli_lists() {
        let cli = Cli::parse_from(["colorlock", "-l", "3,4,5", "-t", "4000,3000,2000", "-r", "3"]);
        let cfg = cli.apply(Config::default());
        assert_eq!(cfg.total_rounds, 3);
        assert_eq!(cfg.pattern_lengths, RoundSchedule::PerRound(vec![3, 4, 5]));
        assert_eq!(
            cfg.time_limits_ms,
            RoundSchedule::PerRound(vec![4000, 3000, 2000])
        );
        assert!(cfg.to_game_config().is_ok());
    }

    #[test]
    fn test_cli_single_values_become_constants() {
        let cli = Cli::parse_from(["colorlock", "--lengths", "6", "--time-limits-ms", "5000"]);
        let cfg = cli.apply(Config::default());
        assert_eq!(cfg.pattern_lengths, RoundSchedule::Constant(6));
        assert_eq!(cfg.time_limits_ms, RoundSchedule::Constant(5000));
    }

    #[test]
    fn test_cli_palette_and_codes() {
        let cli = Cli::parse_from([
            "colorlock",
            "-p",
            "red,yellow",
            "--success-code",
            "OPEN",
            "--failure-code",
            "SHUT",
            "-w",
            "4",
        ]);
        let cfg = cli.apply(Config::default());
        assert_eq!(cfg.palette, vec![Color::Red, Color::Yellow]);
        assert_eq!(cfg.success_code, "OPEN");
        assert_eq!(cfg.failure_code, "SHUT");
        assert_eq!(cfg.min_wins, 4);
    }

    #[test]
    fn test_cli_preset_then_overrides() {
        let cli = Cli::parse_from(["colorlock", "--preset", "classic", "-r", "7"]);
        let cfg = cli.apply(Config::default());
        assert_eq!(cfg.pattern_lengths, RoundSchedule::Constant(3));
        assert_eq!(cfg.total_rounds, 7);
        assert!(cfg.to_game_config().is_ok());
    }

    #[test]
    fn test_cli_overrides_that_break_the_config() {
        let cli = Cli::parse_from(["colorlock", "-r", "6"]);
        let cfg = cli.apply(Config::default());
        assert!(matches!(
            GameConfig::try_from(&cfg),
            Err(ConfigError::ScheduleTooShort { .. })
        ));
    }

    #[test]
    fn test_cli_rejects_unknown_color() {
        assert!(Cli::try_parse_from(["colorlock", "-p", "purple"]).is_err());
    }

    #[test]
    fn test_cli_seed_and_quiet() {
        let cli = Cli::parse_from(["colorlock", "--seed", "42", "--quiet"]);
        assert_eq!(cli.seed, Some(42));
        assert!(cli.quiet);
    }
}

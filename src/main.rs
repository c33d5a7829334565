pub mod catalog;
pub mod config;
pub mod feedback;
pub mod game;
pub mod praise;
pub mod round;
pub mod runtime;
pub mod timer;
pub mod ui;

use crate::config::{Config, ConfigStore, FileConfigStore};
use crate::feedback::{FeedbackSink, SilentFeedback, TerminalBell};
use crate::game::{GameSession, Phase, Trigger};
use crate::runtime::{CrosstermEventSource, GameEvent, Runner};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyModifiers},
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

const TICK_RATE_MS: u64 = 50;

/// timed arithmetic memory game for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Numbers flash on screen one at a time, then vanish. Keep the running sum in your head and type it in. Streaks multiply your score."
)]
pub struct Cli {
    /// difficulty preset to start on (defaults to the last one played)
    #[clap(short = 'p', long, value_enum)]
    preset: Option<PresetChoice>,

    /// seed for the number generator, for reproducible rounds
    #[clap(long)]
    seed: Option<u64>,

    /// disable the terminal-bell feedback cues
    #[clap(long)]
    mute: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum PresetChoice {
    Gentle,
    Steady,
    Brisk,
    Blazing,
}

impl PresetChoice {
    fn index(&self) -> usize {
        catalog::index_of(&self.to_string().to_lowercase()).unwrap_or(0)
    }
}

#[derive(Debug)]
pub struct App {
    pub session: GameSession,
    pub mute: bool,
}

impl App {
    pub fn new(cli: &Cli, cfg: &Config) -> Self {
        let session = match cli.seed {
            Some(seed) => GameSession::with_seed(catalog::PRESETS, seed),
            None => GameSession::new(catalog::PRESETS),
        };
        let mut app = Self {
            session,
            mute: cli.mute || cfg.mute,
        };

        // flag beats config file beats catalog head
        let index = cli
            .preset
            .map(|p| p.index())
            .or_else(|| cfg.preset_index())
            .unwrap_or(0);
        // selecting a preset in the start phase cannot fail
        let _ = app.session.apply(Trigger::SelectPreset(index));

        app
    }

    #[cfg(test)]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            session: GameSession::with_seed(catalog::PRESETS, seed),
            mute: true,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let mut app = App::new(&cli, &store.load());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    store: &FileConfigStore,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );
    let mut sink: Box<dyn FeedbackSink> = if app.mute {
        Box::new(SilentFeedback)
    } else {
        Box::new(TerminalBell)
    };

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            GameEvent::Tick => {
                for signal in app.session.on_tick(TICK_RATE_MS) {
                    sink.play(signal);
                }
            }
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break;
                }

                let phase = app.session.phase();

                // quit / abort keys first
                match key.code {
                    KeyCode::Esc if phase == Phase::Start => break,
                    KeyCode::Char('q') if phase == Phase::Start => break,
                    KeyCode::Esc => {
                        for signal in app.session.apply(Trigger::GoHome)? {
                            sink.play(signal);
                        }
                        continue;
                    }
                    _ => {}
                }

                if let Some(trigger) = map_key(phase, key.code, app.session.preset_index()) {
                    let starting = matches!(trigger, Trigger::StartGame);
                    for signal in app.session.apply(trigger)? {
                        sink.play(signal);
                    }
                    if starting {
                        // remember the difficulty for next launch; best effort
                        let _ = store.save(&Config {
                            preset: app.session.preset().name.to_string(),
                            mute: app.mute,
                        });
                    }
                }
            }
        }
    }

    Ok(())
}

/// Translate a key press into a session trigger for the current phase.
/// Anything unmapped is simply dropped, mirroring the session's own
/// ignore-what-does-not-apply policy.
fn map_key(phase: Phase, code: KeyCode, preset_index: usize) -> Option<Trigger> {
    match phase {
        Phase::Start => match code {
            KeyCode::Up | KeyCode::Char('k') => {
                Some(Trigger::SelectPreset(preset_index.saturating_sub(1)))
            }
            KeyCode::Down | KeyCode::Char('j') => Some(Trigger::SelectPreset(
                (preset_index + 1).min(catalog::PRESETS.len() - 1),
            )),
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                Some(Trigger::SelectPreset(c as usize - '1' as usize))
            }
            KeyCode::Enter => Some(Trigger::StartGame),
            _ => None,
        },
        Phase::Ready => match code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(Trigger::Advance),
            _ => None,
        },
        // only the internal timer moves the flash sequence along
        Phase::Flashing => None,
        Phase::Answering => match code {
            KeyCode::Char(c) if c.is_ascii_digit() => Some(Trigger::Digit(c as u8 - b'0')),
            KeyCode::Backspace | KeyCode::Char('c') => Some(Trigger::Clear),
            KeyCode::Enter => Some(Trigger::Submit),
            _ => None,
        },
        Phase::Result => match code {
            KeyCode::Char('r') | KeyCode::Char(' ') | KeyCode::Enter => Some(Trigger::Restart),
            KeyCode::Char('h') => Some(Trigger::GoHome),
            _ => None,
        },
    }
}

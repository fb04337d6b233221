use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::board::Board;
use crate::clock::{MonotonicTime, TimeSource, TimerQueue};
use crate::engine::{Phase, RoundEngine};
use crate::game::GameConfig;
use crate::input::ColorPad;

pub type Engine<S> = RoundEngine<Board, TimerQueue<S>, ColorPad>;

/// What a key asks the app to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Color(char),
    NewSession,
    Quit,
    Nothing,
}

impl From<KeyEvent> for Action {
    fn from(key: KeyEvent) -> Self {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }
        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Enter | KeyCode::Char(' ') => Action::Start,
            KeyCode::Char('n') => Action::NewSession,
            KeyCode::Char(c) => Action::Color(c),
            _ => Action::Nothing,
        }
    }
}

/// The game wired to the terminal board and keyboard pads.
pub struct App<S: TimeSource = MonotonicTime> {
    pub engine: Engine<S>,
}

impl App<MonotonicTime> {
    pub fn new(config: GameConfig, board: Board, seed: Option<u64>) -> Self {
        Self::with_time(config, board, MonotonicTime::new(), seed)
    }
}

impl<S: TimeSource + Clone + 'static> App<S> {
    /// The board shares `time` with the engine clock so fades and the
    /// countdown follow game time.
    pub fn with_time(config: GameConfig, board: Board, time: S, seed: Option<u64>) -> Self {
        let pad = ColorPad::new(config.palette());
        let board = board.with_time(time.clone());
        Self {
            engine: RoundEngine::new(config, board, TimerQueue::new(time), pad, seed),
        }
    }
}

impl<S: TimeSource> App<S> {

    pub fn board(&self) -> &Board {
        self.engine.presenter()
    }

    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    /// Dispatch whatever timers have come due.
    pub fn on_tick(&mut self) {
        self.engine.run_due();
    }

    /// Handle one key press. Returns false when the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        // timers that are already due happened before this key
        self.engine.run_due();

        match Action::from(key) {
            Action::Quit => return false,
            Action::Start => {
                self.engine.begin_round();
            }
            Action::NewSession => self.engine.new_session(),
            Action::Color(c) => match self.engine.input().press(c) {
                Some(color) => {
                    self.engine.on_input(color);
                }
                None => debug!(key = %c, "key dropped"),
            },
            Action::Nothing => {}
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualTime;
    use std::time::Duration;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn app() -> (App<ManualTime>, ManualTime) {
        let time = ManualTime::new();
        let app = App::with_time(GameConfig::default(), Board::new(), time.clone(), Some(1));
        (app, time)
    }

    fn open_input(app: &mut App<ManualTime>, time: &ManualTime) {
        time.advance(Duration::from_millis(1000));
        app.on_tick();
        time.advance(Duration::from_millis(2200));
        app.on_tick();
        assert_eq!(app.phase(), Phase::AwaitingInput);
    }

    #[test]
    fn key_mapping() {
        assert_eq!(Action::from(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)), Action::Quit);
        assert_eq!(
            Action::from(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(Action::from(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)), Action::Start);
        assert_eq!(Action::from(key(' ')), Action::Start);
        assert_eq!(Action::from(key('n')), Action::NewSession);
        assert_eq!(Action::from(key('g')), Action::Color('g'));
        assert_eq!(Action::from(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE)), Action::Nothing);
    }

    #[test]
    fn quit_returns_false() {
        let (mut app, _) = app();
        assert!(!app.on_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(app.on_key(key('x')));
    }

    #[test]
    fn start_key_begins_round_and_hides_start() {
        let (mut app, _) = app();
        assert!(app.board().start_enabled());
        app.on_key(key(' '));
        assert_eq!(app.phase(), Phase::Showing);
        assert!(!app.board().start_enabled());
        assert_eq!(app.board().prompt(), "Watch...");
    }

    #[test]
    fn color_keys_are_dropped_until_input_opens() {
        let (mut app, time) = app();
        app.on_key(key(' '));
        let first = app.engine.state().current_pattern()[0];
        app.on_key(key(first.key()));
        assert!(app.engine.state().user_progress().is_empty());

        open_input(&mut app, &time);
        app.on_key(key(first.key()));
        assert_eq!(app.engine.state().user_progress(), &[first]);
    }

    #[test]
    fn due_deadline_is_dispatched_before_a_key() {
        let (mut app, time) = app();
        app.on_key(key(' '));
        open_input(&mut app, &time);
        let first = app.engine.state().current_pattern()[0];
        time.advance(Duration::from_millis(3000));
        app.on_key(key(first.key()));
        assert_eq!(app.phase(), Phase::RoundEnding);
        assert!(app.engine.state().user_progress().is_empty());
        assert_eq!(app.engine.state().success_count(), 0);
    }
}

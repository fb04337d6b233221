use std::sync::mpsc;
use std::time::Duration;

use colorlock::app::App;
use colorlock::board::Board;
use colorlock::clock::ManualTime;
use colorlock::engine::Phase;
use colorlock::game::GameConfig;
use colorlock::runtime::{ChannelEventSource, GameEvent, Runner};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// Headless integration using the runtime Runner and App without a TTY.
// Game time is advanced by hand on every Tick so the flow is deterministic.

fn key(c: char) -> GameEvent {
    GameEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

/// Pump events until the channel is drained, moving game time 100ms per tick.
fn pump(app: &mut App<ManualTime>, time: &ManualTime, runner: &Runner<ChannelEventSource>, ticks: u32) -> bool {
    let mut seen = 0;
    for _ in 0..10_000u32 {
        match runner.step() {
            GameEvent::Tick => {
                time.advance(Duration::from_millis(100));
                app.on_tick();
                seen += 1;
                if seen >= ticks {
                    return true;
                }
            }
            GameEvent::Resize => {}
            GameEvent::Key(k) => {
                if !app.on_key(k) {
                    return false;
                }
            }
        }
    }
    true
}

#[test]
fn headless_round_is_won_through_keys() {
    let time = ManualTime::new();
    let mut app = App::with_time(GameConfig::default(), Board::new(), time.clone(), Some(4));
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(1));

    tx.send(key(' ')).unwrap();
    // pre-roll plus playback of three colors is 3.2s
    assert!(pump(&mut app, &time, &runner, 32));
    assert_eq!(app.phase(), Phase::AwaitingInput);

    for color in app.engine.state().current_pattern().to_vec() {
        tx.send(key(color.key())).unwrap();
    }
    assert!(pump(&mut app, &time, &runner, 1));
    assert_eq!(app.engine.state().success_count(), 1);
    assert_eq!(app.phase(), Phase::RoundEnding);

    assert!(pump(&mut app, &time, &runner, 20));
    assert_eq!(app.phase(), Phase::Idle);
    assert_eq!(app.board().prompt(), "Press start to continue");
}

#[test]
fn headless_keys_by_position_work_too() {
    let time = ManualTime::new();
    let mut app = App::with_time(GameConfig::default(), Board::new(), time.clone(), Some(9));
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(1));

    tx.send(GameEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)))
        .unwrap();
    pump(&mut app, &time, &runner, 32);

    let palette = app.engine.config().palette().to_vec();
    for color in app.engine.state().current_pattern().to_vec() {
        let pos = palette.iter().position(|c| *c == color).unwrap() + 1;
        tx.send(key(char::from_digit(pos as u32, 10).unwrap())).unwrap();
    }
    pump(&mut app, &time, &runner, 1);
    assert_eq!(app.engine.state().success_count(), 1);
}

#[test]
fn headless_escape_quits() {
    let time = ManualTime::new();
    let mut app = App::with_time(GameConfig::default(), Board::new(), time.clone(), None);
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(1));

    tx.send(GameEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)))
        .unwrap();
    assert!(!pump(&mut app, &time, &runner, 5));
}

#[test]
fn headless_idle_session_reveals_failure_code() {
    let time = ManualTime::new();
    let mut app = App::with_time(GameConfig::default(), Board::new(), time.clone(), Some(2));
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(1));

    for _ in 0..5 {
        tx.send(key(' ')).unwrap();
        // 1s pre-roll, up to 4.2s playback, 3s window, 2s pause
        pump(&mut app, &time, &runner, 110);
    }
    assert_eq!(app.phase(), Phase::Finished);
    assert_eq!(app.board().prompt(), "2202");
    assert_eq!(app.board().status(), "PASSWORD");
}

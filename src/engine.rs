//! The round state machine.
//!
//! `Idle -> Showing -> AwaitingInput -> RoundEnding -> Idle | Finished`
//!
//! Every timer the engine arms is recorded against the live round and all of
//! them are cancelled together whenever the round leaves a phase for good.
//! A fired timer that is not registered to the live round is dropped, which
//! keeps a round from being resolved twice.

use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info};

use crate::clock::{Clock, Fired, Timer, TimerHandle, TimerKind};
use crate::game::GameConfig;
use crate::input::InputSource;
use crate::palette::Color;
use crate::presenter::{Presenter, Sound, TextSlot};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    #[default]
    Idle,
    Showing,
    AwaitingInput,
    RoundEnding,
    Finished,
}

/// How a round was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum RoundOutcome {
    Win,
    WrongInput,
    Timeout,
}

/// Result of relaying one color press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    /// not accepting input right now
    Ignored,
    /// correct, more colors to go
    Matched,
    Resolved(RoundOutcome),
}

/// Mutable state of one session
#[derive(Debug, Clone, Default)]
pub struct RoundState {
    rounds_completed: usize,
    success_count: usize,
    current_pattern: Vec<Color>,
    user_progress: Vec<Color>,
    phase: Phase,
    outcomes: Vec<RoundOutcome>,
    disclosed: Option<String>,
    // identity of the live round, stamped on every timer it arms
    serial: u64,
    timers: Vec<TimerHandle>,
    deadline: Option<TimerHandle>,
    cadence: Option<TimerHandle>,
    pulses_left: u32,
    time_limit: Duration,
}

impl RoundState {
    pub fn rounds_completed(&self) -> usize {
        self.rounds_completed
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn current_pattern(&self) -> &[Color] {
        &self.current_pattern
    }

    pub fn user_progress(&self) -> &[Color] {
        &self.user_progress
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn outcomes(&self) -> &[RoundOutcome] {
        &self.outcomes
    }

    pub fn disclosed_code(&self) -> Option<&str> {
        self.disclosed.as_deref()
    }

    /// Time allowed to repeat the current pattern
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }
}

pub struct RoundEngine<P: Presenter, C: Clock, I: InputSource> {
    config: GameConfig,
    state: RoundState,
    presenter: P,
    clock: C,
    input: I,
    rng: StdRng,
}

impl<P: Presenter, C: Clock, I: InputSource> RoundEngine<P, C, I> {
    /// `seed` makes the drawn patterns reproducible.
    pub fn new(config: GameConfig, presenter: P, clock: C, input: I, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut engine = Self {
            config,
            state: RoundState::default(),
            presenter,
            clock,
            input,
            rng,
        };
        engine.present_new_session();
        engine
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn accepts_input(&self) -> bool {
        self.state.phase == Phase::AwaitingInput && self.input.is_enabled()
    }

    /// Start the next round. Returns false when the request was ignored or
    /// when every round has already been played, in which case the code is
    /// disclosed instead.
    pub fn begin_round(&mut self) -> bool {
        match self.state.phase {
            Phase::Idle => {}
            Phase::Finished => return false,
            phase => {
                debug!(%phase, "start request ignored");
                return false;
            }
        }

        if self.state.rounds_completed >= self.config.total_rounds() {
            self.disclose();
            return false;
        }

        let round = self.state.rounds_completed;
        let length = self.config.pattern_length(round);
        let palette = self.config.palette();
        let pattern: Vec<Color> = (0..length)
            .map(|_| palette[self.rng.gen_range(0..palette.len())])
            .collect();

        self.state.serial += 1;
        self.state.current_pattern = pattern;
        self.state.user_progress.clear();
        self.state.time_limit = self.config.time_limit(round);
        self.state.phase = Phase::Showing;
        info!(
            round = round + 1,
            length,
            limit_ms = self.state.time_limit.as_millis() as u64,
            "round started"
        );

        self.input.set_enabled(false);
        self.presenter.set_start_enabled(false);
        self.presenter.show_text(
            TextSlot::Status,
            &format!(
                "Round {} of {}. Sequence: {} colors.",
                round + 1,
                self.config.total_rounds(),
                length
            ),
        );
        self.presenter.show_text(TextSlot::Prompt, "Watch...");
        self.arm(self.config.timings().pre_roll, TimerKind::PreRoll);
        true
    }

    /// Relay a color press from the input source.
    pub fn on_input(&mut self, color: Color) -> Press {
        if !self.accepts_input() {
            debug!(%color, phase = %self.state.phase, "press while locked");
            return Press::Ignored;
        }

        let idx = self.state.user_progress.len();
        let press = if self.state.current_pattern.get(idx) == Some(&color) {
            self.state.user_progress.push(color);
            if self.state.user_progress.len() == self.state.current_pattern.len() {
                self.resolve(RoundOutcome::Win);
                Press::Resolved(RoundOutcome::Win)
            } else {
                Press::Matched
            }
        } else {
            self.resolve(RoundOutcome::WrongInput);
            Press::Resolved(RoundOutcome::WrongInput)
        };

        self.presenter.set_flash(color, true);
        self.arm(
            self.config.timings().press_flash,
            TimerKind::PressFlashOff(color),
        );
        press
    }

    /// Dispatch every timer that has come due. Returns how many fired.
    pub fn run_due(&mut self) -> usize {
        let mut fired = 0;
        while let Some(timer) = self.clock.poll_due() {
            self.on_timer(timer);
            fired += 1;
        }
        fired
    }

    pub fn on_timer(&mut self, fired: Fired) {
        let Fired { handle, timer } = fired;
        if timer.round != self.state.serial || !self.state.timers.contains(&handle) {
            debug!(?timer, "stale timer dropped");
            return;
        }
        if timer.kind != TimerKind::CadencePulse {
            self.state.timers.retain(|h| *h != handle);
        }

        match (timer.kind, self.state.phase) {
            (TimerKind::PreRoll, Phase::Showing) => self.start_playback(),
            (TimerKind::FlashOn(idx), Phase::Showing) => {
                if let Some(color) = self.state.current_pattern.get(idx).copied() {
                    self.presenter.set_flash(color, true);
                    self.presenter.play(Sound::Ding);
                }
            }
            (TimerKind::FlashOff(idx), Phase::Showing) => {
                if let Some(color) = self.state.current_pattern.get(idx).copied() {
                    self.presenter.set_flash(color, false);
                }
            }
            (TimerKind::PlaybackDone, Phase::Showing) => self.enable_input(),
            (TimerKind::CadencePulse, Phase::AwaitingInput) => self.pulse(),
            (TimerKind::Deadline, Phase::AwaitingInput) if self.state.deadline == Some(handle) => {
                self.state.deadline = None;
                self.resolve(RoundOutcome::Timeout);
            }
            (TimerKind::PressFlashOff(color), _) => self.presenter.set_flash(color, false),
            (TimerKind::ResultPause, Phase::RoundEnding) => self.finish_round(),
            (kind, phase) => debug!(?kind, %phase, "timer ignored in phase"),
        }
    }

    /// Throw away the current session and start over from round one.
    pub fn new_session(&mut self) {
        self.sweep();
        let serial = self.state.serial + 1;
        self.state = RoundState {
            serial,
            ..RoundState::default()
        };
        info!("new session");
        self.present_new_session();
    }

    fn present_new_session(&mut self) {
        self.input.set_enabled(false);
        for color in self.config.palette().to_vec() {
            self.presenter.set_flash(color, false);
        }
        self.presenter.set_countdown_cue(false);
        self.presenter
            .set_background_visible(true, self.config.timings().restore_fade);
        self.presenter.show_text(
            TextSlot::Status,
            &format!("{} rounds. Repeat each sequence in time.", self.config.total_rounds()),
        );
        self.presenter.show_text(TextSlot::Prompt, "Press start");
        self.presenter.set_start_enabled(true);
    }

    fn start_playback(&mut self) {
        let timings = *self.config.timings();
        let mut offset = Duration::ZERO;
        for idx in 0..self.state.current_pattern.len() {
            self.arm(offset, TimerKind::FlashOn(idx));
            self.arm(offset + timings.flash_on, TimerKind::FlashOff(idx));
            offset += timings.flash_on + timings.flash_gap;
        }
        self.arm(
            timings.playback(self.state.current_pattern.len()),
            TimerKind::PlaybackDone,
        );
    }

    fn enable_input(&mut self) {
        let limit = self.state.time_limit;
        let timings = *self.config.timings();
        self.state.phase = Phase::AwaitingInput;
        debug!(round = self.state.rounds_completed + 1, "awaiting input");

        self.presenter.set_background_visible(false, limit);
        self.presenter.set_countdown_cue(true);
        self.presenter.show_text(TextSlot::Prompt, "REPEAT!");

        self.state.pulses_left = timings.cadence_pulses;
        self.pulse();
        if self.state.pulses_left > 0 {
            let interval = timings.cadence_interval(limit);
            self.state.cadence = Some(self.arm_every(interval, TimerKind::CadencePulse));
        }
        self.state.deadline = Some(self.arm(limit, TimerKind::Deadline));
        self.input.set_enabled(true);
    }

    fn pulse(&mut self) {
        if self.state.pulses_left > 0 {
            self.presenter.play(Sound::Beep);
            self.state.pulses_left -= 1;
        }
        if self.state.pulses_left == 0 {
            if let Some(handle) = self.state.cadence.take() {
                self.cancel(handle);
            }
        }
    }

    fn resolve(&mut self, outcome: RoundOutcome) {
        self.input.set_enabled(false);
        self.sweep();

        if outcome == RoundOutcome::Win {
            self.state.success_count += 1;
        }
        self.state.rounds_completed += 1;
        self.state.outcomes.push(outcome);
        self.state.phase = Phase::RoundEnding;
        self.state.current_pattern.clear();
        self.state.user_progress.clear();
        info!(
            %outcome,
            completed = self.state.rounds_completed,
            wins = self.state.success_count,
            "round over"
        );

        for color in self.config.palette().to_vec() {
            self.presenter.set_flash(color, false);
        }
        self.presenter.set_countdown_cue(false);
        self.presenter.play(match outcome {
            RoundOutcome::Win => Sound::Bell,
            RoundOutcome::WrongInput | RoundOutcome::Timeout => Sound::Crash,
        });
        self.presenter.show_text(TextSlot::Prompt, "Stop");
        self.presenter.show_text(
            TextSlot::Status,
            &format!(
                "Rounds completed: {}/{}",
                self.state.rounds_completed,
                self.config.total_rounds()
            ),
        );
        self.arm(self.config.timings().result_pause, TimerKind::ResultPause);
    }

    fn finish_round(&mut self) {
        self.sweep();
        if self.state.rounds_completed >= self.config.total_rounds() {
            self.disclose();
            return;
        }

        self.state.phase = Phase::Idle;
        self.state.current_pattern.clear();
        self.state.user_progress.clear();
        self.presenter
            .set_background_visible(true, self.config.timings().restore_fade);
        self.presenter.set_start_enabled(true);
        self.presenter
            .show_text(TextSlot::Prompt, "Press start to continue");
    }

    fn disclose(&mut self) {
        self.sweep();
        let code = self.config.code_for(self.state.success_count).to_string();
        info!(
            wins = self.state.success_count,
            required = self.config.min_wins(),
            "session finished"
        );

        self.state.phase = Phase::Finished;
        self.input.set_enabled(false);
        self.presenter.set_start_enabled(false);
        self.presenter.set_countdown_cue(false);
        self.presenter
            .set_background_visible(true, self.config.timings().restore_fade);
        self.presenter.show_text(TextSlot::Status, "PASSWORD");
        self.presenter.show_text(TextSlot::Prompt, &code);
        self.state.disclosed = Some(code);
    }

    fn arm(&mut self, delay: Duration, kind: TimerKind) -> TimerHandle {
        let handle = self.clock.after(delay, self.timer(kind));
        self.state.timers.push(handle);
        handle
    }

    fn arm_every(&mut self, interval: Duration, kind: TimerKind) -> TimerHandle {
        let handle = self.clock.every(interval, self.timer(kind));
        self.state.timers.push(handle);
        handle
    }

    fn timer(&self, kind: TimerKind) -> Timer {
        Timer {
            round: self.state.serial,
            kind,
        }
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.clock.cancel(handle);
        self.state.timers.retain(|h| *h != handle);
    }

    /// Cancel every timer armed for the live round.
    fn sweep(&mut self) {
        for handle in self.state.timers.drain(..) {
            self.clock.cancel(handle);
        }
        self.state.deadline = None;
        self.state.cadence = None;
        self.state.pulses_left = 0;
    }
}

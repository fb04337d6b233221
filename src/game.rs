use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::palette::{default_palette, Color};

/// A per-round value: either the same for every round or listed per round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoundSchedule<T> {
    Constant(T),
    PerRound(Vec<T>),
}

impl<T> RoundSchedule<T> {
    /// One value becomes a constant, several become a per-round table.
    pub fn from_values(mut values: Vec<T>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(RoundSchedule::Constant),
            _ => Some(RoundSchedule::PerRound(values)),
        }
    }

    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> RoundSchedule<U> {
        match self {
            RoundSchedule::Constant(v) => RoundSchedule::Constant(f(v)),
            RoundSchedule::PerRound(values) => RoundSchedule::PerRound(values.iter().map(f).collect()),
        }
    }
}

impl<T: Copy> RoundSchedule<T> {
    /// Value for the zero-based `round`. Validation guarantees per-round tables
    /// cover every round, so the last entry is only a fallback.
    pub fn for_round(&self, round: usize) -> Option<T> {
        match self {
            RoundSchedule::Constant(v) => Some(*v),
            RoundSchedule::PerRound(values) => {
                values.get(round).or_else(|| values.last()).copied()
            }
        }
    }

    fn covers(&self, rounds: usize) -> Option<usize> {
        match self {
            RoundSchedule::Constant(_) => None,
            RoundSchedule::PerRound(values) if values.len() < rounds => Some(values.len()),
            RoundSchedule::PerRound(_) => None,
        }
    }

    fn values(&self, rounds: usize) -> Vec<T> {
        (0..rounds).filter_map(|r| self.for_round(r)).collect()
    }
}

/// Fixed delays of the round choreography
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub pre_roll: Duration,
    pub flash_on: Duration,
    pub flash_gap: Duration,
    pub result_pause: Duration,
    pub press_flash: Duration,
    pub restore_fade: Duration,
    pub cadence_pulses: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            pre_roll: Duration::from_millis(1000),
            flash_on: Duration::from_millis(600),
            flash_gap: Duration::from_millis(200),
            result_pause: Duration::from_millis(2000),
            press_flash: Duration::from_millis(100),
            restore_fade: Duration::from_millis(500),
            cadence_pulses: 5,
        }
    }
}

impl Timings {
    /// Length of the flash sequence for a pattern of `len` symbols.
    pub fn playback(&self, len: usize) -> Duration {
        let step = self.flash_on + self.flash_gap;
        (step * len as u32).saturating_sub(self.flash_gap)
    }

    /// Spacing of the countdown pulses so the last one lands on the limit.
    pub fn cadence_interval(&self, limit: Duration) -> Duration {
        limit / self.cadence_pulses.saturating_sub(1).max(1)
    }
}

/// Round policies that ship with the game
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum Preset {
    /// sequences grow from 3 to 5 colors, 3 seconds each
    Escalating,
    /// three colors every round, 3 seconds each
    Classic,
}

impl Preset {
    pub fn pattern_lengths(&self) -> RoundSchedule<usize> {
        match self {
            Preset::Escalating => RoundSchedule::PerRound(vec![3, 4, 4, 5, 5]),
            Preset::Classic => RoundSchedule::Constant(3),
        }
    }

    pub fn time_limits_ms(&self) -> RoundSchedule<u64> {
        RoundSchedule::Constant(3000)
    }
}

/// Immutable rules of one game, validated at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    total_rounds: usize,
    pattern_lengths: RoundSchedule<usize>,
    time_limits: RoundSchedule<Duration>,
    min_wins: usize,
    success_code: String,
    failure_code: String,
    palette: Vec<Color>,
    timings: Timings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_rounds: 5,
            pattern_lengths: Preset::Escalating.pattern_lengths(),
            time_limits: RoundSchedule::Constant(Duration::from_millis(3000)),
            min_wins: 3,
            success_code: "1520".to_string(),
            failure_code: "2202".to_string(),
            palette: default_palette(),
            timings: Timings::default(),
        }
    }
}

impl GameConfig {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        total_rounds: usize,
        pattern_lengths: RoundSchedule<usize>,
        time_limits: RoundSchedule<Duration>,
        min_wins: usize,
        success_code: impl Into<String>,
        failure_code: impl Into<String>,
        palette: Vec<Color>,
        timings: Timings,
    ) -> Result<Self> {
        let cfg = Self {
            total_rounds,
            pattern_lengths,
            time_limits,
            min_wins,
            success_code: success_code.into(),
            failure_code: failure_code.into(),
            palette,
            timings,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.total_rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        for (idx, color) in self.palette.iter().enumerate() {
            if self.palette[..idx].contains(color) {
                return Err(ConfigError::DuplicateColor(*color));
            }
        }
        if let Some(len) = self.pattern_lengths.covers(self.total_rounds) {
            return Err(ConfigError::ScheduleTooShort {
                schedule: "pattern lengths",
                len,
                rounds: self.total_rounds,
            });
        }
        if let Some(len) = self.time_limits.covers(self.total_rounds) {
            return Err(ConfigError::ScheduleTooShort {
                schedule: "time limits",
                len,
                rounds: self.total_rounds,
            });
        }
        if let Some(round) = self
            .pattern_lengths
            .values(self.total_rounds)
            .iter()
            .position(|len| *len == 0)
        {
            return Err(ConfigError::EmptyPattern { round: round + 1 });
        }
        if let Some(round) = self
            .time_limits
            .values(self.total_rounds)
            .iter()
            .position(Duration::is_zero)
        {
            return Err(ConfigError::ZeroTimeLimit { round: round + 1 });
        }
        if self.success_code.is_empty() {
            return Err(ConfigError::EmptyCode("success"));
        }
        if self.failure_code.is_empty() {
            return Err(ConfigError::EmptyCode("failure"));
        }
        if self.min_wins > self.total_rounds {
            tracing::warn!(
                min_wins = self.min_wins,
                total_rounds = self.total_rounds,
                "success code can never be disclosed"
            );
        }
        Ok(())
    }

    pub fn total_rounds(&self) -> usize {
        self.total_rounds
    }

    pub fn pattern_length(&self, round: usize) -> usize {
        self.pattern_lengths.for_round(round).unwrap_or(1)
    }

    pub fn time_limit(&self, round: usize) -> Duration {
        self.time_limits
            .for_round(round)
            .unwrap_or(Duration::from_millis(3000))
    }

    pub fn min_wins(&self) -> usize {
        self.min_wins
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// The code earned by `success_count` wins.
    pub fn code_for(&self, success_count: usize) -> &str {
        if success_count >= self.min_wins {
            &self.success_code
        } else {
            &self.failure_code
        }
    }
}

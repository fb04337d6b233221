use std::collections::BTreeSet;
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

use tracing::debug;

use crate::clock::{MonotonicTime, TimeSource};
use crate::palette::Color;
use crate::presenter::{Presenter, Sound, TextSlot};

/// Background visibility change in progress, stamped with game time
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    pub visible: bool,
    pub transition: Duration,
    pub since: Duration,
}

impl Fade {
    /// Opacity in `0.0..=1.0` at `now`, assuming the fade started from the
    /// opposite end.
    pub fn opacity(&self, now: Duration) -> f64 {
        let progress = if self.transition.is_zero() {
            1.0
        } else {
            let elapsed = now.saturating_sub(self.since);
            (elapsed.as_secs_f64() / self.transition.as_secs_f64()).min(1.0)
        };
        if self.visible {
            progress
        } else {
            1.0 - progress
        }
    }
}

/// Presentation model the terminal UI draws from.
pub struct Board {
    status: String,
    prompt: String,
    lit: BTreeSet<Color>,
    background: Fade,
    countdown: bool,
    start_enabled: bool,
    last_sound: Option<Sound>,
    bell: Option<Box<dyn Write>>,
    time: Box<dyn TimeSource>,
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("status", &self.status)
            .field("prompt", &self.prompt)
            .field("lit", &self.lit)
            .field("background", &self.background)
            .field("countdown", &self.countdown)
            .field("start_enabled", &self.start_enabled)
            .field("last_sound", &self.last_sound)
            .field("bell", &self.bell.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self {
            status: String::new(),
            prompt: String::new(),
            lit: BTreeSet::new(),
            background: Fade {
                visible: true,
                transition: Duration::ZERO,
                since: Duration::ZERO,
            },
            countdown: false,
            start_enabled: false,
            last_sound: None,
            bell: None,
            time: Box::new(MonotonicTime::new()),
        }
    }
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ring the terminal bell on sound cues
    pub fn with_bell(self, bell: bool) -> Self {
        if bell {
            self.with_bell_writer(io::stdout())
        } else {
            Self { bell: None, ..self }
        }
    }

    /// Send bell characters to `out` instead of stdout.
    pub fn with_bell_writer(mut self, out: impl Write + 'static) -> Self {
        self.bell = Some(Box::new(out));
        self
    }

    /// Read fade progress off `time`, normally the engine clock's source.
    pub fn with_time(mut self, time: impl TimeSource + 'static) -> Self {
        self.time = Box::new(time);
        self
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn is_lit(&self, color: Color) -> bool {
        self.lit.contains(&color)
    }

    pub fn background(&self) -> &Fade {
        &self.background
    }

    pub fn countdown_active(&self) -> bool {
        self.countdown
    }

    /// Share of the input window still left, read off the background fade.
    pub fn countdown_ratio(&self) -> Option<f64> {
        if !self.countdown || self.background.visible {
            return None;
        }
        Some(self.background.opacity(self.time.now()).clamp(0.0, 1.0))
    }

    pub fn start_enabled(&self) -> bool {
        self.start_enabled
    }

    pub fn last_sound(&self) -> Option<Sound> {
        self.last_sound
    }

    fn ring(&mut self) {
        let Some(out) = self.bell.as_mut() else {
            return;
        };
        if let Err(e) = out.write_all(b"\x07").and_then(|_| out.flush()) {
            debug!("bell unavailable: {e}");
        }
    }
}

impl Presenter for Board {
    fn show_text(&mut self, slot: TextSlot, value: &str) {
        match slot {
            TextSlot::Status => self.status = value.to_string(),
            TextSlot::Prompt => self.prompt = value.to_string(),
        }
    }

    fn set_flash(&mut self, color: Color, on: bool) {
        if on {
            self.lit.insert(color);
        } else {
            self.lit.remove(&color);
        }
    }

    fn set_background_visible(&mut self, visible: bool, transition: Duration) {
        self.background = Fade {
            visible,
            transition,
            since: self.time.now(),
        };
    }

    fn set_countdown_cue(&mut self, active: bool) {
        self.countdown = active;
    }

    fn set_start_enabled(&mut self, enabled: bool) {
        self.start_enabled = enabled;
    }

    fn play(&mut self, sound: Sound) {
        self.last_sound = Some(sound);
        self.ring();
    }
}

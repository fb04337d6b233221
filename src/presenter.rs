use std::time::Duration;

use crate::palette::Color;

/// Text areas on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSlot {
    /// round progress and results
    Status,
    /// short instruction, or the disclosed code at the end
    Prompt,
}

/// Audible cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Sound {
    Beep,
    Ding,
    Crash,
    Bell,
}

/// Display surface driven by the engine.
///
/// Every call is fire-and-forget. Implementations swallow their own failures;
/// nothing they do can feed back into the round state.
pub trait Presenter {
    fn show_text(&mut self, slot: TextSlot, value: &str);
    fn set_flash(&mut self, color: Color, on: bool);
    fn set_background_visible(&mut self, visible: bool, transition: Duration);
    fn set_countdown_cue(&mut self, active: bool);
    fn set_start_enabled(&mut self, enabled: bool);
    fn play(&mut self, sound: Sound);
}

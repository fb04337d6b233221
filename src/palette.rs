use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A pad the player can press. The palette in use is a subset of these.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
}

impl Color {
    /// Letter key bound to this pad
    pub fn key(&self) -> char {
        match self {
            Color::Red => 'r',
            Color::Green => 'g',
            Color::Blue => 'b',
            Color::Yellow => 'y',
        }
    }
}

pub fn default_palette() -> Vec<Color> {
    vec![Color::Red, Color::Green, Color::Blue]
}

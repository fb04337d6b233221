use crate::palette::Color;

/// Source of color presses. The engine opens and closes the gate; presses
/// arriving while closed are dropped, never queued.
pub trait InputSource {
    fn set_enabled(&mut self, enabled: bool);
    fn is_enabled(&self) -> bool;
}

/// Keyboard pads: each palette color answers to its letter key and to its
/// 1-based position in the palette.
#[derive(Debug, Clone)]
pub struct ColorPad {
    palette: Vec<Color>,
    enabled: bool,
}

impl ColorPad {
    pub fn new(palette: &[Color]) -> Self {
        Self {
            palette: palette.to_vec(),
            enabled: false,
        }
    }

    /// Color bound to `key`, regardless of the gate
    pub fn lookup(&self, key: char) -> Option<Color> {
        let key = key.to_ascii_lowercase();
        if let Some(digit) = key.to_digit(10) {
            return (digit as usize)
                .checked_sub(1)
                .and_then(|idx| self.palette.get(idx))
                .copied();
        }
        self.palette.iter().copied().find(|c| c.key() == key)
    }

    /// Color for a key press, or None when the gate is closed.
    pub fn press(&self, key: char) -> Option<Color> {
        if !self.enabled {
            return None;
        }
        self.lookup(key)
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }
}

impl InputSource for ColorPad {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::default_palette;

    #[test]
    fn presses_are_dropped_while_disabled() {
        let mut pad = ColorPad::new(&default_palette());
        assert_eq!(pad.press('r'), None);
        pad.set_enabled(true);
        assert_eq!(pad.press('r'), Some(Color::Red));
        pad.set_enabled(false);
        assert_eq!(pad.press('r'), None);
    }

    #[test]
    fn letters_and_positions() {
        let mut pad = ColorPad::new(&default_palette());
        pad.set_enabled(true);
        assert_eq!(pad.press('G'), Some(Color::Green));
        assert_eq!(pad.press('3'), Some(Color::Blue));
        assert_eq!(pad.press('0'), None);
        assert_eq!(pad.press('4'), None);
        // yellow is not in the default palette
        assert_eq!(pad.press('y'), None);
        assert_eq!(pad.press('x'), None);
    }
}

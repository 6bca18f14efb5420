//! Character-by-character text reveal.

/// Reveals a string one character per fixed interval.
///
/// Setting the same text again keeps the current progress; setting different
/// text restarts from empty. Once the whole string is shown, further ticks do
/// nothing.
#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    interval: f32,
    revealed: usize,
    total: usize,
    accumulated: f32,
}

impl Typewriter {
    /// Creates an empty typewriter. An interval of zero reveals text instantly.
    pub fn new(interval: f32) -> Self {
        Self {
            text: String::new(),
            interval: interval.max(0.0),
            revealed: 0,
            total: 0,
            accumulated: 0.0,
        }
    }

    /// Sets the text to reveal.
    pub fn set_text(&mut self, text: &str) {
        if self.text == text {
            return;
        }
        self.text = text.to_owned();
        self.total = self.text.chars().count();
        self.revealed = 0;
        self.accumulated = 0.0;
        if self.interval == 0.0 {
            self.revealed = self.total;
        }
    }

    /// Clears the text.
    pub fn clear(&mut self) {
        self.set_text("");
    }

    /// Advances time by `dt` seconds. Returns true if a character was revealed.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.is_complete() {
            return false;
        }
        self.accumulated += dt.max(0.0);
        let before = self.revealed;
        while self.accumulated >= self.interval && self.revealed < self.total {
            self.accumulated -= self.interval;
            self.revealed += 1;
        }
        if self.is_complete() {
            self.accumulated = 0.0;
        }
        self.revealed != before
    }

    /// The currently visible prefix.
    pub fn visible(&self) -> &str {
        match self.text.char_indices().nth(self.revealed) {
            Some((byte_index, _)) => &self.text[..byte_index],
            None => &self.text,
        }
    }

    /// The full target text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of characters shown so far.
    pub fn revealed_chars(&self) -> usize {
        self.revealed
    }

    /// True once the full text is visible.
    pub fn is_complete(&self) -> bool {
        self.revealed >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reveals_one_char_per_interval() {
        let mut tw = Typewriter::new(0.04);
        tw.set_text("Roof");
        assert_eq!(tw.visible(), "");
        tw.tick(0.04);
        assert_eq!(tw.visible(), "R");
        tw.tick(0.02);
        assert_eq!(tw.visible(), "R");
        tw.tick(0.02);
        assert_eq!(tw.visible(), "Ro");
        tw.tick(1.0);
        assert_eq!(tw.visible(), "Roof");
        assert!(tw.is_complete());
        assert!(!tw.tick(1.0));
        assert_eq!(tw.visible(), "Roof");
    }

    #[test]
    fn test_same_text_keeps_progress() {
        let mut tw = Typewriter::new(0.1);
        tw.set_text("Parking");
        tw.tick(0.35);
        assert_eq!(tw.visible(), "Par");
        tw.set_text("Parking");
        assert_eq!(tw.visible(), "Par");
    }

    #[test]
    fn test_new_text_restarts() {
        let mut tw = Typewriter::new(0.1);
        tw.set_text("Roof Systems");
        tw.tick(10.0);
        tw.set_text("Parking & Access");
        assert_eq!(tw.visible(), "");
        assert_eq!(tw.text(), "Parking & Access");
    }

    #[test]
    fn test_multibyte_boundaries() {
        let mut tw = Typewriter::new(1.0);
        tw.set_text("Fassade & Verglasung – Ä");
        for _ in 0..tw.text().chars().count() {
            tw.tick(1.0);
            // Slicing must always land on a char boundary.
            assert!(tw.text().starts_with(tw.visible()));
        }
        assert!(tw.is_complete());
    }

    #[test]
    fn test_zero_interval_is_instant() {
        let mut tw = Typewriter::new(0.0);
        tw.set_text("Facade & Glazing");
        assert!(tw.is_complete());
        assert_eq!(tw.visible(), "Facade & Glazing");
    }

    proptest! {
        #[test]
        fn prop_reveal_grows_by_one_and_stops(
            text in "[a-zA-Z &%äö]{0,24}",
            steps in proptest::collection::vec(0.0f32..0.039, 1..200),
        ) {
            let mut tw = Typewriter::new(0.04);
            tw.set_text(&text);
            let mut previous = 0;
            for dt in steps {
                tw.tick(dt);
                let now = tw.revealed_chars();
                prop_assert!(now >= previous);
                prop_assert!(now - previous <= 1);
                prop_assert!(now <= text.chars().count());
                prop_assert!(text.starts_with(tw.visible()));
                previous = now;
            }
            tw.tick(100.0);
            prop_assert_eq!(tw.visible(), text.as_str());
        }
    }
}

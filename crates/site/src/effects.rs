//! Decorative effects: typed-out headlines, scroll parallax and the
//! keyboard-focus body class.

/// One step of a typewriter run: wait `delay_ms`, then show `shown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeStep {
    pub delay_ms: u32,
    pub shown: String,
}

/// Reveals `text` one character at a time.
///
/// The first character waits `start_delay_ms`; each later one waits
/// `char_delay_ms`. Empty text yields no steps.
#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    start_delay_ms: u32,
    char_delay_ms: u32,
    typed_bytes: usize,
}

impl Typewriter {
    pub fn new(text: impl Into<String>, start_delay_ms: u32, char_delay_ms: u32) -> Self {
        Self {
            text: text.into(),
            start_delay_ms,
            char_delay_ms,
            typed_bytes: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_finished(&self) -> bool {
        self.typed_bytes == self.text.len()
    }
}

impl Iterator for Typewriter {
    type Item = TypeStep;

    fn next(&mut self) -> Option<TypeStep> {
        let next = self.text[self.typed_bytes..].chars().next()?;
        let delay_ms = if self.typed_bytes == 0 {
            self.start_delay_ms
        } else {
            self.char_delay_ms
        };
        self.typed_bytes += next.len_utf8();
        Some(TypeStep {
            delay_ms,
            shown: self.text[..self.typed_bytes].to_string(),
        })
    }
}

/// Vertical offset, in pixels, for a layer scrolling at `speed` times the
/// page.
pub fn parallax_offset(scroll_y: f64, speed: f64) -> f64 {
    (scroll_y.max(0.0) * speed).round()
}

/// CSS `transform` value for [`parallax_offset`].
pub fn parallax_transform(scroll_y: f64, speed: f64) -> String {
    format!("translateY({}px)", parallax_offset(scroll_y, speed))
}

/// Whether the visitor is currently moving focus with the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusMode {
    #[default]
    Pointer,
    Keyboard,
}

/// Tracks [`FocusMode`] from key and pointer input. Tab switches to keyboard
/// mode, any pointer press switches back.
#[derive(Debug, Clone, Default)]
pub struct FocusTracker {
    mode: FocusMode,
}

impl FocusTracker {
    pub fn mode(&self) -> FocusMode {
        self.mode
    }

    /// Returns the new mode when the key changed it.
    pub fn on_key(&mut self, key: &str) -> Option<FocusMode> {
        if key == "Tab" {
            self.set(FocusMode::Keyboard)
        } else {
            None
        }
    }

    pub fn on_pointer_down(&mut self) -> Option<FocusMode> {
        self.set(FocusMode::Pointer)
    }

    fn set(&mut self, mode: FocusMode) -> Option<FocusMode> {
        if self.mode == mode {
            return None;
        }
        self.mode = mode;
        Some(mode)
    }
}

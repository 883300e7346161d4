//! ANSI color codes for diagnostics rendering.
//!
//! Two severity colors plus a dim modifier for structural text:
//! - Red: the `file:line:col:` prefix of an error
//! - Yellow: the `file:line:col:` prefix of a `W1`..`W4` warning
//! - Dim: separators and caret lines
//! - Reset: return to default

/// ANSI color palette for diagnostics output.
///
/// Uses only standard 16-color ANSI codes (no RGB), so it reads correctly
/// in both light and dark terminal themes.
#[derive(Clone, Copy, Debug)]
pub struct Colors {
    pub red: &'static str,
    pub yellow: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
}

impl Default for Colors {
    fn default() -> Self {
        Self::OFF
    }
}

impl Colors {
    /// Colors enabled (ANSI escape codes).
    pub const ON: Self = Self {
        red: "\x1b[31m",
        yellow: "\x1b[33m",
        dim: "\x1b[2m",
        reset: "\x1b[0m",
    };

    /// Colors disabled (empty strings).
    pub const OFF: Self = Self {
        red: "",
        yellow: "",
        dim: "",
        reset: "",
    };

    /// Create colors based on enabled flag.
    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }

    /// Check if colors are enabled.
    pub fn is_enabled(&self) -> bool {
        !self.red.is_empty()
    }
}

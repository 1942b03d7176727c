//! Color — ANSI palette and the rotating allocator.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

/// An ANSI SGR escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(&'static str);

impl Color {
    pub const RED: Color = Color("\x1b[0;31m");
    pub const GREEN: Color = Color("\x1b[0;32m");
    pub const BROWN: Color = Color("\x1b[0;33m");
    pub const BLUE: Color = Color("\x1b[0;34m");
    pub const PURPLE: Color = Color("\x1b[0;35m");
    pub const CYAN: Color = Color("\x1b[0;36m");

    pub fn code(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

pub const PALETTE: [Color; 6] = [
    Color::RED,
    Color::GREEN,
    Color::BROWN,
    Color::BLUE,
    Color::PURPLE,
    Color::CYAN,
];

/// Hands out palette colors in discovery order, starting from the second
/// entry (green).
///
/// Not keyed by container: every call advances the counter, so a container
/// that restarts gets whatever color is next.
#[derive(Debug, Default)]
pub struct ColorAllocator {
    next: AtomicUsize,
}

impl ColorAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> Color {
        let n = self.next.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        PALETTE[n % PALETTE.len()]
    }
}

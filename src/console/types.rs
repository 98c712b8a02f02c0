//! Plain data types exchanged with the console backend.
//!
//! These mirror the fixed-layout structs of the Windows console API but are
//! owned by this crate; conversion to and from the native layout happens in
//! `win32.rs` only.

use bitflags::bitflags;

/// A character-cell position or size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: i16,
    pub y: i16,
}

impl Coord {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Clamp negative components to zero so the value can be used as a size.
    pub fn normalized(self) -> Self {
        Self {
            x: self.x.max(0),
            y: self.y.max(0),
        }
    }

    /// Component-wise maximum.
    pub fn max(self, other: Coord) -> Self {
        Self {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
        }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// Inclusive bounds of the visible console window, in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub top: i16,
    pub bottom: i16,
    pub left: i16,
    pub right: i16,
}

impl Rect {
    /// Window anchored at the buffer origin covering `size` cells.
    pub fn from_size(size: Coord) -> Self {
        let size = size.normalized();
        Self {
            top: 0,
            left: 0,
            right: size.x.saturating_sub(1),
            bottom: size.y.saturating_sub(1),
        }
    }

    /// Width and height of the rectangle. Inverted bounds yield zero.
    pub fn size(&self) -> Coord {
        let width = i32::from(self.right) - i32::from(self.left) + 1;
        let height = i32::from(self.bottom) - i32::from(self.top) + 1;
        Coord {
            x: clamp_i16(width),
            y: clamp_i16(height),
        }
        .normalized()
    }
}

pub(crate) fn clamp_i16(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

bitflags! {
    /// Console input mode register.
    ///
    /// Unknown bits are retained so a captured mode can be written back
    /// exactly as it was read.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ConsoleMode: u32 {
        const PROCESSED_INPUT        = 0x0001;
        const LINE_INPUT             = 0x0002;
        const ECHO_INPUT             = 0x0004;
        const WINDOW_INPUT           = 0x0008;
        const MOUSE_INPUT            = 0x0010;
        const INSERT_MODE            = 0x0020;
        const QUICK_EDIT_MODE        = 0x0040;
        const EXTENDED_FLAGS         = 0x0080;
        const AUTO_POSITION          = 0x0100;
        const VIRTUAL_TERMINAL_INPUT = 0x0200;

        const _ = !0;
    }
}

/// Cursor thickness (percentage of the cell, 1-100) and visibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorState {
    pub size: u32,
    pub visible: bool,
}

impl CursorState {
    pub const MIN_SIZE: u32 = 1;
    pub const MAX_SIZE: u32 = 100;

    pub fn new(size: u32, visible: bool) -> Self {
        Self {
            size: size.clamp(Self::MIN_SIZE, Self::MAX_SIZE),
            visible,
        }
    }

    /// Same thickness, hidden.
    pub fn hidden(self) -> Self {
        Self::new(self.size, false)
    }
}

impl Default for CursorState {
    fn default() -> Self {
        Self::new(25, true)
    }
}

/// Screen buffer information the core consumes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScreenBufferInfo {
    pub size: Coord,
    pub window: Rect,
    pub maximum_window_size: Coord,
}

/// Platform metrics queried through `GetSystemMetrics`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemMetric {
    /// Minimum window width in pixels (`SM_CXMIN`).
    MinWindowWidth,
    /// Minimum window height in pixels (`SM_CYMIN`).
    MinWindowHeight,
}

impl SystemMetric {
    pub fn index(self) -> i32 {
        match self {
            SystemMetric::MinWindowWidth => 28,
            SystemMetric::MinWindowHeight => 29,
        }
    }
}

/// Opaque reference to an open console stream or event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle(pub(crate) isize);

impl Handle {
    pub fn raw(self) -> isize {
        self.0
    }
}

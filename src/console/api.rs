//! Console backend contract.
//!
//! `ConsoleApi` is the typed, safe surface of the host console. The Windows
//! implementation lives in `win32.rs`; tests use `mock::MockConsole`.
//! Every method is a direct, blocking call.

use super::error::NativeError;
use super::types::{ConsoleMode, Coord, CursorState, Handle, Rect, ScreenBufferInfo, SystemMetric};

pub type NativeResult<T> = std::result::Result<T, NativeError>;

pub trait ConsoleApi {
    /// Open the console input stream (`CONIN$`).
    fn open_input(&self) -> NativeResult<Handle>;

    /// Open the console output stream (`CONOUT$`).
    fn open_output(&self) -> NativeResult<Handle>;

    /// Create an unnamed auto-reset event, initially unsignaled.
    fn create_event(&self) -> NativeResult<Handle>;

    fn close(&self, handle: Handle) -> NativeResult<()>;

    fn console_mode(&self, handle: Handle) -> NativeResult<ConsoleMode>;

    fn set_console_mode(&self, handle: Handle, mode: ConsoleMode) -> NativeResult<()>;

    fn screen_buffer_info(&self, handle: Handle) -> NativeResult<ScreenBufferInfo>;

    fn set_screen_buffer_size(&self, handle: Handle, size: Coord) -> NativeResult<()>;

    /// Set the visible window. `absolute` selects absolute buffer coordinates
    /// rather than offsets from the current window.
    fn set_window_info(&self, handle: Handle, absolute: bool, window: Rect) -> NativeResult<()>;

    fn cursor_info(&self, handle: Handle) -> NativeResult<CursorState>;

    fn set_cursor_info(&self, handle: Handle, cursor: CursorState) -> NativeResult<()>;

    /// Query a platform metric. Failure is reported as a zero value.
    fn system_metric(&self, metric: SystemMetric) -> i32;

    /// Pixel size of one cell in the current console font.
    fn current_font_size(&self, handle: Handle) -> NativeResult<Coord>;
}

impl<T: ConsoleApi + ?Sized> ConsoleApi for &T {
    fn open_input(&self) -> NativeResult<Handle> {
        (**self).open_input()
    }

    fn open_output(&self) -> NativeResult<Handle> {
        (**self).open_output()
    }

    fn create_event(&self) -> NativeResult<Handle> {
        (**self).create_event()
    }

    fn close(&self, handle: Handle) -> NativeResult<()> {
        (**self).close(handle)
    }

    fn console_mode(&self, handle: Handle) -> NativeResult<ConsoleMode> {
        (**self).console_mode(handle)
    }

    fn set_console_mode(&self, handle: Handle, mode: ConsoleMode) -> NativeResult<()> {
        (**self).set_console_mode(handle, mode)
    }

    fn screen_buffer_info(&self, handle: Handle) -> NativeResult<ScreenBufferInfo> {
        (**self).screen_buffer_info(handle)
    }

    fn set_screen_buffer_size(&self, handle: Handle, size: Coord) -> NativeResult<()> {
        (**self).set_screen_buffer_size(handle, size)
    }

    fn set_window_info(&self, handle: Handle, absolute: bool, window: Rect) -> NativeResult<()> {
        (**self).set_window_info(handle, absolute, window)
    }

    fn cursor_info(&self, handle: Handle) -> NativeResult<CursorState> {
        (**self).cursor_info(handle)
    }

    fn set_cursor_info(&self, handle: Handle, cursor: CursorState) -> NativeResult<()> {
        (**self).set_cursor_info(handle, cursor)
    }

    fn system_metric(&self, metric: SystemMetric) -> i32 {
        (**self).system_metric(metric)
    }

    fn current_font_size(&self, handle: Handle) -> NativeResult<Coord> {
        (**self).current_font_size(handle)
    }
}

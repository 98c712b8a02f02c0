//! In-memory console used by the unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::api::{ConsoleApi, NativeResult};
use super::error::NativeError;
use super::types::{ConsoleMode, Coord, CursorState, Handle, Rect, ScreenBufferInfo, SystemMetric};

pub const ERROR_INVALID_HANDLE: u32 = 6;
pub const ERROR_INVALID_PARAMETER: u32 = 87;

pub struct MockState {
    pub attached: bool,
    pub mode: ConsoleMode,
    pub cursor: CursorState,
    pub buffer: Coord,
    pub window: Rect,
    pub font: Coord,
    pub min_window_px: (i32, i32),
    next_handle: isize,
    open: HashSet<Handle>,
    failures: HashMap<&'static str, (usize, u32)>,
    calls: Vec<&'static str>,
}

/// Console with a 120x9001 scrollback buffer showing an 80x25 window,
/// an 8x16 font and a 136x39 px minimum window.
pub struct MockConsole {
    state: RefCell<MockState>,
}

impl Default for MockConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConsole {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(MockState {
                attached: true,
                mode: ConsoleMode::PROCESSED_INPUT
                    | ConsoleMode::LINE_INPUT
                    | ConsoleMode::ECHO_INPUT
                    | ConsoleMode::QUICK_EDIT_MODE
                    | ConsoleMode::EXTENDED_FLAGS,
                cursor: CursorState::new(25, true),
                buffer: Coord::new(120, 9001),
                window: Rect { top: 0, bottom: 24, left: 0, right: 79 },
                font: Coord::new(8, 16),
                min_window_px: (136, 39),
                next_handle: 0x40,
                open: HashSet::new(),
                failures: HashMap::new(),
                calls: Vec::new(),
            }),
        }
    }

    /// Mutate the console state directly.
    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.borrow_mut())
    }

    /// Make every later call to `call` fail with `code`.
    ///
    /// `CreateFileW` is keyed by stream name (`CONIN$` / `CONOUT$`).
    pub fn fail(&self, call: &'static str, code: u32) {
        self.fail_after(call, 0, code);
    }

    /// Let `skip` calls to `call` succeed, then fail the rest with `code`.
    pub fn fail_after(&self, call: &'static str, skip: usize, code: u32) {
        self.state.borrow_mut().failures.insert(call, (skip, code));
    }

    pub fn recover(&self, call: &'static str) {
        self.state.borrow_mut().failures.remove(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.state.borrow().calls.iter().filter(|c| **c == call).count()
    }

    pub fn open_handles(&self) -> usize {
        self.state.borrow().open.len()
    }

    pub fn mode(&self) -> ConsoleMode {
        self.state.borrow().mode
    }

    pub fn cursor(&self) -> CursorState {
        self.state.borrow().cursor
    }

    pub fn buffer(&self) -> Coord {
        self.state.borrow().buffer
    }

    pub fn window(&self) -> Rect {
        self.state.borrow().window
    }

    fn enter(&self, call: &'static str, handle: Option<Handle>) -> NativeResult<()> {
        self.enter_as(call, call, handle)
    }

    fn enter_as(&self, key: &'static str, call: &'static str, handle: Option<Handle>) -> NativeResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(key);
        if let Some((skip, code)) = state.failures.get_mut(key) {
            if *skip == 0 {
                return Err(NativeError::new(call, *code));
            }
            *skip -= 1;
        }
        if let Some(handle) = handle {
            if !state.open.contains(&handle) {
                return Err(NativeError::new(call, ERROR_INVALID_HANDLE));
            }
        }
        Ok(())
    }

    fn open_stream(&self, stream: &'static str) -> NativeResult<Handle> {
        self.enter_as(stream, "CreateFileW", None)?;
        let mut state = self.state.borrow_mut();
        if !state.attached {
            return Err(NativeError::new("CreateFileW", ERROR_INVALID_HANDLE));
        }
        Ok(state.allocate())
    }
}

impl MockState {
    fn allocate(&mut self) -> Handle {
        let handle = Handle(self.next_handle);
        self.next_handle += 4;
        self.open.insert(handle);
        handle
    }
}

impl ConsoleApi for MockConsole {
    fn open_input(&self) -> NativeResult<Handle> {
        self.open_stream("CONIN$")
    }

    fn open_output(&self) -> NativeResult<Handle> {
        self.open_stream("CONOUT$")
    }

    fn create_event(&self) -> NativeResult<Handle> {
        self.enter("CreateEventW", None)?;
        Ok(self.state.borrow_mut().allocate())
    }

    fn close(&self, handle: Handle) -> NativeResult<()> {
        self.enter("CloseHandle", Some(handle))?;
        self.state.borrow_mut().open.remove(&handle);
        Ok(())
    }

    fn console_mode(&self, handle: Handle) -> NativeResult<ConsoleMode> {
        self.enter("GetConsoleMode", Some(handle))?;
        Ok(self.mode())
    }

    fn set_console_mode(&self, handle: Handle, mode: ConsoleMode) -> NativeResult<()> {
        self.enter("SetConsoleMode", Some(handle))?;
        self.state.borrow_mut().mode = mode;
        Ok(())
    }

    fn screen_buffer_info(&self, handle: Handle) -> NativeResult<ScreenBufferInfo> {
        self.enter("GetConsoleScreenBufferInfo", Some(handle))?;
        let state = self.state.borrow();
        Ok(ScreenBufferInfo {
            size: state.buffer,
            window: state.window,
            maximum_window_size: state.buffer,
        })
    }

    fn set_screen_buffer_size(&self, handle: Handle, size: Coord) -> NativeResult<()> {
        self.enter("SetConsoleScreenBufferSize", Some(handle))?;
        let mut state = self.state.borrow_mut();
        let window = state.window.size();
        if size.x < window.x || size.y < window.y {
            return Err(NativeError::new("SetConsoleScreenBufferSize", ERROR_INVALID_PARAMETER));
        }
        state.buffer = size;
        Ok(())
    }

    fn set_window_info(&self, handle: Handle, absolute: bool, window: Rect) -> NativeResult<()> {
        self.enter("SetConsoleWindowInfo", Some(handle))?;
        let mut state = self.state.borrow_mut();
        let window = if absolute {
            window
        } else {
            Rect {
                top: state.window.top + window.top,
                bottom: state.window.bottom + window.bottom,
                left: state.window.left + window.left,
                right: state.window.right + window.right,
            }
        };
        let fits = window.left >= 0
            && window.top >= 0
            && window.right >= window.left
            && window.bottom >= window.top
            && window.right < state.buffer.x
            && window.bottom < state.buffer.y;
        if !fits {
            return Err(NativeError::new("SetConsoleWindowInfo", ERROR_INVALID_PARAMETER));
        }
        state.window = window;
        Ok(())
    }

    fn cursor_info(&self, handle: Handle) -> NativeResult<CursorState> {
        self.enter("GetConsoleCursorInfo", Some(handle))?;
        Ok(self.cursor())
    }

    fn set_cursor_info(&self, handle: Handle, cursor: CursorState) -> NativeResult<()> {
        self.enter("SetConsoleCursorInfo", Some(handle))?;
        self.state.borrow_mut().cursor = cursor;
        Ok(())
    }

    fn system_metric(&self, metric: SystemMetric) -> i32 {
        let mut state = self.state.borrow_mut();
        state.calls.push("GetSystemMetrics");
        match metric {
            SystemMetric::MinWindowWidth => state.min_window_px.0,
            SystemMetric::MinWindowHeight => state.min_window_px.1,
        }
    }

    fn current_font_size(&self, handle: Handle) -> NativeResult<Coord> {
        self.enter("GetCurrentConsoleFont", Some(handle))?;
        Ok(self.state.borrow().font)
    }
}

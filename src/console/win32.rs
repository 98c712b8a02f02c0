//! Windows console binding layer.
//!
//! Console entry points are resolved from `kernel32.dll` / `user32.dll` once
//! per process and called through typed function pointers. This is the only
//! module that touches native structs or raw handles; everything it returns
//! is converted field by field into the crate's own types.

use std::ffi::c_void;
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use tracing::debug;
use windows::core::{s, w, PCWSTR};
use windows::Win32::Foundation::{
    CloseHandle, GetLastError, BOOL, GENERIC_READ, GENERIC_WRITE, HANDLE, HMODULE,
};
use windows::Win32::Storage::FileSystem::{
    CreateFileW, FILE_FLAGS_AND_ATTRIBUTES, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows::Win32::System::Console::{
    CONSOLE_CURSOR_INFO, CONSOLE_FONT_INFO, CONSOLE_MODE, CONSOLE_SCREEN_BUFFER_INFO, COORD,
    SMALL_RECT,
};
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};

use super::api::{ConsoleApi, NativeResult};
use super::error::{ConsoleError, NativeError};
use super::types::{ConsoleMode, Coord, CursorState, Handle, Rect, ScreenBufferInfo, SystemMetric};

type CreateEventFn = unsafe extern "system" fn(*const c_void, BOOL, BOOL, PCWSTR) -> HANDLE;
type GetConsoleModeFn = unsafe extern "system" fn(HANDLE, *mut CONSOLE_MODE) -> BOOL;
type SetConsoleModeFn = unsafe extern "system" fn(HANDLE, CONSOLE_MODE) -> BOOL;
type GetScreenBufferInfoFn =
    unsafe extern "system" fn(HANDLE, *mut CONSOLE_SCREEN_BUFFER_INFO) -> BOOL;
type SetScreenBufferSizeFn = unsafe extern "system" fn(HANDLE, COORD) -> BOOL;
type SetWindowInfoFn = unsafe extern "system" fn(HANDLE, BOOL, *const SMALL_RECT) -> BOOL;
type GetCursorInfoFn = unsafe extern "system" fn(HANDLE, *mut CONSOLE_CURSOR_INFO) -> BOOL;
type SetCursorInfoFn = unsafe extern "system" fn(HANDLE, *const CONSOLE_CURSOR_INFO) -> BOOL;
type GetCurrentFontFn = unsafe extern "system" fn(HANDLE, BOOL, *mut CONSOLE_FONT_INFO) -> BOOL;
type GetSystemMetricsFn = unsafe extern "system" fn(i32) -> i32;

/// Entry points used by the negotiator, resolved once.
struct Bindings {
    create_event: CreateEventFn,
    get_console_mode: GetConsoleModeFn,
    set_console_mode: SetConsoleModeFn,
    get_screen_buffer_info: GetScreenBufferInfoFn,
    set_screen_buffer_size: SetScreenBufferSizeFn,
    set_window_info: SetWindowInfoFn,
    get_cursor_info: GetCursorInfoFn,
    set_cursor_info: SetCursorInfoFn,
    get_current_font: GetCurrentFontFn,
    get_system_metrics: GetSystemMetricsFn,
}

macro_rules! bind {
    ($module:expr, $name:literal) => {
        match GetProcAddress($module, s!($name)) {
            // SAFETY: the target type matches the documented signature of $name.
            Some(proc) => mem::transmute::<unsafe extern "system" fn() -> isize, _>(proc),
            None => {
                return Err(ConsoleError::EntryPointMissing {
                    symbol: $name,
                    code: last_error(),
                })
            }
        }
    };
}

impl Bindings {
    unsafe fn resolve() -> Result<Self, ConsoleError> {
        let kernel32 = load(w!("kernel32.dll"), "kernel32.dll")?;
        let user32 = load(w!("user32.dll"), "user32.dll")?;

        let bindings = Self {
            create_event: bind!(kernel32, "CreateEventW"),
            get_console_mode: bind!(kernel32, "GetConsoleMode"),
            set_console_mode: bind!(kernel32, "SetConsoleMode"),
            get_screen_buffer_info: bind!(kernel32, "GetConsoleScreenBufferInfo"),
            set_screen_buffer_size: bind!(kernel32, "SetConsoleScreenBufferSize"),
            set_window_info: bind!(kernel32, "SetConsoleWindowInfo"),
            get_cursor_info: bind!(kernel32, "GetConsoleCursorInfo"),
            set_cursor_info: bind!(kernel32, "SetConsoleCursorInfo"),
            get_current_font: bind!(kernel32, "GetCurrentConsoleFont"),
            get_system_metrics: bind!(user32, "GetSystemMetrics"),
        };
        debug!("console entry points resolved");
        Ok(bindings)
    }
}

unsafe fn load(name: PCWSTR, label: &'static str) -> Result<HMODULE, ConsoleError> {
    LoadLibraryW(name).map_err(|e| ConsoleError::EntryPointMissing {
        symbol: label,
        code: win32_code(&e),
    })
}

fn bindings() -> Result<&'static Bindings, ConsoleError> {
    static BINDINGS: OnceLock<Result<Bindings, ConsoleError>> = OnceLock::new();
    BINDINGS
        .get_or_init(|| unsafe { Bindings::resolve() })
        .as_ref()
        .map_err(|e| *e)
}

/// Set while a `Win32Console` exists; the console is process-wide state.
static ATTACHED: AtomicBool = AtomicBool::new(false);

/// The host process's console.
pub struct Win32Console {
    api: &'static Bindings,
}

impl Win32Console {
    /// Bind the entry points and claim the console for this process.
    ///
    /// Fails with `SessionActive` while another `Win32Console` is alive.
    pub fn attach() -> Result<Self, ConsoleError> {
        let api = bindings()?;
        if ATTACHED.swap(true, Ordering::SeqCst) {
            return Err(ConsoleError::SessionActive);
        }
        Ok(Self { api })
    }
}

impl Drop for Win32Console {
    fn drop(&mut self) {
        ATTACHED.store(false, Ordering::SeqCst);
    }
}

pub(crate) fn native(handle: Handle) -> HANDLE {
    HANDLE(handle.0 as _)
}

fn wrap(handle: HANDLE) -> Handle {
    Handle(handle.0 as isize)
}

fn last_error() -> u32 {
    unsafe { GetLastError().0 }
}

/// Win32 error code carried by an HRESULT, or the HRESULT itself.
pub(crate) fn win32_code(error: &windows::core::Error) -> u32 {
    let hr = error.code().0 as u32;
    if hr & 0xFFFF_0000 == 0x8007_0000 {
        hr & 0xFFFF
    } else {
        hr
    }
}

fn check(ok: BOOL, call: &'static str) -> NativeResult<()> {
    if ok.as_bool() {
        Ok(())
    } else {
        Err(NativeError::new(call, last_error()))
    }
}

fn coord(c: COORD) -> Coord {
    Coord { x: c.X, y: c.Y }
}

fn rect(r: SMALL_RECT) -> Rect {
    Rect {
        top: r.Top,
        bottom: r.Bottom,
        left: r.Left,
        right: r.Right,
    }
}

fn open_stream(name: PCWSTR) -> NativeResult<Handle> {
    let handle = unsafe {
        CreateFileW(
            name,
            GENERIC_READ.0 | GENERIC_WRITE.0,
            FILE_SHARE_READ | FILE_SHARE_WRITE,
            None,
            OPEN_EXISTING,
            FILE_FLAGS_AND_ATTRIBUTES(0),
            HANDLE::default(),
        )
    }
    .map_err(|e| NativeError::new("CreateFileW", win32_code(&e)))?;
    Ok(wrap(handle))
}

impl ConsoleApi for Win32Console {
    fn open_input(&self) -> NativeResult<Handle> {
        open_stream(w!("CONIN$"))
    }

    fn open_output(&self) -> NativeResult<Handle> {
        open_stream(w!("CONOUT$"))
    }

    fn create_event(&self) -> NativeResult<Handle> {
        let handle = unsafe {
            (self.api.create_event)(std::ptr::null(), BOOL(0), BOOL(0), PCWSTR::null())
        };
        if handle.0 as isize == 0 {
            return Err(NativeError::new("CreateEventW", last_error()));
        }
        Ok(wrap(handle))
    }

    fn close(&self, handle: Handle) -> NativeResult<()> {
        unsafe { CloseHandle(native(handle)) }
            .map_err(|e| NativeError::new("CloseHandle", win32_code(&e)))
    }

    fn console_mode(&self, handle: Handle) -> NativeResult<ConsoleMode> {
        let mut mode = CONSOLE_MODE(0);
        check(
            unsafe { (self.api.get_console_mode)(native(handle), &mut mode) },
            "GetConsoleMode",
        )?;
        Ok(ConsoleMode::from_bits_retain(mode.0))
    }

    fn set_console_mode(&self, handle: Handle, mode: ConsoleMode) -> NativeResult<()> {
        check(
            unsafe { (self.api.set_console_mode)(native(handle), CONSOLE_MODE(mode.bits())) },
            "SetConsoleMode",
        )
    }

    fn screen_buffer_info(&self, handle: Handle) -> NativeResult<ScreenBufferInfo> {
        let mut info = CONSOLE_SCREEN_BUFFER_INFO::default();
        check(
            unsafe { (self.api.get_screen_buffer_info)(native(handle), &mut info) },
            "GetConsoleScreenBufferInfo",
        )?;
        Ok(ScreenBufferInfo {
            size: coord(info.dwSize).normalized(),
            window: rect(info.srWindow),
            maximum_window_size: coord(info.dwMaximumWindowSize).normalized(),
        })
    }

    fn set_screen_buffer_size(&self, handle: Handle, size: Coord) -> NativeResult<()> {
        let size = COORD { X: size.x, Y: size.y };
        check(
            unsafe { (self.api.set_screen_buffer_size)(native(handle), size) },
            "SetConsoleScreenBufferSize",
        )
    }

    fn set_window_info(&self, handle: Handle, absolute: bool, window: Rect) -> NativeResult<()> {
        let window = SMALL_RECT {
            Left: window.left,
            Top: window.top,
            Right: window.right,
            Bottom: window.bottom,
        };
        check(
            unsafe { (self.api.set_window_info)(native(handle), absolute.into(), &window) },
            "SetConsoleWindowInfo",
        )
    }

    fn cursor_info(&self, handle: Handle) -> NativeResult<CursorState> {
        let mut info = CONSOLE_CURSOR_INFO::default();
        check(
            unsafe { (self.api.get_cursor_info)(native(handle), &mut info) },
            "GetConsoleCursorInfo",
        )?;
        Ok(CursorState::new(info.dwSize, info.bVisible.as_bool()))
    }

    fn set_cursor_info(&self, handle: Handle, cursor: CursorState) -> NativeResult<()> {
        let cursor = CursorState::new(cursor.size, cursor.visible);
        let info = CONSOLE_CURSOR_INFO {
            dwSize: cursor.size,
            bVisible: cursor.visible.into(),
        };
        check(
            unsafe { (self.api.set_cursor_info)(native(handle), &info) },
            "SetConsoleCursorInfo",
        )
    }

    fn system_metric(&self, metric: SystemMetric) -> i32 {
        unsafe { (self.api.get_system_metrics)(metric.index()) }
    }

    fn current_font_size(&self, handle: Handle) -> NativeResult<Coord> {
        let mut info = CONSOLE_FONT_INFO::default();
        check(
            unsafe { (self.api.get_current_font)(native(handle), BOOL(0), &mut info) },
            "GetCurrentConsoleFont",
        )?;
        Ok(coord(info.dwFontSize))
    }
}

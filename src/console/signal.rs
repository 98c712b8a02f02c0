//! Console control events (Ctrl+C, Ctrl+Break, window close).
//!
//! The handler only records the interrupt and signals the session's
//! interrupt event; the owner of the session notices and tears down on its
//! own thread. For close, logoff and shutdown events the process ends as
//! soon as the handler returns, so the handler waits (bounded) until the
//! owner reports the console restored.

use std::sync::atomic::{AtomicBool, AtomicIsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::info;
use windows::Win32::Foundation::BOOL;
use windows::Win32::System::Console::SetConsoleCtrlHandler;
use windows::Win32::System::Threading::SetEvent;

use super::error::NativeError;
use super::types::Handle;
use super::win32::{native, win32_code};

/// Upper bound on how long a close event is held open for teardown.
const CLOSE_GRACE: Duration = Duration::from_secs(3);

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static RESTORED: AtomicBool = AtomicBool::new(false);
static EVENT: AtomicIsize = AtomicIsize::new(0);

unsafe extern "system" fn on_control(ctrl_type: u32) -> BOOL {
    INTERRUPTED.store(true, Ordering::SeqCst);
    let event = EVENT.load(Ordering::SeqCst);
    if event != 0 {
        let _ = SetEvent(native(Handle(event)));
    }
    // CTRL_C_EVENT = 0, CTRL_BREAK_EVENT = 1
    if ctrl_type > 1 {
        let deadline = Instant::now() + CLOSE_GRACE;
        while !RESTORED.load(Ordering::SeqCst) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
    }
    BOOL::from(true)
}

/// Route control events to `event` instead of terminating the process.
pub fn install(event: Handle) -> Result<(), NativeError> {
    EVENT.store(event.raw(), Ordering::SeqCst);
    unsafe { SetConsoleCtrlHandler(Some(on_control), BOOL::from(true)) }
        .map_err(|e| NativeError::new("SetConsoleCtrlHandler", win32_code(&e)))?;
    info!("console control handler installed");
    Ok(())
}

/// Stop signalling the interrupt event.
///
/// Call before teardown closes the event handle.
pub fn detach_event() {
    EVENT.store(0, Ordering::SeqCst);
}

/// Remove the handler and release any close event waiting on teardown.
///
/// Call once the session has been torn down.
pub fn uninstall() {
    detach_event();
    RESTORED.store(true, Ordering::SeqCst);
    unsafe {
        let _ = SetConsoleCtrlHandler(Some(on_control), BOOL::from(false));
    }
}

/// True once a control event has been received.
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

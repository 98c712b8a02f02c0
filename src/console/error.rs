//! Error types for console negotiation.

use thiserror::Error;

/// A native console call reported failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{call} failed with native code {code}")]
pub struct NativeError {
    /// Entry point that failed
    pub call: &'static str,
    /// OS error code (`GetLastError`)
    pub code: u32,
}

impl NativeError {
    pub const fn new(call: &'static str, code: u32) -> Self {
        Self { call, code }
    }
}

/// Failure to open the console streams or the interrupt event.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleError {
    #[error("no console attached to this process: cannot open {stream} ({source})")]
    ResourceUnavailable {
        stream: &'static str,
        #[source]
        source: NativeError,
    },

    #[error("failed to create interrupt event: {0}")]
    EventCreate(#[source] NativeError),
}

impl HandleError {
    pub fn native(&self) -> &NativeError {
        match self {
            HandleError::ResourceUnavailable { source, .. } => source,
            HandleError::EventCreate(source) => source,
        }
    }
}

/// The cell geometry could not be computed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    #[error("geometry query failed: {0}")]
    Query(#[source] NativeError),

    #[error("console font reports a zero cell size ({width}x{height} px)")]
    ZeroFontSize { width: i16, height: i16 },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("console entry point `{symbol}` could not be resolved (native code {code})")]
    EntryPointMissing { symbol: &'static str, code: u32 },

    #[error("another console session is already active in this process")]
    SessionActive,

    #[error("failed to open console handles: {0}")]
    HandleOpenFailed(#[from] HandleError),

    #[error("failed to capture console state: {0}")]
    SnapshotFailed(#[source] NativeError),

    #[error("failed to set console mode: {0}")]
    ModeSetFailed(#[source] NativeError),

    #[error("console geometry unavailable: {0}")]
    GeometryUnavailable(#[from] GeometryError),

    #[error("failed to resize screen buffer: {0}")]
    BufferResizeFailed(#[source] NativeError),

    #[error("failed to resize console window: {0}")]
    WindowResizeFailed(#[source] NativeError),

    #[error("failed to query cursor: {0}")]
    CursorQueryFailed(#[source] NativeError),

    #[error("failed to set cursor: {0}")]
    CursorSetFailed(#[source] NativeError),

    #[error("failed to restore console state: {0}")]
    RestoreFailed(#[source] NativeError),
}

impl ConsoleError {
    /// Native error code wrapped by this error, if any.
    pub fn code(&self) -> Option<u32> {
        match self {
            ConsoleError::EntryPointMissing { code, .. } => Some(*code),
            ConsoleError::SessionActive => None,
            ConsoleError::HandleOpenFailed(e) => Some(e.native().code),
            ConsoleError::GeometryUnavailable(GeometryError::Query(e)) => Some(e.code),
            ConsoleError::GeometryUnavailable(GeometryError::ZeroFontSize { .. }) => None,
            ConsoleError::SnapshotFailed(e)
            | ConsoleError::ModeSetFailed(e)
            | ConsoleError::BufferResizeFailed(e)
            | ConsoleError::WindowResizeFailed(e)
            | ConsoleError::CursorQueryFailed(e)
            | ConsoleError::CursorSetFailed(e)
            | ConsoleError::RestoreFailed(e) => Some(e.code),
        }
    }

    /// Name of the negotiation step that failed.
    pub fn step(&self) -> &'static str {
        match self {
            ConsoleError::EntryPointMissing { .. } => "bind",
            ConsoleError::SessionActive => "attach",
            ConsoleError::HandleOpenFailed(_) => "open",
            ConsoleError::SnapshotFailed(_) => "snapshot",
            ConsoleError::ModeSetFailed(_) => "mode",
            ConsoleError::GeometryUnavailable(_) => "geometry",
            ConsoleError::BufferResizeFailed(_) => "buffer-resize",
            ConsoleError::WindowResizeFailed(_) => "window-resize",
            ConsoleError::CursorQueryFailed(_) => "cursor-query",
            ConsoleError::CursorSetFailed(_) => "cursor-hide",
            ConsoleError::RestoreFailed(_) => "restore",
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_and_step() {
        let err = ConsoleError::ModeSetFailed(NativeError::new("SetConsoleMode", 5));
        assert_eq!(err.code(), Some(5));
        assert_eq!(err.step(), "mode");
        assert_eq!(
            err.to_string(),
            "failed to set console mode: SetConsoleMode failed with native code 5"
        );
    }

    #[test]
    fn test_handle_error_code() {
        let err: ConsoleError = HandleError::ResourceUnavailable {
            stream: "CONOUT$",
            source: NativeError::new("CreateFileW", 6),
        }
        .into();
        assert_eq!(err.code(), Some(6));
        assert_eq!(err.step(), "open");
    }

    #[test]
    fn test_zero_font_has_no_native_code() {
        let err: ConsoleError = GeometryError::ZeroFontSize { width: 0, height: 0 }.into();
        assert_eq!(err.code(), None);
        assert_eq!(err.step(), "geometry");
    }
}

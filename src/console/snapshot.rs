//! Pre-negotiation console state, kept for restoration.

use super::api::{ConsoleApi, NativeResult};
use super::error::NativeError;
use super::types::{ConsoleMode, CursorState, Handle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateSnapshot {
    /// Input mode as read from `CONIN$`
    pub mode: ConsoleMode,
    /// Cursor as read from `CONOUT$`
    pub cursor: CursorState,
}

impl StateSnapshot {
    /// Read the input mode and cursor without changing either.
    pub fn capture<A: ConsoleApi>(api: &A, input: Handle, output: Handle) -> NativeResult<Self> {
        let mode = api.console_mode(input)?;
        let cursor = api.cursor_info(output)?;
        Ok(Self { mode, cursor })
    }

    /// Re-read the cursor as the baseline to restore.
    pub fn refresh_cursor<A: ConsoleApi>(&mut self, api: &A, output: Handle) -> NativeResult<()> {
        self.cursor = api.cursor_info(output)?;
        Ok(())
    }

    /// Write the captured mode and cursor back verbatim.
    ///
    /// Both writes are attempted; failures are returned, not raised.
    pub fn restore<A: ConsoleApi>(&self, api: &A, input: Handle, output: Handle) -> Vec<NativeError> {
        let mode = api.set_console_mode(input, self.mode).err();
        let cursor = api.set_cursor_info(output, self.cursor).err();
        mode.into_iter().chain(cursor).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::mock::MockConsole;
    use crate::console::registry::HandleRegistry;

    #[test]
    fn test_capture_does_not_mutate() {
        let mock = MockConsole::new();
        let handles = HandleRegistry::open(&mock).unwrap();
        let before = (mock.mode(), mock.cursor());

        let snapshot = StateSnapshot::capture(&mock, handles.input(), handles.output()).unwrap();

        assert_eq!((snapshot.mode, snapshot.cursor), before);
        assert_eq!(mock.count("SetConsoleMode"), 0);
        assert_eq!(mock.count("SetConsoleCursorInfo"), 0);
    }

    #[test]
    fn test_capture_reports_query_code() {
        let mock = MockConsole::new();
        let handles = HandleRegistry::open(&mock).unwrap();
        mock.fail("GetConsoleCursorInfo", 31);

        let err = StateSnapshot::capture(&mock, handles.input(), handles.output()).unwrap_err();
        assert_eq!(err, NativeError::new("GetConsoleCursorInfo", 31));
    }

    #[test]
    fn test_restore_writes_back_verbatim() {
        let mock = MockConsole::new();
        mock.with(|s| s.mode = ConsoleMode::from_bits_retain(0x01F7));
        let handles = HandleRegistry::open(&mock).unwrap();
        let snapshot = StateSnapshot::capture(&mock, handles.input(), handles.output()).unwrap();

        mock.with(|s| {
            s.mode = ConsoleMode::WINDOW_INPUT;
            s.cursor = CursorState::new(100, false);
        });

        assert!(snapshot.restore(&mock, handles.input(), handles.output()).is_empty());
        assert_eq!(mock.mode().bits(), 0x01F7);
        assert_eq!(mock.cursor(), CursorState::new(25, true));
    }

    #[test]
    fn test_restore_attempts_cursor_after_mode_failure() {
        let mock = MockConsole::new();
        let handles = HandleRegistry::open(&mock).unwrap();
        let snapshot = StateSnapshot::capture(&mock, handles.input(), handles.output()).unwrap();
        mock.with(|s| s.cursor = CursorState::new(25, false));
        mock.fail("SetConsoleMode", 5);

        let failures = snapshot.restore(&mock, handles.input(), handles.output());
        assert_eq!(failures, vec![NativeError::new("SetConsoleMode", 5)]);
        assert!(mock.cursor().visible);
    }
}

//! Console handle ownership.
//!
//! Entry points are bound once by the backend (see `Win32Console::attach`);
//! the registry owns the handles opened through it: the input stream, the
//! output stream, and the interrupt event.

use tracing::{debug, warn};

use super::api::ConsoleApi;
use super::error::{HandleError, NativeError};
use super::types::Handle;

#[derive(Debug)]
pub struct HandleRegistry {
    input: Handle,
    output: Handle,
    interrupt: Handle,
}

impl HandleRegistry {
    /// Create the interrupt event and open `CONIN$` and `CONOUT$`.
    ///
    /// Handles opened before a failure are closed again before returning.
    pub fn open<A: ConsoleApi>(api: &A) -> Result<Self, HandleError> {
        let interrupt = api.create_event().map_err(HandleError::EventCreate)?;

        let input = match api.open_input() {
            Ok(handle) => handle,
            Err(source) => {
                close_all(api, &[interrupt]);
                return Err(HandleError::ResourceUnavailable { stream: "CONIN$", source });
            }
        };

        let output = match api.open_output() {
            Ok(handle) => handle,
            Err(source) => {
                close_all(api, &[input, interrupt]);
                return Err(HandleError::ResourceUnavailable { stream: "CONOUT$", source });
            }
        };

        debug!(?input, ?output, ?interrupt, "console handles opened");
        Ok(Self { input, output, interrupt })
    }

    pub fn input(&self) -> Handle {
        self.input
    }

    pub fn output(&self) -> Handle {
        self.output
    }

    pub fn interrupt(&self) -> Handle {
        self.interrupt
    }

    /// Close every handle, collecting failures instead of stopping at the first.
    pub fn close<A: ConsoleApi>(self, api: &A) -> Vec<NativeError> {
        [self.output, self.input, self.interrupt]
            .into_iter()
            .filter_map(|handle| api.close(handle).err())
            .collect()
    }
}

fn close_all<A: ConsoleApi>(api: &A, handles: &[Handle]) {
    for handle in handles {
        if let Err(e) = api.close(*handle) {
            warn!("failed to close {:?}: {}", handle, e);
        }
    }
}

//! Console negotiation.
//!
//! This module turns the host console into a surface the renderer can own:
//!
//! - **api**: `ConsoleApi`, the typed contract of the host console
//! - **win32**: Windows implementation (entry points bound once per process)
//! - **registry**: input/output handles and the interrupt event
//! - **snapshot**: original input mode and cursor, for restoration
//! - **geometry**: platform minimum in cells, target window size
//! - **negotiator**: the ordered setup sequence and `ConsoleSession`
//! - **signal**: console control handler
//!
//! # Architecture
//!
//! ```text
//! ConsoleNegotiator::negotiate(api)
//! └── ConsoleSession
//!     ├── HandleRegistry (CONIN$, CONOUT$, interrupt event)
//!     ├── StateSnapshot  (mode + cursor, restored on teardown/drop)
//!     └── Coord          (resolved geometry for the renderer)
//! ```

pub mod api;
pub mod error;
pub mod geometry;
pub mod negotiator;
pub mod registry;
pub mod snapshot;
pub mod types;

#[cfg(windows)]
pub mod signal;
#[cfg(windows)]
pub mod win32;

#[cfg(test)]
pub mod mock;

pub use api::ConsoleApi;
pub use error::{ConsoleError, GeometryError, HandleError, NativeError};
pub use negotiator::{ConsoleNegotiator, ConsoleSession, ModePolicy, NegotiateOptions};
pub use types::{ConsoleMode, Coord, CursorState, Handle, Rect};

#[cfg(windows)]
pub use win32::Win32Console;

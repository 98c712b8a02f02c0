//! Console negotiation sequence and the session it produces.
//!
//! ```text
//! open -> snapshot -> mode -> geometry -> buffer -> window -> cursor query -> cursor hide
//! ```
//!
//! Each step's failure aborts the rest. Whatever was acquired before the
//! failure is released by `ConsoleSession`'s drop, so an early return still
//! restores the captured state and closes the handles.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::api::ConsoleApi;
use super::error::{ConsoleError, GeometryError, Result};
use super::geometry::{self, Geometry};
use super::registry::HandleRegistry;
use super::snapshot::StateSnapshot;
use super::types::{ConsoleMode, Coord, Handle, Rect};

/// How the window-input flag is applied to the captured input mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModePolicy {
    /// OR `WINDOW_INPUT` into the original mode
    #[default]
    Preserve,
    /// Replace the mode with `WINDOW_INPUT` alone
    Overwrite,
}

impl ModePolicy {
    pub fn apply(self, original: ConsoleMode) -> ConsoleMode {
        match self {
            ModePolicy::Preserve => original | ConsoleMode::WINDOW_INPUT,
            ModePolicy::Overwrite => ConsoleMode::WINDOW_INPUT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NegotiateOptions {
    pub mode_policy: ModePolicy,
    pub hide_cursor: bool,
}

impl Default for NegotiateOptions {
    fn default() -> Self {
        Self {
            mode_policy: ModePolicy::Preserve,
            hide_cursor: true,
        }
    }
}

/// Drives the setup sequence against a console backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleNegotiator {
    options: NegotiateOptions,
}

impl ConsoleNegotiator {
    pub fn new(options: NegotiateOptions) -> Self {
        Self { options }
    }

    /// Run the full setup sequence and hand back the live session.
    pub fn negotiate<A: ConsoleApi>(&self, api: A) -> Result<ConsoleSession<A>> {
        info!("negotiating console (mode policy {:?})", self.options.mode_policy);

        let registry = HandleRegistry::open(&api)?;
        let mut session = ConsoleSession {
            input: registry.input(),
            output: registry.output(),
            interrupt: registry.interrupt(),
            registry: Some(registry),
            snapshot: None,
            geometry: Coord::default(),
            api,
        };

        session.setup(&self.options)?;
        info!("console negotiated: {} cells", session.geometry);
        Ok(session)
    }
}

/// A negotiated console. Restores the original state when torn down or dropped.
pub struct ConsoleSession<A: ConsoleApi> {
    api: A,
    input: Handle,
    output: Handle,
    interrupt: Handle,
    registry: Option<HandleRegistry>,
    snapshot: Option<StateSnapshot>,
    geometry: Coord,
}

impl<A: ConsoleApi> ConsoleSession<A> {
    fn setup(&mut self, options: &NegotiateOptions) -> Result<()> {
        let snapshot = StateSnapshot::capture(&self.api, self.input, self.output)
            .map_err(ConsoleError::SnapshotFailed)?;
        debug!(
            "captured mode 0x{:04X}, cursor {:?}",
            snapshot.mode.bits(),
            snapshot.cursor
        );
        self.snapshot = Some(snapshot);

        let mode = options.mode_policy.apply(snapshot.mode);
        self.api
            .set_console_mode(self.input, mode)
            .map_err(ConsoleError::ModeSetFailed)?;
        debug!("input mode set to 0x{:04X}", mode.bits());

        self.fit()?;

        let mut baseline = snapshot;
        baseline
            .refresh_cursor(&self.api, self.output)
            .map_err(ConsoleError::CursorQueryFailed)?;
        self.snapshot = Some(baseline);

        if options.hide_cursor {
            self.api
                .set_cursor_info(self.output, baseline.cursor.hidden())
                .map_err(ConsoleError::CursorSetFailed)?;
            debug!("cursor hidden");
        }
        Ok(())
    }

    /// Resolve geometry, then size the buffer and the window to it.
    fn fit(&mut self) -> Result<Geometry> {
        let geometry = geometry::resolve(&self.api, self.output)?;
        debug!(
            "window {} minimum {} -> target {}",
            geometry.window, geometry.minimum, geometry.target
        );

        self.api
            .set_screen_buffer_size(self.output, geometry.target)
            .map_err(ConsoleError::BufferResizeFailed)?;
        self.api
            .set_window_info(self.output, true, Rect::from_size(geometry.target))
            .map_err(ConsoleError::WindowResizeFailed)?;

        self.geometry = geometry.target;
        Ok(geometry)
    }

    /// Re-fit buffer and window after the host window changed size.
    pub fn refit(&mut self) -> Result<Coord> {
        let previous = self.geometry;
        let geometry = self.fit()?;
        if geometry.target != previous {
            info!("console refit: {} -> {}", previous, geometry.target);
        }
        Ok(geometry.target)
    }

    /// Cell geometry the surface renderer should use.
    pub fn geometry(&self) -> Coord {
        self.geometry
    }

    /// Screen buffer size as the console currently reports it.
    pub fn buffer_size(&self) -> Result<Coord> {
        self.api
            .screen_buffer_info(self.output)
            .map(|info| info.size)
            .map_err(|e| GeometryError::Query(e).into())
    }

    pub fn input(&self) -> Handle {
        self.input
    }

    pub fn output(&self) -> Handle {
        self.output
    }

    pub fn interrupt_event(&self) -> Handle {
        self.interrupt
    }

    pub fn snapshot(&self) -> Option<&StateSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Restore the captured state and close the handles.
    ///
    /// Failures are logged and returned, never raised.
    pub fn teardown(mut self) -> Vec<ConsoleError> {
        self.release()
    }

    fn release(&mut self) -> Vec<ConsoleError> {
        let mut failures = Vec::new();

        if let Some(snapshot) = self.snapshot.take() {
            failures.extend(snapshot.restore(&self.api, self.input, self.output));
        }
        if let Some(registry) = self.registry.take() {
            failures.extend(registry.close(&self.api));
        }

        for failure in &failures {
            warn!("teardown: {}", failure);
        }
        if failures.is_empty() {
            debug!("console restored");
        }
        failures.into_iter().map(ConsoleError::RestoreFailed).collect()
    }
}

impl<A: ConsoleApi> Drop for ConsoleSession<A> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

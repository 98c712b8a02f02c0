//! Cell geometry resolution.
//!
//! The platform enforces a minimum window size in pixels. Converting that to
//! cells must round up: a window one cell short of the floor makes later
//! `SetConsoleWindowInfo` calls fail.

use tracing::debug;

use super::api::ConsoleApi;
use super::error::GeometryError;
use super::types::{clamp_i16, Coord, Handle, SystemMetric};

/// Result of one geometry pass, all in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    /// Platform floor converted to cells
    pub minimum: Coord,
    /// Visible window before negotiation
    pub window: Coord,
    /// Size the buffer and window are set to
    pub target: Coord,
}

/// Convert a pixel minimum into cells of `font` pixels, rounding up.
pub fn cells_for_pixels(min_px: (i32, i32), font: Coord) -> Result<Coord, GeometryError> {
    if font.x <= 0 || font.y <= 0 {
        return Err(GeometryError::ZeroFontSize {
            width: font.x,
            height: font.y,
        });
    }
    Ok(Coord {
        x: ceil_div(min_px.0, font.x),
        y: ceil_div(min_px.1, font.y),
    })
}

fn ceil_div(pixels: i32, per_cell: i16) -> i16 {
    let pixels = i64::from(pixels.max(0));
    let per_cell = i64::from(per_cell);
    clamp_i16(((pixels + per_cell - 1) / per_cell) as i32)
}

/// Grow `window` to at least `minimum` on each axis. Never shrinks.
pub fn clamp_to_minimum(window: Coord, minimum: Coord) -> Coord {
    window.normalized().max(minimum)
}

/// Platform-enforced minimum window size, in cells of the current font.
pub fn minimum_cell_size<A: ConsoleApi>(api: &A, output: Handle) -> Result<Coord, GeometryError> {
    let min_px = (
        api.system_metric(SystemMetric::MinWindowWidth),
        api.system_metric(SystemMetric::MinWindowHeight),
    );
    let font = api.current_font_size(output).map_err(GeometryError::Query)?;
    let minimum = cells_for_pixels(min_px, font)?;
    debug!(
        "minimum window {}x{} px with {}x{} px cells -> {}",
        min_px.0, min_px.1, font.x, font.y, minimum
    );
    Ok(minimum)
}

/// Current window size clamped up to the platform minimum.
pub fn target_window_size<A: ConsoleApi>(api: &A, output: Handle) -> Result<Coord, GeometryError> {
    resolve(api, output).map(|g| g.target)
}

/// Query minimum and current window size and reconcile them.
pub fn resolve<A: ConsoleApi>(api: &A, output: Handle) -> Result<Geometry, GeometryError> {
    let info = api.screen_buffer_info(output).map_err(GeometryError::Query)?;
    let minimum = minimum_cell_size(api, output)?;
    let window = info.window.size();
    debug!(
        "buffer {} window {:?} (largest {})",
        info.size, info.window, info.maximum_window_size
    );
    Ok(Geometry {
        minimum,
        window,
        target: clamp_to_minimum(window, minimum),
    })
}

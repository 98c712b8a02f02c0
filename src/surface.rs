//! Stand-in for the surface renderer.
//!
//! Shows the negotiated geometry on one status line and waits for the user
//! to quit, for a console control event, or for a window-resize
//! notification (delivered because negotiation enabled window input), in
//! which case the console is refit.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEventKind},
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use tracing::{debug, info};

use crate::console::{ConsoleApi, ConsoleSession, Coord};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run until `q`/`Esc` is pressed or `interrupted` reports true.
pub fn run<A: ConsoleApi, W: Write>(
    session: &mut ConsoleSession<A>,
    out: &mut W,
    interrupted: impl Fn() -> bool,
) -> Result<()> {
    draw_status(out, session.geometry())?;

    loop {
        if interrupted() {
            info!("interrupted by console control event");
            break;
        }
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    info!("quit requested");
                    break;
                }
            }
            Event::Resize(cols, rows) => {
                let reported = Coord::new(cols as i16, rows as i16);
                if reported == session.geometry() {
                    continue;
                }
                debug!("host reported {}", reported);
                let geometry = session.refit()?;
                draw_status(out, geometry)?;
            }
            _ => {}
        }
    }

    Ok(())
}

fn draw_status<W: Write>(out: &mut W, geometry: Coord) -> io::Result<()> {
    queue!(
        out,
        Clear(ClearType::All),
        MoveTo(0, 0),
        Print(format!("surface ready: {} (q to quit)", geometry))
    )?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::mock::MockConsole;
    use crate::console::{ConsoleNegotiator, CursorState};

    #[test]
    fn test_interrupt_ends_loop() {
        let mock = MockConsole::new();
        let original_mode = mock.mode();
        let original_cursor = mock.cursor();
        let mut session = ConsoleNegotiator::default().negotiate(&mock).unwrap();
        let mut out = Vec::new();

        run(&mut session, &mut out, || true).unwrap();

        let drawn = String::from_utf8_lossy(&out);
        assert!(drawn.contains("surface ready: 80x25"), "{drawn}");

        assert!(session.teardown().is_empty());
        assert_eq!(mock.mode(), original_mode);
        assert_eq!(mock.cursor(), original_cursor);
        assert_eq!(original_cursor, CursorState::new(25, true));
    }
}

//! Terminal access for application code.
//!
//! Applications call these functions instead of crossterm directly. Outside
//! a test they drive the real terminal through [`CrosstermBackend`]; inside
//! [`with_virtual_terminal`](crate::with_virtual_terminal) they are served
//! by the thread's virtual session, with no change to the application.
//!
//! ```no_run
//! use std::time::Duration;
//! use termprobe::{terminal, Event, HarnessResult};
//!
//! fn run() -> HarnessResult<()> {
//!     terminal::init()?;
//!     loop {
//!         terminal::draw("press q to quit")?;
//!         match terminal::poll_event(Duration::from_millis(100))? {
//!             Some(event) if event == Event::char('q') => break,
//!             _ => terminal::checkpoint()?,
//!         }
//!     }
//!     terminal::restore()
//! }
//! ```

use crate::backend::{Backend, CrosstermBackend};
use crate::buffer::Buffer;
use crate::event::Event;
use crate::result::{HarnessError, HarnessResult};
use crate::session::{self, Session};
use crate::widget::Widget;
use std::cell::RefCell;
use std::io::{self, Stdout};
use std::time::Duration;

thread_local! {
    static REAL: RefCell<Option<CrosstermBackend<Stdout>>> = const { RefCell::new(None) };
}

fn with_real<R>(
    f: impl FnOnce(&mut CrosstermBackend<Stdout>) -> HarnessResult<R>,
) -> HarnessResult<R> {
    REAL.with(|slot| {
        let mut slot = slot.try_borrow_mut().map_err(|_| HarnessError::TerminalError {
            message: "terminal is already in use on this thread".to_string(),
        })?;
        f(slot.get_or_insert_with(|| CrosstermBackend::new(io::stdout())))
    })
}

/// Whether calls on this thread are served by a virtual session.
#[must_use]
pub fn is_virtual() -> bool {
    session::is_active()
}

/// Enter application mode: raw mode, alternate screen, hidden cursor,
/// mouse capture.
pub fn init() -> HarnessResult<()> {
    if is_virtual() {
        Session::current()?.init()
    } else {
        with_real(Backend::init)
    }
}

/// Leave application mode.
pub fn restore() -> HarnessResult<()> {
    if is_virtual() {
        Session::current()?.restore()
    } else {
        with_real(Backend::restore)
    }
}

/// Terminal size in (columns, rows).
pub fn size() -> HarnessResult<(u16, u16)> {
    if is_virtual() {
        Session::current()?.size()
    } else {
        with_real(|backend| backend.size())
    }
}

/// Next input event, waiting up to `timeout` on a real terminal.
///
/// A virtual session answers immediately from its queue.
pub fn poll_event(timeout: Duration) -> HarnessResult<Option<Event>> {
    if is_virtual() {
        Session::current()?.poll()
    } else {
        with_real(|backend| backend.poll_event(timeout))
    }
}

/// Render `widget` over the whole screen.
pub fn draw<W: Widget + ?Sized>(widget: &W) -> HarnessResult<()> {
    if is_virtual() {
        return Session::current()?.draw(widget);
    }
    // Render outside the backend borrow so widgets may query the terminal.
    let (width, height) = size()?;
    let mut buffer = Buffer::new(width, height);
    widget.render(buffer.area(), &mut buffer);
    with_real(|backend| backend.present(&buffer))
}

/// Check the virtual session deadline. A no-op on a real terminal.
///
/// Loops that can go a long time without polling or drawing should call
/// this so a stuck test still ends at its deadline.
pub fn checkpoint() -> HarnessResult<()> {
    if is_virtual() {
        Session::current()?.checkpoint()
    } else {
        Ok(())
    }
}

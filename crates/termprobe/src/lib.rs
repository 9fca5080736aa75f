//! termprobe: deterministic tests for terminal UI applications
//!
//! Terminal applications usually sit in a blocking loop: read input, update
//! state, paint the screen. termprobe swaps the terminal underneath that loop
//! for a scripted one so the same code can run inside `cargo test`.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                    termprobe Architecture                      │
//! ├───────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐   poll_event   ┌────────────┐                 │
//! │   │ EventQueue │──────────────►│ App loop   │                 │
//! │   │ (scripted) │                │ (unchanged)│                 │
//! │   └────────────┘                └─────┬──────┘                 │
//! │                                  draw │                        │
//! │   ┌────────────┐   snapshots    ┌─────▼──────┐                 │
//! │   │ Baselines  │◄──────────────│ Buffer     │──► Predicates   │
//! │   │ (YAML)     │                │ (cells)    │                 │
//! │   └────────────┘                └────────────┘                 │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use termprobe::prelude::*;
//!
//! fn app() -> HarnessResult<String> {
//!     let mut typed = String::new();
//!     terminal::init()?;
//!     loop {
//!         terminal::draw(typed.as_str())?;
//!         match terminal::poll_event(std::time::Duration::from_millis(50))? {
//!             Some(Event::Key(key)) if key.is_char('q') || key.is_ctrl('c') => break,
//!             Some(Event::Key(KeyEvent { code: KeyCode::Char(ch), .. })) => typed.push(ch),
//!             _ => {}
//!         }
//!     }
//!     terminal::restore()?;
//!     Ok(typed)
//! }
//!
//! let config = SessionConfig::default().with_size(10, 1).with_test_name("crate_doc");
//! let typed = with_virtual_terminal(config, |term| {
//!     term.enqueue_all(["h", "i", "q"])?;
//!     let typed = app()?;
//!     term.assert_symbol("i", 1, 0)?;
//!     Ok(typed)
//! })
//! .unwrap();
//! assert_eq!(typed, "hi");
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Assertions over captured frame text
pub mod assertions;

/// Real and virtual terminal backends
#[allow(clippy::missing_errors_doc)]
pub mod backend;

/// Cell grid
pub mod buffer;

/// Session configuration
pub mod config;

/// Input events and shorthand tokens
pub mod event;

/// Frame capture
pub mod frame;

/// Test log output
pub mod logging;

/// Cell predicates
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod predicates;

/// Scripted input queue
pub mod queue;

mod result;

/// Virtual terminal sessions
#[allow(clippy::missing_errors_doc)]
pub mod session;

/// Snapshot baselines
#[allow(clippy::missing_errors_doc)]
pub mod snapshot;

/// Colors and modifiers
pub mod style;

/// Terminal access for application code
#[allow(clippy::missing_errors_doc)]
pub mod terminal;

/// Rendering seam
pub mod widget;

pub use assertions::{expect_frame, FrameAssertion};
pub use backend::{Backend, CrosstermBackend, Lifecycle};
pub use buffer::{Buffer, Cell, Rect};
pub use config::SessionConfig;
pub use event::{
    parse_shorthand, Event, IntoEvent, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent,
    MouseKind, NamedKey,
};
pub use frame::{Frame, FrameDiff, LineDiff};
pub use predicates::{CellAssertions, PredicateArg};
pub use queue::EventQueue;
pub use result::{HarnessError, HarnessResult};
pub use session::{with_virtual_terminal, Session};
pub use snapshot::{
    Baseline, RichSnapshot, SnapshotOutcome, SnapshotStore, StyledRun, TextSnapshot,
};
pub use style::{Color, Modifier, NamedColor, ParseColorError, Style};
pub use widget::{render_to_buffer, Styled, Widget};

/// Everything a test usually needs
pub mod prelude {
    pub use super::assertions::*;
    pub use super::backend::{Backend, Lifecycle};
    pub use super::buffer::*;
    pub use super::config::SessionConfig;
    pub use super::event::*;
    pub use super::frame::Frame;
    pub use super::logging::init_test_logging;
    pub use super::predicates::*;
    pub use super::result::*;
    pub use super::session::{with_virtual_terminal, Session};
    pub use super::snapshot::{SnapshotOutcome, SnapshotStore};
    pub use super::style::*;
    pub use super::terminal;
    pub use super::widget::*;
}

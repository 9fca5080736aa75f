//! Terminal backends.
//!
//! [`Backend`] is the seam between an application loop and the device it
//! drives. [`CrosstermBackend`] talks to a real terminal; the virtual
//! [`Session`](crate::Session) implements the same trait against its queue
//! and buffer.

use crate::buffer::Buffer;
use crate::event::Event;
use crate::result::HarnessResult;
use crate::style::{Color, Modifier, NamedColor, Style};
use crate::widget::Widget;
use crossterm::style::{
    Attribute, Color as CtColor, Print, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::{cursor, event as ct_event, execute, queue, terminal};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::Duration;
use tracing::debug;

/// Terminal mode state, tracked the same way for real and virtual terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    /// Raw mode enabled
    pub raw_mode: bool,
    /// Alternate screen active
    pub alternate_screen: bool,
    /// Cursor visible
    pub cursor_visible: bool,
    /// Mouse capture enabled
    pub mouse_captured: bool,
    /// Number of `init` calls
    pub init_calls: usize,
    /// Number of `restore` calls
    pub restore_calls: usize,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            raw_mode: false,
            alternate_screen: false,
            cursor_visible: true,
            mouse_captured: false,
            init_calls: 0,
            restore_calls: 0,
        }
    }
}

impl Lifecycle {
    pub(crate) fn record_init(&mut self) {
        self.raw_mode = true;
        self.alternate_screen = true;
        self.cursor_visible = false;
        self.mouse_captured = true;
        self.init_calls += 1;
    }

    pub(crate) fn record_restore(&mut self) {
        self.raw_mode = false;
        self.alternate_screen = false;
        self.cursor_visible = true;
        self.mouse_captured = false;
        self.restore_calls += 1;
    }

    /// Terminal is in application mode
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.raw_mode || self.alternate_screen
    }

    /// Terminal is back in its initial state
    #[must_use]
    pub const fn is_restored(&self) -> bool {
        !self.raw_mode && !self.alternate_screen && self.cursor_visible && !self.mouse_captured
    }
}

/// A device an application loop can drive.
pub trait Backend {
    /// Enter application mode
    fn init(&mut self) -> HarnessResult<()>;

    /// Leave application mode
    fn restore(&mut self) -> HarnessResult<()>;

    /// Current size in (columns, rows)
    fn size(&self) -> HarnessResult<(u16, u16)>;

    /// Next input event, waiting at most `timeout`
    fn poll_event(&mut self, timeout: Duration) -> HarnessResult<Option<Event>>;

    /// Replace the visible screen with `buffer`
    fn present(&mut self, buffer: &Buffer) -> HarnessResult<()>;

    /// Render `widget` into a full-size buffer and present it
    fn draw<W: Widget + ?Sized>(&mut self, widget: &W) -> HarnessResult<()>
    where
        Self: Sized,
    {
        let (width, height) = self.size()?;
        let mut buffer = Buffer::new(width, height);
        widget.render(buffer.area(), &mut buffer);
        self.present(&buffer)
    }
}

/// Backend for a real terminal via crossterm.
#[derive(Debug)]
pub struct CrosstermBackend<W: Write> {
    writer: W,
    lifecycle: Lifecycle,
    manage_raw_mode: bool,
    fixed_size: Option<(u16, u16)>,
}

impl<W: Write> CrosstermBackend<W> {
    /// Backend writing to `writer`
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            lifecycle: Lifecycle::default(),
            manage_raw_mode: true,
            fixed_size: None,
        }
    }

    /// Leave raw mode alone on init/restore (for writers that aren't a tty)
    #[must_use]
    pub fn without_raw_mode(mut self) -> Self {
        self.manage_raw_mode = false;
        self
    }

    /// Report a fixed size instead of querying the terminal
    #[must_use]
    pub fn with_fixed_size(mut self, width: u16, height: u16) -> Self {
        self.fixed_size = Some((width, height));
        self
    }

    /// Current mode state
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Underlying writer
    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn apply_style(&mut self, style: Style) -> HarnessResult<()> {
        queue!(self.writer, SetAttribute(Attribute::Reset))?;
        if !style.fg.is_unset() {
            queue!(self.writer, SetForegroundColor(to_crossterm_color(style.fg)))?;
        }
        if !style.bg.is_unset() {
            queue!(self.writer, SetBackgroundColor(to_crossterm_color(style.bg)))?;
        }
        for attribute in attributes(style.modifiers) {
            queue!(self.writer, SetAttribute(attribute))?;
        }
        Ok(())
    }
}

impl<W: Write> Backend for CrosstermBackend<W> {
    fn init(&mut self) -> HarnessResult<()> {
        if self.manage_raw_mode {
            terminal::enable_raw_mode()?;
        }
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            ct_event::EnableMouseCapture,
            ct_event::EnableBracketedPaste
        )?;
        self.lifecycle.record_init();
        debug!(init_calls = self.lifecycle.init_calls, "terminal initialized");
        Ok(())
    }

    fn restore(&mut self) -> HarnessResult<()> {
        execute!(
            self.writer,
            ct_event::DisableBracketedPaste,
            ct_event::DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        if self.manage_raw_mode {
            terminal::disable_raw_mode()?;
        }
        self.lifecycle.record_restore();
        debug!(restore_calls = self.lifecycle.restore_calls, "terminal restored");
        Ok(())
    }

    fn size(&self) -> HarnessResult<(u16, u16)> {
        match self.fixed_size {
            Some(size) => Ok(size),
            None => Ok(terminal::size()?),
        }
    }

    fn poll_event(&mut self, timeout: Duration) -> HarnessResult<Option<Event>> {
        if !ct_event::poll(timeout)? {
            return Ok(None);
        }
        let event = Event::from_crossterm(ct_event::read()?);
        if let Some(Event::Resize { width, height }) = &event {
            if self.fixed_size.is_some() {
                self.fixed_size = Some((*width, *height));
            }
        }
        Ok(event)
    }

    fn present(&mut self, buffer: &Buffer) -> HarnessResult<()> {
        let mut current: Option<Style> = None;
        for y in 0..buffer.height() {
            queue!(self.writer, cursor::MoveTo(0, y))?;
            let Some(row) = buffer.row(y) else {
                continue;
            };
            for cell in row.iter().filter(|c| !c.is_continuation()) {
                let style = cell.style();
                if current != Some(style) {
                    self.apply_style(style)?;
                    current = Some(style);
                }
                queue!(self.writer, Print(cell.symbol()))?;
            }
        }
        queue!(self.writer, SetAttribute(Attribute::Reset))?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for CrosstermBackend<W> {
    fn drop(&mut self) {
        if self.lifecycle.is_active() {
            let _ = self.restore();
        }
    }
}

/// Map a cell color onto crossterm's palette.
#[must_use]
pub fn to_crossterm_color(color: Color) -> CtColor {
    match color {
        Color::Unset => CtColor::Reset,
        Color::Indexed(index) => CtColor::AnsiValue(index),
        Color::Rgb(rgb) => CtColor::Rgb {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        },
        Color::Named(named) => match named {
            NamedColor::Black => CtColor::Black,
            NamedColor::Red => CtColor::DarkRed,
            NamedColor::Green => CtColor::DarkGreen,
            NamedColor::Yellow => CtColor::DarkYellow,
            NamedColor::Blue => CtColor::DarkBlue,
            NamedColor::Magenta => CtColor::DarkMagenta,
            NamedColor::Cyan => CtColor::DarkCyan,
            NamedColor::Gray => CtColor::Grey,
            NamedColor::DarkGray => CtColor::DarkGrey,
            NamedColor::LightRed => CtColor::Red,
            NamedColor::LightGreen => CtColor::Green,
            NamedColor::LightYellow => CtColor::Yellow,
            NamedColor::LightBlue => CtColor::Blue,
            NamedColor::LightMagenta => CtColor::Magenta,
            NamedColor::LightCyan => CtColor::Cyan,
            NamedColor::White => CtColor::White,
        },
    }
}

fn attributes(modifiers: Modifier) -> impl Iterator<Item = Attribute> {
    [
        (Modifier::BOLD, Attribute::Bold),
        (Modifier::DIM, Attribute::Dim),
        (Modifier::ITALIC, Attribute::Italic),
        (Modifier::UNDERLINED, Attribute::Underlined),
        (Modifier::SLOW_BLINK, Attribute::SlowBlink),
        (Modifier::RAPID_BLINK, Attribute::RapidBlink),
        (Modifier::REVERSED, Attribute::Reverse),
        (Modifier::HIDDEN, Attribute::Hidden),
        (Modifier::CROSSED_OUT, Attribute::CrossedOut),
    ]
    .into_iter()
    .filter(move |(flag, _)| modifiers.contains(*flag))
    .map(|(_, attribute)| attribute)
}

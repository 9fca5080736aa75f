//! Rendering seam.
//!
//! termprobe does not lay out or wrap anything itself. Whatever engine the
//! application uses is plugged in through [`Widget`]: given an area and a
//! blank buffer, paint the cells.

use crate::buffer::{Buffer, Rect};
use crate::style::Style;

/// Something that can paint itself into a buffer area.
pub trait Widget {
    /// Paint into `buf`, staying inside `area`.
    fn render(&self, area: Rect, buf: &mut Buffer);
}

impl<F> Widget for F
where
    F: Fn(Rect, &mut Buffer),
{
    fn render(&self, area: Rect, buf: &mut Buffer) {
        self(area, buf);
    }
}

/// Plain text: one row per line, unstyled, clipped to the area.
impl Widget for str {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        Styled::new(self, Style::new()).render(area, buf);
    }
}

impl Widget for String {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        self.as_str().render(area, buf);
    }
}

/// Text drawn with a single style.
#[derive(Debug, Clone, Copy)]
pub struct Styled<'a> {
    text: &'a str,
    style: Style,
}

impl<'a> Styled<'a> {
    /// Wrap `text` with `style`.
    #[must_use]
    pub const fn new(text: &'a str, style: Style) -> Self {
        Self { text, style }
    }
}

impl Widget for Styled<'_> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        for (offset, line) in self.text.lines().take(area.height as usize).enumerate() {
            let y = area.y + offset as u16;
            let mut clipped = Buffer::new(area.width, 1);
            clipped.set_string(0, 0, line, self.style);
            for (dx, cell) in clipped.cells().iter().enumerate() {
                if let Some(target) = buf.get_mut(area.x + dx as u16, y) {
                    *target = cell.clone();
                }
            }
        }
    }
}

/// Render `widget` into a fresh buffer of the given size.
#[must_use]
pub fn render_to_buffer<W: Widget + ?Sized>(widget: &W, width: u16, height: u16) -> Buffer {
    let mut buffer = Buffer::new(width, height);
    let area = buffer.area();
    widget.render(area, &mut buffer);
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Color, NamedColor};

    #[test]
    fn test_closure_widget() {
        let widget = |area: Rect, buf: &mut Buffer| {
            buf.set_string(area.x, area.y, "hello", Style::new());
        };
        let buffer = render_to_buffer(&widget, 8, 1);
        assert_eq!(buffer.to_lines(), vec!["hello   "]);
    }

    #[test]
    fn test_str_widget_lines_and_clipping() {
        let buffer = render_to_buffer("one\ntwo\nthree", 4, 2);
        assert_eq!(buffer.to_lines(), vec!["one ", "two "]);
    }

    #[test]
    fn test_styled_respects_area_offset() {
        let style = Style::new().fg(NamedColor::Green);
        let mut buffer = Buffer::new(6, 2);
        Styled::new("abcdef", style).render(Rect::new(2, 1, 3, 1), &mut buffer);
        assert_eq!(buffer.to_lines(), vec!["      ", "  abc "]);
        assert_eq!(buffer.get(2, 1).unwrap().fg, Color::Named(NamedColor::Green));
        assert_eq!(buffer.get(5, 1).unwrap().fg, Color::Unset);
    }
}

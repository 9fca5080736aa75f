//! Styled cell grid.
//!
//! A [`Buffer`] is the in-memory screen a virtual session paints into. Cells
//! are stored in a flat vector with row-major ordering. Wide glyphs occupy a
//! leading cell followed by continuation cells, which render as nothing.

use crate::style::{Color, Modifier, Style};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// A rectangular area of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left column
    pub x: u16,
    /// Top row
    pub y: u16,
    /// Width in columns
    pub width: u16,
    /// Height in rows
    pub height: u16,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of cells covered.
    #[must_use]
    pub const fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// One past the rightmost column.
    #[must_use]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// One past the bottom row.
    #[must_use]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Whether `(x, y)` falls inside.
    #[must_use]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// One grid position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    symbol: String,
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Text attributes
    pub modifiers: Modifier,
    continuation: bool,
}

impl Cell {
    /// A blank, unstyled cell.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            symbol: " ".to_string(),
            fg: Color::Unset,
            bg: Color::Unset,
            modifiers: Modifier::empty(),
            continuation: false,
        }
    }

    fn continuation_of(style: Style) -> Self {
        Self {
            symbol: String::new(),
            fg: style.fg,
            bg: style.bg,
            modifiers: style.modifiers,
            continuation: true,
        }
    }

    /// The displayed glyph. Empty for continuation cells.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Replace the glyph.
    pub fn set_symbol(&mut self, symbol: &str) -> &mut Self {
        symbol.clone_into(&mut self.symbol);
        self.continuation = false;
        self
    }

    /// Replace the glyph with a single character.
    pub fn set_char(&mut self, ch: char) -> &mut Self {
        self.symbol.clear();
        self.symbol.push(ch);
        self.continuation = false;
        self
    }

    /// Apply a style, replacing colors and modifiers.
    pub fn set_style(&mut self, style: Style) -> &mut Self {
        self.fg = style.fg;
        self.bg = style.bg;
        self.modifiers = style.modifiers;
        self
    }

    /// Current style.
    #[must_use]
    pub const fn style(&self) -> Style {
        Style {
            fg: self.fg,
            bg: self.bg,
            modifiers: self.modifiers,
        }
    }

    /// Whether this is the trailing placeholder of a wide glyph.
    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        self.continuation
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}

/// Fixed-size grid of styled cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    cells: Vec<Cell>,
    width: u16,
    height: u16,
}

impl Buffer {
    /// Create a buffer filled with blank cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            cells: vec![Cell::blank(); size],
            width,
            height,
        }
    }

    /// Create a buffer from plain text lines, padded to the widest line.
    #[must_use]
    pub fn with_lines(lines: &[&str]) -> Self {
        let width = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
        let mut buffer = Self::new(width, lines.len() as u16);
        for (y, line) in lines.iter().enumerate() {
            buffer.set_string(0, y as u16, line, Style::new());
        }
        buffer
    }

    /// Width of the grid.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height of the grid.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The full area.
    #[must_use]
    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Total number of cells.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y as usize) * (self.width as usize) + (x as usize))
        } else {
            None
        }
    }

    /// Cell at (x, y).
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|idx| &self.cells[idx])
    }

    /// Mutable cell at (x, y).
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|idx| &mut self.cells[idx])
    }

    /// Column of the glyph that owns (x, y): `x` itself unless (x, y) is a
    /// continuation cell.
    #[must_use]
    pub fn owner_column(&self, x: u16, y: u16) -> Option<u16> {
        let mut col = x;
        loop {
            let cell = self.get(col, y)?;
            if !cell.is_continuation() || col == 0 {
                return Some(col);
            }
            col -= 1;
        }
    }

    /// Row of cells.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = (y as usize) * (self.width as usize);
        Some(&self.cells[start..start + self.width as usize])
    }

    /// All cells, row-major.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::blank());
    }

    /// Write `text` starting at (x, y) with `style`.
    ///
    /// Text is split into graphemes. A glyph that does not fit in the
    /// remaining columns is dropped along with everything after it.
    /// Returns the column after the last written glyph.
    pub fn set_string(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        if y >= self.height {
            return x;
        }
        let mut col = x;
        for grapheme in text.graphemes(true) {
            let width = grapheme.width();
            if width == 0 {
                continue;
            }
            if col as usize + width > self.width as usize {
                break;
            }
            // Every column the glyph covers may belong to an older wide glyph.
            for offset in 0..width as u16 {
                self.clear_wide_owner(col + offset, y);
            }
            if let Some(cell) = self.get_mut(col, y) {
                cell.set_symbol(grapheme).set_style(style);
            }
            for offset in 1..width as u16 {
                if let Some(idx) = self.index(col + offset, y) {
                    self.cells[idx] = Cell::continuation_of(style);
                }
            }
            col += width as u16;
        }
        col
    }

    // Overwriting part of a wide glyph leaves the rest of it blank.
    fn clear_wide_owner(&mut self, x: u16, y: u16) {
        let Some(owner) = self.owner_column(x, y) else {
            return;
        };
        let mut col = owner + 1;
        while let Some(idx) = self.index(col, y) {
            if !self.cells[idx].is_continuation() {
                break;
            }
            self.cells[idx] = Cell::blank();
            col += 1;
        }
        if owner != x {
            if let Some(idx) = self.index(owner, y) {
                self.cells[idx] = Cell::blank();
            }
        }
    }

    /// Apply a style to every cell of `area` (clipped to the buffer).
    pub fn set_style(&mut self, area: Rect, style: Style) {
        for y in area.y..area.bottom().min(self.height) {
            for x in area.x..area.right().min(self.width) {
                if let Some(cell) = self.get_mut(x, y) {
                    cell.set_style(style);
                }
            }
        }
    }

    /// Fill a rectangular region with a character.
    pub fn fill_rect(&mut self, area: Rect, ch: char, style: Style) {
        for y in area.y..area.bottom().min(self.height) {
            for x in area.x..area.right().min(self.width) {
                if let Some(cell) = self.get_mut(x, y) {
                    cell.set_char(ch).set_style(style);
                }
            }
        }
    }

    /// Plain text of one row, continuation cells skipped.
    #[must_use]
    pub fn row_text(&self, y: u16) -> Option<String> {
        self.row(y).map(|cells| {
            cells
                .iter()
                .filter(|c| !c.is_continuation())
                .map(Cell::symbol)
                .collect()
        })
    }

    /// Plain text of every row.
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        (0..self.height).filter_map(|y| self.row_text(y)).collect()
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

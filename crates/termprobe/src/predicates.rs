//! Point-wise cell assertions.
//!
//! Arguments arrive as [`PredicateArg`] so that a call with its arguments in
//! the wrong order (`assert_fg(0, 0, "red")`) is reported as a type error
//! instead of being silently coerced. Every argument is checked before the
//! buffer is read.
//!
//! ```
//! use termprobe::{Buffer, CellAssertions, NamedColor, Style};
//!
//! let mut buffer = Buffer::new(4, 1);
//! buffer.set_string(0, 0, "ok", Style::new().fg(NamedColor::Red));
//!
//! let cells = CellAssertions::new(&buffer);
//! cells.assert_fg("red", 0, 0).unwrap();
//! cells.assert_red(1, 0).unwrap();
//! assert!(cells.assert_fg(0, 0, "red").is_err());
//! ```

use crate::buffer::{Buffer, Cell};
use crate::result::{HarnessError, HarnessResult};
use crate::style::{Color, Modifier, NamedColor};
use std::fmt;

/// A dynamically typed predicate argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateArg {
    /// A color value
    Color(Color),
    /// An integer, valid as a coordinate
    Int(i128),
    /// Text, valid as a color name
    Text(String),
}

impl PredicateArg {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Color(_) => "color",
            Self::Int(_) => "integer",
            Self::Text(_) => "string",
        }
    }
}

impl fmt::Display for PredicateArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color(color) => write!(f, "{color}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(text) => write!(f, "{text:?}"),
        }
    }
}

impl From<Color> for PredicateArg {
    fn from(color: Color) -> Self {
        Self::Color(color)
    }
}

impl From<NamedColor> for PredicateArg {
    fn from(color: NamedColor) -> Self {
        Self::Color(Color::Named(color))
    }
}

impl From<&str> for PredicateArg {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for PredicateArg {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for PredicateArg {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

macro_rules! int_args {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for PredicateArg {
                fn from(n: $ty) -> Self {
                    Self::Int(i128::try_from(n).unwrap_or(i128::MAX))
                }
            }
        )*
    };
}

int_args!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Calls `$callback!` with one `(fg shortcut, bg shortcut, palette color)`
/// entry per named color.
macro_rules! with_color_table {
    ($callback:ident) => {
        $callback! {
            (assert_black, assert_bg_black, Black),
            (assert_red, assert_bg_red, Red),
            (assert_green, assert_bg_green, Green),
            (assert_yellow, assert_bg_yellow, Yellow),
            (assert_blue, assert_bg_blue, Blue),
            (assert_magenta, assert_bg_magenta, Magenta),
            (assert_cyan, assert_bg_cyan, Cyan),
            (assert_gray, assert_bg_gray, Gray),
            (assert_dark_gray, assert_bg_dark_gray, DarkGray),
            (assert_light_red, assert_bg_light_red, LightRed),
            (assert_light_green, assert_bg_light_green, LightGreen),
            (assert_light_yellow, assert_bg_light_yellow, LightYellow),
            (assert_light_blue, assert_bg_light_blue, LightBlue),
            (assert_light_magenta, assert_bg_light_magenta, LightMagenta),
            (assert_light_cyan, assert_bg_light_cyan, LightCyan),
            (assert_white, assert_bg_white, White),
        }
    };
}

/// Calls `$callback!` with one `(shortcut, modifier)` entry per modifier
/// name and alias.
macro_rules! with_modifier_table {
    ($callback:ident) => {
        $callback! {
            (assert_bold, BOLD),
            (assert_dim, DIM),
            (assert_italic, ITALIC),
            (assert_underlined, UNDERLINED),
            (assert_underline, UNDERLINED),
            (assert_slow_blink, SLOW_BLINK),
            (assert_blink, SLOW_BLINK),
            (assert_rapid_blink, RAPID_BLINK),
            (assert_reversed, REVERSED),
            (assert_inverse, REVERSED),
            (assert_inverse_video, REVERSED),
            (assert_hidden, HIDDEN),
            (assert_crossed_out, CROSSED_OUT),
            (assert_strikethrough, CROSSED_OUT),
            (assert_strike, CROSSED_OUT),
        }
    };
}

/// Expands color table entries into methods delegating to `assert_fg` and
/// `assert_bg`. Usable in any impl block that has both.
macro_rules! color_shortcuts {
    ($(($fg:ident, $bg:ident, $color:ident)),* $(,)?) => {
        $(
            #[doc = concat!("Foreground at (col, row) is `", stringify!($color), "`.")]
            pub fn $fg(
                &self,
                col: impl Into<$crate::predicates::PredicateArg>,
                row: impl Into<$crate::predicates::PredicateArg>,
            ) -> $crate::result::HarnessResult<()> {
                self.assert_fg($crate::style::NamedColor::$color, col, row)
            }

            #[doc = concat!("Background at (col, row) is `", stringify!($color), "`.")]
            pub fn $bg(
                &self,
                col: impl Into<$crate::predicates::PredicateArg>,
                row: impl Into<$crate::predicates::PredicateArg>,
            ) -> $crate::result::HarnessResult<()> {
                self.assert_bg($crate::style::NamedColor::$color, col, row)
            }
        )*
    };
}

/// Expands modifier table entries into methods delegating to
/// `assert_modifier`.
macro_rules! modifier_shortcuts {
    ($(($name:ident, $flag:ident)),* $(,)?) => {
        $(
            #[doc = concat!("Cell at (col, row) has `", stringify!($flag), "` set.")]
            pub fn $name(
                &self,
                col: impl Into<$crate::predicates::PredicateArg>,
                row: impl Into<$crate::predicates::PredicateArg>,
            ) -> $crate::result::HarnessResult<()> {
                self.assert_modifier($crate::style::Modifier::$flag, col, row)
            }
        )*
    };
}

pub(crate) use color_shortcuts;
pub(crate) use modifier_shortcuts;
pub(crate) use with_color_table;
pub(crate) use with_modifier_table;

/// Cell predicates over a borrowed buffer.
#[derive(Debug, Clone, Copy)]
pub struct CellAssertions<'a> {
    buffer: &'a Buffer,
}

impl<'a> CellAssertions<'a> {
    /// Assertions against `buffer`
    #[must_use]
    pub const fn new(buffer: &'a Buffer) -> Self {
        Self { buffer }
    }

    /// Foreground at (col, row) equals `expected`.
    pub fn assert_fg(
        &self,
        expected: impl Into<PredicateArg>,
        col: impl Into<PredicateArg>,
        row: impl Into<PredicateArg>,
    ) -> HarnessResult<()> {
        self.check_color("assert_fg", expected.into(), col.into(), row.into(), |cell| cell.fg)
    }

    /// Background at (col, row) equals `expected`.
    pub fn assert_bg(
        &self,
        expected: impl Into<PredicateArg>,
        col: impl Into<PredicateArg>,
        row: impl Into<PredicateArg>,
    ) -> HarnessResult<()> {
        self.check_color("assert_bg", expected.into(), col.into(), row.into(), |cell| cell.bg)
    }

    /// Every flag of `modifier` is set at (col, row).
    pub fn assert_modifier(
        &self,
        modifier: Modifier,
        col: impl Into<PredicateArg>,
        row: impl Into<PredicateArg>,
    ) -> HarnessResult<()> {
        let predicate = format!("assert_{modifier}");
        let (col, row) = coordinates(&predicate, col.into(), row.into())?;
        let (x, y, cell) = self.cell(&predicate, col, row)?;
        if cell.modifiers.contains(modifier) {
            Ok(())
        } else {
            Err(HarnessError::AssertionValueMismatch {
                predicate,
                col: x,
                row: y,
                expected: modifier.to_string(),
                actual: cell.modifiers.to_string(),
            })
        }
    }

    /// Glyph at (col, row) equals `expected`.
    pub fn assert_symbol(
        &self,
        expected: &str,
        col: impl Into<PredicateArg>,
        row: impl Into<PredicateArg>,
    ) -> HarnessResult<()> {
        let (col, row) = coordinates("assert_symbol", col.into(), row.into())?;
        let (x, y, cell) = self.cell("assert_symbol", col, row)?;
        if cell.symbol() == expected {
            Ok(())
        } else {
            Err(HarnessError::AssertionValueMismatch {
                predicate: "assert_symbol".to_string(),
                col: x,
                row: y,
                expected: format!("{expected:?}"),
                actual: format!("{:?}", cell.symbol()),
            })
        }
    }

    with_color_table!(color_shortcuts);
    with_modifier_table!(modifier_shortcuts);

    fn check_color(
        &self,
        predicate: &str,
        expected: PredicateArg,
        col: PredicateArg,
        row: PredicateArg,
        channel: impl Fn(&Cell) -> Color,
    ) -> HarnessResult<()> {
        let expected = expected_color(predicate, expected)?;
        let (col, row) = coordinates(predicate, col, row)?;
        let (x, y, cell) = self.cell(predicate, col, row)?;
        let actual = channel(cell);
        if actual == expected {
            Ok(())
        } else {
            Err(HarnessError::AssertionValueMismatch {
                predicate: predicate.to_string(),
                col: x,
                row: y,
                expected: expected.to_string(),
                actual: actual.to_string(),
            })
        }
    }

    fn cell(&self, predicate: &str, col: i128, row: i128) -> HarnessResult<(u16, u16, &'a Cell)> {
        let buffer = self.buffer;
        let found = u16::try_from(col)
            .ok()
            .zip(u16::try_from(row).ok())
            .and_then(|(x, y)| buffer.get(x, y).map(|cell| (x, y, cell)));
        let Some((x, y, cell)) = found else {
            return Err(HarnessError::OutOfRange {
                col,
                row,
                width: buffer.width(),
                height: buffer.height(),
            });
        };
        if cell.is_continuation() {
            let owner = buffer.owner_column(x, y).unwrap_or(x);
            return Err(type_error(
                predicate,
                format!(
                    "cell ({x}, {y}) is the continuation of the wide glyph at ({owner}, {y}); \
                     assert on the owning cell instead"
                ),
            ));
        }
        Ok((x, y, cell))
    }
}

fn type_error(predicate: &str, message: String) -> HarnessError {
    HarnessError::AssertionTypeError {
        predicate: predicate.to_string(),
        message,
    }
}

fn expected_color(predicate: &str, arg: PredicateArg) -> HarnessResult<Color> {
    match arg {
        PredicateArg::Color(color) => Ok(color),
        PredicateArg::Text(text) => text
            .parse()
            .map_err(|_| type_error(predicate, format!("expected a color, got unknown color name {text:?}"))),
        PredicateArg::Int(_) => Err(type_error(
            predicate,
            format!("expected a color as the first argument, got {} {arg}", arg.kind()),
        )),
    }
}

fn coordinates(predicate: &str, col: PredicateArg, row: PredicateArg) -> HarnessResult<(i128, i128)> {
    Ok((
        coordinate(predicate, "column", col)?,
        coordinate(predicate, "row", row)?,
    ))
}

fn coordinate(predicate: &str, axis: &str, arg: PredicateArg) -> HarnessResult<i128> {
    match arg {
        PredicateArg::Int(n) if n >= 0 => Ok(n),
        PredicateArg::Int(n) => Err(type_error(
            predicate,
            format!("{axis} must be a non-negative integer, got {n}"),
        )),
        other => Err(type_error(
            predicate,
            format!("{axis} must be an integer, got {} {other}", other.kind()),
        )),
    }
}

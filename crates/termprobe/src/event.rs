//! Input events and shorthand expansion.
//!
//! Tests rarely spell out full events. Anything implementing [`IntoEvent`]
//! can be enqueued: a `char`, a token such as `"enter"` or `"ctrl_c"`, a
//! [`NamedKey`], or a complete [`Event`]. Expansion happens once, when the
//! value is enqueued.

use crate::result::{HarnessError, HarnessResult};
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Modifier keys held during a key or mouse event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        /// Shift
        const SHIFT = 0b001;
        /// Alt / Option
        const ALT   = 0b010;
        /// Control
        const CTRL  = 0b100;
    }
}

/// Non-character keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    /// Arrow up
    Up,
    /// Arrow down
    Down,
    /// Arrow left
    Left,
    /// Arrow right
    Right,
    /// Enter / Return
    Enter,
    /// Escape
    Esc,
    /// Backspace
    Backspace,
    /// Tab
    Tab,
    /// Shift+Tab as reported by most terminals
    BackTab,
    /// Delete
    Delete,
    /// Insert
    Insert,
    /// Home
    Home,
    /// End
    End,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Function key F1..=F24
    F(u8),
}

impl NamedKey {
    const TOKENS: [(&'static str, Self); 15] = [
        ("up", Self::Up),
        ("down", Self::Down),
        ("left", Self::Left),
        ("right", Self::Right),
        ("enter", Self::Enter),
        ("esc", Self::Esc),
        ("backspace", Self::Backspace),
        ("tab", Self::Tab),
        ("backtab", Self::BackTab),
        ("delete", Self::Delete),
        ("insert", Self::Insert),
        ("home", Self::Home),
        ("end", Self::End),
        ("page_up", Self::PageUp),
        ("page_down", Self::PageDown),
    ];

    /// Look up a named key token. Accepts a few common synonyms.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.to_ascii_lowercase();
        let token = match token.as_str() {
            "return" => "enter",
            "escape" => "esc",
            "del" => "delete",
            "pageup" | "pgup" => "page_up",
            "pagedown" | "pgdn" => "page_down",
            other => other,
        };
        if let Some(num) = token.strip_prefix('f') {
            if let Ok(n @ 1..=24) = num.parse::<u8>() {
                return Some(Self::F(n));
            }
        }
        Self::TOKENS
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, key)| *key)
    }
}

impl fmt::Display for NamedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Self::F(n) = self {
            return write!(f, "f{n}");
        }
        let name = Self::TOKENS
            .iter()
            .find(|(_, key)| key == self)
            .map_or("?", |(name, _)| *name);
        f.write_str(name)
    }
}

/// What a key event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character
    Char(char),
    /// A named key
    Named(NamedKey),
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{c}"),
            Self::Named(key) => write!(f, "{key}"),
        }
    }
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Key code
    pub code: KeyCode,
    /// Held modifiers
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    /// Key press without modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::empty(),
        }
    }

    /// Key press with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Whether this is the given character without modifiers.
    #[must_use]
    pub fn is_char(&self, ch: char) -> bool {
        self.code == KeyCode::Char(ch) && self.modifiers.is_empty()
    }

    /// Whether this is Ctrl+`ch`.
    #[must_use]
    pub fn is_ctrl(&self, ch: char) -> bool {
        self.code == KeyCode::Char(ch) && self.modifiers == KeyModifiers::CTRL
    }
}

/// Kind of mouse action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseKind {
    /// Button pressed
    Down,
    /// Button released
    Up,
    /// Moved while a button is held
    Drag,
    /// Moved with no button held
    Moved,
    /// Wheel up
    ScrollUp,
    /// Wheel down
    ScrollDown,
}

/// Mouse button involved in the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button
    Left,
    /// Right button
    Right,
    /// Middle button
    Middle,
    /// No button (moves and scrolls)
    None,
}

/// A mouse action at a cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    /// Action
    pub kind: MouseKind,
    /// Button
    pub button: MouseButton,
    /// Column (0-indexed)
    pub x: u16,
    /// Row (0-indexed)
    pub y: u16,
    /// Held modifiers
    pub modifiers: KeyModifiers,
}

impl MouseEvent {
    /// Mouse event without modifiers.
    #[must_use]
    pub const fn new(kind: MouseKind, button: MouseButton, x: u16, y: u16) -> Self {
        Self {
            kind,
            button,
            x,
            y,
            modifiers: KeyModifiers::empty(),
        }
    }

    /// Add modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Input event delivered to the application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Event {
    /// Key press
    Key(KeyEvent),
    /// Mouse action
    Mouse(MouseEvent),
    /// Terminal resized
    Resize {
        /// New width
        width: u16,
        /// New height
        height: u16,
    },
    /// Bracketed paste
    Paste {
        /// Pasted text
        text: String,
    },
}

impl Event {
    /// Key event for a character.
    #[must_use]
    pub const fn char(ch: char) -> Self {
        Self::Key(KeyEvent::new(KeyCode::Char(ch)))
    }

    /// Key event for a named key.
    #[must_use]
    pub const fn key(key: NamedKey) -> Self {
        Self::Key(KeyEvent::new(KeyCode::Named(key)))
    }

    /// Ctrl+`ch`.
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self::Key(KeyEvent::new(KeyCode::Char(ch)).with_modifiers(KeyModifiers::CTRL))
    }

    /// Paste event.
    #[must_use]
    pub fn paste(text: impl Into<String>) -> Self {
        Self::Paste { text: text.into() }
    }

    /// Key payload, if this is a key event.
    #[must_use]
    pub const fn as_key(&self) -> Option<&KeyEvent> {
        match self {
            Self::Key(key) => Some(key),
            _ => None,
        }
    }

    /// Mouse payload, if this is a mouse event.
    #[must_use]
    pub const fn as_mouse(&self) -> Option<&MouseEvent> {
        match self {
            Self::Mouse(mouse) => Some(mouse),
            _ => None,
        }
    }

    /// Convert a crossterm event. Focus events and key releases have no
    /// counterpart and yield `None`.
    #[must_use]
    pub fn from_crossterm(event: crossterm::event::Event) -> Option<Self> {
        use crossterm::event as ct;

        match event {
            ct::Event::Key(key) => {
                if key.kind == ct::KeyEventKind::Release {
                    return None;
                }
                let code = match key.code {
                    ct::KeyCode::Char(c) => KeyCode::Char(c),
                    ct::KeyCode::Up => KeyCode::Named(NamedKey::Up),
                    ct::KeyCode::Down => KeyCode::Named(NamedKey::Down),
                    ct::KeyCode::Left => KeyCode::Named(NamedKey::Left),
                    ct::KeyCode::Right => KeyCode::Named(NamedKey::Right),
                    ct::KeyCode::Enter => KeyCode::Named(NamedKey::Enter),
                    ct::KeyCode::Esc => KeyCode::Named(NamedKey::Esc),
                    ct::KeyCode::Backspace => KeyCode::Named(NamedKey::Backspace),
                    ct::KeyCode::Tab => KeyCode::Named(NamedKey::Tab),
                    ct::KeyCode::BackTab => KeyCode::Named(NamedKey::BackTab),
                    ct::KeyCode::Delete => KeyCode::Named(NamedKey::Delete),
                    ct::KeyCode::Insert => KeyCode::Named(NamedKey::Insert),
                    ct::KeyCode::Home => KeyCode::Named(NamedKey::Home),
                    ct::KeyCode::End => KeyCode::Named(NamedKey::End),
                    ct::KeyCode::PageUp => KeyCode::Named(NamedKey::PageUp),
                    ct::KeyCode::PageDown => KeyCode::Named(NamedKey::PageDown),
                    ct::KeyCode::F(n) => KeyCode::Named(NamedKey::F(n)),
                    _ => return None,
                };
                Some(Self::Key(KeyEvent {
                    code,
                    modifiers: modifiers_from_crossterm(key.modifiers),
                }))
            }
            ct::Event::Mouse(mouse) => {
                let (kind, button) = match mouse.kind {
                    ct::MouseEventKind::Down(b) => (MouseKind::Down, button_from_crossterm(b)),
                    ct::MouseEventKind::Up(b) => (MouseKind::Up, button_from_crossterm(b)),
                    ct::MouseEventKind::Drag(b) => (MouseKind::Drag, button_from_crossterm(b)),
                    ct::MouseEventKind::Moved => (MouseKind::Moved, MouseButton::None),
                    ct::MouseEventKind::ScrollUp => (MouseKind::ScrollUp, MouseButton::None),
                    ct::MouseEventKind::ScrollDown => (MouseKind::ScrollDown, MouseButton::None),
                    _ => return None,
                };
                Some(Self::Mouse(
                    MouseEvent::new(kind, button, mouse.column, mouse.row)
                        .with_modifiers(modifiers_from_crossterm(mouse.modifiers)),
                ))
            }
            ct::Event::Resize(width, height) => Some(Self::Resize { width, height }),
            ct::Event::Paste(text) => Some(Self::Paste { text }),
            _ => None,
        }
    }
}

fn modifiers_from_crossterm(modifiers: crossterm::event::KeyModifiers) -> KeyModifiers {
    use crossterm::event::KeyModifiers as Ct;

    let mut out = KeyModifiers::empty();
    out.set(KeyModifiers::SHIFT, modifiers.contains(Ct::SHIFT));
    out.set(KeyModifiers::ALT, modifiers.contains(Ct::ALT));
    out.set(KeyModifiers::CTRL, modifiers.contains(Ct::CONTROL));
    out
}

const fn button_from_crossterm(button: crossterm::event::MouseButton) -> MouseButton {
    match button {
        crossterm::event::MouseButton::Left => MouseButton::Left,
        crossterm::event::MouseButton::Right => MouseButton::Right,
        crossterm::event::MouseButton::Middle => MouseButton::Middle,
    }
}

/// Expand a shorthand token into a key event.
///
/// - a single character: that character, no modifiers
/// - a named key (`up`, `enter`, `esc`, `f5`, ...) or `space`
/// - `ctrl_`, `alt_` and `shift_` prefixes, in any combination, ahead of
///   either of the above (`ctrl_c`, `ctrl_alt_delete`)
pub fn parse_shorthand(token: &str) -> HarnessResult<Event> {
    let invalid = || HarnessError::InvalidShorthand {
        token: token.to_string(),
    };

    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(Event::char(c));
    }

    let mut rest = token;
    let mut modifiers = KeyModifiers::empty();
    loop {
        let lower = rest.to_ascii_lowercase();
        let (prefix_len, modifier) = if lower.starts_with("ctrl_") || lower.starts_with("ctrl+") {
            (5, KeyModifiers::CTRL)
        } else if lower.starts_with("alt_") || lower.starts_with("alt+") {
            (4, KeyModifiers::ALT)
        } else if lower.starts_with("shift_") || lower.starts_with("shift+") {
            (6, KeyModifiers::SHIFT)
        } else {
            break;
        };
        if rest.len() == prefix_len {
            break;
        }
        modifiers |= modifier;
        rest = &rest[prefix_len..];
    }

    let mut base = rest.chars();
    let code = match (base.next(), base.next()) {
        (Some(c), None) if !modifiers.is_empty() => KeyCode::Char(c),
        _ if rest.eq_ignore_ascii_case("space") => KeyCode::Char(' '),
        _ => KeyCode::Named(NamedKey::from_token(rest).ok_or_else(invalid)?),
    };
    Ok(Event::Key(KeyEvent { code, modifiers }))
}

/// Values that expand into an [`Event`] at enqueue time.
pub trait IntoEvent {
    /// Expand into a full event.
    fn into_event(self) -> HarnessResult<Event>;
}

impl IntoEvent for Event {
    fn into_event(self) -> HarnessResult<Event> {
        Ok(self)
    }
}

impl IntoEvent for KeyEvent {
    fn into_event(self) -> HarnessResult<Event> {
        Ok(Event::Key(self))
    }
}

impl IntoEvent for MouseEvent {
    fn into_event(self) -> HarnessResult<Event> {
        Ok(Event::Mouse(self))
    }
}

impl IntoEvent for KeyCode {
    fn into_event(self) -> HarnessResult<Event> {
        Ok(Event::Key(KeyEvent::new(self)))
    }
}

impl IntoEvent for NamedKey {
    fn into_event(self) -> HarnessResult<Event> {
        Ok(Event::key(self))
    }
}

impl IntoEvent for char {
    fn into_event(self) -> HarnessResult<Event> {
        Ok(Event::char(self))
    }
}

impl IntoEvent for &str {
    fn into_event(self) -> HarnessResult<Event> {
        parse_shorthand(self)
    }
}

impl IntoEvent for String {
    fn into_event(self) -> HarnessResult<Event> {
        parse_shorthand(&self)
    }
}

impl IntoEvent for &String {
    fn into_event(self) -> HarnessResult<Event> {
        parse_shorthand(self)
    }
}

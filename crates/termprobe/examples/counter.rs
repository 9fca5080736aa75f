//! Example: Counter
//!
//! Demonstrates: an application loop written against `termprobe::terminal`
//! that runs unchanged on a real terminal and inside `with_virtual_terminal`.
//!
//! Run with: `cargo run --example counter`
//!
//! Keys: `up`/`+` increment, `down`/`-` decrement, `r` reset, `q` or Ctrl+C quit.

use std::time::Duration;
use termprobe::prelude::*;

#[derive(Debug, Default)]
struct Counter {
    value: i64,
    last_key: Option<String>,
}

impl Counter {
    /// Apply one event; returns false when the app should exit.
    fn update(&mut self, event: &Event) -> bool {
        let Some(key) = event.as_key() else {
            return true;
        };
        if key.is_char('q') || key.is_ctrl('c') {
            return false;
        }
        match key.code {
            KeyCode::Named(NamedKey::Up) | KeyCode::Char('+') => self.value += 1,
            KeyCode::Named(NamedKey::Down) | KeyCode::Char('-') => self.value -= 1,
            KeyCode::Char('r') => self.value = 0,
            _ => {}
        }
        self.last_key = Some(key.code.to_string());
        true
    }

    fn view(&self) -> impl Fn(Rect, &mut Buffer) + '_ {
        move |area: Rect, buf: &mut Buffer| {
            let color = match self.value {
                v if v > 0 => NamedColor::Green,
                v if v < 0 => NamedColor::Red,
                _ => NamedColor::White,
            };
            buf.set_string(area.x, area.y, "Counter", Style::new().add_modifier(Modifier::BOLD));
            buf.set_string(area.x, area.y + 1, &format!("value: {}", self.value), Style::new().fg(color));
            if let Some(key) = &self.last_key {
                buf.set_string(area.x, area.y + 2, &format!("last key: {key}"), Style::new().add_modifier(Modifier::DIM));
            }
            buf.set_string(area.x, area.y + 3, "up/down change, r reset, q quit", Style::new());
        }
    }
}

fn event_loop(counter: &mut Counter) -> HarnessResult<()> {
    loop {
        terminal::draw(&counter.view())?;
        let Some(event) = terminal::poll_event(Duration::from_millis(250))? else {
            continue;
        };
        if !counter.update(&event) {
            return Ok(());
        }
    }
}

fn run() -> HarnessResult<i64> {
    let mut counter = Counter::default();
    terminal::init()?;
    let result = event_loop(&mut counter);
    terminal::restore()?;
    result.map(|()| counter.value)
}

fn main() -> HarnessResult<()> {
    // `--scripted` replays a fixed key sequence through a virtual terminal.
    if std::env::args().any(|arg| arg == "--scripted") {
        init_test_logging();
        let config = SessionConfig::default().with_size(40, 4).with_test_name("counter_example");
        let value = with_virtual_terminal(config, |term| {
            term.enqueue_all(["up", "up", "+", "down", "q"])?;
            let value = run()?;
            term.assert_green(7, 1)?;
            println!("{}", term.current_frame()?.as_text());
            Ok(value)
        })?;
        println!("final value: {value}");
        return Ok(());
    }

    let value = run()?;
    println!("final value: {value}");
    Ok(())
}

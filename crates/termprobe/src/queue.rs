//! Scripted input queue.
//!
//! Events come out in exactly the order they went in, whatever their
//! variant. Polling never blocks: an empty queue answers `None`.

use crate::event::{Event, IntoEvent, MouseButton, MouseEvent, MouseKind};
use crate::result::HarnessResult;
use std::collections::VecDeque;

/// FIFO of synthetic input events.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
    delivered: usize,
    empty_polls: usize,
}

impl EventQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand and append one event.
    pub fn enqueue(&mut self, input: impl IntoEvent) -> HarnessResult<()> {
        let event = input.into_event()?;
        self.events.push_back(event);
        Ok(())
    }

    /// Expand and append several events, preserving order.
    ///
    /// Expansion of the whole batch happens before anything is appended, so
    /// an invalid token leaves the queue untouched.
    pub fn enqueue_all<I>(&mut self, inputs: I) -> HarnessResult<()>
    where
        I: IntoIterator,
        I::Item: IntoEvent,
    {
        let expanded = inputs
            .into_iter()
            .map(IntoEvent::into_event)
            .collect::<HarnessResult<Vec<_>>>()?;
        self.events.extend(expanded);
        Ok(())
    }

    /// Append a left-button press and release at (x, y).
    pub fn click(&mut self, x: u16, y: u16) {
        self.click_with(MouseButton::Left, x, y);
    }

    /// Append a press and release of `button` at (x, y).
    pub fn click_with(&mut self, button: MouseButton, x: u16, y: u16) {
        self.events
            .push_back(Event::Mouse(MouseEvent::new(MouseKind::Down, button, x, y)));
        self.events
            .push_back(Event::Mouse(MouseEvent::new(MouseKind::Up, button, x, y)));
    }

    /// Remove and return the oldest event.
    pub fn poll(&mut self) -> Option<Event> {
        match self.events.pop_front() {
            Some(event) => {
                self.delivered += 1;
                Some(event)
            }
            None => {
                self.empty_polls += 1;
                None
            }
        }
    }

    /// Oldest event, without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<&Event> {
        self.events.front()
    }

    /// Number of undelivered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether every event has been delivered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events handed out so far.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Number of polls that found the queue empty.
    #[must_use]
    pub fn empty_polls(&self) -> usize {
        self.empty_polls
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::event::NamedKey;
    use proptest::prelude::*;

    #[test]
    fn test_fifo_across_variants() {
        let mut queue = EventQueue::new();
        queue.enqueue('a').unwrap();
        queue.click(3, 4);
        queue
            .enqueue(Event::Resize {
                width: 10,
                height: 5,
            })
            .unwrap();
        queue.enqueue(Event::paste("hi")).unwrap();
        queue.enqueue("enter").unwrap();

        assert_eq!(queue.len(), 6);
        assert_eq!(queue.poll(), Some(Event::char('a')));
        assert_eq!(queue.poll().unwrap().as_mouse().unwrap().kind, MouseKind::Down);
        assert_eq!(queue.poll().unwrap().as_mouse().unwrap().kind, MouseKind::Up);
        assert!(matches!(queue.poll(), Some(Event::Resize { width: 10, height: 5 })));
        assert_eq!(queue.poll(), Some(Event::paste("hi")));
        assert_eq!(queue.poll(), Some(Event::key(NamedKey::Enter)));
        assert_eq!(queue.poll(), None);
        assert_eq!(queue.delivered(), 6);
    }

    #[test]
    fn test_click_pairs_at_same_position() {
        let mut queue = EventQueue::new();
        queue.click_with(MouseButton::Middle, 7, 2);
        let down = queue.poll().unwrap();
        let up = queue.poll().unwrap();
        assert_eq!(
            down,
            Event::Mouse(MouseEvent::new(MouseKind::Down, MouseButton::Middle, 7, 2))
        );
        assert_eq!(
            up,
            Event::Mouse(MouseEvent::new(MouseKind::Up, MouseButton::Middle, 7, 2))
        );
    }

    #[test]
    fn test_enqueue_all_is_atomic() {
        let mut queue = EventQueue::new();
        queue.enqueue('x').unwrap();
        assert!(queue.enqueue_all(["a", "not_a_key", "b"]).is_err());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_empty_poll_counted() {
        let mut queue = EventQueue::new();
        assert_eq!(queue.poll(), None);
        assert_eq!(queue.poll(), None);
        assert_eq!(queue.empty_polls(), 2);
        assert_eq!(queue.delivered(), 0);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut queue = EventQueue::new();
        queue.enqueue("q").unwrap();
        assert_eq!(queue.peek(), Some(&Event::char('q')));
        assert_eq!(queue.len(), 1);
    }

    fn any_event() -> impl Strategy<Value = Event> {
        prop_oneof![
            any::<char>().prop_map(Event::char),
            (0u16..200, 0u16..60).prop_map(|(x, y)| {
                Event::Mouse(MouseEvent::new(MouseKind::Moved, MouseButton::None, x, y))
            }),
            (1u16..300, 1u16..100).prop_map(|(width, height)| Event::Resize { width, height }),
            "[a-z ]{0,12}".prop_map(Event::paste),
        ]
    }

    proptest! {
        #[test]
        fn prop_poll_order_equals_enqueue_order(events in prop::collection::vec(any_event(), 0..64)) {
            let mut queue = EventQueue::new();
            queue.enqueue_all(events.clone()).unwrap();

            let mut polled = Vec::new();
            while let Some(event) = queue.poll() {
                polled.push(event);
            }
            prop_assert_eq!(polled, events);
            for _ in 0..3 {
                prop_assert!(queue.poll().is_none());
            }
        }

        #[test]
        fn prop_click_yields_down_then_up(x in any::<u16>(), y in any::<u16>()) {
            let mut queue = EventQueue::new();
            queue.click(x, y);
            let down = queue.poll().unwrap();
            let up = queue.poll().unwrap();
            prop_assert_eq!(down, Event::Mouse(MouseEvent::new(MouseKind::Down, MouseButton::Left, x, y)));
            prop_assert_eq!(up, Event::Mouse(MouseEvent::new(MouseKind::Up, MouseButton::Left, x, y)));
            prop_assert!(queue.poll().is_none());
        }
    }
}

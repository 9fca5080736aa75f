//! Virtual terminal sessions.
//!
//! [`with_virtual_terminal`] installs a session on the current thread, runs a
//! test closure against it and tears it down on every exit path. While the
//! session is active, everything in [`crate::terminal`] is served from the
//! session's event queue and captured into its buffer.
//!
//! Each thread holds at most one session. libtest runs every test on its own
//! thread, so tests never see each other's sessions.
//!
//! # Deadline
//!
//! Every harness call (poll, draw, enqueue, assertions, `checkpoint`) checks
//! the session deadline. Once it has passed, the call unwinds out of the
//! closure and [`with_virtual_terminal`] returns
//! [`HarnessError::SessionTimeout`]. A closure that never calls into the
//! harness cannot be interrupted.
//!
//! ```
//! use termprobe::{with_virtual_terminal, Event, SessionConfig};
//!
//! let config = SessionConfig::default().with_size(20, 2).with_test_name("doc");
//! let keys = with_virtual_terminal(config, |term| {
//!     term.enqueue_all(["a", "down", "ctrl_c"])?;
//!     let mut seen = Vec::new();
//!     while let Some(event) = term.poll()? {
//!         seen.push(event);
//!     }
//!     Ok(seen)
//! })
//! .unwrap();
//! assert_eq!(keys.len(), 3);
//! assert_eq!(keys[0], Event::char('a'));
//! ```

use crate::backend::{Backend, Lifecycle};
use crate::buffer::Buffer;
use crate::config::SessionConfig;
use crate::event::{Event, IntoEvent, MouseButton};
use crate::frame::Frame;
use crate::predicates::{
    color_shortcuts, modifier_shortcuts, with_color_table, with_modifier_table, CellAssertions,
    PredicateArg,
};
use crate::queue::EventQueue;
use crate::result::{HarnessError, HarnessResult};
use crate::snapshot::{SnapshotOutcome, SnapshotStore};
use crate::style::Modifier;
use crate::widget::Widget;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

thread_local! {
    static ACTIVE: RefCell<Option<SessionState>> = const { RefCell::new(None) };
}

/// Unwind payload raised when a harness call finds the deadline passed.
#[derive(Debug)]
struct DeadlineExpired {
    ms: u64,
}

#[derive(Debug, Clone, Copy)]
struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    fn start(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    fn expired(&self) -> bool {
        self.started.elapsed() >= self.limit
    }

    fn limit_ms(&self) -> u64 {
        u64::try_from(self.limit.as_millis()).unwrap_or(u64::MAX)
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

#[derive(Debug)]
struct SessionState {
    test_name: Option<String>,
    width: u16,
    height: u16,
    queue: EventQueue,
    buffer: Buffer,
    frames: Vec<Frame>,
    lifecycle: Lifecycle,
    deadline: Deadline,
    snapshots: SnapshotStore,
    yield_on_empty_poll: bool,
}

impl SessionState {
    fn new(config: &SessionConfig) -> Self {
        Self {
            test_name: config.resolved_test_name(),
            width: config.width,
            height: config.height,
            queue: EventQueue::new(),
            buffer: Buffer::new(config.width, config.height),
            frames: Vec::new(),
            lifecycle: Lifecycle::default(),
            deadline: Deadline::start(config.timeout()),
            snapshots: SnapshotStore::new(&config.snapshot_dir)
                .with_update_mode(config.update_snapshots),
            yield_on_empty_poll: config.yield_on_empty_poll,
        }
    }

    fn label(&self) -> &str {
        self.test_name.as_deref().unwrap_or("<unnamed>")
    }

    fn namespace(&self, snapshot: &str) -> HarnessResult<&str> {
        self.test_name
            .as_deref()
            .ok_or_else(|| HarnessError::MissingTestName {
                name: snapshot.to_string(),
            })
    }

    fn commit(&mut self, buffer: Buffer) -> usize {
        let index = self.frames.len();
        self.frames
            .push(Frame::from_buffer(&buffer, index, self.deadline.elapsed_ms()));
        self.buffer = buffer;
        index
    }
}

/// Run `f` against the active session, after checking the deadline.
///
/// The deadline is not checked while the thread is unwinding, so drop
/// guards that restore the terminal still reach the session.
///
/// `f` must not call back into the harness.
fn with_active<R>(f: impl FnOnce(&mut SessionState) -> R) -> HarnessResult<R> {
    let outcome: HarnessResult<Result<R, u64>> = ACTIVE.with(|slot| {
        let mut slot = slot.borrow_mut();
        let state = slot.as_mut().ok_or(HarnessError::NoActiveSession)?;
        if state.deadline.expired() && !std::thread::panicking() {
            return Ok(Err(state.deadline.limit_ms()));
        }
        Ok(Ok(f(state)))
    });
    match outcome? {
        Ok(value) => Ok(value),
        Err(ms) => {
            warn!(timeout_ms = ms, "virtual terminal deadline expired");
            panic::resume_unwind(Box::new(DeadlineExpired { ms }))
        }
    }
}

/// Whether a virtual session is active on this thread.
#[must_use]
pub fn is_active() -> bool {
    ACTIVE
        .try_with(|slot| slot.try_borrow().map_or(true, |state| state.is_some()))
        .unwrap_or(false)
}

/// Owns the thread's session slot for the duration of one closure.
#[derive(Debug)]
struct SessionGuard {
    _not_send: PhantomData<*const ()>,
}

impl SessionGuard {
    fn acquire(config: &SessionConfig) -> HarnessResult<Self> {
        ACTIVE.with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.is_some() {
                return Err(HarnessError::SessionReentry);
            }
            let state = SessionState::new(config);
            debug!(
                test = state.label(),
                width = state.width,
                height = state.height,
                timeout_ms = state.deadline.limit_ms(),
                "virtual terminal session started"
            );
            *slot = Some(state);
            Ok(())
        })?;
        Ok(Self {
            _not_send: PhantomData,
        })
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let state = ACTIVE
            .try_with(|slot| slot.try_borrow_mut().ok().and_then(|mut slot| slot.take()))
            .ok()
            .flatten();
        let Some(state) = state else {
            return;
        };
        if state.lifecycle.is_active() {
            debug!(test = state.label(), "application did not restore the terminal");
        }
        debug!(
            test = state.label(),
            draws = state.frames.len(),
            delivered = state.queue.delivered(),
            pending = state.queue.len(),
            elapsed_ms = state.deadline.elapsed_ms(),
            "virtual terminal session ended"
        );
    }
}

/// Run `f` with a virtual terminal installed on this thread.
///
/// The session is torn down before this returns, whether `f` returned,
/// failed, panicked or ran past the deadline. Panics other than deadline
/// expiry are re-raised after teardown.
///
/// # Errors
///
/// [`HarnessError::SessionReentry`] if a session is already active on this
/// thread, [`HarnessError::SessionTimeout`] if the deadline passed, and
/// whatever `f` returns.
pub fn with_virtual_terminal<F, R>(config: SessionConfig, f: F) -> HarnessResult<R>
where
    F: FnOnce(&Session) -> HarnessResult<R>,
{
    let guard = SessionGuard::acquire(&config)?;
    let session = Session::handle();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(&session)));
    drop(guard);

    match outcome {
        Ok(result) => result,
        Err(payload) => match payload.downcast::<DeadlineExpired>() {
            Ok(expired) => Err(HarnessError::SessionTimeout { ms: expired.ms }),
            Err(payload) => panic::resume_unwind(payload),
        },
    }
}

/// Handle to the session active on the current thread.
///
/// Every method goes through the thread's session slot; once the session has
/// ended they fail with [`HarnessError::NoActiveSession`].
#[derive(Debug)]
pub struct Session {
    _not_send: PhantomData<*const ()>,
}

impl Session {
    const fn handle() -> Self {
        Self {
            _not_send: PhantomData,
        }
    }

    /// Handle to the active session, for code that wasn't handed one.
    pub fn current() -> HarnessResult<Self> {
        with_active(|_| Self::handle())
    }

    /// Check the deadline without doing anything else.
    pub fn checkpoint(&self) -> HarnessResult<()> {
        with_active(|_| ())
    }

    // ---- input ----

    /// Append one event or shorthand token.
    pub fn enqueue(&self, input: impl IntoEvent) -> HarnessResult<()> {
        self.checkpoint()?;
        let event = input.into_event()?;
        with_active(|state| state.queue.enqueue(event))?
    }

    /// Append several events in order. Nothing is appended if any token is
    /// invalid.
    pub fn enqueue_all<I>(&self, inputs: I) -> HarnessResult<()>
    where
        I: IntoIterator,
        I::Item: IntoEvent,
    {
        self.checkpoint()?;
        let events = inputs
            .into_iter()
            .map(IntoEvent::into_event)
            .collect::<HarnessResult<Vec<_>>>()?;
        with_active(|state| state.queue.enqueue_all(events))?
    }

    /// Append a left-button press and release at (x, y).
    pub fn click(&self, x: u16, y: u16) -> HarnessResult<()> {
        with_active(|state| state.queue.click(x, y))
    }

    /// Append a press and release of `button` at (x, y).
    pub fn click_with(&self, button: MouseButton, x: u16, y: u16) -> HarnessResult<()> {
        with_active(|state| state.queue.click_with(button, x, y))
    }

    /// Take the next scripted event. Never blocks.
    ///
    /// A polled `Resize` changes the size used by the next draw.
    pub fn poll(&self) -> HarnessResult<Option<Event>> {
        let (event, idle) = with_active(|state| {
            let event = state.queue.poll();
            if let Some(Event::Resize { width, height }) = event {
                state.width = width;
                state.height = height;
            }
            let idle = event.is_none() && state.yield_on_empty_poll;
            (event, idle)
        })?;
        trace!(?event, "virtual poll");
        if idle {
            std::thread::yield_now();
        }
        Ok(event)
    }

    /// Events not yet polled.
    pub fn pending(&self) -> HarnessResult<usize> {
        with_active(|state| state.queue.len())
    }

    // ---- output ----

    /// Render `widget` into a fresh buffer of the session size and make it
    /// the session buffer.
    pub fn draw<W: Widget + ?Sized>(&self, widget: &W) -> HarnessResult<()> {
        let (width, height) = self.size()?;
        let mut buffer = Buffer::new(width, height);
        widget.render(buffer.area(), &mut buffer);
        self.commit(buffer)
    }

    fn commit(&self, buffer: Buffer) -> HarnessResult<()> {
        let index = with_active(|state| state.commit(buffer))?;
        debug!(frame = index, "frame captured");
        Ok(())
    }

    /// Copy of the current buffer.
    pub fn buffer(&self) -> HarnessResult<Buffer> {
        with_active(|state| state.buffer.clone())
    }

    /// Size the next draw will use.
    pub fn size(&self) -> HarnessResult<(u16, u16)> {
        with_active(|state| (state.width, state.height))
    }

    /// Every frame drawn so far, oldest first.
    pub fn frames(&self) -> HarnessResult<Vec<Frame>> {
        with_active(|state| state.frames.clone())
    }

    /// Number of completed draws.
    pub fn frame_count(&self) -> HarnessResult<usize> {
        with_active(|state| state.frames.len())
    }

    /// The most recent frame, or the blank initial screen if nothing has
    /// been drawn.
    pub fn current_frame(&self) -> HarnessResult<Frame> {
        with_active(|state| {
            state
                .frames
                .last()
                .cloned()
                .unwrap_or_else(|| Frame::from_buffer(&state.buffer, 0, 0))
        })
    }

    /// Recorded terminal mode state.
    pub fn lifecycle(&self) -> HarnessResult<Lifecycle> {
        with_active(|state| state.lifecycle)
    }

    /// Snapshot namespace for this session, if it has one.
    pub fn test_name(&self) -> HarnessResult<Option<String>> {
        with_active(|state| state.test_name.clone())
    }

    /// Time since the session started.
    pub fn elapsed(&self) -> HarnessResult<Duration> {
        with_active(|state| state.deadline.started.elapsed())
    }

    // ---- snapshots ----

    /// Compare the plain text of the current buffer with baseline `name`.
    pub fn assert_snapshot(&self, name: &str) -> HarnessResult<SnapshotOutcome> {
        with_active(|state| {
            let test = state.namespace(name)?;
            state.snapshots.assert_text(test, name, &state.buffer)
        })?
    }

    /// Compare the styled runs of the current buffer with baseline `name`.
    pub fn assert_rich_snapshot(&self, name: &str) -> HarnessResult<SnapshotOutcome> {
        with_active(|state| {
            let test = state.namespace(name)?;
            state.snapshots.assert_rich(test, name, &state.buffer)
        })?
    }

    // ---- cell predicates ----

    /// Foreground at (col, row) equals `expected`.
    pub fn assert_fg(
        &self,
        expected: impl Into<PredicateArg>,
        col: impl Into<PredicateArg>,
        row: impl Into<PredicateArg>,
    ) -> HarnessResult<()> {
        with_active(|state| CellAssertions::new(&state.buffer).assert_fg(expected, col, row))?
    }

    /// Background at (col, row) equals `expected`.
    pub fn assert_bg(
        &self,
        expected: impl Into<PredicateArg>,
        col: impl Into<PredicateArg>,
        row: impl Into<PredicateArg>,
    ) -> HarnessResult<()> {
        with_active(|state| CellAssertions::new(&state.buffer).assert_bg(expected, col, row))?
    }

    /// Every flag of `modifier` is set at (col, row).
    pub fn assert_modifier(
        &self,
        modifier: Modifier,
        col: impl Into<PredicateArg>,
        row: impl Into<PredicateArg>,
    ) -> HarnessResult<()> {
        with_active(|state| CellAssertions::new(&state.buffer).assert_modifier(modifier, col, row))?
    }

    /// Glyph at (col, row) equals `expected`.
    pub fn assert_symbol(
        &self,
        expected: &str,
        col: impl Into<PredicateArg>,
        row: impl Into<PredicateArg>,
    ) -> HarnessResult<()> {
        with_active(|state| CellAssertions::new(&state.buffer).assert_symbol(expected, col, row))?
    }

    with_color_table!(color_shortcuts);
    with_modifier_table!(modifier_shortcuts);
}

impl Backend for Session {
    fn init(&mut self) -> HarnessResult<()> {
        with_active(|state| state.lifecycle.record_init())
    }

    fn restore(&mut self) -> HarnessResult<()> {
        with_active(|state| state.lifecycle.record_restore())
    }

    fn size(&self) -> HarnessResult<(u16, u16)> {
        Session::size(self)
    }

    fn poll_event(&mut self, _timeout: Duration) -> HarnessResult<Option<Event>> {
        self.poll()
    }

    fn present(&mut self, buffer: &Buffer) -> HarnessResult<()> {
        self.commit(buffer.clone())
    }
}

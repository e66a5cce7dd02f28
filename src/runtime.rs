use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

/// Monotonic time source. `now` is measured from an arbitrary origin fixed
/// when the clock is created.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Production clock backed by `Instant`
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    /// The terminal changed size and the screen must be drawn again
    Resize,
}

/// Source of single key presses and resize notices
pub trait KeySource {
    /// Block for up to `timeout` waiting for input.
    /// Returns Ok(None) if nothing usable arrived in time.
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>>;
}

/// Set from the SIGINT handler, polled by `InputPoller` between reads.
///
/// Raw mode turns Ctrl+C into a key press only while a read is in progress;
/// a Ctrl+C typed while the screen is being drawn arrives as a signal.
#[derive(Clone, Debug, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// Routes SIGINT into this flag for the rest of the process.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let flag = self.clone();
        ctrlc::set_handler(move || flag.raise())
    }
}

/// Puts the terminal in raw mode for as long as it lives and restores the
/// previous mode when dropped, including during unwinding.
#[derive(Debug)]
pub struct RawModeGuard {
    was_raw: bool,
}

impl RawModeGuard {
    pub fn acquire() -> io::Result<Self> {
        let was_raw = terminal::is_raw_mode_enabled()?;
        if !was_raw {
            terminal::enable_raw_mode()?;
        }
        Ok(Self { was_raw })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if !self.was_raw {
            let _ = terminal::disable_raw_mode();
        }
    }
}

/// Production key source using crossterm. Raw mode is held only for the
/// duration of each read.
#[derive(Debug, Default)]
pub struct CrosstermKeySource;

impl CrosstermKeySource {
    pub fn new() -> Self {
        Self
    }
}

impl KeySource for CrosstermKeySource {
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        let _raw = RawModeGuard::acquire()?;
        if !event::poll(timeout)? {
            return Ok(None);
        }
        Ok(match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(InputEvent::Key(key)),
            Event::Resize(..) => Some(InputEvent::Resize),
            _ => None,
        })
    }
}

#[derive(Clone, Debug)]
pub enum ScriptStep {
    Key(KeyEvent),
    Resize,
    /// No input for this long
    Idle(Duration),
}

/// Test key source that replays a script against a `ManualClock`.
///
/// Waiting advances the shared clock instead of sleeping. Once the script is
/// exhausted every read times out; after an hour of simulated silence reads
/// fail so a test waiting for a key that never comes cannot spin forever.
#[derive(Debug)]
pub struct ScriptedKeySource {
    clock: ManualClock,
    script: VecDeque<ScriptStep>,
    idle_after_end: Duration,
}

const SCRIPT_EXHAUSTED_LIMIT: Duration = Duration::from_secs(3600);

impl ScriptedKeySource {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            script: VecDeque::new(),
            idle_after_end: Duration::ZERO,
        }
    }

    pub fn key(mut self, c: char) -> Self {
        self.script.push_back(ScriptStep::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::NONE,
        )));
        self
    }

    pub fn ctrl_c(mut self) -> Self {
        self.script.push_back(ScriptStep::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        self
    }

    pub fn resize(mut self) -> Self {
        self.script.push_back(ScriptStep::Resize);
        self
    }

    pub fn idle(mut self, d: Duration) -> Self {
        self.script.push_back(ScriptStep::Idle(d));
        self
    }

    pub fn push(&mut self, step: ScriptStep) {
        self.script.push_back(step);
    }

    pub fn is_exhausted(&self) -> bool {
        self.script.is_empty()
    }
}

impl KeySource for ScriptedKeySource {
    fn next_event(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        match self.script.pop_front() {
            Some(ScriptStep::Key(key)) => Ok(Some(InputEvent::Key(key))),
            Some(ScriptStep::Resize) => Ok(Some(InputEvent::Resize)),
            Some(ScriptStep::Idle(d)) if d <= timeout => {
                self.clock.advance(d);
                Ok(None)
            }
            Some(ScriptStep::Idle(d)) => {
                self.clock.advance(timeout);
                self.script.push_front(ScriptStep::Idle(d - timeout));
                Ok(None)
            }
            None => {
                self.idle_after_end += timeout;
                if self.idle_after_end > SCRIPT_EXHAUSTED_LIMIT {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "key script exhausted",
                    ));
                }
                self.clock.advance(timeout);
                Ok(None)
            }
        }
    }
}

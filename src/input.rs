use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::display::Redraw;
use crate::error::{AppError, AppResult};
use crate::runtime::{Clock, InputEvent, InterruptFlag, KeySource};
use crate::scoring::Response;

/// Commands handled outside the trial without stopping its clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideCommand {
    Help,
    Scores,
}

/// Meaning of a key press during a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    Claim(Response),
    Side(SideCommand),
    Quit,
    Interrupt,
}

impl KeyCommand {
    /// Maps a key press to a command, case-insensitively. Unknown keys are None.
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        let KeyCode::Char(c) = key.code else {
            return None;
        };
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return c.eq_ignore_ascii_case(&'c').then_some(KeyCommand::Interrupt);
        }
        match c.to_ascii_lowercase() {
            'l' => Some(KeyCommand::Claim(Response::Location)),
            'a' => Some(KeyCommand::Claim(Response::Color)),
            ' ' => Some(KeyCommand::Claim(Response::Both)),
            'h' => Some(KeyCommand::Side(SideCommand::Help)),
            's' => Some(KeyCommand::Side(SideCommand::Scores)),
            'q' => Some(KeyCommand::Quit),
            _ => None,
        }
    }
}

/// Result of one `poll_with_deadline` call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// A claim key was pressed in time
    Response(Response),
    /// The caller should handle the command, redraw, and poll again with
    /// the same deadline
    Side(SideCommand),
    Quit,
    Timeout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoldOutcome {
    Elapsed,
    Quit,
}

/// Cooperative, deadline-bounded keyboard polling.
///
/// Every wait is a loop of short reads of at most `granularity`, so quit and
/// interrupt keys are observed at regular check points. A resize between
/// reads redraws `screen` and the wait carries on.
pub struct InputPoller<S: KeySource, C: Clock> {
    source: S,
    clock: C,
    granularity: Duration,
    interrupt: InterruptFlag,
}

impl<S: KeySource, C: Clock> InputPoller<S, C> {
    pub fn new(source: S, clock: C, granularity: Duration) -> Self {
        Self {
            source,
            clock,
            granularity,
            interrupt: InterruptFlag::new(),
        }
    }

    /// Also end every wait with `Interrupted` once `flag` is raised.
    pub fn with_interrupt(mut self, flag: InterruptFlag) -> Self {
        self.interrupt = flag;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn granularity(&self) -> Duration {
        self.granularity
    }

    pub fn set_granularity(&mut self, granularity: Duration) {
        self.granularity = granularity;
    }

    /// Deadline `window` from now, on this poller's clock.
    pub fn deadline_in(&self, window: Duration) -> Duration {
        self.clock.now() + window
    }

    fn slice_until(&self, deadline: Duration) -> Option<Duration> {
        let now = self.clock.now();
        if now >= deadline {
            return None;
        }
        Some((deadline - now).min(self.granularity))
    }

    /// One read of at most `timeout`. Resizes are handled here and read as
    /// nothing arriving.
    fn read<D: Redraw + ?Sized>(
        &mut self,
        timeout: Duration,
        screen: &mut D,
    ) -> AppResult<Option<KeyEvent>> {
        if self.interrupt.is_raised() {
            return Err(AppError::Interrupted);
        }
        let event = self.source.next_event(timeout)?;
        if self.interrupt.is_raised() {
            return Err(AppError::Interrupted);
        }
        match event {
            Some(InputEvent::Key(key)) => Ok(Some(key)),
            Some(InputEvent::Resize) => {
                debug!("terminal resized");
                screen.redraw()?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Waits for a recognised key until `deadline`.
    ///
    /// Time spent by the caller on a side command is not given back: a
    /// second call with the same deadline only gets what is left.
    pub fn poll_with_deadline<D: Redraw + ?Sized>(
        &mut self,
        deadline: Duration,
        screen: &mut D,
    ) -> AppResult<PollOutcome> {
        while let Some(slice) = self.slice_until(deadline) {
            let Some(key) = self.read(slice, screen)? else {
                continue;
            };
            match KeyCommand::from_key(&key) {
                Some(KeyCommand::Claim(response)) => return Ok(PollOutcome::Response(response)),
                Some(KeyCommand::Side(cmd)) => return Ok(PollOutcome::Side(cmd)),
                Some(KeyCommand::Quit) => return Ok(PollOutcome::Quit),
                Some(KeyCommand::Interrupt) => return Err(AppError::Interrupted),
                None => {}
            }
        }
        Ok(PollOutcome::Timeout)
    }

    /// Keeps the current screen up for `duration`, discarding keys other
    /// than quit.
    pub fn hold<D: Redraw + ?Sized>(
        &mut self,
        duration: Duration,
        screen: &mut D,
    ) -> AppResult<HoldOutcome> {
        let deadline = self.deadline_in(duration);
        while let Some(slice) = self.slice_until(deadline) {
            if let Some(key) = self.read(slice, screen)? {
                match KeyCommand::from_key(&key) {
                    Some(KeyCommand::Quit) => return Ok(HoldOutcome::Quit),
                    Some(KeyCommand::Interrupt) => return Err(AppError::Interrupted),
                    _ => {}
                }
            }
        }
        Ok(HoldOutcome::Elapsed)
    }

    /// Blocks until any key is pressed and returns it lowercased.
    pub fn wait_for_key<D: Redraw + ?Sized>(&mut self, screen: &mut D) -> AppResult<KeyEvent> {
        loop {
            if let Some(key) = self.read(self.granularity, screen)? {
                if KeyCommand::from_key(&key) == Some(KeyCommand::Interrupt) {
                    return Err(AppError::Interrupted);
                }
                let code = match key.code {
                    KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
                    other => other,
                };
                return Ok(KeyEvent::new(code, key.modifiers));
            }
        }
    }

    /// Waits for a plain character key, skipping anything else.
    pub fn wait_for_char<D: Redraw + ?Sized>(&mut self, screen: &mut D) -> AppResult<char> {
        loop {
            if let KeyCode::Char(c) = self.wait_for_key(screen)?.code {
                return Ok(c);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ManualClock, ScriptedKeySource};
    use assert_matches::assert_matches;

    const TICK: Duration = Duration::from_millis(100);

    /// Counts redraw requests.
    #[derive(Default)]
    struct Screen {
        redraws: usize,
    }

    impl Redraw for Screen {
        fn redraw(&mut self) -> std::io::Result<()> {
            self.redraws += 1;
            Ok(())
        }
    }

    fn poller(source: ScriptedKeySource, clock: ManualClock) -> InputPoller<ScriptedKeySource, ManualClock> {
        InputPoller::new(source, clock, TICK)
    }

    #[test]
    fn key_mapping_is_case_insensitive() {
        let upper = KeyEvent::new(KeyCode::Char('L'), KeyModifiers::SHIFT);
        assert_eq!(
            KeyCommand::from_key(&upper),
            Some(KeyCommand::Claim(Response::Location))
        );
        let upper_a = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(
            KeyCommand::from_key(&upper_a),
            Some(KeyCommand::Claim(Response::Color))
        );
        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(
            KeyCommand::from_key(&space),
            Some(KeyCommand::Claim(Response::Both))
        );
        let quit = KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT);
        assert_eq!(KeyCommand::from_key(&quit), Some(KeyCommand::Quit));
    }

    #[test]
    fn ctrl_c_is_interrupt_and_other_keys_unknown() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(KeyCommand::from_key(&ctrl_c), Some(KeyCommand::Interrupt));
        let ctrl_l = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL);
        assert_eq!(KeyCommand::from_key(&ctrl_l), None);
        let x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(KeyCommand::from_key(&x), None);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(KeyCommand::from_key(&enter), None);
    }

    #[test]
    fn times_out_at_deadline() {
        let clock = ManualClock::new();
        let mut p = poller(ScriptedKeySource::new(clock.clone()), clock.clone());
        let deadline = p.deadline_in(Duration::from_secs(2));
        assert_eq!(
            p.poll_with_deadline(deadline, &mut Screen::default()).unwrap(),
            PollOutcome::Timeout
        );
        assert_eq!(clock.now(), Duration::from_secs(2));
    }

    #[test]
    fn returns_first_claim() {
        let clock = ManualClock::new();
        let source = ScriptedKeySource::new(clock.clone())
            .idle(Duration::from_millis(350))
            .key('x')
            .key(' ');
        let mut p = poller(source, clock.clone());
        let deadline = p.deadline_in(Duration::from_secs(2));
        assert_eq!(
            p.poll_with_deadline(deadline, &mut Screen::default()).unwrap(),
            PollOutcome::Response(Response::Both)
        );
        assert_eq!(clock.now(), Duration::from_millis(350));
    }

    #[test]
    fn late_key_is_not_seen() {
        let clock = ManualClock::new();
        let source = ScriptedKeySource::new(clock.clone())
            .idle(Duration::from_millis(1200))
            .key('l');
        let mut p = poller(source, clock.clone());
        let deadline = p.deadline_in(Duration::from_secs(1));
        assert_eq!(
            p.poll_with_deadline(deadline, &mut Screen::default()).unwrap(),
            PollOutcome::Timeout
        );
    }

    #[test]
    fn side_command_does_not_extend_deadline() {
        let clock = ManualClock::new();
        let source = ScriptedKeySource::new(clock.clone())
            .idle(Duration::from_millis(500))
            .key('h');
        let mut p = poller(source, clock.clone());
        let deadline = p.deadline_in(Duration::from_secs(1));

        assert_eq!(
            p.poll_with_deadline(deadline, &mut Screen::default()).unwrap(),
            PollOutcome::Side(SideCommand::Help)
        );
        // the help screen keeps the player busy past the deadline
        clock.advance(Duration::from_secs(3));
        assert_eq!(
            p.poll_with_deadline(deadline, &mut Screen::default()).unwrap(),
            PollOutcome::Timeout
        );
        assert_eq!(clock.now(), Duration::from_millis(3500));
    }

    #[test]
    fn quit_and_interrupt() {
        let clock = ManualClock::new();
        let source = ScriptedKeySource::new(clock.clone()).key('q').ctrl_c();
        let mut p = poller(source, clock.clone());
        let deadline = p.deadline_in(Duration::from_secs(1));
        let mut screen = Screen::default();
        assert_eq!(
            p.poll_with_deadline(deadline, &mut screen).unwrap(),
            PollOutcome::Quit
        );
        assert_matches!(
            p.poll_with_deadline(deadline, &mut screen),
            Err(AppError::Interrupted)
        );
    }

    #[test]
    fn hold_swallows_keys_but_honours_quit() {
        let clock = ManualClock::new();
        let source = ScriptedKeySource::new(clock.clone())
            .key('l')
            .key('a')
            .idle(Duration::from_millis(300))
            .key('q');
        let mut p = poller(source, clock.clone());
        assert_eq!(
            p.hold(Duration::from_secs(1), &mut Screen::default()).unwrap(),
            HoldOutcome::Quit
        );
        assert_eq!(clock.now(), Duration::from_millis(300));
    }

    #[test]
    fn hold_elapses() {
        let clock = ManualClock::new();
        let mut p = poller(ScriptedKeySource::new(clock.clone()).key('s'), clock.clone());
        assert_eq!(
            p.hold(Duration::from_millis(600), &mut Screen::default()).unwrap(),
            HoldOutcome::Elapsed
        );
        assert_eq!(clock.now(), Duration::from_millis(600));
    }

    #[test]
    fn wait_for_char_lowercases_and_skips_non_chars() {
        let clock = ManualClock::new();
        let mut source = ScriptedKeySource::new(clock.clone()).idle(Duration::from_secs(5));
        source.push(crate::runtime::ScriptStep::Key(KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::NONE,
        )));
        let source = source.key('X');
        let mut p = poller(source, clock);
        assert_eq!(p.wait_for_char(&mut Screen::default()).unwrap(), 'x');
    }

    #[test]
    fn resize_redraws_and_keeps_waiting() {
        let clock = ManualClock::new();
        let source = ScriptedKeySource::new(clock.clone())
            .idle(Duration::from_millis(200))
            .resize()
            .resize()
            .key('a');
        let mut p = poller(source, clock.clone());
        let mut screen = Screen::default();
        let deadline = p.deadline_in(Duration::from_secs(1));
        assert_eq!(
            p.poll_with_deadline(deadline, &mut screen).unwrap(),
            PollOutcome::Response(Response::Color)
        );
        assert_eq!(screen.redraws, 2);

        let source = ScriptedKeySource::new(clock.clone()).resize().key('k');
        let mut p = poller(source, clock);
        assert_eq!(p.wait_for_char(&mut screen).unwrap(), 'k');
        assert_eq!(screen.redraws, 3);
    }

    #[test]
    fn raised_interrupt_ends_every_wait() {
        let clock = ManualClock::new();
        let flag = InterruptFlag::new();
        let source = ScriptedKeySource::new(clock.clone()).key('l').key('l');
        let mut p = poller(source, clock.clone()).with_interrupt(flag.clone());
        let mut screen = Screen::default();
        let deadline = p.deadline_in(Duration::from_secs(1));
        assert_eq!(
            p.poll_with_deadline(deadline, &mut screen).unwrap(),
            PollOutcome::Response(Response::Location)
        );

        flag.raise();
        assert_matches!(
            p.poll_with_deadline(deadline, &mut screen),
            Err(AppError::Interrupted)
        );
        assert_matches!(
            p.hold(Duration::from_secs(1), &mut screen),
            Err(AppError::Interrupted)
        );
        assert_matches!(p.wait_for_key(&mut screen), Err(AppError::Interrupted));
        // the pending key is left unread
        assert!(!p.source().is_exhausted());
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn interrupt_raised_while_redrawing_is_seen_before_the_next_key() {
        struct RaiseOnRedraw(InterruptFlag);

        impl Redraw for RaiseOnRedraw {
            fn redraw(&mut self) -> std::io::Result<()> {
                self.0.raise();
                Ok(())
            }
        }

        let clock = ManualClock::new();
        let flag = InterruptFlag::new();
        let source = ScriptedKeySource::new(clock.clone()).resize().key('x');
        let mut p = poller(source, clock).with_interrupt(flag.clone());
        let mut screen = RaiseOnRedraw(flag);
        assert_matches!(p.wait_for_key(&mut screen), Err(AppError::Interrupted));
        assert!(!p.source().is_exhausted());
    }
}

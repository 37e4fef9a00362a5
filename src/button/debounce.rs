//! Pure debounce and gesture state machine.
//!
//! The machine is fed raw level samples (typically one per pin edge)
//! plus periodic polls, and emits at most one event per call.  It owns
//! no timer; callers ask [`next_deadline`](Debouncer::next_deadline)
//! when the machine next needs to be polled.

use crate::time::Instant;

use super::{ButtonConfig, ButtonEvent, ButtonState, Level};

#[derive(Debug, Clone, Copy)]
struct Candidate {
    level: Level,
    since: Instant,
}

pub struct Debouncer {
    cfg: ButtonConfig,
    committed: ButtonState,
    committed_at: Instant,
    /// Raw level waiting out the debounce window, if any.
    candidate: Option<Candidate>,
    /// Completed short presses not yet finalized into a `Clicked` event.
    clicks: u8,
    click_deadline: Option<Instant>,
    /// Event produced alongside another; drained by the next poll.
    pending: Option<ButtonEvent>,
}

impl Debouncer {
    pub fn new(cfg: ButtonConfig) -> Self {
        Debouncer {
            cfg,
            committed: ButtonState::Released,
            committed_at: Instant::from_millis(0),
            candidate: None,
            clicks: 0,
            click_deadline: None,
            pending: None,
        }
    }

    pub fn state(&self) -> ButtonState {
        self.committed
    }

    fn committed_level(&self) -> Level {
        match self.committed {
            ButtonState::Released => self.cfg.active_level.inverse(),
            ButtonState::Pressed | ButtonState::Holding => self.cfg.active_level,
        }
    }

    /// Feeds one raw sample taken at `at`.
    ///
    /// Any raw change restarts the debounce window, so a bounce shorter
    /// than the window never commits.  Returns an event if one became due
    /// at `at`.
    pub fn sample(&mut self, level: Level, at: Instant) -> Option<ButtonEvent> {
        let due = self.poll(at);
        if at < self.committed_at {
            // Stale sample from before the last commit.
            return due;
        }
        if level == self.committed_level() {
            self.candidate = None;
        } else {
            self.candidate = Some(Candidate { level, since: at });
        }
        due
    }

    /// Advances time-driven transitions. Returns at most one event;
    /// call repeatedly until `None` to drain.
    pub fn poll(&mut self, now: Instant) -> Option<ButtonEvent> {
        if let Some(event) = self.pending.take() {
            return Some(event);
        }
        if let Some(candidate) = self.candidate {
            let commit_at = candidate.since + self.cfg.debounce_window;
            if now >= commit_at {
                return Some(self.commit(candidate.level, commit_at));
            }
        }
        if self.committed == ButtonState::Pressed {
            let hold_at = self.committed_at + self.cfg.hold_threshold;
            if now >= hold_at {
                self.committed = ButtonState::Holding;
                self.committed_at = hold_at;
                // A press that matured into a hold never counts as a
                // click; earlier short presses finalize now.
                if let Some(clicked) = self.take_clicks() {
                    self.pending = Some(ButtonEvent::Holding);
                    return Some(clicked);
                }
                return Some(ButtonEvent::Holding);
            }
        }
        if let Some(deadline) = self.click_deadline {
            if now >= deadline {
                return self.take_clicks();
            }
        }
        None
    }

    /// When the machine next has time-driven work, if ever.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.pending.is_some() {
            return Some(Instant::from_millis(0));
        }
        let mut deadline: Option<Instant> = None;
        let mut consider = |d: Instant| {
            deadline = Some(match deadline {
                Some(current) => core::cmp::min(current, d),
                None => d,
            });
        };
        if let Some(candidate) = self.candidate {
            consider(candidate.since + self.cfg.debounce_window);
        }
        if self.committed == ButtonState::Pressed {
            consider(self.committed_at + self.cfg.hold_threshold);
        }
        if let Some(click_deadline) = self.click_deadline {
            consider(click_deadline);
        }
        deadline
    }

    fn commit(&mut self, level: Level, at: Instant) -> ButtonEvent {
        self.candidate = None;
        let previous = self.committed;
        self.committed_at = at;
        if level == self.cfg.active_level {
            self.committed = ButtonState::Pressed;
            // The quiet window only runs while released; a follow-up
            // press keeps the click sequence open.
            self.click_deadline = None;
            ButtonEvent::Pressed
        } else {
            self.committed = ButtonState::Released;
            if previous == ButtonState::Pressed {
                self.clicks = self.clicks.saturating_add(1);
                self.click_deadline = Some(at + self.cfg.click_window);
            }
            ButtonEvent::Released
        }
    }

    fn take_clicks(&mut self) -> Option<ButtonEvent> {
        self.click_deadline = None;
        let count = core::mem::take(&mut self.clicks);
        if count > 0 {
            Some(ButtonEvent::Clicked { count })
        } else {
            None
        }
    }
}

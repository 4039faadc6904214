//! Countdown that limits the length of a recording session.
//!
//! The countdown itself does no scheduling. The host fires `tick` once per
//! [`TICK_INTERVAL_MS`] and acts on the returned [`Tick`].

use crate::widget::SessionId;

pub const TICK_INTERVAL_MS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still running, with this many whole seconds left
    Running { remaining: u32 },
    /// Elapsed time went past the limit; the session must stop now
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    session: SessionId,
    max_secs: u32,
    elapsed: u32,
}

impl Countdown {
    /// Returns `None` when `max_secs` is 0 (no limit).
    pub fn start(session: SessionId, max_secs: u32) -> Option<Self> {
        if max_secs == 0 {
            return None;
        }
        Some(Self {
            session,
            max_secs,
            elapsed: 0,
        })
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn max_secs(&self) -> u32 {
        self.max_secs
    }

    pub fn tick(&mut self) -> Tick {
        self.elapsed += 1;
        if self.elapsed > self.max_secs {
            Tick::Expired
        } else {
            Tick::Running {
                remaining: self.max_secs - self.elapsed,
            }
        }
    }
}

/// What the timer label shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerLabel {
    /// Idle, showing the configured limit
    MaxTime(u32),
    Remaining(u32),
    Complete,
}

impl TimerLabel {
    pub fn text(&self) -> String {
        match self {
            TimerLabel::MaxTime(max) => format!("Max Time: {} seconds", max),
            TimerLabel::Remaining(left) => format!("Time left: {} seconds", left),
            TimerLabel::Complete => "Recording complete!".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_countdown_without_limit() {
        assert!(Countdown::start(SessionId(1), 0).is_none());
    }

    #[test]
    fn test_expires_after_max_plus_one_ticks() {
        for max in [1u32, 3, 10, 60] {
            let mut countdown = Countdown::start(SessionId(1), max).unwrap();
            let mut ticks = 0;
            loop {
                ticks += 1;
                if countdown.tick() == Tick::Expired {
                    break;
                }
            }
            assert_eq!(ticks, max + 1);
            assert_eq!(countdown.elapsed(), max + 1);
        }
    }

    #[test]
    fn test_remaining_counts_down() {
        let mut countdown = Countdown::start(SessionId(4), 3).unwrap();
        assert_eq!(countdown.tick(), Tick::Running { remaining: 2 });
        assert_eq!(countdown.tick(), Tick::Running { remaining: 1 });
        assert_eq!(countdown.tick(), Tick::Running { remaining: 0 });
        assert_eq!(countdown.tick(), Tick::Expired);
        assert_eq!(countdown.session(), SessionId(4));
    }

    #[test]
    fn test_label_text() {
        assert_eq!(TimerLabel::MaxTime(30).text(), "Max Time: 30 seconds");
        assert_eq!(TimerLabel::Remaining(5).text(), "Time left: 5 seconds");
        assert_eq!(TimerLabel::Complete.text(), "Recording complete!");
    }
}

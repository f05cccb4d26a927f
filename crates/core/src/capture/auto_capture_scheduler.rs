use std::time::{Duration, Instant};

/// Identifies one arming of the scheduler. A token is only honoured while it
/// is the current one; cancelling or re-arming invalidates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Armed { deadline: Instant, token: TimerToken },
}

/// Owns the single auto-capture timer of a session.
///
/// The deadline is set on the first valid sample of a streak and is not
/// pushed back by later valid samples: the delay is a confirmation window
/// measured from the start of the streak.
#[derive(Debug)]
pub struct AutoCaptureScheduler {
    delay: Duration,
    state: SchedulerState,
    next_token: u64,
}

impl AutoCaptureScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: SchedulerState::Idle,
            next_token: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, SchedulerState::Armed { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SchedulerState::Armed { deadline, .. } => Some(deadline),
            SchedulerState::Idle => None,
        }
    }

    /// Arms a timer for `deadline`, cancelling any timer already armed.
    pub fn arm(&mut self, deadline: Instant) -> TimerToken {
        self.cancel();
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.state = SchedulerState::Armed { deadline, token };
        log::debug!(
            "Auto-capture armed, fires in {:?}",
            deadline.saturating_duration_since(Instant::now())
        );
        token
    }

    /// Returns `true` if a timer was armed.
    pub fn cancel(&mut self) -> bool {
        let was_armed = self.is_armed();
        self.state = SchedulerState::Idle;
        if was_armed {
            log::debug!("Auto-capture cancelled");
        }
        was_armed
    }

    /// Feeds one sampling cycle into the scheduler.
    ///
    /// A valid, uncommitted sample arms the timer if idle and leaves an
    /// armed deadline alone. Anything else cancels. Returns the token when
    /// this call armed a new timer.
    pub fn observe(&mut self, valid: bool, committed: bool, now: Instant) -> Option<TimerToken> {
        if !valid || committed {
            self.cancel();
            return None;
        }
        if self.is_armed() {
            return None;
        }
        Some(self.arm(now + self.delay))
    }

    /// Takes the armed token if its deadline has passed, returning to idle.
    pub fn take_due(&mut self, now: Instant) -> Option<TimerToken> {
        match self.state {
            SchedulerState::Armed { deadline, token } if now >= deadline => {
                self.state = SchedulerState::Idle;
                Some(token)
            }
            _ => None,
        }
    }

    /// Fires the timer identified by `token` if it is still the armed one
    /// and its deadline has passed. A cancelled or replaced token never fires.
    pub fn fire(&mut self, token: TimerToken, now: Instant) -> bool {
        if !self.is_current(token) {
            log::debug!("Ignoring stale auto-capture timer {token:?}");
            return false;
        }
        self.take_due(now).is_some()
    }

    pub fn is_current(&self, token: TimerToken) -> bool {
        matches!(self.state, SchedulerState::Armed { token: t, .. } if t == token)
    }
}

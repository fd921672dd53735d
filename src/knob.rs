use crate::classify::KnobInput;
use std::time::{Duration, Instant};

/// High-level action produced by the state machine. Transient: produced and
/// consumed within one control-loop iteration, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnobAction {
    RotateClockwise,
    RotateCounterClockwise,
    Click,
    LongPress,
}

#[derive(Debug, Clone, Copy)]
enum PressState {
    Idle,
    Pressed { since: Instant },
}

/// Tracks the knob button through press/release/long-press timing.
///
/// `since` is a monotonic timestamp taken at classification time; hardware
/// event timestamps are not used for deadline arithmetic, so a wall-clock
/// adjustment during a held press cannot corrupt the deadline.
pub struct KnobStateMachine {
    press: PressState,
    long_press_after: Duration,
    long_press_armed: bool,
}

impl KnobStateMachine {
    /// `long_press_armed = false` disables the timeout path entirely: the
    /// button then only ever produces `Click` on release.
    pub fn new(long_press_after: Duration, long_press_armed: bool) -> Self {
        Self {
            press: PressState::Idle,
            long_press_after,
            long_press_armed,
        }
    }

    /// Feed one classified input, stamped with the monotonic time it was
    /// read. Rotation passes straight through regardless of press state.
    pub fn handle(&mut self, input: KnobInput, now: Instant) -> Option<KnobAction> {
        match input {
            KnobInput::RotateClockwise => Some(KnobAction::RotateClockwise),
            KnobInput::RotateCounterClockwise => Some(KnobAction::RotateCounterClockwise),
            KnobInput::Press => {
                // A duplicate press edge restarts the hold timer.
                self.press = PressState::Pressed { since: now };
                None
            }
            KnobInput::Release => match self.press {
                PressState::Pressed { .. } => {
                    self.press = PressState::Idle;
                    Some(KnobAction::Click)
                }
                // Release with no press in flight: the long press already
                // consumed this hold, or the press edge was never seen.
                PressState::Idle => None,
            },
        }
    }

    /// Remaining time until the long-press deadline, clamped at zero.
    /// `None` when no timeout is armed and the wait should block forever.
    pub fn timeout(&self, now: Instant) -> Option<Duration> {
        match self.press {
            PressState::Pressed { since } if self.long_press_armed => {
                Some(self.long_press_after.saturating_sub(now.duration_since(since)))
            }
            _ => None,
        }
    }

    /// Fire the long press if the hold has reached the threshold. Checked on
    /// every wake-up, before the read, so expiry coinciding with pending
    /// input still fires exactly once.
    pub fn poll_deadline(&mut self, now: Instant) -> Option<KnobAction> {
        match self.press {
            PressState::Pressed { since }
                if self.long_press_armed && now.duration_since(since) >= self.long_press_after =>
            {
                self.press = PressState::Idle;
                Some(KnobAction::LongPress)
            }
            _ => None,
        }
    }
}

/// Brightness written whenever the LED is refreshed: mid-range of the
/// PowerMate's 0-255 LED scale. The kernel driver resets the LED to its own
/// default on connect, so every (re)connection writes this through
/// [`OverlayState::effective_value`].
pub const DEFAULT_BRIGHTNESS: i32 = 128;

/// Process-wide overlay flags composited over the requested LED brightness.
///
/// `movie_mode` is toggled by a long press when no long-press command is
/// configured. `muted` is not mutated by the control loop itself; it is kept
/// settable so an external integration can force the LED dark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayState {
    pub muted: bool,
    pub movie_mode: bool,
}

impl OverlayState {
    /// Composite the overlay over a requested brightness. Either flag forces
    /// the LED off; otherwise the request passes through unchanged.
    pub fn effective_value(&self, requested: i32) -> i32 {
        if self.muted || self.movie_mode {
            0
        } else {
            requested
        }
    }
}

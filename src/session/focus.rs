use std::time::Duration;

pub const IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Detects a learner whose key presses are no longer reaching us: no key
/// for the idle timeout while the terminal reports it lost focus.
#[derive(Clone, Debug)]
pub struct FocusMonitor {
    timeout: Duration,
    last_key_at: Duration,
    has_focus: bool,
    needs_refocus: bool,
}

impl FocusMonitor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            last_key_at: Duration::ZERO,
            has_focus: true,
            needs_refocus: false,
        }
    }

    pub fn needs_refocus(&self) -> bool {
        self.needs_refocus
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn key_pressed(&mut self, now: Duration) {
        self.last_key_at = now;
        self.needs_refocus = false;
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.has_focus = focused;
    }

    /// Explicit click on the refocus banner.
    pub fn acknowledge(&mut self) {
        self.has_focus = true;
        self.needs_refocus = false;
    }

    /// Periodic check; `active` is false while nothing expects typing
    /// (summary, home screen).
    pub fn check(&mut self, now: Duration, active: bool) {
        if !active || self.has_focus {
            return;
        }
        if now.saturating_sub(self.last_key_at) > self.timeout {
            self.needs_refocus = true;
        }
    }
}

impl Default for FocusMonitor {
    fn default() -> Self {
        Self::new(IDLE_TIMEOUT)
    }
}

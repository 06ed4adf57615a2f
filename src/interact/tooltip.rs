use crate::graph::ElementKey;

pub const DEFAULT_HIDE_DELAY: f64 = 0.30;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum TimerState {
    #[default]
    Idle,
    /// Armed, deadline not resolved yet: it becomes `now + delay` on the next
    /// poll, because arming happens in event handlers that carry no clock.
    Pending,
    Armed(f64),
}

/// One-shot cancellable countdown, polled with host frame times.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DebounceTimer {
    state: TimerState,
}

impl DebounceTimer {
    /// Starts the countdown. Arming an already armed timer does not extend
    /// its deadline; the first arm wins until it fires or is cancelled.
    pub fn arm(&mut self) {
        if self.state == TimerState::Idle {
            self.state = TimerState::Pending;
        }
    }

    pub fn cancel(&mut self) {
        self.state = TimerState::Idle;
    }

    pub fn is_armed(&self) -> bool {
        self.state != TimerState::Idle
    }

    /// True exactly once, on the first poll at or past the deadline.
    pub fn poll(&mut self, now: f64, delay: f64) -> bool {
        match self.state {
            TimerState::Idle => false,
            TimerState::Pending => {
                if delay <= 0.0 {
                    self.state = TimerState::Idle;
                    true
                } else {
                    self.state = TimerState::Armed(now + delay);
                    false
                }
            }
            TimerState::Armed(deadline) => {
                if now >= deadline {
                    self.state = TimerState::Idle;
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Tracks what the tooltip shows and where, and debounces its dismissal so a
/// pointer skipping between elements never flashes an empty frame.
pub struct TooltipCoordinator {
    visible: bool,
    position: (f64, f64),
    payload: Option<ElementKey>,
    timer: DebounceTimer,
    hide_delay: f64,
}

impl TooltipCoordinator {
    pub fn new(hide_delay: f64) -> Self {
        Self {
            visible: false,
            position: (0.0, 0.0),
            payload: None,
            timer: DebounceTimer::default(),
            hide_delay,
        }
    }

    /// Pointer is over `key`: show it at `position`, replacing any previous
    /// payload and cancelling a pending dismissal.
    pub fn show(&mut self, key: ElementKey, position: (f64, f64)) {
        self.timer.cancel();
        self.visible = true;
        self.position = position;
        self.payload = Some(key);
    }

    /// Pointer left the hovered element: keep showing, hide after the delay.
    pub fn schedule_hide(&mut self) {
        if self.visible {
            self.timer.arm();
        }
    }

    /// Immediate dismissal, for teardown and graph swaps.
    pub fn hide(&mut self) {
        self.timer.cancel();
        self.visible = false;
        self.payload = None;
    }

    /// Advances the dismissal timer. Returns true while a hide is pending.
    pub fn tick(&mut self, now: f64) -> bool {
        if self.timer.poll(now, self.hide_delay) {
            self.visible = false;
            self.payload = None;
        }
        self.timer.is_armed()
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    pub fn payload(&self) -> Option<&ElementKey> {
        self.payload.as_ref()
    }
}

impl Default for TooltipCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_HIDE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_fires_once_after_the_delay() {
        let mut timer = DebounceTimer::default();
        assert!(!timer.poll(0.0, 0.3));

        timer.arm();
        assert!(timer.is_armed());
        assert!(!timer.poll(0.0, 0.3)); // deadline resolves to 0.3
        assert!(!timer.poll(0.29, 0.3));
        assert!(timer.poll(0.3, 0.3));
        assert!(!timer.is_armed());
        assert!(!timer.poll(10.0, 0.3));
    }

    #[test]
    fn timer_arm_does_not_slide() {
        let mut timer = DebounceTimer::default();
        timer.arm();
        timer.poll(0.0, 0.3);
        timer.arm(); // a later re-arm must not push the deadline out
        assert!(!timer.poll(0.2, 0.3));
        assert!(timer.poll(0.3, 0.3));
    }

    #[test]
    fn timer_cancel_disarms() {
        let mut timer = DebounceTimer::default();
        timer.arm();
        timer.poll(0.0, 0.3);
        timer.cancel();
        assert!(!timer.is_armed());
        assert!(!timer.poll(1.0, 0.3));
    }

    #[test]
    fn zero_delay_fires_on_the_first_poll() {
        let mut timer = DebounceTimer::default();
        timer.arm();
        assert!(timer.poll(5.0, 0.0));
    }

    #[test]
    fn show_then_leave_hides_after_the_delay() {
        let mut tooltip = TooltipCoordinator::default();
        tooltip.show(ElementKey::node("a"), (40.0, 25.0));
        assert!(tooltip.visible());
        assert_eq!(tooltip.position(), (40.0, 25.0));
        assert_eq!(tooltip.payload(), Some(&ElementKey::node("a")));

        tooltip.schedule_hide();
        assert!(tooltip.tick(0.0));
        assert!(tooltip.visible());
        assert!(tooltip.tick(0.29));
        assert!(tooltip.visible());
        assert!(!tooltip.tick(0.3));
        assert!(!tooltip.visible());
        assert_eq!(tooltip.payload(), None);
    }

    #[test]
    fn reentry_cancels_the_pending_hide() {
        let mut tooltip = TooltipCoordinator::default();
        tooltip.show(ElementKey::node("a"), (0.0, 0.0));
        tooltip.schedule_hide();
        tooltip.tick(0.0);

        tooltip.show(ElementKey::node("b"), (10.0, 10.0));
        assert!(tooltip.visible());
        assert!(!tooltip.tick(0.35));
        // never hid in between, and the payload moved straight to b
        assert!(tooltip.visible());
        assert_eq!(tooltip.payload(), Some(&ElementKey::node("b")));
    }

    #[test]
    fn repeated_leave_reports_do_not_postpone_the_hide() {
        let mut tooltip = TooltipCoordinator::default();
        tooltip.show(ElementKey::node("a"), (0.0, 0.0));
        tooltip.schedule_hide();
        tooltip.tick(0.0);
        tooltip.schedule_hide();
        tooltip.tick(0.2);
        tooltip.schedule_hide();
        assert!(!tooltip.tick(0.3));
        assert!(!tooltip.visible());
    }

    #[test]
    fn schedule_hide_without_a_tooltip_is_inert() {
        let mut tooltip = TooltipCoordinator::default();
        tooltip.schedule_hide();
        assert!(!tooltip.tick(0.0));
        assert!(!tooltip.visible());
    }

    #[test]
    fn hard_hide_cancels_the_timer() {
        let mut tooltip = TooltipCoordinator::default();
        tooltip.show(ElementKey::node("a"), (0.0, 0.0));
        tooltip.schedule_hide();
        tooltip.tick(0.0);
        tooltip.hide();
        assert!(!tooltip.visible());
        assert_eq!(tooltip.payload(), None);
        assert!(!tooltip.tick(1.0));
    }
}

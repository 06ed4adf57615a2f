use std::collections::HashMap;

use crate::graph::ElementKey;

pub const DEFAULT_DURATION: f64 = 0.30;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    Linear,
    CubicOut,
    #[default]
    CubicInOut,
}

impl Easing {
    fn apply(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::CubicOut => {
                let u = 1.0 - t;
                1.0 - u * u * u
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Tween {
    from: f64,
    current: f64,
    target: f64,
    /// None while waiting for the first frame after a retarget; the clock
    /// starts at whatever `now` that frame supplies.
    started: Option<f64>,
}

impl Tween {
    fn settled(value: f64) -> Self {
        Self {
            from: value,
            current: value,
            target: value,
            started: None,
        }
    }

    fn in_flight(&self) -> bool {
        self.current != self.target || self.from != self.target
    }
}

/// One opacity tween per element, advanced by host-supplied frame times.
///
/// Never blocks and never reads a clock: `tick(now)` is the only source of
/// time, so the same controller works under any frame scheduler.
pub struct Animator {
    tweens: HashMap<ElementKey, Tween>,
    duration: f64,
    easing: Easing,
}

impl Animator {
    pub fn new(duration: f64, easing: Easing) -> Self {
        Self {
            tweens: HashMap::new(),
            duration,
            easing,
        }
    }

    /// Registers an element at a settled value. Elements already known keep
    /// their record.
    pub fn seed(&mut self, key: ElementKey, value: f64) {
        self.tweens.entry(key).or_insert_with(|| Tween::settled(value));
    }

    /// Drops records for elements that do not survive a graph swap.
    pub fn retain(&mut self, keep: impl Fn(&ElementKey) -> bool) {
        self.tweens.retain(|key, _| keep(key));
    }

    /// Sends an element toward `target` from wherever it is now. Retargeting
    /// to the current target keeps the running clock untouched; anything else
    /// restarts the clock from the current value. Unknown keys are ignored.
    pub fn retarget(&mut self, key: &ElementKey, target: f64) {
        if let Some(tween) = self.tweens.get_mut(key) {
            Self::retarget_tween(tween, target, self.duration);
        }
    }

    /// Retargets every known element in one pass.
    pub fn retarget_each(&mut self, target_for: impl Fn(&ElementKey) -> f64) {
        for (key, tween) in &mut self.tweens {
            Self::retarget_tween(tween, target_for(key), self.duration);
        }
    }

    fn retarget_tween(tween: &mut Tween, target: f64, duration: f64) {
        if tween.target == target {
            return;
        }
        tween.from = tween.current;
        tween.target = target;
        tween.started = None;
        if duration <= 0.0 {
            tween.from = target;
            tween.current = target;
        }
    }

    pub fn current(&self, key: &ElementKey) -> Option<f64> {
        self.tweens.get(key).map(|tween| tween.current)
    }

    /// Advances all tweens to `now` (seconds, any monotonic origin). Returns
    /// true while at least one element still has ground to cover, so the host
    /// knows to schedule another frame.
    pub fn tick(&mut self, now: f64) -> bool {
        let mut active = false;
        for tween in self.tweens.values_mut() {
            if !tween.in_flight() {
                continue;
            }
            let started = *tween.started.get_or_insert(now);
            let t = ((now - started) / self.duration).clamp(0.0, 1.0);
            if t >= 1.0 {
                tween.from = tween.target;
                tween.current = tween.target;
                tween.started = None;
            } else {
                tween.current = tween.from + (tween.target - tween.from) * self.easing.apply(t);
                active = true;
            }
        }
        active
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION, Easing::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn key() -> ElementKey {
        ElementKey::node("a")
    }

    fn linear() -> Animator {
        let mut animator = Animator::new(0.3, Easing::Linear);
        animator.seed(key(), 0.8);
        animator
    }

    #[test]
    fn seeded_elements_are_settled() {
        let mut animator = linear();
        assert!(!animator.tick(0.0));
        assert_eq!(animator.current(&key()), Some(0.8));

        // seeding again never clobbers the existing record
        animator.retarget(&key(), 0.25);
        animator.seed(key(), 0.8);
        assert!(animator.tick(0.0));
    }

    #[test]
    fn retarget_walks_the_value_over_the_duration() {
        let mut animator = linear();
        animator.retarget(&key(), 0.25);

        assert!(animator.tick(0.0));
        assert!((animator.current(&key()).unwrap() - 0.8).abs() < EPS);
        assert!(animator.tick(0.15));
        assert!((animator.current(&key()).unwrap() - 0.525).abs() < EPS);
        assert!(!animator.tick(0.3));
        assert_eq!(animator.current(&key()), Some(0.25));
    }

    #[test]
    fn retargeting_the_same_target_keeps_the_clock() {
        let mut animator = linear();
        animator.retarget(&key(), 0.0);
        animator.tick(0.0);
        animator.tick(0.1);

        animator.retarget(&key(), 0.0);
        animator.tick(0.2);
        // still on the original 0.0..0.3 clock: two thirds of the way down
        assert!((animator.current(&key()).unwrap() - 0.8 / 3.0).abs() < EPS);
    }

    #[test]
    fn retargeting_elsewhere_continues_from_current_value() {
        let mut animator = Animator::new(0.3, Easing::Linear);
        animator.seed(key(), 0.0);
        animator.retarget(&key(), 1.0);
        animator.tick(0.0);
        animator.tick(0.15);
        assert!((animator.current(&key()).unwrap() - 0.5).abs() < EPS);

        // no snap back: the reversal departs from 0.5 on a fresh clock
        animator.retarget(&key(), 0.0);
        animator.tick(0.2);
        assert!((animator.current(&key()).unwrap() - 0.5).abs() < EPS);
        animator.tick(0.35);
        assert!((animator.current(&key()).unwrap() - 0.25).abs() < EPS);
        assert!(!animator.tick(0.5));
        assert_eq!(animator.current(&key()), Some(0.0));
    }

    #[test]
    fn zero_duration_snaps() {
        let mut animator = Animator::new(0.0, Easing::Linear);
        animator.seed(key(), 0.8);
        animator.retarget(&key(), 0.25);
        assert_eq!(animator.current(&key()), Some(0.25));
        assert!(!animator.tick(0.0));
    }

    #[test]
    fn retain_drops_unlisted_elements() {
        let mut animator = linear();
        animator.seed(ElementKey::node("b"), 0.8);
        animator.retain(|k| *k == key());
        assert_eq!(animator.current(&key()), Some(0.8));
        assert_eq!(animator.current(&ElementKey::node("b")), None);
    }

    #[test]
    fn retargeting_unknown_keys_is_a_no_op() {
        let mut animator = linear();
        animator.retarget(&ElementKey::node("ghost"), 0.0);
        assert!(!animator.tick(0.0));
        assert_eq!(animator.current(&ElementKey::node("ghost")), None);
    }

    #[test]
    fn easing_shapes() {
        assert_eq!(Easing::Linear.apply(0.25), 0.25);
        assert!((Easing::CubicOut.apply(0.5) - 0.875).abs() < EPS);
        assert!((Easing::CubicInOut.apply(0.25) - 0.0625).abs() < EPS);
        assert!((Easing::CubicInOut.apply(0.75) - 0.9375).abs() < EPS);
        for easing in [Easing::Linear, Easing::CubicOut, Easing::CubicInOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
    }
}

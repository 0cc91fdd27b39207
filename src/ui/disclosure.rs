use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Closed,
    Opening,
    Open,
    Closing,
}

/// Animated expand/collapse controller for one region of the screen.
///
/// The extent is a row count that animates between zero and the content's
/// natural height. Requests made while a transition is in flight are not
/// applied mid-animation; the latest conflicting request is held in
/// `pending_target` and becomes the next transition once the current one
/// finishes, so at most one animation is ever in flight and the region
/// always ends in the last requested state.
///
/// Completion is observed on ticks: `tick(now)` (or `on_transition_end`
/// when an external layout signal drives completion) returns
/// `Some(final_open_state)` exactly once per visually settled state.
pub struct Disclosure {
    desired_open: bool,
    phase: Phase,
    pending_target: Option<bool>,
    natural_extent: u16,
    start_extent: u16,
    target_extent: u16,
    started_at: Option<Instant>,
    duration: Duration,
}

impl Disclosure {
    /// Snaps straight to the initial state. No transition, no settle.
    pub fn new(open: bool, natural_extent: u16, duration: Duration) -> Self {
        Self {
            desired_open: open,
            phase: if open { Phase::Open } else { Phase::Closed },
            pending_target: None,
            natural_extent,
            start_extent: if open { natural_extent } else { 0 },
            target_extent: if open { natural_extent } else { 0 },
            started_at: None,
            duration,
        }
    }

    pub fn set_open(&mut self, open: bool, now: Instant) {
        self.desired_open = open;

        match self.phase {
            Phase::Opening | Phase::Closing => {
                let in_flight = self.phase == Phase::Opening;
                if open == in_flight {
                    // Re-requesting the in-flight target supersedes any
                    // queued reversal.
                    self.pending_target = None;
                } else {
                    self.pending_target = Some(open);
                }
            }
            Phase::Open => {
                if !open {
                    self.begin(false, now);
                }
            }
            Phase::Closed => {
                if open {
                    self.begin(true, now);
                }
            }
        }
    }

    /// The content's measured natural extent changed (e.g. rows loaded in,
    /// or the terminal was resized). While opening, the animation target
    /// follows the new extent without restarting the timer.
    pub fn content_resized(&mut self, extent: u16) {
        self.natural_extent = extent;
        if self.phase == Phase::Opening {
            self.target_extent = extent;
        }
    }

    /// Advance the animation clock. Returns the settle notification when
    /// the in-flight transition reaches its deadline.
    pub fn tick(&mut self, now: Instant) -> Option<bool> {
        match self.started_at {
            Some(t0) if now.saturating_duration_since(t0) >= self.duration => {
                self.on_transition_end(now)
            }
            _ => None,
        }
    }

    /// Complete the in-flight transition. Stray completion signals (no
    /// transition in flight) are ignored. If a conflicting target was
    /// queued behind the finished transition, the next transition starts
    /// immediately and no settle is reported for the superseded state.
    pub fn on_transition_end(&mut self, now: Instant) -> Option<bool> {
        let finished_open = match self.phase {
            Phase::Opening => true,
            Phase::Closing => false,
            Phase::Closed | Phase::Open => return None,
        };

        self.started_at = None;
        self.phase = if finished_open {
            Phase::Open
        } else {
            // Fully closed: content unmounts.
            Phase::Closed
        };

        match self.pending_target.take() {
            Some(next) if next != finished_open => {
                self.begin(next, now);
                None
            }
            _ => Some(finished_open),
        }
    }

    /// Current extent in rows, interpolated while animating. Once fully
    /// open the extent is released to the natural height so organic
    /// content growth is not clipped.
    pub fn extent(&self, now: Instant) -> u16 {
        match self.phase {
            Phase::Closed => 0,
            Phase::Open => self.natural_extent,
            Phase::Opening | Phase::Closing => {
                let Some(t0) = self.started_at else {
                    return self.target_extent;
                };
                if self.duration.is_zero() {
                    return self.target_extent;
                }
                let t = (now.saturating_duration_since(t0).as_secs_f64()
                    / self.duration.as_secs_f64())
                .clamp(0.0, 1.0);
                let from = f64::from(self.start_extent);
                let to = f64::from(self.target_extent);
                (from + (to - from) * t).round() as u16
            }
        }
    }

    pub fn desired_open(&self) -> bool {
        self.desired_open
    }

    pub fn is_mounted(&self) -> bool {
        self.phase != Phase::Closed
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, Phase::Opening | Phase::Closing)
    }

    /// Fully open and static.
    pub fn is_open(&self) -> bool {
        self.phase == Phase::Open
    }

    fn begin(&mut self, open: bool, now: Instant) {
        if open {
            self.phase = Phase::Opening;
            self.start_extent = 0;
            self.target_extent = self.natural_extent;
        } else {
            self.phase = Phase::Closing;
            self.start_extent = self.natural_extent;
            self.target_extent = 0;
        }
        self.started_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUR: Duration = Duration::from_millis(200);

    fn at(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    #[test]
    fn construction_does_not_settle() {
        let t0 = Instant::now();
        let mut d = Disclosure::new(false, 10, DUR);
        assert!(!d.is_mounted());
        assert_eq!(d.extent(t0), 0);
        assert_eq!(d.tick(at(t0, 1000)), None);

        let mut open = Disclosure::new(true, 10, DUR);
        assert!(open.is_open());
        assert_eq!(open.extent(t0), 10);
        assert_eq!(open.tick(at(t0, 1000)), None);
    }

    #[test]
    fn open_settles_exactly_once() {
        let t0 = Instant::now();
        let mut d = Disclosure::new(false, 8, DUR);
        d.set_open(true, t0);
        assert!(d.is_mounted());
        assert!(d.is_animating());
        assert_eq!(d.extent(t0), 0);
        assert_eq!(d.extent(at(t0, 100)), 4);

        // Before the deadline nothing settles.
        assert_eq!(d.tick(at(t0, 150)), None);
        assert_eq!(d.tick(at(t0, 200)), Some(true));
        assert!(d.is_open());
        assert!(!d.is_animating());
        // Duplicate completion signals are ignored.
        assert_eq!(d.tick(at(t0, 250)), None);
        assert_eq!(d.on_transition_end(at(t0, 250)), None);
    }

    #[test]
    fn extent_released_to_natural_after_open() {
        let t0 = Instant::now();
        let mut d = Disclosure::new(false, 8, DUR);
        d.set_open(true, t0);
        d.tick(at(t0, 200));

        // Content keeps growing after the transition settled.
        d.content_resized(14);
        assert_eq!(d.extent(at(t0, 300)), 14);
    }

    #[test]
    fn close_unmounts_after_settle() {
        let t0 = Instant::now();
        let mut d = Disclosure::new(true, 8, DUR);
        d.set_open(false, t0);
        assert!(d.is_mounted(), "content stays mounted while closing");
        assert_eq!(d.extent(at(t0, 100)), 4);
        assert_eq!(d.tick(at(t0, 200)), Some(false));
        assert!(!d.is_mounted());
        assert_eq!(d.extent(at(t0, 200)), 0);
    }

    #[test]
    fn reversal_while_opening_settles_once_as_closed() {
        let t0 = Instant::now();
        let mut d = Disclosure::new(false, 8, DUR);
        d.set_open(true, t0);
        d.set_open(false, at(t0, 50));

        // The opening completes visually but must not settle.
        assert_eq!(d.tick(at(t0, 200)), None);
        assert!(d.is_animating(), "close starts immediately after open finishes");

        // The queued close settles as the one and only notification.
        assert_eq!(d.tick(at(t0, 400)), Some(false));
        assert!(!d.is_mounted());
    }

    #[test]
    fn rerequesting_in_flight_target_supersedes_pending() {
        let t0 = Instant::now();
        let mut d = Disclosure::new(false, 8, DUR);
        d.set_open(true, t0);
        d.set_open(false, at(t0, 40));
        d.set_open(true, at(t0, 80));

        // Last request wins: the open settles and nothing else runs.
        assert_eq!(d.tick(at(t0, 200)), Some(true));
        assert!(d.is_open());
        assert_eq!(d.tick(at(t0, 400)), None);
    }

    #[test]
    fn set_open_is_idempotent_when_settled() {
        let t0 = Instant::now();
        let mut d = Disclosure::new(true, 8, DUR);
        d.set_open(true, t0);
        assert!(!d.is_animating());
        assert_eq!(d.tick(at(t0, 500)), None);
    }

    #[test]
    fn content_growth_mid_opening_retargets_without_restart() {
        let t0 = Instant::now();
        let mut d = Disclosure::new(false, 6, DUR);
        d.set_open(true, t0);
        d.content_resized(12);

        // Target follows the new extent; the deadline is unchanged.
        assert_eq!(d.extent(at(t0, 100)), 6);
        assert_eq!(d.tick(at(t0, 199)), None);
        assert_eq!(d.tick(at(t0, 200)), Some(true));
        assert_eq!(d.extent(at(t0, 200)), 12);
    }

    #[test]
    fn content_resize_while_closing_only_updates_natural() {
        let t0 = Instant::now();
        let mut d = Disclosure::new(true, 8, DUR);
        d.set_open(false, t0);
        d.content_resized(20);

        // The close still animates from the captured start to zero.
        assert_eq!(d.extent(at(t0, 100)), 4);
        assert_eq!(d.tick(at(t0, 200)), Some(false));

        // The next open uses the updated natural extent.
        d.set_open(true, at(t0, 300));
        assert_eq!(d.tick(at(t0, 500)), Some(true));
        assert_eq!(d.extent(at(t0, 500)), 20);
    }

    #[test]
    fn final_settle_reflects_last_request_across_many_reversals() {
        let t0 = Instant::now();
        let mut d = Disclosure::new(false, 8, DUR);
        d.set_open(true, t0);
        for (i, open) in [false, true, false, true, false].into_iter().enumerate() {
            d.set_open(open, at(t0, 10 * (i as u64 + 1)));
        }
        assert!(!d.desired_open());

        // Open finishes silently, close runs next.
        assert_eq!(d.tick(at(t0, 200)), None);
        let mut settles = Vec::new();
        for ms in (250..800).step_by(50) {
            if let Some(s) = d.tick(at(t0, ms)) {
                settles.push(s);
            }
        }
        assert_eq!(settles, vec![false]);
        assert!(!d.is_mounted());
    }

    #[test]
    fn zero_duration_settles_on_first_tick() {
        let t0 = Instant::now();
        let mut d = Disclosure::new(false, 8, Duration::ZERO);
        d.set_open(true, t0);
        assert_eq!(d.extent(t0), 8);
        assert_eq!(d.tick(t0), Some(true));
    }
}

use crate::detail::DetailPolicy;
use std::time::{Duration, Instant};

/// Where the scheduler is in its redraw cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    ScheduledDraw,
    DebouncingResize,
}

/// Decides when redraw requests become actual draws. The GUI owns the
/// timers and frame callbacks; this state machine owns every transition, so
/// coalescing, throttling and teardown are testable without a surface.
///
/// A pending draw and a resize debounce can be in flight at the same time;
/// [`FrameScheduler::state`] reports the draw as the dominant one.
#[derive(Debug)]
pub struct FrameScheduler {
    min_interval: Duration,
    debounce_delay: Duration,
    draw_pending: bool,
    debounce_deadline: Option<Instant>,
    last_draw: Option<Instant>,
    torn_down: bool,
}

impl FrameScheduler {
    pub fn new(policy: &DetailPolicy) -> Self {
        Self {
            min_interval: policy.min_draw_interval(),
            debounce_delay: policy.resize_debounce(),
            draw_pending: false,
            debounce_deadline: None,
            last_draw: None,
            torn_down: false,
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.draw_pending {
            SchedulerState::ScheduledDraw
        } else if self.debounce_deadline.is_some() {
            SchedulerState::DebouncingResize
        } else {
            SchedulerState::Idle
        }
    }

    /// True when the caller must schedule a frame callback. Requests while
    /// one is already in flight coalesce into it; after teardown nothing is
    /// scheduled.
    pub fn request_redraw(&mut self) -> bool {
        if self.torn_down || self.draw_pending {
            return false;
        }
        self.draw_pending = true;
        true
    }

    /// The frame callback fired. True when this frame should actually be
    /// drawn; false when the inter-draw ceiling has not elapsed (the
    /// previous buffer is shown instead).
    pub fn frame_fired(&mut self, now: Instant) -> bool {
        self.draw_pending = false;
        if self.torn_down {
            return false;
        }
        if let Some(last) = self.last_draw
            && now.duration_since(last) < self.min_interval
        {
            return false;
        }
        self.last_draw = Some(now);
        true
    }

    /// A surface resize was observed. Returns the deadline to arm a timer
    /// for; any deadline already in flight is superseded.
    pub fn resize_observed(&mut self, now: Instant) -> Option<Instant> {
        if self.torn_down {
            return None;
        }
        let deadline = now + self.debounce_delay;
        self.debounce_deadline = Some(deadline);
        Some(deadline)
    }

    pub fn debounce_delay(&self) -> Duration {
        self.debounce_delay
    }

    /// A debounce timer fired. True when its deadline was still the current
    /// one and a frame callback must now be scheduled; superseded and
    /// torn-down timers are no-ops.
    pub fn debounce_fired(&mut self, now: Instant) -> bool {
        if self.torn_down {
            return false;
        }
        match self.debounce_deadline {
            Some(deadline) if now >= deadline => {
                self.debounce_deadline = None;
                self.request_redraw()
            }
            _ => false,
        }
    }

    /// Surface detached: drop everything in flight. No draw may run after
    /// this.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.draw_pending = false;
        self.debounce_deadline = None;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler_for(segments: usize) -> FrameScheduler {
        FrameScheduler::new(&DetailPolicy::for_segments(segments))
    }

    #[test]
    fn test_redraw_requests_coalesce() {
        let mut scheduler = scheduler_for(50);

        let scheduled = (0..100).filter(|_| scheduler.request_redraw()).count();
        assert_eq!(scheduled, 1);
        assert_eq!(scheduler.state(), SchedulerState::ScheduledDraw);

        // once the frame fires, the next request schedules again
        assert!(scheduler.frame_fired(Instant::now()));
        assert!(scheduler.request_redraw());
    }

    #[test]
    fn test_frame_rate_ceiling() {
        let mut scheduler = scheduler_for(3000);
        let t0 = Instant::now();

        assert!(scheduler.request_redraw());
        assert!(scheduler.frame_fired(t0));

        assert!(scheduler.request_redraw());
        assert!(!scheduler.frame_fired(t0 + Duration::from_millis(5)));

        assert!(scheduler.request_redraw());
        assert!(scheduler.frame_fired(t0 + Duration::from_millis(20)));
    }

    #[test]
    fn test_small_wheels_draw_every_frame() {
        let mut scheduler = scheduler_for(500);
        let t0 = Instant::now();

        for i in 0..10 {
            assert!(scheduler.request_redraw());
            assert!(scheduler.frame_fired(t0 + Duration::from_millis(i)));
        }
    }

    #[test]
    fn test_resize_debounce_supersedes() {
        let mut scheduler = scheduler_for(3000);
        let t0 = Instant::now();

        let first = scheduler.resize_observed(t0).unwrap();
        let second = scheduler
            .resize_observed(t0 + Duration::from_millis(10))
            .unwrap();
        assert_eq!(scheduler.state(), SchedulerState::DebouncingResize);

        // the superseded timer is a no-op, the live one schedules a draw
        assert!(!scheduler.debounce_fired(first));
        assert!(scheduler.debounce_fired(second));
        assert_eq!(scheduler.state(), SchedulerState::ScheduledDraw);
    }

    #[test]
    fn test_zero_debounce_for_small_wheels() {
        let mut scheduler = scheduler_for(100);
        let t0 = Instant::now();

        let deadline = scheduler.resize_observed(t0).unwrap();
        assert_eq!(deadline, t0);
        assert!(scheduler.debounce_fired(deadline));
    }

    #[test]
    fn test_teardown_cancels_everything() {
        let mut scheduler = scheduler_for(3000);
        let t0 = Instant::now();

        let deadline = scheduler.resize_observed(t0).unwrap();
        assert!(scheduler.request_redraw());
        scheduler.teardown();

        assert!(!scheduler.frame_fired(deadline));
        assert!(!scheduler.debounce_fired(deadline));
        assert!(!scheduler.request_redraw());
        assert!(scheduler.resize_observed(deadline).is_none());
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.is_torn_down());
    }

    #[test]
    fn test_first_frame_always_draws() {
        let mut scheduler = scheduler_for(9000);
        assert!(scheduler.request_redraw());
        assert!(scheduler.frame_fired(Instant::now()));
    }
}

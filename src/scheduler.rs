//! Per-ruler frame throttle: at most one scroll redraw per animation frame

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum FrameState<T> {
    #[default]
    Idle,
    /// A task waits for the next animation frame
    Pending(T),
    /// The frame's task is executing
    Running,
}

/// Single-slot task queue.
///
/// `schedule` only succeeds while idle; events arriving while a frame is
/// pending or running are dropped. The slot frees up once the running frame
/// calls [`FrameScheduler::finish_frame`].
#[derive(Debug, Default)]
pub struct FrameScheduler<T> {
    state: FrameState<T>,
    dropped: u64,
}

impl<T> FrameScheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: FrameState::Idle,
            dropped: 0,
        }
    }

    /// Queue `task` for the next frame. Returns false when it was dropped.
    pub fn schedule(&mut self, task: T) -> bool {
        if matches!(self.state, FrameState::Idle) {
            self.state = FrameState::Pending(task);
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    /// Take the pending task, if any, and lock the slot
    pub fn begin_frame(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.state, FrameState::Running) {
            FrameState::Pending(task) => Some(task),
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn finish_frame(&mut self) {
        if matches!(self.state, FrameState::Running) {
            self.state = FrameState::Idle;
        }
    }

    /// Drop whatever is queued or running
    pub fn cancel(&mut self) {
        self.state = FrameState::Idle;
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, FrameState::Idle)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, FrameState::Pending(_))
    }

    /// Events dropped because a frame was already queued
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_task_per_frame() {
        let mut scheduler = FrameScheduler::new();
        assert!(scheduler.schedule(1));
        assert!(!scheduler.schedule(2));
        assert!(!scheduler.schedule(3));
        assert_eq!(scheduler.dropped(), 2);

        assert_eq!(scheduler.begin_frame(), Some(1));
        assert!(!scheduler.schedule(4), "locked while running");
        scheduler.finish_frame();
        assert!(scheduler.is_idle());
        assert!(scheduler.schedule(5));
    }

    #[test]
    fn empty_frame_leaves_slot_idle() {
        let mut scheduler: FrameScheduler<u8> = FrameScheduler::new();
        assert_eq!(scheduler.begin_frame(), None);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn cancel_clears_pending_work() {
        let mut scheduler = FrameScheduler::new();
        scheduler.schedule("scroll");
        assert!(scheduler.is_pending());
        scheduler.cancel();
        assert_eq!(scheduler.begin_frame(), None);
    }

    #[test]
    fn instances_are_independent() {
        let mut a = FrameScheduler::new();
        let mut b = FrameScheduler::new();
        assert!(a.schedule(1));
        assert!(b.schedule(2));
    }
}

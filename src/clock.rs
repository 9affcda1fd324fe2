//! Timer seam for the animated behaviors.
//!
//! Handles cancel their timer when dropped, the way `gloo_timers` does, so a
//! component keeps at most one pending continuation by storing a single
//! handle and replacing it.

use gloo_timers::callback::{Interval, Timeout};

pub trait Clock {
    type Handle;

    /// Runs `task` once after `millis`.
    fn after(&self, millis: u32, task: impl FnOnce() + 'static) -> Self::Handle;

    /// Runs `task` every `millis` until the handle is dropped.
    fn every(&self, millis: u32, task: impl FnMut() + 'static) -> Self::Handle;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

/// Kept only so that dropping it cancels the browser timer.
#[allow(dead_code)]
pub enum TimerHandle {
    Once(Timeout),
    Repeating(Interval),
}

impl Clock for BrowserClock {
    type Handle = TimerHandle;

    fn after(&self, millis: u32, task: impl FnOnce() + 'static) -> TimerHandle {
        TimerHandle::Once(Timeout::new(millis, task))
    }

    fn every(&self, millis: u32, task: impl FnMut() + 'static) -> TimerHandle {
        TimerHandle::Repeating(Interval::new(millis, task))
    }
}

#[cfg(test)]
pub(crate) use manual::ManualClock;

#[cfg(test)]
mod manual {
    use std::cell::RefCell;
    use std::collections::{BTreeMap, HashSet};
    use std::rc::{Rc, Weak};

    use super::Clock;

    enum Job {
        Once(Box<dyn FnOnce()>),
        Every(u32, Box<dyn FnMut()>),
    }

    #[derive(Default)]
    struct Timeline {
        now: u64,
        seq: u64,
        // Keyed by (due, arming order) so equal deadlines fire in the order
        // they were armed.
        queue: BTreeMap<(u64, u64), (u64, Job)>,
        live: HashSet<u64>,
    }

    /// Virtual clock for tests: nothing fires until [`ManualClock::advance`].
    #[derive(Clone, Default)]
    pub(crate) struct ManualClock {
        timeline: Rc<RefCell<Timeline>>,
    }

    pub(crate) struct ManualHandle {
        id: u64,
        timeline: Weak<RefCell<Timeline>>,
    }

    impl Drop for ManualHandle {
        fn drop(&mut self) {
            if let Some(timeline) = self.timeline.upgrade() {
                timeline.borrow_mut().live.remove(&self.id);
            }
        }
    }

    impl ManualClock {
        fn schedule(&self, millis: u32, job: Job) -> ManualHandle {
            let mut t = self.timeline.borrow_mut();
            t.seq += 1;
            let id = t.seq;
            let due = t.now + u64::from(millis);
            t.queue.insert((due, id), (id, job));
            t.live.insert(id);
            ManualHandle {
                id,
                timeline: Rc::downgrade(&self.timeline),
            }
        }

        pub(crate) fn now(&self) -> u64 {
            self.timeline.borrow().now
        }

        /// Number of timers that are armed and not cancelled.
        pub(crate) fn pending(&self) -> usize {
            let t = self.timeline.borrow();
            t.queue.values().filter(|(id, _)| t.live.contains(id)).count()
        }

        /// Moves virtual time forward, firing every due timer in order.
        pub(crate) fn advance(&self, millis: u64) {
            let target = self.now() + millis;
            loop {
                let next = {
                    let mut t = self.timeline.borrow_mut();
                    let Some(&key) = t.queue.keys().next() else { break };
                    if key.0 > target {
                        break;
                    }
                    let entry = t.queue.remove(&key);
                    t.now = key.0;
                    entry.map(|(id, job)| (key.0, id, job))
                };
                let Some((due, id, job)) = next else { continue };
                if !self.timeline.borrow().live.contains(&id) {
                    continue;
                }
                match job {
                    Job::Once(task) => {
                        self.timeline.borrow_mut().live.remove(&id);
                        task();
                    }
                    Job::Every(period, mut task) => {
                        task();
                        let mut t = self.timeline.borrow_mut();
                        if t.live.contains(&id) {
                            t.seq += 1;
                            let seq = t.seq;
                            let key = (due + u64::from(period), seq);
                            t.queue.insert(key, (id, Job::Every(period, task)));
                        }
                    }
                }
            }
            self.timeline.borrow_mut().now = target;
        }
    }

    impl Clock for ManualClock {
        type Handle = ManualHandle;

        fn after(&self, millis: u32, task: impl FnOnce() + 'static) -> ManualHandle {
            self.schedule(millis, Job::Once(Box::new(task)))
        }

        fn every(&self, millis: u32, task: impl FnMut() + 'static) -> ManualHandle {
            self.schedule(millis, Job::Every(millis, Box::new(task)))
        }
    }
}

//! Periodic timer bookkeeping for the session runner.
//!
//! There are two one-second timers: the elapsed-time tick, armed for the
//! whole session, and the rest countdown, armed only while resting. The
//! scheduler does not own a thread; whoever drives the runner calls
//! `SessionRunner::tick()` once per second (a real ticker in the CLI, a
//! loop in tests) and the scheduler reports which timers fire.
//!
//! Pausing never disarms a timer. Handlers check the pause flag on every
//! firing, so resuming continues exactly where the count left off.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerId {
    Elapsed,
    Rest,
}

impl TimerId {
    /// Dispatch order within a single tick
    pub const ALL: [TimerId; 2] = [TimerId::Elapsed, TimerId::Rest];
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Slot {
    armed: bool,
    fires: u64,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    elapsed: Slot,
    rest: Slot,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: TimerId) -> &Slot {
        match id {
            TimerId::Elapsed => &self.elapsed,
            TimerId::Rest => &self.rest,
        }
    }

    fn slot_mut(&mut self, id: TimerId) -> &mut Slot {
        match id {
            TimerId::Elapsed => &mut self.elapsed,
            TimerId::Rest => &mut self.rest,
        }
    }

    /// Arm a timer, restarting its fire count
    pub fn arm(&mut self, id: TimerId) {
        *self.slot_mut(id) = Slot {
            armed: true,
            fires: 0,
        };
        tracing::debug!("Armed {:?} timer", id);
    }

    /// Disarm a timer; cancelling an inactive timer is a no-op
    pub fn cancel(&mut self, id: TimerId) {
        let slot = self.slot_mut(id);
        if slot.armed {
            tracing::debug!("Cancelled {:?} timer after {} fires", id, slot.fires);
        }
        slot.armed = false;
    }

    pub fn cancel_all(&mut self) {
        for id in TimerId::ALL {
            self.cancel(id);
        }
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.slot(id).armed
    }

    /// How many times a timer has fired since it was last armed
    pub fn fires(&self, id: TimerId) -> u64 {
        self.slot(id).fires
    }

    /// Advance one second: returns the armed timers in dispatch order
    pub fn fire(&mut self) -> Vec<TimerId> {
        let mut due = Vec::with_capacity(2);
        for id in TimerId::ALL {
            let slot = self.slot_mut(id);
            if slot.armed {
                slot.fires += 1;
                due.push(id);
            }
        }
        due
    }
}

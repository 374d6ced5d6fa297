//! Frame-based event scheduling.
//!
//! All timing in the simulation is expressed in discrete frames, decoupling
//! "when something happens" from wall-clock jitter. The scheduler owns the
//! monotonic frame counter, converts relative durations into absolute target
//! frames and drains every due event once per tick.

use slab::Slab;
use tracing::warn;

use crate::error::ScheduleError;
use crate::heap::{Priority, PriorityQueue};

/// One discrete tick of the fixed-interval server loop; the unit of all
/// scheduling.
pub type Frame = u64;

/// Callback invoked when a timed event fires. It receives the context the
/// scheduler is ticked against plus the scheduler itself, so an event can
/// chain follow-up events.
pub type EventCallback<C> = Box<dyn FnOnce(&mut C, &mut Scheduler<C>)>;

/// Handle to a scheduled event, used to cancel or evict it.
///
/// Handles carry the sequence number of the event they were issued for, so a
/// handle kept past its event's execution can never act on an unrelated event
/// that later reuses the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventHandle {
    slot: usize,
    sequence: u64,
}

/// A callback bound to an absolute target frame.
struct TimedEvent<C> {
    callback: EventCallback<C>,
    frame: Frame,
    sequence: u64,
    cancelled: bool,
}

/// Heap entry for a pending event. Keyed by the target frame; the payload
/// stays in the slab so heap moves stay cheap.
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    frame: Frame,
    slot: usize,
}

impl Priority for QueueEntry {
    fn priority(&self) -> u64 {
        self.frame
    }
}

/// Priority-queue-driven scheduler for timed events.
///
/// `C` is the mutable context callbacks run against; the crate wires it to
/// [`crate::simulation::World`], tests can use anything.
///
/// Cancellation is lazy by design: [`Scheduler::cancel`] flips a flag in O(1)
/// and the event is discarded unexecuted when its turn comes, instead of
/// paying O(log n) for an eager heap eviction that has no behavioral benefit.
/// [`Scheduler::remove`] exists for the rarer case where heap occupancy
/// itself must shrink immediately.
pub struct Scheduler<C> {
    frame: Frame,
    tick_ms: u64,
    next_sequence: u64,
    queue: PriorityQueue<QueueEntry>,
    events: Slab<TimedEvent<C>>,
}

impl<C> Scheduler<C> {
    /// Creates a scheduler with the given tick interval in milliseconds.
    /// The interval is only used to convert duration-based schedules into
    /// frames and is read once here.
    pub fn new(tick_ms: u64) -> Self {
        if tick_ms == 0 {
            panic!("Tick interval must be at least 1ms");
        }

        Scheduler {
            frame: 0,
            tick_ms,
            next_sequence: 0,
            queue: PriorityQueue::new(),
            events: Slab::new(),
        }
    }

    /// The current frame. Increments exactly once per [`Scheduler::tick`]
    /// and never decreases.
    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// The fixed tick interval in milliseconds.
    pub fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    /// True when the frame counter is a multiple of `modulus`. Used to run
    /// work only every Nth tick.
    pub fn tick_modulus(&self, modulus: u64) -> bool {
        self.frame % modulus == 0
    }

    /// Number of events currently in the queue, cancelled ones included.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Schedules `callback` to fire `frames` frames from now.
    ///
    /// An event scheduled for 0 frames fires on the next tick; nothing ever
    /// fires strictly before its target frame.
    pub fn schedule(
        &mut self,
        frames: Frame,
        callback: impl FnOnce(&mut C, &mut Scheduler<C>) + 'static,
    ) -> EventHandle {
        let frame = self.frame + frames;
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let slot = self.events.insert(TimedEvent {
            callback: Box::new(callback),
            frame,
            sequence,
            cancelled: false,
        });
        self.queue.push(QueueEntry { frame, slot });

        EventHandle { slot, sequence }
    }

    /// Schedules `callback` to fire `ms` milliseconds from now, rounded up to
    /// whole frames so the event never fires early.
    ///
    /// A non-finite or negative delay is a caller bug: it is logged and the
    /// request dropped rather than halting the tick.
    pub fn schedule_ms(
        &mut self,
        ms: f64,
        callback: impl FnOnce(&mut C, &mut Scheduler<C>) + 'static,
    ) -> Result<EventHandle, ScheduleError> {
        if !ms.is_finite() || ms < 0.0 {
            warn!(ms, "dropping event scheduled with an invalid delay");
            return Err(ScheduleError::InvalidDuration(ms));
        }

        let frames = (ms / self.tick_ms as f64).ceil() as Frame;
        Ok(self.schedule(frames, callback))
    }

    /// Schedules `callback` to fire `seconds` seconds from now, converted via
    /// the whole number of frames per second at the configured tick interval.
    pub fn schedule_secs(
        &mut self,
        seconds: f64,
        callback: impl FnOnce(&mut C, &mut Scheduler<C>) + 'static,
    ) -> Result<EventHandle, ScheduleError> {
        if !seconds.is_finite() || seconds < 0.0 {
            warn!(seconds, "dropping event scheduled with an invalid delay");
            return Err(ScheduleError::InvalidDuration(seconds));
        }

        let frames_per_second = 1000 / self.tick_ms;
        let frames = (frames_per_second as f64 * seconds).floor() as Frame;
        Ok(self.schedule(frames, callback))
    }

    /// Cancels the event behind `handle`. The event stays in the queue and is
    /// discarded unexecuted when its frame comes up. Returns false if the
    /// event already fired or was removed.
    pub fn cancel(&mut self, handle: EventHandle) -> bool {
        match self.events.get_mut(handle.slot) {
            Some(event) if event.sequence == handle.sequence => {
                event.cancelled = true;
                true
            }
            _ => false,
        }
    }

    /// Eagerly evicts the event behind `handle` from both the queue and the
    /// event arena. Returns false if the event already fired or was removed.
    pub fn remove(&mut self, handle: EventHandle) -> bool {
        match self.events.get(handle.slot) {
            Some(event) if event.sequence == handle.sequence => {}
            _ => return false,
        }

        self.queue.remove_where(|entry| entry.slot == handle.slot);
        self.events.remove(handle.slot);
        true
    }

    /// Frames left until the event behind `handle` is due, or `None` once the
    /// event has fired or been removed. Due-but-not-yet-drained events report
    /// zero.
    pub fn remaining_frames(&self, handle: EventHandle) -> Option<Frame> {
        match self.events.get(handle.slot) {
            Some(event) if event.sequence == handle.sequence => {
                Some(event.frame.saturating_sub(self.frame))
            }
            _ => None,
        }
    }

    /// Advances the frame counter once, then pops and runs every event whose
    /// target frame is at or before the new counter. Cancelled events are
    /// skipped. Same-frame events run in heap-pop order, which is not
    /// insertion order; code needing a relative order must chain events.
    ///
    /// Panics raised inside a callback are not caught here; the top-level
    /// driver decides whether to isolate callbacks.
    pub fn tick(&mut self, ctx: &mut C) {
        self.frame += 1;

        while self
            .queue
            .peek()
            .is_some_and(|entry| entry.frame <= self.frame)
        {
            let Some(entry) = self.queue.pop() else {
                break;
            };
            let Some(event) = self.events.try_remove(entry.slot) else {
                continue;
            };

            if event.cancelled {
                continue;
            }

            (event.callback)(ctx, self);
        }
    }
}

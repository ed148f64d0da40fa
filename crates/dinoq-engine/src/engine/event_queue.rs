use std::collections::BTreeMap;

use crate::core::{Obstacle, Tick};

/// An input or world change deferred to a later tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledEvent {
    /// Insert an obstacle into the field.
    InsertObstacle(Obstacle),
    /// Press jump (a follow-up press of a multi-jump action).
    Jump,
}

/// Tick-indexed queue of deferred events.
///
/// Events scheduled for the same tick are released in scheduling order, so the
/// field contents are a pure function of the current tick and what was
/// scheduled before it.
///
/// # Example
///
/// ```
/// use dinoq_engine::{EventQueue, ScheduledEvent};
///
/// let mut queue = EventQueue::new();
/// queue.schedule(5, ScheduledEvent::Jump);
///
/// assert!(queue.drain_due(4).is_empty());
/// assert_eq!(queue.drain_due(5), vec![ScheduledEvent::Jump]);
/// assert!(queue.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: BTreeMap<Tick, Vec<ScheduledEvent>>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, tick: Tick, event: ScheduledEvent) {
        self.events.entry(tick).or_default().push(event);
    }

    /// Removes and returns every event due at or before `tick`, oldest first.
    pub fn drain_due(&mut self, tick: Tick) -> Vec<ScheduledEvent> {
        let pending = self.events.split_off(&(tick + 1));
        let due = std::mem::replace(&mut self.events, pending);
        due.into_values().flatten().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Iterates over pending events in release order.
    pub fn iter(&self) -> impl Iterator<Item = (Tick, &ScheduledEvent)> + '_ {
        self.events
            .iter()
            .flat_map(|(tick, events)| events.iter().map(move |e| (*tick, e)))
    }
}

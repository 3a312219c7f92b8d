use std::collections::VecDeque;

use crate::asserts::backjump_assert_moderate;
use crate::containers::KeyedVec;
use crate::engine::propagation::Priority;
use crate::engine::propagation::PropagatorId;

/// A FIFO queue per priority; [`PropagatorQueue::pop`] always serves the highest non-empty
/// priority first.
#[derive(Debug, Clone)]
pub(crate) struct PropagatorQueue {
    queues: Vec<VecDeque<PropagatorId>>,
    is_enqueued: KeyedVec<PropagatorId, bool>,
    num_enqueued: usize,
}

impl Default for PropagatorQueue {
    fn default() -> Self {
        PropagatorQueue {
            queues: vec![VecDeque::new(); Priority::NUM_PRIORITIES],
            is_enqueued: KeyedVec::default(),
            num_enqueued: 0,
        }
    }
}

impl PropagatorQueue {
    pub(crate) fn is_empty(&self) -> bool {
        self.num_enqueued == 0
    }

    pub(crate) fn len(&self) -> usize {
        self.num_enqueued
    }

    pub(crate) fn is_propagator_enqueued(&self, propagator_id: PropagatorId) -> bool {
        self.is_enqueued
            .get(propagator_id)
            .copied()
            .unwrap_or(false)
    }

    pub(crate) fn enqueue_propagator(&mut self, propagator_id: PropagatorId, priority: Priority) {
        if self.is_propagator_enqueued(propagator_id) {
            return;
        }

        self.is_enqueued.accommodate(propagator_id, false);
        self.is_enqueued[propagator_id] = true;
        self.num_enqueued += 1;
        self.queues[priority as usize].push_back(propagator_id);
    }

    pub(crate) fn pop(&mut self) -> Option<PropagatorId> {
        let queue = self.queues.iter_mut().find(|queue| !queue.is_empty())?;
        let propagator_id = queue.pop_front()?;

        self.is_enqueued[propagator_id] = false;
        self.num_enqueued -= 1;

        Some(propagator_id)
    }

    /// Take `propagator_id` out of the queue if it is in there.
    pub(crate) fn remove(&mut self, propagator_id: PropagatorId, priority: Priority) {
        if !self.is_propagator_enqueued(propagator_id) {
            return;
        }

        let queue = &mut self.queues[priority as usize];
        let position = queue.iter().position(|&enqueued| enqueued == propagator_id);
        backjump_assert_moderate!(
            position.is_some(),
            "an enqueued propagator is in the queue of its priority"
        );

        if let Some(position) = position {
            let _ = queue.remove(position);
            self.is_enqueued[propagator_id] = false;
            self.num_enqueued -= 1;
        }
    }

    pub(crate) fn clear(&mut self) {
        for queue in self.queues.iter_mut() {
            for propagator_id in queue.drain(..) {
                self.is_enqueued[propagator_id] = false;
            }
        }
        self.num_enqueued = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_priorities_are_served_first() {
        let mut queue = PropagatorQueue::default();
        queue.enqueue_propagator(PropagatorId(0), Priority::Low);
        queue.enqueue_propagator(PropagatorId(1), Priority::High);
        queue.enqueue_propagator(PropagatorId(2), Priority::Low);

        assert_eq!(queue.pop(), Some(PropagatorId(1)));
        assert_eq!(queue.pop(), Some(PropagatorId(0)));
        assert_eq!(queue.pop(), Some(PropagatorId(2)));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn enqueueing_twice_keeps_a_single_entry() {
        let mut queue = PropagatorQueue::default();
        queue.enqueue_propagator(PropagatorId(3), Priority::Medium);
        queue.enqueue_propagator(PropagatorId(3), Priority::Medium);

        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn removed_propagators_are_not_popped() {
        let mut queue = PropagatorQueue::default();
        queue.enqueue_propagator(PropagatorId(0), Priority::Medium);
        queue.enqueue_propagator(PropagatorId(1), Priority::Medium);

        queue.remove(PropagatorId(0), Priority::Medium);

        assert!(!queue.is_propagator_enqueued(PropagatorId(0)));
        assert_eq!(queue.pop(), Some(PropagatorId(1)));
        assert!(queue.is_empty());
    }

    #[test]
    fn clear_resets_membership() {
        let mut queue = PropagatorQueue::default();
        queue.enqueue_propagator(PropagatorId(0), Priority::High);
        queue.clear();

        assert!(queue.is_empty());
        queue.enqueue_propagator(PropagatorId(0), Priority::High);
        assert_eq!(queue.pop(), Some(PropagatorId(0)));
    }
}

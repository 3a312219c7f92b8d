use std::iter::Rev;
use std::ops::Deref;
use std::vec::Drain;

use crate::asserts::backjump_assert_simple;

/// A stack of undo entries partitioned into frames, one frame per world.
///
/// Entries are handed back in exact reverse push order when frames are discarded.
#[derive(Clone, Debug)]
pub(crate) struct Trail<T> {
    current_checkpoint: usize,
    /// At index `i` is the length of the trail when world `i + 1` was opened.
    trail_delimiter: Vec<usize>,
    trail: Vec<T>,
}

// Implemented by hand to avoid requiring `T: Default`.
impl<T> Default for Trail<T> {
    fn default() -> Self {
        Trail {
            current_checkpoint: 0,
            trail_delimiter: Vec::default(),
            trail: Vec::default(),
        }
    }
}

impl<T> Trail<T> {
    pub(crate) fn new_checkpoint(&mut self) {
        self.current_checkpoint += 1;
        self.trail_delimiter.push(self.trail.len());
    }

    pub(crate) fn get_checkpoint(&self) -> usize {
        self.current_checkpoint
    }

    /// Discard every frame above `new_checkpoint`, yielding the discarded entries newest first.
    pub(crate) fn synchronise(&mut self, new_checkpoint: usize) -> Rev<Drain<'_, T>> {
        backjump_assert_simple!(
            new_checkpoint < self.current_checkpoint,
            "cannot synchronise the trail to checkpoint {new_checkpoint} from checkpoint {}",
            self.current_checkpoint
        );

        let new_trail_len = self.trail_delimiter[new_checkpoint];

        self.current_checkpoint = new_checkpoint;
        self.trail_delimiter.truncate(new_checkpoint);
        self.trail.drain(new_trail_len..).rev()
    }

    pub(crate) fn push(&mut self, elem: T) {
        self.trail.push(elem)
    }
}

impl<T> Deref for Trail<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.trail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_of_discarded_frames_come_back_newest_first() {
        let mut trail = Trail::default();
        trail.push(1);

        trail.new_checkpoint();
        trail.push(2);
        trail.push(3);
        trail.new_checkpoint();
        trail.push(4);

        let popped = trail.synchronise(0).collect::<Vec<_>>();
        assert_eq!(vec![4, 3, 2], popped);
        assert_eq!(&[1], trail.deref());
    }

    #[test]
    fn synchronising_keeps_lower_frames() {
        let mut trail = Trail::default();
        trail.new_checkpoint();
        trail.push(1);
        trail.new_checkpoint();
        trail.push(2);
        trail.new_checkpoint();

        let _ = trail.synchronise(1);

        assert_eq!(1, trail.get_checkpoint());
        assert_eq!(&[1], trail.deref());
    }

    #[test]
    #[should_panic]
    fn synchronising_upwards_is_rejected() {
        let mut trail: Trail<u32> = Trail::default();
        let _ = trail.synchronise(0);
    }
}

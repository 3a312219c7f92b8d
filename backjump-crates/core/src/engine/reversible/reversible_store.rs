use std::ops::Add;

use log::trace;

use super::ReversibleBool;
use super::ReversibleHandle;
use super::ReversibleInt;
use super::ReversibleLong;
use super::ReversibleVector;
use super::TrailedCells;
use super::TrailedVectors;
use crate::asserts::backjump_assert_moderate;

/// The checkpoint/restore substrate for all state which must survive search backtracking.
///
/// The store has a current *world*, the depth of the search node the solver is at. [`push`]
/// opens a new world and [`pop`] restores every primitive written since the matching push.
///
/// # Example
/// ```rust
/// # use backjump_core::reversible::ReversibleStore;
/// let mut store = ReversibleStore::default();
/// let counter = store.new_int(0);
///
/// store.push();
/// store.set(counter, 5);
/// store.add(counter, 2);
/// assert_eq!(7, store.get(counter));
///
/// store.pop();
/// assert_eq!(0, store.get(counter));
/// ```
///
/// [`push`]: ReversibleStore::push
/// [`pop`]: ReversibleStore::pop
#[derive(Debug, Clone, Default)]
pub struct ReversibleStore {
    world: usize,
    pub(crate) ints: TrailedCells<i32>,
    pub(crate) bools: TrailedCells<bool>,
    pub(crate) longs: TrailedCells<i64>,
    vectors: TrailedVectors,
}

impl ReversibleStore {
    /// The current world, i.e. the number of pushes which have not been popped.
    pub fn world(&self) -> usize {
        self.world
    }

    pub fn new_int(&mut self, initial: i32) -> ReversibleInt {
        ReversibleInt(self.ints.grow(initial) as u32)
    }

    pub fn new_bool(&mut self, initial: bool) -> ReversibleBool {
        ReversibleBool(self.bools.grow(initial) as u32)
    }

    pub fn new_long(&mut self, initial: i64) -> ReversibleLong {
        ReversibleLong(self.longs.grow(initial) as u32)
    }

    pub fn new_vector(&mut self, initial: &[i32]) -> ReversibleVector {
        ReversibleVector(self.vectors.grow(initial) as u32)
    }

    pub fn get<Handle: ReversibleHandle>(&self, handle: Handle) -> Handle::Value {
        Handle::cells(self).read(handle.cell())
    }

    /// Overwrite the value behind `handle`. The old value is trailed only by the first write to
    /// the cell in the current world, and not at all when the value does not change.
    pub fn set<Handle: ReversibleHandle>(&mut self, handle: Handle, value: Handle::Value) {
        let trailed = Handle::cells_mut(self).write(handle.cell(), value);
        if trailed {
            trace!("trailed {handle:?} in world {}", self.world);
        }
    }

    /// Add `delta` to the value behind `handle` and return the new value.
    pub fn add<Handle>(&mut self, handle: Handle, delta: Handle::Value) -> Handle::Value
    where
        Handle: ReversibleHandle,
        Handle::Value: Add<Output = Handle::Value>,
    {
        let value = self.get(handle) + delta;
        self.set(handle, value);
        value
    }

    /// The world in which the cell behind `handle` was last written, which never exceeds
    /// [`ReversibleStore::world`].
    pub fn last_write_world<Handle: ReversibleHandle>(&self, handle: Handle) -> usize {
        Handle::cells(self).stamp(handle.cell())
    }

    pub fn vector_len(&self, vector: ReversibleVector) -> usize {
        self.vectors.len(vector.0 as usize)
    }

    /// # Panics
    /// If `index` is not smaller than the current length of the vector.
    pub fn vector_get(&self, vector: ReversibleVector, index: usize) -> i32 {
        self.vectors.get(vector.0 as usize, index)
    }

    /// # Panics
    /// If `index` is not smaller than the current length of the vector.
    pub fn vector_set(&mut self, vector: ReversibleVector, index: usize, value: i32) {
        self.vectors.set(vector.0 as usize, index, value)
    }

    pub fn vector_push(&mut self, vector: ReversibleVector, value: i32) {
        self.vectors.push(vector.0 as usize, value)
    }

    pub fn vector_pop(&mut self, vector: ReversibleVector) -> Option<i32> {
        self.vectors.pop(vector.0 as usize)
    }

    /// The newest world in which the length or any element of `vector` was written.
    pub fn vector_last_write_world(&self, vector: ReversibleVector) -> usize {
        self.vectors.max_stamp(vector.0 as usize)
    }

    /// Open a new world.
    pub fn push(&mut self) {
        self.world += 1;
        self.ints.new_checkpoint();
        self.bools.new_checkpoint();
        self.longs.new_checkpoint();
        self.vectors.new_checkpoint();

        trace!("pushed world {}", self.world);
    }

    /// Close the current world, restoring every primitive written in it.
    ///
    /// # Panics
    /// When the store is at the root world; popping past the base of the trail means the caller
    /// lost track of its pushes.
    pub fn pop(&mut self) {
        if self.world == 0 {
            panic!("cannot pop the reversible store below world 0");
        }
        self.restore_to(self.world - 1);
    }

    /// Pop worlds until the store is at `world`.
    ///
    /// # Panics
    /// When `world` is above the current world.
    pub fn restore_to(&mut self, world: usize) {
        if world > self.world {
            panic!(
                "cannot restore the reversible store to world {world} from world {}",
                self.world
            );
        }
        if world == self.world {
            return;
        }

        trace!("restoring world {world} from world {}", self.world);

        self.world = world;
        self.ints.synchronise(world);
        self.bools.synchronise(world);
        self.longs.synchronise(world);
        self.vectors.synchronise(world);
    }

    /// The total number of undo entries currently on the trails.
    pub fn num_trail_entries(&self) -> usize {
        self.ints.num_trail_entries()
            + self.bools.num_trail_entries()
            + self.longs.num_trail_entries()
            + self.vectors.num_trail_entries()
    }

    /// Check that no cell claims to have been written in a world newer than the current one.
    pub(crate) fn check_stamps(&self) {
        backjump_assert_moderate!((0..self.ints.len()).all(|cell| self.ints.stamp(cell) <= self.world));
        backjump_assert_moderate!((0..self.bools.len()).all(|cell| self.bools.stamp(cell) <= self.world));
        backjump_assert_moderate!((0..self.longs.len()).all(|cell| self.longs.stamp(cell) <= self.world));
    }
}

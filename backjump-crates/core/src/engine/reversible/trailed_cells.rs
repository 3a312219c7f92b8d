use crate::basic_types::Trail;

/// The undo information for the first write to a cell within a world.
#[derive(Debug, Clone, Copy)]
struct TrailedChange<Value> {
    cell: usize,
    old_value: Value,
    old_stamp: usize,
}

/// The storage of all reversible cells of one primitive type together with their trail.
///
/// Every cell carries the world in which it was last written. A write in a newer world first
/// saves the old value and stamp on the trail, so that only the first write per world pays for
/// trailing.
#[derive(Debug, Clone)]
pub struct TrailedCells<Value> {
    values: Vec<Value>,
    stamps: Vec<usize>,
    trail: Trail<TrailedChange<Value>>,
}

// Implemented by hand to avoid requiring `Value: Default`.
impl<Value> Default for TrailedCells<Value> {
    fn default() -> Self {
        Self {
            values: Vec::default(),
            stamps: Vec::default(),
            trail: Trail::default(),
        }
    }
}

impl<Value: Copy + PartialEq> TrailedCells<Value> {
    /// Create a new cell. It is stamped with the root world, so the first write in any later
    /// world trails the initial value.
    pub(crate) fn grow(&mut self, initial: Value) -> usize {
        self.values.push(initial);
        self.stamps.push(0);
        self.values.len() - 1
    }

    pub(crate) fn read(&self, cell: usize) -> Value {
        self.values[cell]
    }

    pub(crate) fn stamp(&self, cell: usize) -> usize {
        self.stamps[cell]
    }

    /// Write `value` into `cell`, returning whether the old value had to be trailed.
    pub(crate) fn write(&mut self, cell: usize, value: Value) -> bool {
        if self.values[cell] == value {
            return false;
        }

        let world = self.trail.get_checkpoint();
        let trailed = self.stamps[cell] < world;
        if trailed {
            self.trail.push(TrailedChange {
                cell,
                old_value: self.values[cell],
                old_stamp: self.stamps[cell],
            });
            self.stamps[cell] = world;
        }

        self.values[cell] = value;
        trailed
    }

    pub(crate) fn new_checkpoint(&mut self) {
        self.trail.new_checkpoint();
    }

    pub(crate) fn synchronise(&mut self, world: usize) {
        for change in self.trail.synchronise(world) {
            self.values[change.cell] = change.old_value;
            self.stamps[change.cell] = change.old_stamp;
        }
    }

    pub(crate) fn num_trail_entries(&self) -> usize {
        self.trail.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }
}

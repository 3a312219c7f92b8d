use crate::basic_types::Trail;

#[derive(Debug, Clone, Copy)]
enum VectorChange {
    Element {
        vector: usize,
        index: usize,
        old_value: i32,
        old_stamp: usize,
    },
    Length {
        vector: usize,
        old_len: usize,
        old_stamp: usize,
    },
}

#[derive(Debug, Clone, Default)]
struct VectorData {
    /// May be longer than `len`; the slots beyond it are stale.
    elements: Vec<i32>,
    stamps: Vec<usize>,
    len: usize,
    len_stamp: usize,
}

/// Reversible integer vectors. Both the length and every element follow the write-once-per-world
/// rule of [`TrailedCells`](super::TrailedCells).
#[derive(Debug, Clone, Default)]
pub(crate) struct TrailedVectors {
    vectors: Vec<VectorData>,
    trail: Trail<VectorChange>,
}

impl TrailedVectors {
    pub(crate) fn grow(&mut self, initial: &[i32]) -> usize {
        self.vectors.push(VectorData {
            elements: initial.to_vec(),
            stamps: vec![0; initial.len()],
            len: initial.len(),
            len_stamp: 0,
        });
        self.vectors.len() - 1
    }

    pub(crate) fn len(&self, vector: usize) -> usize {
        self.vectors[vector].len
    }

    pub(crate) fn get(&self, vector: usize, index: usize) -> i32 {
        let data = &self.vectors[vector];
        assert!(
            index < data.len,
            "index {index} out of bounds for reversible vector of length {}",
            data.len
        );
        data.elements[index]
    }

    pub(crate) fn set(&mut self, vector: usize, index: usize, value: i32) {
        assert!(
            index < self.vectors[vector].len,
            "index {index} out of bounds for reversible vector of length {}",
            self.vectors[vector].len
        );
        self.write_element(vector, index, value);
    }

    pub(crate) fn push(&mut self, vector: usize, value: i32) {
        let len = self.vectors[vector].len;
        if len == self.vectors[vector].elements.len() {
            // A fresh slot is invisible once the length is restored, so it needs no trailing.
            // It is stamped with the root world like a freshly created cell.
            let data = &mut self.vectors[vector];
            data.elements.push(value);
            data.stamps.push(0);
        } else {
            self.write_element(vector, len, value);
        }
        self.write_len(vector, len + 1);
    }

    pub(crate) fn pop(&mut self, vector: usize) -> Option<i32> {
        let len = self.vectors[vector].len;
        if len == 0 {
            return None;
        }
        let value = self.vectors[vector].elements[len - 1];
        self.write_len(vector, len - 1);
        Some(value)
    }

    fn write_element(&mut self, vector: usize, index: usize, value: i32) {
        let world = self.trail.get_checkpoint();
        let data = &mut self.vectors[vector];
        if data.elements[index] == value {
            return;
        }

        if data.stamps[index] < world {
            self.trail.push(VectorChange::Element {
                vector,
                index,
                old_value: data.elements[index],
                old_stamp: data.stamps[index],
            });
            data.stamps[index] = world;
        }
        data.elements[index] = value;
    }

    fn write_len(&mut self, vector: usize, len: usize) {
        let world = self.trail.get_checkpoint();
        let data = &mut self.vectors[vector];

        if data.len_stamp < world {
            self.trail.push(VectorChange::Length {
                vector,
                old_len: data.len,
                old_stamp: data.len_stamp,
            });
            data.len_stamp = world;
        }
        data.len = len;
    }

    pub(crate) fn new_checkpoint(&mut self) {
        self.trail.new_checkpoint();
    }

    pub(crate) fn synchronise(&mut self, world: usize) {
        for change in self.trail.synchronise(world) {
            match change {
                VectorChange::Element {
                    vector,
                    index,
                    old_value,
                    old_stamp,
                } => {
                    let data = &mut self.vectors[vector];
                    data.elements[index] = old_value;
                    data.stamps[index] = old_stamp;
                }
                VectorChange::Length {
                    vector,
                    old_len,
                    old_stamp,
                } => {
                    let data = &mut self.vectors[vector];
                    data.len = old_len;
                    data.len_stamp = old_stamp;
                }
            }
        }
    }

    pub(crate) fn num_trail_entries(&self) -> usize {
        self.trail.len()
    }

    pub(crate) fn max_stamp(&self, vector: usize) -> usize {
        let data = &self.vectors[vector];
        data.stamps[..data.len]
            .iter()
            .copied()
            .chain(std::iter::once(data.len_stamp))
            .max()
            .unwrap_or(0)
    }
}

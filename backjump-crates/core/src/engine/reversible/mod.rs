//! The reversible memory model.
//!
//! Every piece of search state which has to be undone on backtracking lives in a
//! [`ReversibleStore`]. The store keeps one trail per primitive type; the first write to a cell in
//! a world records the previous value, later writes in the same world overwrite in place.
mod handles;
mod reversible_store;
mod trailed_cells;
mod trailed_vectors;

pub use handles::*;
pub use reversible_store::ReversibleStore;
pub use trailed_cells::TrailedCells;
pub(crate) use trailed_vectors::TrailedVectors;

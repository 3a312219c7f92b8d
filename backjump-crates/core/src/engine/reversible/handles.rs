use std::fmt::Debug;

use super::ReversibleStore;
use super::TrailedCells;

/// A handle to a reversible primitive cell in a [`ReversibleStore`].
///
/// The handle determines the type of the stored value and the trail it is recorded on.
pub trait ReversibleHandle: Copy + Debug {
    type Value: Copy + PartialEq + Debug;

    #[doc(hidden)]
    fn cell(self) -> usize;

    #[doc(hidden)]
    fn cells(store: &ReversibleStore) -> &TrailedCells<Self::Value>;

    #[doc(hidden)]
    fn cells_mut(store: &mut ReversibleStore) -> &mut TrailedCells<Self::Value>;
}

macro_rules! reversible_handle {
    ($(#[$documentation:meta])* $name:ident, $value:ty, $field:ident) => {
        $(#[$documentation])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) u32);

        impl ReversibleHandle for $name {
            type Value = $value;

            fn cell(self) -> usize {
                self.0 as usize
            }

            fn cells(store: &ReversibleStore) -> &TrailedCells<$value> {
                &store.$field
            }

            fn cells_mut(store: &mut ReversibleStore) -> &mut TrailedCells<$value> {
                &mut store.$field
            }
        }
    };
}

reversible_handle!(
    /// A reversible `i32`.
    ReversibleInt,
    i32,
    ints
);
reversible_handle!(
    /// A reversible `bool`.
    ReversibleBool,
    bool,
    bools
);
reversible_handle!(
    /// A reversible `i64`.
    ReversibleLong,
    i64,
    longs
);

/// A reversible vector of `i32`s; both its length and its elements are restored on backtracking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReversibleVector(pub(crate) u32);

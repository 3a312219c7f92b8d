//! Internal-consistency checks of increasing cost.
//!
//! A failed check means the kernel itself is broken, so the macros abort loudly instead of
//! returning an error. The level below decides which checks are compiled in; the `debug-checks`
//! feature enables all of them.

#[cfg(not(feature = "debug-checks"))]
pub(crate) const BACKJUMP_ASSERT_LEVEL_DEFINITION: u8 = BACKJUMP_ASSERT_SIMPLE;
#[cfg(feature = "debug-checks")]
pub(crate) const BACKJUMP_ASSERT_LEVEL_DEFINITION: u8 = BACKJUMP_ASSERT_EXTREME;

pub(crate) const BACKJUMP_ASSERT_SIMPLE: u8 = 1;
pub(crate) const BACKJUMP_ASSERT_MODERATE: u8 = 2;
pub(crate) const BACKJUMP_ASSERT_ADVANCED: u8 = 3;
pub(crate) const BACKJUMP_ASSERT_EXTREME: u8 = 4;

macro_rules! backjump_assert_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::BACKJUMP_ASSERT_LEVEL_DEFINITION >= $crate::asserts::BACKJUMP_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

macro_rules! backjump_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::asserts::BACKJUMP_ASSERT_LEVEL_DEFINITION >= $crate::asserts::BACKJUMP_ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}

macro_rules! backjump_assert_advanced {
    ($($arg:tt)*) => {
        if $crate::asserts::BACKJUMP_ASSERT_LEVEL_DEFINITION >= $crate::asserts::BACKJUMP_ASSERT_ADVANCED {
            assert!($($arg)*);
        }
    };
}

pub(crate) use backjump_assert_advanced;
pub(crate) use backjump_assert_moderate;
pub(crate) use backjump_assert_simple;

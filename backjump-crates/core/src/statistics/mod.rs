//! Statistics gathered by a [`State`](crate::State) and a
//! [`ConflictAnalyzer`](crate::ConflictAnalyzer).
//!
//! Statistics are owned by the instance which gathers them and are written through the `log`
//! facade (at `info` level) when requested, in the form `{prefix}_{name}={value}`.
mod cumulative_moving_average;
mod statistic_logger;

use std::fmt::Display;
use std::fmt::Write;

pub use cumulative_moving_average::CumulativeMovingAverage;
pub use statistic_logger::StatisticLogger;

/// A value which can be logged through a [`StatisticLogger`].
///
/// See [`create_statistics_struct!`] for creating a struct of statistics.
pub trait Statistic {
    fn log(&self, statistic_logger: StatisticLogger);
}

impl<Value: Display> Statistic for Value {
    fn log(&self, mut statistic_logger: StatisticLogger) {
        // Writing to a statistic logger cannot fail.
        let _ = write!(statistic_logger, "{self}");
    }
}

/// Generate a struct of statistics which logs each of its fields, named after the field.
macro_rules! create_statistics_struct {
    ($(#[$struct_documentation:meta])* $name:ident { $($(#[$variable_documentation:meta])* $field:ident : $type:ident),+ $(,)? }) => {
        $(#[$struct_documentation])*
        #[derive(Default, Debug, Copy, Clone)]
        pub(crate) struct $name {
            $($(#[$variable_documentation])* pub(crate) $field: $type),+
        }

        impl $crate::statistics::Statistic for $name {
            fn log(&self, statistic_logger: $crate::statistics::StatisticLogger) {
                $(self.$field.log(statistic_logger.attach_to_prefix(stringify!($field)));)+
            }
        }
    };
}

pub(crate) use create_statistics_struct;

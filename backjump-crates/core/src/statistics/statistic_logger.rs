use std::fmt::Display;

use convert_case::Case;
use convert_case::Casing;
use log::info;

/// Writes statistics with a name prefix, optionally converting the full name to a [`Case`].
#[derive(Debug, Default, Clone)]
pub struct StatisticLogger {
    name_prefix: String,
    casing: Option<Case>,
}

impl StatisticLogger {
    pub fn new(name_prefix: impl Display) -> Self {
        Self {
            name_prefix: name_prefix.to_string(),
            casing: None,
        }
    }

    /// Convert statistic names to the given casing before they are written.
    pub fn with_casing(mut self, casing: Case) -> Self {
        self.casing = Some(casing);
        self
    }

    pub fn attach_to_prefix(&self, addition_to_prefix: impl Display) -> Self {
        Self {
            name_prefix: format!("{}_{}", self.name_prefix, addition_to_prefix),
            casing: self.casing,
        }
    }

    pub(crate) fn name(&self) -> String {
        match self.casing {
            Some(casing) => self.name_prefix.to_case(casing),
            None => self.name_prefix.clone(),
        }
    }
}

impl std::fmt::Write for StatisticLogger {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        info!("{}={s}", self.name());
        Ok(())
    }
}

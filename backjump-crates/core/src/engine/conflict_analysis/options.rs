#[cfg(doc)]
use crate::engine::conflict_analysis::ConflictAnalyzer;

/// How the [`ConflictAnalyzer`] decides where to jump back to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum BackjumpStrategy {
    /// Undo only the most recent left decision; no explanation is computed.
    Chronological,
    /// Replay the event log to find the decisions which are actually responsible and jump back
    /// to the most recent of those.
    #[default]
    ConflictDirected,
}

impl std::fmt::Display for BackjumpStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackjumpStrategy::Chronological => write!(f, "chronological"),
            BackjumpStrategy::ConflictDirected => write!(f, "conflict-directed"),
        }
    }
}

/// Options of the [`ConflictAnalyzer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExplanationOptions {
    pub strategy: BackjumpStrategy,
    /// Stop the backward scan as soon as every decision from the root up to the current one is
    /// in the reason. Propagators which only contribute further back are then missing from the
    /// causes. Conflicts at the root are always scanned completely.
    pub partial_explanations: bool,
    /// Keep the propagators involved in the reason; only decisions are needed to backjump.
    pub record_causes: bool,
    /// Build a nogood from every conflict and add it to the state.
    pub learn_nogoods: bool,
}

impl Default for ExplanationOptions {
    fn default() -> Self {
        ExplanationOptions {
            strategy: BackjumpStrategy::default(),
            partial_explanations: true,
            record_causes: true,
            learn_nogoods: false,
        }
    }
}

//! Explanation of contradictions and non-chronological backtracking.
//!
//! The [`ConflictAnalyzer`] replays the event log backwards with the help of a [`RuleStore`],
//! collects a [`Reason`] and jumps back to the most recent decision in it. Reasons for refuted
//! decisions are remembered by the [`State`](crate::State) so that later explanations can reuse
//! them. Optionally a [`LearnedClause`] is derived from each conflict and handed to a
//! [`NogoodSink`].
mod conflict_analyzer;
mod learned_clause;
mod options;
mod reason;
mod refutation_memo;
mod rule_store;

pub use conflict_analyzer::ConflictAnalyzer;
pub use conflict_analyzer::ConflictOutcome;
pub use learned_clause::LearnedClause;
pub use learned_clause::LiteralEncoding;
pub use learned_clause::NogoodSink;
pub use options::BackjumpStrategy;
pub use options::ExplanationOptions;
pub use reason::Reason;
pub(crate) use refutation_memo::RefutationMemo;
pub use rule_store::RuleKind;
pub use rule_store::RuleStore;

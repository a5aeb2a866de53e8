//! Criminal-history reconstruction and cannabis relief eligibility.
//!
//! Rows are folded into per-person [`PersonHistory`] values, after which an
//! [`EligibilityFlow`] classifies each relevant conviction into an
//! [`EligibilityInfo`].

pub mod classifier;
pub mod domain;
pub mod eligibility;
pub mod history;
pub mod report;
pub mod run;

#[cfg(test)]
mod tests;

pub use domain::{Conviction, ConvictionRow, CountOrder, EventType, Sentence, SentenceUnit};
pub use eligibility::{
    Determination, EligibilityFlow, EligibilityInfo, EligibilityOptions, FlowCatalog,
    FlowConfigError, Outcome,
};
pub use history::{build_histories, HistoryBuilder, PersonHistory};
pub use report::ReliefSummary;
pub use run::{EvaluationResults, ReliefRun};

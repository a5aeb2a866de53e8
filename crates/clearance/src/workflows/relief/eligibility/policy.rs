use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical outcome of evaluating one conviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Determination {
    Dismissal,
    Reduction,
    NotEligible,
    MaybeEligible,
    /// The flow ran but no branch matched.
    Unclassified,
}

impl Determination {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Dismissal,
            Self::Reduction,
            Self::NotEligible,
            Self::MaybeEligible,
            Self::Unclassified,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dismissal => "Eligible for Dismissal",
            Self::Reduction => "Eligible for Reduction",
            Self::NotEligible => "Not eligible",
            Self::MaybeEligible => "Maybe Eligible - Flag for Review",
            Self::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for Determination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A determination together with the reason that produced it. Only the
/// constructors below can build one, so a classified outcome always has a reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    determination: Determination,
    reason: String,
}

impl Outcome {
    pub fn dismissal(reason: impl Into<String>) -> Self {
        Self::new(Determination::Dismissal, reason)
    }

    pub fn reduction(reason: impl Into<String>) -> Self {
        Self::new(Determination::Reduction, reason)
    }

    pub fn not_eligible(reason: impl Into<String>) -> Self {
        Self::new(Determination::NotEligible, reason)
    }

    pub fn maybe_eligible(reason: impl Into<String>) -> Self {
        Self::new(Determination::MaybeEligible, reason)
    }

    fn new(determination: Determination, reason: impl Into<String>) -> Self {
        Self {
            determination,
            reason: reason.into(),
        }
    }

    pub fn determination(&self) -> Determination {
        self.determination
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub(crate) fn into_parts(self) -> (Determination, String) {
        (self.determination, self.reason)
    }
}

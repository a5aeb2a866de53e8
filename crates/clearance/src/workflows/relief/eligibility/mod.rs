mod catalog;
mod config;
mod info;
mod policy;
mod rules;

pub use catalog::{
    FlowCatalog, CONTRA_COSTA, LOS_ANGELES, SACRAMENTO, SAN_FRANCISCO, SAN_JOAQUIN,
};
pub use config::{
    AdditionalRelief, BaselineEligibility, EligibilityOptions, FlowConfigError,
    AGE_THRESHOLD_RANGE, YEARS_SINCE_CONVICTION_RANGE,
};
pub use info::{years_since, EligibilityInfo};
pub use policy::{Determination, Outcome};
pub use rules::{RecencyMetric, RecencyPolicy, Rule};

use super::classifier;
use super::domain::Conviction;
use super::history::PersonHistory;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Statutory cutoff: convictions on or after this date are outside the relief statute.
pub fn relief_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 11, 9).unwrap_or(NaiveDate::MIN)
}

pub(crate) fn normalize_jurisdiction(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

/// Age below which a conviction counts as a youth conviction.
pub const STATUTORY_AGE: u32 = 21;

/// An ordered decision chain scoped to one jurisdiction. The first rule that
/// produces an outcome decides; if none does the conviction stays unclassified.
#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityFlow {
    name: String,
    jurisdiction: String,
    checks_related_charges: bool,
    rules: Vec<Rule>,
}

impl EligibilityFlow {
    pub fn new(
        name: impl Into<String>,
        jurisdiction: impl Into<String>,
        checks_related_charges: bool,
        rules: Vec<Rule>,
    ) -> Self {
        Self {
            name: name.into(),
            jurisdiction: normalize_jurisdiction(&jurisdiction.into()),
            checks_related_charges,
            rules,
        }
    }

    /// Builds the configurable flow. Out-of-range thresholds and unknown code
    /// sections fail here rather than per record.
    pub fn configurable(
        jurisdiction: impl Into<String>,
        options: &EligibilityOptions,
    ) -> Result<Self, FlowConfigError> {
        let validated = options.validate()?;

        let mut rules = vec![
            Rule::ConvictedBefore(relief_cutoff()),
            Rule::NotFelony,
            Rule::DismissSections(validated.dismiss),
        ];
        if validated.under_21_relief {
            rules.push(Rule::UnderAgeAtConviction(STATUTORY_AGE));
        }
        if validated.age_threshold != 0 {
            rules.push(Rule::AgeAtEvaluation(validated.age_threshold));
        }
        if validated.years_since_conviction_threshold != 0 {
            rules.push(Rule::YearsSinceConviction(
                validated.years_since_conviction_threshold,
            ));
        }
        if validated.only_qualifying_relief {
            rules.push(Rule::OnlyQualifyingCharges);
        }
        rules.push(Rule::ReduceSections(validated.reduce));

        Ok(Self::new("Configurable", jurisdiction, false, rules))
    }

    pub fn dismiss_all_qualifying(jurisdiction: impl Into<String>) -> Self {
        Self::new(
            "Dismiss all 11357-60",
            jurisdiction,
            false,
            vec![Rule::DismissAll {
                include_related: false,
            }],
        )
    }

    pub fn dismiss_all_qualifying_and_related(jurisdiction: impl Into<String>) -> Self {
        Self::new(
            "Dismiss all 11357-60 and related",
            jurisdiction,
            true,
            vec![Rule::DismissAll {
                include_related: true,
            }],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn jurisdiction(&self) -> &str {
        &self.jurisdiction
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn checks_related_charges(&self) -> bool {
        self.checks_related_charges
    }

    pub fn matched_code_section(&self, code: &str) -> Option<String> {
        classifier::qualifying_section(code).map(|section| section.to_string())
    }

    pub fn matched_related_code_section(&self, code: &str) -> Option<String> {
        if !self.checks_related_charges {
            return None;
        }
        classifier::related_section(code)
    }

    /// Whether this flow evaluates the conviction at all.
    pub fn is_relevant(&self, conviction: &Conviction) -> bool {
        if !conviction.row().in_jurisdiction(&self.jurisdiction) {
            return false;
        }
        let code = conviction.code_section();
        classifier::is_qualifying_charge(code)
            || (self.checks_related_charges && classifier::is_related_charge(code))
    }

    pub fn evaluate(
        &self,
        info: &mut EligibilityInfo,
        conviction: &Conviction,
        history: &PersonHistory,
    ) {
        let outcome = self
            .rules
            .iter()
            .find_map(|rule| rule.apply(info, conviction, history));
        if let Some(outcome) = outcome {
            info.record(outcome);
        }
    }

    /// Builds and fills an info for every relevant conviction of a finished history,
    /// keyed by original row index.
    pub fn process_history(
        &self,
        history: &PersonHistory,
        evaluation_date: NaiveDate,
    ) -> BTreeMap<usize, EligibilityInfo> {
        history
            .convictions()
            .iter()
            .filter(|conviction| self.is_relevant(conviction))
            .map(|conviction| {
                let mut info =
                    EligibilityInfo::new(conviction, history, evaluation_date, &self.jurisdiction);
                self.evaluate(&mut info, conviction, history);
                (conviction.row_index(), info)
            })
            .collect()
    }
}

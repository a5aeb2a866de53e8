use super::super::domain::Conviction;
use super::super::history::{years_between, PersonHistory};
use super::policy::{Determination, Outcome};
use chrono::NaiveDate;
use serde::Serialize;

const LIST_SEPARATOR: &str = "; ";
const MISSING_DATE_YEARS: f64 = -1.0;

/// Fact snapshot for one conviction, computed from a finished history before a
/// flow runs. The outcome fields are written once by the flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityInfo {
    pub row_index: usize,
    pub evaluation_date: NaiveDate,
    pub date_of_conviction: Option<NaiveDate>,
    pub convictions_on_record: usize,
    pub qualifying_convictions_in_jurisdiction: usize,
    pub years_since_this_conviction: f64,
    pub years_since_most_recent_conviction: f64,
    pub severe_priors: String,
    pub registration_sections: String,
    pub registration: bool,
    pub deceased: bool,
    pub case_numbers: String,
    determination: Determination,
    reason: String,
}

impl EligibilityInfo {
    pub fn new(
        conviction: &Conviction,
        history: &PersonHistory,
        evaluation_date: NaiveDate,
        jurisdiction: &str,
    ) -> Self {
        let date_of_conviction = conviction.disposition_date();
        let case_prefix = conviction.row().count_order.case();

        Self {
            row_index: conviction.row_index(),
            evaluation_date,
            date_of_conviction,
            convictions_on_record: history.convictions().len(),
            qualifying_convictions_in_jurisdiction: history.qualifying_convictions_in(jurisdiction),
            years_since_this_conviction: years_since(date_of_conviction, evaluation_date),
            years_since_most_recent_conviction: years_since(
                history.most_recent_conviction_date(),
                evaluation_date,
            ),
            severe_priors: history.severe_prior_sections().join(LIST_SEPARATOR),
            registration_sections: history.registration_sections().join(LIST_SEPARATOR),
            registration: history.has_registration_event(),
            deceased: history.is_deceased(),
            case_numbers: history.case_numbers(case_prefix).join(LIST_SEPARATOR),
            determination: Determination::Unclassified,
            reason: String::new(),
        }
    }

    pub fn determination(&self) -> Determination {
        self.determination
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn is_classified(&self) -> bool {
        self.determination != Determination::Unclassified
    }

    pub(crate) fn record(&mut self, outcome: Outcome) {
        let (determination, reason) = outcome.into_parts();
        self.determination = determination;
        self.reason = reason;
    }
}

/// Years between `event` and `as_of`, or -1 when the event has no date.
pub fn years_since(event: Option<NaiveDate>, as_of: NaiveDate) -> f64 {
    event
        .map(|date| years_between(date, as_of))
        .unwrap_or(MISSING_DATE_YEARS)
}

use super::super::eligibility::Determination;
use super::super::history::PersonHistory;
use super::super::run::{EvaluationResults, ReliefRun};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

const RECENT_CONVICTION_YEARS: f64 = 7.0;

/// Aggregate statistics for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReliefSummary {
    pub county: String,
    pub flow: String,
    pub evaluation_date: NaiveDate,
    pub rows: usize,
    pub subjects: usize,
    pub convictions: usize,
    pub qualifying_convictions_in_county: usize,
    pub evaluated_convictions: usize,
    pub determinations: BTreeMap<String, usize>,
    pub reasons: BTreeMap<String, BTreeMap<String, usize>>,
    pub cleared_subjects: usize,
    pub subjects_with_felonies: usize,
    pub subjects_with_recent_convictions: usize,
    pub deceased_subjects: usize,
    pub baseline_dismiss_all_qualifying: usize,
    pub baseline_dismiss_all_qualifying_and_related: usize,
}

impl ReliefSummary {
    pub fn from_run(run: &ReliefRun) -> Self {
        let histories = run.histories();
        let results = run.results();
        let evaluation_date = run.evaluation_date();

        let mut determinations = BTreeMap::new();
        let mut reasons: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for (_, info) in results.iter() {
            let label = info.determination().label().to_string();
            *determinations.entry(label.clone()).or_insert(0) += 1;
            if info.is_classified() {
                *reasons
                    .entry(label)
                    .or_default()
                    .entry(info.reason().to_string())
                    .or_insert(0) += 1;
            }
        }

        Self {
            county: run.county().to_string(),
            flow: results.flow_name().to_string(),
            evaluation_date,
            rows: run.rows().len(),
            subjects: histories.len(),
            convictions: histories
                .iter()
                .map(|history| history.convictions().len())
                .sum(),
            qualifying_convictions_in_county: histories
                .iter()
                .map(|history| history.qualifying_convictions_in(run.county()))
                .sum(),
            evaluated_convictions: results.len(),
            determinations,
            reasons,
            cleared_subjects: histories
                .iter()
                .filter(|history| is_cleared(history, results))
                .count(),
            subjects_with_felonies: histories
                .iter()
                .filter(|history| history.felony_count() > 0)
                .count(),
            subjects_with_recent_convictions: histories
                .iter()
                .filter(|history| {
                    history.convictions_within(RECENT_CONVICTION_YEARS, evaluation_date) > 0
                })
                .count(),
            deceased_subjects: histories
                .iter()
                .filter(|history| history.is_deceased())
                .count(),
            baseline_dismiss_all_qualifying: run
                .dismiss_all_qualifying()
                .count(Determination::Dismissal),
            baseline_dismiss_all_qualifying_and_related: run
                .dismiss_all_qualifying_and_related()
                .count(Determination::Dismissal),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// At least one conviction was evaluated, and every evaluated conviction was
/// dismissed. Convictions outside the flow's scope do not count against it.
fn is_cleared(history: &PersonHistory, results: &EvaluationResults) -> bool {
    let mut evaluated = history
        .convictions()
        .iter()
        .filter_map(|conviction| results.get(conviction.row_index()))
        .peekable();
    evaluated.peek().is_some()
        && evaluated.all(|info| info.determination() == Determination::Dismissal)
}

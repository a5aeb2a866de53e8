use super::domain::ConvictionRow;
use super::eligibility::{Determination, EligibilityFlow, EligibilityInfo};
use super::history::{build_histories, PersonHistory};
use super::report::{self, ReliefSummary};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::{info, warn};

/// Infos produced by one flow over a batch, keyed by original row index. A row
/// with no entry was not evaluated by the flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationResults {
    flow_name: String,
    infos: BTreeMap<usize, EligibilityInfo>,
}

impl EvaluationResults {
    pub fn evaluate(
        histories: &[PersonHistory],
        flow: &EligibilityFlow,
        evaluation_date: NaiveDate,
    ) -> Self {
        let mut infos = BTreeMap::new();
        for history in histories {
            infos.extend(flow.process_history(history, evaluation_date));
        }

        Self {
            flow_name: flow.name().to_string(),
            infos,
        }
    }

    pub fn flow_name(&self) -> &str {
        &self.flow_name
    }

    pub fn get(&self, row_index: usize) -> Option<&EligibilityInfo> {
        self.infos.get(&row_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &EligibilityInfo)> {
        self.infos.iter().map(|(index, info)| (*index, info))
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn count(&self, determination: Determination) -> usize {
        self.infos
            .values()
            .filter(|info| info.determination() == determination)
            .count()
    }
}

/// One batch: rows in, histories built, the selected flow and both dismiss-all
/// baselines evaluated.
#[derive(Debug, Clone)]
pub struct ReliefRun {
    flow: EligibilityFlow,
    county: String,
    evaluation_date: NaiveDate,
    rows: Vec<ConvictionRow>,
    histories: Vec<PersonHistory>,
    results: EvaluationResults,
    dismiss_all_qualifying: EvaluationResults,
    dismiss_all_qualifying_and_related: EvaluationResults,
}

impl ReliefRun {
    pub fn execute(
        rows: Vec<ConvictionRow>,
        flow: &EligibilityFlow,
        evaluation_date: NaiveDate,
    ) -> Self {
        let county = flow.jurisdiction().to_string();
        let histories = build_histories(rows.iter().cloned());
        info!(
            rows = rows.len(),
            subjects = histories.len(),
            county = %county,
            "built criminal histories"
        );

        let results = EvaluationResults::evaluate(&histories, flow, evaluation_date);
        let dismiss_all_qualifying = EvaluationResults::evaluate(
            &histories,
            &EligibilityFlow::dismiss_all_qualifying(&county),
            evaluation_date,
        );
        let dismiss_all_qualifying_and_related = EvaluationResults::evaluate(
            &histories,
            &EligibilityFlow::dismiss_all_qualifying_and_related(&county),
            evaluation_date,
        );
        info!(
            flow = flow.name(),
            evaluated = results.len(),
            dismissed = results.count(Determination::Dismissal),
            reduced = results.count(Determination::Reduction),
            "evaluated convictions"
        );
        if results.is_empty() {
            warn!(county = %county, "no qualifying convictions found in county");
        }

        Self {
            flow: flow.clone(),
            county,
            evaluation_date,
            rows,
            histories,
            results,
            dismiss_all_qualifying,
            dismiss_all_qualifying_and_related,
        }
    }

    pub fn flow(&self) -> &EligibilityFlow {
        &self.flow
    }

    pub fn county(&self) -> &str {
        &self.county
    }

    pub fn evaluation_date(&self) -> NaiveDate {
        self.evaluation_date
    }

    pub fn rows(&self) -> &[ConvictionRow] {
        &self.rows
    }

    pub fn histories(&self) -> &[PersonHistory] {
        &self.histories
    }

    pub fn results(&self) -> &EvaluationResults {
        &self.results
    }

    pub fn dismiss_all_qualifying(&self) -> &EvaluationResults {
        &self.dismiss_all_qualifying
    }

    pub fn dismiss_all_qualifying_and_related(&self) -> &EvaluationResults {
        &self.dismiss_all_qualifying_and_related
    }

    pub fn summary(&self) -> ReliefSummary {
        ReliefSummary::from_run(self)
    }

    /// Writes every input row with eligibility columns appended.
    pub fn write_results<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        report::write_results(writer, &self.rows, &self.results, &self.flow)
    }
}

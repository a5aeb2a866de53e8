use super::super::classifier::{self, QualifyingSection};
use super::super::domain::Conviction;
use super::super::history::PersonHistory;
use super::info::EligibilityInfo;
use super::policy::{Determination, Outcome};
use chrono::NaiveDate;

/// Which recency figure a multi-conviction branch compares against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecencyMetric {
    ThisConviction,
    MostRecentConviction,
    /// This conviction must be old enough first, then the whole record.
    ThisAndMostRecent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyPolicy {
    pub years: u32,
    pub metric: RecencyMetric,
}

impl RecencyPolicy {
    pub const fn new(years: u32, metric: RecencyMetric) -> Self {
        Self { years, metric }
    }

    fn decide(&self, info: &EligibilityInfo) -> Outcome {
        let threshold = f64::from(self.years);
        let years = self.years;
        let record_is_old = || info.years_since_most_recent_conviction > threshold;
        let this_is_old = info.years_since_this_conviction > threshold;

        match self.metric {
            RecencyMetric::ThisConviction if this_is_old => {
                Outcome::dismissal(format!("Conviction occurred more than {years} years ago"))
            }
            RecencyMetric::ThisConviction => {
                Outcome::reduction(format!("Occurred in last {years} years"))
            }
            RecencyMetric::MostRecentConviction if record_is_old() => {
                Outcome::dismissal(format!("No convictions in past {years} years"))
            }
            RecencyMetric::MostRecentConviction => {
                Outcome::reduction(format!("Has convictions in past {years} years"))
            }
            RecencyMetric::ThisAndMostRecent if !this_is_old => {
                Outcome::reduction(format!("Occurred in last {years} years"))
            }
            RecencyMetric::ThisAndMostRecent if record_is_old() => {
                Outcome::dismissal(format!("No convictions in past {years} years"))
            }
            RecencyMetric::ThisAndMostRecent => {
                Outcome::reduction(format!("Has convictions in past {years} years"))
            }
        }
    }
}

/// One predicate/action pair of a decision chain. A rule either produces an
/// outcome, ending the chain, or passes.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Conviction on or after the cutoff date is not eligible.
    ConvictedBefore(NaiveDate),
    SeverePrior,
    RegistrationOffense,
    NotFelony,
    /// Baseline used for comparison: every matching conviction is dismissed.
    DismissAll { include_related: bool },
    DismissSections(Vec<QualifyingSection>),
    UnderAgeAtConviction(u32),
    AgeAtEvaluation(u32),
    YearsSinceConviction(u32),
    OnlyQualifyingCharges,
    ReduceSections(Vec<QualifyingSection>),
    /// Applies only when this is the sole conviction on record.
    SentenceCompletion,
    /// Applies only when there is more than one conviction on record.
    Recency(RecencyPolicy),
    /// Applies only to related, non-qualifying charges.
    RelatedCharge {
        exception: String,
        recency: RecencyPolicy,
    },
}

impl Rule {
    pub(crate) fn apply(
        &self,
        info: &EligibilityInfo,
        conviction: &Conviction,
        history: &PersonHistory,
    ) -> Option<Outcome> {
        match self {
            Rule::ConvictedBefore(cutoff) => match info.date_of_conviction {
                Some(date) if date >= *cutoff => Some(Outcome::not_eligible(format!(
                    "Occurred after {}",
                    cutoff.format("%m/%d/%Y")
                ))),
                _ => None,
            },
            Rule::SeverePrior => (!info.severe_priors.is_empty())
                .then(|| Outcome::not_eligible("PC 667(e)(2)(c)(iv)")),
            Rule::RegistrationOffense => {
                (info.registration || !info.registration_sections.is_empty())
                    .then(|| Outcome::not_eligible("PC 290"))
            }
            Rule::NotFelony => {
                (!conviction.is_felony()).then(|| Outcome::dismissal("Misdemeanor or Infraction"))
            }
            Rule::DismissAll { include_related } => {
                let code = conviction.code_section();
                if classifier::is_qualifying_charge(code) {
                    Some(Outcome::dismissal("Dismiss all 11357-60 convictions"))
                } else if *include_related && classifier::is_related_charge(code) {
                    Some(Outcome::dismissal("Dismiss all 11357-60 and related convictions"))
                } else {
                    None
                }
            }
            Rule::DismissSections(sections) => sections
                .iter()
                .find(|section| section.matches(conviction.code_section()))
                .map(|section| Outcome::dismissal(format!("Dismiss all HS {section} convictions"))),
            Rule::UnderAgeAtConviction(age) => {
                let at_conviction = conviction
                    .disposition_date()
                    .and_then(|date| history.age_at(date))?;
                (at_conviction < *age).then(|| {
                    Outcome::dismissal(format!("Under {age} years old at time of conviction"))
                })
            }
            Rule::AgeAtEvaluation(threshold) => {
                let age = history.age_at(info.evaluation_date)?;
                (age >= *threshold)
                    .then(|| Outcome::dismissal(format!("{threshold} years or older")))
            }
            Rule::YearsSinceConviction(threshold) => {
                (info.years_since_this_conviction >= f64::from(*threshold)).then(|| {
                    Outcome::dismissal(format!(
                        "Conviction occurred {threshold} or more years ago"
                    ))
                })
            }
            Rule::OnlyQualifyingCharges => history
                .only_qualifying_convictions()
                .then(|| Outcome::dismissal("Individual's record only has 11357-60 charges")),
            Rule::ReduceSections(sections) => sections
                .iter()
                .find(|section| section.matches(conviction.code_section()))
                .map(|section| Outcome::reduction(format!("Reduce all HS {section} convictions"))),
            Rule::SentenceCompletion => {
                if info.convictions_on_record > 1 {
                    return None;
                }
                let completed = conviction
                    .sentence_end()
                    .map_or(true, |end| end < info.evaluation_date);
                Some(if completed {
                    Outcome::dismissal("Sentence completed")
                } else {
                    Outcome::reduction("Sentence not completed")
                })
            }
            Rule::Recency(policy) => {
                (info.convictions_on_record > 1).then(|| policy.decide(info))
            }
            Rule::RelatedCharge { exception, recency } => {
                let code = conviction.code_section();
                if !classifier::is_related_charge(code) || classifier::is_qualifying_charge(code) {
                    return None;
                }
                if !conviction.has_qualifying_charge_in_cycle() {
                    return Some(Outcome::not_eligible("No 11357-60 charge in cycle"));
                }
                if classifier::same_section(code, exception) {
                    return Some(Outcome::maybe_eligible(format!(
                        "{exception} charge requires review"
                    )));
                }
                let outcome = recency.decide(info);
                Some(match outcome.determination() {
                    Determination::Reduction => Outcome::maybe_eligible(outcome.reason()),
                    _ => outcome,
                })
            }
        }
    }
}

use super::config::{EligibilityOptions, FlowConfigError};
use super::rules::{RecencyMetric, RecencyPolicy, Rule};
use super::super::classifier::QualifyingSection;
use super::{normalize_jurisdiction, relief_cutoff, EligibilityFlow};
use std::collections::BTreeMap;

pub const SAN_FRANCISCO: &str = "SAN FRANCISCO";
pub const LOS_ANGELES: &str = "LOS ANGELES";
pub const CONTRA_COSTA: &str = "CONTRA COSTA";
pub const SACRAMENTO: &str = "SACRAMENTO";
pub const SAN_JOAQUIN: &str = "SAN JOAQUIN";

const RELATED_CHARGE_EXCEPTION: &str = "4060 BP";

/// Explicit jurisdiction → flow map handed to the evaluator.
#[derive(Debug, Clone, Default)]
pub struct FlowCatalog {
    flows: BTreeMap<String, EligibilityFlow>,
}

impl FlowCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in county presets.
    pub fn standard() -> Self {
        let mut catalog = Self::empty();
        catalog.insert(san_francisco());
        catalog.insert(los_angeles());
        catalog.insert(contra_costa());
        catalog.insert(sacramento());
        catalog.insert(san_joaquin());
        catalog
    }

    /// Registers a flow under its jurisdiction, replacing any previous one.
    pub fn insert(&mut self, flow: EligibilityFlow) {
        self.flows.insert(flow.jurisdiction().to_string(), flow);
    }

    pub fn get(&self, jurisdiction: &str) -> Option<&EligibilityFlow> {
        self.flows.get(&normalize_jurisdiction(jurisdiction))
    }

    pub fn jurisdictions(&self) -> impl Iterator<Item = &str> {
        self.flows.keys().map(String::as_str)
    }

    /// Picks the flow for a county: the configurable flow when options are given,
    /// otherwise the registered preset.
    pub fn resolve(
        &self,
        jurisdiction: &str,
        options: Option<&EligibilityOptions>,
    ) -> Result<EligibilityFlow, FlowConfigError> {
        match options {
            Some(options) => EligibilityFlow::configurable(jurisdiction, options),
            None => self
                .get(jurisdiction)
                .cloned()
                .ok_or_else(|| FlowConfigError::UnknownJurisdiction(jurisdiction.to_string())),
        }
    }
}

fn canonical_tail(always_dismiss: &[&str], recency: RecencyPolicy) -> Vec<Rule> {
    vec![
        Rule::NotFelony,
        Rule::DismissSections(
            always_dismiss
                .iter()
                .filter_map(|label| QualifyingSection::parse(label))
                .collect(),
        ),
        Rule::SentenceCompletion,
        Rule::Recency(recency),
    ]
}

fn san_francisco() -> EligibilityFlow {
    let mut rules = vec![Rule::ConvictedBefore(relief_cutoff())];
    rules.extend(canonical_tail(
        &["11357"],
        RecencyPolicy::new(10, RecencyMetric::ThisAndMostRecent),
    ));
    EligibilityFlow::new("San Francisco", SAN_FRANCISCO, false, rules)
}

fn los_angeles() -> EligibilityFlow {
    let mut rules = vec![
        Rule::ConvictedBefore(relief_cutoff()),
        Rule::SeverePrior,
        Rule::RegistrationOffense,
    ];
    rules.extend(canonical_tail(
        &["11357"],
        RecencyPolicy::new(10, RecencyMetric::ThisAndMostRecent),
    ));
    EligibilityFlow::new("Los Angeles", LOS_ANGELES, false, rules)
}

fn contra_costa() -> EligibilityFlow {
    let recency = RecencyPolicy::new(10, RecencyMetric::ThisAndMostRecent);
    let mut rules = vec![
        Rule::ConvictedBefore(relief_cutoff()),
        Rule::RelatedCharge {
            exception: RELATED_CHARGE_EXCEPTION.to_string(),
            recency,
        },
    ];
    rules.extend(canonical_tail(&["11357"], recency));
    EligibilityFlow::new("Contra Costa", CONTRA_COSTA, true, rules)
}

fn sacramento() -> EligibilityFlow {
    let mut rules = vec![Rule::ConvictedBefore(relief_cutoff())];
    rules.extend(canonical_tail(
        &["11357"],
        RecencyPolicy::new(5, RecencyMetric::MostRecentConviction),
    ));
    EligibilityFlow::new("Sacramento", SACRAMENTO, false, rules)
}

fn san_joaquin() -> EligibilityFlow {
    let mut rules = vec![Rule::ConvictedBefore(relief_cutoff())];
    rules.extend(canonical_tail(
        &["11357(A)", "11357(B)"],
        RecencyPolicy::new(10, RecencyMetric::ThisConviction),
    ));
    EligibilityFlow::new("San Joaquin", SAN_JOAQUIN, false, rules)
}

use super::super::classifier::QualifyingSection;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::ops::RangeInclusive;
use std::path::Path;

pub const AGE_THRESHOLD_RANGE: RangeInclusive<u32> = 40..=65;
pub const YEARS_SINCE_CONVICTION_RANGE: RangeInclusive<u32> = 1..=15;

/// Fatal configuration problems raised while building a flow.
#[derive(Debug, thiserror::Error)]
pub enum FlowConfigError {
    #[error("subject age threshold must be 0 or between 40 and 65 (found {0})")]
    AgeThresholdOutOfRange(u32),
    #[error("years since conviction threshold must be 0 or between 1 and 15 (found {0})")]
    YearsSinceConvictionOutOfRange(u32),
    #[error("'{0}' is not an HS 11357-11360 code section")]
    UnknownCodeSection(String),
    #[error("no eligibility flow is configured for jurisdiction '{0}'")]
    UnknownJurisdiction(String),
    #[error("failed to read eligibility options: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid eligibility options: {0}")]
    Json(#[from] serde_json::Error),
}

/// Caller-supplied policy for the configurable flow, in the JSON shape of the
/// options file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityOptions {
    #[serde(default)]
    pub baseline_eligibility: BaselineEligibility,
    #[serde(default)]
    pub additional_relief: AdditionalRelief,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineEligibility {
    #[serde(default, alias = "dismissList")]
    pub dismiss: Vec<String>,
    #[serde(default, alias = "reduceList")]
    pub reduce: Vec<String>,
}

/// Additional relief toggles. A threshold of zero disables its rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalRelief {
    #[serde(default, alias = "underAgeRelief")]
    pub subject_under_21_at_conviction: bool,
    #[serde(default, alias = "ageThreshold")]
    pub subject_age_threshold: u32,
    #[serde(default)]
    pub years_since_conviction_threshold: u32,
    #[serde(default, alias = "onlyQualifyingChargesRelief")]
    pub subject_has_only_prop64_charges: bool,
}

impl EligibilityOptions {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FlowConfigError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FlowConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Checks thresholds and resolves the section lists.
    pub(crate) fn validate(&self) -> Result<ValidatedOptions, FlowConfigError> {
        let relief = &self.additional_relief;

        let age = relief.subject_age_threshold;
        if age != 0 && !AGE_THRESHOLD_RANGE.contains(&age) {
            return Err(FlowConfigError::AgeThresholdOutOfRange(age));
        }

        let years = relief.years_since_conviction_threshold;
        if years != 0 && !YEARS_SINCE_CONVICTION_RANGE.contains(&years) {
            return Err(FlowConfigError::YearsSinceConvictionOutOfRange(years));
        }

        Ok(ValidatedOptions {
            dismiss: parse_sections(&self.baseline_eligibility.dismiss)?,
            reduce: parse_sections(&self.baseline_eligibility.reduce)?,
            under_21_relief: relief.subject_under_21_at_conviction,
            age_threshold: age,
            years_since_conviction_threshold: years,
            only_qualifying_relief: relief.subject_has_only_prop64_charges,
        })
    }
}

pub(crate) struct ValidatedOptions {
    pub dismiss: Vec<QualifyingSection>,
    pub reduce: Vec<QualifyingSection>,
    pub under_21_relief: bool,
    pub age_threshold: u32,
    pub years_since_conviction_threshold: u32,
    pub only_qualifying_relief: bool,
}

fn parse_sections(labels: &[String]) -> Result<Vec<QualifyingSection>, FlowConfigError> {
    labels
        .iter()
        .map(|label| {
            QualifyingSection::parse(label)
                .ok_or_else(|| FlowConfigError::UnknownCodeSection(label.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn options_parse_from_json() {
        let json = r#"{
            "baselineEligibility": { "dismiss": ["11357(a)", "11358"], "reduce": ["11359"] },
            "additionalRelief": {
                "subjectUnder21AtConviction": true,
                "subjectAgeThreshold": 50,
                "yearsSinceConvictionThreshold": 5,
                "subjectHasOnlyProp64Charges": true
            }
        }"#;
        let options = EligibilityOptions::from_reader(Cursor::new(json)).expect("options parse");

        assert_eq!(options.baseline_eligibility.dismiss, vec!["11357(a)", "11358"]);
        assert!(options.additional_relief.subject_under_21_at_conviction);
        assert_eq!(options.additional_relief.subject_age_threshold, 50);

        let validated = options.validate().expect("options valid");
        assert_eq!(validated.dismiss[0].to_string(), "11357(A)");
        assert_eq!(validated.reduce[0].to_string(), "11359");
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let options =
            EligibilityOptions::from_reader(Cursor::new("{}")).expect("empty options parse");
        assert_eq!(options, EligibilityOptions::default());
    }

    #[test]
    fn thresholds_outside_range_are_rejected() {
        let mut options = EligibilityOptions::default();
        options.additional_relief.subject_age_threshold = 39;
        assert!(matches!(
            options.validate(),
            Err(FlowConfigError::AgeThresholdOutOfRange(39))
        ));

        options.additional_relief.subject_age_threshold = 65;
        options.additional_relief.years_since_conviction_threshold = 16;
        assert!(matches!(
            options.validate(),
            Err(FlowConfigError::YearsSinceConvictionOutOfRange(16))
        ));
    }

    #[test]
    fn unknown_sections_are_rejected() {
        let mut options = EligibilityOptions::default();
        options.baseline_eligibility.reduce = vec!["11377".to_string()];
        match options.validate() {
            Err(FlowConfigError::UnknownCodeSection(label)) => assert_eq!(label, "11377"),
            Err(other) => panic!("expected unknown section, got {other:?}"),
            Ok(_) => panic!("expected unknown section error"),
        }
    }
}

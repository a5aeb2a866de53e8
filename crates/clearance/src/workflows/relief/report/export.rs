use super::super::domain::ConvictionRow;
use super::super::eligibility::{EligibilityFlow, EligibilityInfo};
use super::super::run::EvaluationResults;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ResultRecord<'a> {
    #[serde(rename = "Row")]
    row: usize,
    #[serde(rename = "CII_NUMBER")]
    person_id: &'a str,
    #[serde(rename = "NAME")]
    name: &'a str,
    #[serde(rename = "DOB")]
    date_of_birth: String,
    #[serde(rename = "CNT_ORDER")]
    count_order: &'a str,
    #[serde(rename = "STP_TYPE_DESCR")]
    event: &'a str,
    #[serde(rename = "STP_ORI_CNTY_NAME")]
    county: &'a str,
    #[serde(rename = "Convicted")]
    convicted: bool,
    #[serde(rename = "DISP_DATE")]
    disposition_date: String,
    #[serde(rename = "OFFENSE_DESCR")]
    code_section: &'a str,
    #[serde(rename = "Felony")]
    felony: bool,
    #[serde(rename = "FE_NUM")]
    filing_number: &'a str,
    #[serde(rename = "SENT_LENGTH")]
    sentence_length: Option<u32>,
    #[serde(rename = "SENT_TIME_CODE")]
    sentence_unit: Option<&'static str>,
    #[serde(rename = "Qualifying Charge")]
    qualifying_charge: Option<String>,
    #[serde(rename = "Convictions On Record")]
    convictions_on_record: Option<usize>,
    #[serde(rename = "Qualifying Convictions In County")]
    qualifying_convictions: Option<usize>,
    #[serde(rename = "Years Since This Conviction")]
    years_since_this: Option<String>,
    #[serde(rename = "Years Since Most Recent Conviction")]
    years_since_most_recent: Option<String>,
    #[serde(rename = "Superstrikes")]
    severe_priors: Option<&'a str>,
    #[serde(rename = "PC290 Code Sections")]
    registration_sections: Option<&'a str>,
    #[serde(rename = "PC290 Registration")]
    registration: Option<bool>,
    #[serde(rename = "Deceased")]
    deceased: Option<bool>,
    #[serde(rename = "Case Numbers")]
    case_numbers: Option<&'a str>,
    #[serde(rename = "Eligibility Determination")]
    determination: Option<&'static str>,
    #[serde(rename = "Eligibility Reason")]
    reason: Option<&'a str>,
}

impl<'a> ResultRecord<'a> {
    fn new(
        row: &'a ConvictionRow,
        info: Option<&'a EligibilityInfo>,
        flow: &EligibilityFlow,
    ) -> Self {
        let qualifying_charge = info.and_then(|_| {
            flow.matched_code_section(&row.code_section)
                .or_else(|| flow.matched_related_code_section(&row.code_section))
        });

        Self {
            row: row.row_index,
            person_id: &row.person_id,
            name: &row.name,
            date_of_birth: format_date(row.date_of_birth),
            count_order: row.count_order.as_str(),
            event: row.event.label(),
            county: &row.jurisdiction,
            convicted: row.convicted,
            disposition_date: format_date(row.disposition_date),
            code_section: &row.code_section,
            felony: row.felony,
            filing_number: &row.filing_number,
            sentence_length: row.sentence.map(|sentence| sentence.length),
            sentence_unit: row.sentence.map(|sentence| sentence.unit.code()),
            qualifying_charge,
            convictions_on_record: info.map(|info| info.convictions_on_record),
            qualifying_convictions: info.map(|info| info.qualifying_convictions_in_jurisdiction),
            years_since_this: info.map(|info| format_years(info.years_since_this_conviction)),
            years_since_most_recent: info
                .map(|info| format_years(info.years_since_most_recent_conviction)),
            severe_priors: info.map(|info| info.severe_priors.as_str()),
            registration_sections: info.map(|info| info.registration_sections.as_str()),
            registration: info.map(|info| info.registration),
            deceased: info.map(|info| info.deceased),
            case_numbers: info.map(|info| info.case_numbers.as_str()),
            determination: info.map(|info| info.determination().label()),
            reason: info.map(EligibilityInfo::reason),
        }
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|value| value.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn format_years(years: f64) -> String {
    format!("{years:.2}")
}

/// Writes the rows in their original order with eligibility columns appended.
/// Rows the flow did not evaluate keep the eligibility columns empty; evaluated
/// rows no branch classified are labelled `Unclassified`.
pub fn write_results<W: Write>(
    writer: W,
    rows: &[ConvictionRow],
    results: &EvaluationResults,
    flow: &EligibilityFlow,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        let record = ResultRecord::new(row, results.get(row.row_index), flow);
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

use super::normalizer::{self, normalize_text};
use crate::workflows::relief::domain::{ConvictionRow, CountOrder, EventType, Sentence};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use tracing::warn;

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<ConvictionRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut records = Vec::new();

    for (row_index, record) in csv_reader.deserialize::<ExtractRow>().enumerate() {
        let row = record?;
        records.push(row.into_conviction_row(row_index));
    }

    Ok(records)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExtractRow {
    #[serde(rename = "CII_NUMBER")]
    person_id: String,
    #[serde(rename = "NAME")]
    name: String,
    #[serde(rename = "DOB")]
    date_of_birth: String,
    #[serde(rename = "CNT_ORDER")]
    count_order: String,
    #[serde(rename = "STP_TYPE_DESCR")]
    event: String,
    #[serde(rename = "STP_ORI_CNTY_NAME")]
    county: String,
    #[serde(rename = "DISP_DESCR")]
    disposition: String,
    #[serde(rename = "DISP_DATE")]
    disposition_date: String,
    #[serde(rename = "OFFENSE_DESCR")]
    offense: String,
    #[serde(rename = "OFFENSE_TOC")]
    offense_toc: String,
    #[serde(rename = "FE_NUM")]
    filing_number: String,
    #[serde(rename = "SENT_LENGTH")]
    sentence_length: String,
    #[serde(rename = "SENT_TIME_CODE")]
    sentence_unit: String,
    #[serde(rename = "COMMENT_TEXT")]
    comment: String,
}

impl ExtractRow {
    fn into_conviction_row(self, row_index: usize) -> ConvictionRow {
        let date_of_birth = parse_logged_date("DOB", &self.date_of_birth, row_index);
        let disposition_date = parse_logged_date("DISP_DATE", &self.disposition_date, row_index);

        ConvictionRow {
            row_index,
            person_id: self.person_id.trim().to_string(),
            name: normalize_text(&self.name),
            date_of_birth,
            code_section: normalizer::code_section(&self.offense, &self.comment),
            disposition_date,
            filing_number: self.filing_number.trim().to_string(),
            event: EventType::parse(&self.event),
            jurisdiction: normalize_text(&self.county).to_ascii_uppercase(),
            felony: normalizer::is_felony(&self.offense_toc),
            convicted: normalizer::is_convicted(&self.disposition),
            count_order: CountOrder::new(self.count_order.as_str()),
            sentence: parse_logged_sentence(&self.sentence_length, &self.sentence_unit, row_index),
        }
    }
}

fn parse_logged_date(column: &str, value: &str, row_index: usize) -> Option<NaiveDate> {
    let parsed = normalizer::parse_date(value);
    if parsed.is_none() && !value.trim().is_empty() {
        warn!(row_index, column, value, "unparseable date treated as missing");
    }
    parsed
}

fn parse_logged_sentence(length: &str, unit: &str, row_index: usize) -> Option<Sentence> {
    let parsed = normalizer::sentence(length, unit);
    let blank = length.trim().is_empty() || length.trim() == "0";
    if parsed.is_none() && !blank {
        warn!(row_index, length, unit, "unusable sentence treated as zero");
    }
    parsed
}

use chrono::NaiveDate;

use crate::workflows::relief::domain::{
    ConvictionRow, CountOrder, EventType, Sentence, SentenceUnit,
};
use crate::workflows::relief::eligibility::{EligibilityFlow, EligibilityInfo};
use crate::workflows::relief::history::{build_histories, PersonHistory};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn evaluation_date() -> NaiveDate {
    date(2019, 6, 1)
}

/// Builder over a convicted, misdemeanor court-action row in San Francisco.
pub(super) struct RowBuilder {
    row: ConvictionRow,
}

pub(super) fn row(index: usize, count_order: &str, code: &str) -> RowBuilder {
    RowBuilder {
        row: ConvictionRow {
            row_index: index,
            person_id: "CII-1".to_string(),
            name: "DOE, JANE".to_string(),
            date_of_birth: Some(date(1980, 1, 15)),
            code_section: code.to_string(),
            disposition_date: Some(date(2010, 3, 1)),
            filing_number: String::new(),
            event: EventType::CourtAction,
            jurisdiction: "SAN FRANCISCO".to_string(),
            felony: false,
            convicted: true,
            count_order: CountOrder::new(count_order),
            sentence: None,
        },
    }
}

impl RowBuilder {
    pub(super) fn person(mut self, person_id: &str) -> Self {
        self.row.person_id = person_id.to_string();
        self
    }

    pub(super) fn born(mut self, date_of_birth: Option<NaiveDate>) -> Self {
        self.row.date_of_birth = date_of_birth;
        self
    }

    pub(super) fn on(mut self, disposition_date: Option<NaiveDate>) -> Self {
        self.row.disposition_date = disposition_date;
        self
    }

    pub(super) fn county(mut self, county: &str) -> Self {
        self.row.jurisdiction = county.to_string();
        self
    }

    pub(super) fn felony(mut self) -> Self {
        self.row.felony = true;
        self
    }

    pub(super) fn not_convicted(mut self) -> Self {
        self.row.convicted = false;
        self
    }

    pub(super) fn event(mut self, event: EventType) -> Self {
        self.row.event = event;
        self
    }

    pub(super) fn filing(mut self, filing_number: &str) -> Self {
        self.row.filing_number = filing_number.to_string();
        self
    }

    pub(super) fn sentence(mut self, length: u32, unit: SentenceUnit) -> Self {
        self.row.sentence = Some(Sentence { length, unit });
        self
    }

    pub(super) fn build(self) -> ConvictionRow {
        self.row
    }
}

pub(super) fn single_history(rows: Vec<ConvictionRow>) -> PersonHistory {
    let mut histories = build_histories(rows);
    assert_eq!(histories.len(), 1, "expected one person");
    histories.remove(0)
}

pub(super) fn evaluate(
    flow: &EligibilityFlow,
    rows: Vec<ConvictionRow>,
    evaluation_date: NaiveDate,
) -> Vec<EligibilityInfo> {
    build_histories(rows)
        .iter()
        .flat_map(|history| flow.process_history(history, evaluation_date).into_values())
        .collect()
}

pub(super) fn info_for(infos: &[EligibilityInfo], row_index: usize) -> &EligibilityInfo {
    infos
        .iter()
        .find(|info| info.row_index == row_index)
        .unwrap_or_else(|| panic!("row {row_index} was not evaluated"))
}

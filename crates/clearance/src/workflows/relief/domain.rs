use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

const CYCLE_PREFIX_LEN: usize = 3;
const CASE_PREFIX_LEN: usize = 6;

/// Fixed-width hierarchical count key. The first three characters identify the
/// arrest cycle, the first six the court case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CountOrder(String);

impl CountOrder {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn cycle(&self) -> &str {
        prefix(&self.0, CYCLE_PREFIX_LEN)
    }

    pub fn case(&self) -> &str {
        prefix(&self.0, CASE_PREFIX_LEN)
    }
}

impl fmt::Display for CountOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn prefix(value: &str, len: usize) -> &str {
    match value.char_indices().nth(len) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// Step type recorded on an extract row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    CourtAction,
    Deceased,
    Registration,
    Other(String),
}

impl EventType {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "COURT ACTION" => Self::CourtAction,
            "DECEASED" => Self::Deceased,
            "REGISTRATION" => Self::Registration,
            _ => Self::Other(normalized),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::CourtAction => "COURT ACTION",
            Self::Deceased => "DECEASED",
            Self::Registration => "REGISTRATION",
            Self::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentenceUnit {
    Days,
    Months,
    Years,
}

impl SentenceUnit {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "D" | "DAY" | "DAYS" => Some(Self::Days),
            "M" | "MO" | "MONTH" | "MONTHS" => Some(Self::Months),
            "Y" | "YR" | "YEAR" | "YEARS" => Some(Self::Years),
            _ => None,
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Days => "D",
            Self::Months => "M",
            Self::Years => "Y",
        }
    }

    const fn days(self) -> i64 {
        match self {
            Self::Days => 1,
            Self::Months => 30,
            Self::Years => 365,
        }
    }
}

/// One sentence segment as recorded on a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub length: u32,
    pub unit: SentenceUnit,
}

impl Sentence {
    /// `None` when the day count cannot be represented.
    pub fn checked_duration(&self) -> Option<Duration> {
        i64::from(self.length)
            .checked_mul(self.unit.days())
            .and_then(Duration::try_days)
    }

    /// Out-of-range sentences count as zero.
    pub fn duration(&self) -> Duration {
        self.checked_duration().unwrap_or_else(Duration::zero)
    }
}

/// Typed extract row. Immutable once normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvictionRow {
    pub row_index: usize,
    pub person_id: String,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub code_section: String,
    pub disposition_date: Option<NaiveDate>,
    pub filing_number: String,
    pub event: EventType,
    pub jurisdiction: String,
    pub felony: bool,
    pub convicted: bool,
    pub count_order: CountOrder,
    pub sentence: Option<Sentence>,
}

impl ConvictionRow {
    pub fn sentence_part(&self) -> Duration {
        self.sentence
            .map(|sentence| sentence.duration())
            .unwrap_or_else(Duration::zero)
    }

    pub fn in_jurisdiction(&self, jurisdiction: &str) -> bool {
        self.jurisdiction
            .trim()
            .eq_ignore_ascii_case(jurisdiction.trim())
    }
}

/// Sentence ends past the calendar range clamp to the last representable date.
fn add_saturating(date: NaiveDate, part: Duration) -> NaiveDate {
    date.checked_add_signed(part).unwrap_or(NaiveDate::MAX)
}

/// A conviction owned by a person history. Sentence end and cycle flag are the
/// only parts that change after the row is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conviction {
    row: ConvictionRow,
    sentence_end: Option<NaiveDate>,
    has_qualifying_charge_in_cycle: bool,
}

impl Conviction {
    pub(crate) fn new(row: ConvictionRow, has_qualifying_charge_in_cycle: bool) -> Self {
        let sentence_end = row
            .disposition_date
            .map(|date| add_saturating(date, row.sentence_part()));
        Self {
            row,
            sentence_end,
            has_qualifying_charge_in_cycle,
        }
    }

    pub(crate) fn extend_sentence(&mut self, part: Duration) {
        self.sentence_end = self
            .sentence_end
            .map(|end| add_saturating(end, part));
    }

    pub(crate) fn mark_qualifying_cycle(&mut self) {
        self.has_qualifying_charge_in_cycle = true;
    }

    pub fn row(&self) -> &ConvictionRow {
        &self.row
    }

    pub fn row_index(&self) -> usize {
        self.row.row_index
    }

    pub fn code_section(&self) -> &str {
        &self.row.code_section
    }

    pub fn disposition_date(&self) -> Option<NaiveDate> {
        self.row.disposition_date
    }

    pub fn is_felony(&self) -> bool {
        self.row.felony
    }

    pub fn sentence_end(&self) -> Option<NaiveDate> {
        self.sentence_end
    }

    pub fn has_qualifying_charge_in_cycle(&self) -> bool {
        self.has_qualifying_charge_in_cycle
    }
}

use crate::workflows::relief::domain::{Sentence, SentenceUnit};
use chrono::NaiveDate;

const DATE_FORMATS: &[&str] = &["%Y%m%d", "%Y-%m-%d", "%m/%d/%Y"];

pub(crate) fn normalize_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses the extract's date formats. Anything else is treated as "no date".
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Code section from the offense description with its trailing text removed, or
/// from a `CHARGE:` note in the comment when the description is blank.
pub(crate) fn code_section(offense: &str, comment: &str) -> String {
    let offense = normalize_text(offense);
    if !offense.is_empty() {
        return section_before_description(&offense);
    }

    let comment = normalize_text(comment).to_ascii_uppercase();
    match comment.find("CHARGE:") {
        Some(idx) => section_before_description(comment[idx + "CHARGE:".len()..].trim()),
        None => String::new(),
    }
}

/// Cuts at the first dash whose next non-blank character is a letter, so
/// `664-187 PC` keeps its dash and `11357 HS-POSS` loses the description.
fn section_before_description(value: &str) -> String {
    let upper = value.to_ascii_uppercase();
    let cut = upper.char_indices().find_map(|(idx, ch)| {
        let starts_description = ch == '-'
            && upper[idx + 1..]
                .trim_start()
                .starts_with(|next: char| next.is_ascii_alphabetic());
        starts_description.then_some(idx)
    });

    match cut {
        Some(idx) => upper[..idx].trim().to_string(),
        None => upper.trim().to_string(),
    }
}

pub(crate) fn is_convicted(disposition: &str) -> bool {
    normalize_text(disposition)
        .to_ascii_uppercase()
        .starts_with("CONVICTED")
}

pub(crate) fn is_felony(offense_toc: &str) -> bool {
    offense_toc.trim().eq_ignore_ascii_case("F")
}

/// Sentence segment from the length and unit columns. A zero, missing,
/// unreadable or out-of-range length yields no segment.
pub(crate) fn sentence(length: &str, unit: &str) -> Option<Sentence> {
    let length = length.trim().parse::<u32>().ok().filter(|value| *value > 0)?;
    let unit = SentenceUnit::parse(unit)?;
    let sentence = Sentence { length, unit };
    sentence.checked_duration().map(|_| sentence)
}

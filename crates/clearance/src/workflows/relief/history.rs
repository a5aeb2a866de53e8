use super::classifier;
use super::domain::{Conviction, ConvictionRow, CountOrder, EventType};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

const DAYS_PER_YEAR: f64 = 365.25;

/// Fractional years between two dates, measured in 365.25-day years.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> f64 {
    let hours = to.signed_duration_since(from).num_hours() as f64;
    hours / (24.0 * DAYS_PER_YEAR)
}

/// Streaming fold over one person's rows. Rows must be pushed in file order.
///
/// Cycle flags are only final after [`HistoryBuilder::finish`], which performs
/// the backfill over every stored conviction.
#[derive(Debug, Default)]
pub struct HistoryBuilder {
    identity: Option<Identity>,
    convictions: Vec<Conviction>,
    seen_count_orders: HashSet<CountOrder>,
    deceased: bool,
    registered: bool,
    case_numbers: BTreeMap<String, Vec<String>>,
    qualifying_cycles: HashMap<String, bool>,
}

#[derive(Debug, Clone)]
struct Identity {
    person_id: String,
    name: String,
    date_of_birth: Option<NaiveDate>,
}

impl HistoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ConvictionRow) {
        if self.identity.is_none() {
            self.identity = Some(Identity {
                person_id: row.person_id.clone(),
                name: row.name.clone(),
                date_of_birth: row.date_of_birth,
            });
        }

        // A repeated count order carries another sentence segment. It extends the
        // most recently appended conviction, which is not necessarily the one that
        // owns the count order when cases interleave.
        let continuation = row.convicted && self.seen_count_orders.contains(&row.count_order);
        if continuation {
            if let Some(last) = self.convictions.last_mut() {
                last.extend_sentence(row.sentence_part());
            }
        }

        if row.event == EventType::Deceased {
            self.deceased = true;
        }

        let filing_number = row.filing_number.trim();
        if row.event == EventType::CourtAction && !filing_number.is_empty() {
            let numbers = self
                .case_numbers
                .entry(row.count_order.case().to_string())
                .or_default();
            if !numbers.iter().any(|known| known == filing_number) {
                numbers.push(filing_number.to_string());
            }
        }

        if row.event == EventType::Registration {
            self.registered = true;
        }

        let qualifying = classifier::is_qualifying_charge(&row.code_section);
        let cycle = row.count_order.cycle().to_string();

        if row.convicted && !continuation {
            let known = self
                .qualifying_cycles
                .get(&cycle)
                .copied()
                .unwrap_or(false);
            self.seen_count_orders.insert(row.count_order.clone());
            self.convictions.push(Conviction::new(row, known));
        }

        if qualifying {
            self.qualifying_cycles.insert(cycle, true);
        }
    }

    /// Freezes the history, backfilling cycle flags onto earlier convictions.
    pub fn finish(self) -> PersonHistory {
        let HistoryBuilder {
            identity,
            mut convictions,
            deceased,
            registered,
            case_numbers,
            qualifying_cycles,
            ..
        } = self;

        for conviction in &mut convictions {
            let cycle = conviction.row().count_order.cycle();
            if qualifying_cycles.get(cycle).copied().unwrap_or(false) {
                conviction.mark_qualifying_cycle();
            }
        }

        let Identity {
            person_id,
            name,
            date_of_birth,
        } = identity.unwrap_or(Identity {
            person_id: String::new(),
            name: String::new(),
            date_of_birth: None,
        });

        debug!(
            person_id = %person_id,
            convictions = convictions.len(),
            deceased,
            "built person history"
        );

        PersonHistory {
            person_id,
            name,
            date_of_birth,
            convictions,
            deceased,
            registered,
            case_numbers,
        }
    }
}

/// Frozen conviction history of a single person.
#[derive(Debug, Clone)]
pub struct PersonHistory {
    person_id: String,
    name: String,
    date_of_birth: Option<NaiveDate>,
    convictions: Vec<Conviction>,
    deceased: bool,
    registered: bool,
    case_numbers: BTreeMap<String, Vec<String>>,
}

impl PersonHistory {
    pub fn person_id(&self) -> &str {
        &self.person_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    pub fn convictions(&self) -> &[Conviction] {
        &self.convictions
    }

    pub fn is_deceased(&self) -> bool {
        self.deceased
    }

    pub fn has_registration_event(&self) -> bool {
        self.registered
    }

    pub fn case_numbers(&self, case_prefix: &str) -> &[String] {
        self.case_numbers
            .get(case_prefix)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn most_recent_conviction_date(&self) -> Option<NaiveDate> {
        self.convictions
            .iter()
            .filter_map(Conviction::disposition_date)
            .max()
    }

    /// Severe priors on record, plus `offense + enhancement` composites for cases
    /// that pair an enhanceable felony with a gang enhancement. Sorted, no duplicates.
    pub fn severe_prior_sections(&self) -> Vec<String> {
        let mut sections: BTreeSet<String> = self
            .convictions
            .iter()
            .map(Conviction::code_section)
            .filter(|code| classifier::is_severe_prior(code))
            .map(str::to_string)
            .collect();

        let mut by_case: BTreeMap<&str, (Vec<&str>, Vec<&str>)> = BTreeMap::new();
        for conviction in &self.convictions {
            let code = conviction.code_section();
            let entry = by_case
                .entry(conviction.row().count_order.case())
                .or_default();
            if classifier::is_enhanceable_base(code) {
                entry.0.push(code);
            }
            if classifier::is_gang_enhancement(code) {
                entry.1.push(code);
            }
        }

        for (offenses, enhancements) in by_case.values() {
            for offense in offenses {
                for enhancement in enhancements {
                    sections.insert(format!("{offense} + {enhancement}"));
                }
            }
        }

        sections.into_iter().collect()
    }

    pub fn has_severe_prior(&self) -> bool {
        !self.severe_prior_sections().is_empty()
    }

    pub fn registration_sections(&self) -> Vec<String> {
        self.convictions
            .iter()
            .map(Conviction::code_section)
            .filter(|code| classifier::is_registration_offense(code))
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn qualifying_convictions_in(&self, jurisdiction: &str) -> usize {
        self.convictions
            .iter()
            .filter(|conviction| {
                conviction.row().in_jurisdiction(jurisdiction)
                    && classifier::is_qualifying_charge(conviction.code_section())
            })
            .count()
    }

    pub fn felony_count(&self) -> usize {
        self.convictions
            .iter()
            .filter(|conviction| conviction.is_felony())
            .count()
    }

    /// Convictions dated within `years` of `as_of`. Undated convictions never count.
    pub fn convictions_within(&self, years: f64, as_of: NaiveDate) -> usize {
        self.convictions
            .iter()
            .filter_map(Conviction::disposition_date)
            .filter(|date| years_between(*date, as_of) < years)
            .count()
    }

    pub fn only_qualifying_convictions(&self) -> bool {
        !self.convictions.is_empty()
            && self
                .convictions
                .iter()
                .all(|conviction| classifier::is_qualifying_charge(conviction.code_section()))
    }

    /// Whole years of age on `date`, if the date of birth is known.
    pub fn age_at(&self, date: NaiveDate) -> Option<u32> {
        let birth = self.date_of_birth?;
        if date < birth {
            return None;
        }
        let mut age = date.year() - birth.year();
        if (date.month(), date.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        u32::try_from(age).ok()
    }
}

/// Groups rows by person id and folds each group into a [`PersonHistory`].
/// Persons are returned in order of first appearance; each person's rows keep
/// their original relative order.
pub fn build_histories<I>(rows: I) -> Vec<PersonHistory>
where
    I: IntoIterator<Item = ConvictionRow>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut builders: Vec<HistoryBuilder> = Vec::new();

    for row in rows {
        let slot = *index.entry(row.person_id.clone()).or_insert_with(|| {
            builders.push(HistoryBuilder::new());
            builders.len() - 1
        });
        builders[slot].push(row);
    }

    builders.into_iter().map(HistoryBuilder::finish).collect()
}

use super::common::*;
use crate::workflows::relief::domain::{EventType, SentenceUnit};
use crate::workflows::relief::history::{build_histories, years_between};
use chrono::NaiveDate;

#[test]
fn cycle_flag_is_backfilled_regardless_of_row_order() {
    let history = single_history(vec![
        row(0, "001001001000", "11364 HS").build(),
        row(1, "001002001000", "11357 HS").build(),
        row(2, "002001001000", "11364 HS").build(),
    ]);

    let flags: Vec<bool> = history
        .convictions()
        .iter()
        .map(|conviction| conviction.has_qualifying_charge_in_cycle())
        .collect();
    assert_eq!(flags, vec![true, true, false]);

    let reversed = single_history(vec![
        row(0, "001002001000", "11357 HS").build(),
        row(1, "001001001000", "11364 HS").build(),
    ]);
    assert!(reversed
        .convictions()
        .iter()
        .all(|conviction| conviction.has_qualifying_charge_in_cycle()));
}

#[test]
fn repeated_count_order_extends_last_appended_conviction() {
    let history = single_history(vec![
        row(0, "001001001000", "11357 HS")
            .on(Some(date(2010, 1, 1)))
            .sentence(30, SentenceUnit::Days)
            .build(),
        row(1, "002001001000", "11359 HS")
            .on(Some(date(2011, 1, 1)))
            .sentence(10, SentenceUnit::Days)
            .build(),
        row(2, "001001001000", "11357 HS")
            .sentence(1, SentenceUnit::Years)
            .build(),
    ]);

    let convictions = history.convictions();
    assert_eq!(convictions.len(), 2);
    assert_eq!(convictions[0].sentence_end(), Some(date(2010, 1, 31)));
    assert_eq!(convictions[1].sentence_end(), Some(date(2012, 1, 11)));
}

#[test]
fn oversized_sentences_do_not_overflow() {
    let history = single_history(vec![
        row(0, "001001001000", "11357 HS")
            .on(Some(date(2010, 1, 1)))
            .sentence(u32::MAX, SentenceUnit::Years)
            .build(),
        row(1, "002001001000", "11359 HS")
            .on(Some(date(2011, 1, 1)))
            .sentence(u32::MAX, SentenceUnit::Days)
            .build(),
        row(2, "002001001000", "11359 HS")
            .sentence(u32::MAX, SentenceUnit::Months)
            .build(),
    ]);

    let convictions = history.convictions();
    assert_eq!(convictions[0].sentence_end(), Some(date(2010, 1, 1)));
    assert_eq!(convictions[1].sentence_end(), Some(NaiveDate::MAX));
}

#[test]
fn unconvicted_rows_do_not_become_convictions() {
    let history = single_history(vec![
        row(0, "001001001000", "11357 HS").not_convicted().build(),
        row(1, "001001001000", "11357 HS")
            .sentence(6, SentenceUnit::Months)
            .build(),
    ]);

    let convictions = history.convictions();
    assert_eq!(convictions.len(), 1);
    assert_eq!(convictions[0].row_index(), 1);
    assert_eq!(convictions[0].sentence_end(), Some(date(2010, 8, 28)));
}

#[test]
fn case_numbers_come_from_court_actions_without_duplicates() {
    let history = single_history(vec![
        row(0, "001001001000", "11357 HS").filing("FE1").build(),
        row(1, "001001002000", "11359 HS").filing("FE1").build(),
        row(2, "001001003000", "")
            .not_convicted()
            .event(EventType::Other("ARREST/DETAINED".to_string()))
            .filing("FE9")
            .build(),
        row(3, "001001004000", "11360 HS").filing(" FE2 ").build(),
        row(4, "002001001000", "11360 HS").filing("FE3").build(),
    ]);

    assert_eq!(history.case_numbers("001001"), ["FE1", "FE2"]);
    assert_eq!(history.case_numbers("002001"), ["FE3"]);
    assert!(history.case_numbers("003001").is_empty());
}

#[test]
fn deceased_and_registration_events_set_flags() {
    let history = single_history(vec![
        row(0, "001001001000", "11357 HS").build(),
        row(1, "002001001000", "")
            .not_convicted()
            .event(EventType::Registration)
            .build(),
        row(2, "003001001000", "")
            .not_convicted()
            .event(EventType::Deceased)
            .build(),
    ]);

    assert!(history.is_deceased());
    assert!(history.has_registration_event());
    assert_eq!(history.convictions().len(), 1);

    let living = single_history(vec![row(0, "001001001000", "11357 HS").build()]);
    assert!(!living.is_deceased());
    assert!(!living.has_registration_event());
}

#[test]
fn severe_priors_are_sorted_deduplicated_and_order_independent() {
    let rows = vec![
        row(0, "001001001000", "187 PC").felony().build(),
        row(1, "002001001000", "664/187 PC").felony().build(),
        row(2, "003001001000", "187 PC").felony().build(),
        row(3, "004001001000", "422 PC").felony().build(),
        row(4, "004001002000", "186.22(B) PC").felony().build(),
        row(5, "005001001000", "11357 HS").build(),
    ];
    let mut reversed = rows.clone();
    reversed.reverse();

    let expected = vec![
        "187 PC".to_string(),
        "422 PC + 186.22(B) PC".to_string(),
        "664/187 PC".to_string(),
    ];
    assert_eq!(single_history(rows).severe_prior_sections(), expected);
    assert_eq!(single_history(reversed).severe_prior_sections(), expected);
}

#[test]
fn gang_enhancement_in_another_case_is_not_combined() {
    let history = single_history(vec![
        row(0, "001001001000", "422 PC").felony().build(),
        row(1, "002001001000", "186.22(B) PC").felony().build(),
    ]);
    assert!(!history.has_severe_prior());
}

#[test]
fn registration_sections_are_collected() {
    let history = single_history(vec![
        row(0, "001001001000", "311.11 PC").build(),
        row(1, "002001001000", "311.11 PC").build(),
        row(2, "003001001000", "11359 HS").build(),
    ]);
    assert_eq!(history.registration_sections(), vec!["311.11 PC".to_string()]);
}

#[test]
fn age_is_computed_in_whole_years() {
    let history = single_history(vec![row(0, "001001001000", "11357 HS").build()]);
    assert_eq!(history.age_at(date(2010, 1, 14)), Some(29));
    assert_eq!(history.age_at(date(2010, 1, 15)), Some(30));
    assert_eq!(history.age_at(date(1970, 1, 1)), None);

    let unknown = single_history(vec![row(0, "001001001000", "11357 HS").born(None).build()]);
    assert_eq!(unknown.age_at(date(2010, 1, 15)), None);
}

#[test]
fn recency_queries_ignore_undated_convictions() {
    let history = single_history(vec![
        row(0, "001001001000", "11357 HS").build(),
        row(1, "002001001000", "11359 HS")
            .on(Some(date(2016, 1, 1)))
            .felony()
            .build(),
        row(2, "003001001000", "11360 HS").on(None).build(),
    ]);

    assert_eq!(history.most_recent_conviction_date(), Some(date(2016, 1, 1)));
    assert_eq!(history.convictions_within(7.0, evaluation_date()), 1);
    assert_eq!(history.felony_count(), 1);
    assert!(history.only_qualifying_convictions());
    assert_eq!(history.qualifying_convictions_in("san francisco"), 3);
    assert_eq!(history.qualifying_convictions_in("LOS ANGELES"), 0);
}

#[test]
fn histories_keep_first_appearance_order() {
    let histories = build_histories(vec![
        row(0, "001001001000", "11357 HS").person("B").build(),
        row(1, "001001001000", "11359 HS").person("A").build(),
        row(2, "002001001000", "11360 HS").person("B").build(),
    ]);

    let ids: Vec<&str> = histories.iter().map(|history| history.person_id()).collect();
    assert_eq!(ids, vec!["B", "A"]);
    let rows: Vec<usize> = histories[0]
        .convictions()
        .iter()
        .map(|conviction| conviction.row_index())
        .collect();
    assert_eq!(rows, vec![0, 2]);
    assert_eq!(histories[0].name(), "DOE, JANE");
}

#[test]
fn years_between_uses_julian_years() {
    let years = years_between(date(2000, 1, 1), date(2010, 1, 1));
    assert!((years - 10.0).abs() < 0.01);
    assert!(years_between(date(2010, 1, 1), date(2000, 1, 1)) < 0.0);
}

use super::common::*;
use crate::workflows::relief::eligibility::{years_since, Determination, EligibilityInfo};

#[test]
fn snapshot_collects_history_facts() {
    let history = single_history(vec![
        row(0, "001001001000", "11357 HS")
            .filing("FE100")
            .on(Some(date(2009, 6, 1)))
            .build(),
        row(1, "001001002000", "11359 HS")
            .filing("FE101")
            .on(Some(date(2009, 6, 1)))
            .build(),
        row(2, "002001001000", "187 PC")
            .felony()
            .on(Some(date(2014, 6, 1)))
            .build(),
        row(3, "003001001000", "311.11 PC")
            .county("ALAMEDA")
            .on(Some(date(2012, 6, 1)))
            .build(),
    ]);
    let conviction = &history.convictions()[0];

    let info = EligibilityInfo::new(conviction, &history, evaluation_date(), "SAN FRANCISCO");
    assert_eq!(info.row_index, 0);
    assert_eq!(info.evaluation_date, evaluation_date());
    assert_eq!(info.date_of_conviction, Some(date(2009, 6, 1)));
    assert_eq!(info.convictions_on_record, 4);
    assert_eq!(info.qualifying_convictions_in_jurisdiction, 2);
    assert!((info.years_since_this_conviction - 10.0).abs() < 0.01);
    assert!((info.years_since_most_recent_conviction - 5.0).abs() < 0.01);
    assert_eq!(info.severe_priors, "187 PC");
    assert_eq!(info.registration_sections, "311.11 PC");
    assert!(!info.registration);
    assert!(!info.deceased);
    assert_eq!(info.case_numbers, "FE100; FE101");
    assert_eq!(info.determination(), Determination::Unclassified);
    assert_eq!(info.reason(), "");
}

#[test]
fn missing_dates_use_negative_sentinel() {
    assert_eq!(years_since(None, evaluation_date()), -1.0);

    let history = single_history(vec![row(0, "001001001000", "11357 HS").on(None).build()]);
    let info = EligibilityInfo::new(
        &history.convictions()[0],
        &history,
        evaluation_date(),
        "SAN FRANCISCO",
    );
    assert_eq!(info.years_since_this_conviction, -1.0);
    assert_eq!(info.years_since_most_recent_conviction, -1.0);
}

use chrono::NaiveDate;
use clearance::workflows::extract::ExtractReader;
use clearance::workflows::relief::eligibility::{SACRAMENTO, SAN_FRANCISCO};
use clearance::workflows::relief::{
    Determination, EligibilityOptions, FlowCatalog, ReliefRun, ReliefSummary,
};
use std::collections::HashMap;
use std::io::Write;

const EXTRACT: &str = "CII_NUMBER,NAME,DOB,CNT_ORDER,STP_TYPE_DESCR,STP_ORI_CNTY_NAME,DISP_DESCR,DISP_DATE,OFFENSE_DESCR,OFFENSE_TOC,FE_NUM,SENT_LENGTH,SENT_TIME_CODE,COMMENT_TEXT\n\
1,\"DOE, JANE\",19800115,001001001000,COURT ACTION,SAN FRANCISCO,CONVICTED,20100301,11357 HS-POSS MARIJUANA,M,FE1,,,\n\
1,\"DOE, JANE\",19800115,001001002000,COURT ACTION,SAN FRANCISCO,CONVICTED,20100301,11359 HS-POSS FOR SALE,F,FE1,2,Y,\n\
2,\"ROE, RICH\",19900220,002001001000,COURT ACTION,SAN FRANCISCO,CONVICTED,20180101,11360 HS-TRANSPORT,F,FE2,,,\n\
2,\"ROE, RICH\",19900220,002002001000,COURT ACTION,LOS ANGELES,CONVICTED,20050101,11357 HS-POSS,M,FE3,,,\n\
3,\"POE, PAT\",19700505,003001001000,COURT ACTION,SAN FRANCISCO,CONVICTED,20050101,11358 HS-CULTIVATION,F,FE9,1,Y,\n\
3,\"POE, PAT\",19700505,004001001000,DECEASED,,,20150101,,,,,,\n";

fn evaluation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 6, 1).expect("valid evaluation date")
}

fn run_preset() -> ReliefRun {
    let rows = ExtractReader::from_reader(EXTRACT.as_bytes()).expect("extract parses");
    let flow = FlowCatalog::standard()
        .resolve("San Francisco", None)
        .expect("preset resolves");
    ReliefRun::execute(rows, &flow, evaluation_date())
}

#[test]
fn preset_run_classifies_county_convictions() {
    let run = run_preset();
    let results = run.results();

    assert_eq!(results.flow_name(), "San Francisco");
    assert_eq!(results.len(), 4);
    assert!(results.get(3).is_none(), "other county is not evaluated");

    let misdemeanor = results.get(0).expect("row 0 evaluated");
    assert_eq!(misdemeanor.determination(), Determination::Dismissal);
    assert_eq!(misdemeanor.reason(), "Misdemeanor or Infraction");

    let recent_felony = results.get(1).expect("row 1 evaluated");
    assert_eq!(recent_felony.determination(), Determination::Reduction);
    assert_eq!(recent_felony.reason(), "Occurred in last 10 years");
    assert_eq!(recent_felony.case_numbers, "FE1");

    let after_cutoff = results.get(2).expect("row 2 evaluated");
    assert_eq!(after_cutoff.determination(), Determination::NotEligible);

    let served = results.get(4).expect("row 4 evaluated");
    assert_eq!(served.determination(), Determination::Dismissal);
    assert_eq!(served.reason(), "Sentence completed");
    assert!(served.deceased);
}

#[test]
fn summary_counts_subjects_and_baselines() {
    let run = run_preset();
    let summary = run.summary();

    assert_eq!(summary.county, SAN_FRANCISCO);
    assert_eq!(summary.rows, 6);
    assert_eq!(summary.subjects, 3);
    assert_eq!(summary.convictions, 5);
    assert_eq!(summary.qualifying_convictions_in_county, 4);
    assert_eq!(summary.evaluated_convictions, 4);
    assert_eq!(summary.determinations.get("Eligible for Dismissal"), Some(&2));
    assert_eq!(summary.determinations.get("Eligible for Reduction"), Some(&1));
    assert_eq!(summary.determinations.get("Not eligible"), Some(&1));
    assert_eq!(
        summary.reasons["Eligible for Dismissal"].get("Sentence completed"),
        Some(&1)
    );
    assert_eq!(summary.cleared_subjects, 1);
    assert_eq!(summary.subjects_with_felonies, 3);
    assert_eq!(summary.subjects_with_recent_convictions, 1);
    assert_eq!(summary.deceased_subjects, 1);
    assert_eq!(summary.baseline_dismiss_all_qualifying, 4);
    assert_eq!(summary.baseline_dismiss_all_qualifying_and_related, 4);

    let json = summary.to_json().expect("summary serializes");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["evaluation_date"], "2019-06-01");
    assert_eq!(value["cleared_subjects"], 1);

    assert_eq!(ReliefSummary::from_run(&run), summary);
}

#[test]
fn export_keeps_every_row_in_order() {
    let run = run_preset();
    let mut buffer = Vec::new();
    run.write_results(&mut buffer).expect("results export");

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let headers = reader.headers().expect("header row").clone();
    assert_eq!(&headers[0], "Row");
    assert!(headers.iter().any(|header| header == "Eligibility Determination"));

    let records: Vec<HashMap<String, String>> = reader
        .deserialize()
        .collect::<Result<_, _>>()
        .expect("records parse");
    assert_eq!(records.len(), 6);

    let rows: Vec<&str> = records.iter().map(|record| record["Row"].as_str()).collect();
    assert_eq!(rows, vec!["0", "1", "2", "3", "4", "5"]);

    assert_eq!(records[0]["Eligibility Determination"], "Eligible for Dismissal");
    assert_eq!(records[0]["Qualifying Charge"], "11357");
    assert_eq!(records[1]["Eligibility Reason"], "Occurred in last 10 years");
    assert_eq!(records[1]["OFFENSE_DESCR"], "11359 HS");
    assert_eq!(records[3]["Eligibility Determination"], "");
    assert_eq!(records[3]["Convictions On Record"], "");
    assert_eq!(records[5]["STP_TYPE_DESCR"], "DECEASED");
}

#[test]
fn subjects_are_cleared_by_their_evaluated_convictions() {
    let extract = "CII_NUMBER,NAME,DOB,CNT_ORDER,STP_TYPE_DESCR,STP_ORI_CNTY_NAME,DISP_DESCR,DISP_DATE,OFFENSE_DESCR,OFFENSE_TOC,FE_NUM,SENT_LENGTH,SENT_TIME_CODE,COMMENT_TEXT\n\
7,\"LEE, SAM\",19850303,001001001000,COURT ACTION,SAN FRANCISCO,CONVICTED,20120601,11357 HS-POSS MARIJUANA,M,FE7,,,\n\
7,\"LEE, SAM\",19850303,002001001000,COURT ACTION,SAN FRANCISCO,CONVICTED,20140601,459 PC-BURGLARY,F,FE8,,,\n\
8,\"KIM, ALEX\",19880808,003001001000,COURT ACTION,SAN FRANCISCO,CONVICTED,20140601,459 PC-BURGLARY,F,FE9,,,\n";
    let rows = ExtractReader::from_reader(extract.as_bytes()).expect("extract parses");
    let flow = FlowCatalog::standard()
        .resolve(SAN_FRANCISCO, None)
        .expect("preset resolves");
    let run = ReliefRun::execute(rows, &flow, evaluation_date());

    assert_eq!(run.results().len(), 1);
    assert!(run.results().get(1).is_none());
    assert_eq!(run.summary().cleared_subjects, 1);
}

#[test]
fn county_without_convictions_evaluates_nothing() {
    let rows = ExtractReader::from_reader(EXTRACT.as_bytes()).expect("extract parses");
    let flow = FlowCatalog::standard()
        .resolve(SACRAMENTO, None)
        .expect("preset resolves");
    let run = ReliefRun::execute(rows, &flow, evaluation_date());

    assert!(run.results().is_empty());
    let summary = run.summary();
    assert_eq!(summary.evaluated_convictions, 0);
    assert_eq!(summary.cleared_subjects, 0);
}

#[test]
fn export_labels_evaluated_rows_left_unclassified() {
    let rows = ExtractReader::from_reader(EXTRACT.as_bytes()).expect("extract parses");
    let flow = FlowCatalog::standard()
        .resolve(SAN_FRANCISCO, Some(&EligibilityOptions::default()))
        .expect("configurable flow builds");
    let run = ReliefRun::execute(rows, &flow, evaluation_date());
    assert_eq!(
        run.results().get(1).expect("row 1 evaluated").determination(),
        Determination::Unclassified
    );

    let mut buffer = Vec::new();
    run.write_results(&mut buffer).expect("results export");
    let records: Vec<HashMap<String, String>> = csv::Reader::from_reader(buffer.as_slice())
        .deserialize()
        .collect::<Result<_, _>>()
        .expect("records parse");

    assert_eq!(records[0]["Eligibility Determination"], "Eligible for Dismissal");
    assert_eq!(records[1]["Eligibility Determination"], "Unclassified");
    assert_eq!(records[1]["Eligibility Reason"], "");
    assert_eq!(records[3]["Eligibility Determination"], "");
}

#[test]
fn options_file_selects_configurable_flow() {
    let mut options_file = tempfile::NamedTempFile::new().expect("temp options file");
    write!(
        options_file,
        r#"{{"baselineEligibility": {{"dismiss": ["11359"], "reduce": ["11358", "11360"]}},
            "additionalRelief": {{"subjectAgeThreshold": 45}}}}"#
    )
    .expect("options written");

    let mut extract_file = tempfile::NamedTempFile::new().expect("temp extract file");
    extract_file
        .write_all(EXTRACT.as_bytes())
        .expect("extract written");

    let options = EligibilityOptions::from_path(options_file.path()).expect("options parse");
    let rows = ExtractReader::from_path(extract_file.path()).expect("extract parses");
    let flow = FlowCatalog::standard()
        .resolve("san francisco", Some(&options))
        .expect("configurable flow builds");
    let run = ReliefRun::execute(rows, &flow, evaluation_date());
    let results = run.results();

    assert_eq!(results.flow_name(), "Configurable");
    assert_eq!(
        results.get(1).expect("row 1").reason(),
        "Dismiss all HS 11359 convictions"
    );
    assert_eq!(
        results.get(4).expect("row 4").reason(),
        "45 years or older"
    );
    assert_eq!(
        results.get(2).expect("row 2").reason(),
        "Occurred after 11/09/2016"
    );
}

#[test]
fn invalid_options_fail_before_evaluation() {
    let options = EligibilityOptions::from_reader(
        r#"{"additionalRelief": {"yearsSinceConvictionThreshold": 30}}"#.as_bytes(),
    )
    .expect("options parse");
    let err = FlowCatalog::standard()
        .resolve(SAN_FRANCISCO, Some(&options))
        .expect_err("threshold rejected");
    assert!(err.to_string().contains("between 1 and 15"));
}

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use clearance::config::AppConfig;
use clearance::error::AppError;
use clearance::telemetry;
use clearance::workflows::extract::ExtractReader;
use clearance::workflows::relief::{
    Determination, EligibilityOptions, FlowCatalog, ReliefRun, ReliefSummary,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "clearance",
    about = "Evaluate criminal-history extracts for cannabis conviction relief",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate an extract against one county's eligibility flow
    Run(RunArgs),
    /// List the counties with a built-in eligibility flow
    Flows,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Criminal history extract (CSV)
    #[arg(long)]
    input: PathBuf,
    /// County whose convictions are evaluated
    #[arg(long)]
    county: String,
    /// Evaluation date (YYYY-MM-DD, defaults to CLEARANCE_EVALUATION_DATE or today)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    /// Eligibility options JSON; selects the configurable flow instead of the preset
    #[arg(long)]
    eligibility_options: Option<PathBuf>,
    /// Write the results CSV here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write the run summary as JSON
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run_evaluation(args),
        Command::Flows => {
            list_flows(&FlowCatalog::standard());
            Ok(())
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn run_evaluation(args: RunArgs) -> Result<(), AppError> {
    let RunArgs {
        input,
        county,
        date,
        eligibility_options,
        output,
        summary,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let evaluation_date = config
        .evaluation
        .resolve(date, Local::now().date_naive());
    let options = eligibility_options
        .map(EligibilityOptions::from_path)
        .transpose()?;
    let flow = FlowCatalog::standard().resolve(&county, options.as_ref())?;
    info!(
        ?config.environment,
        flow = flow.name(),
        %evaluation_date,
        input = %input.display(),
        "starting relief run"
    );

    let rows = ExtractReader::from_path(&input)?;
    let run = ReliefRun::execute(rows, &flow, evaluation_date);
    let report = run.summary();

    match &output {
        Some(path) => run.write_results(BufWriter::new(File::create(path)?))?,
        None => run.write_results(io::stdout().lock())?,
    }

    if let Some(path) = summary {
        let mut writer = BufWriter::new(File::create(&path)?);
        writer.write_all(report.to_json()?.as_bytes())?;
        writer.flush()?;
        info!(summary = %path.display(), "wrote run summary");
    }

    if output.is_some() {
        render_summary(&report);
    }

    Ok(())
}

fn list_flows(catalog: &FlowCatalog) {
    for jurisdiction in catalog.jurisdictions() {
        if let Some(flow) = catalog.get(jurisdiction) {
            let scope = if flow.checks_related_charges() {
                "qualifying and related charges"
            } else {
                "qualifying charges"
            };
            println!("{jurisdiction}: {} ({scope})", flow.name());
        }
    }
}

fn render_summary(summary: &ReliefSummary) {
    println!("Relief run: {} ({})", summary.county, summary.flow);
    println!("Evaluated as of {}", summary.evaluation_date);
    println!(
        "{} rows, {} subjects, {} convictions ({} qualifying in county)",
        summary.rows,
        summary.subjects,
        summary.convictions,
        summary.qualifying_convictions_in_county
    );

    println!("\nDeterminations");
    for determination in Determination::ordered() {
        let label = determination.label();
        let count = summary.determinations.get(label).copied().unwrap_or(0);
        if count == 0 {
            continue;
        }
        println!("- {label}: {count}");
        if let Some(reasons) = summary.reasons.get(label) {
            for (reason, reason_count) in reasons {
                println!("    {reason}: {reason_count}");
            }
        }
    }

    println!("\nSubjects");
    println!("- cleared: {}", summary.cleared_subjects);
    println!("- with felonies: {}", summary.subjects_with_felonies);
    println!(
        "- with convictions in the last 7 years: {}",
        summary.subjects_with_recent_convictions
    );
    println!("- deceased: {}", summary.deceased_subjects);

    println!("\nBaselines");
    println!(
        "- dismiss all 11357-60: {}",
        summary.baseline_dismiss_all_qualifying
    );
    println!(
        "- dismiss all 11357-60 and related: {}",
        summary.baseline_dismiss_all_qualifying_and_related
    );
}

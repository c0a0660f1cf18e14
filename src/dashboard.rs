use log::{debug, info};

use snafu::{prelude::*, Snafu};

use serde_json::json;

use std::fs;
use std::time::SystemTime;

use survey_pipeline::session::SessionContext;
use survey_pipeline::*;

use crate::args::Args;
use crate::dashboard::config_reader::{read_dashboard_config, DashboardConfig};
use crate::dashboard::model::ScorecardModel;

pub mod config_reader;
pub mod export;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;
pub mod model;
pub mod notify;

#[derive(Debug, Snafu)]
pub enum DashboardError {
    #[snafu(display("Error opening the survey file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the survey file"))]
    CsvLine { source: csv::Error, lineno: usize },
    #[snafu(display("Error opening the workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook has no readable worksheet"))]
    EmptyExcel {},
    #[snafu(display("Worksheet cell on line {lineno} has an unusable type: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("The survey table has no header row"))]
    MissingHeader {},
    #[snafu(display("The survey table is missing the required column {name:?}"))]
    MissingColumn { name: String },
    #[snafu(display("Error opening {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Prediction failed: {source}"))]
    Prediction { source: PipelineErrors },
    #[snafu(display("--send-coupons requires both --sender-email and --app-password"))]
    MissingCredential {},
    #[snafu(display("Error writing the predictions export to {path}"))]
    ExportWrite { source: csv::Error, path: String },
    #[snafu(display("Error writing the run summary to {path}"))]
    SummaryWrite {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashboardError>;

/// Runs the whole dashboard once over a fresh snapshot of the response
/// source: raw view, descriptive tables, prediction, export, notifications,
/// run summary.
pub fn run_dashboard(args: &Args) -> DashResult<()> {
    let config = match &args.config {
        Some(path) => read_dashboard_config(path)?,
        None => DashboardConfig::default(),
    };
    debug!("run_dashboard: config: {:?}", config);

    let input = match args.input.clone().or_else(|| config.source.file_path.clone()) {
        Some(p) => p,
        None => {
            whatever!("no input file: pass --input or set source.filePath in the configuration")
        }
    };
    let provider = args
        .input_type
        .clone()
        .unwrap_or_else(|| config.source.provider.clone());
    let worksheet = args
        .excel_worksheet_name
        .clone()
        .or_else(|| config.source.excel_worksheet_name.clone());

    let mut records = match provider.as_str() {
        "csv" => io_csv::read_survey_csv(&input, &config.source)?,
        "xlsx" | "excel" => io_excel::read_survey_xlsx(&input, &config.source, worksheet)?,
        x => whatever!("input type not implemented: {:?}", x),
    };
    let total_loaded = records.len();
    info!(
        "run_dashboard: loaded {} responses from {:?}",
        total_loaded, input
    );

    // The "most recent row" entry point is the same table, last row only.
    if args.latest_only {
        records = keep_latest(records);
    }

    if records.is_empty() {
        println!("No survey responses found in {}.", input);
        return Ok(());
    }

    // Raw view first: it stays available even if prediction fails, and
    // records excluded from prediction remain visible here.
    print_raw_tail(&records);
    print_multi_punch_tables(&records, &config);

    let schema = config.feature_schema();
    let model = match &config.model_file {
        Some(path) => model::load_model(path)?,
        None => ScorecardModel::retail_default(),
    };
    let schema_questions = schema.questions();
    if model.feature_names != schema_questions {
        whatever!(
            "model artifact features {:?} do not line up with the schema columns {:?}",
            model.feature_names,
            schema_questions
        );
    }

    let now = SystemTime::now();
    // A CLI invocation is a single already-authenticated operator session.
    let session = SessionContext::new("operator", now);
    let outcome = run_prediction_pipeline(
        &session,
        now,
        config.session_timeout(),
        &records,
        &schema,
        &model,
    )
    .context(PredictionSnafu {})?;

    print_prediction_tail(&outcome.enriched);

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| export::DEFAULT_EXPORT_NAME.to_string());
    export::write_predictions(&outcome.enriched, &out, &config.source.contact_column)?;
    if out != "stdout" {
        println!("Predictions written to {}", out);
    }

    let satisfied = outcome
        .enriched
        .iter()
        .filter(|e| e.label == PredictionLabel::Satisfied)
        .count();

    let (delivered, failed) = if args.send_coupons {
        let (sender, credential) = match (&args.sender_email, &args.app_password) {
            (Some(s), Some(c)) if !s.is_empty() && !c.is_empty() => (s.clone(), c.clone()),
            _ => return MissingCredentialSnafu {}.fail(),
        };
        let targets = select_coupon_targets(&outcome.enriched, &config.coupon_template());
        if targets.is_empty() {
            println!("No customers predicted satisfied with a contact address; nothing to send.");
        }
        notify::deliver_coupons(&notify::ConsoleTransport, &sender, &credential, &targets)
    } else {
        (0, 0)
    };

    let summary = json!({
        "rowsLoaded": total_loaded,
        "rowsProcessed": records.len(),
        "excludedFromPrediction": outcome.excluded,
        "predictions": outcome.enriched.len(),
        "predictedSatisfied": satisfied,
        "notificationsDelivered": delivered,
        "notificationsFailed": failed,
    });
    let pretty = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;
    println!("summary:{}", pretty);
    if let Some(path) = args.summary.as_deref() {
        if path != "stdout" {
            fs::write(path, &pretty).context(SummaryWriteSnafu { path })?;
        }
    }
    Ok(())
}

/// Keeps only the most recent response, the last row of the table.
fn keep_latest(mut records: Vec<SurveyRecord>) -> Vec<SurveyRecord> {
    if records.len() > 1 {
        records = records.split_off(records.len() - 1);
    }
    records
}

fn print_raw_tail(records: &[SurveyRecord]) {
    let start = records.len().saturating_sub(5);
    println!("Latest responses ({} loaded):", records.len());
    for record in &records[start..] {
        let answers: Vec<String> = record
            .answers
            .iter()
            .map(|(q, a)| format!("{}={}", q, a))
            .collect();
        println!(
            "  {} | {}",
            record.contact.as_deref().unwrap_or("-"),
            answers.join(" | ")
        );
    }
}

fn print_multi_punch_tables(records: &[SurveyRecord], config: &DashboardConfig) {
    let questions = multipunch::multi_select_questions(records);
    if questions.is_empty() {
        println!("No multi-select questions detected.");
        return;
    }
    for question in questions {
        println!("\n{}: {}", question, config.question_label(&question));
        for (token, count) in multipunch::question_token_counts(records, &question) {
            println!("  {:>5}  {}", count, token);
        }
    }
}

fn print_prediction_tail(enriched: &[EnrichedRecord]) {
    let start = enriched.len().saturating_sub(5);
    println!(
        "\nPredicted customer satisfaction ({} records):",
        enriched.len()
    );
    for e in &enriched[start..] {
        println!(
            "  {} | {}",
            e.record.contact.as_deref().unwrap_or("-"),
            e.indicator
        );
    }
}

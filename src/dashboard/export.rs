// The predictions export: a flat delimited table of every original field
// plus the predicted label and its indicator.

use std::io;

use csv::Writer;

use snafu::prelude::*;

use survey_pipeline::{EnrichedRecord, PredictionLabel, SurveyRecord};

use crate::dashboard::{
    CsvLineSnafu, CsvOpenSnafu, DashResult, ExportWriteSnafu, MissingHeaderSnafu,
};

pub const DEFAULT_EXPORT_NAME: &str = "predictions.csv";
pub const LABEL_COLUMN: &str = "Predicted_Cust_Satisfaction";
pub const INDICATOR_COLUMN: &str = "Satisfaction_Emoji";

pub fn write_predictions(
    enriched: &[EnrichedRecord],
    dest: &str,
    contact_column: &str,
) -> DashResult<()> {
    if dest == "stdout" {
        let mut writer = Writer::from_writer(io::stdout());
        write_rows(&mut writer, enriched, contact_column).context(ExportWriteSnafu { path: dest })
    } else {
        let mut writer = Writer::from_path(dest).context(ExportWriteSnafu { path: dest })?;
        write_rows(&mut writer, enriched, contact_column).context(ExportWriteSnafu { path: dest })
    }
}

fn export_questions(enriched: &[EnrichedRecord]) -> Vec<String> {
    enriched
        .first()
        .map(|e| e.record.answers.iter().map(|(q, _)| q.clone()).collect())
        .unwrap_or_default()
}

fn write_rows<W: io::Write>(
    writer: &mut Writer<W>,
    enriched: &[EnrichedRecord],
    contact_column: &str,
) -> csv::Result<()> {
    let questions = export_questions(enriched);
    let mut header: Vec<String> = vec![contact_column.to_string()];
    header.extend(questions.iter().cloned());
    header.push(LABEL_COLUMN.to_string());
    header.push(INDICATOR_COLUMN.to_string());
    writer.write_record(&header)?;

    for e in enriched.iter() {
        let mut row: Vec<String> = vec![e.record.contact.clone().unwrap_or_default()];
        for q in questions.iter() {
            row.push(e.record.answer(q).unwrap_or("").to_string());
        }
        row.push(e.label.as_code().to_string());
        row.push(e.indicator.clone());
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Parses an export back into enriched records. Exists to verify that the
/// export round-trips the displayed table.
pub fn read_predictions(path: &str) -> DashResult<Vec<EnrichedRecord>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();

    let header_line = records
        .next()
        .context(MissingHeaderSnafu {})?
        .context(CsvLineSnafu { lineno: 1usize })?;
    let header: Vec<String> = header_line.iter().map(|s| s.to_string()).collect();
    if header.len() < 3 {
        whatever!("the export {:?} does not look like a predictions table", path);
    }
    let questions: Vec<String> = header[1..header.len() - 2].to_vec();

    let mut res: Vec<EnrichedRecord> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineSnafu { lineno })?;
        let cells: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        let contact = cells.first().filter(|s| !s.is_empty()).cloned();
        let answers: Vec<(String, String)> = questions
            .iter()
            .cloned()
            .zip(cells[1..1 + questions.len()].iter().cloned())
            .collect();
        let code: i64 = match cells
            .get(1 + questions.len())
            .and_then(|s| s.parse::<i64>().ok())
        {
            Some(c) => c,
            None => whatever!("line {}: unreadable prediction label", lineno),
        };
        let label = PredictionLabel::from_code(code);
        let indicator = cells
            .get(2 + questions.len())
            .cloned()
            .unwrap_or_default();
        res.push(EnrichedRecord {
            record: SurveyRecord::new(contact, answers),
            label,
            indicator,
        });
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enriched_fixture() -> Vec<EnrichedRecord> {
        let make = |contact: Option<&str>, q1: &str, label: PredictionLabel| EnrichedRecord {
            record: SurveyRecord::new(
                contact.map(|s| s.to_string()),
                vec![
                    ("Q1".to_string(), q1.to_string()),
                    ("Q2".to_string(), "Price, Quality".to_string()),
                ],
            ),
            label,
            indicator: label.indicator().to_string(),
        };
        vec![
            make(Some("a@x.com"), "Once a week", PredictionLabel::Satisfied),
            make(None, "Rarely", PredictionLabel::NotSatisfied),
        ]
    }

    #[test]
    fn export_round_trips() {
        let enriched = enriched_fixture();
        let path = std::env::temp_dir().join("satdash_export_roundtrip.csv");
        let path_s = path.to_str().unwrap();
        write_predictions(&enriched, path_s, "Email Address").unwrap();
        let parsed = read_predictions(path_s).unwrap();
        assert_eq!(parsed, enriched);
    }

    #[test]
    fn header_carries_all_original_fields() {
        let enriched = enriched_fixture();
        let path = std::env::temp_dir().join("satdash_export_header.csv");
        let path_s = path.to_str().unwrap();
        write_predictions(&enriched, path_s, "Email Address").unwrap();
        let contents = std::fs::read_to_string(path_s).unwrap();
        let header = contents.lines().next().unwrap();
        assert_eq!(
            header,
            "Email Address,Q1,Q2,Predicted_Cust_Satisfaction,Satisfaction_Emoji"
        );
    }

    #[test]
    fn empty_prediction_set_still_writes_a_header() {
        let path = std::env::temp_dir().join("satdash_export_empty.csv");
        let path_s = path.to_str().unwrap();
        write_predictions(&[], path_s, "Email Address").unwrap();
        let parsed = read_predictions(path_s).unwrap();
        assert!(parsed.is_empty());
    }
}

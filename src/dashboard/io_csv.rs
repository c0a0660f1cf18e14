// Primitives for reading survey tables in the CSV format.

use log::debug;

use snafu::prelude::*;

use survey_pipeline::SurveyRecord;

use crate::dashboard::config_reader::SourceSettings;
use crate::dashboard::io_common::TableLayout;
use crate::dashboard::{CsvLineSnafu, CsvOpenSnafu, DashResult, MissingHeaderSnafu};

pub fn read_survey_csv(path: &str, source: &SourceSettings) -> DashResult<Vec<SurveyRecord>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();

    let header_line = records
        .next()
        .context(MissingHeaderSnafu {})?
        .context(CsvLineSnafu { lineno: 1usize })?;
    let header: Vec<String> = header_line.iter().map(|s| s.trim().to_string()).collect();
    debug!("read_survey_csv: header: {:?}", header);
    let layout = TableLayout::from_header(&header, source)?;

    let mut res: Vec<SurveyRecord> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineSnafu { lineno })?;
        let cells: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        debug!("read_survey_csv: lineno: {:?} row: {:?}", lineno, cells);
        res.push(layout.to_record(&cells));
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::DashboardError;
    use std::fs;

    fn temp_csv(name: &str, contents: &str) -> String {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, contents).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn reads_a_form_export() {
        let path = temp_csv(
            "satdash_io_csv_basic.csv",
            "Timestamp,Q1,Q2,Q3,Email Address\n\
             2024/01/01,Once a week,\"Price, Quality\",₹100-₹500,a@x.com\n\
             2024/01/02,Rarely,Price,₹2000+,\n",
        );
        let records = read_survey_csv(&path, &SourceSettings::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].contact.as_deref(), Some("a@x.com"));
        assert_eq!(records[0].answer("Q2"), Some("Price, Quality"));
        assert_eq!(records[1].contact, None);
        // The timestamp column does not survive ingestion.
        assert_eq!(records[0].answer("Timestamp"), None);
    }

    #[test]
    fn missing_contact_column_is_a_source_error() {
        let path = temp_csv(
            "satdash_io_csv_nocontact.csv",
            "Timestamp,Q1,Q2\n2024/01/01,Once a week,Price\n",
        );
        let res = read_survey_csv(&path, &SourceSettings::default());
        assert!(matches!(res, Err(DashboardError::MissingColumn { .. })));
    }

    #[test]
    fn unreadable_file_is_a_source_error() {
        let res = read_survey_csv("/nonexistent/responses.csv", &SourceSettings::default());
        assert!(matches!(res, Err(DashboardError::CsvOpen { .. })));
    }
}

// Named-schema resolution shared by the CSV and Excel readers.

use log::debug;

use snafu::prelude::*;

use survey_pipeline::SurveyRecord;

use crate::dashboard::config_reader::SourceSettings;
use crate::dashboard::{DashResult, MissingColumnSnafu, MissingHeaderSnafu};

/// Where each semantic column lives in the source table.
///
/// The contact column is located by name, not position, and a missing
/// required column fails the whole load. The index column (a spreadsheet
/// artifact such as the form timestamp) is dropped.
pub struct TableLayout {
    contact_idx: usize,
    question_cols: Vec<(usize, String)>,
}

impl TableLayout {
    pub fn from_header(header: &[String], source: &SourceSettings) -> DashResult<TableLayout> {
        if header.is_empty() {
            return MissingHeaderSnafu {}.fail();
        }
        let contact_idx = header
            .iter()
            .position(|name| name == &source.contact_column)
            .context(MissingColumnSnafu {
                name: source.contact_column.clone(),
            })?;
        let mut question_cols: Vec<(usize, String)> = Vec::new();
        for (idx, name) in header.iter().enumerate() {
            if idx == contact_idx || name.is_empty() {
                continue;
            }
            if source.index_column.as_deref() == Some(name.as_str()) {
                continue;
            }
            question_cols.push((idx, name.clone()));
        }
        debug!(
            "TableLayout: contact column at {}, {} question columns",
            contact_idx,
            question_cols.len()
        );
        Ok(TableLayout {
            contact_idx,
            question_cols,
        })
    }

    /// Reshapes one raw row: the contact moves to the front of the record,
    /// the index column is gone, everything else keeps table order. A blank
    /// contact cell becomes an absent contact.
    pub fn to_record(&self, cells: &[String]) -> SurveyRecord {
        let contact = cells
            .get(self.contact_idx)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        let answers = self
            .question_cols
            .iter()
            .map(|(idx, q)| (q.clone(), cells.get(*idx).cloned().unwrap_or_default()))
            .collect();
        SurveyRecord::new(contact, answers)
    }
}

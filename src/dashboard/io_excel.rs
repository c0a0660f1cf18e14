// Primitives for reading survey tables exported as Excel workbooks.

use log::debug;

use snafu::prelude::*;

use calamine::{open_workbook, DataType, Reader, Xlsx};

use survey_pipeline::SurveyRecord;

use crate::dashboard::config_reader::SourceSettings;
use crate::dashboard::io_common::TableLayout;
use crate::dashboard::{
    DashResult, EmptyExcelSnafu, ExcelWrongCellTypeSnafu, MissingHeaderSnafu, OpeningExcelSnafu,
};

pub fn read_survey_xlsx(
    path: &str,
    source: &SourceSettings,
    worksheet_name: Option<String>,
) -> DashResult<Vec<SurveyRecord>> {
    let wrange = get_range(path, worksheet_name)?;

    let mut rows = wrange.rows();
    let header_row = rows.next().context(MissingHeaderSnafu {})?;
    let header: Vec<String> = header_row
        .iter()
        .map(|cell| match cell {
            DataType::String(s) => s.trim().to_string(),
            _ => String::new(),
        })
        .collect();
    debug!("read_survey_xlsx: header: {:?}", header);
    let layout = TableLayout::from_header(&header, source)?;

    let mut res: Vec<SurveyRecord> = Vec::new();
    for (idx, row) in rows.enumerate() {
        let lineno = idx as u64 + 2;
        let cells: Vec<String> = row
            .iter()
            .map(|cell| cell_string(cell, lineno))
            .collect::<DashResult<Vec<String>>>()?;
        debug!("read_survey_xlsx: lineno: {:?} row: {:?}", lineno, cells);
        res.push(layout.to_record(&cells));
    }
    Ok(res)
}

/// Renders one worksheet cell as the raw string the normalizer sees.
/// Integer-valued floats lose the trailing ".0" so rating cells coerce
/// cleanly.
fn cell_string(cell: &DataType, lineno: u64) -> DashResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Empty => Ok(String::new()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn get_range(path: &str, worksheet_name: Option<String>) -> DashResult<calamine::Range<DataType>> {
    debug!(
        "read_survey_xlsx: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?;
        return Ok(wrange);
    }
    let all_worksheets = workbook.worksheets();
    match all_worksheets.as_slice() {
        [] => EmptyExcelSnafu {}.fail(),
        [(worksheet_name, wrange)] => {
            debug!(
                "read_survey_xlsx: path: {:?} using single worksheet {:?}",
                path, worksheet_name
            );
            Ok(wrange.clone())
        }
        _ => {
            whatever!(
                "the workbook {:?} has several worksheets, pass --excel-worksheet-name",
                path
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_valued_cells_render_without_fraction() {
        assert_eq!(cell_string(&DataType::Float(4.0), 2).unwrap(), "4");
        assert_eq!(cell_string(&DataType::Float(4.5), 2).unwrap(), "4.5");
        assert_eq!(cell_string(&DataType::Int(3), 2).unwrap(), "3");
        assert_eq!(cell_string(&DataType::Empty, 2).unwrap(), "");
    }

    #[test]
    fn error_cells_are_rejected() {
        let cell = DataType::Error(calamine::CellErrorType::Div0);
        assert!(cell_string(&cell, 2).is_err());
    }
}

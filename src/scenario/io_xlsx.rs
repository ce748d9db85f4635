use calamine::{open_workbook, DataType, Reader, Xlsx};
use snafu::OptionExt;

use crate::scenario::*;

/// Reads the ballots of a spreadsheet. The first row is a header, every other
/// row holds one voter and its ranked choices.
pub fn read_xlsx_ballots(path: String, cfs: &FileSource) -> ScenarioResult<Vec<ParsedBallot>> {
    let mut workbook: Xlsx<_> = open_workbook(path.clone()).context(OpeningExcelSnafu {
        path: path.clone(),
    })?;
    let wrange = match &cfs.worksheet_name {
        Some(name) => workbook.worksheet_range(name),
        None => workbook.worksheet_range_at(0),
    }
    .context(EmptyExcelSnafu { path: path.clone() })?
    .context(OpeningExcelSnafu { path: path.clone() })?;

    let voter_idx = cfs.voter_column_index()?;
    let start_range = cfs.first_vote_column_index()?;
    debug!(
        "read_xlsx_ballots: voter column: {} first vote column: {}",
        voter_idx, start_range
    );

    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu { path: path.clone() })?;
    debug!("read_xlsx_ballots: header: {:?}", header);

    let mut res: Vec<ParsedBallot> = Vec::new();
    for (idx, row) in iter.enumerate() {
        // Spreadsheet line, after the header.
        let lineno = idx + 2;
        debug!("read_xlsx_ballots: row {}: {:?}", lineno, row);
        if row.iter().all(|c| *c == DataType::Empty) {
            continue;
        }
        let voter = read_cell(row.get(voter_idx), lineno)?;
        let choices = row
            .iter()
            .skip(start_range)
            .take(MAX_RANKS)
            .map(|c| read_cell(Some(c), lineno))
            .collect::<ScenarioResult<Vec<String>>>()?;
        res.push(ParsedBallot {
            voter,
            choices,
            lineno,
        });
    }
    info!("read_xlsx_ballots: {} ballots in {}", res.len(), path);
    Ok(res)
}

fn read_cell(cell: Option<&DataType>, lineno: usize) -> ScenarioResult<String> {
    match cell {
        Some(DataType::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        x => ExcelWrongCellTypeSnafu {
            lineno: lineno as u64,
            content: format!("{:?}", x),
        }
        .fail(),
    }
}

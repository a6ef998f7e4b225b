//! First worksheet of an export, addressed by absolute cell position.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::errors::{PortalError, Result};

/// Rows of the first worksheet, from `A1` to the last used cell.
///
/// Leading blank rows and columns are kept as [`Data::Empty`] so row
/// offsets match what a spreadsheet viewer shows.
pub fn read_first_sheet(bytes: &[u8]) -> Result<Vec<Vec<Data>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PortalError::Spreadsheet("workbook has no worksheet".to_string()))??;

    let Some((last_row, last_col)) = range.end() else {
        return Ok(Vec::new());
    };

    Ok((0..=last_row)
        .map(|row| {
            (0..=last_col)
                .map(|col| range.get_value((row, col)).cloned().unwrap_or(Data::Empty))
                .collect()
        })
        .collect())
}

/// Cell text as a spreadsheet would render it; empty cells render as "".
pub fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

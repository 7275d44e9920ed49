use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};

use crate::{
    config::FIRST_NAME,
    error::{GradebookError, Result},
    types::{CellValue, Grid},
};

/// Reads the first worksheet of an `.xlsx` into a grid anchored at A1.
pub fn read_grid(path: &Path) -> Result<Grid> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| GradebookError::EmptyWorkbook(path.to_path_buf()))??;

    // calamine trims leading empty rows/columns; put them back so A1 is (0, 0).
    let (row_offset, col_offset) = match range.start() {
        Some((r, c)) => (r as usize, c as usize),
        None => return Ok(Grid::default()),
    };

    let mut rows = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; col_offset];
        cells.extend(row.iter().map(to_cell_value));
        rows.push(cells);
    }
    Ok(Grid::new(rows))
}

fn to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Text(if *b { "True" } else { "False" }.to_string()),
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}

/// Index of the first row mentioning "First name" in any cell.
pub fn find_header_row(grid: &Grid, path: &Path) -> Result<usize> {
    grid.rows
        .iter()
        .position(|row| row.iter().any(|c| c.contains_ignore_case(FIRST_NAME)))
        .ok_or_else(|| GradebookError::MissingHeaderRow(path.to_path_buf()))
}

pub fn row_is_excluded(row: &[CellValue], exclude: &[String]) -> bool {
    exclude
        .iter()
        .filter(|needle| !needle.is_empty())
        .any(|needle| row.iter().any(|c| c.contains_ignore_case(needle)))
}

pub fn remove_excluded_rows(rows: Vec<Vec<CellValue>>, exclude: &[String]) -> Vec<Vec<CellValue>> {
    rows.into_iter()
        .filter(|row| !row_is_excluded(row, exclude))
        .collect()
}


#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::fixtures::{e, n, t, write_xlsx};
    use super::*;

    #[test]
    fn read_grid_keeps_a1_anchor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.xlsx");
        write_xlsx(
            &path,
            &[
                vec![],
                vec![e(), t("First name"), t("Last name")],
                vec![e(), t("Ada"), n(3.0)],
            ],
        );
        let grid = read_grid(&path).unwrap();
        assert_eq!(grid.get(1, 1), &t("First name"));
        assert_eq!(grid.get(2, 2), &n(3.0));
        assert_eq!(grid.get(0, 0), &CellValue::Empty);
    }

    #[test]
    fn header_row_is_case_insensitive() {
        let grid = Grid::new(vec![
            vec![t("Course")],
            vec![t("Assignment 1")],
            vec![t("FIRST NAME"), t("Last name")],
        ]);
        assert_eq!(find_header_row(&grid, Path::new("x.xlsx")).unwrap(), 2);
    }

    #[test]
    fn missing_header_row_is_an_error() {
        let grid = Grid::new(vec![vec![t("nothing here")]]);
        assert!(matches!(
            find_header_row(&grid, Path::new("x.xlsx")),
            Err(GradebookError::MissingHeaderRow(_))
        ));
    }

    #[test]
    fn excluded_rows_match_any_cell() {
        let rows = vec![
            vec![t("Ada"), t("Lovelace")],
            vec![t("raffi"), t("Instructor")],
            vec![t("Alan"), t("Turing")],
        ];
        let kept = remove_excluded_rows(rows, &["Raffi".to_string()]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1][0], t("Alan"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_grid(&dir.path().join("missing.xlsx")).is_err());
    }
}

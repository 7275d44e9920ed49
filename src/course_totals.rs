use std::{collections::HashMap, path::Path};

use crate::{
    config::{FIRST_NAME, LAST_NAME},
    error::{GradebookError, Result},
    spreadsheet::{read_grid, row_is_excluded},
    types::{CellValue, Grid, Student},
};

/// The `00-` course total export: one header row, one row per student.
#[derive(Debug, Clone, Default)]
pub struct CourseTotals {
    pub headers: Vec<String>,
    pub students: Vec<Student>,
    rows: Vec<Vec<CellValue>>,
    index: HashMap<Student, usize>,
}

/// Collapses whitespace and lowercases, so headers and titles compare loosely.
pub fn normalize_title(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn parse_course_percentage(value: &CellValue) -> CellValue {
    match value {
        CellValue::Text(s) => {
            let cleaned = s.replace('%', "");
            let cleaned = cleaned.trim();
            match cleaned.parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::Text(cleaned.to_string()),
            }
        }
        v if v.is_empty() => CellValue::Empty,
        v => v.clone(),
    }
}

pub fn load_course_totals(path: &Path, exclude: &[String]) -> Result<CourseTotals> {
    let grid = read_grid(path)?;
    CourseTotals::from_grid(&grid, path, exclude)
}

impl CourseTotals {
    pub fn from_grid(grid: &Grid, path: &Path, exclude: &[String]) -> Result<Self> {
        let headers: Vec<String> = grid
            .rows
            .first()
            .map(|row| row.iter().map(|c| c.to_string().trim().to_string()).collect())
            .unwrap_or_default();

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| GradebookError::MissingColumn {
                    path: path.to_path_buf(),
                    column: name.to_string(),
                })
        };
        let first_col = column(FIRST_NAME)?;
        let last_col = column(LAST_NAME)?;

        let mut totals = CourseTotals {
            headers,
            ..Default::default()
        };
        for row in grid.rows.iter().skip(1) {
            let first = grid_text(row, first_col);
            if first.is_empty() || row_is_excluded(row, exclude) {
                continue;
            }
            let student = Student::new(&first, &grid_text(row, last_col));
            totals
                .index
                .entry(student.clone())
                .or_insert(totals.rows.len());
            totals.students.push(student);
            totals.rows.push(row.clone());
        }
        Ok(totals)
    }

    pub fn value(&self, student: &Student, column: Option<usize>) -> CellValue {
        let (Some(column), Some(&row)) = (column, self.index.get(student)) else {
            return CellValue::Empty;
        };
        self.rows[row].get(column).cloned().unwrap_or_default()
    }

    fn last_header_matching(&self, pred: impl Fn(&str) -> bool) -> Option<usize> {
        self.headers
            .iter()
            .rposition(|h| pred(&normalize_title(h)))
    }

    /// Percentage and letter columns for an assignment, matched on its full
    /// or stripped title. The last matching column wins. A blank title
    /// matches nothing.
    pub fn grade_columns(&self, title: &str, stripped_title: &str) -> (Option<usize>, Option<usize>) {
        let needles: Vec<String> = [title, stripped_title]
            .iter()
            .map(|t| normalize_title(t))
            .filter(|t| !t.is_empty())
            .collect();
        if needles.is_empty() {
            return (None, None);
        }
        let mentions = |h: &str| needles.iter().any(|n| h.contains(n.as_str()));
        (
            self.last_header_matching(|h| h.contains("(percentage)") && mentions(h)),
            self.last_header_matching(|h| h.contains("(letter)") && mentions(h)),
        )
    }

    pub fn course_total_columns(&self) -> (Option<usize>, Option<usize>) {
        (
            self.last_header_matching(|h| h.contains("course total") && h.contains("(percentage)")),
            self.last_header_matching(|h| h.contains("course total") && h.contains("(letter)")),
        )
    }

    /// Course percentage and letter per roster student.
    pub fn totals_for_roster(&self, roster: &[Student]) -> Vec<(CellValue, CellValue)> {
        let (perc_col, letter_col) = self.course_total_columns();
        roster
            .iter()
            .map(|student| {
                (
                    parse_course_percentage(&self.value(student, perc_col)),
                    self.value(student, letter_col),
                )
            })
            .collect()
    }
}

fn grid_text(row: &[CellValue], col: usize) -> String {
    row.get(col)
        .map(|c| c.to_string().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::fixtures::{e, n, t, write_xlsx};

    fn sample_grid() -> Grid {
        Grid::new(vec![
            vec![
                t("First name"),
                t("Last name"),
                t("Assignment: Essay 1 20% (Percentage)"),
                t("Assignment: Essay 1 20% (Letter)"),
                t("Course total (Percentage)"),
                t("Course total (Letter)"),
            ],
            vec![t(" Ada "), t("Lovelace"), t("85.00 %"), t("B"), t("91 %"), t("A-")],
            vec![t("Raffi"), t("Teacher"), t("100 %"), t("A"), t("100 %"), t("A")],
            vec![e(), e(), e(), e(), t("Overall average"), e()],
            vec![t("Alan"), t("Turing"), t("-"), t("-"), n(77.5), t("C+")],
        ])
    }

    fn exclude() -> Vec<String> {
        vec!["Raffi".to_string()]
    }

    #[test]
    fn rows_without_first_name_or_excluded_are_dropped() {
        let totals = CourseTotals::from_grid(&sample_grid(), Path::new("00.xlsx"), &exclude()).unwrap();
        assert_eq!(
            totals.students,
            vec![Student::new("Ada", "Lovelace"), Student::new("Alan", "Turing")]
        );
    }

    #[test]
    fn missing_name_column_is_an_error() {
        let grid = Grid::new(vec![vec![t("First name"), t("Surname")]]);
        assert!(matches!(
            CourseTotals::from_grid(&grid, Path::new("00.xlsx"), &exclude()),
            Err(GradebookError::MissingColumn { .. })
        ));
    }

    #[test]
    fn percentages_parse_or_pass_through() {
        assert_eq!(parse_course_percentage(&t("85.00 %")), n(85.0));
        assert_eq!(parse_course_percentage(&t(" - ")), t("-"));
        assert_eq!(parse_course_percentage(&n(12.5)), n(12.5));
        assert_eq!(parse_course_percentage(&e()), e());
    }

    #[test]
    fn grade_columns_match_stripped_title() {
        let totals = CourseTotals::from_grid(&sample_grid(), Path::new("00.xlsx"), &exclude()).unwrap();
        assert_eq!(totals.grade_columns("Assignment: Essay 1 20%", "Essay 1 20%"), (Some(2), Some(3)));
        assert_eq!(totals.grade_columns("Quiz", "Quiz"), (None, None));
        assert_eq!(totals.course_total_columns(), (Some(4), Some(5)));
    }

    #[test]
    fn blank_title_matches_no_grade_column() {
        let totals = CourseTotals::from_grid(&sample_grid(), Path::new("00.xlsx"), &exclude()).unwrap();
        assert_eq!(totals.grade_columns("", ""), (None, None));
        assert_eq!(totals.grade_columns("  ", ""), (None, None));
    }

    #[test]
    fn totals_follow_roster_order() {
        let totals = CourseTotals::from_grid(&sample_grid(), Path::new("00.xlsx"), &exclude()).unwrap();
        let roster = vec![
            Student::new("Alan", "Turing"),
            Student::new("Grace", "Hopper"),
            Student::new("Ada", "Lovelace"),
        ];
        assert_eq!(
            totals.totals_for_roster(&roster),
            vec![(n(77.5), t("C+")), (e(), e()), (n(91.0), t("A-"))]
        );
    }

    #[test]
    fn normalize_title_collapses_whitespace() {
        assert_eq!(normalize_title("  Essay\t 1\n20% "), "essay 1 20%");
    }

    #[test]
    fn loads_from_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("00-Course total.xlsx");
        write_xlsx(&path, &sample_grid().rows);
        let totals = load_course_totals(&path, &exclude()).unwrap();
        assert_eq!(totals.students.len(), 2);
        assert_eq!(
            totals.value(&Student::new("Ada", "Lovelace"), Some(3)),
            t("B")
        );
    }
}

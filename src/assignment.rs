use std::{collections::HashMap, path::Path, sync::LazyLock};

use regex::Regex;
use tracing::{debug, warn};

use crate::{
    config::{FIRST_NAME, LAST_NAME},
    course_totals::{parse_course_percentage, CourseTotals},
    discover::find_rubric_csv,
    error::{GradebookError, Result},
    gradebook_config::GradebookConfig,
    rubric_csv::load_criterion_labels,
    spreadsheet::{find_header_row, row_is_excluded},
    types::{row_is_empty, Assignment, CellValue, FixedColumn, Grid, Student},
};

static TRAILING_WEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)%\s*$").expect("valid regex"));
static ANY_WEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)%").expect("valid regex"));
static ASSIGNMENT_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^assignment\s*[:-]?\s*").expect("valid regex"));

/// "Essay 20%" -> "20%". A weight at the end of the title wins over one elsewhere.
pub fn extract_weight(title: &str) -> Option<String> {
    TRAILING_WEIGHT
        .captures(title)
        .or_else(|| ANY_WEIGHT.captures(title))
        .map(|caps| format!("{}%", &caps[1]))
}

/// "Assignment: Essay" -> "Essay". Never returns an empty name.
pub fn strip_assignment_word(title: &str) -> String {
    let cleaned = ASSIGNMENT_WORD.replace(title, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        title.to_string()
    } else {
        cleaned.to_string()
    }
}

pub fn total_label(weight: Option<&str>) -> String {
    match weight {
        Some(w) => format!("Total - {}", w),
        None => String::from("Total"),
    }
}

enum ColumnRole {
    FirstName,
    LastName,
    Criterion,
    Other,
}

fn column_role(header: &CellValue) -> ColumnRole {
    match header.as_text().map(str::to_lowercase).as_deref() {
        Some("definition") => ColumnRole::Criterion,
        Some(h) if h == FIRST_NAME.to_lowercase() => ColumnRole::FirstName,
        Some(h) if h == LAST_NAME.to_lowercase() => ColumnRole::LastName,
        _ => ColumnRole::Other,
    }
}

fn is_banned(header: &CellValue, banned: &[String]) -> bool {
    match header.as_text() {
        Some(h) => {
            let h = h.to_lowercase();
            banned.iter().any(|bad| h.contains(&bad.to_lowercase()))
        }
        None => false,
    }
}

/// One graded student pulled out of an export, before roster alignment.
struct GradedRow {
    student: Student,
    values: Vec<CellValue>,
}

pub fn parse_assignment(
    path: &Path,
    grid: &Grid,
    course: &CourseTotals,
    roster: &[Student],
    config: &GradebookConfig,
) -> Result<Assignment> {
    let title = grid.get(1, 0).to_string().trim().to_string();
    let display_name = strip_assignment_word(&title);
    let weight = extract_weight(&title);
    let header_row = find_header_row(grid, path)?;

    let width = grid.rows.iter().map(Vec::len).max().unwrap_or(0);
    let header: Vec<CellValue> = (0..width).map(|c| grid.get(header_row, c).clone()).collect();
    let kept: Vec<usize> = (0..width)
        .filter(|&c| !is_banned(&header[c], &config.banned_headers))
        .collect();

    let mut first_col = None;
    let mut last_col = None;
    let mut criterion_cols = Vec::new();
    for &c in kept.iter() {
        match column_role(&header[c]) {
            ColumnRole::FirstName => first_col = Some(c),
            ColumnRole::LastName => last_col = Some(c),
            ColumnRole::Criterion => criterion_cols.push(c),
            ColumnRole::Other => {}
        }
    }
    let missing = |column: &str| GradebookError::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
    };
    let first_col = first_col.ok_or_else(|| missing(FIRST_NAME))?;
    let last_col = last_col.ok_or_else(|| missing(LAST_NAME))?;

    let criteria = criterion_names(path, criterion_cols.len());
    let total = total_label(weight.as_deref());
    let (perc_col, letter_col) = course.grade_columns(&title, &display_name);
    if perc_col.is_none() {
        debug!("No course percentage column matches '{}'", title);
    }

    let mut graded: Vec<GradedRow> = Vec::new();
    for row in grid.rows.iter().skip(header_row + 1) {
        // Exclusion looks at every cell, banned columns included.
        if row_is_empty(row) || row_is_excluded(row, &config.exclude_names) {
            continue;
        }
        let cell = |c: usize| row.get(c).cloned().unwrap_or_default();
        let student = Student::new(&cell(first_col).to_string(), &cell(last_col).to_string());

        let scores: Vec<CellValue> = criterion_cols
            .iter()
            .map(|&c| cell(c).to_number().map_or(CellValue::Empty, CellValue::Number))
            .collect();
        let sum: f64 = scores.iter().filter_map(CellValue::to_number).sum();

        let mut values = scores;
        values.push(CellValue::Number(sum));
        values.push(parse_course_percentage(&course.value(&student, perc_col)));
        values.push(course.value(&student, letter_col));
        graded.push(GradedRow { student, values });
    }

    let mut columns = criteria.clone();
    columns.push(total);
    columns.push(FixedColumn::AssignmentPercentage.to_string());
    columns.push(FixedColumn::AssignmentLetter.to_string());

    let rows = align_to_roster(graded, roster, columns.len());
    debug!(
        "Parsed '{}': {} of {} roster students graded",
        title,
        rows.iter().filter(|r| !row_is_empty(r)).count(),
        roster.len()
    );

    Ok(Assignment {
        title,
        display_name,
        weight,
        criteria,
        columns,
        rows,
    })
}

/// Names for the criterion columns: rubric CSV labels, then `Criterion <n>`.
fn criterion_names(path: &Path, count: usize) -> Vec<String> {
    let labels = match find_rubric_csv(path) {
        Some(csv) => {
            debug!("Using rubric CSV {}", csv.display());
            load_criterion_labels(&csv, count)
        }
        None => Vec::new(),
    };
    if labels.len() < count {
        warn!(
            "{} of {} criteria in {} have no rubric label; using defaults",
            count - labels.len(),
            count,
            path.display()
        );
    }
    (0..count)
        .map(|i| {
            labels
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("Criterion {}", i + 1))
        })
        .collect()
}

/// One row per roster student; students missing from the export get blanks.
fn align_to_roster(graded: Vec<GradedRow>, roster: &[Student], width: usize) -> Vec<Vec<CellValue>> {
    let mut by_student: HashMap<Student, Vec<CellValue>> = HashMap::new();
    for row in graded {
        by_student.entry(row.student).or_insert(row.values);
    }
    roster
        .iter()
        .map(|student| {
            by_student
                .remove(student)
                .unwrap_or_else(|| vec![CellValue::Empty; width])
        })
        .collect()
}

use std::path::{Path, PathBuf};

use tracing::info;

use crate::{
    assignment::parse_assignment,
    config::DEFAULT_COURSE_NAME,
    course_totals::load_course_totals,
    discover::list_input_files,
    error::Result,
    gradebook_config::GradebookConfig,
    layout::build_layout,
    roster::build_roster,
    spreadsheet::read_grid,
    types::Grid,
    write_workbook::write_workbook,
};

#[derive(Debug)]
pub struct ConsolidateSummary {
    pub workbook: PathBuf,
    pub course_name: String,
    pub students: usize,
    pub assignments: usize,
}

/// Course name from the configuration, else cell A1 of the first assignment export.
pub fn course_name(config: &GradebookConfig, first_export: Option<&Grid>) -> String {
    config
        .course_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .or_else(|| {
            first_export
                .map(|grid| grid.get(0, 0).to_string().trim().to_string())
                .filter(|name| !name.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_COURSE_NAME.to_string())
}

pub fn consolidate(input_dir: &Path, output: &Path, config: &GradebookConfig) -> Result<ConsolidateSummary> {
    let inputs = list_input_files(input_dir)?;
    info!(
        "Found course total file {} and {} assignment export(s)",
        inputs.course_file.display(),
        inputs.assignment_files.len()
    );

    let course = load_course_totals(&inputs.course_file, &config.exclude_names)?;
    let grids = inputs
        .assignment_files
        .iter()
        .map(|path| read_grid(path))
        .collect::<Result<Vec<Grid>>>()?;
    let sources: Vec<(&Path, &Grid)> = inputs
        .assignment_files
        .iter()
        .map(PathBuf::as_path)
        .zip(grids.iter())
        .collect();

    let roster = build_roster(&course, &sources, &config.exclude_names)?;
    let course_name = course_name(config, grids.first());

    let mut assignments = Vec::with_capacity(sources.len());
    for (path, grid) in sources.iter() {
        info!("Processing {}", path.display());
        let assignment = parse_assignment(path, grid, &course, &roster, config)?;
        info!(
            "'{}': {} criteria, weight {}",
            assignment.title,
            assignment.criteria.len(),
            assignment.weight.as_deref().unwrap_or("none")
        );
        assignments.push(assignment);
    }

    let course_totals = course.totals_for_roster(&roster);
    let layout = build_layout(
        &course_name,
        &roster,
        &assignments,
        &course_totals,
        config.header_rotation,
    );
    write_workbook(&layout, output)?;

    Ok(ConsolidateSummary {
        workbook: output.to_path_buf(),
        course_name,
        students: roster.len(),
        assignments: assignments.len(),
    })
}

#[cfg(test)]
mod tests {
    use assert_fs::prelude::*;
    use predicates::prelude::*;

    use super::*;
    use crate::{
        error::GradebookError,
        spreadsheet::fixtures::{e, n, t, write_xlsx},
        types::CellValue,
    };

    fn course_rows() -> Vec<Vec<CellValue>> {
        vec![
            vec![
                t("First name"),
                t("Last name"),
                t("Email address"),
                t("Assignment: Essay 20% (Percentage)"),
                t("Assignment: Essay 20% (Letter)"),
                t("Quiz (Percentage)"),
                t("Course total (Percentage)"),
                t("Course total (Letter)"),
            ],
            vec![t("Ada"), t("Lovelace"), t("ada@example.edu"), t("87.50 %"), t("B+"), t("100.00 %"), t("90.00 %"), t("A-")],
            vec![t("Alan"), t("Turing"), t("alan@example.edu"), t("-"), t("-"), t("50.00 %"), t("40.00 %"), t("F")],
            vec![t("Raffi"), t("Staff"), t("raffi@example.edu"), t("100 %"), t("A"), t("100 %"), t("100 %"), t("A")],
        ]
    }

    fn essay_rows() -> Vec<Vec<CellValue>> {
        vec![
            vec![t("CS 101 - Intro to Computing")],
            vec![t("Assignment: Essay 20%")],
            vec![],
            vec![
                t("First name"), t("Last name"), t("Username"),
                t("Definition"), t("Score"), t("Feedback"),
                t("Definition"), t("Score"), t("Feedback"),
                t("Graded by"), t("Time graded"),
            ],
            vec![
                t("Ada"), t("Lovelace"), t("ada"),
                n(4.0), n(4.0), t("Strong"),
                n(3.0), n(3.0), t("Good"),
                t("T. Assistant"), t("1 May"),
            ],
            vec![
                t("Grace"), t("Hopper"), t("grace"),
                n(1.0), n(1.0), t("Weak"),
                e(), e(), e(),
                e(), e(),
            ],
        ]
    }

    fn quiz_rows() -> Vec<Vec<CellValue>> {
        vec![
            vec![t("CS 101 - Intro to Computing")],
            vec![t("Quiz")],
            vec![t("First name"), t("Last name"), t("Definition")],
            vec![t("Alan"), t("Turing"), n(5.0)],
        ]
    }

    fn seed(dir: &assert_fs::TempDir) {
        write_xlsx(&dir.path().join("00-Course total.xlsx"), &course_rows());
        write_xlsx(&dir.path().join("01-Essay 20%.xlsx"), &essay_rows());
        write_xlsx(&dir.path().join("02-Quiz.xlsx"), &quiz_rows());
        dir.child("Essay 20% - Rubric Percentage.csv")
            .write_str("Thesis (50%)\nEvidence (50%)\n")
            .unwrap();
    }

    #[test]
    fn consolidates_exports_into_one_sheet() {
        let dir = assert_fs::TempDir::new().unwrap();
        seed(&dir);
        let output = dir.path().join("consolidated.xlsx");

        let summary = consolidate(dir.path(), &output, &GradebookConfig::default()).unwrap();
        dir.child("consolidated.xlsx").assert(predicate::path::exists());
        assert_eq!(summary.course_name, "CS 101 - Intro to Computing");
        assert_eq!(summary.students, 3);
        assert_eq!(summary.assignments, 2);

        // Columns: names(2) | Thesis, Evidence, Total - 20%, Total - 100, Total - Letter
        //          | Criterion 1, Total, Total - 100, Total - Letter | course total(2)
        let grid = read_grid(&output).unwrap();
        assert_eq!(
            grid.get(0, 0),
            &t("CS 101 - Intro to Computing\nAssignment Grade Breakdown Per Criteria")
        );
        assert_eq!(grid.get(1, 2), &t("Essay 20%"));
        assert_eq!(grid.get(1, 7), &t("Quiz"));
        assert_eq!(grid.get(1, 11), &t("Course Total"));
        assert_eq!(grid.get(2, 2), &t("Thesis (50%)"));
        assert_eq!(grid.get(2, 4), &t("Total - 20%"));
        assert_eq!(grid.get(2, 7), &t("Criterion 1"));
        assert_eq!(grid.get(2, 8), &t("Total"));
        assert_eq!(grid.get(2, 12), &t("Course total - Letter"));

        // Ada
        assert_eq!(grid.get(3, 0), &t("Ada"));
        assert_eq!(grid.get(3, 4), &n(7.0));
        assert_eq!(grid.get(3, 5), &n(87.5));
        assert_eq!(grid.get(3, 6), &t("B+"));
        // Ada has no quiz row.
        assert_eq!(grid.get(3, 7), &CellValue::Empty);
        assert_eq!(grid.get(3, 9), &CellValue::Empty);
        assert_eq!(grid.get(3, 11), &n(90.0));
        // Alan: no essay row, but his course columns still show.
        assert_eq!(grid.get(4, 0), &t("Alan"));
        assert_eq!(grid.get(4, 4), &CellValue::Empty);
        assert_eq!(grid.get(4, 8), &n(5.0));
        assert_eq!(grid.get(4, 9), &n(50.0));
        assert_eq!(grid.get(4, 10), &CellValue::Empty);
        assert_eq!(grid.get(4, 12), &t("F"));
        // Grace only appears in the essay export.
        assert_eq!(grid.get(5, 0), &t("Grace"));
        assert_eq!(grid.get(5, 2), &n(1.0));
        assert_eq!(grid.get(5, 3), &CellValue::Empty);
        assert_eq!(grid.get(5, 4), &n(1.0));
        assert_eq!(grid.get(5, 11), &CellValue::Empty);
        assert_eq!(grid.rows.len(), 6);
    }

    #[test]
    fn configured_course_name_wins() {
        let dir = assert_fs::TempDir::new().unwrap();
        seed(&dir);
        let config = GradebookConfig {
            course_name: Some("Fall Section B".to_string()),
            ..Default::default()
        };
        let summary = consolidate(dir.path(), &dir.path().join("out.xlsx"), &config).unwrap();
        assert_eq!(summary.course_name, "Fall Section B");
    }

    #[test]
    fn course_name_defaults_without_exports() {
        assert_eq!(course_name(&GradebookConfig::default(), None), "Course");
        let blank = Grid::new(vec![vec![t("  ")]]);
        assert_eq!(course_name(&GradebookConfig::default(), Some(&blank)), "Course");
    }

    #[test]
    fn missing_course_file_stops_the_run() {
        let dir = assert_fs::TempDir::new().unwrap();
        write_xlsx(&dir.path().join("01-Quiz.xlsx"), &quiz_rows());
        let result = consolidate(dir.path(), &dir.path().join("out.xlsx"), &GradebookConfig::default());
        assert!(matches!(result, Err(GradebookError::MissingCourseFile(_))));
        dir.child("out.xlsx").assert(predicate::path::missing());
    }
}

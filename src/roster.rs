use std::{collections::HashSet, path::Path};

use crate::{
    course_totals::CourseTotals,
    error::Result,
    spreadsheet::{find_header_row, row_is_excluded},
    types::{row_is_empty, CellValue, Grid, Student},
};

/// Ordered, de-duplicated list of complete student names.
#[derive(Debug, Default)]
pub struct RosterBuilder {
    roster: Vec<Student>,
    seen: HashSet<Student>,
}

impl RosterBuilder {
    pub fn add(&mut self, student: Student) {
        if student.is_complete() && self.seen.insert(student.clone()) {
            self.roster.push(student);
        }
    }

    pub fn build(self) -> Vec<Student> {
        self.roster
    }
}

/// Students from the course total file first, then anyone who only shows up
/// in an assignment export, in export order.
pub fn build_roster(
    course: &CourseTotals,
    assignments: &[(&Path, &Grid)],
    exclude: &[String],
) -> Result<Vec<Student>> {
    let mut builder = RosterBuilder::default();
    for student in course.students.iter() {
        builder.add(student.clone());
    }

    for (path, grid) in assignments {
        let header_row = find_header_row(grid, path)?;
        for row in grid.rows.iter().skip(header_row + 1) {
            let names: Vec<CellValue> = (0..2)
                .map(|col| row.get(col).cloned().unwrap_or_default())
                .collect();
            if row_is_empty(&names) || row_is_excluded(&names, exclude) {
                continue;
            }
            builder.add(Student::new(&names[0].to_string(), &names[1].to_string()));
        }
    }
    Ok(builder.build())
}

use std::collections::BTreeMap;

use crate::{
    config::{
        COURSE_TOTAL_GROUP_LABEL, FIRST_NAME, LAST_NAME, STUDENTS_GROUP_LABEL, TITLE_SUBTITLE,
    },
    types::{Assignment, CellValue, FixedColumn, Student},
};

pub const TITLE_ROW: u32 = 0;
pub const GROUP_ROW: u32 = 1;
pub const HEADER_ROW: u32 = 2;
pub const DATA_START: u32 = 3;
pub const NAME_COLUMNS: u16 = 2;

const TITLE_ROW_HEIGHT: f64 = 34.0;
const MIN_GROUP_ROW_HEIGHT: f64 = 24.0;
const MIN_HEADER_ROW_HEIGHT: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRole {
    Title,
    Group,
    Header,
    Name,
    Data,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutCell {
    pub value: CellValue,
    pub role: CellRole,
    /// Odd data rows get the zebra fill.
    pub striped: bool,
    /// Last column of a section; drawn with a heavy right border.
    pub section_end: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedCell {
    pub row: u32,
    pub first_col: u16,
    pub last_col: u16,
    pub cell: LayoutCell,
}

/// Everything the workbook writer needs, with 0-based coordinates.
#[derive(Debug, Clone, Default)]
pub struct SheetLayout {
    pub cells: BTreeMap<(u32, u16), LayoutCell>,
    pub merges: Vec<MergedCell>,
    pub column_widths: Vec<f64>,
    pub row_heights: BTreeMap<u32, f64>,
    pub section_ends: Vec<u16>,
    pub header_rotation: i16,
    pub last_row: u32,
    pub last_col: u16,
}

pub fn title_text(course_name: &str) -> String {
    format!("{}\n{}", course_name, TITLE_SUBTITLE)
}

fn text_len(value: &CellValue) -> usize {
    value.to_string().replace('\n', " ").chars().count()
}

impl SheetLayout {
    fn put(&mut self, row: u32, col: u16, value: CellValue, role: CellRole) {
        self.cells.insert(
            (row, col),
            LayoutCell {
                value,
                role,
                striped: false,
                section_end: false,
            },
        );
    }

    fn merge(&mut self, row: u32, first_col: u16, last_col: u16, value: &str, role: CellRole) {
        self.merges.push(MergedCell {
            row,
            first_col,
            last_col,
            cell: LayoutCell {
                value: CellValue::from(value),
                role,
                striped: false,
                section_end: false,
            },
        });
    }

    fn put_block(&mut self, first_col: u16, label: &str, headers: &[String], rows: &[Vec<CellValue>]) -> u16 {
        let width = headers.len() as u16;
        let last_col = first_col + width - 1;
        self.merge(GROUP_ROW, first_col, last_col, label, CellRole::Group);
        for (i, header) in headers.iter().enumerate() {
            self.put(HEADER_ROW, first_col + i as u16, CellValue::from(header.as_str()), CellRole::Header);
        }
        for (r, values) in rows.iter().enumerate() {
            for i in 0..width {
                let value = values.get(i as usize).cloned().unwrap_or_default();
                self.put(DATA_START + r as u32, first_col + i, value, CellRole::Data);
            }
        }
        self.section_ends.push(last_col);
        last_col
    }

    pub fn value_at(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cells.get(&(row, col)).map(|c| &c.value).or_else(|| {
            self.merges
                .iter()
                .find(|m| m.row == row && m.first_col == col)
                .map(|m| &m.cell.value)
        })
    }

    fn apply_stripes_and_sections(&mut self) {
        let section_ends = self.section_ends.clone();
        for (&(row, col), cell) in self.cells.iter_mut() {
            cell.striped = row >= DATA_START && (row - DATA_START) % 2 == 1;
            cell.section_end = section_ends.contains(&col);
        }
        for merged in self.merges.iter_mut() {
            merged.cell.section_end = section_ends.contains(&merged.last_col);
        }
    }

    fn autosize(&mut self) {
        let mut widths = Vec::with_capacity(self.last_col as usize + 1);
        let mut header_max_len = 0;
        for col in 0..=self.last_col {
            let mut max_len = 0;
            for row in 0..=self.last_row {
                let Some(value) = self.value_at(row, col) else {
                    continue;
                };
                let len = text_len(value);
                max_len = max_len.max(len);
                if row <= HEADER_ROW {
                    header_max_len = header_max_len.max(len);
                }
            }
            let (min_w, max_w) = if col < NAME_COLUMNS { (14.0, 40.0) } else { (8.0, 30.0) };
            widths.push(f64::min(f64::max(min_w, max_len as f64 + 2.0), max_w));
        }
        self.column_widths = widths;

        self.row_heights.insert(TITLE_ROW, TITLE_ROW_HEIGHT);
        self.row_heights.insert(GROUP_ROW, MIN_GROUP_ROW_HEIGHT);
        self.row_heights.insert(
            HEADER_ROW,
            f64::max(MIN_HEADER_ROW_HEIGHT, header_max_len as f64 * 2.0),
        );
    }
}

/// Lays out students on the left, one block per assignment, and the course
/// total on the right, under a title banner.
pub fn build_layout(
    course_name: &str,
    roster: &[Student],
    assignments: &[Assignment],
    course_totals: &[(CellValue, CellValue)],
    header_rotation: i16,
) -> SheetLayout {
    let mut layout = SheetLayout {
        header_rotation,
        ..Default::default()
    };

    let total_columns: u16 =
        NAME_COLUMNS + assignments.iter().map(|a| a.columns.len() as u16).sum::<u16>() + 2;
    layout.last_col = total_columns - 1;
    layout.last_row = (DATA_START + roster.len() as u32).saturating_sub(1).max(HEADER_ROW);

    layout.merge(TITLE_ROW, 0, layout.last_col, &title_text(course_name), CellRole::Title);

    layout.merge(GROUP_ROW, 0, NAME_COLUMNS - 1, STUDENTS_GROUP_LABEL, CellRole::Group);
    layout.put(HEADER_ROW, 0, CellValue::from(FIRST_NAME), CellRole::Header);
    layout.put(HEADER_ROW, 1, CellValue::from(LAST_NAME), CellRole::Header);
    for (r, student) in roster.iter().enumerate() {
        let row = DATA_START + r as u32;
        layout.put(row, 0, CellValue::from(student.first.as_str()), CellRole::Name);
        layout.put(row, 1, CellValue::from(student.last.as_str()), CellRole::Name);
    }
    layout.section_ends.push(NAME_COLUMNS - 1);

    let mut col = NAME_COLUMNS;
    for assignment in assignments {
        col = layout.put_block(col, &assignment.display_name, &assignment.columns, &assignment.rows) + 1;
    }

    let course_headers = vec![
        FixedColumn::CoursePercentage.to_string(),
        FixedColumn::CourseLetter.to_string(),
    ];
    let course_rows: Vec<Vec<CellValue>> = course_totals
        .iter()
        .map(|(perc, letter)| vec![perc.clone(), letter.clone()])
        .collect();
    layout.put_block(col, COURSE_TOTAL_GROUP_LABEL, &course_headers, &course_rows);

    layout.apply_stripes_and_sections();
    layout.autosize();
    layout
}

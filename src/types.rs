use std::fmt;

/// A single spreadsheet value as far as the gradebook cares.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Number(n) => n.is_nan(),
            CellValue::Text(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the cell. Text is accepted when it parses as a number.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if !n.is_nan() => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
            _ => None,
        }
    }

    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        if self.is_empty() {
            return false;
        }
        self.to_string()
            .to_lowercase()
            .contains(&needle.to_lowercase())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            // Whole numbers keep one decimal so 85 reads as "85.0", like a float column would.
            CellValue::Number(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{:.1}", n),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// Rows of cells anchored at A1. Rows may have different lengths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    pub rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Grid { rows }
    }

    pub fn get(&self, row: usize, col: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(EMPTY)
    }
}

pub fn row_is_empty(row: &[CellValue]) -> bool {
    row.iter().all(CellValue::is_empty)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Student {
    pub first: String,
    pub last: String,
}

impl Student {
    pub fn new(first: &str, last: &str) -> Self {
        Student {
            first: first.trim().to_string(),
            last: last.trim().to_string(),
        }
    }

    /// A usable roster entry needs both names.
    pub fn is_complete(&self) -> bool {
        !self.first.is_empty() && !self.last.is_empty()
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first, self.last)
    }
}

/// Output columns whose headers never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum FixedColumn {
    #[strum(serialize = "Total - 100")]
    AssignmentPercentage,
    #[strum(serialize = "Total - Letter")]
    AssignmentLetter,
    #[strum(serialize = "Course total - 100")]
    CoursePercentage,
    #[strum(serialize = "Course total - Letter")]
    CourseLetter,
}

/// One assignment's block of columns, already aligned to the roster.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub title: String,
    pub display_name: String,
    pub weight: Option<String>,
    pub criteria: Vec<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

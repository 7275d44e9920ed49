use std::{io, path::PathBuf};

pub type Result<T> = std::result::Result<T, GradebookError>;

#[derive(thiserror::Error, Debug)]
pub enum GradebookError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Failed to read workbook: {0}")]
    ReadWorkbook(#[from] calamine::XlsxError),

    #[error("Failed to write workbook: {0}")]
    WriteWorkbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("No course total file starting with '00-' was found in {0:?}.")]
    MissingCourseFile(PathBuf),

    #[error("{0:?} has no worksheets")]
    EmptyWorkbook(PathBuf),

    #[error("Could not locate the header row with 'First name' in {0:?}.")]
    MissingHeaderRow(PathBuf),

    #[error("{path:?} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },

    #[error("No rubric criteria found in {0:?}")]
    NoRubricCriteria(PathBuf),

    #[error("Could not determine the assignment name from {0:?}; pass --name")]
    MissingAssignmentName(PathBuf),
}

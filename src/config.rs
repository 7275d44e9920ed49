use std::path::{Path, PathBuf};

pub const COURSE_FILE_PREFIX: &str = "00";
pub const LOCK_FILE_PREFIX: &str = "~$";
pub const RUBRIC_CSV_SUFFIX: &str = " - Rubric Percentage.csv";
pub const SETTINGS_FILE_NAME: &str = "gradebook.json";

pub const DEFAULT_EXCLUDE_NAMES: [&str; 1] = ["Raffi"];
pub const DEFAULT_BANNED_HEADERS: [&str; 5] =
    ["username", "score", "feedback", "graded by", "time graded"];
pub const DEFAULT_HEADER_ROTATION: i16 = 90;
pub const DEFAULT_COURSE_NAME: &str = "Course";

pub const SHEET_NAME: &str = "Consolidated";
pub const TITLE_SUBTITLE: &str = "Assignment Grade Breakdown Per Criteria";
pub const STUDENTS_GROUP_LABEL: &str = "Students";
pub const COURSE_TOTAL_GROUP_LABEL: &str = "Course Total";
pub const FIRST_NAME: &str = "First name";
pub const LAST_NAME: &str = "Last name";

// Fills and border colours.
pub const TITLE_FILL: u32 = 0xBFBFBF;
pub const GROUP_FILL: u32 = 0xD0D0D0;
pub const HEADER_FILL: u32 = 0xE6E6E6;
pub const STRIPE_FILL: u32 = 0xF7F7F7;
pub const THIN_BORDER: u32 = 0x999999;
pub const THICK_BORDER: u32 = 0x666666;

pub const A4_PAPER: u8 = 9;

/// Name of the rubric CSV that pairs with an assignment named `base`.
pub fn rubric_csv_name(base: &str) -> String {
    format!("{}{}", base, RUBRIC_CSV_SUFFIX)
}

pub fn rubric_csv_file(dir: &Path, base: &str) -> PathBuf {
    dir.join(rubric_csv_name(base))
}

pub fn default_settings_file(input_dir: &Path) -> PathBuf {
    input_dir.join(SETTINGS_FILE_NAME)
}

/// LibreOffice names its output after the workbook stem.
pub fn libreoffice_pdf_output(xlsx_path: &Path, out_dir: &Path) -> PathBuf {
    let stem = xlsx_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    out_dir.join(format!("{}.pdf", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rubric_csv_name_appends_suffix() {
        assert_eq!(
            rubric_csv_name("Essay 1 20%"),
            "Essay 1 20% - Rubric Percentage.csv"
        );
    }

    #[test]
    fn libreoffice_output_uses_stem() {
        assert_eq!(
            libreoffice_pdf_output(Path::new("/a/b/grades.xlsx"), Path::new("/out")),
            PathBuf::from("/out/grades.pdf")
        );
    }
}

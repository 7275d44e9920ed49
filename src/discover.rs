use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::warn;

use crate::{
    config::{rubric_csv_file, COURSE_FILE_PREFIX, LOCK_FILE_PREFIX},
    error::{GradebookError, Result},
};

#[derive(Debug, Clone, PartialEq)]
pub struct InputFiles {
    pub course_file: PathBuf,
    /// Ordered by numeric prefix.
    pub assignment_files: Vec<PathBuf>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Everything before the first `-` of the file name.
pub fn name_prefix(path: &Path) -> String {
    let name = file_name(path);
    match name.split_once('-') {
        Some((prefix, _)) => prefix.to_string(),
        None => name,
    }
}

fn numeric_prefix(path: &Path) -> Option<u64> {
    let prefix = name_prefix(path);
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match prefix.parse() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("Skipping {}: prefix {} is not usable ({})", path.display(), prefix, e);
            None
        }
    }
}

pub fn list_input_files(dir: &Path) -> Result<InputFiles> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "xlsx"))
        .filter(|p| !file_name(p).starts_with(LOCK_FILE_PREFIX))
        .collect();
    entries.sort();

    let mut course_file = None;
    let mut assignment_files = Vec::new();
    for path in entries {
        if name_prefix(&path) == COURSE_FILE_PREFIX {
            course_file = Some(path);
        } else if let Some(n) = numeric_prefix(&path) {
            assignment_files.push((n, path));
        }
    }
    assignment_files.sort_by_key(|(n, _)| *n);

    let course_file =
        course_file.ok_or_else(|| GradebookError::MissingCourseFile(dir.to_path_buf()))?;
    Ok(InputFiles {
        course_file,
        assignment_files: assignment_files.into_iter().map(|(_, p)| p).collect(),
    })
}

/// Assignment name used to pair an export with its rubric CSV:
/// the file name after the numeric prefix, without extension.
pub fn assignment_base_name(path: &Path) -> String {
    let name = file_name(path);
    let base = match name.split_once('-') {
        Some((_, rest)) => rest.to_string(),
        None => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    let base = match base.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => base.as_str(),
    };
    base.trim().to_string()
}

pub fn find_rubric_csv(path: &Path) -> Option<PathBuf> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let base = assignment_base_name(path);

    let direct = rubric_csv_file(dir, &base);
    if direct.is_file() {
        return Some(direct);
    }
    let alt = dir.join(format!("{}.csv", base));
    if alt.is_file() {
        return Some(alt);
    }

    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    candidates.sort();
    candidates.into_iter().find(|candidate| {
        candidate
            .file_stem()
            .is_some_and(|stem| stem.to_string_lossy().contains(&base))
    })
}

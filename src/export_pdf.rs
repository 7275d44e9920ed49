use std::{
    fs::{self, create_dir_all},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use tracing::{debug, warn};

use crate::config::libreoffice_pdf_output;

const CONVERTERS: [&str; 2] = ["soffice", "libreoffice"];

#[derive(Debug, PartialEq)]
pub enum PdfOutcome {
    Written(PathBuf),
    ToolMissing,
    Failed(String),
}

pub fn find_converter() -> Option<PathBuf> {
    CONVERTERS.iter().find_map(|bin| which::which(bin).ok())
}

/// Converts the workbook with a headless LibreOffice. Never fatal: problems
/// are reported through the outcome.
pub fn export_pdf(xlsx_path: &Path, pdf_path: &Path) -> PdfOutcome {
    match find_converter() {
        Some(converter) => export_pdf_with(&converter, xlsx_path, pdf_path),
        None => {
            warn!(
                "Skipping PDF export (LibreOffice/soffice not found). Intended path: {}",
                pdf_path.display()
            );
            PdfOutcome::ToolMissing
        }
    }
}

pub fn export_pdf_with(converter: &Path, xlsx_path: &Path, pdf_path: &Path) -> PdfOutcome {
    let out_dir = match pdf_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if let Err(e) = create_dir_all(&out_dir) {
        return PdfOutcome::Failed(format!("Failed to create {}: {}", out_dir.display(), e));
    }

    debug!("Converting {} with {}", xlsx_path.display(), converter.display());
    let status = Command::new(converter)
        .arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg("--outdir")
        .arg(&out_dir)
        .arg(xlsx_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(status) if status.success() => {}
        Ok(status) => {
            warn!("PDF export failed via LibreOffice for {}", xlsx_path.display());
            return PdfOutcome::Failed(format!("{} exited with {}", converter.display(), status));
        }
        Err(e) => {
            warn!("PDF export failed via LibreOffice for {}", xlsx_path.display());
            return PdfOutcome::Failed(e.to_string());
        }
    }

    let produced = libreoffice_pdf_output(xlsx_path, &out_dir);
    if produced != pdf_path {
        if !produced.exists() {
            return PdfOutcome::Failed(format!("Expected {} to be produced", produced.display()));
        }
        if let Err(e) = fs::rename(&produced, pdf_path) {
            return PdfOutcome::Failed(format!(
                "Failed to move {} to {}: {}",
                produced.display(),
                pdf_path.display(),
                e
            ));
        }
    }
    PdfOutcome::Written(pdf_path.to_path_buf())
}

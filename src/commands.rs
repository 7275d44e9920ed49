use std::path::{Path, PathBuf};

use tracing::info;

use crate::{
    consolidate,
    discover::{find_rubric_csv, list_input_files},
    export_pdf::{export_pdf, PdfOutcome},
    gradebook_config::load_config,
    scrape_rubric,
    util::{confirm_overwrite, confirm_overwrite_with, prompt_yn},
};

pub struct ConsolidateArgs<'a> {
    pub input_dir: &'a Path,
    pub output: &'a Path,
    pub pdf: Option<&'a Path>,
    pub no_pdf: bool,
    pub config: Option<&'a Path>,
    pub course_name: Option<String>,
    pub assume_yes: bool,
}

pub fn consolidate(args: ConsolidateArgs) -> bool {
    let mut config = match load_config(args.config, args.input_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error reading settings: {}", e);
            return false;
        }
    };
    if args.course_name.is_some() {
        config.course_name = args.course_name;
    }
    if args.no_pdf {
        config.pdf = false;
    }

    if !confirm_overwrite(args.output, args.assume_yes) {
        println!("Aborting...");
        return false;
    }
    let pdf_path = pdf_destination(args.output, args.pdf);
    config.pdf = should_export_pdf(config.pdf, &pdf_path, args.assume_yes, |question| {
        prompt_yn(question).unwrap_or(false)
    });

    let summary = match consolidate::consolidate(args.input_dir, args.output, &config) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error consolidating grades: {}", e);
            return false;
        }
    };
    info!(
        "{}: {} students across {} assignments",
        summary.course_name, summary.students, summary.assignments
    );
    println!("Wrote consolidated workbook to {}", summary.workbook.display());

    if !config.pdf {
        return true;
    }
    match export_pdf(&summary.workbook, &pdf_path) {
        PdfOutcome::Written(path) => println!("Wrote PDF to {}", path.display()),
        PdfOutcome::ToolMissing => println!("PDF not produced."),
        PdfOutcome::Failed(reason) => {
            eprintln!("{}", reason);
            println!("PDF not produced.");
        }
    }
    true
}

/// The `--pdf` path, else the workbook path with a `.pdf` extension.
fn pdf_destination(output: &Path, pdf: Option<&Path>) -> PathBuf {
    pdf.map(Path::to_path_buf)
        .unwrap_or_else(|| output.with_extension("pdf"))
}

/// An existing PDF is only replaced when the user agrees; declining skips
/// the export but keeps the workbook.
fn should_export_pdf(
    enabled: bool,
    pdf_path: &Path,
    assume_yes: bool,
    ask: impl FnOnce(&str) -> bool,
) -> bool {
    if !enabled {
        return false;
    }
    let allowed = confirm_overwrite_with(pdf_path, assume_yes, ask);
    if !allowed {
        println!("Keeping {}; skipping the PDF export.", pdf_path.display());
    }
    allowed
}

pub fn list_inputs(input_dir: &Path) -> bool {
    match list_input_files(input_dir) {
        Ok(inputs) => {
            println!("Course total: {}", inputs.course_file.display());
            for path in inputs.assignment_files.iter() {
                let rubric = match find_rubric_csv(path) {
                    Some(csv) => csv.display().to_string(),
                    None => String::from("default labels"),
                };
                println!("{} -> {}", path.display(), rubric);
            }
            true
        }
        Err(e) => {
            eprintln!("{}", e);
            false
        }
    }
}

pub fn scrape_rubric(html: &Path, name: Option<&str>, out_dir: &Path, assume_yes: bool) -> bool {
    let page = match std::fs::read_to_string(html) {
        Ok(page) => page,
        Err(e) => {
            eprintln!("Error reading {}: {}", html.display(), e);
            return false;
        }
    };
    let target = match scrape_rubric::rubric_csv_target(html, &page, name, out_dir) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("Error naming the rubric CSV: {}", e);
            return false;
        }
    };
    if !confirm_overwrite(&target, assume_yes) {
        println!("Aborting...");
        return false;
    }

    match scrape_rubric::scrape_rubric(html, &page, &target) {
        Ok(count) => {
            println!("Wrote {} rubric labels to {}", count, target.display());
            true
        }
        Err(e) => {
            eprintln!("Error scraping rubric: {}", e);
            false
        }
    }
}

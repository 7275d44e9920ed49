use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use tracing::{debug, info};

use crate::{
    config::rubric_csv_file,
    error::{GradebookError, Result},
};

static CRITERION_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<tr\b[^>]*\bclass\s*=\s*"(?:[^"]*\s)?criterion(?:\s[^"]*)?""#)
        .expect("valid regex")
});
static DESCRIPTION_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<td\b[^>]*\bclass\s*=\s*"(?:[^"]*\s)?description(?:\s[^"]*)?"[^>]*>(.*?)</td>"#)
        .expect("valid regex")
});
static SCORE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<span\b[^>]*\bclass\s*=\s*"(?:[^"]*\s)?scorevalue(?:\s[^"]*)?"[^>]*>\s*([0-9]+(?:\.[0-9]+)?)"#)
        .expect("valid regex")
});
static SCORE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div\b[^>]*\bclass\s*=\s*"(?:[^"]*\s)?score(?:\s[^"]*)?"[^>]*>\s*([0-9]+(?:\.[0-9]+)?)"#)
        .expect("valid regex")
});
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h2\b[^>]*>(.*?)</h2>").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct RubricCriterion {
    pub description: String,
    pub max_score: f64,
}

/// Visible text of an HTML fragment, whitespace collapsed.
fn html_text(fragment: &str) -> String {
    let text = TAG.replace_all(fragment, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&amp;", "&");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn parse_rubric_html(html: &str) -> Vec<RubricCriterion> {
    let starts: Vec<usize> = CRITERION_ROW.find_iter(html).map(|m| m.start()).collect();
    let mut criteria = Vec::new();
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(html.len());
        let chunk = &html[start..end];

        let Some(description) = DESCRIPTION_CELL
            .captures(chunk)
            .map(|caps| html_text(&caps[1]))
            .filter(|d| !d.is_empty())
        else {
            continue;
        };

        let mut scores: Vec<f64> = SCORE_VALUE
            .captures_iter(chunk)
            .filter_map(|caps| caps[1].parse().ok())
            .collect();
        if scores.is_empty() {
            scores = SCORE_TEXT
                .captures_iter(chunk)
                .filter_map(|caps| caps[1].parse().ok())
                .collect();
        }
        let max_score = scores.into_iter().fold(0.0, f64::max);
        debug!("Criterion '{}' worth {}", description, max_score);
        criteria.push(RubricCriterion {
            description,
            max_score,
        });
    }
    criteria
}

pub fn page_heading(html: &str) -> Option<String> {
    HEADING
        .captures(html)
        .map(|caps| html_text(&caps[1]))
        .filter(|h| !h.is_empty())
}

/// "33.333" -> "33.33", "25.00" -> "25".
fn format_percentage(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// `<description> (<share of the rubric's maximum>%)` per criterion.
pub fn criterion_labels(criteria: &[RubricCriterion]) -> Vec<String> {
    let total: f64 = criteria.iter().map(|c| c.max_score).sum();
    criteria
        .iter()
        .map(|c| {
            let share = if total > 0.0 { c.max_score / total * 100.0 } else { 0.0 };
            format!("{} ({}%)", c.description, format_percentage(share))
        })
        .collect()
}

/// Header-less, one label per line; the consolidation reads it top to bottom.
pub fn write_rubric_csv(path: &Path, labels: &[String]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    for label in labels {
        wtr.write_record([label])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Target CSV for a saved grading page, named after `name` or the page heading.
pub fn rubric_csv_target(html_path: &Path, html: &str, name: Option<&str>, out_dir: &Path) -> Result<PathBuf> {
    let name = match name {
        Some(n) if !n.trim().is_empty() => n.trim().to_string(),
        _ => page_heading(html)
            .ok_or_else(|| GradebookError::MissingAssignmentName(html_path.to_path_buf()))?,
    };
    let name = name.replace(['/', '\\'], "-");
    Ok(rubric_csv_file(out_dir, &name))
}

/// Writes the labels of an already-read grading page to `target`.
/// Returns the number of criteria written.
pub fn scrape_rubric(html_path: &Path, html: &str, target: &Path) -> Result<usize> {
    let criteria = parse_rubric_html(html);
    if criteria.is_empty() {
        return Err(GradebookError::NoRubricCriteria(html_path.to_path_buf()));
    }
    write_rubric_csv(target, &criterion_labels(&criteria))?;
    info!("Scraped {} rubric criteria", criteria.len());
    Ok(criteria.len())
}

#[cfg(test)]
mod tests {
    use assert_fs::prelude::*;
    use predicates::prelude::*;

    use super::*;
    use crate::rubric_csv::load_criterion_labels;

    const PAGE: &str = r#"
<html><body>
<h2>Essay 1 &amp; Reflection 20%</h2>
<table class="criteria" id="advancedgrading-criteria">
  <tr class="criterion odd first" id="advancedgrading-criteria-7">
    <td class="description" id="advancedgrading-criteria-7-description">Thesis <b>statement</b></td>
    <td class="levels"><table><tr class="levels">
      <td class="level"><div class="definition">Weak</div><div class="score"><span class="scorevalue">0</span> points</div></td>
      <td class="level checked"><div class="definition">Strong</div><div class="score"><span class="scorevalue">30</span> points</div></td>
    </tr></table></td>
  </tr>
  <tr class="criterion even" id="advancedgrading-criteria-8">
    <td class="description">Evidence</td>
    <td class="levels"><table><tr class="levels">
      <td class="level"><div class="score">60 points</div></td>
      <td class="level"><div class="score">15 points</div></td>
    </tr></table></td>
  </tr>
  <tr class="criterion-remark"><td class="description">not a criterion</td></tr>
</table>
</body></html>
"#;

    #[test]
    fn parses_descriptions_and_max_scores() {
        let criteria = parse_rubric_html(PAGE);
        assert_eq!(
            criteria,
            vec![
                RubricCriterion { description: "Thesis statement".to_string(), max_score: 30.0 },
                RubricCriterion { description: "Evidence".to_string(), max_score: 60.0 },
            ]
        );
    }

    #[test]
    fn labels_carry_share_of_total() {
        let labels = criterion_labels(&parse_rubric_html(PAGE));
        assert_eq!(labels, vec!["Thesis statement (33.33%)", "Evidence (66.67%)"]);
        assert_eq!(format_percentage(25.0), "25");
        assert_eq!(format_percentage(12.5), "12.5");
    }

    #[test]
    fn heading_names_the_csv() {
        assert_eq!(page_heading(PAGE).as_deref(), Some("Essay 1 & Reflection 20%"));
        let target =
            rubric_csv_target(Path::new("page.html"), PAGE, None, Path::new("out")).unwrap();
        assert_eq!(
            target,
            Path::new("out").join("Essay 1 & Reflection 20% - Rubric Percentage.csv")
        );
        let target =
            rubric_csv_target(Path::new("page.html"), PAGE, Some("Lab/2"), Path::new("out")).unwrap();
        assert_eq!(target, Path::new("out").join("Lab-2 - Rubric Percentage.csv"));
    }

    #[test]
    fn scraped_csv_feeds_the_consolidation() {
        let dir = assert_fs::TempDir::new().unwrap();
        let page = dir.child("grading.html");
        page.write_str(PAGE).unwrap();

        let csv = rubric_csv_target(page.path(), PAGE, Some("Essay"), dir.path()).unwrap();
        assert_eq!(scrape_rubric(page.path(), PAGE, &csv).unwrap(), 2);
        dir.child("Essay - Rubric Percentage.csv").assert(predicate::path::exists());
        assert_eq!(
            load_criterion_labels(&csv, 2),
            vec!["Thesis statement (33.33%)", "Evidence (66.67%)"]
        );
    }

    #[test]
    fn page_without_rubric_is_an_error() {
        let dir = assert_fs::TempDir::new().unwrap();
        let target = dir.child("Quiz - Rubric Percentage.csv");
        assert!(matches!(
            scrape_rubric(Path::new("empty.html"), "<html><h2>Quiz</h2></html>", target.path()),
            Err(GradebookError::NoRubricCriteria(_))
        ));
        target.assert(predicate::path::missing());
    }

    #[test]
    fn page_without_heading_needs_a_name() {
        assert!(matches!(
            rubric_csv_target(Path::new("page.html"), "<table></table>", None, Path::new("out")),
            Err(GradebookError::MissingAssignmentName(_))
        ));
    }
}

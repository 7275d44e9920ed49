use std::io::{self, prelude::*, Result};
use std::path::Path;

pub fn prompt_yn(prompt: &str) -> Result<bool> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    print!("{} ", prompt);
    stdout.flush()?;
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(is_yes(&line))
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// True when `path` may be written: it does not exist yet, `assume_yes` is
/// set, or the user agrees to overwrite it.
pub fn confirm_overwrite(path: &Path, assume_yes: bool) -> bool {
    confirm_overwrite_with(path, assume_yes, |question| prompt_yn(question).unwrap_or(false))
}

/// `confirm_overwrite` with the question answered by `ask`.
pub fn confirm_overwrite_with(path: &Path, assume_yes: bool, ask: impl FnOnce(&str) -> bool) -> bool {
    if !path.exists() || assume_yes {
        return true;
    }
    ask(&format!("{} Exists. Overwrite? (y/n)", path.display()))
}

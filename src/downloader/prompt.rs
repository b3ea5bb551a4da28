//! Overwrite decisions for replay files that already exist.
//!
//! Consulted only when neither the overwrite nor the keep switch is set.

use std::io::{self, BufRead, Write};
use std::path::Path;

/// Decides whether an existing replay file may be replaced
pub trait OverwritePrompt: Send + Sync {
    /// `true` to delete the file and download again
    fn confirm_overwrite(&self, path: &Path) -> bool;
}

/// Whether an answer declines the overwrite.
///
/// `n` and `no` in any case decline; every other answer, including an empty
/// line, accepts.
pub fn is_negative_answer(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("n") || answer.eq_ignore_ascii_case("no")
}

/// Interactive prompt on the terminal. Blocks the calling thread.
///
/// End of input or a read failure declines, so a closed stdin never deletes
/// files.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl OverwritePrompt for StdinPrompt {
    fn confirm_overwrite(&self, path: &Path) -> bool {
        let mut stderr = io::stderr();
        let _ = write!(
            stderr,
            "{} already exists. Overwrite? [Y/n] ",
            path.display()
        );
        let _ = stderr.flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => !is_negative_answer(&answer),
        }
    }
}

/// Same answer every time; for tests and non-interactive use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAnswer(pub bool);

impl OverwritePrompt for FixedAnswer {
    fn confirm_overwrite(&self, _path: &Path) -> bool {
        self.0
    }
}

//! Confirmation prompts rendered as `question [n]: `.

use std::io::{self, BufRead, Write};

/// Asks on stdout and reads one line from stdin. Only an exact,
/// case-insensitive `y` proceeds; anything else (including EOF or a read
/// failure) declines.
pub fn confirm(question: &str) -> bool {
    let stdin = io::stdin();
    let stdout = io::stdout();
    confirm_from(&mut stdin.lock(), &mut stdout.lock(), question).unwrap_or(false)
}

fn confirm_from(
    input: &mut impl BufRead,
    output: &mut impl Write,
    question: &str,
) -> io::Result<bool> {
    write!(output, "{question} [n]: ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("y"))
}

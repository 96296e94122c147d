use std::io::{self, Write};

const RESET: &str = "\x1b[0m";
const BRIGHT_YELLOW: &str = "\x1b[93m";
const BRIGHT_WHITE: &str = "\x1b[97m";
const CLEAR: &str = "\x1b[2J\x1b[H";

/// Renders a commit event to the terminal: clear, then the committed prefix
/// in one style concatenated with the volatile tail in another, with no
/// trailing newline so the next render overwrites it in place.
///
/// This is the only place ANSI escapes appear — `shared-reconciler` knows
/// nothing about terminals.
pub fn render(prefix: &str, tail: &str, finish: bool) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{CLEAR}\r{BRIGHT_YELLOW}{prefix} {BRIGHT_WHITE}{tail}{RESET}")?;
    if finish {
        writeln!(stdout)?;
    }
    stdout.flush()
}

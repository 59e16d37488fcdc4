//! Operator-facing console lines

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

const SEPARATOR_WIDTH: usize = 100;
const BAR_WIDTH: usize = 40;

pub fn print_success(message: &str) {
    println!("{GREEN}{message}{RESET}");
}

pub fn print_warning(message: &str) {
    println!("{YELLOW}{message}{RESET}");
}

pub fn print_error(message: &str) {
    println!("{}", error_line(message));
}

/// `message` wrapped in the red escape, for writers other than stdout
pub fn error_line(message: &str) -> String {
    format!("{RED}{message}{RESET}")
}

pub fn print_heading(message: &str) {
    println!("{BOLD}{message}{RESET}");
}

pub fn print_separator() {
    println!("{}", "=".repeat(SEPARATOR_WIDTH));
}

/// `[#####-----] 2/5`
pub fn progress_bar(done: usize, total: usize) -> String {
    let filled = if total == 0 {
        BAR_WIDTH
    } else {
        (done.min(total) * BAR_WIDTH) / total
    };
    format!(
        "[{}{}] {done}/{total}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}

pub fn print_progress(done: usize, total: usize) {
    println!("{}", progress_bar(done, total));
}

/// Explorer link for a transaction, tolerant of a trailing slash in the base URL
pub fn explorer_tx_url(explorer: &str, hash: impl std::fmt::Display) -> String {
    format!("{}/tx/{hash}", explorer.trim_end_matches('/'))
}

//! Line-delimited account input files

use std::path::Path;
use tracing::info;

use crate::domain::AccountRecord;
use crate::error::{ClaimerError, Result};

pub const WALLETS_FILE: &str = "wallets.txt";
pub const PROXIES_FILE: &str = "proxies.txt";
pub const RECIPIENTS_FILE: &str = "recipients.txt";

/// Read a file as trimmed lines. Trailing blank lines are dropped, inner ones kept.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ClaimerError::Configuration(format!("Cannot read {}: {e}", path.display()))
    })?;

    let mut lines: Vec<String> = contents.lines().map(|l| l.trim().to_string()).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    Ok(lines)
}

/// Zip wallets, proxies and recipients from `dir` into account records
pub fn load_accounts(dir: &Path) -> Result<Vec<AccountRecord>> {
    let wallets = read_lines(&dir.join(WALLETS_FILE))?;
    let proxies = read_lines(&dir.join(PROXIES_FILE))?;
    let recipients = read_lines(&dir.join(RECIPIENTS_FILE))?;

    if wallets.len() != proxies.len() || wallets.len() != recipients.len() {
        return Err(ClaimerError::Configuration(format!(
            "Input files must have the same number of lines: {} wallets, {} proxies, {} recipients",
            wallets.len(),
            proxies.len(),
            recipients.len()
        )));
    }

    let accounts: Vec<AccountRecord> = wallets
        .iter()
        .zip(&proxies)
        .zip(&recipients)
        .map(|((key, proxy), recipient)| AccountRecord::new(key, Some(proxy), recipient))
        .collect();

    info!("Loaded {} accounts from {}", accounts.len(), dir.display());
    Ok(accounts)
}

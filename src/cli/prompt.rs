//! Interactive run settings

use std::io::{self, BufRead, Write};

use super::output::error_line;
use super::Cli;
use crate::config::{DelayRange, RunConfig};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before the run settings were entered",
            ));
        }
        Ok(line.trim().to_string())
    }

    fn complain(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", error_line(message))
    }

    /// Re-asks until the answer is a non-negative integer
    pub fn ask_u64(&mut self, question: &str) -> io::Result<u64> {
        loop {
            match self.ask(question)?.parse::<u64>() {
                Ok(value) => return Ok(value),
                Err(_) => self.complain("The value you entered is not an integer digit")?,
            }
        }
    }

    /// Re-asks until the answer is `y` or `n`, in any case
    pub fn ask_yes_no(&mut self, question: &str) -> io::Result<bool> {
        loop {
            match self.ask(question)?.to_lowercase().as_str() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                _ => self.complain("You entered an incorrect answer")?,
            }
        }
    }

    /// Ask for the bounds not already given. Re-asks until `max > min`.
    pub fn ask_delay_range(
        &mut self,
        between: &str,
        min: Option<u64>,
        max: Option<u64>,
    ) -> io::Result<DelayRange> {
        loop {
            let low = match min {
                Some(value) => value,
                None => self.ask_u64(&format!("Enter minimum delay between {between}: "))?,
            };
            let high = match max {
                Some(value) => value,
                None => self.ask_u64(&format!("Enter maximum delay between {between}: "))?,
            };

            match DelayRange::new(low, high) {
                Ok(range) => return Ok(range),
                Err(e) if min.is_some() && max.is_some() => {
                    return Err(io::Error::new(io::ErrorKind::InvalidInput, e));
                }
                Err(e) => self.complain(&e)?,
            }
        }
    }
}

/// Settings from the command line, prompting for whatever was left out
pub fn resolve_run_config<R: BufRead, W: Write>(
    cli: &Cli,
    prompter: &mut Prompter<R, W>,
) -> io::Result<RunConfig> {
    let account = prompter.ask_delay_range("wallets", cli.min_account_delay, cli.max_account_delay)?;
    let action = prompter.ask_delay_range("actions", cli.min_action_delay, cli.max_action_delay)?;
    let shuffle = match cli.shuffle {
        Some(shuffle) => shuffle,
        None => prompter.ask_yes_no("Do you want to shuffle wallets (y/n)? ")?,
    };
    Ok(RunConfig::new(account, action, shuffle))
}

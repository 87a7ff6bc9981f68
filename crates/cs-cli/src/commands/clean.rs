//! Clean command
//!
//! Print the normalized form of comment text.

use anyhow::{Context, Result};
use clap::Args;
use std::io::{self, BufRead, Write};

/// Arguments for the clean command
#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Texts to normalize; one line of stdin per text when omitted
    pub text: Vec<String>,
}

/// Execute the clean command
pub fn execute(args: CleanArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.text.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("Failed to read stdin")?;
            writeln!(out, "{}", cs_core::normalize(&line))?;
        }
    } else {
        for text in &args.text {
            writeln!(out, "{}", cs_core::normalize(text))?;
        }
    }

    Ok(())
}

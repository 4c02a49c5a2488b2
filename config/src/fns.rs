use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use crate::Level;

// os
#[cfg(not(windows))]
const TICK_SETTINGS: (&str, u64) = ("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ", 80);
#[cfg(windows)]
const TICK_SETTINGS: (&str, u64) = (r"+-x| ", 200);

/// return a pre-configured progress bar
pub fn get_progress_bar(length: u64, msg: &str) -> ProgressBar {
    let progressbar_style = ProgressStyle::default_spinner()
        .tick_chars(TICK_SETTINGS.0)
        .template(" {spinner} {msg:<30} {wide_bar} ETA {eta_precise} ")
        .expect("no template error");

    let progress_bar = ProgressBar::new(length);

    progress_bar.set_style(progressbar_style);
    progress_bar.enable_steady_tick(Duration::from_millis(TICK_SETTINGS.1));
    progress_bar.set_message(msg.to_owned());

    progress_bar
}

/// classify an upper-cased residue (or dipeptide) against two curated sets
#[inline(always)]
pub fn residue_test(residue: &str, l1: &[&str], l2: &[&str]) -> Level {
    if l1.contains(&residue) {
        Level::L1
    } else if l2.contains(&residue) {
        Level::L2
    } else {
        Level::No
    }
}

/// write a headered tab-separated table to a file
pub fn write_table(path: &PathBuf, header: &str, rows: &[String]) {
    log::info!("Rows in {:?}: {}. Writing...", path, rows.len());
    let f = match File::create(path) {
        Ok(f) => f,
        Err(e) => panic!("ERROR: Could not create file: {}", e),
    };
    let mut writer = BufWriter::new(f);

    writeln!(writer, "{}", header).unwrap_or_else(|e| {
        panic!("ERROR: Could not write to file: {}", e);
    });
    for row in rows.iter() {
        writeln!(writer, "{}", row).unwrap_or_else(|e| {
            panic!("ERROR: Could not write to file: {}", e);
        });
    }
}

/// error handling for CLI
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// argument validation
pub fn validate(arg: &PathBuf) -> Result<(), CliError> {
    if !arg.exists() {
        return Err(CliError::InvalidInput(format!("{:?} does not exist", arg)));
    }

    if !arg.is_file() {
        return Err(CliError::InvalidInput(format!("{:?} is not a file", arg)));
    }

    match std::fs::metadata(arg) {
        Ok(metadata) if metadata.len() == 0 => {
            Err(CliError::InvalidInput(format!("file {:?} is empty", arg)))
        }
        Ok(_) => Ok(()),
        Err(e) => Err(CliError::IoError(e)),
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use log::info;

use config::{PROFILE_DB, PROFILE_HITS, SEQUENCE_HITS};

// twelve standard columns plus qlen/tlen, matching the hit-table parser
const MMSEQS_FORMAT: &str =
    "query,target,pident,alnlen,mismatch,gapopen,qstart,qend,tstart,tend,evalue,bits,qlen,tlen";

/// build the conserved-domain profile database from a .pn list of SMP files
pub fn make_profile_db(bin: &str, profiles: &Path, outdir: &Path) -> Result<PathBuf> {
    let db = outdir.join(PROFILE_DB);
    info!("Building profile database with {}...", bin);

    let output = Command::new(bin)
        .arg("-in")
        .arg(profiles)
        .arg("-out")
        .arg(&db)
        .output()
        .with_context(|| format!("Failed to run {}", bin))?;

    if !output.status.success() {
        bail!(
            "{} failed (exit code: {:?}): {}",
            bin,
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(db)
}

/// search canonical queries against the profile database
pub fn run_rpsblast(
    bin: &str,
    queries: &Path,
    db: &Path,
    outdir: &Path,
    evalue: f64,
    threads: usize,
) -> Result<PathBuf> {
    let out = outdir.join(PROFILE_HITS);
    info!("Searching conserved domains with {}...", bin);

    let output = Command::new(bin)
        .arg("-query")
        .arg(queries)
        .arg("-db")
        .arg(db)
        .arg("-outfmt")
        .arg("6")
        .arg("-evalue")
        .arg(evalue.to_string())
        .arg("-num_threads")
        .arg(threads.to_string())
        .arg("-out")
        .arg(&out)
        .output()
        .with_context(|| format!("Failed to run {}", bin))?;

    if !output.status.success() {
        bail!(
            "{} failed (exit code: {:?}): {}",
            bin,
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(out)
}

/// search canonical queries against the intein FASTA
pub fn run_mmseqs(
    bin: &str,
    queries: &Path,
    inteins: &Path,
    outdir: &Path,
    evalue: f64,
    threads: usize,
) -> Result<PathBuf> {
    let out = outdir.join(SEQUENCE_HITS);
    let tmp = outdir.join("mmseqs-tmp");
    info!("Searching intein database with {}...", bin);

    let output = Command::new(bin)
        .arg("easy-search")
        .arg(queries)
        .arg(inteins)
        .arg(&out)
        .arg(&tmp)
        .arg("--format-output")
        .arg(MMSEQS_FORMAT)
        .arg("-e")
        .arg(evalue.to_string())
        .arg("--threads")
        .arg(threads.to_string())
        .output()
        .with_context(|| format!("Failed to run {}", bin))?;

    if !output.status.success() {
        bail!(
            "{} failed (exit code: {:?}): {}",
            bin,
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    fs::remove_dir_all(&tmp).ok();

    Ok(out)
}

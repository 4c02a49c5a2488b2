use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, bail, Context, Result};

use packhits::{FastaRecord, FastaStore};

/// Seam to the external multiple-sequence aligner
///
/// Implementations must be shareable across workers; one call aligns one
/// record set and returns the aligned records in input order.
pub trait Aligner: Send + Sync {
    fn align(&self, records: &[FastaRecord], tag: &str) -> Result<Vec<FastaRecord>>;
}

/// mafft binding; one input file (and optionally one output file) per call
#[derive(Debug, Clone)]
pub struct Mafft {
    bin: String,
    dir: PathBuf,
    keep: bool,
}

impl Mafft {
    pub fn new(bin: &str, dir: &Path, keep: bool) -> Mafft {
        Mafft {
            bin: bin.to_string(),
            dir: dir.to_path_buf(),
            keep,
        }
    }
}

fn to_fasta(records: &[FastaRecord]) -> String {
    let mut out = String::new();

    for record in records {
        out.push('>');
        out.push_str(&record.id);
        out.push('\n');
        out.push_str(&record.seq);
        out.push('\n');
    }

    out
}

impl Aligner for Mafft {
    fn align(&self, records: &[FastaRecord], tag: &str) -> Result<Vec<FastaRecord>> {
        let tag = tag.replace(['/', '\\'], "_");
        let input = self.dir.join(format!("{}.faa", tag));
        fs::write(&input, to_fasta(records))
            .with_context(|| format!("Could not write aligner input {:?}", input))?;

        let output = Command::new(&self.bin)
            .arg("--quiet")
            .arg("--anysymbol")
            .arg(&input)
            .output()
            .with_context(|| format!("Failed to run {}", self.bin))?;

        if !output.status.success() {
            bail!(
                "{} failed on {} (exit code: {:?}): {}",
                self.bin,
                tag,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let aligned = String::from_utf8(output.stdout)
            .with_context(|| format!("{} emitted non-UTF8 output", self.bin))?;

        if self.keep {
            fs::write(self.dir.join(format!("{}.aln.faa", tag)), &aligned)
                .with_context(|| format!("Could not keep alignment for {}", tag))?;
        } else {
            fs::remove_file(&input).ok();
        }

        let store = FastaStore::from_str(&aligned)?;
        if store.len() != records.len() {
            bail!(
                "{} returned {} records for {} inputs ({})",
                self.bin,
                store.len(),
                records.len(),
                tag
            );
        }

        // rows are re-identified by id; tool output order is not trusted
        records
            .iter()
            .map(|record| {
                store
                    .get(&record.id)
                    .cloned()
                    .ok_or_else(|| anyhow!("{} output is missing record {}", self.bin, record.id))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_fasta_keeps_record_order() {
        let records = vec![
            FastaRecord::new("Intein_1", "MKLV"),
            FastaRecord::new("clipped___user_query___seq_1", "WYA"),
            FastaRecord::new("user_query___seq_1", "AAWYACC"),
        ];

        assert_eq!(
            to_fasta(&records),
            ">Intein_1\nMKLV\n>clipped___user_query___seq_1\nWYA\n>user_query___seq_1\nAAWYACC\n"
        );
    }

    #[test]
    fn test_missing_binary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mafft = Mafft::new("intein-scan-no-such-binary", dir.path(), false);
        let records = vec![FastaRecord::new("a", "MK")];

        assert!(mafft.align(&records, "a___b").is_err());
    }
}

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use config::{validate, CliError, MAX_EVALUE, MIN_THREADS};

#[derive(Debug, Parser, Serialize)]
#[command(
    name = "intein-scan",
    version = config::VERSION,
    about = "Screens protein sequences for putative inteins with splice-junction evidence"
)]
pub struct Args {
    #[arg(
        short = 'q',
        long = "queries",
        required = true,
        value_name = "PATH",
        help = "Protein FASTA with query sequences"
    )]
    pub queries: PathBuf,

    #[arg(
        short = 'i',
        long = "inteins",
        required = true,
        value_name = "PATH",
        help = "Reference intein protein FASTA"
    )]
    pub inteins: PathBuf,

    #[arg(
        short = 'p',
        long = "profiles",
        required = true,
        value_name = "PATH",
        help = "List of conserved-domain SMP profiles (.pn) for makeprofiledb"
    )]
    pub profiles: PathBuf,

    #[arg(
        short = 'o',
        long = "outdir",
        value_name = "PATH",
        default_value = "intein-scan-out",
        help = "Output directory (must not be a non-empty directory)"
    )]
    pub outdir: PathBuf,

    #[arg(
        long = "n-term-strictness",
        value_name = "LEVEL",
        default_value_t = 1,
        help = "Strictness for the intein start residue test [1|2]"
    )]
    pub n_term_strictness: u8,

    #[arg(
        long = "c-term-strictness",
        value_name = "LEVEL",
        default_value_t = 1,
        help = "Strictness for the intein end dipeptide test [1|2]"
    )]
    pub c_term_strictness: u8,

    #[arg(
        long = "refinement-strictness",
        value_name = "LEVEL",
        default_value_t = 1,
        help = "Strictness for region refinement (only 1 is supported)"
    )]
    pub refinement_strictness: u8,

    #[arg(
        long = "use-length-in-refinement",
        help = "Drop refined regions outside the expected intein length span",
        default_value_t = false
    )]
    pub use_length_in_refinement: bool,

    #[arg(
        long = "keep-alignments",
        help = "Keep per-hit alignment files instead of removing them",
        default_value_t = false
    )]
    pub keep_alignments: bool,

    #[arg(
        long = "evalue-rpsblast",
        value_name = "FLOAT",
        default_value_t = 1e-5,
        help = "E-value cutoff for the conserved-domain search"
    )]
    pub evalue_rpsblast: f64,

    #[arg(
        long = "evalue-mmseqs",
        value_name = "FLOAT",
        default_value_t = 1e-5,
        help = "E-value cutoff for the intein sequence search"
    )]
    pub evalue_mmseqs: f64,

    #[arg(
        long = "evalue-region-refinement",
        value_name = "FLOAT",
        default_value_t = 1e-10,
        help = "E-value cutoff for adopting single-target region bounds"
    )]
    pub evalue_region_refinement: f64,

    #[arg(
        long = "padding",
        value_name = "RESIDUES",
        default_value_t = config::PADDING,
        help = "Residues added around a region when clipping for alignment"
    )]
    pub padding: usize,

    #[arg(
        short = 't',
        long = "threads",
        value_name = "THREADS",
        help = "Number of threads",
        default_value_t = num_cpus::get()
    )]
    pub threads: usize,

    #[arg(
        long = "mafft",
        value_name = "BIN",
        default_value = "mafft",
        help = "Name or path of the mafft binary"
    )]
    pub mafft: String,

    #[arg(
        long = "rpsblast",
        value_name = "BIN",
        default_value = "rpsblast",
        help = "Name or path of the rpsblast binary"
    )]
    pub rpsblast: String,

    #[arg(
        long = "makeprofiledb",
        value_name = "BIN",
        default_value = "makeprofiledb",
        help = "Name or path of the makeprofiledb binary"
    )]
    pub makeprofiledb: String,

    #[arg(
        long = "mmseqs",
        value_name = "BIN",
        default_value = "mmseqs",
        help = "Name or path of the mmseqs binary"
    )]
    pub mmseqs: String,
}

impl Args {
    pub fn check(&self) -> Result<(), CliError> {
        self.validate_args()
    }

    fn validate_args(&self) -> Result<(), CliError> {
        for path in [&self.queries, &self.inteins, &self.profiles] {
            validate(path)?;
        }

        self.check_strictness()?;
        self.check_evalues()?;
        self.check_outdir()?;

        if self.threads < MIN_THREADS {
            return Err(CliError::InvalidInput(format!(
                "--threads must be at least {}, got {}",
                MIN_THREADS, self.threads
            )));
        }

        if self.padding == 0 {
            return Err(CliError::InvalidInput(
                "--padding must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    fn check_strictness(&self) -> Result<(), CliError> {
        for (option, value) in [
            ("--n-term-strictness", self.n_term_strictness),
            ("--c-term-strictness", self.c_term_strictness),
        ] {
            if !(1..=2).contains(&value) {
                return Err(CliError::InvalidInput(format!(
                    "{} must be 1 or 2, got {}",
                    option, value
                )));
            }
        }

        // declared in the interface but only the default is implemented
        if self.refinement_strictness != 1 {
            return Err(CliError::InvalidInput(format!(
                "--refinement-strictness supports only 1, got {}",
                self.refinement_strictness
            )));
        }

        Ok(())
    }

    fn check_evalues(&self) -> Result<(), CliError> {
        for (option, value) in [
            ("--evalue-rpsblast", self.evalue_rpsblast),
            ("--evalue-mmseqs", self.evalue_mmseqs),
            ("--evalue-region-refinement", self.evalue_region_refinement),
        ] {
            if !(value > 0.0 && value <= MAX_EVALUE) {
                return Err(CliError::InvalidInput(format!(
                    "{} must be in (0, {}], got {}",
                    option, MAX_EVALUE, value
                )));
            }
        }

        Ok(())
    }

    fn check_outdir(&self) -> Result<(), CliError> {
        if !self.outdir.exists() {
            return Ok(());
        }

        if !self.outdir.is_dir() {
            return Err(CliError::InvalidInput(format!(
                "--outdir {:?} exists and is not a directory",
                self.outdir
            )));
        }

        if std::fs::read_dir(&self.outdir)?.next().is_some() {
            return Err(CliError::InvalidInput(format!(
                "--outdir {:?} is not empty, refusing to overwrite",
                self.outdir
            )));
        }

        Ok(())
    }
}

//! Shared constants, evidence tags and helpers for the intein-scan workspace

pub mod fns;
pub mod mods;

pub use fns::*;
pub use mods::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// numeric values
pub const MIN_THREADS: usize = 1;
pub const PADDING: usize = 10;
pub const MAX_EVALUE: f64 = 0.1;
pub const HIT_FIELDS: usize = 12;

// refined regions outside this span are dropped when length gating is on
pub const REGION_MIN_LEN: u64 = 114; // 134 - 20
pub const REGION_MAX_LEN: u64 = 628; // 608 + 20

// splice-junction residue sets
pub const N_TERM_L1: [&str; 6] = ["C", "S", "A", "Q", "P", "T"];
pub const N_TERM_L2: [&str; 6] = ["V", "F", "N", "G", "M", "L"];
pub const C_TERM_L1: [&str; 6] = ["HN", "SN", "GN", "GQ", "LD", "FN"];
pub const C_TERM_L2: [&str; 11] = [
    "KN", "AN", "HQ", "PP", "TH", "CN", "KQ", "LH", "NS", "NT", "VH",
];
pub const EXTEIN_START: [&str; 3] = ["S", "T", "C"];

// sequence id schemes
pub const QUERY_PREFIX: &str = "user_query___seq_";
pub const CLIP_PREFIX: &str = "clipped___";

// output layout
pub const SEARCH_DIR: &str = "search";
pub const ALN_DIR: &str = "alignments";

// file names
pub const CANONICAL_QUERIES: &str = "queries.renamed.faa";
pub const PROFILE_DB: &str = "intein_profiles";
pub const PROFILE_HITS: &str = "rpsblast_hits.tsv";
pub const SEQUENCE_HITS: &str = "mmseqs_hits.tsv";
pub const PUTATIVE_REGIONS: &str = "putative_regions.tsv";
pub const CRITERIA_FULL: &str = "intein_criteria.tsv";
pub const CRITERIA_CONDENSED: &str = "intein_criteria_condensed.tsv";
pub const REFINED_REGIONS: &str = "refined_regions.tsv";
pub const QUERY_SUMMARY: &str = "query_summary.tsv";
pub const RUN_PARAMS: &str = "run_params.json";

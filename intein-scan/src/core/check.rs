//! Residue checking over sequence-search hits
//!
//! Each hit is handled independently: the enclosing putative region is
//! looked up by hit midpoint, a padded clipping of the query is aligned
//! together with the intein target and the full query, and the intein
//! envelope in that alignment yields the query residues at both splice
//! junctions plus the downstream extein start. Hits fan out over the
//! rayon pool; a final sort makes the collected lines deterministic.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};
use std::sync::Mutex;

use dashmap::DashSet;
use hashbrown::HashMap;
use log::warn;
use rayon::prelude::*;

use config::{
    get_progress_bar, residue_test, Level, CLIP_PREFIX, C_TERM_L1, C_TERM_L2, EXTEIN_START,
    N_TERM_L1, N_TERM_L2,
};
use packhits::{locate_region, FastaRecord, FastaStore, Hit, HitMap, Region, RegionMap};

use crate::align::Aligner;

/// Per-hit criterion verdicts, one emitted line of the full criteria table
#[derive(Debug, Clone, PartialEq)]
pub struct CheckLine {
    pub query: String,
    pub target: String,
    pub evalue: f64,
    pub region_id: usize,
    pub aln_start: u64,
    pub aln_end: u64,
    pub region_good: Level,
    pub start_good: Level,
    pub end_good: Level,
    pub extein_good: Level,
}

impl CheckLine {
    pub fn span(&self) -> String {
        format!("{}-{}", self.aln_start, self.aln_end)
    }

    pub fn row(&self) -> String {
        format!(
            "{}\t{}\t{:e}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.query,
            self.target,
            self.evalue,
            self.region_id,
            self.span(),
            self.region_good,
            self.start_good,
            self.end_good,
            self.extein_good
        )
    }
}

struct ParallelAccumulator {
    lines: Mutex<Vec<CheckLine>>,
    warned: DashSet<String>,
    skipped: AtomicU32,
}

impl Default for ParallelAccumulator {
    fn default() -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            warned: DashSet::new(),
            skipped: AtomicU32::new(0),
        }
    }
}

impl ParallelAccumulator {
    fn push(&self, line: CheckLine) {
        self.lines
            .lock()
            .expect("ERROR: Mutex lock failed")
            .push(line);
    }

    fn inc_skipped(&self) {
        self.skipped.fetch_add(1, AtomicOrdering::Relaxed);
    }

    fn num_skipped(&self) -> u32 {
        self.skipped.load(AtomicOrdering::Relaxed)
    }

    fn into_lines(self) -> Vec<CheckLine> {
        self.lines
            .into_inner()
            .expect("ERROR: Mutex lock failed")
    }
}

/// Checks splice-junction residues for every sequence-search hit
///
/// # Arguments
///
/// * `hits` - sequence-search hits per canonical query id
/// * `regions` - putative regions per canonical query id
/// * `queries` - canonical query store
/// * `inteins` - reference intein store
/// * `names` - canonical id to original id map
/// * `aligner` - external MSA gateway
/// * `padding` - residues added around the region when clipping
///
/// # Returns
///
/// * `Vec<CheckLine>` - one line per checked hit, sorted by
///   (query asc, region asc, evalue asc)
pub fn check_hits(
    hits: &HitMap,
    regions: &RegionMap,
    queries: &FastaStore,
    inteins: &FastaStore,
    names: &HashMap<String, String>,
    aligner: &dyn Aligner,
    padding: usize,
) -> Vec<CheckLine> {
    let flat = hits.values().flatten().collect::<Vec<_>>();
    let pb = get_progress_bar(flat.len() as u64, "Checking splice junctions...");
    let acc = ParallelAccumulator::default();

    flat.par_iter().for_each(|&hit| {
        match check_hit(hit, regions, queries, inteins, names, aligner, padding, &acc.warned) {
            Some(line) => acc.push(line),
            None => acc.inc_skipped(),
        }
        pb.inc(1);
    });

    pb.finish_and_clear();
    if acc.num_skipped() > 0 {
        warn!(
            "{} hits skipped without residue evidence",
            acc.num_skipped()
        );
    }

    let mut lines = acc.into_lines();
    sort_lines(&mut lines);

    lines
}

/// deterministic order of the full criteria table
pub fn sort_lines(lines: &mut [CheckLine]) {
    lines.sort_by(|a, b| {
        a.query
            .cmp(&b.query)
            .then(a.region_id.cmp(&b.region_id))
            .then(a.evalue.partial_cmp(&b.evalue).unwrap_or(Ordering::Equal))
    });
}

#[allow(clippy::too_many_arguments)]
fn check_hit(
    hit: &Hit,
    regions: &RegionMap,
    queries: &FastaStore,
    inteins: &FastaStore,
    names: &HashMap<String, String>,
    aligner: &dyn Aligner,
    padding: usize,
    warned: &DashSet<String>,
) -> Option<CheckLine> {
    let query = queries.get(&hit.query).unwrap_or_else(|| {
        panic!(
            "ERROR: Query {} missing from store, this is likely a bug!",
            hit.query
        )
    });
    let intein = inteins.get(&hit.target).unwrap_or_else(|| {
        panic!(
            "ERROR: Intein {} missing from store, this is likely a bug!",
            hit.target
        )
    });
    let list = regions.get(&hit.query).unwrap_or_else(|| {
        panic!(
            "ERROR: No regions built for {}, this is likely a bug!",
            hit.query
        )
    });

    // the regions were built from the same hit set, so the enclosing
    // region must exist
    let region = locate_region(list, hit.middle()).unwrap_or_else(|| {
        panic!(
            "ERROR: No region encloses hit {}:{}-{} on {}, this is likely a bug!",
            hit.target, hit.qstart, hit.qend, hit.query
        )
    });

    let clipping = clip_window(&query.seq, region, padding);
    let records = vec![
        FastaRecord::new(intein.id.clone(), intein.seq.clone()),
        FastaRecord::new(format!("{}{}", CLIP_PREFIX, query.id), clipping),
        FastaRecord::new(query.id.clone(), query.seq.clone()),
    ];
    // hit coordinates keep concurrent tasks on the same pair apart
    let tag = format!(
        "{}___{}___{}-{}",
        query.id, intein.id, hit.qstart, hit.qend
    );

    let aligned = aligner
        .align(&records, &tag)
        .unwrap_or_else(|e| panic!("ERROR: {}", e));

    let intein_aln = aligned[0].seq.as_bytes();
    let query_aln = aligned[2].seq.as_bytes();

    if intein_aln.len() != query_aln.len() {
        panic!("ERROR: Ragged alignment for {}", tag);
    }

    let name = names.get(&hit.query).map(|n| n.as_str()).unwrap_or(&hit.query);

    let (first, last) = match envelope(intein_aln) {
        Some(bounds) => bounds,
        None => {
            if warned.insert(format!("{}\t{}", name, hit.target)) {
                warn!(
                    "Intein {} aligned to {} as all gaps. Skipping...",
                    hit.target, name
                );
            }
            return None;
        }
    };

    let positions = column_positions(query_aln);

    let Some(aln_start) = positions[first] else {
        if warned.insert(format!("{}\t{}", name, hit.target)) {
            warn!(
                "Couldn't determine region start for {} x {}. Skipping...",
                name, hit.target
            );
        }
        return None;
    };
    let Some(aln_end) = positions[last] else {
        if warned.insert(format!("{}\t{}", name, hit.target)) {
            warn!(
                "Couldn't determine region end for {} x {}. Skipping...",
                name, hit.target
            );
        }
        return None;
    };

    let start_residue = (query_aln[first] as char).to_ascii_uppercase().to_string();
    let lo = last.saturating_sub(1);
    let end_dipeptide = String::from_utf8_lossy(&query_aln[lo..=last]).to_uppercase();

    // one column past the intein envelope; past the alignment end there is
    // no extein start to read
    let extein_good = match query_aln.get(last + 1) {
        Some(&residue) => {
            let residue = (residue as char).to_ascii_uppercase().to_string();
            residue_test(&residue, &EXTEIN_START, &[])
        }
        None => Level::No,
    };

    let region_good = if list.iter().any(|r| r.covers(aln_start, aln_end)) {
        Level::L1
    } else {
        Level::No
    };

    Some(CheckLine {
        query: name.to_string(),
        target: hit.target.clone(),
        evalue: hit.evalue,
        region_id: region.id,
        aln_start,
        aln_end,
        region_good,
        start_good: residue_test(&start_residue, &N_TERM_L1, &N_TERM_L2),
        end_good: residue_test(&end_dipeptide, &C_TERM_L1, &C_TERM_L2),
        extein_good,
    })
}

/// first and last non-gap columns of the aligned intein row
fn envelope(row: &[u8]) -> Option<(usize, usize)> {
    let first = row.iter().position(|&b| b != b'-')?;
    let last = row.iter().rposition(|&b| b != b'-')?;

    Some((first, last))
}

/// per-column 1-based ungapped positions of an aligned row; None on gaps
fn column_positions(row: &[u8]) -> Vec<Option<u64>> {
    let mut pos = 0u64;

    row.iter()
        .map(|&b| {
            if b == b'-' {
                None
            } else {
                pos += 1;
                Some(pos)
            }
        })
        .collect()
}

/// Padded clipping window around a region, clamped to the sequence bounds
///
/// Both window bounds subtract the padding offset; the window is NOT
/// symmetric around the region and downstream alignments depend on this
/// exact extraction.
fn clip_window(seq: &str, region: &Region, padding: usize) -> String {
    let clip_start = (region.qstart as i64 - 1 - padding as i64).max(0);
    let clip_end = (region.qend as i64 - 1 - padding as i64).min(seq.len() as i64 - 1);

    if clip_end < clip_start {
        return String::new();
    }

    seq[clip_start as usize..=clip_end as usize].to_string()
}

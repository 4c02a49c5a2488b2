//! Input packing for intein-scan
//!
//! This crate turns the raw inputs of the pipeline (tabular homology hits
//! and FASTA sequence sets) into the typed, per-query collections the
//! downstream passes consume. It also owns the Region Builder, which merges
//! overlapping hits into maximal non-overlapping putative intein regions.

use std::fmt::Debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use hashbrown::HashMap;
use log::info;
use rayon::prelude::*;

use config::{get_progress_bar, SearchKind};

pub mod record;
pub use record::{FastaRecord, FastaStore, Hit, Region};

pub type HitMap = HashMap<String, Vec<Hit>>;
pub type RegionMap = HashMap<String, Vec<Region>>;

pub fn reader<P: AsRef<Path> + Debug>(file: P) -> Result<String, anyhow::Error> {
    let mut contents = String::new();
    File::open(&file)
        .with_context(|| format!("Could not open file: {:?}", file))?
        .read_to_string(&mut contents)
        .with_context(|| format!("Could not read file: {:?}", file))?;

    Ok(contents)
}

pub fn par_reader<P: AsRef<Path> + Debug + Sync + Send>(
    files: Vec<P>,
) -> Result<String, anyhow::Error> {
    let contents: Vec<String> = files
        .par_iter()
        .map(|path| {
            reader(path)
                .unwrap_or_else(|e| panic!("ERROR: Could not read file: {:?} -> {:?}", e, path))
        })
        .collect();

    Ok(contents.concat())
}

/// Parses a homology hit table into per-query hit lists
///
/// Malformed rows are fatal and reported with the offending line. The
/// external search tools occasionally leak rows above their own e-value
/// cutoff, so a secondary `evalue <= max_evalue` filter is applied here.
///
/// # Arguments
///
/// * `contents` - the raw tab-separated table
/// * `max_evalue` - secondary upper bound on accepted hits
/// * `kind` - which search produced the table (used for reporting only)
///
/// # Returns
///
/// * `HitMap` - accepted hits grouped by canonical query id
pub fn parse_hits(
    contents: &str,
    max_evalue: f64,
    kind: SearchKind,
) -> Result<HitMap, anyhow::Error> {
    let pb = get_progress_bar(contents.lines().count() as u64, "Parsing hit tables...");
    let hits = contents
        .par_lines()
        .filter(|row| !row.is_empty() && !row.starts_with('#'))
        .map(|row| {
            let hit = Hit::parse(row).map_err(|e| anyhow!("{} from: {}", e, row));
            pb.inc(1);
            hit
        })
        .collect::<Result<Vec<_>, _>>()?;

    let total = hits.len();
    let mut tracks: HitMap = HashMap::new();
    for hit in hits {
        if hit.evalue > max_evalue {
            continue;
        }
        tracks
            .entry(hit.query.clone())
            .or_insert_with(Vec::new)
            .push(hit);
    }

    pb.finish_and_clear();
    info!(
        "Hits from {}: {} parsed, {} kept at evalue <= {}",
        kind,
        total,
        tracks.values().flatten().count(),
        max_evalue
    );

    Ok(tracks)
}

/// merge per-query hits from both searches into one map
pub fn combine(profile: &HitMap, sequence: &HitMap) -> HitMap {
    let mut tracks: HitMap = HashMap::new();

    for map in [profile, sequence] {
        for (query, hits) in map.iter() {
            tracks
                .entry(query.clone())
                .or_insert_with(Vec::new)
                .extend(hits.iter().cloned());
        }
    }

    tracks
}

/// Builds maximal non-overlapping regions per query from combined hits
///
/// Hits are scanned ascending by `(qstart, qend)`. A hit starting at or past
/// the last region's end opens a new region; touching intervals do NOT
/// merge. A hit ending past the last region's end extends it; a contained
/// hit is dropped. Region ids are the zero-based insertion order.
///
/// # Arguments
///
/// * `tracks` - all hits for all queries, from both searches combined
///
/// # Returns
///
/// * `RegionMap` - per-query region lists, sorted ascending by `qstart`
pub fn build_regions(tracks: &HitMap) -> Result<RegionMap, anyhow::Error> {
    let mut regions: RegionMap = HashMap::with_capacity(tracks.len());

    for (query, hits) in tracks.iter() {
        let mut hits = hits.iter().collect::<Vec<_>>();
        hits.sort_unstable_by(|a, b| a.qstart.cmp(&b.qstart).then(a.qend.cmp(&b.qend)));

        let mut list: Vec<Region> = Vec::new();
        for hit in hits {
            if hit.qstart == hit.qend {
                bail!(
                    "Degenerate hit on {}: qstart == qend == {}",
                    query,
                    hit.qstart
                );
            }

            match list.last_mut() {
                Some(last) if hit.qstart < last.qend => {
                    if hit.qend > last.qend {
                        last.qend = hit.qend;
                    }
                }
                _ => {
                    let id = list.len();
                    list.push(Region {
                        id,
                        qstart: hit.qstart,
                        qend: hit.qend,
                    });
                }
            }
        }

        regions.insert(query.clone(), list);
    }

    info!(
        "Built {} putative regions over {} queries",
        regions.values().flatten().count(),
        regions.len()
    );

    Ok(regions)
}

/// region on this query whose interval spans the hit midpoint, if any
#[inline(always)]
pub fn locate_region(regions: &[Region], middle: f64) -> Option<&Region> {
    regions.iter().find(|region| region.spans(middle))
}

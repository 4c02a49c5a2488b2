//! Pipeline driver for the intein scan
//!
//! Stages, in order: load and canonicalize sequences, run both homology
//! searches, parse and filter the hit tables, build putative regions,
//! check splice-junction residues in parallel, condense the evidence per
//! region and refine region bounds. Each stage writes its table before
//! the next one starts.

use std::fs;

use anyhow::{bail, Context, Result};
use log::info;

use config::{
    SearchKind, ALN_DIR, CANONICAL_QUERIES, CRITERIA_CONDENSED, CRITERIA_FULL, PUTATIVE_REGIONS,
    QUERY_SUMMARY, REFINED_REGIONS, RUN_PARAMS, SEARCH_DIR,
};
use packhits::{build_regions, combine, parse_hits, reader, FastaStore};

use crate::align::Mafft;
use crate::cli::Args;
use crate::{output, search, utils};

pub mod aggregate;
pub mod check;
pub mod refine;

/// Runs the whole scan over the configured inputs
///
/// # Arguments
///
/// * `args` - the validated command line arguments
///
/// # Returns
///
/// * `Result<()>` - the result of the operation
pub fn scan_inteins(args: Args) -> Result<()> {
    info!("Loading sequences...");
    let raw = FastaStore::from_str(&reader(&args.queries)?)
        .with_context(|| format!("Malformed query FASTA {:?}", args.queries))?;
    let (queries, names) = utils::canonicalize(&raw);
    let inteins = FastaStore::from_str(&reader(&args.inteins)?)
        .with_context(|| format!("Malformed intein FASTA {:?}", args.inteins))?;
    info!(
        "Queries: {}, reference inteins: {}",
        queries.len(),
        inteins.len()
    );

    let search_dir = args.outdir.join(SEARCH_DIR);
    let aln_dir = args.outdir.join(ALN_DIR);
    fs::create_dir_all(&search_dir)
        .with_context(|| format!("Could not create {:?}", search_dir))?;
    fs::create_dir_all(&aln_dir).with_context(|| format!("Could not create {:?}", aln_dir))?;
    output::write_params(&args, &args.outdir.join(RUN_PARAMS))?;

    let canonical = search_dir.join(CANONICAL_QUERIES);
    utils::write_fasta(&queries, &canonical)?;

    let db = search::make_profile_db(&args.makeprofiledb, &args.profiles, &search_dir)?;
    let profile_out = search::run_rpsblast(
        &args.rpsblast,
        &canonical,
        &db,
        &search_dir,
        args.evalue_rpsblast,
        args.threads,
    )?;
    let sequence_out = search::run_mmseqs(
        &args.mmseqs,
        &canonical,
        &args.inteins,
        &search_dir,
        args.evalue_mmseqs,
        args.threads,
    )?;

    let profile_hits = parse_hits(
        &reader(&profile_out)?,
        args.evalue_rpsblast,
        SearchKind::Profile,
    )?;
    let sequence_hits = parse_hits(
        &reader(&sequence_out)?,
        args.evalue_mmseqs,
        SearchKind::Sequence,
    )?;

    // every hit must point back to a loaded query
    for query in profile_hits.keys().chain(sequence_hits.keys()) {
        if queries.get(query).is_none() {
            bail!("Hit table names an unknown query id: {}", query);
        }
    }

    output::write_summary(
        &queries,
        &names,
        &profile_hits,
        &sequence_hits,
        &args.outdir.join(QUERY_SUMMARY),
    );

    let tracks = combine(&profile_hits, &sequence_hits);
    let regions = build_regions(&tracks)?;
    let coarse = utils::coarse_map(&regions, &names);
    output::write_regions(&coarse, &args.outdir.join(PUTATIVE_REGIONS));

    let aligner = Mafft::new(&args.mafft, &aln_dir, args.keep_alignments);
    let lines = check::check_hits(
        &sequence_hits,
        &regions,
        &queries,
        &inteins,
        &names,
        &aligner,
        args.padding,
    );
    output::write_full(&lines, &args.outdir.join(CRITERIA_FULL));

    let checks = aggregate::condense(
        &lines,
        &regions,
        &names,
        args.n_term_strictness,
        args.c_term_strictness,
    );
    output::write_condensed(&checks, &args.outdir.join(CRITERIA_CONDENSED));

    let refined = refine::refine(
        &checks,
        &coarse,
        args.evalue_region_refinement,
        args.use_length_in_refinement,
    );
    output::write_refined(&refined, &args.outdir.join(REFINED_REGIONS));

    if !args.keep_alignments {
        fs::remove_dir_all(&aln_dir).ok();
    }

    info!(
        "Condensed {} regions, {} kept after refinement",
        checks.len(),
        refined.len()
    );

    Ok(())
}

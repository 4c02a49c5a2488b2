use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use hashbrown::HashMap;

use config::write_table;
use packhits::{FastaStore, Hit, HitMap};

use crate::cli::Args;
use crate::core::aggregate::CheckMap;
use crate::core::check::CheckLine;
use crate::core::refine::RefinedMap;

const NA: &str = "NA";

/// echo the effective configuration next to the tables
pub fn write_params(args: &Args, path: &Path) -> Result<(), anyhow::Error> {
    let writer = BufWriter::new(
        File::create(path).with_context(|| format!("Could not create {:?}", path))?,
    );
    serde_json::to_writer_pretty(writer, args).context("Could not serialize run parameters")?;

    Ok(())
}

pub fn write_regions(coarse: &BTreeMap<(String, usize), (u64, u64)>, path: &PathBuf) {
    let rows = coarse
        .iter()
        .map(|((seq, id), (start, end))| {
            format!("{}\t{}\t{}\t{}\t{}", seq, id, start, end, end - start + 1)
        })
        .collect::<Vec<_>>();

    write_table(path, "seq\tregion.id\tstart\tend\tlen", &rows);
}

pub fn write_full(lines: &[CheckLine], path: &PathBuf) {
    let rows = lines.iter().map(|line| line.row()).collect::<Vec<_>>();

    write_table(
        path,
        "query\ttarget\tevalue\twhich.region\taln.region\tregion.good\thas.start\thas.end\thas.extein.start",
        &rows,
    );
}

pub fn write_condensed(checks: &CheckMap, path: &PathBuf) {
    let rows = checks
        .iter()
        .map(|((seq, id), check)| {
            let (target, evalue, span) = match &check.single_target {
                Some(single) => (
                    single.target.clone(),
                    format!("{:e}", single.evalue),
                    single.span.clone(),
                ),
                None => ("No".to_string(), NA.to_string(), NA.to_string()),
            };

            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                seq,
                id,
                target,
                evalue,
                span,
                check.multi_target,
                check.region_good,
                check.start_good,
                check.end_good,
                check.extein_good
            )
        })
        .collect::<Vec<_>>();

    write_table(
        path,
        "seq\tregion.id\tsingle.target\tsingle.target.evalue\tsingle.target.region\tmulti.target\tregion\tstart\tend\textein",
        &rows,
    );
}

pub fn write_refined(refined: &RefinedMap, path: &PathBuf) {
    let rows = refined
        .iter()
        .map(|((seq, id), region)| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                seq,
                id,
                region.start,
                region.end,
                region.len(),
                region.target.as_deref().unwrap_or(NA),
                region
                    .evalue
                    .map(|e| format!("{:e}", e))
                    .unwrap_or_else(|| NA.to_string())
            )
        })
        .collect::<Vec<_>>();

    write_table(
        path,
        "seq\tregion.id\tstart\tend\tlen\trefining.target\trefining.evalue",
        &rows,
    );
}

fn search_stats(hits: Option<&Vec<Hit>>) -> (usize, String) {
    match hits {
        Some(hits) if !hits.is_empty() => {
            let best = hits
                .iter()
                .map(|hit| hit.evalue)
                .fold(f64::INFINITY, f64::min);
            (hits.len(), format!("{:e}", best))
        }
        _ => (0, NA.to_string()),
    }
}

/// per-query hit counts and best e-values from both searches, input order
pub fn write_summary(
    queries: &FastaStore,
    names: &HashMap<String, String>,
    profile: &HitMap,
    sequence: &HitMap,
    path: &PathBuf,
) {
    let rows = queries
        .iter()
        .map(|record| {
            let name = names
                .get(&record.id)
                .map(|n| n.as_str())
                .unwrap_or(&record.id);
            let (profile_hits, profile_best) = search_stats(profile.get(&record.id));
            let (sequence_hits, sequence_best) = search_stats(sequence.get(&record.id));

            format!(
                "{}\t{}\t{}\t{}\t{}",
                name, profile_hits, profile_best, sequence_hits, sequence_best
            )
        })
        .collect::<Vec<_>>();

    write_table(
        path,
        "seq\trpsblast.hits\trpsblast.best.evalue\tmmseqs.hits\tmmseqs.best.evalue",
        &rows,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Level;
    use packhits::FastaRecord;

    #[test]
    fn test_write_regions_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.tsv");

        let mut coarse = BTreeMap::new();
        coarse.insert(("contig_9".to_string(), 0), (10u64, 80u64));
        coarse.insert(("contig_9".to_string(), 1), (100u64, 120u64));

        write_regions(&coarse, &path);

        let written = std::fs::read_to_string(&path).unwrap();
        let lines = written.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "seq\tregion.id\tstart\tend\tlen");
        assert_eq!(lines[1], "contig_9\t0\t10\t80\t71");
        assert_eq!(lines[2], "contig_9\t1\t100\t120\t21");
    }

    #[test]
    fn test_write_full_table_formats_evalue() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("criteria.tsv");

        let lines = vec![CheckLine {
            query: "contig_9".to_string(),
            target: "Intein_A".to_string(),
            evalue: 1e-20,
            region_id: 0,
            aln_start: 12,
            aln_end: 321,
            region_good: Level::L1,
            start_good: Level::L2,
            end_good: Level::L1,
            extein_good: Level::No,
        }];

        write_full(&lines, &path);

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written.lines().nth(1).unwrap(),
            "contig_9\tIntein_A\t1e-20\t0\t12-321\tL1\tL2\tL1\tNo"
        );
    }

    #[test]
    fn test_write_condensed_without_single_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("condensed.tsv");

        let mut checks = CheckMap::new();
        checks.insert(
            ("contig_9".to_string(), 0),
            crate::core::aggregate::RegionCheck::default(),
        );

        write_condensed(&checks, &path);

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written.lines().nth(1).unwrap(),
            "contig_9\t0\tNo\tNA\tNA\tNo\tNo\tNo\tNo\tNo"
        );
    }

    #[test]
    fn test_write_summary_counts_and_best_evalues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.tsv");

        let queries = FastaStore::from_records(vec![
            FastaRecord::new("user_query___seq_1", "MKLV"),
            FastaRecord::new("user_query___seq_2", "WYA"),
        ])
        .unwrap();

        let mut names = HashMap::new();
        names.insert("user_query___seq_1".to_string(), "contig_9".to_string());
        names.insert("user_query___seq_2".to_string(), "contig_2".to_string());

        let hit = |query: &str, evalue: f64| Hit {
            query: query.to_string(),
            target: "Intein_A".to_string(),
            pident: 90.0,
            alnlen: 10,
            mismatch: 0,
            gapopen: 0,
            qstart: 1,
            qend: 10,
            tstart: 1,
            tend: 10,
            evalue,
            bitscore: 50.0,
            tlen: None,
        };

        let mut profile: HitMap = hashbrown::HashMap::new();
        profile.insert(
            "user_query___seq_1".to_string(),
            vec![hit("user_query___seq_1", 1e-8), hit("user_query___seq_1", 1e-12)],
        );
        let sequence: HitMap = hashbrown::HashMap::new();

        write_summary(&queries, &names, &profile, &sequence, &path);

        let written = std::fs::read_to_string(&path).unwrap();
        let lines = written.lines().collect::<Vec<_>>();

        assert_eq!(
            lines[0],
            "seq\trpsblast.hits\trpsblast.best.evalue\tmmseqs.hits\tmmseqs.best.evalue"
        );
        assert_eq!(lines[1], "contig_9\t2\t1e-12\t0\tNA");
        assert_eq!(lines[2], "contig_2\t0\tNA\t0\tNA");
    }
}

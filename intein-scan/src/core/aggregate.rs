//! Condensing per-hit criterion lines into per-region verdicts

use std::collections::BTreeMap;

use hashbrown::HashMap;

use config::Level;
use packhits::RegionMap;

use crate::core::check::CheckLine;

/// Best single-target evidence for a region
#[derive(Debug, Clone, PartialEq)]
pub struct SingleTarget {
    pub target: String,
    pub evalue: f64,
    pub span: String,
}

/// Condensed verdicts for one (query, region) pair
#[derive(Debug, Clone, PartialEq)]
pub struct RegionCheck {
    pub region_good: Level,
    pub start_good: Level,
    pub end_good: Level,
    pub extein_good: Level,
    pub multi_target: Level,
    pub single_target: Option<SingleTarget>,
}

impl Default for RegionCheck {
    fn default() -> Self {
        Self {
            region_good: Level::No,
            start_good: Level::No,
            end_good: Level::No,
            extein_good: Level::No,
            multi_target: Level::No,
            single_target: None,
        }
    }
}

pub type CheckMap = BTreeMap<(String, usize), RegionCheck>;

/// Folds sorted criterion lines into one condensed row per (query, region)
///
/// Field upgrades are monotonic on the evidence lattice: once a field has
/// reached L1 it never downgrades, and an L2 observation only sticks when
/// it passes the configured strictness. The single-target winner is the
/// first all-good line, which under the input sort order is the one with
/// the best e-value.
///
/// # Arguments
///
/// * `lines` - full criteria lines, sorted by (query, region, evalue)
/// * `regions` - putative regions per canonical query id
/// * `names` - canonical id to original id map
/// * `n_term_strictness` - pass strictness for the start residue
/// * `c_term_strictness` - pass strictness for the end dipeptide
///
/// # Returns
///
/// * `CheckMap` - one condensed row per built region, evidence or not
pub fn condense(
    lines: &[CheckLine],
    regions: &RegionMap,
    names: &HashMap<String, String>,
    n_term_strictness: u8,
    c_term_strictness: u8,
) -> CheckMap {
    let mut checks: CheckMap = BTreeMap::new();

    for (query, list) in regions.iter() {
        let name = names.get(query).cloned().unwrap_or_else(|| query.clone());
        for region in list {
            checks.insert((name.clone(), region.id), RegionCheck::default());
        }
    }

    for line in lines {
        let check = checks
            .get_mut(&(line.query.clone(), line.region_id))
            .unwrap_or_else(|| {
                panic!(
                    "ERROR: No region {} built for {}, this is likely a bug!",
                    line.region_id, line.query
                )
            });

        let start_pass = line.start_good.passes(n_term_strictness);
        let end_pass = line.end_good.passes(c_term_strictness);
        let all_good = line.region_good == Level::L1
            && start_pass
            && end_pass
            && line.extein_good == Level::L1;

        // INFO: lines arrive sorted by evalue within a region, so the first
        // qualifying target is the best one and is never overwritten
        if all_good && check.single_target.is_none() {
            check.single_target = Some(SingleTarget {
                target: line.target.clone(),
                evalue: line.evalue,
                span: line.span(),
            });
        }

        if line.region_good == Level::L1 {
            check.region_good = Level::L1;
        }
        if start_pass {
            check.start_good.upgrade(line.start_good);
        }
        if end_pass {
            check.end_good.upgrade(line.end_good);
        }
        if line.extein_good == Level::L1 {
            check.extein_good = Level::L1;
        }
    }

    // the multi-target verdict reads the aggregate after all upgrades
    for check in checks.values_mut() {
        let good = check.region_good == Level::L1
            && check.start_good.passes(n_term_strictness)
            && check.end_good.passes(c_term_strictness)
            && check.extein_good == Level::L1;
        check.multi_target = if good { Level::L1 } else { Level::No };
    }

    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::check::sort_lines;
    use packhits::Region;

    fn line(
        query: &str,
        target: &str,
        evalue: f64,
        region_good: Level,
        start_good: Level,
        end_good: Level,
        extein_good: Level,
    ) -> CheckLine {
        CheckLine {
            query: query.to_string(),
            target: target.to_string(),
            evalue,
            region_id: 0,
            aln_start: 12,
            aln_end: 321,
            region_good,
            start_good,
            end_good,
            extein_good,
        }
    }

    fn one_region() -> RegionMap {
        let mut map: RegionMap = hashbrown::HashMap::new();
        map.insert(
            "q".to_string(),
            vec![Region {
                id: 0,
                qstart: 10,
                qend: 330,
            }],
        );
        map
    }

    fn no_renames() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_all_good_line_sets_single_target() {
        let lines = vec![line(
            "q",
            "Intein_A",
            1e-20,
            Level::L1,
            Level::L1,
            Level::L1,
            Level::L1,
        )];

        let checks = condense(&lines, &one_region(), &no_renames(), 1, 1);
        let check = &checks[&("q".to_string(), 0)];

        let single = check.single_target.as_ref().unwrap();
        assert_eq!(single.target, "Intein_A");
        assert_eq!(single.evalue, 1e-20);
        assert_eq!(single.span, "12-321");
        assert_eq!(check.multi_target, Level::L1);
    }

    #[test]
    fn test_best_evalue_wins_regardless_of_collection_order() {
        let mut lines = vec![
            line("q", "Intein_B", 1e-15, Level::L1, Level::L1, Level::L1, Level::L1),
            line("q", "Intein_A", 1e-20, Level::L1, Level::L1, Level::L1, Level::L1),
        ];
        sort_lines(&mut lines);

        let checks = condense(&lines, &one_region(), &no_renames(), 1, 1);
        let single = checks[&("q".to_string(), 0)].single_target.as_ref().unwrap();

        assert_eq!(single.target, "Intein_A");
        assert_eq!(single.evalue, 1e-20);
    }

    #[test]
    fn test_upgrades_are_monotonic() {
        let lines = vec![
            line("q", "Intein_A", 1e-30, Level::L1, Level::L2, Level::L1, Level::No),
            line("q", "Intein_B", 1e-20, Level::No, Level::No, Level::No, Level::No),
            line("q", "Intein_C", 1e-10, Level::L1, Level::L1, Level::L2, Level::L1),
        ];

        let checks = condense(&lines, &one_region(), &no_renames(), 2, 2);
        let check = &checks[&("q".to_string(), 0)];

        assert_eq!(check.region_good, Level::L1);
        // L2 first, upgraded to L1 later, never back down
        assert_eq!(check.start_good, Level::L1);
        // L1 first, the later L2 does not downgrade it
        assert_eq!(check.end_good, Level::L1);
        assert_eq!(check.extein_good, Level::L1);
    }

    #[test]
    fn test_strictness_one_blocks_l2_evidence() {
        let lines = vec![line(
            "q",
            "Intein_A",
            1e-20,
            Level::L1,
            Level::L2,
            Level::L1,
            Level::L1,
        )];

        let checks = condense(&lines, &one_region(), &no_renames(), 1, 1);
        let check = &checks[&("q".to_string(), 0)];

        // the L2 start does not pass at strictness 1, so nothing is recorded
        assert_eq!(check.start_good, Level::No);
        assert!(check.single_target.is_none());
        assert_eq!(check.multi_target, Level::No);
    }

    #[test]
    fn test_strictness_two_admits_l2_evidence() {
        let lines = vec![line(
            "q",
            "Intein_A",
            1e-20,
            Level::L1,
            Level::L2,
            Level::L2,
            Level::L1,
        )];

        let checks = condense(&lines, &one_region(), &no_renames(), 2, 2);
        let check = &checks[&("q".to_string(), 0)];

        assert_eq!(check.start_good, Level::L2);
        assert_eq!(check.end_good, Level::L2);
        assert!(check.single_target.is_some());
        assert_eq!(check.multi_target, Level::L1);
    }

    #[test]
    fn test_region_without_evidence_still_gets_a_row() {
        let mut regions = one_region();
        regions.get_mut("q").unwrap().push(Region {
            id: 1,
            qstart: 400,
            qend: 500,
        });

        let lines = vec![line(
            "q",
            "Intein_A",
            1e-20,
            Level::L1,
            Level::L1,
            Level::L1,
            Level::L1,
        )];

        let checks = condense(&lines, &regions, &no_renames(), 1, 1);

        assert_eq!(checks.len(), 2);
        assert_eq!(checks[&("q".to_string(), 1)], RegionCheck::default());
    }

    #[test]
    fn test_multi_target_verdict_spans_lines() {
        // no single line is all good, but the region is covered jointly
        let lines = vec![
            line("q", "Intein_A", 1e-30, Level::L1, Level::L1, Level::No, Level::No),
            line("q", "Intein_B", 1e-10, Level::L1, Level::No, Level::L1, Level::L1),
        ];

        let checks = condense(&lines, &one_region(), &no_renames(), 1, 1);
        let check = &checks[&("q".to_string(), 0)];

        assert!(check.single_target.is_none());
        assert_eq!(check.multi_target, Level::L1);
    }

    #[test]
    fn test_original_ids_key_the_condensed_rows() {
        let mut names = HashMap::new();
        names.insert("q".to_string(), "contig_9".to_string());

        let lines = vec![line(
            "contig_9",
            "Intein_A",
            1e-20,
            Level::L1,
            Level::L1,
            Level::L1,
            Level::L1,
        )];

        let checks = condense(&lines, &one_region(), &names, 1, 1);

        assert!(checks.contains_key(&("contig_9".to_string(), 0)));
    }
}

//! Rewriting coarse region bounds with single-target alignment evidence

use std::collections::BTreeMap;

use config::{REGION_MAX_LEN, REGION_MIN_LEN};

use crate::core::aggregate::CheckMap;
use crate::utils::parse_span;

/// Final per-(query, region) record; unrefined rows keep the coarse bounds
#[derive(Debug, Clone, PartialEq)]
pub struct RefinedRegion {
    pub start: u64,
    pub end: u64,
    pub target: Option<String>,
    pub evalue: Option<f64>,
}

impl RefinedRegion {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

pub type RefinedMap = BTreeMap<(String, usize), RefinedRegion>;

/// Adopts single-target bounds where the evidence is strong enough
///
/// A region with an all-good single target at `evalue <= max_evalue` takes
/// that target's aligned span as its bounds; every other region keeps its
/// coarse interval. With `use_length` set, rows whose final length falls
/// outside `[REGION_MIN_LEN, REGION_MAX_LEN]` are dropped entirely.
pub fn refine(
    checks: &CheckMap,
    coarse: &BTreeMap<(String, usize), (u64, u64)>,
    max_evalue: f64,
    use_length: bool,
) -> RefinedMap {
    let mut refined: RefinedMap = BTreeMap::new();

    for (key, (qstart, qend)) in coarse.iter() {
        let mut region = RefinedRegion {
            start: *qstart,
            end: *qend,
            target: None,
            evalue: None,
        };

        if let Some(single) = checks.get(key).and_then(|c| c.single_target.as_ref()) {
            if single.evalue <= max_evalue {
                let (start, end) =
                    parse_span(&single.span).unwrap_or_else(|e| panic!("ERROR: {}", e));
                region = RefinedRegion {
                    start,
                    end,
                    target: Some(single.target.clone()),
                    evalue: Some(single.evalue),
                };
            }
        }

        if use_length && !(REGION_MIN_LEN..=REGION_MAX_LEN).contains(&region.len()) {
            continue;
        }

        refined.insert(key.clone(), region);
    }

    refined
}

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use hashbrown::HashMap;

use config::QUERY_PREFIX;
use packhits::{FastaRecord, FastaStore, RegionMap};

/// Renames queries to stable canonical ids by input order
///
/// The canonical id travels through every external tool invocation; the
/// returned map restores the original id in all outputs.
pub fn canonicalize(store: &FastaStore) -> (FastaStore, HashMap<String, String>) {
    let mut renamed = Vec::with_capacity(store.len());
    let mut names = HashMap::with_capacity(store.len());

    for (i, record) in store.iter().enumerate() {
        let canonical = format!("{}{}", QUERY_PREFIX, i + 1);
        names.insert(canonical.clone(), record.id.clone());
        renamed.push(FastaRecord::new(canonical, record.seq.clone()));
    }

    let store = FastaStore::from_records(renamed).expect("ERROR: Canonical query ids collided!");

    (store, names)
}

/// write a store back out as FASTA, one record per id/sequence pair
pub fn write_fasta(store: &FastaStore, path: &Path) -> Result<(), anyhow::Error> {
    let f = File::create(path).with_context(|| format!("Could not create {:?}", path))?;
    let mut writer = BufWriter::new(f);

    for record in store.iter() {
        writeln!(writer, ">{}\n{}", record.id, record.seq)
            .with_context(|| format!("Could not write {:?}", path))?;
    }

    Ok(())
}

/// parse a "start-end" span into its coordinates
pub fn parse_span(span: &str) -> Result<(u64, u64), anyhow::Error> {
    let (start, end) = span
        .split_once('-')
        .ok_or_else(|| anyhow::anyhow!("Malformed region span: {}", span))?;

    Ok((
        start
            .parse()
            .with_context(|| format!("Malformed region span: {}", span))?,
        end.parse()
            .with_context(|| format!("Malformed region span: {}", span))?,
    ))
}

/// coarse region coordinates keyed by (original query id, region id)
pub fn coarse_map(
    regions: &RegionMap,
    names: &HashMap<String, String>,
) -> BTreeMap<(String, usize), (u64, u64)> {
    let mut coarse = BTreeMap::new();

    for (query, list) in regions.iter() {
        let name = names.get(query).cloned().unwrap_or_else(|| query.clone());
        for region in list {
            coarse.insert((name.clone(), region.id), (region.qstart, region.qend));
        }
    }

    coarse
}

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// One row of tabular homology output (outfmt-6 shaped)
///
/// Coordinates are 1-based inclusive positions into the query. Sequence-search
/// rows carry `qlen` and `tlen` after the twelve standard fields; `tlen` is
/// kept, profile rows leave it unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub query: String,
    pub target: String,
    pub pident: f64,
    pub alnlen: u64,
    pub mismatch: u64,
    pub gapopen: u64,
    pub qstart: u64,
    pub qend: u64,
    pub tstart: u64,
    pub tend: u64,
    pub evalue: f64,
    pub bitscore: f64,
    pub tlen: Option<u64>,
}

impl Hit {
    #[inline(always)]
    pub fn parse(line: &str) -> Result<Hit, &'static str> {
        if line.is_empty() {
            return Err("Empty line");
        }

        let mut fields = line.split('\t');
        let (
            query,
            target,
            pident,
            alnlen,
            mismatch,
            gapopen,
            qstart,
            qend,
            tstart,
            tend,
            evalue,
            bitscore,
        ) = (
            fields.next().ok_or("Cannot parse query")?,
            fields.next().ok_or("Cannot parse target")?,
            fields.next().ok_or("Cannot parse pident")?,
            fields.next().ok_or("Cannot parse alnlen")?,
            fields.next().ok_or("Cannot parse mismatch")?,
            fields.next().ok_or("Cannot parse gapopen")?,
            fields.next().ok_or("Cannot parse qstart")?,
            fields.next().ok_or("Cannot parse qend")?,
            fields.next().ok_or("Cannot parse tstart")?,
            fields.next().ok_or("Cannot parse tend")?,
            fields.next().ok_or("Cannot parse evalue")?,
            fields.next().ok_or("Cannot parse bitscore")?,
        );

        let int = |field: &str| field.parse::<u64>().map_err(|_| "Cannot parse integer field");
        let float = |field: &str| field.parse::<f64>().map_err(|_| "Cannot parse numeric field");

        // INFO: sequence-search rows append qlen (12) and tlen (13)
        let tlen = match fields.nth(1) {
            Some(field) => Some(int(field)?),
            None => None,
        };

        Ok(Hit {
            query: query.into(),
            target: target.into(),
            pident: float(pident)?,
            alnlen: int(alnlen)?,
            mismatch: int(mismatch)?,
            gapopen: int(gapopen)?,
            qstart: int(qstart)?,
            qend: int(qend)?,
            tstart: int(tstart)?,
            tend: int(tend)?,
            evalue: float(evalue)?,
            bitscore: float(bitscore)?,
            tlen,
        })
    }

    /// midpoint of the hit on the query, used for region lookup
    #[inline(always)]
    pub fn middle(&self) -> f64 {
        (self.qstart + self.qend + 1) as f64 / 2.0
    }
}

/// A maximal query interval covered by merged homology hits
///
/// Ids are the zero-based insertion order within one query; for a given
/// query, regions are non-overlapping and sorted ascending by `qstart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: usize,
    pub qstart: u64,
    pub qend: u64,
}

impl Region {
    #[inline(always)]
    pub fn len(&self) -> u64 {
        self.qend - self.qstart + 1
    }

    /// does the (real-valued) query midpoint fall inside this region?
    #[inline(always)]
    pub fn spans(&self, middle: f64) -> bool {
        self.qstart as f64 <= middle && middle <= self.qend as f64
    }

    /// does this region fully contain the [start, end] interval?
    #[inline(always)]
    pub fn covers(&self, start: u64, end: u64) -> bool {
        start >= self.qstart && end <= self.qend
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastaRecord {
    pub id: String,
    pub seq: String,
}

impl FastaRecord {
    pub fn new<T: Into<String>>(id: T, seq: T) -> FastaRecord {
        FastaRecord {
            id: id.into(),
            seq: seq.into(),
        }
    }
}

/// In-memory FASTA set: input order preserved, id lookup, duplicate ids fatal
#[derive(Debug, Clone, Default)]
pub struct FastaStore {
    records: Vec<FastaRecord>,
    index: HashMap<String, usize>,
}

impl FastaStore {
    pub fn from_records(records: Vec<FastaRecord>) -> Result<FastaStore, anyhow::Error> {
        let mut index = HashMap::with_capacity(records.len());

        for (i, record) in records.iter().enumerate() {
            if index.insert(record.id.clone(), i).is_some() {
                anyhow::bail!("Duplicate sequence id: {}", record.id);
            }
        }

        Ok(FastaStore { records, index })
    }

    /// parse FASTA text; sequence case is preserved, ids end at whitespace
    pub fn from_str(contents: &str) -> Result<FastaStore, anyhow::Error> {
        let mut records: Vec<FastaRecord> = Vec::new();

        for line in contents.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            if let Some(header) = line.strip_prefix('>') {
                let id = header
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("FASTA header with no id: {}", line))?;
                records.push(FastaRecord::new(id, ""));
            } else {
                match records.last_mut() {
                    Some(record) => record.seq.push_str(line),
                    None => anyhow::bail!("FASTA sequence before any header: {}", line),
                }
            }
        }

        FastaStore::from_records(records)
    }

    #[inline(always)]
    pub fn get(&self, id: &str) -> Option<&FastaRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &FastaRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_parse_twelve_fields() {
        let line = "user_query___seq_1\tIntein_22\t98.5\t310\t4\t1\t12\t321\t1\t310\t1.2e-100\t590.0";
        let hit = Hit::parse(line).unwrap();

        assert_eq!(hit.query, "user_query___seq_1");
        assert_eq!(hit.target, "Intein_22");
        assert_eq!(hit.qstart, 12);
        assert_eq!(hit.qend, 321);
        assert_eq!(hit.evalue, 1.2e-100);
        assert_eq!(hit.tlen, None);
    }

    #[test]
    fn test_hit_parse_sequence_search_fields() {
        let line =
            "user_query___seq_2\tIntein_7\t77.0\t200\t40\t2\t5\t204\t1\t200\t3e-40\t211.0\t450\t365";
        let hit = Hit::parse(line).unwrap();

        assert_eq!(hit.bitscore, 211.0);
        assert_eq!(hit.tlen, Some(365));
    }

    #[test]
    fn test_hit_parse_rejects_malformed_line() {
        assert!(Hit::parse("").is_err());
        assert!(Hit::parse("only\tthree\tfields").is_err());

        let bad_coord = "q\tt\t90.0\t100\t1\t1\tnotanumber\t50\t1\t100\t1e-5\t80.0";
        assert!(Hit::parse(bad_coord).is_err());
    }

    #[test]
    fn test_hit_middle() {
        let line = "q\tt\t90.0\t100\t1\t1\t10\t50\t1\t100\t1e-5\t80.0";
        let hit = Hit::parse(line).unwrap();
        assert_eq!(hit.middle(), 30.5);
    }

    #[test]
    fn test_region_len_and_covers() {
        let region = Region {
            id: 0,
            qstart: 10,
            qend: 80,
        };

        assert_eq!(region.len(), 71);
        assert!(region.spans(45.5));
        assert!(!region.spans(81.0));
        assert!(region.covers(10, 80));
        assert!(region.covers(20, 40));
        assert!(!region.covers(9, 40));
        assert!(!region.covers(20, 81));
    }

    #[test]
    fn test_fasta_store_roundtrip() {
        let contents = ">seq1 some description\nMKLV\nWYA\n>seq2\nacdef\n";
        let store = FastaStore::from_str(contents).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("seq1").unwrap().seq, "MKLVWYA");
        // case is preserved on load
        assert_eq!(store.get("seq2").unwrap().seq, "acdef");
        assert!(store.get("seq3").is_none());
    }

    #[test]
    fn test_fasta_store_duplicate_id_is_fatal() {
        let contents = ">seq1\nMKLV\n>seq1\nWYA\n";
        assert!(FastaStore::from_str(contents).is_err());
    }

    #[test]
    fn test_fasta_store_sequence_before_header_is_fatal() {
        assert!(FastaStore::from_str("MKLV\n>seq1\nWYA\n").is_err());
    }

    #[test]
    fn test_fasta_store_preserves_input_order() {
        let contents = ">b\nAA\n>a\nCC\n>c\nGG\n";
        let store = FastaStore::from_str(contents).unwrap();
        let ids = store.iter().map(|r| r.id.as_str()).collect::<Vec<_>>();

        assert_eq!(ids, ["b", "a", "c"]);
    }
}
